//! Value Object Module

pub mod score;
pub mod slug;
pub mod taxon_name;
