//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64, random keys)
//! - Header helpers (bearer token)
//! - Outbound mail port and adapters

pub mod client;
pub mod crypto;
pub mod mail;
