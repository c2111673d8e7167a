//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    comment::Comment,
    review::Review,
    taxon::{Taxon, TaxonKind},
    title::{Title, TitleFilter},
};
pub use repository::{
    CatalogRepository, CommentRepository, ReviewRepository, TaxonRepository, TitleRepository,
};
