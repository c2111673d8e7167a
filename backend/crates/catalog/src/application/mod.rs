//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod manage_comments;
pub mod manage_reviews;
pub mod manage_taxa;
pub mod manage_titles;

// Re-exports
pub use config::CatalogConfig;
pub use manage_comments::{CommentInput, ManageCommentsUseCase};
pub use manage_reviews::{ManageReviewsUseCase, ReviewInput};
pub use manage_taxa::{ManageTaxaUseCase, TaxonInput};
pub use manage_titles::{CreateTitleInput, ManageTitlesUseCase, UpdateTitleInput};
