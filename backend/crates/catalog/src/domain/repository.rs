//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::{CommentId, ReviewId, TitleId};
use kernel::pagination::PageRequest;

use crate::domain::entity::{
    comment::Comment,
    review::Review,
    taxon::{Taxon, TaxonKind},
    title::{Title, TitleFilter},
};
use crate::domain::value_object::slug::Slug;
use crate::error::CatalogResult;

/// Category / genre repository trait
#[trait_variant::make(TaxonRepository: Send)]
pub trait LocalTaxonRepository {
    /// Fails with `TaxonNameTaken` / `SlugTaken` on a uniqueness clash
    async fn create_taxon(&self, taxon: &Taxon) -> CatalogResult<()>;

    /// Page ordered by name, optionally filtered by a case-insensitive
    /// name substring
    async fn list_taxa(
        &self,
        kind: TaxonKind,
        search: Option<&str>,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Taxon>, u64)>;

    /// Resolve exact slugs; unknown slugs are simply absent from the result
    async fn find_taxa_by_slugs(&self, kind: TaxonKind, slugs: &[Slug])
    -> CatalogResult<Vec<Taxon>>;

    /// Returns false when nothing was deleted
    async fn delete_taxon(&self, kind: TaxonKind, slug: &Slug) -> CatalogResult<bool>;
}

/// Title repository trait
///
/// Loaded titles carry their category, genres and current rating.
#[trait_variant::make(TitleRepository: Send)]
pub trait LocalTitleRepository {
    /// Fails with `TitleExists` on a (name, year, category) clash
    async fn create_title(&self, title: &Title) -> CatalogResult<()>;

    async fn find_title(&self, title_id: &TitleId) -> CatalogResult<Option<Title>>;

    /// Page ordered by name then year
    async fn list_titles(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Title>, u64)>;

    /// Replace scalar fields, category and the genre set
    async fn update_title(&self, title: &Title) -> CatalogResult<()>;

    /// Deletes reviews and comments with it
    async fn delete_title(&self, title_id: &TitleId) -> CatalogResult<bool>;
}

/// Review repository trait
#[trait_variant::make(ReviewRepository: Send)]
pub trait LocalReviewRepository {
    /// Fails with `DuplicateReview` when the author already reviewed the title
    async fn create_review(&self, review: &Review) -> CatalogResult<()>;

    /// Only matches a review that belongs to `title_id`
    async fn find_review(
        &self,
        title_id: &TitleId,
        review_id: &ReviewId,
    ) -> CatalogResult<Option<Review>>;

    /// Page ordered by publication date
    async fn list_reviews(
        &self,
        title_id: &TitleId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Review>, u64)>;

    async fn update_review(&self, review: &Review) -> CatalogResult<()>;

    /// Deletes comments with it
    async fn delete_review(&self, review_id: &ReviewId) -> CatalogResult<bool>;
}

/// Comment repository trait
#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn create_comment(&self, comment: &Comment) -> CatalogResult<()>;

    /// Only matches a comment that belongs to `review_id`
    async fn find_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> CatalogResult<Option<Comment>>;

    /// Page ordered by publication date
    async fn list_comments(
        &self,
        review_id: &ReviewId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Comment>, u64)>;

    /// Only the text is mutable
    async fn update_comment(&self, comment: &Comment) -> CatalogResult<()>;

    async fn delete_comment(&self, comment_id: &CommentId) -> CatalogResult<bool>;
}

/// Everything the catalog router needs from one store
pub trait CatalogRepository:
    TaxonRepository + TitleRepository + ReviewRepository + CommentRepository + Send + Sync + 'static
{
}

impl<T> CatalogRepository for T where
    T: TaxonRepository + TitleRepository + ReviewRepository + CommentRepository + Send + Sync + 'static
{
}
