//! In-memory catalog repository for tests
//!
//! Mirrors the foreign keys of the catalog tables: deleting a title drops
//! its reviews and comments, deleting a category clears it on titles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use kernel::id::{CommentId, ReviewId, TaxonId, TitleId};
use kernel::pagination::PageRequest;

use crate::domain::entity::{
    comment::Comment,
    review::{Review, mean_rating},
    taxon::{Taxon, TaxonKind},
    title::{Title, TitleFilter},
};
use crate::domain::repository::{
    CommentRepository, ReviewRepository, TaxonRepository, TitleRepository,
};
use crate::domain::value_object::slug::Slug;
use crate::error::{CatalogError, CatalogResult};

#[derive(Default)]
struct CatalogState {
    taxa: HashMap<TaxonId, Taxon>,
    titles: HashMap<TitleId, Title>,
    reviews: HashMap<ReviewId, Review>,
    comments: HashMap<CommentId, Comment>,
}

impl CatalogState {
    fn with_rating(&self, title: &Title) -> Title {
        let mut title = title.clone();
        title.rating = mean_rating(
            self.reviews
                .values()
                .filter(|r| r.title_id == title.title_id)
                .map(|r| r.score),
        );
        title
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCatalogRepository {
    state: Arc<Mutex<CatalogState>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CatalogResult<MutexGuard<'_, CatalogState>> {
        self.state
            .lock()
            .map_err(|_| CatalogError::Internal("catalog store poisoned".into()))
    }
}

fn page_of<T: Clone>(items: Vec<T>, page: PageRequest) -> (Vec<T>, u64) {
    let count = items.len() as u64;
    (page.slice(&items), count)
}

impl TaxonRepository for InMemoryCatalogRepository {
    async fn create_taxon(&self, taxon: &Taxon) -> CatalogResult<()> {
        let mut state = self.lock()?;
        for other in state.taxa.values().filter(|t| t.kind == taxon.kind) {
            if other.slug == taxon.slug {
                return Err(CatalogError::SlugTaken(taxon.kind));
            }
            if other.name == taxon.name {
                return Err(CatalogError::TaxonNameTaken(taxon.kind));
            }
        }
        state.taxa.insert(taxon.taxon_id, taxon.clone());
        Ok(())
    }

    async fn list_taxa(
        &self,
        kind: TaxonKind,
        search: Option<&str>,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Taxon>, u64)> {
        let needle = search.map(str::to_lowercase);
        let state = self.lock()?;
        let mut taxa: Vec<Taxon> = state
            .taxa
            .values()
            .filter(|t| t.kind == kind)
            .filter(|t| {
                needle
                    .as_deref()
                    .is_none_or(|n| t.name.as_str().to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        taxa.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(page_of(taxa, page))
    }

    async fn find_taxa_by_slugs(
        &self,
        kind: TaxonKind,
        slugs: &[Slug],
    ) -> CatalogResult<Vec<Taxon>> {
        let state = self.lock()?;
        Ok(state
            .taxa
            .values()
            .filter(|t| t.kind == kind && slugs.contains(&t.slug))
            .cloned()
            .collect())
    }

    async fn delete_taxon(&self, kind: TaxonKind, slug: &Slug) -> CatalogResult<bool> {
        let mut state = self.lock()?;
        let Some(taxon_id) = state
            .taxa
            .values()
            .find(|t| t.kind == kind && &t.slug == slug)
            .map(|t| t.taxon_id)
        else {
            return Ok(false);
        };
        state.taxa.remove(&taxon_id);

        for title in state.titles.values_mut() {
            match kind {
                TaxonKind::Category => {
                    if title.category.as_ref().is_some_and(|c| c.taxon_id == taxon_id) {
                        title.category = None;
                    }
                }
                TaxonKind::Genre => title.genres.retain(|g| g.taxon_id != taxon_id),
            }
        }
        Ok(true)
    }
}

impl TitleRepository for InMemoryCatalogRepository {
    async fn create_title(&self, title: &Title) -> CatalogResult<()> {
        let mut state = self.lock()?;
        if state.titles.values().any(|t| t.same_identity(title)) {
            return Err(CatalogError::TitleExists);
        }
        let mut stored = title.clone();
        stored.rating = None;
        state.titles.insert(title.title_id, stored);
        Ok(())
    }

    async fn find_title(&self, title_id: &TitleId) -> CatalogResult<Option<Title>> {
        let state = self.lock()?;
        Ok(state.titles.get(title_id).map(|t| state.with_rating(t)))
    }

    async fn list_titles(
        &self,
        filter: &TitleFilter,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Title>, u64)> {
        let state = self.lock()?;
        let mut titles: Vec<Title> = state
            .titles
            .values()
            .filter(|t| t.matches(filter))
            .map(|t| state.with_rating(t))
            .collect();
        titles.sort_by(|a, b| a.name.cmp(&b.name).then(a.year.cmp(&b.year)));
        Ok(page_of(titles, page))
    }

    async fn update_title(&self, title: &Title) -> CatalogResult<()> {
        let mut state = self.lock()?;
        if state.titles.values().any(|t| t.same_identity(title)) {
            return Err(CatalogError::TitleExists);
        }
        if let Some(stored) = state.titles.get_mut(&title.title_id) {
            *stored = title.clone();
        }
        Ok(())
    }

    async fn delete_title(&self, title_id: &TitleId) -> CatalogResult<bool> {
        let mut state = self.lock()?;
        if state.titles.remove(title_id).is_none() {
            return Ok(false);
        }
        state.reviews.retain(|_, r| &r.title_id != title_id);
        state.comments.retain(|_, c| &c.title_id != title_id);
        Ok(true)
    }
}

impl ReviewRepository for InMemoryCatalogRepository {
    async fn create_review(&self, review: &Review) -> CatalogResult<()> {
        let mut state = self.lock()?;
        if state
            .reviews
            .values()
            .any(|r| r.title_id == review.title_id && r.author_id == review.author_id)
        {
            return Err(CatalogError::DuplicateReview);
        }
        state.reviews.insert(review.review_id, review.clone());
        Ok(())
    }

    async fn find_review(
        &self,
        title_id: &TitleId,
        review_id: &ReviewId,
    ) -> CatalogResult<Option<Review>> {
        let state = self.lock()?;
        Ok(state
            .reviews
            .get(review_id)
            .filter(|r| &r.title_id == title_id)
            .cloned())
    }

    async fn list_reviews(
        &self,
        title_id: &TitleId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Review>, u64)> {
        let state = self.lock()?;
        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|r| &r.title_id == title_id)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| (r.pub_date, r.review_id.into_uuid()));
        Ok(page_of(reviews, page))
    }

    async fn update_review(&self, review: &Review) -> CatalogResult<()> {
        let mut state = self.lock()?;
        if let Some(stored) = state.reviews.get_mut(&review.review_id) {
            stored.text = review.text.clone();
            stored.score = review.score;
        }
        Ok(())
    }

    async fn delete_review(&self, review_id: &ReviewId) -> CatalogResult<bool> {
        let mut state = self.lock()?;
        if state.reviews.remove(review_id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, c| &c.review_id != review_id);
        Ok(true)
    }
}

impl CommentRepository for InMemoryCatalogRepository {
    async fn create_comment(&self, comment: &Comment) -> CatalogResult<()> {
        self.lock()?
            .comments
            .insert(comment.comment_id, comment.clone());
        Ok(())
    }

    async fn find_comment(
        &self,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> CatalogResult<Option<Comment>> {
        let state = self.lock()?;
        Ok(state
            .comments
            .get(comment_id)
            .filter(|c| &c.review_id == review_id)
            .cloned())
    }

    async fn list_comments(
        &self,
        review_id: &ReviewId,
        page: PageRequest,
    ) -> CatalogResult<(Vec<Comment>, u64)> {
        let state = self.lock()?;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| &c.review_id == review_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.pub_date, c.comment_id.into_uuid()));
        Ok(page_of(comments, page))
    }

    async fn update_comment(&self, comment: &Comment) -> CatalogResult<()> {
        let mut state = self.lock()?;
        if let Some(stored) = state.comments.get_mut(&comment.comment_id) {
            stored.text = comment.text.clone();
        }
        Ok(())
    }

    async fn delete_comment(&self, comment_id: &CommentId) -> CatalogResult<bool> {
        Ok(self.lock()?.comments.remove(comment_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::taxon_name::TaxonName;

    fn taxon(kind: TaxonKind, slug: &str) -> Taxon {
        Taxon::new(kind, TaxonName::new(slug).unwrap(), Slug::new(slug).unwrap())
    }

    #[tokio::test]
    async fn test_taxon_uniqueness_is_per_kind() {
        let repo = InMemoryCatalogRepository::new();
        repo.create_taxon(&taxon(TaxonKind::Genre, "drama"))
            .await
            .unwrap();
        repo.create_taxon(&taxon(TaxonKind::Category, "drama"))
            .await
            .unwrap();

        let err = repo
            .create_taxon(&taxon(TaxonKind::Genre, "drama"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::SlugTaken(TaxonKind::Genre)));
    }

    #[tokio::test]
    async fn test_delete_category_clears_titles() {
        let repo = InMemoryCatalogRepository::new();
        let films = taxon(TaxonKind::Category, "films");
        let drama = taxon(TaxonKind::Genre, "drama");
        repo.create_taxon(&films).await.unwrap();
        repo.create_taxon(&drama).await.unwrap();

        let title = Title::new("Stalker".into(), 1979, None, films.clone(), vec![drama]);
        repo.create_title(&title).await.unwrap();

        assert!(repo.delete_taxon(TaxonKind::Category, &films.slug).await.unwrap());
        assert!(!repo.delete_taxon(TaxonKind::Category, &films.slug).await.unwrap());

        let stored = repo.find_title(&title.title_id).await.unwrap().unwrap();
        assert!(stored.category.is_none());
        assert_eq!(stored.genres.len(), 1);
    }

    #[tokio::test]
    async fn test_list_taxa_search_and_order() {
        let repo = InMemoryCatalogRepository::new();
        for slug in ["rock", "drama", "hard-rock"] {
            repo.create_taxon(&taxon(TaxonKind::Genre, slug)).await.unwrap();
        }

        let (all, count) = repo
            .list_taxa(TaxonKind::Genre, None, PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(count, 3);
        let names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Drama", "Hard-rock", "Rock"]);

        let (found, count) = repo
            .list_taxa(TaxonKind::Genre, Some("ROCK"), PageRequest::new(1, 1))
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(found.len(), 1);
    }
}
