//! Manage Reviews Use Case
//!
//! Reviews live under a title. Anyone may read; any authenticated user may
//! post one review per title; the author, moderators and admins may edit
//! or delete it.

use std::sync::Arc;

use auth::{Caller, Policy};
use http::Method;
use kernel::error::field::{FieldErrors, REQUIRED};
use kernel::id::{ReviewId, TitleId};
use kernel::pagination::{Page, PageRequest};

use crate::domain::entity::non_blank;
use crate::domain::entity::review::{Review, ReviewChanges};
use crate::domain::repository::{ReviewRepository, TitleRepository};
use crate::domain::value_object::score::Score;
use crate::error::{CatalogError, CatalogResult};

const POLICY: Policy = Policy::OwnerAdminModeratorOrReadOnly;

/// Review input; `None` leaves a field unchanged on update
#[derive(Debug, Default)]
pub struct ReviewInput {
    pub text: Option<String>,
    pub score: Option<i64>,
}

fn validate(input: ReviewInput) -> CatalogResult<ReviewChanges> {
    let mut errors = FieldErrors::new();
    let text = input.text.and_then(|v| errors.check("text", non_blank(v)));
    let score = input.score.and_then(|v| errors.check("score", Score::new(v)));
    errors.into_result()?;
    Ok(ReviewChanges { text, score })
}

/// Manage reviews use case
pub struct ManageReviewsUseCase<R>
where
    R: TitleRepository + ReviewRepository,
{
    repo: Arc<R>,
}

impl<R> ManageReviewsUseCase<R>
where
    R: TitleRepository + ReviewRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Collection-level check, run before the request body or path is decoded
    pub fn authorize(&self, method: &Method, caller: &Caller) -> CatalogResult<()> {
        Ok(POLICY.check(method, caller)?)
    }

    /// GET /titles/{title_id}/reviews
    pub async fn list(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        page: PageRequest,
    ) -> CatalogResult<Page<Review>> {
        POLICY.check(&Method::GET, caller)?;
        self.ensure_title(title_id).await?;

        let (reviews, count) = self.repo.list_reviews(title_id, page).await?;
        Ok(Page::new(reviews, count, page))
    }

    /// GET /titles/{title_id}/reviews/{review_id}
    pub async fn get(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        review_id: &ReviewId,
    ) -> CatalogResult<Review> {
        POLICY.check(&Method::GET, caller)?;
        let review = self.load(title_id, review_id).await?;
        POLICY.check_object(&Method::GET, caller, &review)?;
        Ok(review)
    }

    /// POST /titles/{title_id}/reviews
    pub async fn create(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        input: ReviewInput,
    ) -> CatalogResult<Review> {
        POLICY.check(&Method::POST, caller)?;
        let author = caller.require_principal()?;
        self.ensure_title(title_id).await?;

        let mut required = FieldErrors::new();
        if input.text.is_none() {
            required.push("text", REQUIRED);
        }
        if input.score.is_none() {
            required.push("score", REQUIRED);
        }
        required.into_result()?;

        let ReviewChanges {
            text: Some(text),
            score: Some(score),
        } = validate(input)?
        else {
            return Err(CatalogError::Internal("validated review fields missing".into()));
        };

        let review = Review::new(*title_id, author, text, score);
        self.repo.create_review(&review).await?;

        tracing::info!(
            review_id = %review.review_id,
            title_id = %title_id,
            author = %review.author,
            score = review.score.get(),
            "Review created"
        );

        Ok(review)
    }

    /// PATCH /titles/{title_id}/reviews/{review_id}
    pub async fn update(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        review_id: &ReviewId,
        input: ReviewInput,
    ) -> CatalogResult<Review> {
        POLICY.check(&Method::PATCH, caller)?;
        let mut review = self.load(title_id, review_id).await?;
        POLICY.check_object(&Method::PATCH, caller, &review)?;

        review.apply(validate(input)?);
        self.repo.update_review(&review).await?;

        tracing::info!(review_id = %review.review_id, "Review updated");
        Ok(review)
    }

    /// DELETE /titles/{title_id}/reviews/{review_id}
    pub async fn delete(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        review_id: &ReviewId,
    ) -> CatalogResult<()> {
        POLICY.check(&Method::DELETE, caller)?;
        let review = self.load(title_id, review_id).await?;
        POLICY.check_object(&Method::DELETE, caller, &review)?;

        if !self.repo.delete_review(&review.review_id).await? {
            return Err(CatalogError::NotFound("Review"));
        }

        tracing::info!(review_id = %review.review_id, "Review deleted");
        Ok(())
    }

    async fn ensure_title(&self, title_id: &TitleId) -> CatalogResult<()> {
        match self.repo.find_title(title_id).await? {
            Some(_) => Ok(()),
            None => Err(CatalogError::NotFound("Title")),
        }
    }

    async fn load(&self, title_id: &TitleId, review_id: &ReviewId) -> CatalogResult<Review> {
        self.repo
            .find_review(title_id, review_id)
            .await?
            .ok_or(CatalogError::NotFound("Review"))
    }
}
