//! Manage Comments Use Case
//!
//! Comments hang off a review, which must itself belong to the title in
//! the path.

use std::sync::Arc;

use auth::{Caller, Policy};
use http::Method;
use kernel::error::field::{FieldErrors, REQUIRED};
use kernel::id::{CommentId, ReviewId, TitleId};
use kernel::pagination::{Page, PageRequest};

use crate::domain::entity::comment::Comment;
use crate::domain::entity::non_blank;
use crate::domain::entity::review::Review;
use crate::domain::repository::{CommentRepository, ReviewRepository};
use crate::error::{CatalogError, CatalogResult};

const POLICY: Policy = Policy::OwnerAdminModeratorOrReadOnly;

/// Comment input
#[derive(Debug, Default)]
pub struct CommentInput {
    pub text: Option<String>,
}

/// Manage comments use case
pub struct ManageCommentsUseCase<R>
where
    R: ReviewRepository + CommentRepository,
{
    repo: Arc<R>,
}

impl<R> ManageCommentsUseCase<R>
where
    R: ReviewRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Collection-level check, run before the request body or path is decoded
    pub fn authorize(&self, method: &Method, caller: &Caller) -> CatalogResult<()> {
        Ok(POLICY.check(method, caller)?)
    }

    /// GET /titles/{title_id}/reviews/{review_id}/comments
    pub async fn list(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        review_id: &ReviewId,
        page: PageRequest,
    ) -> CatalogResult<Page<Comment>> {
        POLICY.check(&Method::GET, caller)?;
        let review = self.review(title_id, review_id).await?;

        let (comments, count) = self.repo.list_comments(&review.review_id, page).await?;
        Ok(Page::new(comments, count, page))
    }

    /// GET .../comments/{comment_id}
    pub async fn get(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> CatalogResult<Comment> {
        POLICY.check(&Method::GET, caller)?;
        let comment = self.load(title_id, review_id, comment_id).await?;
        POLICY.check_object(&Method::GET, caller, &comment)?;
        Ok(comment)
    }

    /// POST .../comments
    pub async fn create(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        review_id: &ReviewId,
        input: CommentInput,
    ) -> CatalogResult<Comment> {
        POLICY.check(&Method::POST, caller)?;
        let author = caller.require_principal()?;
        let review = self.review(title_id, review_id).await?;

        let text = match input.text {
            None => return Err(FieldErrors::single("text", REQUIRED).into()),
            Some(text) => non_blank(text).map_err(|e| CatalogError::invalid("text", e.to_string()))?,
        };

        let comment = Comment::new(review.title_id, review.review_id, author, text);
        self.repo.create_comment(&comment).await?;

        tracing::info!(
            comment_id = %comment.comment_id,
            review_id = %review.review_id,
            author = %comment.author,
            "Comment created"
        );

        Ok(comment)
    }

    /// PATCH .../comments/{comment_id}
    pub async fn update(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        review_id: &ReviewId,
        comment_id: &CommentId,
        input: CommentInput,
    ) -> CatalogResult<Comment> {
        POLICY.check(&Method::PATCH, caller)?;
        let mut comment = self.load(title_id, review_id, comment_id).await?;
        POLICY.check_object(&Method::PATCH, caller, &comment)?;

        if let Some(text) = input.text {
            comment.text =
                non_blank(text).map_err(|e| CatalogError::invalid("text", e.to_string()))?;
            self.repo.update_comment(&comment).await?;
            tracing::info!(comment_id = %comment.comment_id, "Comment updated");
        }

        Ok(comment)
    }

    /// DELETE .../comments/{comment_id}
    pub async fn delete(
        &self,
        caller: &Caller,
        title_id: &TitleId,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> CatalogResult<()> {
        POLICY.check(&Method::DELETE, caller)?;
        let comment = self.load(title_id, review_id, comment_id).await?;
        POLICY.check_object(&Method::DELETE, caller, &comment)?;

        if !self.repo.delete_comment(&comment.comment_id).await? {
            return Err(CatalogError::NotFound("Comment"));
        }

        tracing::info!(comment_id = %comment.comment_id, "Comment deleted");
        Ok(())
    }

    async fn review(&self, title_id: &TitleId, review_id: &ReviewId) -> CatalogResult<Review> {
        self.repo
            .find_review(title_id, review_id)
            .await?
            .ok_or(CatalogError::NotFound("Review"))
    }

    async fn load(
        &self,
        title_id: &TitleId,
        review_id: &ReviewId,
        comment_id: &CommentId,
    ) -> CatalogResult<Comment> {
        let review = self.review(title_id, review_id).await?;
        self.repo
            .find_comment(&review.review_id, comment_id)
            .await?
            .ok_or(CatalogError::NotFound("Comment"))
    }
}
