//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{CommentId, ReviewId, TitleId};
use kernel::pagination::PageQuery;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entity::{comment::Comment, review::Review, taxon::Taxon, title::Title};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Categories / Genres
// ============================================================================

/// Category or genre representation
#[derive(Debug, Clone, Serialize)]
pub struct TaxonResponse {
    pub name: String,
    pub slug: String,
}

impl From<Taxon> for TaxonResponse {
    fn from(taxon: Taxon) -> Self {
        Self {
            name: taxon.name.into_inner(),
            slug: taxon.slug.into(),
        }
    }
}

/// Create category / genre request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaxonRequest {
    pub name: String,
    pub slug: String,
}

/// `GET /categories`, `GET /genres` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaxonListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl TaxonListQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

// ============================================================================
// Titles
// ============================================================================

/// Title representation with embedded taxa
#[derive(Debug, Clone, Serialize)]
pub struct TitleResponse {
    pub id: TitleId,
    pub name: String,
    pub year: i32,
    pub rating: Option<i32>,
    pub description: Option<String>,
    pub genre: Vec<TaxonResponse>,
    pub category: Option<TaxonResponse>,
}

impl From<Title> for TitleResponse {
    fn from(title: Title) -> Self {
        Self {
            id: title.title_id,
            name: title.name,
            year: title.year,
            rating: title.rating,
            description: title.description,
            genre: title.genres.into_iter().map(TaxonResponse::from).collect(),
            category: title.category.map(TaxonResponse::from),
        }
    }
}

/// Create title request; slugs reference existing taxa
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i64>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

/// Partial title update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
    pub category: Option<String>,
}

/// `GET /titles` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleListQuery {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub name: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

// ============================================================================
// Reviews / Comments
// ============================================================================

/// Review representation
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: ReviewId,
    pub text: String,
    pub author: String,
    pub score: u8,
    pub pub_date: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.review_id,
            text: review.text,
            author: review.author,
            score: review.score.get(),
            pub_date: review.pub_date,
        }
    }
}

/// Create or update review request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    pub text: Option<String>,
    pub score: Option<i64>,
}

/// Comment representation
#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: CommentId,
    pub text: String,
    pub author: String,
    pub pub_date: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.comment_id,
            text: comment.text,
            author: comment.author,
            pub_date: comment.pub_date,
        }
    }
}

/// Create or update comment request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}
