//! Comment Entity

use auth::{Owned, Principal};
use chrono::{DateTime, Utc};
use kernel::id::{CommentId, ReviewId, TitleId, UserId};

#[derive(Debug, Clone)]
pub struct Comment {
    pub comment_id: CommentId,
    pub title_id: TitleId,
    pub review_id: ReviewId,
    pub author_id: UserId,
    pub author: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

impl Comment {
    pub fn new(title_id: TitleId, review_id: ReviewId, author: &Principal, text: String) -> Self {
        Self {
            comment_id: CommentId::new(),
            title_id,
            review_id,
            author_id: author.user_id,
            author: author.username.as_str().to_string(),
            text,
            pub_date: Utc::now(),
        }
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> &UserId {
        &self.author_id
    }
}
