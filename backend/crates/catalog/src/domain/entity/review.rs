//! Review Entity

use auth::{Owned, Principal};
use chrono::{DateTime, Utc};
use kernel::id::{ReviewId, TitleId, UserId};

use crate::domain::value_object::score::Score;

#[derive(Debug, Clone)]
pub struct Review {
    pub review_id: ReviewId,
    pub title_id: TitleId,
    pub author_id: UserId,
    /// Author's user name at read time
    pub author: String,
    pub text: String,
    pub score: Score,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub text: Option<String>,
    pub score: Option<Score>,
}

impl Review {
    pub fn new(title_id: TitleId, author: &Principal, text: String, score: Score) -> Self {
        Self {
            review_id: ReviewId::new(),
            title_id,
            author_id: author.user_id,
            author: author.username.as_str().to_string(),
            text,
            score,
            pub_date: Utc::now(),
        }
    }

    pub fn apply(&mut self, changes: ReviewChanges) {
        if let Some(text) = changes.text {
            self.text = text;
        }
        if let Some(score) = changes.score {
            self.score = score;
        }
    }
}

impl Owned for Review {
    fn owner_id(&self) -> &UserId {
        &self.author_id
    }
}

/// Mean score rounded half away from zero, matching SQL `ROUND(AVG(..))`
pub fn mean_rating(scores: impl IntoIterator<Item = Score>) -> Option<i32> {
    let (sum, count) = scores
        .into_iter()
        .fold((0u32, 0u32), |(sum, n), s| (sum + u32::from(s.get()), n + 1));
    (count > 0).then(|| (f64::from(sum) / f64::from(count)).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: &[i64]) -> Vec<Score> {
        values.iter().map(|v| Score::new(*v).unwrap()).collect()
    }

    #[test]
    fn test_mean_rating() {
        assert_eq!(mean_rating(Vec::new()), None);
        assert_eq!(mean_rating(scores(&[7])), Some(7));
        assert_eq!(mean_rating(scores(&[7, 8])), Some(8));
        assert_eq!(mean_rating(scores(&[1, 2, 2])), Some(2));
        assert_eq!(mean_rating(scores(&[10, 9, 9])), Some(9));
    }
}
