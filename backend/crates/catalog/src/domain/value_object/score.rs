use serde::Serialize;

pub const SCORE_MIN: i64 = 1;
pub const SCORE_MAX: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Ensure this value is between 1 and 10.")]
pub struct ScoreError;

/// Review score, 1 to 10 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub fn new(value: i64) -> Result<Self, ScoreError> {
        if (SCORE_MIN..=SCORE_MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ScoreError)
        }
    }

    pub fn from_db(value: i16) -> Self {
        Self(value.clamp(SCORE_MIN as i16, SCORE_MAX as i16) as u8)
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(Score::new(1).unwrap().get(), 1);
        assert_eq!(Score::new(10).unwrap().get(), 10);
        assert_eq!(Score::new(0), Err(ScoreError));
        assert_eq!(Score::new(11), Err(ScoreError));
        assert_eq!(Score::new(-3), Err(ScoreError));
    }
}
