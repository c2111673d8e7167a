//! Entity Module

pub mod comment;
pub mod review;
pub mod taxon;
pub mod title;

/// Free text that must contain something besides whitespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("This field may not be blank.")]
pub struct BlankError;

pub fn non_blank(value: String) -> Result<String, BlankError> {
    if value.trim().is_empty() {
        Err(BlankError)
    } else {
        Ok(value)
    }
}
