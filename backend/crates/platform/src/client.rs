//! Client identification utilities
//!
//! Reading the caller's credentials from HTTP headers.

use axum::http::{HeaderMap, header};

/// Error when reading the `Authorization` header
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Authorization header is not valid UTF-8")]
    NotUtf8,
    #[error("Authorization scheme must be Bearer")]
    WrongScheme,
    #[error("Bearer token is empty")]
    Empty,
}

/// Extract the bearer token from the `Authorization` header
///
/// ## Returns
/// * `Ok(None)` - No `Authorization` header (anonymous request)
/// * `Ok(Some(token))` - `Authorization: Bearer <token>`
/// * `Err(BearerError)` - Header present but unusable
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<&str>, BearerError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| BearerError::NotUtf8)?;

    let (scheme, token) = value.split_once(' ').ok_or(BearerError::WrongScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::WrongScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(BearerError::Empty);
    }
    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_present() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers), Ok(Some("abc.def")));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer  abc "));
        assert_eq!(extract_bearer_token(&headers), Ok(Some("abc")));
    }

    #[test]
    fn test_bearer_token_absent() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpw"));
        assert_eq!(extract_bearer_token(&headers), Err(BearerError::WrongScheme));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(extract_bearer_token(&headers), Err(BearerError::WrongScheme));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer_token(&headers), Err(BearerError::Empty));
    }
}
