//! Bearer Token Extraction
//!
//! `Authorization: Bearer <token>` parsing (RFC 6750).

use axum::http::{HeaderMap, header};

/// Why a request carries no usable bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerError {
    /// No Authorization header
    Missing,
    /// Header present but not `Bearer <token>`
    Malformed,
}

/// Extract the bearer token from request headers
///
/// The scheme is matched case-insensitively; surrounding whitespace is
/// ignored.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?
        .trim();

    let (scheme, token) = value.split_once(' ').ok_or(BearerError::Malformed)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return Err(BearerError::Malformed);
    }

    Ok(token)
}
