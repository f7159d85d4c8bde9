//! Account context. Authentication happens upstream; the gateway forwards the
//! resolved account number in `x-account-id`.

use std::fmt;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::errors::AppError;

pub const ACCOUNT_HEADER: &str = "x-account-id";

/// The account owning the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(pub i32);

impl AccountId {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(ACCOUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<i32>().ok())
            .filter(|id| *id > 0)
            .map(AccountId)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AccountId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        AccountId::from_headers(&parts.headers).ok_or(AppError::Unauthorized)
    }
}
