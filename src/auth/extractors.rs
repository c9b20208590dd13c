use axum::{extract::FromRequestParts, http::request::Parts};

use super::claims::Identity;
use crate::error::WardenError;

/// Axum extractor for the caller attached by the auth gate.
///
/// Only valid on routes behind the gate; elsewhere it rejects with 401.
///
/// ```rust,ignore
/// async fn whoami(CurrentUser(identity): CurrentUser) -> String {
///     identity.username
/// }
/// ```
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = WardenError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| WardenError::unauthorized("Authentication required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_reads_identity_from_extensions() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        parts.extensions.insert(Identity {
            username: "alice".into(),
            email: "alice@example.com".into(),
        });

        let CurrentUser(identity) = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let result = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(WardenError::Unauthorized(_))));
    }
}
