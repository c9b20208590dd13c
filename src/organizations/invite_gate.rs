use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::Identity;
use crate::error::{Result, WardenError};
use crate::middleware::Interceptor;
use crate::store::OrganizationStore;

/// Route parameter naming the organization.
pub const ORGANIZATION_ID_PARAM: &str = "organization_id";

/// Admits only callers whose email is in the organization's invite list.
///
/// Must run after the auth gate. Read-only.
#[derive(Clone)]
pub struct InviteGate {
    store: Arc<dyn OrganizationStore>,
}

impl InviteGate {
    pub fn new(store: Arc<dyn OrganizationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Interceptor for InviteGate {
    async fn intercept(&self, parts: &mut Parts) -> Result<()> {
        let identity = parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| WardenError::unauthorized("Authentication required"))?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, &())
            .await
            .map_err(|e| WardenError::internal(format!("Failed to read route parameters: {}", e)))?;
        let org_id = params.get(ORGANIZATION_ID_PARAM).ok_or_else(|| {
            WardenError::internal(format!("Route has no '{}' parameter", ORGANIZATION_ID_PARAM))
        })?;

        let org = self
            .store
            .find_by_id(org_id)
            .await?
            .ok_or_else(|| WardenError::not_found("Organization not found"))?;

        if !org.is_invited(&identity.email) {
            tracing::warn!(
                target: "org.invite_gate.denied",
                organization_id = %org_id,
                username = %identity.username,
                "Caller is not invited to organization"
            );
            return Err(WardenError::forbidden("You are not invited to this organization"));
        }

        Ok(())
    }
}
