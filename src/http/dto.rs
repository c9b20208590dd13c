//! Organization request and response bodies.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::Organization;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrganizationRequest {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(email(message = "must be a valid email"))]
    pub user_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedOrganization {
    pub organization_id: String,
}

/// Public view of an organization. The invite list is not exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationView {
    pub organization_id: String,
    pub name: String,
    pub description: String,
}

impl From<Organization> for OrganizationView {
    fn from(org: Organization) -> Self {
        Self {
            organization_id: org.id,
            name: org.name,
            description: org.description,
        }
    }
}
