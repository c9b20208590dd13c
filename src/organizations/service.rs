use std::sync::Arc;
use validator::ValidateEmail;

use crate::error::{Result, WardenError};
use crate::store::{Organization, OrganizationStore};

/// Organization CRUD and invitations over an [`OrganizationStore`].
#[derive(Clone)]
pub struct OrganizationService {
    store: Arc<dyn OrganizationStore>,
}

impl OrganizationService {
    pub fn new(store: Arc<dyn OrganizationStore>) -> Self {
        Self { store }
    }

    /// Create an organization with an empty invite list and return its id.
    pub async fn create(&self, name: &str, description: &str) -> Result<String> {
        let name = require_name(name)?;
        let org = Organization {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            invited_users: Vec::new(),
        };
        let id = org.id.clone();
        self.store.insert(org).await?;

        tracing::info!(organization_id = %id, "Organization created");
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> Result<Organization> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| WardenError::not_found("Organization not found"))
    }

    pub async fn list(&self) -> Result<Vec<Organization>> {
        self.store.list().await
    }

    pub async fn update(&self, id: &str, name: &str, description: &str) -> Result<Organization> {
        let name = require_name(name)?;
        self.store
            .update(id, name, description)
            .await?
            .ok_or_else(|| WardenError::not_found("Organization not found"))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(WardenError::not_found("Organization not found"));
        }
        tracing::info!(organization_id = %id, "Organization deleted");
        Ok(())
    }

    /// Add one email to the organization's invite set. Re-inviting is a no-op.
    pub async fn invite(&self, id: &str, email: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        if !email.validate_email() {
            return Err(WardenError::validation("Invalid email format"));
        }

        if !self.store.add_invited_user(id, &email).await? {
            return Err(WardenError::not_found("Organization not found"));
        }

        tracing::info!(target: "org.invite", organization_id = %id, "User invited to organization");
        Ok(())
    }
}

fn require_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WardenError::validation("Organization name is required"));
    }
    Ok(name)
}
