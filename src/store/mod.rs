//! Record stores for users and organizations.
//!
//! The flows and gates only see these traits. `InMemoryStore` implements
//! both for tests and single-process deployments; a database-backed
//! implementation plugs in the same way.

mod memory;

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;

pub use memory::InMemoryStore;

/// A registered account.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Normalized (trimmed, lowercased); unique across users
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Invited emails in insertion order, without duplicates
    pub invited_users: Vec<String>,
}

impl Organization {
    pub fn is_invited(&self, email: &str) -> bool {
        self.invited_users.iter().any(|e| e == email)
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Insert a new user.
    ///
    /// Must fail with `DuplicateAccount` if the email is taken, atomically
    /// with respect to concurrent inserts.
    async fn insert(&self, user: User) -> Result<()>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn insert(&self, org: Organization) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Organization>>;

    async fn list(&self) -> Result<Vec<Organization>>;

    /// Replace name and description. Returns `None` if the organization does not exist.
    async fn update(
        &self,
        id: &str,
        name: &str,
        description: &str,
    ) -> Result<Option<Organization>>;

    /// Returns `false` if nothing was deleted.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Add an email to the invite set. Adding an existing email is a no-op.
    /// Returns `false` if the organization does not exist.
    async fn add_invited_user(&self, id: &str, email: &str) -> Result<bool>;
}
