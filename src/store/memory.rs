use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

use super::{Organization, OrganizationStore, User, UserStore};
use crate::error::{Result, WardenError};

#[derive(Default)]
struct Inner {
    users: DashMap<String, User>,
    /// email -> user id
    users_by_email: DashMap<String, String>,
    organizations: DashMap<String, Organization>,
}

/// Concurrent in-memory user and organization store.
///
/// Cloning shares the underlying maps.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.inner.users.len()
    }

    pub fn organization_count(&self) -> usize {
        self.inner.organizations.len()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let Some(id) = self.inner.users_by_email.get(email).map(|r| r.value().clone()) else {
            return Ok(None);
        };
        Ok(self.inner.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.inner.users.get(id).map(|r| r.value().clone()))
    }

    async fn insert(&self, user: User) -> Result<()> {
        // The email entry guard serializes concurrent signups for one address
        match self.inner.users_by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(WardenError::DuplicateAccount),
            Entry::Vacant(slot) => {
                self.inner.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn insert(&self, org: Organization) -> Result<()> {
        self.inner.organizations.insert(org.id.clone(), org);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Organization>> {
        Ok(self.inner.organizations.get(id).map(|r| r.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Organization>> {
        let mut orgs: Vec<Organization> = self
            .inner
            .organizations
            .iter()
            .map(|r| r.value().clone())
            .collect();
        orgs.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(orgs)
    }

    async fn update(
        &self,
        id: &str,
        name: &str,
        description: &str,
    ) -> Result<Option<Organization>> {
        Ok(self.inner.organizations.get_mut(id).map(|mut org| {
            org.name = name.to_string();
            org.description = description.to_string();
            org.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.inner.organizations.remove(id).is_some())
    }

    async fn add_invited_user(&self, id: &str, email: &str) -> Result<bool> {
        let Some(mut org) = self.inner.organizations.get_mut(id) else {
            return Ok(false);
        };
        if !org.is_invited(email) {
            org.invited_users.push(email.to_string());
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.into(),
            name: "alice".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
        }
    }

    fn org(id: &str, name: &str) -> Organization {
        Organization {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            invited_users: vec![],
        }
    }

    #[tokio::test]
    async fn test_user_insert_and_find() {
        let store = InMemoryStore::new();
        UserStore::insert(&store, user("u1", "a@x.com")).await.unwrap();

        let found = UserStore::find_by_email(&store, "a@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, "u1");
        assert!(UserStore::find_by_id(&store, "u1").await.unwrap().is_some());
        assert!(UserStore::find_by_email(&store, "b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryStore::new();
        UserStore::insert(&store, user("u1", "a@x.com")).await.unwrap();

        let err = UserStore::insert(&store, user("u2", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, WardenError::DuplicateAccount));
        assert_eq!(store.user_count(), 1);
        assert!(UserStore::find_by_id(&store, "u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_signup_same_email() {
        let store = InMemoryStore::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                UserStore::insert(&store, user(&format!("u{}", i), "race@x.com")).await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_invite_is_add_to_set() {
        let store = InMemoryStore::new();
        OrganizationStore::insert(&store, org("o1", "Acme")).await.unwrap();

        assert!(store.add_invited_user("o1", "a@x.com").await.unwrap());
        assert!(store.add_invited_user("o1", "b@x.com").await.unwrap());
        assert!(store.add_invited_user("o1", "a@x.com").await.unwrap());

        let found = OrganizationStore::find_by_id(&store, "o1").await.unwrap().unwrap();
        assert_eq!(found.invited_users, vec!["a@x.com", "b@x.com"]);
    }

    #[tokio::test]
    async fn test_missing_org_operations() {
        let store = InMemoryStore::new();
        assert!(!store.add_invited_user("nope", "a@x.com").await.unwrap());
        assert!(store.update("nope", "n", "d").await.unwrap().is_none());
        assert!(!store.delete("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_delete_list() {
        let store = InMemoryStore::new();
        OrganizationStore::insert(&store, org("o2", "Zeta")).await.unwrap();
        OrganizationStore::insert(&store, org("o1", "Acme")).await.unwrap();

        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["Acme", "Zeta"]);

        let updated = store.update("o1", "Acme Inc", "widgets").await.unwrap().unwrap();
        assert_eq!(updated.description, "widgets");

        assert!(store.delete("o2").await.unwrap());
        assert_eq!(store.organization_count(), 1);
    }
}
