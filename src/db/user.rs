//! User account operations for authentication

use parking_lot::RwLock;
use thiserror::Error;

use super::AppState;
use crate::auth::model::User;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),
}

/// Account storage. Emails are compared case-insensitively.
pub trait UserStore: Send + Sync {
    fn find_by_email(&self, email: &str) -> Option<User>;
    fn insert(&self, user: User) -> Result<User, UserStoreError>;
    fn all(&self) -> Vec<User>;
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl UserStore for InMemoryUserStore {
    fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .iter()
            .find(|u| same_email(&u.email, email))
            .cloned()
    }

    fn insert(&self, user: User) -> Result<User, UserStoreError> {
        let mut users = self.users.write();
        if users.iter().any(|u| same_email(&u.email, &user.email)) {
            return Err(UserStoreError::DuplicateEmail(user.email));
        }
        users.push(user.clone());
        Ok(user)
    }

    fn all(&self) -> Vec<User> {
        self.users.read().clone()
    }
}

impl AppState {
    /// Get user by email
    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.users.find_by_email(email)
    }

    /// Create new user from an already hashed password
    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<User, UserStoreError> {
        let user = self.users.insert(User::new(email, password_hash))?;
        log::info!("Registered user {}", user.email);
        Ok(user)
    }

    /// Get all users, oldest first
    pub fn get_all_users(&self) -> Vec<User> {
        let mut users = self.users.all();
        users.sort_by_key(|u| u.created_at);
        users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_find_ignores_case() {
        let store = InMemoryUserStore::default();
        store.insert(User::new("HR@Example.com", "hash")).unwrap();

        let found = store.find_by_email("hr@example.COM").unwrap();
        assert_eq!(found.email, "hr@example.com");
        assert!(store.find_by_email("other@example.com").is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = InMemoryUserStore::default();
        store.insert(User::new("hr@example.com", "hash")).unwrap();

        let err = store.insert(User::new(" HR@example.com ", "other")).unwrap_err();
        assert_eq!(err, UserStoreError::DuplicateEmail("hr@example.com".to_string()));
        assert_eq!(store.all().len(), 1);
    }
}
