use super::AuthError;
use crate::models::User;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;

/// Normalized lookup key for an email address.
pub fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-memory user registry keyed by normalized email.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<DashMap<String, User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `user` unless the email is already taken.
    pub fn insert(&self, user: User) -> Result<(), AuthError> {
        match self.users.entry(email_key(&user.email)) {
            Entry::Occupied(_) => Err(AuthError::UserExists),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        self.users.get(&email_key(email)).map(|entry| entry.clone())
    }

    pub fn contains(&self, email: &str) -> bool {
        self.users.contains_key(&email_key(email))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn emails_are_unique_ignoring_case_and_whitespace() {
        let store = UserStore::new();
        store
            .insert(User::new("Ada@Example.com", "hash".into(), "Ada", "Lovelace"))
            .unwrap();

        let duplicate = User::new(" ada@example.COM ", "hash".into(), "Ada", "Byron");
        assert_matches!(store.insert(duplicate), Err(AuthError::UserExists));
        assert_eq!(store.len(), 1);
        assert!(store.find_by_email("ADA@example.com").is_some());
    }
}
