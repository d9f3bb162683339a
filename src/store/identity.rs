use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::domain::buyer::{IdentityResolver, UserId};
use crate::domain::persistence::StoreError;

/// Local user records and the external identifiers linked to them.
///
/// Aliases are external subjects or emails; emails compare case-insensitively.
#[derive(Default)]
pub struct InMemoryIdentityDirectory {
    users: RwLock<HashSet<UserId>>,
    aliases: RwLock<HashMap<String, UserId>>,
}

impl InMemoryIdentityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: UserId) {
        self.users.write().await.insert(user);
    }

    pub async fn link(&self, alias: impl Into<String>, user: UserId) {
        let alias = normalize(&alias.into());
        self.aliases.write().await.insert(alias, user);
    }
}

fn normalize(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains('@') {
        raw.to_lowercase()
    } else {
        raw.to_string()
    }
}

#[async_trait]
impl IdentityResolver for InMemoryIdentityDirectory {
    async fn resolve_internal_ref(&self, raw: &str) -> Result<Option<UserId>, StoreError> {
        if let Some(user) = UserId::parse(raw) {
            if self.users.read().await.contains(&user) {
                return Ok(Some(user));
            }
        }
        Ok(self.aliases.read().await.get(&normalize(raw)).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_known_user_id() {
        let directory = InMemoryIdentityDirectory::new();
        let user = UserId::new();
        directory.add_user(user).await;

        assert_eq!(directory.resolve_internal_ref(&user.to_string()).await.unwrap(), Some(user));
        assert_eq!(directory.resolve_internal_ref(&UserId::new().to_string()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolves_alias() {
        let directory = InMemoryIdentityDirectory::new();
        let user = UserId::new();
        directory.link("kc-9f2", user).await;
        directory.link("Ana@Example.com", user).await;

        assert_eq!(directory.resolve_internal_ref("kc-9f2").await.unwrap(), Some(user));
        assert_eq!(directory.resolve_internal_ref(" ana@example.COM ").await.unwrap(), Some(user));
        assert_eq!(directory.resolve_internal_ref("kc-other").await.unwrap(), None);
    }
}
