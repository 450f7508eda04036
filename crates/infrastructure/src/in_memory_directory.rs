use std::collections::HashMap;

use async_trait::async_trait;
use opportune_application::DirectoryRepository;
use opportune_core::{AppError, AppResult, OrganizationId, UserId};
use opportune_domain::Principal;
use tokio::sync::RwLock;

/// In-memory user directory implementation.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    principals: RwLock<HashMap<UserId, Principal>>,
}

impl InMemoryDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            principals: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a principal in the directory.
    pub async fn register(&self, principal: Principal) -> AppResult<()> {
        let mut principals = self.principals.write().await;
        if principals.contains_key(&principal.id()) {
            return Err(AppError::Conflict(format!(
                "principal '{}' already exists",
                principal.id()
            )));
        }

        principals.insert(principal.id(), principal);
        Ok(())
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectory {
    async fn find_principal(&self, id: UserId) -> AppResult<Option<Principal>> {
        Ok(self.principals.read().await.get(&id).cloned())
    }

    async fn list_principal_ids(&self) -> AppResult<Vec<UserId>> {
        let mut ids: Vec<UserId> = self.principals.read().await.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_principal_ids_in_organization(
        &self,
        organization: OrganizationId,
    ) -> AppResult<Vec<UserId>> {
        let principals = self.principals.read().await;
        let mut ids: Vec<UserId> = principals
            .values()
            .filter(|principal| principal.organization() == Some(organization))
            .map(Principal::id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
