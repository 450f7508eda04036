use async_trait::async_trait;
use opportune_core::{AppResult, OrganizationId, UserId};
use opportune_domain::Principal;

/// Port for principal lookups against the user directory.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Finds a principal by id, with roles and organization affiliation resolved.
    async fn find_principal(&self, id: UserId) -> AppResult<Option<Principal>>;

    /// Lists every known principal id.
    async fn list_principal_ids(&self) -> AppResult<Vec<UserId>>;

    /// Lists principal ids affiliated with one organization.
    async fn list_principal_ids_in_organization(
        &self,
        organization: OrganizationId,
    ) -> AppResult<Vec<UserId>>;
}
