//! Document-backed role store.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use tessera_model::{DocumentEntity, IndexEntry, IndexKind, Role, UserRole, normalize};
use tessera_store::{DocumentClient, Repository, StoreConfig};

use crate::error::IdentityError;
use crate::stores::traits::RoleStore;
use crate::stores::{check_canceled, find_role_by_name, require};

pub struct DocumentRoleStore<C> {
    client: Arc<C>,
    config: Arc<StoreConfig>,
}

impl<C> Clone for DocumentRoleStore<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: DocumentClient> DocumentRoleStore<C> {
    pub fn new(client: Arc<C>, config: Arc<StoreConfig>) -> Self {
        Self { client, config }
    }

    fn repo(&self) -> Repository<C> {
        Repository::new(Arc::clone(&self.client), Arc::clone(&self.config))
    }

    fn name_index(role: &Role) -> IndexEntry {
        IndexEntry::new(IndexKind::RoleName, &role.normalized_name, &role.id)
    }
}

impl<C: DocumentClient> RoleStore for DocumentRoleStore<C> {
    async fn create(&self, role: &mut Role, ct: &CancellationToken) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&role.id, "role.id")?;
        require(&role.name, "role.name")?;

        if role.normalized_name.trim().is_empty() {
            role.normalized_name = normalize(&role.name);
        }

        let mut repo = self.repo();
        repo.add(&*role)?;
        repo.add(&Self::name_index(role))?;
        let tokens = repo.save_changes(ct).await?;
        role.set_concurrency_token(tokens.into_iter().next().flatten());
        Ok(())
    }

    async fn update(&self, role: &mut Role, ct: &CancellationToken) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&role.id, "role.id")?;
        require(&role.name, "role.name")?;

        let mut repo = self.repo();
        let stored: Option<Role> = repo.read(&role.id, &role.id, ct).await?;
        let Some(stored) = stored else {
            return Err(IdentityError::Conflict {
                description: format!("role '{}' no longer exists", role.id),
            });
        };

        repo.update(&*role)?;
        if stored.normalized_name != role.normalized_name {
            repo.delete_unchecked(&Self::name_index(&stored));
            repo.add(&Self::name_index(role))?;
        }
        let tokens = repo.save_changes(ct).await?;
        role.set_concurrency_token(tokens.into_iter().next().flatten());
        Ok(())
    }

    async fn delete(&self, role: &Role, ct: &CancellationToken) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&role.id, "role.id")?;

        let mut repo = self.repo();
        repo.delete(role);

        let role_id = role.id.clone();
        let memberships = repo
            .table::<UserRole>()
            .filter(move |m| m.role_id == role_id)
            .all(ct)
            .await?;
        for membership in &memberships {
            repo.delete_unchecked(membership);
        }

        repo.delete_unchecked(&Self::name_index(role));
        repo.save_changes(ct).await?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        role_id: &str,
        ct: &CancellationToken,
    ) -> Result<Option<Role>, IdentityError> {
        check_canceled(ct)?;
        require(role_id, "role_id")?;
        let role = self.repo().read(role_id, role_id, ct).await?;
        Ok(role)
    }

    async fn find_by_name(
        &self,
        normalized_role_name: &str,
        ct: &CancellationToken,
    ) -> Result<Option<Role>, IdentityError> {
        check_canceled(ct)?;
        require(normalized_role_name, "normalized_role_name")?;
        find_role_by_name(&self.repo(), normalized_role_name, ct).await
    }

    fn role_id(&self, role: &Role, ct: &CancellationToken) -> Result<String, IdentityError> {
        check_canceled(ct)?;
        Ok(role.id.clone())
    }

    fn role_name(&self, role: &Role, ct: &CancellationToken) -> Result<String, IdentityError> {
        check_canceled(ct)?;
        Ok(role.name.clone())
    }

    fn set_role_name(
        &self,
        role: &mut Role,
        role_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(role_name, "role_name")?;
        role.name = role_name.to_owned();
        Ok(())
    }

    fn normalized_role_name(
        &self,
        role: &Role,
        ct: &CancellationToken,
    ) -> Result<String, IdentityError> {
        check_canceled(ct)?;
        Ok(role.normalized_name.clone())
    }

    fn set_normalized_role_name(
        &self,
        role: &mut Role,
        normalized_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(normalized_name, "normalized_name")?;
        role.normalized_name = normalized_name.to_owned();
        Ok(())
    }
}
