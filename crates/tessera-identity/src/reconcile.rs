//! Orphan reconciliation sweep.
//!
//! Deletes cascade best-effort: a crash mid-commit can leave side
//! records (memberships, logins, claims, tokens, index entries) whose
//! owner is gone. The sweep scans each side container and removes
//! records whose owning user or role no longer resolves. Safe to run
//! concurrently with live traffic: removals skip the token check, and a
//! record recreated mid-sweep just survives until the next run.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use tessera_model::{IndexEntry, IndexKind, Role, User, UserClaim, UserLogin, UserRole, UserToken};
use tessera_store::{DocumentClient, Repository, StoreConfig, StoreError};

/// What one sweep removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub removed_user_roles: usize,
    pub removed_user_logins: usize,
    pub removed_user_claims: usize,
    pub removed_user_tokens: usize,
    pub removed_index_entries: usize,
}

impl ReconcileReport {
    pub fn total(&self) -> usize {
        self.removed_user_roles
            + self.removed_user_logins
            + self.removed_user_claims
            + self.removed_user_tokens
            + self.removed_index_entries
    }
}

pub struct Reconciler<C> {
    client: Arc<C>,
    config: Arc<StoreConfig>,
}

impl<C: DocumentClient> Reconciler<C> {
    pub fn new(client: Arc<C>, config: Arc<StoreConfig>) -> Self {
        Self { client, config }
    }

    fn repo(&self) -> Repository<C> {
        Repository::new(Arc::clone(&self.client), Arc::clone(&self.config))
    }

    /// Run one full sweep. Existence checks are memoized per run so a
    /// user with many side records costs one point read.
    pub async fn run(&self, ct: &CancellationToken) -> Result<ReconcileReport, StoreError> {
        let mut report = ReconcileReport::default();
        let mut users = ExistenceCache::default();
        let mut roles = ExistenceCache::default();

        let repo = self.repo();

        let memberships = repo.table::<UserRole>().all(ct).await?;
        for membership in memberships {
            let orphaned = !users.user_exists(&repo, &membership.user_id, ct).await?
                || !roles.role_exists(&repo, &membership.role_id, ct).await?;
            if orphaned {
                let mut repo = self.repo();
                repo.delete_unchecked(&membership);
                repo.save_changes(ct).await?;
                report.removed_user_roles += 1;
            }
        }

        let logins = repo.table::<UserLogin>().all(ct).await?;
        for login in logins {
            if !users.user_exists(&repo, &login.user_id, ct).await? {
                let mut repo = self.repo();
                repo.delete_unchecked(&login);
                repo.save_changes(ct).await?;
                report.removed_user_logins += 1;
            }
        }

        let claims = repo.table::<UserClaim>().all(ct).await?;
        for claim in claims {
            if !users.user_exists(&repo, &claim.user_id, ct).await? {
                let mut repo = self.repo();
                repo.delete_unchecked(&claim);
                repo.save_changes(ct).await?;
                report.removed_user_claims += 1;
            }
        }

        let tokens = repo.table::<UserToken>().all(ct).await?;
        for token in tokens {
            if !users.user_exists(&repo, &token.user_id, ct).await? {
                let mut repo = self.repo();
                repo.delete_unchecked(&token);
                repo.save_changes(ct).await?;
                report.removed_user_tokens += 1;
            }
        }

        let entries = repo.table::<IndexEntry>().all(ct).await?;
        for entry in entries {
            let alive = match entry.kind {
                IndexKind::UserName | IndexKind::UserEmail => {
                    users.user_exists(&repo, &entry.target_id, ct).await?
                }
                IndexKind::RoleName => roles.role_exists(&repo, &entry.target_id, ct).await?,
            };
            if !alive {
                let mut repo = self.repo();
                repo.delete_unchecked(&entry);
                repo.save_changes(ct).await?;
                report.removed_index_entries += 1;
            }
        }

        tracing::info!(
            user_roles = report.removed_user_roles,
            user_logins = report.removed_user_logins,
            user_claims = report.removed_user_claims,
            user_tokens = report.removed_user_tokens,
            index_entries = report.removed_index_entries,
            "reconcile sweep finished"
        );
        Ok(report)
    }
}

#[derive(Default)]
struct ExistenceCache {
    known: HashMap<String, bool>,
}

impl ExistenceCache {
    async fn user_exists<C: DocumentClient>(
        &mut self,
        repo: &Repository<C>,
        id: &str,
        ct: &CancellationToken,
    ) -> Result<bool, StoreError> {
        if let Some(&exists) = self.known.get(id) {
            return Ok(exists);
        }
        let exists = repo.read::<User>(id, id, ct).await?.is_some();
        self.known.insert(id.to_owned(), exists);
        Ok(exists)
    }

    async fn role_exists<C: DocumentClient>(
        &mut self,
        repo: &Repository<C>,
        id: &str,
        ct: &CancellationToken,
    ) -> Result<bool, StoreError> {
        if let Some(&exists) = self.known.get(id) {
            return Ok(exists);
        }
        let exists = repo.read::<Role>(id, id, ct).await?.is_some();
        self.known.insert(id.to_owned(), exists);
        Ok(exists)
    }
}
