//! Document-backed user store.
//!
//! One struct satisfies the union of user capability traits; each
//! operation builds a request-scoped repository, stages its mutations
//! with the primary document first, and commits once. Lookups prefer
//! partition-scoped point reads; only normalized-name/email lookups with
//! a missing index entry fall back to a cross-partition scan.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use tessera_model::{
    DocumentEntity, IndexEntry, IndexKind, User, UserClaim, UserLogin, UserRole, UserToken,
    normalize,
};
use tessera_store::{DocumentClient, Repository, StoreConfig};

use crate::error::IdentityError;
use crate::stores::traits::{
    Claim, LoginInfo, UserClaimStore, UserEmailStore, UserLoginStore, UserPasswordStore,
    UserPhoneNumberStore, UserRoleStore, UserStore, UserTokenStore, UserTwoFactorStore,
};
use crate::stores::{check_canceled, find_role_by_name, index_target, require};

pub struct DocumentUserStore<C> {
    client: Arc<C>,
    config: Arc<StoreConfig>,
}

impl<C> Clone for DocumentUserStore<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: DocumentClient> DocumentUserStore<C> {
    pub fn new(client: Arc<C>, config: Arc<StoreConfig>) -> Self {
        Self { client, config }
    }

    fn repo(&self) -> Repository<C> {
        Repository::new(Arc::clone(&self.client), Arc::clone(&self.config))
    }

    fn name_index(user: &User) -> IndexEntry {
        IndexEntry::new(IndexKind::UserName, &user.normalized_user_name, &user.id)
    }

    fn email_index(user: &User) -> IndexEntry {
        IndexEntry::new(IndexKind::UserEmail, &user.normalized_email, &user.id)
    }

    async fn find_by_index(
        &self,
        kind: IndexKind,
        value: &str,
        ct: &CancellationToken,
    ) -> Result<Option<User>, IdentityError> {
        let repo = self.repo();
        if let Some(user_id) = index_target(&repo, kind, value, ct).await? {
            if let Some(user) = repo.read::<User>(&user_id, &user_id, ct).await? {
                return Ok(Some(user));
            }
            // Dangling entry: the target is gone and the reconciler will
            // sweep it. Fall through to the scan.
        }
        let needle = value.to_owned();
        let user = match kind {
            IndexKind::UserName => {
                repo.table::<User>()
                    .filter(move |u| u.normalized_user_name == needle)
                    .one(ct)
                    .await?
            }
            IndexKind::UserEmail => {
                repo.table::<User>()
                    .filter(move |u| u.normalized_email == needle)
                    .one(ct)
                    .await?
            }
            IndexKind::RoleName => None,
        };
        Ok(user)
    }
}

impl<C: DocumentClient> UserStore for DocumentUserStore<C> {
    async fn create(&self, user: &mut User, ct: &CancellationToken) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        require(&user.user_name, "user.user_name")?;
        require(&user.email, "user.email")?;

        // Normalization is applied at write time; lookups depend on it.
        if user.normalized_user_name.trim().is_empty() {
            user.normalized_user_name = normalize(&user.user_name);
        }
        if user.normalized_email.trim().is_empty() {
            user.normalized_email = normalize(&user.email);
        }

        let mut repo = self.repo();
        repo.add(&*user)?;
        repo.add(&Self::name_index(user))?;
        repo.add(&Self::email_index(user))?;
        let tokens = repo.save_changes(ct).await?;
        user.set_concurrency_token(tokens.into_iter().next().flatten());
        Ok(())
    }

    async fn update(&self, user: &mut User, ct: &CancellationToken) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        require(&user.user_name, "user.user_name")?;

        let mut repo = self.repo();
        let stored: Option<User> = repo.read(&user.id, &user.id, ct).await?;
        let Some(stored) = stored else {
            return Err(IdentityError::Conflict {
                description: format!("user '{}' no longer exists", user.id),
            });
        };

        repo.update(&*user)?;
        if stored.normalized_user_name != user.normalized_user_name {
            repo.delete_unchecked(&Self::name_index(&stored));
            repo.add(&Self::name_index(user))?;
        }
        if stored.normalized_email != user.normalized_email {
            repo.delete_unchecked(&Self::email_index(&stored));
            repo.add(&Self::email_index(user))?;
        }
        let tokens = repo.save_changes(ct).await?;
        user.set_concurrency_token(tokens.into_iter().next().flatten());
        Ok(())
    }

    async fn delete(&self, user: &User, ct: &CancellationToken) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;

        let mut repo = self.repo();
        // Primary document first: if its token is stale the batch aborts
        // before any side record is touched.
        repo.delete(user);

        let uid = user.id.clone();
        let memberships = repo
            .table::<UserRole>()
            .filter({
                let uid = uid.clone();
                move |m| m.user_id == uid
            })
            .all(ct)
            .await?;
        for membership in &memberships {
            repo.delete_unchecked(membership);
        }

        let logins = repo
            .table::<UserLogin>()
            .filter({
                let uid = uid.clone();
                move |l| l.user_id == uid
            })
            .all(ct)
            .await?;
        for login in &logins {
            repo.delete_unchecked(login);
        }

        let claims = repo
            .table::<UserClaim>()
            .filter({
                let uid = uid.clone();
                move |c| c.user_id == uid
            })
            .all(ct)
            .await?;
        for claim in &claims {
            repo.delete_unchecked(claim);
        }

        let tokens = repo
            .table::<UserToken>()
            .filter(move |t| t.user_id == uid)
            .all(ct)
            .await?;
        for token in &tokens {
            repo.delete_unchecked(token);
        }

        repo.delete_unchecked(&Self::name_index(user));
        repo.delete_unchecked(&Self::email_index(user));
        repo.save_changes(ct).await?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        user_id: &str,
        ct: &CancellationToken,
    ) -> Result<Option<User>, IdentityError> {
        check_canceled(ct)?;
        require(user_id, "user_id")?;
        let user = self.repo().read(user_id, user_id, ct).await?;
        Ok(user)
    }

    async fn find_by_name(
        &self,
        normalized_user_name: &str,
        ct: &CancellationToken,
    ) -> Result<Option<User>, IdentityError> {
        check_canceled(ct)?;
        require(normalized_user_name, "normalized_user_name")?;
        self.find_by_index(IndexKind::UserName, normalized_user_name, ct)
            .await
    }

    fn user_id(&self, user: &User, ct: &CancellationToken) -> Result<String, IdentityError> {
        check_canceled(ct)?;
        Ok(user.id.clone())
    }

    fn user_name(&self, user: &User, ct: &CancellationToken) -> Result<String, IdentityError> {
        check_canceled(ct)?;
        Ok(user.user_name.clone())
    }

    fn set_user_name(
        &self,
        user: &mut User,
        user_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(user_name, "user_name")?;
        user.user_name = user_name.to_owned();
        Ok(())
    }

    fn normalized_user_name(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<String, IdentityError> {
        check_canceled(ct)?;
        Ok(user.normalized_user_name.clone())
    }

    fn set_normalized_user_name(
        &self,
        user: &mut User,
        normalized_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(normalized_name, "normalized_name")?;
        user.normalized_user_name = normalized_name.to_owned();
        Ok(())
    }
}

impl<C: DocumentClient> UserEmailStore for DocumentUserStore<C> {
    async fn find_by_email(
        &self,
        normalized_email: &str,
        ct: &CancellationToken,
    ) -> Result<Option<User>, IdentityError> {
        check_canceled(ct)?;
        require(normalized_email, "normalized_email")?;
        self.find_by_index(IndexKind::UserEmail, normalized_email, ct)
            .await
    }

    fn email(&self, user: &User, ct: &CancellationToken) -> Result<String, IdentityError> {
        check_canceled(ct)?;
        Ok(user.email.clone())
    }

    fn set_email(
        &self,
        user: &mut User,
        email: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(email, "email")?;
        user.email = email.to_owned();
        Ok(())
    }

    fn email_confirmed(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<bool, IdentityError> {
        check_canceled(ct)?;
        Ok(user.email_confirmed)
    }

    fn set_email_confirmed(
        &self,
        user: &mut User,
        confirmed: bool,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        user.email_confirmed = confirmed;
        Ok(())
    }

    fn normalized_email(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<String, IdentityError> {
        check_canceled(ct)?;
        Ok(user.normalized_email.clone())
    }

    fn set_normalized_email(
        &self,
        user: &mut User,
        normalized_email: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(normalized_email, "normalized_email")?;
        user.normalized_email = normalized_email.to_owned();
        Ok(())
    }
}

impl<C: DocumentClient> UserPasswordStore for DocumentUserStore<C> {
    fn password_hash(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<Option<String>, IdentityError> {
        check_canceled(ct)?;
        Ok(user.password_hash.clone())
    }

    fn set_password_hash(
        &self,
        user: &mut User,
        password_hash: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(password_hash, "password_hash")?;
        user.password_hash = Some(password_hash.to_owned());
        Ok(())
    }

    fn has_password(&self, user: &User, ct: &CancellationToken) -> Result<bool, IdentityError> {
        check_canceled(ct)?;
        Ok(user.password_hash.as_deref().is_some_and(|h| !h.is_empty()))
    }
}

impl<C: DocumentClient> UserPhoneNumberStore for DocumentUserStore<C> {
    fn phone_number(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<Option<String>, IdentityError> {
        check_canceled(ct)?;
        Ok(user.phone_number.clone())
    }

    fn set_phone_number(
        &self,
        user: &mut User,
        phone_number: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(phone_number, "phone_number")?;
        user.phone_number = Some(phone_number.to_owned());
        Ok(())
    }

    fn phone_number_confirmed(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<bool, IdentityError> {
        check_canceled(ct)?;
        Ok(user.phone_number_confirmed)
    }

    fn set_phone_number_confirmed(
        &self,
        user: &mut User,
        confirmed: bool,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        user.phone_number_confirmed = confirmed;
        Ok(())
    }
}

impl<C: DocumentClient> UserLoginStore for DocumentUserStore<C> {
    async fn add_login(
        &self,
        user: &User,
        login: &LoginInfo,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        require(&login.login_provider, "login.login_provider")?;
        require(&login.provider_key, "login.provider_key")?;

        let entity = UserLogin::new(
            &user.id,
            &login.login_provider,
            &login.provider_key,
            login.provider_display_name.clone(),
        );
        let mut repo = self.repo();
        repo.add(&entity)?;
        repo.save_changes(ct).await?;
        Ok(())
    }

    async fn remove_login(
        &self,
        user: &User,
        login_provider: &str,
        provider_key: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(login_provider, "login_provider")?;
        require(provider_key, "provider_key")?;

        let mut repo = self.repo();
        let id = UserLogin::composite_id(login_provider, provider_key);
        let login: Option<UserLogin> = repo.read(&id, &id, ct).await?;
        match login {
            Some(login) if login.user_id == user.id => {
                repo.delete(&login);
                repo.save_changes(ct).await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn logins(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<Vec<LoginInfo>, IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        let uid = user.id.clone();
        let logins = self
            .repo()
            .table::<UserLogin>()
            .filter(move |l| l.user_id == uid)
            .all(ct)
            .await?;
        Ok(logins
            .into_iter()
            .map(|l| LoginInfo {
                login_provider: l.login_provider,
                provider_key: l.provider_key,
                provider_display_name: l.provider_display_name,
            })
            .collect())
    }

    async fn find_by_login(
        &self,
        login_provider: &str,
        provider_key: &str,
        ct: &CancellationToken,
    ) -> Result<Option<User>, IdentityError> {
        check_canceled(ct)?;
        require(login_provider, "login_provider")?;
        require(provider_key, "provider_key")?;

        let repo = self.repo();
        let id = UserLogin::composite_id(login_provider, provider_key);
        let login: Option<UserLogin> = repo.read(&id, &id, ct).await?;
        match login {
            Some(login) => self.find_by_id(&login.user_id, ct).await,
            None => Ok(None),
        }
    }
}

impl<C: DocumentClient> UserClaimStore for DocumentUserStore<C> {
    async fn claims(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<Vec<Claim>, IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        let uid = user.id.clone();
        let claims = self
            .repo()
            .table::<UserClaim>()
            .filter(move |c| c.user_id == uid)
            .all(ct)
            .await?;
        Ok(claims
            .into_iter()
            .map(|c| Claim {
                claim_type: c.claim_type,
                claim_value: c.claim_value,
            })
            .collect())
    }

    async fn add_claims(
        &self,
        user: &User,
        claims: &[Claim],
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        let mut repo = self.repo();
        for claim in claims {
            require(&claim.claim_type, "claim.claim_type")?;
            repo.add(&UserClaim::new(&user.id, &claim.claim_type, &claim.claim_value))?;
        }
        repo.save_changes(ct).await?;
        Ok(())
    }

    async fn replace_claim(
        &self,
        user: &User,
        claim: &Claim,
        new_claim: &Claim,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        require(&claim.claim_type, "claim.claim_type")?;
        require(&new_claim.claim_type, "new_claim.claim_type")?;

        let mut repo = self.repo();
        let uid = user.id.clone();
        let claim = claim.clone();
        let matches = repo
            .table::<UserClaim>()
            .filter(move |c| {
                c.user_id == uid
                    && c.claim_type == claim.claim_type
                    && c.claim_value == claim.claim_value
            })
            .all(ct)
            .await?;
        for mut stored in matches {
            stored.claim_type = new_claim.claim_type.clone();
            stored.claim_value = new_claim.claim_value.clone();
            repo.update(&stored)?;
        }
        repo.save_changes(ct).await?;
        Ok(())
    }

    async fn remove_claims(
        &self,
        user: &User,
        claims: &[Claim],
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;

        let mut repo = self.repo();
        for claim in claims {
            let uid = user.id.clone();
            let claim = claim.clone();
            let matches = repo
                .table::<UserClaim>()
                .filter(move |c| {
                    c.user_id == uid
                        && c.claim_type == claim.claim_type
                        && c.claim_value == claim.claim_value
                })
                .all(ct)
                .await?;
            for stored in &matches {
                repo.delete(stored);
            }
        }
        repo.save_changes(ct).await?;
        Ok(())
    }

    async fn users_for_claim(
        &self,
        claim: &Claim,
        ct: &CancellationToken,
    ) -> Result<Vec<User>, IdentityError> {
        check_canceled(ct)?;
        require(&claim.claim_type, "claim.claim_type")?;

        let repo = self.repo();
        let claim = claim.clone();
        let matches = repo
            .table::<UserClaim>()
            .filter(move |c| {
                c.claim_type == claim.claim_type && c.claim_value == claim.claim_value
            })
            .all(ct)
            .await?;

        let mut seen = std::collections::HashSet::new();
        let mut users = Vec::new();
        for claim in matches {
            if !seen.insert(claim.user_id.clone()) {
                continue;
            }
            if let Some(user) = repo.read::<User>(&claim.user_id, &claim.user_id, ct).await? {
                users.push(user);
            }
        }
        Ok(users)
    }
}

impl<C: DocumentClient> UserTokenStore for DocumentUserStore<C> {
    async fn set_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
        value: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        require(login_provider, "login_provider")?;
        require(name, "name")?;

        let mut repo = self.repo();
        let id = UserToken::composite_id(&user.id, login_provider, name);
        let existing: Option<UserToken> = repo.read(&id, &id, ct).await?;
        match existing {
            Some(mut token) => {
                token.value = value.to_owned();
                repo.update(&token)?;
            }
            None => {
                repo.add(&UserToken::new(&user.id, login_provider, name, value))?;
            }
        }
        repo.save_changes(ct).await?;
        Ok(())
    }

    async fn token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
        ct: &CancellationToken,
    ) -> Result<Option<String>, IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        require(login_provider, "login_provider")?;
        require(name, "name")?;

        let id = UserToken::composite_id(&user.id, login_provider, name);
        let token: Option<UserToken> = self.repo().read(&id, &id, ct).await?;
        Ok(token.map(|t| t.value))
    }

    async fn remove_token(
        &self,
        user: &User,
        login_provider: &str,
        name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        require(login_provider, "login_provider")?;
        require(name, "name")?;

        let mut repo = self.repo();
        let id = UserToken::composite_id(&user.id, login_provider, name);
        let token: Option<UserToken> = repo.read(&id, &id, ct).await?;
        if let Some(token) = token {
            repo.delete(&token);
            repo.save_changes(ct).await?;
        }
        Ok(())
    }
}

impl<C: DocumentClient> UserRoleStore for DocumentUserStore<C> {
    async fn add_to_role(
        &self,
        user: &User,
        normalized_role_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        require(normalized_role_name, "normalized_role_name")?;

        let mut repo = self.repo();
        let role = find_role_by_name(&repo, normalized_role_name, ct)
            .await?
            .ok_or_else(|| IdentityError::RoleNotFound(normalized_role_name.to_owned()))?;

        let id = UserRole::composite_id(&user.id, &role.id);
        let existing: Option<UserRole> = repo.read(&id, &id, ct).await?;
        if existing.is_some() {
            return Ok(());
        }
        repo.add(&UserRole::new(&user.id, &role.id))?;
        repo.save_changes(ct).await?;
        Ok(())
    }

    async fn remove_from_role(
        &self,
        user: &User,
        normalized_role_name: &str,
        ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        require(normalized_role_name, "normalized_role_name")?;

        let mut repo = self.repo();
        let role = find_role_by_name(&repo, normalized_role_name, ct)
            .await?
            .ok_or_else(|| IdentityError::RoleNotFound(normalized_role_name.to_owned()))?;

        let id = UserRole::composite_id(&user.id, &role.id);
        let membership: Option<UserRole> = repo.read(&id, &id, ct).await?;
        if let Some(membership) = membership {
            repo.delete(&membership);
            repo.save_changes(ct).await?;
        }
        Ok(())
    }

    async fn roles(
        &self,
        user: &User,
        ct: &CancellationToken,
    ) -> Result<Vec<String>, IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;

        let repo = self.repo();
        let uid = user.id.clone();
        let memberships = repo
            .table::<UserRole>()
            .filter(move |m| m.user_id == uid)
            .all(ct)
            .await?;

        let mut names = Vec::with_capacity(memberships.len());
        for membership in memberships {
            if let Some(role) = repo
                .read::<tessera_model::Role>(&membership.role_id, &membership.role_id, ct)
                .await?
            {
                names.push(role.name);
            }
        }
        Ok(names)
    }

    async fn is_in_role(
        &self,
        user: &User,
        normalized_role_name: &str,
        ct: &CancellationToken,
    ) -> Result<bool, IdentityError> {
        check_canceled(ct)?;
        require(&user.id, "user.id")?;
        require(normalized_role_name, "normalized_role_name")?;

        let repo = self.repo();
        let Some(role) = find_role_by_name(&repo, normalized_role_name, ct).await? else {
            return Ok(false);
        };
        let id = UserRole::composite_id(&user.id, &role.id);
        let membership: Option<UserRole> = repo.read(&id, &id, ct).await?;
        Ok(membership.is_some())
    }

    async fn users_in_role(
        &self,
        normalized_role_name: &str,
        ct: &CancellationToken,
    ) -> Result<Vec<User>, IdentityError> {
        check_canceled(ct)?;
        require(normalized_role_name, "normalized_role_name")?;

        let repo = self.repo();
        let Some(role) = find_role_by_name(&repo, normalized_role_name, ct).await? else {
            return Ok(vec![]);
        };
        let role_id = role.id.clone();
        let memberships = repo
            .table::<UserRole>()
            .filter(move |m| m.role_id == role_id)
            .all(ct)
            .await?;

        let mut users = Vec::with_capacity(memberships.len());
        for membership in memberships {
            if let Some(user) = repo
                .read::<User>(&membership.user_id, &membership.user_id, ct)
                .await?
            {
                users.push(user);
            }
        }
        Ok(users)
    }
}

impl<C: DocumentClient> UserTwoFactorStore for DocumentUserStore<C> {
    fn two_factor_enabled(
        &self,
        _user: &User,
        _ct: &CancellationToken,
    ) -> Result<bool, IdentityError> {
        Err(IdentityError::Unsupported {
            operation: "two_factor_enabled",
        })
    }

    fn set_two_factor_enabled(
        &self,
        _user: &mut User,
        _enabled: bool,
        _ct: &CancellationToken,
    ) -> Result<(), IdentityError> {
        Err(IdentityError::Unsupported {
            operation: "set_two_factor_enabled",
        })
    }
}
