use std::collections::HashMap;

use tessera_model::ContainerKind;

const ALL_KINDS: [ContainerKind; 9] = [
    ContainerKind::Users,
    ContainerKind::Roles,
    ContainerKind::UserRoles,
    ContainerKind::UserLogins,
    ContainerKind::UserClaims,
    ContainerKind::UserTokens,
    ContainerKind::PersistedGrants,
    ContainerKind::DeviceFlowCodes,
    ContainerKind::Index,
];

/// Store configuration: logical database name and the container name for
/// each entity family.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Logical database holding all identity containers (default
    /// "identity"). Env var: `TESSERA_DATABASE`.
    pub database: String,
    containers: HashMap<ContainerKind, String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::with_prefix("identity", None)
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_prefix(database: &str, prefix: Option<&str>) -> Self {
        let containers = ALL_KINDS
            .into_iter()
            .map(|kind| {
                let name = match prefix {
                    Some(prefix) => format!(
                        "{prefix}{}",
                        kind.default_name().trim_start_matches("identity")
                    ),
                    None => kind.default_name().to_owned(),
                };
                (kind, name)
            })
            .collect();
        Self {
            database: database.to_owned(),
            containers,
        }
    }

    /// Load from environment variables. `TESSERA_CONTAINER_PREFIX`
    /// replaces the default `identity` prefix on every container name.
    pub fn from_env() -> Self {
        let database = std::env::var("TESSERA_DATABASE").unwrap_or_else(|_| "identity".to_owned());
        let prefix = std::env::var("TESSERA_CONTAINER_PREFIX").ok();
        Self::with_prefix(&database, prefix.as_deref())
    }

    /// Override one container name.
    pub fn with_container(mut self, kind: ContainerKind, name: impl Into<String>) -> Self {
        self.containers.insert(kind, name.into());
        self
    }

    pub fn container_name(&self, kind: ContainerKind) -> &str {
        self.containers
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_name())
    }
}
