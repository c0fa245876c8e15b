//! Entity records and container/partition mapping for the tessera store.
//!
//! This crate contains only plain serde records and the mapping trait;
//! no I/O. Import in store and adapter layers.

pub mod container;
pub mod device_flow_codes;
pub mod index_entries;
pub mod persisted_grants;
pub mod roles;
pub mod user_claims;
pub mod user_logins;
pub mod user_roles;
pub mod user_tokens;
pub mod users;

pub use container::{ContainerKind, DocumentEntity, normalize};
pub use device_flow_codes::DeviceFlowCode;
pub use index_entries::{IndexEntry, IndexKind};
pub use persisted_grants::PersistedGrant;
pub use roles::Role;
pub use user_claims::UserClaim;
pub use user_logins::UserLogin;
pub use user_roles::UserRole;
pub use user_tokens::UserToken;
pub use users::User;
