//! Identity store adapters over the partitioned document store.
//!
//! Translates identity-framework operations (user, role, login, claim,
//! token management) into staged repository mutations, maintaining the
//! secondary lookup index and the cascade/orphan policy along the way.

pub mod error;
pub mod reconcile;
pub mod stores;

pub use error::IdentityError;
pub use reconcile::{ReconcileReport, Reconciler};
pub use stores::role::DocumentRoleStore;
pub use stores::user::DocumentUserStore;
