//! Fixture builders for identity entities.

use chrono::Utc;
use uuid::Uuid;

use tessera_model::{DeviceFlowCode, PersistedGrant, Role, User};

pub fn test_user() -> User {
    User::new("alice", "alice@example.com")
}

pub fn test_user_named(name: &str) -> User {
    User::new(name, format!("{name}@example.com"))
}

pub fn test_role() -> Role {
    Role::new("admin")
}

pub fn test_role_named(name: &str) -> Role {
    Role::new(name)
}

pub fn test_grant(key: &str) -> PersistedGrant {
    PersistedGrant {
        key: key.to_owned(),
        grant_type: "refresh_token".to_owned(),
        subject_id: Some(Uuid::now_v7().to_string()),
        session_id: Some("session-1".to_owned()),
        client_id: "spa-client".to_owned(),
        description: None,
        creation_time: Utc::now(),
        expiration: Some(Utc::now() + chrono::Duration::days(30)),
        consumed_time: None,
        data: "{}".to_owned(),
        concurrency_stamp: None,
    }
}

pub fn test_device_code(device_code: &str, session_id: &str) -> DeviceFlowCode {
    DeviceFlowCode {
        device_code: device_code.to_owned(),
        user_code: "ABCD-EFGH".to_owned(),
        subject_id: None,
        session_id: session_id.to_owned(),
        client_id: "tv-client".to_owned(),
        description: None,
        creation_time: Utc::now(),
        expiration: Utc::now() + chrono::Duration::minutes(5),
        data: "{}".to_owned(),
        concurrency_stamp: None,
    }
}
