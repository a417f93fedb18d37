//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};

/// A registered account. Carries the Argon2 PHC hash of the password, so the
/// record is deliberately not serializable; only explicit response types
/// leave the process.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// A single to-do item owned by one user. Doubles as the cache payload, so
/// it derives serde in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub id: i64,
    pub task: String,
    pub completed: bool,
    pub user_id: i64,
}
