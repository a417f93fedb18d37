use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TodoCreateRequest {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TodoUpdateRequest {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub completed: bool,
}
