//! Application services layer scaffolding.

pub mod auth;
pub mod cache;
pub mod error;
pub mod repos;
pub mod todos;
