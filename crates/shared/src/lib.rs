//! Shared types, errors, and configuration for FinWise.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - JWT claims and token service
//! - Auth request/response payloads
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
