// Blog comments - comment entity, validation, privacy rules and HTTP resource

// Ent Framework - schema mapping, validation runner and privacy rules
pub mod ent_framework;

// Core types and primitives
pub mod core;

// Blog entities - plain data records
pub mod entities;

// Schema Definitions - table and API mapping per entity
pub mod schemas;

// Infrastructure - storage backends and request viewer
pub mod infrastructure;

// HTTP resource for comments
pub mod comment_interface;

// Common utilities
pub mod app_state;
pub mod config;
pub mod data_seeder;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
