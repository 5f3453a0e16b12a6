//! Configuration module for Call Audit.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the completion
//! service and the audit engine, `AppPaths` for the cross-platform config
//! directory, and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AuditConfig, CompletionConfig, ScorePolicy};
