//! Completion-service access for Call Audit.
//!
//! This module provides:
//! * [`CompletionService`]: async trait implemented by all completion backends.
//! * [`OpenAiCompletion`]: OpenAI-compatible chat-completions backend.
//! * [`CompletionRequest`]: system + user instruction pair plus output directive.
//! * [`Credential`]: per-call API key, redacted from debug output.
//! * [`CompletionError`]: error variants for completion calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use call_audit::config::AppConfig;
//! use call_audit::llm::{CompletionRequest, CompletionService, Credential, OpenAiCompletion};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let service = OpenAiCompletion::from_config(&config.completion);
//!
//!     let request = CompletionRequest::json("You are terse.", "Reply with {\"ok\": true}");
//!     let raw = service
//!         .complete(&request, &Credential::new("sk-..."))
//!         .await
//!         .unwrap();
//!     println!("{raw}");
//! }
//! ```

pub mod completion;
pub mod credential;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use completion::{CompletionError, CompletionRequest, CompletionService, OpenAiCompletion};
pub use credential::Credential;
