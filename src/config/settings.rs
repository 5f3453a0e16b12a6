//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files. Every section is
//! `#[serde(default)]`, so a partial `settings.toml` fills the gaps from
//! the defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// CompletionConfig
// ---------------------------------------------------------------------------

/// Connection settings for the OpenAI-compatible completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Base URL of the API endpoint (without `/v1/...`).
    pub base_url: String,
    /// Model identifier sent to the API.
    pub model: String,
    /// Fallback API key used by the CLI when none is given on the command
    /// line or in the environment.
    pub api_key: Option<String>,
    /// HTTP client timeout. `None` leaves the transport default in place.
    pub timeout_secs: Option<u64>,
    /// Sampling temperature. `None` lets the provider pick its default.
    pub temperature: Option<f32>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            model: "gpt-4".into(),
            api_key: None,
            timeout_secs: None,
            temperature: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ScorePolicy
// ---------------------------------------------------------------------------

/// How strictly decoded reports are checked.
///
/// | Variant | Shape checked | Scores must be within 1–10 |
/// |---------|---------------|----------------------------|
/// | Strict  | Yes           | Yes                        |
/// | Lenient | Yes           | No                         |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScorePolicy {
    #[default]
    Strict,
    Lenient,
}

// ---------------------------------------------------------------------------
// AuditConfig
// ---------------------------------------------------------------------------

/// Settings for the audit engine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Largest accepted transcript, in bytes.
    pub max_transcript_bytes: usize,
    /// Validation applied to decoded reports.
    pub score_policy: ScorePolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_transcript_bytes: 16 * 1024 * 1024,
            score_policy: ScorePolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use call_audit::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// println!("{}", config.completion.model);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Completion service connection settings.
    pub completion: CompletionConfig,
    /// Audit engine settings.
    pub audit: AuditConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
