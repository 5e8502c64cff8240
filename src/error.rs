use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared across the crate.
///
/// `MissingApiKey` is the only fatal kind: it aborts startup before any
/// terminal setup. Everything else is recovered at the controller boundary
/// (TUI notice) or reported on exit (one-shot mode).
#[derive(Debug, Error)]
pub enum Error {
    // ───────────────────────── Startup ─────────────────────────
    #[error(
        "GEMINI_API_KEY is not set and no \"api_key\" is configured in {}",
        config_path.display()
    )]
    MissingApiKey { config_path: PathBuf },

    // ──────────────────────── Validation ───────────────────────
    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Prompt is {len} characters, over the {limit} character limit")]
    PromptTooLong { len: usize, limit: usize },

    // ──────────────────────── Generation ───────────────────────
    #[error("Generation failed: {message}")]
    Generation { message: String },

    // ─────────────────────── Side effects ──────────────────────
    #[error("Clipboard error: {message}")]
    Clipboard { message: String },

    #[error("Config error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn generation(message: impl Into<String>) -> Self {
        Error::Generation {
            message: message.into(),
        }
    }

    pub fn clipboard(message: impl Into<String>) -> Self {
        Error::Clipboard {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    pub fn prompt_too_long(len: usize, limit: usize) -> Self {
        Error::PromptTooLong { len, limit }
    }

    /// Fatal errors end the process before the terminal is touched.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::MissingApiKey { .. })
    }

    /// Validation errors never reach the network.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::EmptyPrompt | Error::PromptTooLong { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::generation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_display_names_both_sources() {
        let err = Error::MissingApiKey {
            config_path: PathBuf::from("/home/u/.config/prdgen/config.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("GEMINI_API_KEY"));
        assert!(msg.contains("/home/u/.config/prdgen/config.json"));
    }

    #[test]
    fn test_generation_display_carries_cause() {
        let err = Error::generation("status 429: quota exceeded");
        assert_eq!(
            err.to_string(),
            "Generation failed: status 429: quota exceeded"
        );
    }

    #[test]
    fn test_prompt_too_long_display() {
        let err = Error::prompt_too_long(512, 500);
        assert_eq!(
            err.to_string(),
            "Prompt is 512 characters, over the 500 character limit"
        );
    }

    #[test]
    fn test_only_missing_key_is_fatal() {
        assert!(Error::MissingApiKey {
            config_path: PathBuf::new()
        }
        .is_fatal());
        assert!(!Error::EmptyPrompt.is_fatal());
        assert!(!Error::generation("boom").is_fatal());
        assert!(!Error::clipboard("no display").is_fatal());
    }

    #[test]
    fn test_validation_split() {
        assert!(Error::EmptyPrompt.is_validation());
        assert!(Error::prompt_too_long(501, 500).is_validation());
        assert!(!Error::generation("boom").is_validation());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
