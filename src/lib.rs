pub mod app;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod gemini;
pub mod handler;
pub mod logging;
pub mod tui;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
pub use gemini::{ChatSession, Content, GeminiClient};
