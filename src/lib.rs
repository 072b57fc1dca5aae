// luogu-badges library.
// Refreshes cached Luogu statistics and rewrites README badge blocks.

pub mod badge;
pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod images;
pub mod luogu;
pub mod progress;
pub mod updater;

pub use config::AppConfig;
pub use error::{BadgeError, Result};
pub use updater::{RefreshOutcome, RunSummary, Updater};
