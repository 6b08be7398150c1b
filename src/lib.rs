//! Light/dark mode preference manager.
//!
//! A single [`ThemeManager`] per process decides which mode to present,
//! persists it, mirrors it onto the document root as `data-theme`, and keeps
//! following the system preference until it is destroyed. Host environments
//! plug in through the traits in [`host`].

use std::sync::Arc;

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod manager;
pub mod selector;
pub mod signal;
pub mod storage;
pub mod theme;

pub use config::{ThemeConfig, ThemeOptions};
pub use error::{AppError, AppResult, BindError, BindResult};
pub use host::Host;
pub use manager::{init, instance, ManagerSlot, ThemeManager, THEME_ATTRIBUTE};
pub use signal::RevocationToken;
pub use theme::{resolve_initial_mode, ThemeMode};

/// Entrypoint used by the command-line binary.
///
/// Persists to the XDG state file, follows the OS color scheme, and marks a
/// headless document.
pub fn run<I, S>(args: I) -> AppResult<ThemeMode>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    logging::init();
    let command = cli::Command::parse(args)?;
    let options = config::load_theme_options();
    let store = storage::FileStore::with_default_path()?;
    tracing::debug!(path = %store.path().display(), "using state file");
    let host = Host::new(
        Arc::new(store),
        Arc::new(host::SystemAmbient::new()),
        Arc::new(host::MemoryDocument::new()),
    );

    let manager = init(host, options);
    let mode = cli::execute(&manager, command);
    manager.destroy();
    Ok(mode)
}
