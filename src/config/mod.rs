use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::theme::ThemeMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

pub(crate) const APP_DIR: &str = "themekeeper";
const APP_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_STORAGE_KEY: &str = "theme";

/// Invoked synchronously after every mode application.
pub type ModeChangeCallback = Arc<dyn Fn(ThemeMode) + Send + Sync>;

/// Caller-facing configuration; every field is optional.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThemeOptions {
    pub auto_detect: Option<bool>,
    pub default_mode: Option<ThemeMode>,
    pub storage_key: Option<String>,
    #[serde(skip)]
    pub on_mode_change: Option<ModeChangeCallback>,
}

impl ThemeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_detect(mut self, auto_detect: bool) -> Self {
        self.auto_detect = Some(auto_detect);
        self
    }

    pub fn with_default_mode(mut self, mode: ThemeMode) -> Self {
        self.default_mode = Some(mode);
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    pub fn with_on_mode_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(ThemeMode) + Send + Sync + 'static,
    {
        self.on_mode_change = Some(Arc::new(callback));
        self
    }

    /// Fills every missing field with its default.
    pub fn resolve(self) -> ThemeConfig {
        let storage_key = self
            .storage_key
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        ThemeConfig {
            auto_detect: self.auto_detect.unwrap_or(true),
            default_mode: self.default_mode.unwrap_or(ThemeMode::Light),
            storage_key,
            on_mode_change: self.on_mode_change.unwrap_or_else(ignore_mode_change),
        }
    }
}

fn ignore_mode_change() -> ModeChangeCallback {
    Arc::new(|_: ThemeMode| {})
}

impl fmt::Debug for ThemeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeOptions")
            .field("auto_detect", &self.auto_detect)
            .field("default_mode", &self.default_mode)
            .field("storage_key", &self.storage_key)
            .field("on_mode_change", &self.on_mode_change.is_some())
            .finish()
    }
}

/// Fully-defaulted configuration, fixed for the lifetime of a manager.
#[derive(Clone)]
pub struct ThemeConfig {
    auto_detect: bool,
    default_mode: ThemeMode,
    storage_key: String,
    on_mode_change: ModeChangeCallback,
}

impl ThemeConfig {
    pub fn auto_detect(&self) -> bool {
        self.auto_detect
    }

    pub fn default_mode(&self) -> ThemeMode {
        self.default_mode
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub(crate) fn notify_mode_change(&self, mode: ThemeMode) {
        (self.on_mode_change)(mode);
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        ThemeOptions::default().resolve()
    }
}

impl fmt::Debug for ThemeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeConfig")
            .field("auto_detect", &self.auto_detect)
            .field("default_mode", &self.default_mode)
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

/// Loads `config.json` from the XDG config directory, falling back to defaults.
pub fn load_theme_options() -> ThemeOptions {
    let (xdg_config_home, home) = config_env_dirs();
    load_theme_options_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_theme_options_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ThemeOptions {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return ThemeOptions::default(),
    };
    if !path.exists() {
        return ThemeOptions::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            ThemeOptions::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            ThemeOptions::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    static NEXT_ROOT: AtomicUsize = AtomicUsize::new(0);

    fn with_temp_root<F: FnOnce(&Path)>(f: F) {
        let mut root = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let seq = NEXT_ROOT.fetch_add(1, Ordering::Relaxed);
        root.push(format!("themekeeper-config-{}-{nanos}-{seq}", std::process::id()));
        fs::create_dir_all(&root).unwrap();
        f(&root);
        let _ = fs::remove_dir_all(&root);
    }

    fn write_config(root: &Path, contents: &str) {
        let path = app_config_path(APP_DIR, APP_CONFIG_FILE, Some(root), None).unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "themekeeper",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/config-root/themekeeper/config.json")
        );
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("themekeeper", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/themekeeper/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("themekeeper", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn resolve_fills_documented_defaults() {
        let config = ThemeOptions::new().resolve();
        assert!(config.auto_detect());
        assert_eq!(config.default_mode(), ThemeMode::Light);
        assert_eq!(config.storage_key(), "theme");
        config.notify_mode_change(ThemeMode::Dark);
    }

    #[test]
    fn resolve_keeps_explicit_values_and_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = ThemeOptions::new()
            .with_auto_detect(false)
            .with_default_mode(ThemeMode::Dark)
            .with_storage_key("site-theme")
            .with_on_mode_change(move |mode| sink.lock().unwrap().push(mode))
            .resolve();

        assert!(!config.auto_detect());
        assert_eq!(config.default_mode(), ThemeMode::Dark);
        assert_eq!(config.storage_key(), "site-theme");

        config.notify_mode_change(ThemeMode::Light);
        assert_eq!(*seen.lock().unwrap(), vec![ThemeMode::Light]);
    }

    #[test]
    fn blank_storage_key_falls_back_to_default() {
        let config = ThemeOptions::new().with_storage_key("  ").resolve();
        assert_eq!(config.storage_key(), DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn load_defaults_when_file_missing() {
        with_temp_root(|root| {
            let options = load_theme_options_with(Some(root), None);
            assert!(options.auto_detect.is_none());
            assert!(options.default_mode.is_none());
            assert!(options.storage_key.is_none());
        });
    }

    #[test]
    fn load_parses_partial_config() {
        with_temp_root(|root| {
            write_config(root, r#"{ "auto_detect": false, "default_mode": "dark" }"#);

            let config = load_theme_options_with(Some(root), None).resolve();
            assert!(!config.auto_detect());
            assert_eq!(config.default_mode(), ThemeMode::Dark);
            assert_eq!(config.storage_key(), "theme");
        });
    }

    #[test]
    fn load_falls_back_to_defaults_on_invalid_payload() {
        with_temp_root(|root| {
            write_config(root, "{ invalid ");

            let options = load_theme_options_with(Some(root), None);
            assert!(options.default_mode.is_none());
        });
    }
}
