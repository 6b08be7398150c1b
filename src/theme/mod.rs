use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Two-valued display preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme mode: {input:?} (expected \"light\" or \"dark\")")]
pub struct ParseThemeModeError {
    pub input: String,
}

impl ThemeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub const fn from_prefers_dark(prefers_dark: bool) -> Self {
        if prefers_dark {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, ThemeMode::Dark)
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = ParseThemeModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(ParseThemeModeError {
                input: s.to_string(),
            }),
        }
    }
}

/// Picks the mode to apply at startup.
///
/// A persisted value always wins. Without one, the ambient signal decides when
/// auto-detection is on, and `fallback` decides otherwise.
pub fn resolve_initial_mode(
    persisted: Option<ThemeMode>,
    auto_detect: bool,
    ambient_prefers_dark: bool,
    fallback: ThemeMode,
) -> ThemeMode {
    if let Some(mode) = persisted {
        return mode;
    }
    if auto_detect {
        return ThemeMode::from_prefers_dark(ambient_prefers_dark);
    }
    fallback
}

/// Reads a raw stored value; anything that is not a known mode counts as absent.
pub fn parse_persisted_mode(raw: Option<&str>) -> Option<ThemeMode> {
    let raw = raw?;
    match raw.parse::<ThemeMode>() {
        Ok(mode) => Some(mode),
        Err(err) => {
            tracing::warn!(%err, "ignoring unrecognised persisted theme mode");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_mode_wins_over_ambient_and_fallback() {
        for auto_detect in [true, false] {
            for ambient in [true, false] {
                for fallback in [ThemeMode::Light, ThemeMode::Dark] {
                    assert_eq!(
                        resolve_initial_mode(Some(ThemeMode::Dark), auto_detect, ambient, fallback),
                        ThemeMode::Dark
                    );
                    assert_eq!(
                        resolve_initial_mode(Some(ThemeMode::Light), auto_detect, ambient, fallback),
                        ThemeMode::Light
                    );
                }
            }
        }
    }

    #[test]
    fn auto_detect_follows_ambient_signal_when_nothing_persisted() {
        assert_eq!(
            resolve_initial_mode(None, true, true, ThemeMode::Light),
            ThemeMode::Dark
        );
        assert_eq!(
            resolve_initial_mode(None, true, false, ThemeMode::Dark),
            ThemeMode::Light
        );
    }

    #[test]
    fn fallback_used_when_auto_detect_disabled() {
        assert_eq!(
            resolve_initial_mode(None, false, true, ThemeMode::Light),
            ThemeMode::Light
        );
        assert_eq!(
            resolve_initial_mode(None, false, false, ThemeMode::Dark),
            ThemeMode::Dark
        );
    }

    #[test]
    fn toggled_is_an_involution() {
        for mode in [ThemeMode::Light, ThemeMode::Dark] {
            assert_ne!(mode.toggled(), mode);
            assert_eq!(mode.toggled().toggled(), mode);
        }
    }

    #[test]
    fn parse_accepts_known_modes_case_insensitively() {
        assert_eq!(" Dark ".parse::<ThemeMode>(), Ok(ThemeMode::Dark));
        assert_eq!("LIGHT".parse::<ThemeMode>(), Ok(ThemeMode::Light));

        let err = "system".parse::<ThemeMode>().unwrap_err();
        assert_eq!(err.input, "system");
    }

    #[test]
    fn parse_persisted_mode_drops_unknown_values() {
        assert_eq!(parse_persisted_mode(Some("dark")), Some(ThemeMode::Dark));
        assert_eq!(parse_persisted_mode(Some("sepia")), None);
        assert_eq!(parse_persisted_mode(Some("")), None);
        assert_eq!(parse_persisted_mode(None), None);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&ThemeMode::Dark).unwrap(),
            "\"dark\""
        );
        let mode: ThemeMode = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(mode, ThemeMode::Light);
        assert_eq!(ThemeMode::Dark.to_string(), "dark");
    }
}
