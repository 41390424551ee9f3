//! Persisted AI-provider settings.
//!
//! A single JSON record `{apiKeys, activeAiProvider}` stored at
//! `~/.config/literature-assistant/doc-assistant.settings.json` (or under
//! `$XDG_CONFIG_HOME`). Loading is best-effort and every change rewrites the
//! file. Write failures are reported as a [`PersistOutcome`] and logged,
//! never returned as errors.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Directory name under the user config directory.
pub const APP_DIR_NAME: &str = "literature-assistant";

/// Namespace of the settings record; the file is `<namespace>.json`.
pub const SETTINGS_NAMESPACE: &str = "doc-assistant.settings";

/// Provider credentials and the provider currently in use.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Provider name to API key.
    pub api_keys: BTreeMap<String, String>,
    /// Empty when no provider is active.
    pub active_ai_provider: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted: BTreeMap<&str, &str> = self
            .api_keys
            .keys()
            .map(|provider| (provider.as_str(), "<redacted>"))
            .collect();
        f.debug_struct("Settings")
            .field("api_keys", &redacted)
            .field("active_ai_provider", &self.active_ai_provider)
            .finish()
    }
}

/// Result of writing settings to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved(PathBuf),
    /// The operation changed nothing, so nothing was written.
    Unchanged,
    Failed { path: PathBuf, reason: String },
}

impl PersistOutcome {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// Settings bound to a file.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Opens the settings file in `dir`. A missing or unreadable file yields defaults.
    #[must_use]
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(format!("{SETTINGS_NAMESPACE}.json"));
        let settings = load(&path);
        Self { path, settings }
    }

    /// Opens the settings file in the default config directory.
    ///
    /// Returns `None` when neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[must_use]
    pub fn open_default() -> Option<Self> {
        default_config_dir().map(|dir| Self::open(&dir))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Stores `key` for `provider`. An empty provider is ignored.
    pub fn set_api_key(&mut self, provider: &str, key: &str) -> PersistOutcome {
        if provider.is_empty() {
            return PersistOutcome::Unchanged;
        }
        self.settings
            .api_keys
            .insert(provider.to_string(), key.to_string());
        self.save()
    }

    /// Removes `provider`'s key, deactivating it if it was the active provider.
    pub fn remove_api_key(&mut self, provider: &str) -> PersistOutcome {
        if provider.is_empty() {
            return PersistOutcome::Unchanged;
        }
        let removed = self.settings.api_keys.remove(provider).is_some();
        let was_active = self.settings.active_ai_provider == provider;
        if was_active {
            self.settings.active_ai_provider.clear();
        }
        if removed || was_active {
            self.save()
        } else {
            PersistOutcome::Unchanged
        }
    }

    /// Makes `provider` active; an empty string deactivates.
    pub fn set_active_provider(&mut self, provider: &str) -> PersistOutcome {
        if self.settings.active_ai_provider == provider {
            return PersistOutcome::Unchanged;
        }
        self.settings.active_ai_provider = provider.to_string();
        self.save()
    }

    /// The active provider's key, or an empty string.
    #[must_use]
    pub fn active_key(&self) -> &str {
        if self.settings.active_ai_provider.is_empty() {
            return "";
        }
        self.settings
            .api_keys
            .get(&self.settings.active_ai_provider)
            .map_or("", String::as_str)
    }

    /// Provider names with a stored key.
    #[must_use]
    pub fn list_providers(&self) -> Vec<&str> {
        self.settings.api_keys.keys().map(String::as_str).collect()
    }

    fn save(&self) -> PersistOutcome {
        match write_settings(&self.path, &self.settings) {
            Ok(()) => {
                debug!(path = %self.path.display(), "settings saved");
                PersistOutcome::Saved(self.path.clone())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to save settings");
                PersistOutcome::Failed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// The per-user config directory: `$XDG_CONFIG_HOME/literature-assistant`,
/// else `$HOME/.config/literature-assistant`.
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    resolve_config_dir(
        sanitize_env_path(env::var_os("XDG_CONFIG_HOME")),
        sanitize_env_path(env::var_os("HOME")),
    )
}

fn sanitize_env_path(value: Option<OsString>) -> Option<PathBuf> {
    let value = value?;
    if value.to_string_lossy().trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(value))
}

fn resolve_config_dir(xdg_config_home: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(xdg) = xdg_config_home {
        return Some(xdg.join(APP_DIR_NAME));
    }
    home.map(|home| home.join(".config").join(APP_DIR_NAME))
}

fn load(path: &Path) -> Settings {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read settings; using defaults");
            return Settings::default();
        }
    };
    serde_json::from_slice(&raw).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
        Settings::default()
    })
}

fn write_settings(path: &Path, settings: &Settings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(settings)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    set_owner_only_permissions(&tmp)?;
    fs::rename(&tmp, path)
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
