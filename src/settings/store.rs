use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::settings::types::Settings;

/// Overrides the configured detection endpoint.
pub const API_URL_ENV: &str = "DOC_CAPTURE_API_URL";
/// Overrides the configured license identifier.
pub const LICENSE_ID_ENV: &str = "DOC_CAPTURE_LICENSE_ID";

/// Default settings location: `<config dir>/doc-capture/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("doc-capture").join("settings.json"))
}

/// Load settings from a JSON file, returning default on missing file.
pub fn load(path: &Path) -> Result<Settings, String> {
    if !path.exists() {
        debug!(path = %path.display(), "No settings file, using defaults");
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&contents).map_err(|e| format!("{}: {e}", path.display()))
}

/// Load settings and apply environment overrides on top.
pub fn load_with_env(path: &Path) -> Result<Settings, String> {
    let mut settings = load(path)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

/// Apply overrides from `lookup` (normally the process environment).
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
        info!("Detection endpoint overridden by {API_URL_ENV}");
        settings.service.api_url = url;
    }
    if let Some(license) = lookup(LICENSE_ID_ENV).filter(|v| !v.is_empty()) {
        settings.service.license_id = license;
    }
}

/// Save settings to disk atomically (write .tmp then rename).
pub fn save(path: &Path, settings: &Settings) -> Result<(), String> {
    let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json).map_err(|e| e.to_string())?;
    std::fs::rename(&tmp_path, path).map_err(|e| e.to_string())?;

    Ok(())
}
