use shared_types::{AppConfig, FeatureFlags};
use std::sync::OnceLock;

static FLAGS: OnceLock<FeatureFlags> = OnceLock::new();

/// Default config file path, relative to the working directory.
/// Overridden with `CHAKSHI_CONFIG`.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn config_path() -> String {
    std::env::var("CHAKSHI_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Parse feature flags from TOML text. Unparseable input yields all-off flags.
pub fn parse_feature_flags(contents: &str) -> FeatureFlags {
    match toml::from_str::<AppConfig>(contents) {
        Ok(config) => config.features,
        Err(e) => {
            tracing::warn!(error = %e, "failed to parse feature flags, defaulting all off");
            FeatureFlags::default()
        }
    }
}

/// Read the config file and store the flags in the global `OnceLock`.
/// Only the first call has effect.
///
/// If the file is missing or unparseable, all flags default to `false`.
pub fn load_feature_flags() -> &'static FeatureFlags {
    FLAGS.get_or_init(|| {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let flags = parse_feature_flags(&contents);
                tracing::info!(?flags, path = %path, "feature flags loaded");
                flags
            }
            Err(e) => {
                tracing::info!(path = %path, error = %e, "config file not found, defaulting all flags off");
                FeatureFlags::default()
            }
        }
    })
}

/// Get the loaded feature flags. Returns all-false defaults if
/// `load_feature_flags()` hasn't been called yet.
pub fn feature_flags() -> &'static FeatureFlags {
    static DEFAULT: FeatureFlags = FeatureFlags {
        storage: false,
        payments: false,
        telemetry: false,
        rate_limit: false,
    };
    FLAGS.get().unwrap_or(&DEFAULT)
}

/// Read an env var, trying the primary name first then a fallback.
pub fn env_or(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .ok()
        .or_else(|| std::env::var(fallback).ok())
}

/// Read a non-empty env var.
pub fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Largest accepted document upload, in bytes (`MAX_UPLOAD_BYTES`, default 10 MiB).
pub fn max_upload_bytes() -> usize {
    std::env::var("MAX_UPLOAD_BYTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10 * 1024 * 1024)
}

/// Address to bind, from `HOST` and the given port variable.
pub fn bind_addr(port_var: &str, default_port: u16) -> String {
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var(port_var)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(default_port);
    format!("{host}:{port}")
}
