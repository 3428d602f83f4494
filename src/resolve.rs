//! Settings resolution: merge all layers and produce a typed [`Settings`].
//!
//! Operates on pre-loaded data (`SettingsInput`) with no I/O, so the whole
//! pipeline is testable with synthetic inputs:
//!
//! 1. Validate each file (if strict mode)
//! 2. Parse and deep-merge settings files (later overrides earlier)
//! 3. Deep-merge env vars on top
//! 4. Deserialize the merged table into the settings layer
//! 5. Let confique fill defaults and validate required fields

use std::path::PathBuf;

use confique::Config;
use toml::{Table, Value};

use crate::env;
use crate::error::EncfigError;
use crate::settings::Settings;
use crate::validate;

type SettingsLayer = <Settings as Config>::Layer;

/// All pre-loaded data needed to resolve settings. No I/O happens here.
pub struct SettingsInput {
    /// File contents in precedence order: first = lowest priority, last = highest.
    pub files: Vec<(PathBuf, String)>,
    /// Raw environment variable pairs.
    pub env_vars: Vec<(String, String)>,
    /// Env var prefix (e.g. `"ENCFIG"`). `None` means env disabled.
    pub env_prefix: Option<String>,
    /// Whether to reject unknown keys in settings files.
    pub strict: bool,
}

pub fn resolve(input: SettingsInput) -> Result<Settings, EncfigError> {
    let mut merged = Table::new();
    for (path, content) in &input.files {
        if input.strict {
            validate::validate_unknown_keys(content, path)?;
        }
        let table: Table = toml::from_str(content).map_err(|e| EncfigError::SettingsParse {
            path: path.clone(),
            source: e,
        })?;
        merged = deep_merge(merged, table);
    }

    if let Some(prefix) = &input.env_prefix {
        let env_table = env::env_to_table(prefix, input.env_vars);
        merged = deep_merge(merged, env_table);
    }

    let layer: SettingsLayer =
        Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| EncfigError::InvalidValue {
                key: "<merged>".into(),
                reason: e.to_string(),
            })?;

    Settings::builder()
        .preloaded(layer)
        .load()
        .map_err(EncfigError::from)
}

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a table for the same key, recurse; otherwise `overlay` wins.
fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        let merged = match (base.remove(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                Value::Table(deep_merge(base_tbl, overlay_tbl))
            }
            (_, overlay_val) => overlay_val,
        };
        base.insert(key, merged);
    }
    base
}
