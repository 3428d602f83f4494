use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why the encryption service refused or failed a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionFailureKind {
    AccessDenied,
    Unavailable,
}

impl fmt::Display for EncryptionFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionFailureKind::AccessDenied => write!(f, "access denied"),
            EncryptionFailureKind::Unavailable => write!(f, "service unavailable"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EncfigError {
    #[error(
        "Can't figure out the repository name. Run inside the repository directory, or pass it explicitly with -r (e.g. encfig -r owner/name ...)"
    )]
    ContextUnresolved,

    #[error("Repository not known to {endpoint}: {slug}")]
    RepositoryNotFound { slug: String, endpoint: String },

    #[error("No {file_name} found in {start} or any parent directory")]
    StoreNotFound { file_name: String, start: PathBuf },

    #[error("Encryption failed ({kind}): {reason}")]
    EncryptionFailed {
        kind: EncryptionFailureKind,
        reason: String,
    },

    #[error("Could not probe {slug}: {reason}")]
    ProbeFailed { slug: String, reason: String },

    #[error("Could not reach {endpoint}: {reason}")]
    ServiceUnavailable { endpoint: String, reason: String },

    #[error("Invalid key path '{0}' (expected dotted segments like env.global)")]
    InvalidKeyPath(String),

    #[error("Nothing to encrypt")]
    NothingToEncrypt,

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in settings file:\n{}", list_lines(.0))]
    UnknownKeys(Vec<EncfigError>),

    #[error("Failed to parse {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Settings error: {0}")]
    ConfigError(#[from] confique::Error),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// One `  - <error>` line per entry.
fn list_lines(errors: &[EncfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
