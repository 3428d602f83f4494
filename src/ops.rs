//! Encrypt operations: input preparation, encrypt-then-print or
//! encrypt-then-store, and the result type callers display.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::encrypt::{Encryptor, SecureEntry, encrypt_all};
use crate::error::EncfigError;
use crate::keypath::KeyPath;
use crate::merge::store_values;
use crate::repo::looks_like_slug;
use crate::settings::DocumentSettings;
use crate::store::DocumentStore;
use crate::types::{EncryptAction, Target};

/// Result of an encrypt operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum EncryptOutcome {
    /// Entries were merged into the project document.
    Stored {
        path: PathBuf,
        key: KeyPath,
        count: usize,
    },
    /// Entries for the user to paste into `file_name` themselves.
    Entries {
        entries: Vec<SecureEntry>,
        file_name: String,
    },
}

impl fmt::Display for EncryptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptOutcome::Stored { path, key, count } => {
                let noun = if *count == 1 { "value" } else { "values" };
                write!(
                    f,
                    "Added {count} secure {noun} under {key} in {}",
                    path.display()
                )
            }
            EncryptOutcome::Entries { entries, file_name } => {
                writeln!(f, "Please add the following to your {file_name} file:")?;
                writeln!(f)?;
                for entry in entries {
                    writeln!(f, "  {entry}")?;
                }
                writeln!(f)?;
                write!(
                    f,
                    "Pro Tip: You can add it automatically by running with --add."
                )
            }
        }
    }
}

/// Turn positional arguments into the list of plaintexts to encrypt.
///
/// Arguments are joined with a single space. When that leaves nothing,
/// `read_stdin` supplies the data instead. With `split`, every line becomes
/// its own plaintext; trailing empty lines are dropped.
pub fn prepare_inputs(
    values: &[String],
    split: bool,
    read_stdin: impl FnOnce() -> io::Result<String>,
) -> Result<Vec<String>, EncfigError> {
    if let Some(first) = values.first()
        && looks_like_slug(first)
    {
        tracing::warn!(
            argument = %first,
            "the repository is passed with -r (e.g. encfig ... -r {first}); \
             positional arguments are encrypted as data"
        );
    }

    let mut data = values.join(" ");
    if data.is_empty() {
        data = read_stdin().map_err(|e| EncfigError::IoError {
            path: PathBuf::from("<stdin>"),
            source: e,
        })?;
    }

    let inputs: Vec<String> = if split {
        let mut lines: Vec<String> = data.split('\n').map(str::to_string).collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines
    } else if data.is_empty() {
        Vec::new()
    } else {
        vec![data]
    };

    if inputs.is_empty() {
        return Err(EncfigError::NothingToEncrypt);
    }
    tracing::debug!(count = inputs.len(), split, "prepared inputs");
    Ok(inputs)
}

/// Encrypt `inputs` and deliver them according to `action.target`.
///
/// For [`Target::Store`] the key path is validated and the project document
/// located (via `open_project`) before anything is sent to the encryptor, so
/// a missing document costs no encryption round trips. The document is only
/// written once every value encrypted successfully.
pub fn run<S, F>(
    action: &EncryptAction,
    inputs: &[String],
    settings: &DocumentSettings,
    encryptor: &dyn Encryptor,
    open_project: F,
) -> Result<EncryptOutcome, EncfigError>
where
    S: DocumentStore,
    F: FnOnce() -> Result<S, EncfigError>,
{
    match &action.target {
        Target::Print => {
            let entries = encrypt_all(encryptor, inputs)?;
            Ok(EncryptOutcome::Entries {
                entries,
                file_name: settings.file_name.clone(),
            })
        }
        Target::Store { key } => {
            let key = KeyPath::parse(key.as_deref().unwrap_or(&settings.default_key))?;
            let store = open_project()?;
            let mut doc = store.load()?;

            let entries = encrypt_all(encryptor, inputs)?;
            let count = entries.len();
            store_values(
                &mut doc,
                &key,
                entries.iter().map(SecureEntry::to_value).collect(),
            )?;
            store.persist(&doc)?;

            Ok(EncryptOutcome::Stored {
                path: store.location().to_path_buf(),
                key,
                count,
            })
        }
    }
}
