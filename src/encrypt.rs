//! Secure entries and the external encryption service.
//!
//! The algorithm is not ours: an [`Encryptor`] turns plaintext into opaque
//! ciphertext. [`CommandEncryptor`] does so by piping each plaintext through a
//! configured command.

use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use serde_yaml::{Mapping, Value};

use crate::context::Context;
use crate::error::{EncfigError, EncryptionFailureKind};
use crate::settings::EncryptSettings;

pub const SECURE_KEY: &str = "secure";

/// Exit status the encryption command uses to signal a permission problem
/// (`EX_NOPERM` from sysexits.h).
const EXIT_ACCESS_DENIED: i32 = 77;

/// One encrypted value, stored as `{secure: <ciphertext>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureEntry {
    ciphertext: String,
}

impl SecureEntry {
    pub fn new(ciphertext: impl Into<String>) -> Self {
        Self {
            ciphertext: ciphertext.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut mapping = Mapping::new();
        mapping.insert(SECURE_KEY.into(), self.ciphertext.as_str().into());
        Value::Mapping(mapping)
    }
}

impl fmt::Display for SecureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SECURE_KEY}: {:?}", self.ciphertext)
    }
}

pub trait Encryptor {
    fn encrypt(&self, plaintext: &str) -> Result<String, EncfigError>;
}

/// Encrypt every input in order. Stops at the first failure.
pub fn encrypt_all(
    encryptor: &dyn Encryptor,
    inputs: &[String],
) -> Result<Vec<SecureEntry>, EncfigError> {
    inputs
        .iter()
        .map(|plaintext| encryptor.encrypt(plaintext).map(SecureEntry::new))
        .collect()
}

/// Runs `program args..` once per value, plaintext on stdin, ciphertext on
/// stdout (surrounding whitespace trimmed).
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEncryptor {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl CommandEncryptor {
    /// Split a whitespace-separated command line. No shell quoting.
    pub fn new(command_line: &str) -> Result<Self, EncfigError> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next().ok_or_else(|| EncfigError::InvalidValue {
            key: "encrypt.command".into(),
            reason: "command is empty".into(),
        })?;
        Ok(Self {
            program,
            args: words.collect(),
            env: Vec::new(),
        })
    }

    /// Build from settings, exporting the repository and endpoint to the
    /// command as `ENCFIG_REPO` and `ENCFIG_ENDPOINT`.
    pub fn from_settings(settings: &EncryptSettings, ctx: &Context) -> Result<Self, EncfigError> {
        let command = settings
            .command
            .as_deref()
            .ok_or_else(|| EncfigError::EncryptionFailed {
                kind: EncryptionFailureKind::Unavailable,
                reason: "no encryption command configured (set encrypt.command in encfig.toml or ENCFIG__ENCRYPT__COMMAND)".into(),
            })?;
        Ok(Self::new(command)?
            .env("ENCFIG_REPO", ctx.slug().as_str())
            .env("ENCFIG_ENDPOINT", ctx.endpoint_url()))
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn failure(kind: EncryptionFailureKind, reason: impl Into<String>) -> EncfigError {
        EncfigError::EncryptionFailed {
            kind,
            reason: reason.into(),
        }
    }
}

impl Encryptor for CommandEncryptor {
    fn encrypt(&self, plaintext: &str) -> Result<String, EncfigError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Self::failure(
                    EncryptionFailureKind::Unavailable,
                    format!("could not run {}: {e}", self.program),
                )
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(plaintext.as_bytes()).map_err(|e| {
                Self::failure(EncryptionFailureKind::Unavailable, e.to_string())
            })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Self::failure(EncryptionFailureKind::Unavailable, e.to_string()))?;

        if !output.status.success() {
            let kind = match output.status.code() {
                Some(EXIT_ACCESS_DENIED) => EncryptionFailureKind::AccessDenied,
                _ => EncryptionFailureKind::Unavailable,
            };
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Self::failure(
                kind,
                format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            ));
        }

        let ciphertext = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if ciphertext.is_empty() {
            return Err(Self::failure(
                EncryptionFailureKind::Unavailable,
                format!("{} printed no ciphertext", self.program),
            ));
        }
        Ok(ciphertext)
    }
}
