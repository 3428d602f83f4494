//! Encrypt values for a hosted repository and keep them in the project's YAML
//! configuration document.
//!
//! Given one or more plaintexts, encfig works out which repository it is
//! running for, which of two backend endpoints serves that repository,
//! encrypts every plaintext through an external encryption command, and then
//! either prints the resulting `secure:` entries or merges them into the
//! project document (`.travis.yml` by default) under a dotted key path.
//!
//! ```ignore
//! let settings = SettingsLoader::new().load()?;
//! let ctx = Context::establish(&options, &settings, &vcs, &probe, &state)?;
//! let inputs = ops::prepare_inputs(&action.values, action.split, read_stdin)?;
//! let encryptor = CommandEncryptor::from_settings(&settings.encrypt, &ctx)?;
//! let outcome = ops::run(&action, &inputs, &settings.document, &encryptor, open)?;
//! println!("{outcome}");
//! ```
//!
//! # Context resolution
//!
//! A [`Context`] is established once per invocation and passed by reference.
//!
//! - **Repository.** An explicit `owner/name` wins. Otherwise git is asked for
//!   the current branch, the remote it tracks (falling back to the configured
//!   default remote) and that remote's URL; the slug is the `owner/name`
//!   part of a URL on the configured host. Nothing found is
//!   [`EncfigError::ContextUnresolved`].
//! - **Endpoint.** An explicit endpoint wins and is remembered. Otherwise the
//!   cached `repos.<slug>.endpoint` in the per-user state document is used
//!   without touching the network. Failing that, a `HEAD` probe against the
//!   hosting API decides: reachable means public, an API error status means
//!   private. Probe decisions are cached too.
//!
//! # Storing into the document
//!
//! Keys are dotted paths (`env.global`). Walking to the parent of the last
//! segment creates missing mappings and moves any scalar or sequence found on
//! the way under a `matrix` key, so nothing is lost. At the last segment new
//! values are merged with what is there:
//!
//! | Existing   | Result                                   |
//! |------------|------------------------------------------|
//! | nothing    | the single value, or a sequence of them  |
//! | sequence   | the sequence with the new values appended |
//! | anything else | `[existing, new..]`                   |
//!
//! Printing never loads the project document; only storing does.
//!
//! # Settings
//!
//! [`Settings`] are layered the usual way: compiled defaults, `encfig.toml`
//! in the platform config directory and the working directory, then
//! `ENCFIG__SECTION__KEY` environment variables. Unknown keys in a settings
//! file are reported with their line number. See the [`settings`] module.
//!
//! # CLI
//!
//! With the `clap` feature (on by default) [`EncryptArgs`] provides the
//! command-line surface and converts into the framework-agnostic
//! [`EncryptAction`] and [`ContextOptions`].
//!
//! # Error handling
//!
//! All fallible operations return [`EncfigError`]. Messages are user-facing:
//! they name the file, key or repository involved and, where there is one,
//! the flag that fixes the problem.

pub mod error;
pub mod ops;
pub mod settings;
pub mod types;

#[cfg(feature = "clap")]
mod cli;
mod context;
mod document;
mod encrypt;
mod endpoint;
mod env;
mod file;
mod http;
mod keypath;
mod merge;
mod repo;
mod resolve;
mod service;
mod store;
mod validate;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "clap")]
pub use cli::EncryptArgs;
pub use context::Context;
pub use document::{Document, MATRIX_KEY, Slot};
pub use encrypt::{CommandEncryptor, Encryptor, SECURE_KEY, SecureEntry, encrypt_all};
pub use endpoint::{
    Detection, EndpointSource, GithubProbe, ProbeOutcome, ReachabilityProbe, detect_endpoint,
};
pub use error::{EncfigError, EncryptionFailureKind};
pub use keypath::KeyPath;
pub use merge::{merge_values, store_values};
pub use ops::EncryptOutcome;
pub use repo::{GitCli, Lookup, RemoteUrlPattern, VersionControl, resolve_slug};
pub use service::{HttpRepositoryService, RepositoryService};
pub use settings::{Settings, SettingsLoader, default_config_dir};
pub use store::{DocumentStore, ProjectFile, StateFile};
pub use types::{ContextOptions, EncryptAction, Endpoint, RepoSlug, SearchPath, Target};
