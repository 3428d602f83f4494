//! Tool settings: which endpoints exist, how to recognize repository URLs,
//! where the project document lives, how to reach the encryption command.
//!
//! Settings are layered, lowest priority first:
//!
//! ```text
//! Compiled defaults     #[config(default = ...)]
//!        ↑ overridden by
//! Settings files        encfig.toml in the platform config dir, then the CWD
//!        ↑ overridden by
//! Environment vars      ENCFIG__SECTION__KEY
//! ```
//!
//! Every layer is sparse. `ENCFIG__PROBE__TIMEOUT_SECS=3` overrides that one
//! key and nothing else.

use std::path::PathBuf;

use confique::Config;

use crate::error::EncfigError;
use crate::file;
use crate::resolve::{self, SettingsInput};
use crate::types::{Endpoint, SearchPath};

pub const APP_NAME: &str = "encfig";

#[derive(Config, Debug, Clone)]
pub struct Settings {
    /// Backend endpoints a repository can be served from.
    #[config(nested)]
    pub endpoints: EndpointSettings,

    /// Version-control lookups.
    #[config(nested)]
    pub git: GitSettings,

    /// Reachability probe deciding between the endpoints.
    #[config(nested)]
    pub probe: ProbeSettings,

    /// The project configuration document.
    #[config(nested)]
    pub document: DocumentSettings,

    /// The external encryption command.
    #[config(nested)]
    pub encrypt: EncryptSettings,
}

#[derive(Config, Debug, Clone)]
pub struct EndpointSettings {
    /// API endpoint serving public repositories.
    #[config(default = "https://api.travis-ci.org/")]
    pub public: String,

    /// API endpoint serving private repositories.
    #[config(default = "https://api.travis-ci.com/")]
    pub private: String,

    /// Access token for the endpoint APIs. Private repositories are not
    /// visible to anonymous callers.
    pub token: Option<String>,
}

impl EndpointSettings {
    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Public => &self.public,
            Endpoint::Private => &self.private,
        }
    }

    /// Map a stored URL back to the endpoint it names. Trailing slashes are
    /// not significant.
    pub fn recognize(&self, url: &str) -> Option<Endpoint> {
        let url = url.trim_end_matches('/');
        [Endpoint::Public, Endpoint::Private]
            .into_iter()
            .find(|endpoint| self.url(*endpoint).trim_end_matches('/') == url)
    }
}

#[derive(Config, Debug, Clone)]
pub struct GitSettings {
    /// Host whose remote URLs are recognized as repositories.
    #[config(default = "github.com")]
    pub host: String,

    /// Remote used when the current branch tracks none.
    #[config(default = "origin")]
    pub default_remote: String,
}

#[derive(Config, Debug, Clone)]
pub struct ProbeSettings {
    /// Hosting API queried with `HEAD /repos/{owner}/{name}`.
    #[config(default = "https://api.github.com")]
    pub api_url: String,

    /// Token sent with the probe. Without one, private repositories look absent.
    pub token: Option<String>,

    /// Timeout for probe and repository checks, in seconds.
    #[config(default = 10)]
    pub timeout_secs: u64,
}

#[derive(Config, Debug, Clone)]
pub struct DocumentSettings {
    /// File name of the project document, searched upward from the CWD.
    #[config(default = ".travis.yml")]
    pub file_name: String,

    /// Key used by `--add` when none is given.
    #[config(default = "env.global")]
    pub default_key: String,
}

#[derive(Config, Debug, Clone)]
pub struct EncryptSettings {
    /// Command that reads plaintext on stdin and prints ciphertext.
    ///
    /// Split on whitespace; no shell quoting. The repository slug and endpoint
    /// URL are passed as ENCFIG_REPO and ENCFIG_ENDPOINT.
    pub command: Option<String>,
}

/// Discovers and resolves [`Settings`].
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    file_name: String,
    search_paths: Vec<SearchPath>,
    env_prefix: Option<String>,
    strict: bool,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// `encfig.toml` in the platform config dir and the CWD, `ENCFIG__*` env
    /// vars, strict.
    pub fn new() -> Self {
        Self {
            file_name: format!("{APP_NAME}.toml"),
            search_paths: vec![SearchPath::Platform, SearchPath::Cwd],
            env_prefix: Some(APP_NAME.to_uppercase()),
            strict: true,
        }
    }

    /// Replace the search paths. Last entry has the highest priority.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Append a search path with the highest priority so far.
    pub fn add_search_path(mut self, path: SearchPath) -> Self {
        self.search_paths.push(path);
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// In strict mode, unknown keys in settings files produce errors.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn load(&self) -> Result<Settings, EncfigError> {
        let files = file::load_settings_files(&self.search_paths, &self.file_name, APP_NAME)?;
        let env_vars: Vec<(String, String)> = std::env::vars().collect();
        resolve::resolve(SettingsInput {
            files,
            env_vars,
            env_prefix: self.env_prefix.clone(),
            strict: self.strict,
        })
    }
}

/// The platform config directory, where `state.yml` lives by default.
pub fn default_config_dir() -> Option<PathBuf> {
    file::resolve_search_path(&SearchPath::Platform, APP_NAME)
}
