use std::fmt;
use std::path::PathBuf;

/// Where to search for settings files.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// Current working directory.
    Cwd,
    /// An explicit absolute path.
    Path(PathBuf),
}

/// A hosted repository identifier in `owner/name` form.
///
/// Explicit values are taken as given; derived values come from
/// [`resolve_slug`](crate::repo::resolve_slug).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug(String);

impl RepoSlug {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the two backend endpoints a repository can be served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Endpoint {
    Public,
    Private,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Public => write!(f, "public"),
            Endpoint::Private => write!(f, "private"),
        }
    }
}

/// Caller-supplied hints for context resolution. Anything left `None` is
/// derived from the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextOptions {
    pub repo: Option<String>,
    pub endpoint: Option<Endpoint>,
}

/// What to do with the encrypted values.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Hand the secure entries back for display.
    Print,
    /// Merge them into the project document. `None` means the default key.
    Store { key: Option<String> },
}

/// An encrypt request, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptAction {
    /// Positional inputs. Joined with a space; empty means read stdin.
    pub values: Vec<String>,
    /// Treat each line of the input as a separate value.
    pub split: bool,
    pub target: Target,
}
