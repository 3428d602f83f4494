//! Repository identity: work out `owner/name` from local git state.
//!
//! The lookup chain is current branch → the remote that branch tracks (or the
//! default remote) → that remote's URL → the `owner/name` part of the URL.
//! Each git query is best-effort; a failed query is [`Lookup::Unavailable`],
//! not an error, and the chain falls through on plain values.

use std::path::PathBuf;
use std::process::Command;

use regex::Regex;

use crate::error::EncfigError;
use crate::settings::GitSettings;
use crate::types::RepoSlug;

/// Result of a single version-control query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(String),
    Unavailable,
}

impl Lookup {
    /// Empty output counts as unavailable.
    pub fn from_output(output: &str) -> Self {
        match output.trim() {
            "" => Lookup::Unavailable,
            value => Lookup::Found(value.to_string()),
        }
    }

    pub fn found(self) -> Option<String> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Unavailable => None,
        }
    }
}

/// The three queries the resolver needs from version control.
pub trait VersionControl {
    fn current_branch(&self) -> Lookup;
    fn branch_remote(&self, branch: &str) -> Lookup;
    fn remote_url(&self, remote: &str) -> Lookup;
}

/// [`VersionControl`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    dir: PathBuf,
}

impl GitCli {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn query(&self, args: &[&str]) -> Lookup {
        let output = Command::new("git").arg("-C").arg(&self.dir).args(args).output();
        match output {
            Ok(out) if out.status.success() => {
                Lookup::from_output(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(out) => {
                tracing::debug!(
                    ?args,
                    stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                    "git query failed"
                );
                Lookup::Unavailable
            }
            Err(e) => {
                tracing::debug!(?args, error = %e, "could not run git");
                Lookup::Unavailable
            }
        }
    }
}

impl VersionControl for GitCli {
    fn current_branch(&self) -> Lookup {
        self.query(&["name-rev", "--name-only", "HEAD"])
    }

    fn branch_remote(&self, branch: &str) -> Lookup {
        self.query(&["config", "--get", &format!("branch.{branch}.remote")])
    }

    fn remote_url(&self, remote: &str) -> Lookup {
        self.query(&["config", "--get", &format!("remote.{remote}.url")])
    }
}

/// Recognizes repository URLs on one host and extracts `owner/name`.
///
/// Accepted forms, with an optional trailing `.git`:
///
/// ```text
/// https://[user@]HOST/owner/name
/// git://HOST/owner/name
/// ssh://[user@]HOST/owner/name
/// user@HOST:owner/name
/// ```
#[derive(Debug, Clone)]
pub struct RemoteUrlPattern {
    regex: Regex,
}

impl RemoteUrlPattern {
    pub fn new(host: &str) -> Result<Self, EncfigError> {
        let pattern = format!(
            r"^(?:https://(?:[^@/]+@)?|git://|ssh://(?:[^@/]+@)?|[^@/:\s]+@){}[:/](.*/.+?)(?:\.git)?$",
            regex::escape(host)
        );
        let regex = Regex::new(&pattern).map_err(|e| EncfigError::InvalidValue {
            key: "git.host".into(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    pub fn slug(&self, url: &str) -> Option<RepoSlug> {
        let captures = self.regex.captures(url.trim())?;
        Some(RepoSlug::new(&captures[1]))
    }
}

/// Derive the slug from version control alone.
pub fn find_slug(vcs: &dyn VersionControl, git: &GitSettings) -> Result<Option<RepoSlug>, EncfigError> {
    let remote = match vcs.current_branch() {
        Lookup::Found(branch) => vcs.branch_remote(&branch).found(),
        Lookup::Unavailable => None,
    }
    .unwrap_or_else(|| git.default_remote.clone());
    tracing::debug!(%remote, "using remote");

    let Lookup::Found(url) = vcs.remote_url(&remote) else {
        tracing::debug!(%remote, "remote has no url");
        return Ok(None);
    };

    let slug = RemoteUrlPattern::new(&git.host)?.slug(&url);
    if slug.is_none() {
        tracing::debug!(%url, host = %git.host, "remote url not recognized");
    }
    Ok(slug)
}

/// Use `explicit` when given, otherwise derive from version control.
///
/// Fails with [`EncfigError::ContextUnresolved`] when neither yields a slug.
pub fn resolve_slug(
    explicit: Option<&str>,
    vcs: &dyn VersionControl,
    git: &GitSettings,
) -> Result<RepoSlug, EncfigError> {
    if let Some(slug) = explicit {
        return Ok(RepoSlug::new(slug));
    }
    let slug = find_slug(vcs, git)?.ok_or(EncfigError::ContextUnresolved)?;
    tracing::debug!(%slug, "derived repository from git");
    Ok(slug)
}

/// Whether a positional argument looks like an `owner/name` slug, which
/// usually means the caller meant `-r owner/name`.
pub fn looks_like_slug(arg: &str) -> bool {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\w+/\w+").expect("static pattern compiles"))
        .is_match(arg)
}
