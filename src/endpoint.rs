//! Endpoint detection: which backend serves a repository.
//!
//! Priority, highest first:
//!
//! 1. An endpoint the caller asked for. Always wins and is remembered.
//! 2. The endpoint cached under `repos.<slug>.endpoint` in the state document.
//!    No network traffic, no write.
//! 3. A `HEAD` probe against the public hosting API. Reachable means public;
//!    an API error status means the repository is hidden from anonymous
//!    callers, so private. The result is remembered.
//!
//! A failed probe is a routing signal, not an error. Only failures that are
//! not API answers at all (DNS, connection refused, timeouts) propagate.

use crate::document::Document;
use crate::error::EncfigError;
use crate::http;
use crate::settings::{EndpointSettings, ProbeSettings};
use crate::types::{Endpoint, RepoSlug};

pub const REPOS_KEY: &str = "repos";
pub const ENDPOINT_KEY: &str = "endpoint";

/// Answer of a reachability probe that got an API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable,
    /// The API answered with an error status.
    Unavailable,
}

pub trait ReachabilityProbe {
    fn head_repository(&self, slug: &RepoSlug) -> Result<ProbeOutcome, EncfigError>;
}

/// Probes `HEAD {api_url}/repos/{slug}` on the hosting API.
pub struct GithubProbe {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
}

impl GithubProbe {
    pub fn new(settings: &ProbeSettings) -> Self {
        Self {
            agent: http::agent(settings.timeout_secs),
            api_url: settings.api_url.clone(),
            token: settings.token.clone(),
        }
    }

    fn url(&self, slug: &RepoSlug) -> String {
        http::join(&self.api_url, &format!("repos/{slug}"))
    }
}

impl ReachabilityProbe for GithubProbe {
    fn head_repository(&self, slug: &RepoSlug) -> Result<ProbeOutcome, EncfigError> {
        let url = self.url(slug);
        let mut request = self.agent.head(&url).header("User-Agent", http::USER_AGENT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("token {token}"));
        }

        match request.call() {
            Ok(_) => Ok(ProbeOutcome::Reachable),
            Err(ureq::Error::StatusCode(status)) => {
                tracing::debug!(%url, status, "probe answered with error status");
                Ok(ProbeOutcome::Unavailable)
            }
            Err(e) => Err(EncfigError::ProbeFailed {
                slug: slug.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Where a detected endpoint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSource {
    Explicit,
    Cached,
    Probed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub endpoint: Endpoint,
    pub source: EndpointSource,
}

impl Detection {
    /// Whether detection wrote to the state document.
    pub fn modified_state(&self) -> bool {
        self.source != EndpointSource::Cached
    }
}

/// Decide the endpoint for `slug`, updating `state` unless it came from cache.
pub fn detect_endpoint(
    state: &mut Document,
    slug: &RepoSlug,
    explicit: Option<Endpoint>,
    endpoints: &EndpointSettings,
    probe: &dyn ReachabilityProbe,
) -> Result<Detection, EncfigError> {
    let (endpoint, source) = match explicit {
        Some(endpoint) => (endpoint, EndpointSource::Explicit),
        None => match cached_endpoint(state, slug, endpoints) {
            Some(endpoint) => {
                tracing::debug!(%slug, %endpoint, "using cached endpoint");
                return Ok(Detection {
                    endpoint,
                    source: EndpointSource::Cached,
                });
            }
            None => {
                let endpoint = match probe.head_repository(slug)? {
                    ProbeOutcome::Reachable => Endpoint::Public,
                    ProbeOutcome::Unavailable => Endpoint::Private,
                };
                (endpoint, EndpointSource::Probed)
            }
        },
    };

    remember_endpoint(state, slug, endpoints.url(endpoint));
    tracing::debug!(%slug, %endpoint, ?source, "endpoint resolved");
    Ok(Detection { endpoint, source })
}

/// The cached endpoint for `slug`, if it names one of the configured URLs.
pub fn cached_endpoint(
    state: &Document,
    slug: &RepoSlug,
    endpoints: &EndpointSettings,
) -> Option<Endpoint> {
    let cached = state.get_path(&[REPOS_KEY, slug.as_str(), ENDPOINT_KEY])?;
    let recognized = cached.as_str().and_then(|url| endpoints.recognize(url));
    if recognized.is_none() {
        tracing::warn!(%slug, ?cached, "ignoring unrecognized cached endpoint");
    }
    recognized
}

fn remember_endpoint(state: &mut Document, slug: &RepoSlug, url: &str) {
    let repo = state.parent_mut(&[REPOS_KEY, slug.as_str()]);
    repo.insert(ENDPOINT_KEY.into(), url.into());
}
