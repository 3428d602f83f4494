//! The request-scoped working context: which repository, which endpoint.
//!
//! Established once per invocation, before anything touches the project
//! document. Identity resolution runs first, then endpoint detection against
//! the state document, which is written back only when detection changed it.

use crate::endpoint::{ReachabilityProbe, detect_endpoint};
use crate::error::EncfigError;
use crate::repo::{VersionControl, resolve_slug};
use crate::settings::Settings;
use crate::store::DocumentStore;
use crate::types::{ContextOptions, Endpoint, RepoSlug};

#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    slug: RepoSlug,
    endpoint: Endpoint,
    endpoint_url: String,
}

impl Context {
    pub fn new(slug: RepoSlug, endpoint: Endpoint, endpoint_url: impl Into<String>) -> Self {
        Self {
            slug,
            endpoint,
            endpoint_url: endpoint_url.into(),
        }
    }

    /// Resolve the repository, then its endpoint, persisting the state
    /// document if the endpoint decision was new.
    pub fn establish(
        options: &ContextOptions,
        settings: &Settings,
        vcs: &dyn VersionControl,
        probe: &dyn ReachabilityProbe,
        state: &dyn DocumentStore,
    ) -> Result<Self, EncfigError> {
        let slug = resolve_slug(options.repo.as_deref(), vcs, &settings.git)?;

        let mut doc = state.load()?;
        let detection = detect_endpoint(
            &mut doc,
            &slug,
            options.endpoint,
            &settings.endpoints,
            probe,
        )?;
        if detection.modified_state() {
            state.persist(&doc)?;
        }

        let endpoint_url = settings.endpoints.url(detection.endpoint).to_string();
        tracing::debug!(%slug, endpoint = %endpoint_url, "context established");
        Ok(Self::new(slug, detection.endpoint, endpoint_url))
    }

    pub fn slug(&self) -> &RepoSlug {
        &self.slug
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}
