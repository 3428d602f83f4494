//! Check that the resolved endpoint actually knows the repository.

use crate::context::Context;
use crate::error::EncfigError;
use crate::http;
use crate::settings::{EndpointSettings, ProbeSettings};

pub trait RepositoryService {
    /// `Ok` when the endpoint in `ctx` serves `ctx`'s repository.
    fn check(&self, ctx: &Context) -> Result<(), EncfigError>;
}

/// `GET {endpoint}/repos/{slug}` against the backend API.
///
/// Sends `Authorization: token <endpoints.token>` when a token is configured.
pub struct HttpRepositoryService {
    agent: ureq::Agent,
    token: Option<String>,
}

impl HttpRepositoryService {
    pub fn new(endpoints: &EndpointSettings, probe: &ProbeSettings) -> Self {
        Self {
            agent: http::agent(probe.timeout_secs),
            token: endpoints.token.clone(),
        }
    }
}

pub fn repository_url(ctx: &Context) -> String {
    http::join(ctx.endpoint_url(), &format!("repos/{}", ctx.slug()))
}

impl RepositoryService for HttpRepositoryService {
    fn check(&self, ctx: &Context) -> Result<(), EncfigError> {
        let url = repository_url(ctx);
        let mut request = self
            .agent
            .get(&url)
            .header("User-Agent", http::USER_AGENT)
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("token {token}"));
        }

        match request.call() {
            Ok(_) => Ok(()),
            Err(ureq::Error::StatusCode(404)) => Err(EncfigError::RepositoryNotFound {
                slug: ctx.slug().to_string(),
                endpoint: ctx.endpoint_url().to_string(),
            }),
            Err(ureq::Error::StatusCode(status)) => Err(EncfigError::ServiceUnavailable {
                endpoint: ctx.endpoint_url().to_string(),
                reason: format!("unexpected status {status} for {url}"),
            }),
            Err(e) => Err(EncfigError::ServiceUnavailable {
                endpoint: ctx.endpoint_url().to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{closed_port_url, serve_once, settings};
    use crate::types::{Endpoint, RepoSlug};

    fn context(endpoint_url: &str) -> Context {
        Context::new(RepoSlug::new("octo/cat"), Endpoint::Private, endpoint_url)
    }

    fn service(token: Option<&str>) -> HttpRepositoryService {
        let mut s = settings();
        s.endpoints.token = token.map(str::to_string);
        s.probe.timeout_secs = 5;
        HttpRepositoryService::new(&s.endpoints, &s.probe)
    }

    #[test]
    fn url_joins_endpoint_and_slug() {
        assert_eq!(
            repository_url(&context("https://api.travis-ci.com/")),
            "https://api.travis-ci.com/repos/octo/cat"
        );
    }

    #[test]
    fn known_repository_passes() {
        let (url, request) = serve_once(200);
        service(None).check(&context(&url)).unwrap();
        let head = request.join().unwrap();
        assert!(head.starts_with("GET /repos/octo/cat "), "{head}");
    }

    #[test]
    fn not_found_is_repository_not_found() {
        let (url, request) = serve_once(404);
        let err = service(None).check(&context(&url)).unwrap_err();
        request.join().unwrap();
        match err {
            EncfigError::RepositoryNotFound { slug, endpoint } => {
                assert_eq!(slug, "octo/cat");
                assert_eq!(endpoint, url);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn server_error_is_service_unavailable() {
        let (url, request) = serve_once(500);
        let result = service(None).check(&context(&url));
        request.join().unwrap();
        assert!(matches!(result, Err(EncfigError::ServiceUnavailable { .. })));
    }

    #[test]
    fn unreachable_endpoint_is_service_unavailable() {
        let result = service(None).check(&context(&closed_port_url()));
        assert!(matches!(result, Err(EncfigError::ServiceUnavailable { .. })));
    }

    #[test]
    fn configured_token_is_sent() {
        let (url, request) = serve_once(200);
        service(Some("s3cret")).check(&context(&url)).unwrap();
        let head = request.join().unwrap().to_lowercase();
        assert!(head.contains("authorization: token s3cret"), "{head}");
    }

    #[test]
    fn no_token_means_no_authorization_header() {
        let (url, request) = serve_once(200);
        service(None).check(&context(&url)).unwrap();
        let head = request.join().unwrap().to_lowercase();
        assert!(!head.contains("authorization"), "{head}");
    }
}
