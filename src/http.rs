use std::time::Duration;

/// Blocking HTTP agent shared by the probe and the repository check.
/// Error statuses come back as `ureq::Error::StatusCode`.
pub fn agent(timeout_secs: u64) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .http_status_as_error(true)
        .build();
    ureq::Agent::new_with_config(config)
}

pub const USER_AGENT: &str = concat!("encfig/", env!("CARGO_PKG_VERSION"));

/// Join `base` and `path` with exactly one slash between them.
pub fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
