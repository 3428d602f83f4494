//! Clap adapter for encfig.
//!
//! Compiled only when the `clap` Cargo feature is enabled (on by default).
//! [`EncryptArgs`] can be flattened into any clap `#[derive(Parser)]` struct;
//! [`EncryptArgs::into_action()`] is the only bridge to the framework-agnostic
//! core, producing an [`EncryptAction`](crate::EncryptAction) and the
//! [`ContextOptions`](crate::ContextOptions) for context resolution.

use clap::Args;

use crate::types::{ContextOptions, Endpoint, EncryptAction, Target};

/// Clap-derived args for the encrypt command.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     encrypt: EncryptArgs,
/// }
/// ```
#[derive(Debug, Args)]
pub struct EncryptArgs {
    /// Values to encrypt, joined with a space. Reads stdin when omitted.
    pub values: Vec<String>,

    /// Repository to use (owner/name). Derived from git when omitted.
    #[arg(short, long, value_name = "SLUG")]
    pub repo: Option<String>,

    /// Force the backend endpoint instead of detecting it.
    #[arg(short, long, value_enum)]
    pub endpoint: Option<Endpoint>,

    /// Add the result to the project document under KEY
    /// (default from settings, usually env.global).
    #[arg(long, value_name = "KEY", require_equals = true)]
    pub add: Option<Option<String>>,

    /// Treat each line of input as a separate value.
    #[arg(short, long, overrides_with = "no_split")]
    pub split: bool,

    /// Treat the whole input as one value (the default).
    #[arg(long, overrides_with = "split")]
    pub no_split: bool,
}

impl EncryptArgs {
    /// Convert clap-parsed args into framework-agnostic types.
    ///
    /// Bare `--add` maps to `Target::Store { key: None }`; no `--add` at all
    /// maps to `Target::Print`.
    pub fn into_action(self) -> (EncryptAction, ContextOptions) {
        let target = match self.add {
            None => Target::Print,
            Some(key) => Target::Store { key },
        };
        let action = EncryptAction {
            values: self.values,
            split: self.split && !self.no_split,
            target,
        };
        let options = ContextOptions {
            repo: self.repo,
            endpoint: self.endpoint,
        };
        (action, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    /// Wrapper so we can use `try_parse_from` on the flattened args.
    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        encrypt: EncryptArgs,
    }

    fn parse(args: &[&str]) -> (EncryptAction, ContextOptions) {
        TestCli::try_parse_from(args).unwrap().encrypt.into_action()
    }

    #[test]
    fn bare_values_print() {
        let (action, options) = parse(&["encfig", "FOO=bar", "BAZ=1"]);
        assert_eq!(
            action,
            EncryptAction {
                values: vec!["FOO=bar".into(), "BAZ=1".into()],
                split: false,
                target: Target::Print,
            }
        );
        assert_eq!(options, ContextOptions::default());
    }

    #[test]
    fn no_values_is_empty_list() {
        let (action, _) = parse(&["encfig"]);
        assert!(action.values.is_empty());
    }

    #[test]
    fn bare_add_uses_default_key() {
        let (action, _) = parse(&["encfig", "--add", "FOO=bar"]);
        assert_eq!(action.target, Target::Store { key: None });
        assert_eq!(action.values, ["FOO=bar"]);
    }

    #[test]
    fn add_with_key() {
        let (action, _) = parse(&["encfig", "--add=matrix.include", "FOO=bar"]);
        assert_eq!(
            action.target,
            Target::Store {
                key: Some("matrix.include".into())
            }
        );
    }

    #[test]
    fn repo_short_and_long() {
        let (_, options) = parse(&["encfig", "-r", "octo/cat", "x"]);
        assert_eq!(options.repo.as_deref(), Some("octo/cat"));

        let (_, options) = parse(&["encfig", "--repo", "octo/cat", "x"]);
        assert_eq!(options.repo.as_deref(), Some("octo/cat"));
    }

    #[test]
    fn endpoint_values() {
        let (_, options) = parse(&["encfig", "-e", "private", "x"]);
        assert_eq!(options.endpoint, Some(Endpoint::Private));

        let (_, options) = parse(&["encfig", "--endpoint", "public", "x"]);
        assert_eq!(options.endpoint, Some(Endpoint::Public));
    }

    #[test]
    fn unknown_endpoint_rejected() {
        assert!(TestCli::try_parse_from(["encfig", "-e", "staging", "x"]).is_err());
    }

    #[test]
    fn split_flag() {
        let (action, _) = parse(&["encfig", "-s"]);
        assert!(action.split);
        let (action, _) = parse(&["encfig", "--split"]);
        assert!(action.split);
    }

    #[test]
    fn last_of_split_and_no_split_wins() {
        let (action, _) = parse(&["encfig", "-s", "--no-split"]);
        assert!(!action.split);
        let (action, _) = parse(&["encfig", "--no-split", "--split"]);
        assert!(action.split);
        let (action, _) = parse(&["encfig", "--no-split"]);
        assert!(!action.split);
    }
}
