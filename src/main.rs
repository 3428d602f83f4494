//! `encfig`: encrypt values for a repository and print them, or add them to
//! the project document.
//!
//! ```sh
//! encfig FOO=bar                     # print a secure entry
//! encfig --add FOO=bar               # add it under env.global
//! encfig --add=deploy.api_key -s < secrets.txt
//! ENCFIG_LOG=encfig=debug encfig -r octo/cat FOO=bar
//! ```

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use encfig::{
    CommandEncryptor, Context, EncfigError, EncryptArgs, EncryptOutcome, GitCli, GithubProbe,
    HttpRepositoryService, ProjectFile, RepositoryService, SearchPath, SettingsLoader, StateFile,
    default_config_dir, ops,
};

/// Encrypt values for the current repository.
#[derive(Parser, Debug)]
#[command(name = "encfig", version)]
struct Cli {
    #[command(flatten)]
    encrypt: EncryptArgs,

    /// Directory holding encfig.toml and the endpoint cache (state.yml).
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Log resolution steps to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("ENCFIG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "encfig=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_stdin() -> io::Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("Reading from stdin, press Ctrl+D when done");
    }
    io::read_to_string(stdin)
}

fn run(cli: Cli) -> Result<EncryptOutcome, EncfigError> {
    let mut loader = SettingsLoader::new();
    let config_dir = match cli.config_dir {
        Some(dir) => {
            loader = loader.add_search_path(SearchPath::Path(dir.clone()));
            dir
        }
        None => default_config_dir().ok_or_else(|| EncfigError::InvalidValue {
            key: "--config-dir".into(),
            reason: "no platform config directory available, pass one explicitly".into(),
        })?,
    };
    let settings = loader.load()?;

    let cwd = std::env::current_dir().map_err(|e| EncfigError::IoError {
        path: PathBuf::from("."),
        source: e,
    })?;

    let (action, options) = cli.encrypt.into_action();
    let ctx = Context::establish(
        &options,
        &settings,
        &GitCli::new(&cwd),
        &GithubProbe::new(&settings.probe),
        &StateFile::in_dir(&config_dir),
    )?;
    HttpRepositoryService::new(&settings.endpoints, &settings.probe).check(&ctx)?;

    let inputs = ops::prepare_inputs(&action.values, action.split, read_stdin)?;
    let encryptor = CommandEncryptor::from_settings(&settings.encrypt, &ctx)?;
    ops::run(&action, &inputs, &settings.document, &encryptor, || {
        ProjectFile::discover(&cwd, &settings.document.file_name)
    })
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(outcome) => println!("{outcome}"),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
