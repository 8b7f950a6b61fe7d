//! Main CLI application

use crate::cli::console::{execute_line, register_builtin_commands, run_console, ConsoleSender};
use crate::command::Dispatcher;
use crate::config::{load_config, validate_config, Config};
use crate::error::RdispatchError;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Verbosity levels for diagnostics on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Verbosity {
    fn filter(self) -> &'static str {
        match self {
            Verbosity::Silent => "off",
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "rdispatch=debug",
        }
    }
}

/// CLI application
pub struct App {
    /// Parsed configuration
    config: Config,
    /// Config file path, if one was found
    config_path: Option<PathBuf>,
    /// Dispatcher with the console commands registered
    dispatcher: Dispatcher,
    /// Sender used for every console line
    sender: ConsoleSender,
}

impl App {
    /// Create the app from an explicit config file, or discover one
    pub fn new(config_file: Option<PathBuf>) -> Result<Self, RdispatchError> {
        let (config, config_path) = load_config(config_file.as_deref())?;
        let mut app = App::from_config(config)?;
        app.config_path = config_path;
        Ok(app)
    }

    /// Create the app from an already parsed configuration
    pub fn from_config(config: Config) -> Result<Self, RdispatchError> {
        validate_config(&config)?;

        let dispatcher = Dispatcher::with_config(config.dispatcher.clone());
        register_builtin_commands(&dispatcher)?;
        let sender = ConsoleSender::new(&config.console.permissions)?;

        Ok(App {
            config,
            config_path: None,
            dispatcher,
            sender,
        })
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    /// Run the application with parsed command line arguments.
    ///
    /// A one-shot line that is unknown, denied, failing or reports
    /// `success = false` exits with a failure code. Its message has
    /// already been shown to the sender.
    pub fn run(self, matches: &ArgMatches) -> Result<ExitCode, RdispatchError> {
        if let Some(("complete", sub_matches)) = matches.subcommand() {
            let partial = sub_matches
                .get_one::<String>("partial")
                .map(String::as_str)
                .unwrap_or_default();
            for candidate in self.dispatcher.complete(&self.sender, partial) {
                println!("{}", candidate);
            }
            return Ok(ExitCode::SUCCESS);
        }

        if let Some(line) = matches.get_one::<String>("command") {
            let succeeded = match execute_line(&self.dispatcher, &self.sender, line) {
                Ok(result) => result.is_success(),
                Err(e) => {
                    debug!(error = %e, "one-shot line failed");
                    false
                }
            };
            return Ok(if succeeded {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }

        let stdin = io::stdin();
        let prompt = stdin
            .is_terminal()
            .then_some(self.config.console.prompt.as_str());
        run_console(&self.dispatcher, &self.sender, stdin.lock(), prompt)?;
        Ok(ExitCode::SUCCESS)
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("rdispatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dispatch text command lines to typed handlers")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to rdispatch.yml config file")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("command")
                .short('c')
                .long("command")
                .value_name("LINE")
                .help("Dispatch a single line instead of reading stdin")
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no diagnostics")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose diagnostics")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("complete")
                .about("Print completion candidates for a partial line")
                .arg(
                    Arg::new("partial")
                        .value_name("PARTIAL")
                        .help("Partially typed line, quoted to keep trailing spaces")
                        .allow_hyphen_values(true),
                ),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the verbosity flags
pub fn init_logging(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<ExitCode, RdispatchError> {
    let matches = build_command().get_matches();
    init_logging(get_verbosity(&matches));

    let app = App::new(matches.get_one::<PathBuf>("file").cloned())?;
    app.run(&matches)
}
