//! ---
//! freed_section: "05-networking-external-interfaces"
//! freed_subsection: "binary"
//! freed_type: "source"
//! freed_scope: "code"
//! freed_description: "Command-line entry point for the FreeD toolkit."
//! freed_version: "v1.0.0"
//! freed_owner: "tbd"
//! ---
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use freed_common::{init_tracing, LogFormat, LoggingConfig, VersionInfo};
use freed_logging::freed_error;
use freed_sim::SimError;
use freed_validator::ListenerError;

mod conformance;
mod replay;
mod simulate;
mod validate;

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_PORT_UNAVAILABLE: u8 = 3;
const EXIT_UNKNOWN_PATTERN: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::StructuredJson,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "freed",
    author,
    disable_version_flag = true,
    about = "Validate, simulate and replay FreeD camera tracking streams",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,

    /// Diagnostic log format (diagnostics are written to stderr)
    #[arg(
        long,
        value_enum,
        global = true,
        env = "FREED_LOG_FORMAT",
        default_value_t = LogFormatArg::Pretty
    )]
    log_format: LogFormatArg,

    /// Log filter directive, e.g. `debug` or `freed_sim=trace`
    #[arg(long, global = true, value_name = "DIRECTIVE")]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Listen for FreeD packets and report on each one
    Validate(validate::ValidateCommand),
    /// Send a synthetic camera motion pattern
    Simulate(simulate::SimulateCommand),
    /// Replay a recorded pose log at its original pace
    Replay(replay::ReplayCommand),
    /// Print statistics for a recorded pose log
    Analyze(replay::AnalyzeCommand),
    /// Run the built-in validator conformance cases
    Test(conformance::TestCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return ExitCode::SUCCESS;
    }
    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::from(EXIT_USAGE);
    };

    let logging = LoggingConfig {
        format: cli.log_format.into(),
        filter: cli.log_filter,
    };
    if let Err(err) = init_tracing("freed", &logging) {
        eprintln!("error: {err:#}");
        return ExitCode::from(EXIT_FAILURE);
    }

    match dispatch(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            freed_error!("command failed: {:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Validate(cmd) => cmd.execute().await,
        Commands::Simulate(cmd) => cmd.execute().await,
        Commands::Replay(cmd) => cmd.execute().await,
        Commands::Analyze(cmd) => cmd.execute(),
        Commands::Test(cmd) => cmd.execute(),
    }
}

/// Map a failure to the process exit status.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(ListenerError::PortUnavailable { .. }) = cause.downcast_ref::<ListenerError>() {
            return EXIT_PORT_UNAVAILABLE;
        }
        if let Some(SimError::UnknownPattern(_)) = cause.downcast_ref::<SimError>() {
            return EXIT_UNKNOWN_PATTERN;
        }
    }
    EXIT_FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::io;
    use std::net::SocketAddr;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn version_flag_needs_no_subcommand() {
        let cli = Cli::try_parse_from(["freed", "-V"]).unwrap();
        assert!(cli.version);
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_log_format_after_subcommand() {
        let cli = Cli::try_parse_from(["freed", "test", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, LogFormatArg::Json);
        assert_eq!(LogFormat::from(cli.log_format), LogFormat::StructuredJson);
        assert!(matches!(cli.command, Some(Commands::Test(_))));
    }

    #[test]
    fn every_subcommand_argument_has_help() {
        let cli = Cli::command();
        for sub in cli.get_subcommands() {
            for arg in sub.get_arguments() {
                let id = arg.get_id().as_str();
                if id == "help" || arg.is_global_set() {
                    continue;
                }
                assert!(
                    arg.get_help().is_some(),
                    "{} --{} has no help text",
                    sub.get_name(),
                    id
                );
            }
        }
    }

    #[test]
    fn unknown_subcommand_is_a_usage_error() {
        let err = Cli::try_parse_from(["freed", "record"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_codes_follow_the_error_kind() {
        let unknown = anyhow::Error::new(SimError::UnknownPattern("hexagon".into()));
        assert_eq!(exit_code_for(&unknown), EXIT_UNKNOWN_PATTERN);

        let addr: SocketAddr = "0.0.0.0:6000".parse().unwrap();
        let busy: Result<()> = Err(ListenerError::PortUnavailable {
            addr,
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        }
        .into());
        let wrapped = busy.context("starting validator").unwrap_err();
        assert_eq!(exit_code_for(&wrapped), EXIT_PORT_UNAVAILABLE);

        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), EXIT_FAILURE);
    }
}
