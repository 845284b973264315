use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fcle_contract::cli::{self, Cli, Command, RunArgs};
use fcle_contract::environment::HarnessConfig;
use fcle_contract::error::HarnessError;
use fcle_contract::http::client::ReqwestTransport;
use fcle_contract::testing::runner::run_suites;

const DEFAULT_FILTER: &str = "info,fcle_contract=debug";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match dispatch(cli.command) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "fcle-contract aborted");
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn dispatch(command: Command) -> Result<ExitCode, HarnessError> {
    let config = HarnessConfig::load()?;
    match command {
        Command::List => {
            print!("{}", cli::render_listing(&config));
            Ok(ExitCode::SUCCESS)
        }
        Command::Run(args) => run(&config, &args),
    }
}

fn run(config: &HarnessConfig, args: &RunArgs) -> Result<ExitCode, HarnessError> {
    let suites = args.selected_suites()?;
    let transport = ReqwestTransport::new(config.timeout())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| HarnessError::Io {
            context: "failed to start the tokio runtime".to_string(),
            source,
        })?;

    let report = runtime.block_on(run_suites(config, &transport, &suites))?;
    let rendered = cli::render_report(&report, args.format)?;
    println!("{rendered}");
    if let Some(path) = &args.report {
        cli::write_report(path, &rendered)?;
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
