use clap::Parser;
use rawbench::cli::{self, Cli};
use rawbench::config::BenchmarkConfig;
use rawbench::io::create_disk_io;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise everything down to debug unless --quiet
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.quiet {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("debug")
        }
    });

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    debug!(
        "starting up engines, {} v{}",
        rawbench::APP_NAME,
        env!("CARGO_PKG_VERSION")
    );

    let code = cli::execute(&cli, &BenchmarkConfig::default(), create_disk_io());
    ExitCode::from(code)
}
