mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, OutputFormat};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    let format = cli.global.output;
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        if format.is_structured() {
            print_failure(format, &err);
        }
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Failure document for machine consumers, mirroring a result's shape.
fn print_failure(format: OutputFormat, err: &CliError) {
    let doc = json!({"changed": false, "message": err.to_string()});
    if let Ok(out) = output::render_single(format, &doc, |_| String::new()) {
        output::print_output(&out, false);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a server connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "npmctl", &mut std::io::stdout());
            Ok(())
        }

        Command::Token => commands::token::handle(&cli.global).await,

        Command::Certificate(args) => commands::certificate::handle(args, &cli.global).await,

        Command::Proxy(args) => commands::proxy::handle(args, &cli.global).await,
    }
}
