mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Parse CLI, load config, initialize logging and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("qqm error: {:#}", err);
        std::process::exit(1);
    }
}
