use clap::Parser;
use goalpost::cli::commands::Cli;
use goalpost::cli::handlers;
use tracing::Level;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for --json
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
