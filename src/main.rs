use agenda::cli::commands::Cli;
use agenda::cli::handlers;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
