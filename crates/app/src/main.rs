use clap::Parser;
use tiredesk_app::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tiredesk_observability::init_with_default("debug");
    } else {
        tiredesk_observability::init_with_default("warn");
    }

    if let Err(e) = tiredesk_app::commands::execute(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
