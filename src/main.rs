use clap::Parser;
use colored::Colorize;
use std::process;
use symphony_lduser::cli::{args::Args, commands};

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    match commands::run(args) {
        Ok(_summary) => {
            // Success - summary has already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            // Error occurred - print the full cause chain to stderr
            eprintln!("{} {}", "Error:".bright_red().bold(), error);
            let mut source = std::error::Error::source(&error);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            process::exit(1);
        }
    }
}
