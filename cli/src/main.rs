mod args;
mod commands;
mod utils;

use std::process::exit;

use clap::Parser;
use colored::Colorize;

use crate::commands::Commands;

#[tokio::main]
async fn main() {
    let result = match Commands::parse() {
        Commands::Info(args) => args.run().await,
    };

    if let Err(err) = result {
        print_error(format!("{err:#}"));
        exit(1);
    }
}

fn print_error(msg: impl Into<String>) {
    eprintln!(
        "{} {}\n\nFor more information, try '{}'.",
        "error:".bold().red(),
        msg.into(),
        "--help".white().bold(),
    );
}
