use std::fmt::Arguments;

use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use fern::FormatCallback;
use log::{LevelFilter, Record};

#[derive(Parser)]
pub struct LogArgs {
    /// Sets the log-level of rusty_ytinfo [default: Info]
    /// (-v = Error, ..., -vvvvv = Trace)
    /// (other crates have log level Warn)
    #[clap(
        long,
        short,
        action = clap::ArgAction::Count,
        global = true,
    )]
    verbose: u8,

    /// Turn off logging for all crates
    #[clap(long, short, conflicts_with = "verbose")]
    quiet: bool,
}

impl LogArgs {
    pub fn init_logger(&self) {
        if self.quiet {
            return;
        }

        let result = fern::Dispatch::new()
            .level(LevelFilter::Warn)
            .level_for("rusty_ytinfo", self.level_filter())
            .format(Self::log_msg_formatter())
            // Keep stdout clean for the serialized result
            .chain(std::io::stderr())
            .apply();

        if let Err(err) = result {
            eprintln!("The global logger was already initialized: {err}");
        }
    }

    fn log_msg_formatter() -> fn(FormatCallback, &Arguments, &Record) {
        |out: FormatCallback, message: &Arguments, record: &Record| {
            static COLORS: ColoredLevelConfig = ColoredLevelConfig {
                error: Color::Red,
                warn: Color::Yellow,
                info: Color::Green,
                debug: Color::BrightBlue,
                trace: Color::White,
            };

            out.finish(format_args!(
                "{:<5} [{}:{}]: {}",
                COLORS.color(record.level()),
                record.target(),
                record.line().unwrap_or_default(),
                message,
            ))
        }
    }

    fn level_filter(&self) -> LevelFilter {
        match self.verbose {
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            0 | 3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
