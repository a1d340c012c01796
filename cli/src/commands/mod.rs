pub mod info;

use clap::Parser;

use self::info::InfoArgs;

#[derive(Parser)]
#[clap(
    version = "1.0.0",
    about = "\n\
    A CLI for rusty_ytinfo crate.
    ",
    author = "Mithronn",
    arg_required_else_help = true,
    subcommand_required = true
)]
pub enum Commands {
    #[clap(about = "\
    Print the metadata and stream formats of a video
    ")]
    Info(InfoArgs),
}
