//! dloom binary entry point.
use anyhow::Result;
use clap::Parser;

use dloom::cli::{Cli, Command};
use dloom::commands;
use dloom::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    let name = match &args.command {
        Command::Link(_) => "link",
        Command::Unlink(_) => "unlink",
        Command::Version => {
            commands::version::run();
            return Ok(());
        }
    };

    init_subscriber(args.global.verbose, name);
    let log = Logger::new(name);

    match &args.command {
        Command::Link(opts) => commands::link::run(&args.global, opts, &log),
        Command::Unlink(opts) => commands::unlink::run(&args.global, opts, &log),
        Command::Version => Ok(()),
    }
}
