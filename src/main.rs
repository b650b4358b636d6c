//! bsheet - command-line tool for compositing and repacking sprite sheets

use std::process::ExitCode;

use boomsheets::cli;

fn main() -> ExitCode {
    cli::run()
}
