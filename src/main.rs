//! stx - command-line tool for inspecting and exporting Stax sprite sheets

use std::process::ExitCode;

use stax::cli;

fn main() -> ExitCode {
    cli::run()
}
