//! buildplan - build orchestration for Java web services

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = buildplan::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
