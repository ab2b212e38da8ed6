//! Binary entrypoint for the `leanup` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Recording is handled in commands::dispatch via LEANUP_RECORD=<dir>.
    match leanup::run(std::env::args_os()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
