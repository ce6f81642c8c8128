//! batchval CLI entry point
//!
//! Exit codes: 0 valid, 2 invalid batch, 1 operational error.
//! All logic is delegated to the CLI module.

use batchval::cli;
use batchval::observability::{log_event_with_fields, Event};

fn main() {
    match cli::run() {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            let message = e.to_string();
            log_event_with_fields(
                Event::CommandFailed,
                &[("code", e.code()), ("message", &message)],
            );
            // stdout may be gone; the stderr line still reports the failure
            let _ = cli::write_error(e.code(), &message);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
