//! JSON I/O handling for CLI
//!
//! - Input: batch file or stdin, UTF-8 JSON
//! - Output: single JSON object per command on stdout

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::CliResult;

/// Read the whole input from a file, or from stdin when no path is given
pub fn read_input(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Write one JSON object to stdout
pub fn write_response(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    write_to(&mut stdout, response)
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_response(&response)
}

fn write_to<W: Write>(writer: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
