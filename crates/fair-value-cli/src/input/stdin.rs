use serde_json::Value;
use std::io::{self, Read};

/// Read company JSON piped on stdin.
/// Returns None if stdin is a TTY (interactive) or nothing was piped.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse company JSON from stdin: {}", e))?;
    Ok(Some(value))
}
