use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Typed JSON from stdin when it is piped. `None` on a TTY or empty input.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed = serde_json::from_str(trimmed).map_err(|e| format!("Invalid stdin input: {e}"))?;
    Ok(Some(parsed))
}
