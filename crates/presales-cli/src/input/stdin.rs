use std::io::{self, Read};

/// Read piped stdin as text.
/// Returns None if stdin is a TTY (interactive) or only whitespace.
pub fn read_stdin() -> Result<Option<String>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    if buffer.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(buffer))
}

/// Piped payloads starting with `{` or `[` are JSON documents; anything
/// else is treated as a CSV unit list.
pub fn looks_like_json(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('{') | Some('['))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_detection() {
        assert!(looks_like_json("  {\"units\": []}"));
        assert!(looks_like_json("[{\"unit\": \"A\", \"price\": 1}]"));
        assert!(!looks_like_json("unit,price\nA,100\n"));
    }
}
