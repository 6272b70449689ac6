//! Line-oriented transcript export.
//!
//! One entry per message as `role (rfc3339-timestamp): text`, with a blank
//! line between entries. Message text may itself contain newlines (and even
//! blank lines); the parser only treats a blank line as an entry separator
//! when the line after it is a valid entry header.

use chrono::{DateTime, Utc};

use crate::{Message, Role};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("malformed entry header at line {0}")]
    MalformedHeader(usize),
}

/// Serialize a transcript to the export format.
pub fn export_transcript(transcript: &[Message]) -> String {
    transcript
        .iter()
        .map(|msg| {
            format!(
                "{} ({}): {}",
                msg.role,
                msg.timestamp.to_rfc3339(),
                msg.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Parse the export format back into messages.
pub fn parse_transcript(input: &str) -> Result<Vec<Message>, ExportError> {
    let lines: Vec<&str> = input.lines().collect();
    let mut messages = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let (role, timestamp, first) =
            parse_header(lines[i]).ok_or(ExportError::MalformedHeader(i + 1))?;
        i += 1;

        let mut text_lines = vec![first.to_string()];
        while i < lines.len() {
            if lines[i].is_empty()
                && lines.get(i + 1).is_some_and(|next| parse_header(next).is_some())
            {
                // Separator: blank line followed by the next entry's header.
                i += 1;
                break;
            }
            text_lines.push(lines[i].to_string());
            i += 1;
        }

        messages.push(Message {
            role,
            text: text_lines.join("\n"),
            timestamp,
        });
    }

    Ok(messages)
}

/// Parse one `role (timestamp): text` header line.
fn parse_header(line: &str) -> Option<(Role, DateTime<Utc>, &str)> {
    let (role_part, rest) = line.split_once(" (")?;
    let role: Role = role_part.parse().ok()?;
    let (ts_part, text) = rest.split_once("): ")?;
    let timestamp = DateTime::parse_from_rfc3339(ts_part).ok()?;
    Some((role, timestamp.with_timezone(&Utc), text))
}
