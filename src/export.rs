//! CSV export of a user's memory set

use chrono::SecondsFormat;

use crate::models::Memory;

const CSV_HEADERS: [&str; 5] = ["title", "context", "tag", "detail", "createdAt"];

/// Serialize memories (already ordered newest-first) as CSV with a header row.
/// Timestamps are ISO-8601 with millisecond precision.
pub fn memories_to_csv(memories: &[Memory]) -> String {
    let mut rows = vec![CSV_HEADERS.join(",")];

    for memory in memories {
        let created_at = memory.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let values = [
            memory.title.as_str(),
            memory.context.as_str(),
            memory.tag.as_str(),
            memory.detail.as_str(),
            created_at.as_str(),
        ];
        rows.push(
            values
                .iter()
                .map(|v| escape_field(v))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    rows.join("\n")
}

/// RFC 4180 escaping: wrap in double quotes when the value contains a comma,
/// double quote, or newline, doubling any internal quotes.
fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
