//! CSV reading for bulk uploads.
//!
//! This is the only fail-fast stage of the pipeline: a table that cannot be
//! read as a whole returns `BatchError::Parse` and no row is processed.

use crate::error::BatchError;
use common::model::bulk_row::InputRow;

const DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Picks the candidate delimiter that occurs most often in the header line.
/// Ties go to the earlier candidate; a header with none of them uses `,`.
pub fn detect_delimiter(header_line: &str) -> char {
    let mut best = (',', 0);
    for d in DELIMITERS {
        let count = header_line.matches(d).count();
        if count > best.1 {
            best = (d, count);
        }
    }
    best.0
}

/// Parses CSV text with a header row into input rows, preserving order.
///
/// Blank lines are skipped and unknown columns ignored. A record whose field
/// count differs from the header, or a quoted field that is never closed, fails
/// the entire batch.
pub fn parse_rows(text: &str) -> Result<Vec<InputRow>, BatchError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let header_line = text
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| BatchError::Parse("missing header row".to_string()))?;

    let delimiter = detect_delimiter(header_line);
    if has_unterminated_quote(text, delimiter) {
        return Err(BatchError::Parse(
            "unterminated quoted field".to_string(),
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.deserialize::<InputRow>() {
        let row = record.map_err(describe)?;
        rows.push(row);
    }
    Ok(rows)
}

/// True when a field that opens with `"` never gets its closing quote.
///
/// A quote anywhere else in a field is an ordinary character.
fn has_unterminated_quote(text: &str, delimiter: char) -> bool {
    let mut in_quotes = false;
    let mut field_start = true;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        match ch {
            '"' if field_start => {
                in_quotes = true;
                field_start = false;
            }
            '\n' | '\r' => field_start = true,
            c if c == delimiter => field_start = true,
            _ => field_start = false,
        }
    }
    in_quotes
}

fn describe(err: csv::Error) -> BatchError {
    match err.position() {
        Some(pos) => BatchError::Parse(format!("line {}: {}", pos.line(), err)),
        None => BatchError::Parse(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_delimiters() {
        assert_eq!(detect_delimiter("phone,country,name"), ',');
        assert_eq!(detect_delimiter("phone;country;name"), ';');
        assert_eq!(detect_delimiter("phone\tcountry"), '\t');
        assert_eq!(detect_delimiter("phone|name"), '|');
        assert_eq!(detect_delimiter("phone"), ',');
    }

    #[test]
    fn parses_rows_in_order_and_ignores_unknown_columns() {
        let text = "phone,country,name,favourite_colour\n\
                    +14155552671,US,John Doe,blue\n\
                    +442071234567,GB,,red\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].phone, "+14155552671");
        assert_eq!(rows[0].name.as_deref(), Some("John Doe"));
        assert_eq!(rows[1].country.as_deref(), Some("GB"));
        assert_eq!(rows[1].name(), None);
        assert_eq!(rows[1].message, None);
    }

    #[test]
    fn missing_optional_columns_default_to_absent() {
        let rows = parse_rows("phone\n+14155552671\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].country, None);
        assert_eq!(rows[0].utm_source, None);
    }

    #[test]
    fn quoted_fields_keep_embedded_delimiters() {
        let text = "phone,message,name\n+14155552671,\"Hello {{name}}, welcome!\",John\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows[0].message.as_deref(), Some("Hello {{name}}, welcome!"));
    }

    #[test]
    fn semicolon_tables_are_supported() {
        let rows = parse_rows("phone;name\r\n+14155552671;John\r\n").unwrap();
        assert_eq!(rows[0].name.as_deref(), Some("John"));
    }

    #[test]
    fn skips_blank_lines() {
        let rows = parse_rows("phone,name\n\n+14155552671,John\n\n+14155552672,Jane\n").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn inconsistent_field_count_fails_the_batch() {
        let text = "phone,name\n+14155552671,John\n+14155552672,Jane,extra\n";
        let err = parse_rows(text).unwrap_err();
        assert!(matches!(err, BatchError::Parse(msg) if msg.contains("line 3")));
    }

    #[test]
    fn unterminated_quote_fails_the_batch() {
        let err = parse_rows("phone,message\n+14155552671,\"Hello\n").unwrap_err();
        assert!(matches!(err, BatchError::Parse(_)));
    }

    #[test]
    fn literal_quote_inside_unquoted_field_is_kept() {
        let rows = parse_rows("phone,message\n+14155552671,Our 5\" screen\n").unwrap();
        assert_eq!(rows[0].message.as_deref(), Some("Our 5\" screen"));
    }

    #[test]
    fn escaped_quotes_inside_quoted_field() {
        let text = "phone,message\n+14155552671,\"Say \"\"hi\"\", {{name}}\"\n";
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows[0].message.as_deref(), Some("Say \"hi\", {{name}}"));
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(parse_rows("  \n"), Err(BatchError::Parse(_))));
    }

    #[test]
    fn header_only_yields_no_rows() {
        assert!(parse_rows("phone,country\n").unwrap().is_empty());
    }
}
