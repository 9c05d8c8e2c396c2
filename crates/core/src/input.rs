//! Batch input parsing.
//!
//! The input is a CSV file with a header row followed by rows of
//! `app_id,role_desc,scenes,style`. Scenes inside the third column are
//! separated by `;` since the comma is taken by the CSV itself. Quoted
//! fields may contain commas, `""` escapes and line breaks.

use crate::error::CoreError;

/// Separator between scene names inside the scenes column.
pub const SCENE_SEPARATOR: char = ';';

/// Number of columns a usable row must have.
const REQUIRED_COLUMNS: usize = 4;

/// One generation request described by an input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneRow {
    pub app_id: i64,
    pub role_desc: String,
    pub scenes: Vec<String>,
    pub style: String,
}

/// A data row that was dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the input.
    pub line: usize,
    pub reason: String,
}

/// Parsed input: usable rows plus the rows that were skipped.
#[derive(Debug, Default)]
pub struct ParsedInput {
    pub rows: Vec<SceneRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Parse batch input CSV.
///
/// The first record is a header and is ignored. Rows with fewer than four
/// columns or a non-integer `app_id` are reported in
/// [`ParsedInput::skipped`]. Fails when there is no data row at all.
pub fn parse_rows(text: &str) -> Result<ParsedInput, CoreError> {
    let records = split_records(text);

    if records.len() < 2 {
        return Err(CoreError::Validation(
            "Input must contain a header row and at least one data row".into(),
        ));
    }

    let mut parsed = ParsedInput::default();
    for record in records.into_iter().skip(1) {
        match parse_record(&record.fields) {
            Ok(row) => parsed.rows.push(row),
            Err(reason) => parsed.skipped.push(SkippedRow {
                line: record.line,
                reason,
            }),
        }
    }
    Ok(parsed)
}

fn parse_record(fields: &[String]) -> Result<SceneRow, String> {
    if fields.len() < REQUIRED_COLUMNS {
        return Err(format!(
            "expected {REQUIRED_COLUMNS} columns, found {}",
            fields.len()
        ));
    }

    let app_id = fields[0]
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid app_id '{}': {e}", fields[0]))?;

    let scenes = fields[2]
        .split(SCENE_SEPARATOR)
        .map(|s| s.trim().to_string())
        .collect();

    Ok(SceneRow {
        app_id,
        role_desc: fields[1].trim().to_string(),
        scenes,
        style: fields[3].trim().to_string(),
    })
}

/// One CSV record and the 1-based line it starts on.
#[derive(Debug, PartialEq, Eq)]
struct Record {
    line: usize,
    fields: Vec<String>,
}

/// Split CSV text into records.
///
/// A line break ends the record unless it sits inside a quoted field.
/// `\r\n` endings are accepted. Records that are blank are dropped.
fn split_records(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut line = 1;
    let mut start = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match (quoted, ch) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            (true, '"') => quoted = false,
            (false, '"') => quoted = true,
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (false, '\r') if chars.peek() == Some(&'\n') => {}
            (false, '\n') => {
                line += 1;
                end_record(&mut records, &mut fields, &mut field, start);
                start = line;
            }
            (_, ch) => {
                if ch == '\n' {
                    line += 1;
                }
                field.push(ch);
            }
        }
    }
    end_record(&mut records, &mut fields, &mut field, start);
    records
}

fn end_record(
    records: &mut Vec<Record>,
    fields: &mut Vec<String>,
    field: &mut String,
    line: usize,
) {
    fields.push(std::mem::take(field));
    let fields = std::mem::take(fields);
    let blank = fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push(Record { line, fields });
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const HEADER: &str = "app_id,role_desc,scenes,style";

    #[test]
    fn parses_rows_and_splits_scenes() {
        let text = format!("{HEADER}\n7,a knight, sunset ; forest ,anime\n");
        let parsed = parse_rows(&text).unwrap();

        assert_eq!(
            parsed.rows,
            vec![SceneRow {
                app_id: 7,
                role_desc: "a knight".into(),
                scenes: vec!["sunset".into(), "forest".into()],
                style: "anime".into(),
            }]
        );
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn quoted_fields_may_contain_commas() {
        let text = format!("{HEADER}\n1,\"tall, dark \"\"hero\"\"\",a;b,real\n");
        let parsed = parse_rows(&text).unwrap();
        assert_eq!(parsed.rows[0].role_desc, "tall, dark \"hero\"");
    }

    #[test]
    fn short_and_bad_rows_are_skipped() {
        let text = format!("{HEADER}\n1,r,s\nabc,r,s,x\n2,r,s,x\n");
        let parsed = parse_rows(&text).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].app_id, 2);
        assert_eq!(
            parsed.skipped.iter().map(|s| s.line).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[test]
    fn header_only_is_rejected() {
        assert_matches!(parse_rows(HEADER), Err(CoreError::Validation(_)));
        assert_matches!(parse_rows(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_lines_are_ignored() {
        let text = format!("{HEADER}\n\n1,r,s,x\n\n");
        assert_eq!(parse_rows(&text).unwrap().rows.len(), 1);
    }

    fn fields(records: &[Record]) -> Vec<Vec<&str>> {
        records
            .iter()
            .map(|r| r.fields.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn record_splitting() {
        let records = split_records("a,b,,c\r\n\"x,y\",z");
        assert_eq!(fields(&records), vec![vec!["a", "b", "", "c"], vec!["x,y", "z"]]);
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn quoted_line_breaks_stay_in_the_field() {
        let text = format!("{HEADER}\n1,\"first line\nsecond line\",a;b,real\n2,r,s,x\n");
        let parsed = parse_rows(&text).unwrap();

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].role_desc, "first line\nsecond line");
        assert_eq!(parsed.rows[1].app_id, 2);
    }

    #[test]
    fn skipped_rows_report_their_starting_line() {
        let text = format!("{HEADER}\n1,\"multi\nline\",s,x\nbad,r,s,x\n");
        let parsed = parse_rows(&text).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.skipped[0].line, 4);
    }
}
