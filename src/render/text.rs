//! Plain-text table renderer.

use crate::patch::RecordSet;
use unicode_width::UnicodeWidthStr;

/// Render a record set as an aligned text table.
///
/// Column widths are measured in terminal cells, so wide characters
/// line up.
pub fn to_text_table(set: &RecordSet) -> String {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(set.records.len() + 1);

    let mut header = vec!["ROW".to_string()];
    header.extend(set.header.names().map(str::to_string));
    rows.push(header);

    for record in &set.records {
        let mut row = vec![record.source_row.to_string()];
        row.extend(record.fields().map(|(_, value)| value.to_string()));
        rows.push(row);
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|r| r.get(c))
                .map(|cell| cell.width())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect();
        out.push_str(line.join(" | ").trim_end());
        out.push('\n');

        if i == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            out.push_str(&rule.join("-+-"));
            out.push('\n');
        }
    }
    out
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.width());
    format!("{}{}", cell, " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{HeaderMap, Record};

    #[test]
    fn test_table_alignment() {
        let set = RecordSet {
            name: "Codes".to_string(),
            header: HeaderMap::from_names(["CODE", "DECODE", "FUNCTION"]).unwrap(),
            records: vec![Record::new(
                2,
                vec![
                    ("CODE".into(), "日本".into()),
                    ("DECODE".into(), "x".into()),
                    ("FUNCTION".into(), "NewCategory".into()),
                ],
            )],
        };

        let table = to_text_table(&set);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ROW | CODE | DECODE | FUNCTION");
        assert_eq!(lines[1], "----+------+--------+------------");
        assert_eq!(lines[2], "2   | 日本 | x      | NewCategory");
    }
}
