//! The pull-request ↔ issue link table, as JSON or CSV.

use agentlens_core::IssueLink;
use serde_json::Value;

/// Rows of a JSON array of `{pr_id, issue_number}` objects. Rows missing
/// either id are dropped.
pub fn from_json(value: &Value) -> Vec<IssueLink> {
    match value {
        Value::Array(rows) => rows.iter().filter_map(IssueLink::from_value).collect(),
        _ => {
            tracing::warn!("link table is not a JSON array, ignored");
            Vec::new()
        }
    }
}

/// Rows of a CSV table whose header names `pr_id` and `issue_number`
/// columns (in any position). Without both columns the table is empty.
pub fn from_csv(text: &str) -> Vec<IssueLink> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let header = split_row(header.trim_start_matches('\u{feff}'));
    let column = |name: &str| header.iter().position(|h| h == name);
    let (Some(pr_col), Some(issue_col)) = (column("pr_id"), column("issue_number")) else {
        tracing::warn!("link table lacks pr_id/issue_number columns, ignored");
        return Vec::new();
    };

    let mut links = Vec::new();
    for (n, line) in lines.enumerate() {
        let row = split_row(line);
        match (cell(&row, pr_col), cell(&row, issue_col)) {
            (Some(pr_id), Some(issue_number)) => links.push(IssueLink {
                pr_id,
                issue_number,
            }),
            _ => tracing::debug!(row = n + 2, "incomplete link row skipped"),
        }
    }
    links
}

fn cell(row: &[String], col: usize) -> Option<String> {
    row.get(col).filter(|c| !c.is_empty()).cloned()
}

/// Split one CSV line. Double-quoted fields may contain commas and `""`
/// escapes; fields are trimmed.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(pr: &str, issue: &str) -> IssueLink {
        IssueLink {
            pr_id: pr.into(),
            issue_number: issue.into(),
        }
    }

    #[test]
    fn json_rows_accept_numbers_and_strings() {
        let v = json!([
            {"pr_id": 10, "issue_number": "3"},
            {"pr_id": "11"},
            "junk",
            {"pr_id": "12", "issue_number": 4},
        ]);
        assert_eq!(from_json(&v), vec![link("10", "3"), link("12", "4")]);
        assert!(from_json(&json!({"pr_id": 1})).is_empty());
    }

    #[test]
    fn csv_columns_found_by_name() {
        let text = "repo,issue_number,pr_id\n\"acme, inc\",7,100\nacme,,101\nacme,9,102\n";
        assert_eq!(from_csv(text), vec![link("100", "7"), link("102", "9")]);
    }

    #[test]
    fn csv_without_required_columns_is_empty() {
        assert!(from_csv("pr,issue\n1,2\n").is_empty());
        assert!(from_csv("").is_empty());
    }

    #[test]
    fn quoted_fields_unescape() {
        assert_eq!(split_row(r#"a,"b ""c"", d",e"#), vec!["a", "b \"c\", d", "e"]);
    }
}
