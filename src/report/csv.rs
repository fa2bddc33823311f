use crate::analysis::analyzer::ElementRow;

// ============================================================================
// CSV export: one row per element
// ============================================================================

/// Byte-order mark so spreadsheet tools detect UTF-8 (Arabic labels).
const UTF8_BOM: &str = "\u{feff}";

/// Render analysis rows as RFC 4180 CSV with a header line.
///
/// ```text
/// element_id,tag_name,primary_selector,...
/// 1,button,#go,"{""id_selector"":""#go"",...}",interactive,...
/// ```
pub fn generate_csv(rows: &[ElementRow]) -> String {
    let mut out = String::from(UTF8_BOM);
    push_record(&mut out, ElementRow::HEADERS.iter().copied());

    for row in rows {
        let fields = row.fields();
        push_record(&mut out, fields.iter().map(String::as_str));
    }

    out
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let line: Vec<String> = fields.map(escape_csv).collect();
    out.push_str(&line.join(","));
    out.push_str("\r\n");
}

/// Quote a field when it contains a delimiter, quote or line break.
pub fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_untouched() {
        assert_eq!(escape_csv("button"), "button");
        assert_eq!(escape_csv(""), "");
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(escape_csv(r#"say "hi""#), r#""say ""hi""""#);
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
    }
}
