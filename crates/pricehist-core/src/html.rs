//! History table extraction from a rendered page.
//!
//! A deliberately small tag scanner: matching is ASCII case-insensitive on
//! tag names, nested tables are not supported, and only the entities the
//! history page actually emits are decoded.

use crate::RawTable;

const CONTAINER_MARKER: &str = "table-container";

/// Extract the price-history table from `html`.
///
/// Looks for the first `<table>` after a `table-container` element, then
/// falls back to the first table carrying a `<thead>`. Returns `None` when
/// neither exists.
pub fn extract_history_table(html: &str) -> Option<RawTable> {
    let lc = to_lowercase_fast(html);

    let table = lc
        .find(CONTAINER_MARKER)
        .and_then(|from| table_block_at(html, &lc, from))
        .or_else(|| first_table_with_thead(html, &lc))?;

    Some(read_table(table))
}

fn first_table_with_thead<'a>(html: &'a str, lc: &str) -> Option<&'a str> {
    let mut from = 0;
    while let Some((start, end)) = next_tag_block(html, lc, "table", from) {
        let block = &html[start..end];
        if lc[start..end].contains("<thead") {
            return Some(block);
        }
        from = end;
    }
    None
}

fn table_block_at<'a>(html: &'a str, lc: &str, from: usize) -> Option<&'a str> {
    next_tag_block(html, lc, "table", from).map(|(start, end)| &html[start..end])
}

fn read_table(table: &str) -> RawTable {
    let lc = to_lowercase_fast(table);

    let headers = section(table, &lc, "thead")
        .map(|thead| cells(thead, "th"))
        .unwrap_or_default();

    let body = section(table, &lc, "tbody").unwrap_or(table);
    let body_lc = to_lowercase_fast(body);
    let mut rows = Vec::new();
    let mut from = 0;
    while let Some((start, end)) = next_tag_block(body, &body_lc, "tr", from) {
        let row = cells(&body[start..end], "td");
        // Header rows repeated in the body have no <td>.
        if !row.is_empty() {
            rows.push(row);
        }
        from = end;
    }

    RawTable::new(headers, rows)
}

/// Inner HTML of the first `<name>` element.
fn section<'a>(s: &'a str, lc: &str, name: &str) -> Option<&'a str> {
    let (start, end) = next_tag_block(s, lc, name, 0)?;
    let block = &s[start..end];
    let open_end = block.find('>')? + 1;
    let close_start = block.len() - closing_tag(name).len();
    block.get(open_end..close_start)
}

/// Text of every `<cell>` in `row`, with `colspan` cells padded out.
fn cells(row: &str, cell: &str) -> Vec<String> {
    let lc = to_lowercase_fast(row);
    let mut out = Vec::new();
    let mut from = 0;
    while let Some((start, end)) = next_tag_block(row, &lc, cell, from) {
        let block = &row[start..end];
        out.push(cell_text(block));
        for _ in 1..colspan(&lc[start..end]) {
            out.push(String::new());
        }
        from = end;
    }
    out
}

fn cell_text(block: &str) -> String {
    normalize_ws(&decode_entities(&strip_tags(inner_after_open_tag(block))))
}

fn colspan(block_lc: &str) -> usize {
    let Some(open_end) = block_lc.find('>') else {
        return 1;
    };
    let open_tag = &block_lc[..open_end];
    let Some(at) = open_tag.find("colspan=") else {
        return 1;
    };
    open_tag[at + "colspan=".len()..]
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse::<usize>()
        .ok()
        .filter(|span| *span > 0)
        .unwrap_or(1)
}

/// Next `<name ...> ... </name>` block at or after `from`, as byte offsets.
///
/// `lc` must be the ASCII-lowercased form of `s`, so offsets agree.
fn next_tag_block(s: &str, lc: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let open = format!("<{name}");
    let close = closing_tag(name);

    let mut search = from;
    let start = loop {
        let at = lc.get(search..)?.find(&open)? + search;
        // Reject prefixes: <th> must not match <thead>.
        let next = lc[at + open.len()..].chars().next()?;
        if next == '>' || next.is_ascii_whitespace() || next == '/' {
            break at;
        }
        search = at + open.len();
    };

    let open_end = s[start..].find('>')? + start + 1;
    let end = lc[open_end..].find(&close)? + open_end + close.len();
    Some((start, end))
}

fn closing_tag(name: &str) -> String {
    format!("</{name}>")
}

fn inner_after_open_tag(block: &str) -> &str {
    match (block.find('>'), block.rfind('<')) {
        (Some(open_end), Some(close_start)) if close_start > open_end => {
            &block[open_end + 1..close_start]
        }
        _ => "",
    }
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            // Tag boundaries separate words.
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ASCII-only lowercasing keeps byte offsets aligned with the input.
fn to_lowercase_fast(s: &str) -> String {
    s.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table class="nav"><tr><td>menu</td></tr></table>
        <div class="table-container yf-ewueuo">
          <TABLE class="table yf-ewueuo">
            <thead><tr>
              <th>Date</th><th>Open</th><th>High</th><th>Low</th>
              <th>Close <span>Close price adjusted for splits.</span></th>
              <th>Adj Close <span>Adjusted close price.</span></th>
              <th>Volume</th>
            </tr></thead>
            <tbody>
              <tr><td>Jun 14, 2024</td><td>3,850.00</td><td>3,880.10</td><td>3,830.00</td>
                  <td>3,870.50</td><td>3,870.50</td><td>1,234,567</td></tr>
              <tr><td>Jun 13, 2024</td><td colspan="6">18.00 Dividend</td></tr>
              <tr><td>Jun 12, 2024</td><td>3,800.00</td><td>3,845.25</td><td>3,790.00</td>
                  <td>3,840.00</td><td>3,840.00</td><td>-</td></tr>
            </tbody>
          </TABLE>
        </div>
        </body></html>
    "#;

    #[test]
    fn extracts_table_inside_container() {
        let table = extract_history_table(PAGE).expect("table");

        assert_eq!(table.headers.len(), 7);
        assert_eq!(table.headers[0], "Date");
        assert_eq!(table.headers[4], "Close Close price adjusted for splits.");
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][1], "3,850.00");
        assert_eq!(table.rows[2][6], "-");
    }

    #[test]
    fn pads_colspan_rows_to_header_arity() {
        let table = extract_history_table(PAGE).expect("table");

        assert_eq!(table.rows[1].len(), 7);
        assert_eq!(table.rows[1][1], "18.00 Dividend");
        assert!(table.rows[1][2..].iter().all(String::is_empty));
    }

    #[test]
    fn falls_back_to_first_table_with_thead() {
        let html = "<table><tr><td>x</td></tr></table>\
                    <table><thead><tr><th>Date</th></tr></thead>\
                    <tbody><tr><td>Jan 2, 2024</td></tr></tbody></table>";
        let table = extract_history_table(html).expect("table");

        assert_eq!(table.headers, vec![String::from("Date")]);
        assert_eq!(table.rows, vec![vec![String::from("Jan 2, 2024")]]);
    }

    #[test]
    fn missing_table_is_none() {
        assert!(extract_history_table("<html><p>consent required</p></html>").is_none());
    }

    #[test]
    fn decodes_entities_and_collapses_whitespace() {
        assert_eq!(
            cell_text("<td>  M&amp;M\n <b>Ltd</b>&nbsp; </td>"),
            "M&M Ltd"
        );
    }
}
