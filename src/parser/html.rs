use quick_xml::events::{BytesText, Event};
use quick_xml::Reader;

use crate::model::FieldMap;

/// Lenient reader over a description fragment. Survey apps emit HTML that is
/// rarely well-formed XML, so end-tag name checking is off and unmatched end
/// tags are allowed; the scan keeps going instead of bailing out.
fn fragment_reader(html: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

/// Decode a text event, keeping the raw bytes when entity decoding fails
/// (stray ampersands are common in the wild).
fn text_of(t: &BytesText) -> String {
    match t.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => String::from_utf8_lossy(t).into_owned(),
    }
}

fn tag_is(name: &[u8], tag: &[u8]) -> bool {
    name.eq_ignore_ascii_case(tag)
}

/// Text of the first `<h1>` in the fragment, used as the form label.
///
/// Returns `None` when the fragment is empty, has no `<h1>`, or the heading
/// text trims to nothing. Later headings are ignored.
pub fn form_heading(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }

    let mut reader = fragment_reader(html);
    let mut in_h1 = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if tag_is(e.local_name().as_ref(), b"h1") => in_h1 = true,
            Ok(Event::End(e)) if in_h1 && tag_is(e.local_name().as_ref(), b"h1") => break,
            Ok(Event::Text(t)) if in_h1 => text.push_str(&text_of(&t)),
            Ok(Event::CData(t)) if in_h1 => {
                text.push_str(&String::from_utf8_lossy(&t.into_inner()))
            }
            Ok(Event::Eof) => break,
            // irrecoverable markup: settle for what was collected
            Err(_) => break,
            _ => {}
        }
    }

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Key/value pairs from every two-cell table row in the fragment.
///
/// Rows are processed across all tables in document order; a later row with
/// the same key overwrites the earlier value in place. Rows with any other
/// cell count, and rows whose key trims to empty, are skipped. The scan is
/// best-effort: a parse error ends it with whatever was collected so far.
pub fn table_fields(html: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    if html.is_empty() {
        return fields;
    }

    let mut reader = fragment_reader(html);
    let mut in_table = false;
    let mut in_row = false;
    let mut in_cell = false;
    let mut cells: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                let name = name.as_ref();
                if tag_is(name, b"table") {
                    in_table = true;
                } else if in_table && tag_is(name, b"tr") {
                    in_row = true;
                    in_cell = false;
                    cells.clear();
                } else if in_row && tag_is(name, b"td") {
                    in_cell = true;
                    cells.push(String::new());
                }
            }
            Ok(Event::Empty(e)) => {
                // <td/> is an empty cell
                if in_row && tag_is(e.local_name().as_ref(), b"td") {
                    cells.push(String::new());
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                let name = name.as_ref();
                if tag_is(name, b"td") {
                    in_cell = false;
                } else if tag_is(name, b"tr") {
                    if in_row {
                        flush_row(&mut cells, &mut fields);
                    }
                    in_row = false;
                    in_cell = false;
                } else if tag_is(name, b"table") {
                    in_table = false;
                    in_row = false;
                    in_cell = false;
                }
            }
            Ok(Event::Text(t)) if in_cell => {
                if let Some(cell) = cells.last_mut() {
                    cell.push_str(&text_of(&t));
                }
            }
            Ok(Event::CData(t)) if in_cell => {
                if let Some(cell) = cells.last_mut() {
                    cell.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    fields
}

/// A row maps to a field only when it has exactly two cells and a non-empty
/// key; anything else is dropped.
fn flush_row(cells: &mut Vec<String>, fields: &mut FieldMap) {
    if cells.len() == 2 {
        let key = cells[0].trim();
        if !key.is_empty() {
            fields.insert(key.to_string(), cells[1].trim().to_string());
        }
    }
    cells.clear();
}
