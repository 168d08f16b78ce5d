//! Streaming VOTable reader built on quick-xml events.

use super::{compliance, Field, VoTable};
use crate::error::{VoError, VoResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// Attributes of an element, keyed by local name.
fn attributes(e: &BytesStart<'_>) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map(|v| v.to_string())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
        attrs.insert(key, value);
    }
    attrs
}

/// Is this `INFO`/`PARAM` the protocol's error report?
fn error_report(attrs: &HashMap<String, String>) -> Option<String> {
    let named_error = attrs
        .get("name")
        .or_else(|| attrs.get("ID"))
        .map(|n| n.eq_ignore_ascii_case("error"))
        .unwrap_or(false);

    if named_error {
        Some(attrs.get("value").cloned().unwrap_or_default())
    } else {
        None
    }
}

/// Reader state while walking the document.
#[derive(Default)]
struct TableBuilder {
    table: VoTable,
    saw_votable: bool,
    table_count: usize,
    in_first_table: bool,
    in_row: bool,
    in_cell: bool,
    row: Vec<String>,
    cell: String,
}

impl TableBuilder {
    fn start(&mut self, e: &BytesStart<'_>, is_empty: bool) {
        let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
        match name.as_str() {
            "VOTABLE" => {
                self.saw_votable = true;
                self.table.version = attributes(e).get("version").cloned();
            }
            "TABLE" => {
                self.table_count += 1;
                self.in_first_table = self.table_count == 1 && !is_empty;
            }
            "FIELD" if self.in_first_table => {
                let attrs = attributes(e);
                self.table.fields.push(Field {
                    name: attrs.get("name").cloned().unwrap_or_default(),
                    id: attrs.get("ID").cloned(),
                    datatype: attrs.get("datatype").cloned(),
                    ucd: attrs.get("ucd").cloned(),
                    unit: attrs.get("unit").cloned(),
                });
            }
            "INFO" | "PARAM" => {
                if let Some(message) = error_report(&attributes(e)) {
                    self.table.service_error.get_or_insert(message);
                }
            }
            "BINARY" | "BINARY2" | "FITS" if self.in_first_table => {
                self.table
                    .warnings
                    .push(format!("{} serialization is not read; rows skipped", name));
            }
            "TR" if self.in_first_table => {
                self.row.clear();
                self.in_row = !is_empty;
                if is_empty {
                    self.table.rows.push(Vec::new());
                }
            }
            "TD" if self.in_row => {
                if is_empty {
                    self.row.push(String::new());
                } else {
                    self.cell.clear();
                    self.in_cell = true;
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"TD" if self.in_cell => {
                self.in_cell = false;
                self.row.push(self.cell.trim().to_string());
            }
            b"TR" if self.in_row => {
                self.in_row = false;
                self.table.rows.push(std::mem::take(&mut self.row));
            }
            b"TABLE" => self.in_first_table = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_cell {
            self.cell.push_str(text);
        }
    }
}

/// Parse a VOTable document.
///
/// Fails only when the document is not XML or has no `VOTABLE` element;
/// standard deviations become warnings on the returned table.
pub fn parse(xml: &str) -> VoResult<VoTable> {
    let mut reader = Reader::from_str(xml);
    let mut builder = TableBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => builder.start(&e, false),
            Ok(Event::Empty(e)) => builder.start(&e, true),
            Ok(Event::End(e)) => builder.end(e.local_name().as_ref()),
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&e).to_string());
                builder.text(&text);
            }
            Ok(Event::CData(e)) => {
                builder.text(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(VoError::VoTable(format!(
                    "XML parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !builder.saw_votable {
        return Err(VoError::VoTable(
            "response is not a VOTable document".to_string(),
        ));
    }

    let mut table = builder.table;
    let warnings = compliance::check(&table, builder.table_count);
    table.warnings.extend(warnings);
    Ok(table)
}
