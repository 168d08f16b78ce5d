//! Cone Search standard checks applied after a VOTable is read.

use super::VoTable;

/// Columns every cone search response must identify exactly once, as
/// (UCD1, UCD1+) pairs.
const REQUIRED_UCDS: [(&str, &str); 3] = [
    ("ID_MAIN", "meta.id;meta.main"),
    ("POS_EQ_RA_MAIN", "pos.eq.ra;meta.main"),
    ("POS_EQ_DEC_MAIN", "pos.eq.dec;meta.main"),
];

/// Collect deviations from the standard.
pub(super) fn check(table: &VoTable, table_count: usize) -> Vec<String> {
    let mut warnings = Vec::new();

    if table.version.is_none() {
        warnings.push("VOTABLE element has no version attribute".to_string());
    }

    // An error report legitimately comes without a table
    if table.service_error.is_some() {
        return warnings;
    }

    match table_count {
        0 => {
            warnings.push("response contains no TABLE".to_string());
            return warnings;
        }
        1 => {}
        n => warnings.push(format!(
            "response contains {} TABLE elements; only the first is read",
            n
        )),
    }

    for field in &table.fields {
        if field.datatype.is_none() {
            warnings.push(format!("FIELD '{}' has no datatype", field.name));
        }
    }

    for (ucd1, ucd1_plus) in REQUIRED_UCDS {
        let count = table
            .fields
            .iter()
            .filter_map(|f| f.ucd.as_deref())
            .filter(|ucd| ucd.eq_ignore_ascii_case(ucd1) || ucd.eq_ignore_ascii_case(ucd1_plus))
            .count();
        if count != 1 {
            warnings.push(format!(
                "expected exactly one FIELD with ucd {} (or {}), found {}",
                ucd1, ucd1_plus, count
            ));
        }
    }

    let width = table.fields.len();
    let ragged = table.rows.iter().filter(|row| row.len() != width).count();
    if ragged > 0 {
        warnings.push(format!(
            "{} rows do not have {} cells to match the FIELD list",
            ragged, width
        ));
    }

    warnings
}
