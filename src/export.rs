use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::FormGroup;

static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

pub const FIXED_COLUMNS: [&str; 4] = ["Name", "Longitude", "Latitude", "Altitude"];

/// Column list for a group: the four positional columns followed by the
/// `extra` keys of the group's *first* record, in insertion order.
///
/// The schema is derived from that single exemplar record, not the union of
/// all records' keys — keys that only appear in later records are dropped at
/// serialization time.
pub fn schema(group: &FormGroup) -> Vec<String> {
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    if let Some(first) = group.records.first() {
        columns.extend(first.extra.keys().map(str::to_string));
    }
    columns
}

/// Serialize a group to CSV bytes under its schema. Schema columns missing
/// from a record render as empty cells.
pub fn render_csv(group: &FormGroup) -> Result<Vec<u8>> {
    let columns = schema(group);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;

    for record in &group.records {
        let mut row: Vec<&str> = vec![
            record.name.as_str(),
            record.longitude.as_str(),
            record.latitude.as_str(),
            record.altitude.as_str(),
        ];
        for column in &columns[FIXED_COLUMNS.len()..] {
            row.push(record.extra.get(column).unwrap_or(""));
        }
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Csv(e.into_error().into()))
}

/// Export a group to `<out_dir>/<slug>.csv`.
///
/// The CSV is materialized in full before the destination is touched, so an
/// aborted run never leaves a half-written file behind.
pub fn export_group(group: &FormGroup, out_dir: &Path) -> Result<PathBuf> {
    let bytes = render_csv(group)?;
    let path = out_dir.join(format!("{}.csv", slug_for_label(&group.label)));
    fs::write(&path, bytes).map_err(|source| Error::OutputWrite {
        path: path.clone(),
        source,
    })?;
    info!(
        "wrote {} records of form {:?} to {}",
        group.records.len(),
        group.label,
        path.display()
    );
    Ok(path)
}

/// Lowercased label with non-alphanumeric runs collapsed to `_`.
pub fn slug_for_label(label: &str) -> String {
    let lowered = label.to_lowercase();
    let slug = SLUG_RE.replace_all(&lowered, "_");
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "form".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldMap, PlacemarkRecord, NO_FORM};

    fn record(name: &str, fields: &[(&str, &str)]) -> PlacemarkRecord {
        let mut extra = FieldMap::new();
        for (k, v) in fields {
            extra.insert(k.to_string(), v.to_string());
        }
        PlacemarkRecord {
            name: name.into(),
            longitude: "1.0".into(),
            latitude: "2.0".into(),
            altitude: String::new(),
            extra,
        }
    }

    fn group(label: &str, records: Vec<PlacemarkRecord>) -> FormGroup {
        FormGroup {
            label: label.into(),
            records,
        }
    }

    #[test]
    fn schema_follows_first_record() {
        let g = group(
            "Trees",
            vec![
                record("a", &[("A", "1"), ("B", "2")]),
                record("b", &[("B", "3"), ("C", "4")]),
            ],
        );
        assert_eq!(
            schema(&g),
            vec!["Name", "Longitude", "Latitude", "Altitude", "A", "B"]
        );
    }

    #[test]
    fn later_record_keys_outside_schema_are_dropped() {
        let g = group(
            "Trees",
            vec![
                record("a", &[("A", "1"), ("B", "2")]),
                record("b", &[("B", "3"), ("C", "4")]),
            ],
        );
        let csv = String::from_utf8(render_csv(&g).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Name,Longitude,Latitude,Altitude,A,B");
        assert_eq!(lines[1], "a,1.0,2.0,,1,2");
        // A empty, B=3, no C column anywhere
        assert_eq!(lines[2], "b,1.0,2.0,,,3");
        assert!(!csv.contains('4'));
    }

    #[test]
    fn empty_group_renders_fixed_header_only() {
        let g = group("Trees", vec![]);
        let csv = String::from_utf8(render_csv(&g).unwrap()).unwrap();
        assert_eq!(csv, "Name,Longitude,Latitude,Altitude\n");
    }

    #[test]
    fn delimiters_and_quotes_are_escaped() {
        let g = group(
            "Trees",
            vec![record("a,b", &[("Note", "said \"hi\", left")])],
        );
        let csv = String::from_utf8(render_csv(&g).unwrap()).unwrap();
        assert!(csv.contains("\"a,b\""));
        assert!(csv.contains("\"said \"\"hi\"\", left\""));
    }

    #[test]
    fn render_is_deterministic() {
        let g = group("Trees", vec![record("a", &[("A", "1")])]);
        assert_eq!(render_csv(&g).unwrap(), render_csv(&g).unwrap());
    }

    #[test]
    fn slugs() {
        assert_eq!(slug_for_label("Tree Survey"), "tree_survey");
        assert_eq!(slug_for_label(NO_FORM), "no_form");
        assert_eq!(slug_for_label("Relevés 2025!"), "relev_s_2025");
        assert_eq!(slug_for_label("***"), "form");
    }

    #[test]
    fn export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let g = group("Tree Survey", vec![record("a", &[("A", "1")])]);
        let path = export_group(&g, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "tree_survey.csv");
        assert_eq!(fs::read(&path).unwrap(), render_csv(&g).unwrap());
    }

    #[test]
    fn unwritable_destination_is_output_write_error() {
        let g = group("Trees", vec![]);
        let err = export_group(&g, Path::new("/nonexistent-dir-for-sure")).unwrap_err();
        assert!(matches!(err, Error::OutputWrite { .. }));
    }
}
