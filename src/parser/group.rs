use super::extract;
use super::html;
use super::kml::RawPlacemark;
use crate::model::{FormGroup, NO_FORM};

/// Bucket placemarks by the heading of their description.
///
/// Groups appear in order of first appearance; records keep source document
/// order within their group. Placemarks without a recognizable heading are
/// collected under the [`NO_FORM`] sentinel rather than dropped, so every
/// placemark lands in exactly one group.
pub fn group_by_form(placemarks: &[RawPlacemark]) -> Vec<FormGroup> {
    let mut groups: Vec<FormGroup> = Vec::new();

    for raw in placemarks {
        let label =
            html::form_heading(&raw.description).unwrap_or_else(|| NO_FORM.to_string());
        let record = extract::record_from(raw);
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.records.push(record),
            None => groups.push(FormGroup {
                label,
                records: vec![record],
            }),
        }
    }

    groups
}
