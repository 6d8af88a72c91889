pub mod extract;
pub mod group;
pub mod html;
pub mod kml;

use crate::error::Result;
use crate::model::FormGroup;

/// Full extraction pipeline: KML bytes → placemarks → records → form groups.
pub fn parse_groups(kml_bytes: &[u8]) -> Result<Vec<FormGroup>> {
    let placemarks = kml::parse_placemarks(kml_bytes)?;
    Ok(group::group_by_form(&placemarks))
}
