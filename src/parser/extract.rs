use super::html;
use super::kml::RawPlacemark;
use crate::model::PlacemarkRecord;

/// Build a record from a raw placemark: positional coordinate split plus
/// the description's table fields.
pub fn record_from(raw: &RawPlacemark) -> PlacemarkRecord {
    let (longitude, latitude, altitude) = split_coordinates(&raw.coordinates);
    PlacemarkRecord {
        name: raw.name.clone(),
        longitude,
        latitude,
        altitude,
        extra: html::table_fields(&raw.description),
    }
}

/// Split a comma-separated coordinate tuple into (longitude, latitude,
/// altitude). Tokens are kept verbatim to preserve the source formatting;
/// missing positions stay empty and tokens past the third are ignored.
pub fn split_coordinates(text: &str) -> (String, String, String) {
    let mut parts = text.split(',');
    let mut next = || parts.next().unwrap_or("").to_string();
    (next(), next(), next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(text: &str) -> (String, String, String) {
        split_coordinates(text)
    }

    #[test]
    fn full_tuple() {
        assert_eq!(coords("1.0,2.0,3.0"), ("1.0".into(), "2.0".into(), "3.0".into()));
    }

    #[test]
    fn two_tokens() {
        assert_eq!(coords("1.0,2.0"), ("1.0".into(), "2.0".into(), "".into()));
    }

    #[test]
    fn one_token() {
        assert_eq!(coords("1.0"), ("1.0".into(), "".into(), "".into()));
    }

    #[test]
    fn empty_text() {
        assert_eq!(coords(""), ("".into(), "".into(), "".into()));
    }

    #[test]
    fn extra_tokens_ignored() {
        assert_eq!(coords("1,2,3,4"), ("1".into(), "2".into(), "3".into()));
    }

    #[test]
    fn tokens_kept_verbatim() {
        // embedded spaces are source formatting, not separators
        assert_eq!(coords("1.0, 2.0"), ("1.0".into(), " 2.0".into(), "".into()));
    }

    #[test]
    fn record_pulls_table_fields() {
        let raw = RawPlacemark {
            name: "Oak 12".into(),
            coordinates: "-58.4,-34.6".into(),
            description: "<h1>Trees</h1><table><tr><td>Species</td><td>Oak</td></tr></table>"
                .into(),
        };
        let record = record_from(&raw);
        assert_eq!(record.name, "Oak 12");
        assert_eq!(record.longitude, "-58.4");
        assert_eq!(record.latitude, "-34.6");
        assert_eq!(record.altitude, "");
        assert_eq!(record.extra.get("Species"), Some("Oak"));
    }

    #[test]
    fn unparsable_description_degrades_to_empty() {
        let raw = RawPlacemark {
            description: "<<<not html".into(),
            ..Default::default()
        };
        let record = record_from(&raw);
        assert!(record.extra.is_empty());
    }
}
