use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::Result;

const KML_NS: &[u8] = b"http://www.opengis.net/kml/2.2";

/// Placemark fields as they appear in the document, before extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPlacemark {
    pub name: String,
    pub coordinates: String,
    pub description: String,
}

/// Which placemark child is currently having its text collected.
enum Capture {
    None,
    Name,
    Coordinates,
    Description,
}

/// Parse a KML document and return its placemarks in document order.
///
/// `name` and `description` are read from the first direct child of each
/// placemark, `coordinates` from the first coordinate-bearing descendant
/// (points nest it under `Point`, tracks under `LineString`). All three are
/// trimmed; absent children yield empty strings.
pub fn parse_placemarks(kml: &[u8]) -> Result<Vec<RawPlacemark>> {
    let mut reader = NsReader::from_reader(kml);
    let mut buf = Vec::new();

    let mut placemarks = Vec::new();
    let mut current: Option<RawPlacemark> = None;
    // open elements below the current placemark; 1 = direct child
    let mut depth = 0usize;
    let mut capture = Capture::None;
    let mut capture_level = 0usize;
    let mut have_name = false;
    let mut have_coordinates = false;
    let mut have_description = false;

    loop {
        match reader.read_resolved_event_into(&mut buf)? {
            (ns, Event::Start(e)) => {
                if current.is_none() {
                    if is_kml(&ns) && e.local_name().as_ref() == b"Placemark" {
                        current = Some(RawPlacemark::default());
                        depth = 0;
                        capture = Capture::None;
                        have_name = false;
                        have_coordinates = false;
                        have_description = false;
                    }
                } else {
                    depth += 1;
                    if matches!(capture, Capture::None) && is_kml(&ns) {
                        match e.local_name().as_ref() {
                            b"name" if depth == 1 && !have_name => {
                                capture = Capture::Name;
                                capture_level = depth;
                                have_name = true;
                            }
                            b"description" if depth == 1 && !have_description => {
                                capture = Capture::Description;
                                capture_level = depth;
                                have_description = true;
                            }
                            b"coordinates" if !have_coordinates => {
                                capture = Capture::Coordinates;
                                capture_level = depth;
                                have_coordinates = true;
                            }
                            _ => {}
                        }
                    }
                }
            }
            (ns, Event::Empty(e)) => {
                if current.is_none() {
                    if is_kml(&ns) && e.local_name().as_ref() == b"Placemark" {
                        placemarks.push(RawPlacemark::default());
                    }
                } else if matches!(capture, Capture::None) && is_kml(&ns) {
                    // self-closing children carry no text but still claim
                    // their first-match slot
                    match e.local_name().as_ref() {
                        b"name" if depth == 0 => have_name = true,
                        b"description" if depth == 0 => have_description = true,
                        b"coordinates" => have_coordinates = true,
                        _ => {}
                    }
                }
            }
            (_, Event::End(_)) => {
                if current.is_some() {
                    if depth == 0 {
                        let mut done = current.take().unwrap_or_default();
                        trim_fields(&mut done);
                        placemarks.push(done);
                    } else {
                        if !matches!(capture, Capture::None) && depth == capture_level {
                            capture = Capture::None;
                        }
                        depth -= 1;
                    }
                }
            }
            (_, Event::Text(t)) => {
                if let Some(field) = captured_field(current.as_mut(), &capture) {
                    let text = t.unescape().map_err(quick_xml::Error::from)?;
                    field.push_str(&text);
                }
            }
            (_, Event::CData(t)) => {
                if let Some(field) = captured_field(current.as_mut(), &capture) {
                    field.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(placemarks)
}

fn is_kml(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(n)) if *n == KML_NS)
}

fn captured_field<'a>(
    placemark: Option<&'a mut RawPlacemark>,
    capture: &Capture,
) -> Option<&'a mut String> {
    let pm = placemark?;
    match capture {
        Capture::None => None,
        Capture::Name => Some(&mut pm.name),
        Capture::Coordinates => Some(&mut pm.coordinates),
        Capture::Description => Some(&mut pm.description),
    }
}

fn trim_fields(pm: &mut RawPlacemark) {
    pm.name = pm.name.trim().to_string();
    pm.coordinates = pm.coordinates.trim().to_string();
    pm.description = pm.description.trim().to_string();
}
