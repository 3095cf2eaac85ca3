//! GPX track-point and waypoint extraction.
//!
//! Only elements in the GPX 1.1 namespace are read. Track points come first, then waypoints,
//! each group in document order. A document that fails to parse produces no coordinates at
//! all rather than a partial list.

use quick_xml::{
    events::{BytesStart, Event},
    name::{Namespace, ResolveResult},
    reader::NsReader,
};

use crate::foundation::{
    core::Coordinate,
    error::{ReittiError, ReittiResult},
};

pub const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

/// Parse `doc` and return its coordinates, or an empty list when the document is malformed.
///
/// Failures are logged and swallowed; callers treat an empty result as "no data".
pub fn parse_gpx_coordinates(doc: &str) -> Vec<Coordinate> {
    match try_parse_gpx_coordinates(doc) {
        Ok(coords) => coords,
        Err(e) => {
            tracing::warn!("error parsing GPX: {e}");
            Vec::new()
        }
    }
}

pub fn try_parse_gpx_coordinates(doc: &str) -> ReittiResult<Vec<Coordinate>> {
    let mut reader = NsReader::from_str(doc);

    let mut track_points = Vec::new();
    let mut waypoints = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| ReittiError::gpx(e.to_string()))?;
        if let ResolveResult::Unknown(prefix) = &ns {
            return Err(ReittiError::gpx(format!(
                "unbound namespace prefix '{}'",
                String::from_utf8_lossy(prefix)
            )));
        }
        let in_gpx_ns = matches!(
            ns,
            ResolveResult::Bound(Namespace(n)) if n == GPX_NAMESPACE.as_bytes()
        );

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if depth == 0 {
                    if saw_root {
                        return Err(ReittiError::gpx("content after document element"));
                    }
                    saw_root = true;
                }
                if in_gpx_ns {
                    match e.local_name().as_ref() {
                        b"trkpt" => track_points.push(read_lat_lon(e)?),
                        b"wpt" => waypoints.push(read_lat_lon(e)?),
                        _ => {}
                    }
                }
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Text(ref t) if depth == 0 => {
                if !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(ReittiError::gpx("text outside of document element"));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(ReittiError::gpx("no document element"));
    }
    if depth != 0 {
        return Err(ReittiError::gpx(format!(
            "document ended with {depth} unclosed element(s)"
        )));
    }

    track_points.extend(waypoints);
    Ok(track_points)
}

fn read_lat_lon(e: &BytesStart<'_>) -> ReittiResult<Coordinate> {
    let lat = read_degrees(e, "lat")?;
    let lon = read_degrees(e, "lon")?;
    Ok(Coordinate::new(lat, lon))
}

fn read_degrees(e: &BytesStart<'_>, name: &str) -> ReittiResult<f64> {
    let element = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| ReittiError::gpx(format!("<{element}> attributes: {err}")))?
        .ok_or_else(|| ReittiError::gpx(format!("<{element}> is missing '{name}'")))?;
    let raw = std::str::from_utf8(&attr.value)
        .map_err(|err| ReittiError::gpx(format!("<{element}> '{name}' is not utf-8: {err}")))?;
    raw.trim().parse::<f64>().map_err(|err| {
        ReittiError::gpx(format!("<{element}> '{name}'='{raw}' is not a number: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_track_points_in_document_order() {
        let doc = r#"<?xml version="1.0"?>
<gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1">
  <trk><trkseg>
    <trkpt lat="60.1" lon="24.9"><ele>10</ele></trkpt>
    <trkpt lat="60.2" lon="25.0"/>
  </trkseg></trk>
</gpx>"#;
        let coords = try_parse_gpx_coordinates(doc).unwrap();
        assert_eq!(
            coords,
            vec![Coordinate::new(60.1, 24.9), Coordinate::new(60.2, 25.0)]
        );
    }

    #[test]
    fn foreign_namespace_points_are_ignored() {
        let doc = r#"<gpx xmlns="http://www.topografix.com/GPX/1/0" version="1.0">
  <trk><trkseg><trkpt lat="1" lon="2"/></trkseg></trk>
</gpx>"#;
        assert!(try_parse_gpx_coordinates(doc).unwrap().is_empty());
    }

    #[test]
    fn prefixed_gpx_namespace_is_resolved() {
        let doc = r#"<g:gpx xmlns:g="http://www.topografix.com/GPX/1/1">
  <g:wpt lat="1.5" lon="2.5"/>
</g:gpx>"#;
        assert_eq!(
            try_parse_gpx_coordinates(doc).unwrap(),
            vec![Coordinate::new(1.5, 2.5)]
        );
    }

    #[test]
    fn bad_number_discards_whole_document() {
        let doc = r#"<gpx xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="1" lon="2"/>
    <trkpt lat="north" lon="2"/>
  </trkseg></trk>
</gpx>"#;
        assert!(try_parse_gpx_coordinates(doc).is_err());
        assert!(parse_gpx_coordinates(doc).is_empty());
    }

    #[test]
    fn missing_attribute_is_an_error() {
        let doc = r#"<gpx xmlns="http://www.topografix.com/GPX/1/1"><wpt lat="1"/></gpx>"#;
        let err = try_parse_gpx_coordinates(doc).unwrap_err();
        assert!(err.to_string().contains("missing 'lon'"));
    }

    #[test]
    fn non_xml_input_is_rejected() {
        assert!(try_parse_gpx_coordinates("not xml at all").is_err());
        assert!(try_parse_gpx_coordinates("").is_err());
    }

    #[test]
    fn unclosed_document_is_rejected() {
        let doc = r#"<gpx xmlns="http://www.topografix.com/GPX/1/1"><trk><trkseg>"#;
        assert!(try_parse_gpx_coordinates(doc).is_err());
    }

    #[test]
    fn unbound_prefix_discards_whole_document() {
        let doc = r#"<gpx xmlns="http://www.topografix.com/GPX/1/1"><x:foo/><trkpt lat="1" lon="2"/></gpx>"#;
        let err = try_parse_gpx_coordinates(doc).unwrap_err();
        assert!(err.to_string().contains("unbound namespace prefix 'x'"));
        assert!(parse_gpx_coordinates(doc).is_empty());
    }
}
