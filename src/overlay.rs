//! Leaflet map document with one polyline per year.

use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::{
        core::Coordinate,
        error::{ReittiError, ReittiResult},
        fs::ensure_parent_dir,
    },
    model::PathCollection,
};

/// Bright, high-contrast line colors, assigned by year insertion order.
pub const PALETTE: [&str; 15] = [
    "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF", "#FF8800", "#8800FF",
    "#FF0088", "#00FF88", "#88FF00", "#0088FF", "#FF6600", "#6600FF", "#FF0066",
];

pub const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
pub const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
pub const TILE_URL: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png";

const INITIAL_ZOOM: u32 = 13;
const FIT_PADDING: f64 = 0.1;

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Arithmetic mean of every coordinate of every year.
pub fn map_center(paths: &PathCollection) -> Option<Coordinate> {
    let (mut lat, mut lon, mut n) = (0.0, 0.0, 0usize);
    for c in paths.all_coordinates() {
        lat += c.lat;
        lon += c.lon;
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(Coordinate::new(lat / n as f64, lon / n as f64))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendEntry {
    pub year: i32,
    pub color: &'static str,
    pub points: usize,
}

pub fn legend(paths: &PathCollection) -> Vec<LegendEntry> {
    paths
        .iter()
        .enumerate()
        .map(|(i, (year, coords))| LegendEntry {
            year,
            color: color_for(i),
            points: coords.len(),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct OverlaySummary {
    pub center: Coordinate,
    pub years: usize,
    pub total_points: usize,
}

fn latlng_array(coords: impl Iterator<Item = Coordinate>) -> String {
    let pairs: Vec<[f64; 2]> = coords.map(Coordinate::as_latlng).collect();
    serde_json::to_string(&pairs).unwrap_or_else(|_| "[]".to_string())
}

/// Render the standalone HTML document. `day_label` is shown in the title, legend and info
/// panel (normally `MM-DD`).
pub fn render_overlay_html(paths: &PathCollection, day_label: &str) -> ReittiResult<String> {
    let center = map_center(paths)
        .ok_or_else(|| ReittiError::no_data(format!("no coordinates found for {day_label}")))?;
    let entries = legend(paths);

    let mut legend_html = String::new();
    for e in &entries {
        legend_html.push_str(&format!(
            r#"<div><span style="color: {}; font-weight: bold; font-size: 20px;">&#9632;</span> {} ({} points)</div>"#,
            e.color, e.year, e.points
        ));
    }

    let mut polylines_js = String::new();
    for (e, (year, coords)) in entries.iter().zip(paths.iter()) {
        polylines_js.push_str(&format!(
            r#"
        // Path for {year}
        var path{year} = L.polyline({coords}, {{
            color: '{color}',
            weight: 5,
            opacity: 0.9
        }}).addTo(map).bindPopup('{year}: {points} points');
        paths.push(path{year});
"#,
            coords = latlng_array(coords.iter().copied()),
            color = e.color,
            points = e.points,
        ));
    }

    let label = html_escape(day_label);
    let doc = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Multi-Year Path Overlay - {label}</title>
    <link rel="stylesheet" href="{css}" />
    <style>
        body {{ margin: 0; font-family: Arial, sans-serif; }}
        #map {{ height: 100vh; width: 100%; }}
        .legend {{
            position: absolute;
            top: 10px;
            right: 10px;
            background: white;
            padding: 15px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.3);
            z-index: 1000;
            max-height: 80vh;
            overflow-y: auto;
        }}
        .legend h3 {{ margin: 0 0 10px 0; font-size: 16px; }}
        .legend div {{ margin: 5px 0; font-size: 14px; }}
        .info {{
            position: absolute;
            bottom: 10px;
            left: 10px;
            background: white;
            padding: 10px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.3);
            z-index: 1000;
        }}
    </style>
</head>
<body>
    <div id="map"></div>
    <div class="legend">
        <h3>Paths for {label}</h3>
        {legend_html}
    </div>
    <div class="info">
        <strong>Date:</strong> {label}<br>
        <strong>Years with Data:</strong> {years}<br>
        <strong>Total Points:</strong> {total}
    </div>

    <script src="{js}"></script>
    <script>
        var map = L.map('map').setView([{lat}, {lon}], {zoom});

        L.tileLayer('{tiles}', {{
            attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors &copy; <a href="https://carto.com/attributions">CARTO</a>',
            subdomains: 'abcd',
            maxZoom: 20
        }}).addTo(map);

        var paths = [];
{polylines_js}
        map.on('zoomend', function() {{
            var zoom = map.getZoom();
            var weight = zoom < 10 ? 8 : (zoom < 13 ? 5 : 3);
            paths.forEach(function(p) {{ p.setStyle({{ weight: weight }}); }});
        }});

        if (paths.length > 0) {{
            map.fitBounds(L.featureGroup(paths).getBounds().pad({pad}));
        }}
    </script>
</body>
</html>
"#,
        css = LEAFLET_CSS,
        js = LEAFLET_JS,
        tiles = TILE_URL,
        years = paths.len(),
        total = paths.total_points(),
        lat = center.lat,
        lon = center.lon,
        zoom = INITIAL_ZOOM,
        pad = FIT_PADDING,
    );

    Ok(doc)
}

/// Render and write the overlay to `out`. Nothing is written when `paths` is empty.
#[tracing::instrument(skip(paths), fields(years = paths.len()))]
pub fn write_overlay(
    paths: &PathCollection,
    out: &Path,
    day_label: &str,
) -> ReittiResult<OverlaySummary> {
    let html = render_overlay_html(paths, day_label)?;
    ensure_parent_dir(out)?;
    std::fs::write(out, html).with_context(|| format!("write html '{}'", out.display()))?;

    let summary = OverlaySummary {
        center: map_center(paths).unwrap_or(Coordinate::new(0.0, 0.0)),
        years: paths.len(),
        total_points: paths.total_points(),
    };
    tracing::info!("✓ generated {}", out.display());
    Ok(summary)
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
