//! GeoJSON export of search results.

use serde_json::{json, Value};

use crate::characteristics::CptCharacteristics;
use crate::error::Result;
use crate::geometry::Area;

/// Build a GeoJSON FeatureCollection from characteristics and the searched area.
///
/// Every CPT becomes a point feature. The area is appended last: an envelope
/// as its rectangle, a circle as a polygon approximating its outline.
pub fn construct_geojson_from_characteristics(
    characteristics: &[CptCharacteristics],
    area: Option<&Area>,
) -> Result<String> {
    let mut features: Vec<Value> = characteristics
        .iter()
        .map(CptCharacteristics::to_geojson_feature)
        .collect();

    match area {
        Some(Area::Envelope(envelope)) => features.push(envelope.to_geojson_feature()),
        Some(Area::Circle(circle)) => features.push(circle.to_geojson_polygon_feature()?),
        None => {}
    }

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    Ok(serde_json::to_string(&collection)?)
}
