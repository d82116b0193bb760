use geojson::{Feature, GeoJson, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use super::{DataError, DataResult, GeometryType, WireCoordinates, WireRecord};

/// Convert a world-boundaries GeoJSON FeatureCollection to NDJSON records.
///
/// Each feature needs `geo_point_2d.{lon,lat}`, `name` and `continent`
/// properties; features missing any of them are skipped. Polygon and
/// MultiPolygon outlines are carried into `geometry_type`/`coordinates`.
/// Returns the number of records written.
pub fn convert_geojson(input: &Path, output: &Path) -> DataResult<usize> {
    let content = fs::read_to_string(input).map_err(|source| DataError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson = content.parse()?;
    let GeoJson::FeatureCollection(fc) = geojson else {
        return Err(DataError::NotFeatureCollection);
    };

    let io_err = |source| DataError::Io {
        path: output.to_path_buf(),
        source,
    };
    let file = fs::File::create(output).map_err(io_err)?;
    let mut out = BufWriter::new(file);

    let mut per_continent: BTreeMap<String, usize> = BTreeMap::new();
    let mut written = 0;

    for (idx, feature) in fc.features.iter().enumerate() {
        let Some(record) = feature_to_record(feature) else {
            warn!(feature = idx, "skipping feature without name/continent/geo_point_2d");
            continue;
        };
        *per_continent.entry(record.continent.clone()).or_default() += 1;

        let line = simd_json::serde::to_string(&record).map_err(DataError::Serialize)?;
        out.write_all(line.as_bytes()).map_err(io_err)?;
        out.write_all(b"\n").map_err(io_err)?;
        written += 1;
    }
    out.flush().map_err(io_err)?;

    for (continent, count) in &per_continent {
        info!(continent = %continent, countries = count, "converted");
    }
    info!(records = written, output = %output.display(), "wrote records");
    Ok(written)
}

fn feature_to_record(feature: &Feature) -> Option<WireRecord> {
    let props = feature.properties.as_ref()?;

    let point = props.get("geo_point_2d")?;
    let lon = point.get("lon").and_then(|v| v.as_f64())?;
    let lat = point.get("lat").and_then(|v| v.as_f64())?;
    let country = props.get("name").and_then(|v| v.as_str())?.to_string();
    let continent = props.get("continent").and_then(|v| v.as_str())?.to_string();

    let (geometry_type, coordinates) = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::Polygon(rings)) => (
            Some(GeometryType::Polygon),
            Some(WireCoordinates::Single(rings_to_wire(rings))),
        ),
        Some(Value::MultiPolygon(polys)) => (
            Some(GeometryType::MultiPolygon),
            Some(WireCoordinates::Multi(
                polys.iter().map(|rings| rings_to_wire(rings)).collect(),
            )),
        ),
        _ => (None, None),
    };

    Some(WireRecord {
        lon,
        lat,
        country,
        continent,
        geometry_type,
        coordinates,
    })
}

fn rings_to_wire(rings: &[Vec<geojson::Position>]) -> Vec<Vec<Vec<f64>>> {
    rings
        .iter()
        .map(|ring| ring.iter().map(|c| vec![c[0], c[1]]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{load_ndjson, CountryGeometry};
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tui-globe-{}-{name}", std::process::id()))
    }

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]},
                "properties": {"name": "Squareland", "continent": "Africa", "geo_point_2d": {"lon": 5.0, "lat": 5.0}}
            },
            {
                "type": "Feature",
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[20,20],[21,20],[21,21],[20,20]]], [[[30,30],[31,30],[31,31],[30,30]]]]},
                "properties": {"name": "Twin Isles", "continent": "Oceania", "geo_point_2d": {"lon": 25.0, "lat": 25.0}}
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": {"name": "Nowhere"}
            }
        ]
    }"#;

    #[test]
    fn test_convert_roundtrips_through_loader() {
        let input = temp_path("in.geojson");
        let output = temp_path("out.ndjson");
        fs::write(&input, COLLECTION).unwrap();

        let written = convert_geojson(&input, &output).unwrap();
        assert_eq!(written, 2);

        let points = load_ndjson(&output).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].country, "Squareland");
        assert!(matches!(points[0].geometry, Some(CountryGeometry::Polygon(_))));
        assert!(matches!(points[1].geometry, Some(CountryGeometry::MultiPolygon(ref p)) if p.len() == 2));

        let _ = fs::remove_file(input);
        let _ = fs::remove_file(output);
    }

    #[test]
    fn test_rejects_non_collection() {
        let input = temp_path("point.geojson");
        let output = temp_path("point.ndjson");
        fs::write(&input, r#"{"type": "Point", "coordinates": [1, 2]}"#).unwrap();
        assert!(matches!(
            convert_geojson(&input, &output),
            Err(DataError::NotFeatureCollection)
        ));
        let _ = fs::remove_file(input);
    }
}
