mod convert;
mod error;

pub use convert::convert_geojson;
pub use error::{DataError, DataResult};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use tracing::{debug, info};

/// A polygon ring as (lon, lat) pairs in degrees
pub type Ring = Vec<(f64, f64)>;

/// Country outline. The first ring of each polygon is the exterior, the rest are holes.
#[derive(Clone, Debug, PartialEq)]
pub enum CountryGeometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl CountryGeometry {
    /// Polygons (each a list of rings) regardless of variant
    pub fn polygons(&self) -> &[Vec<Ring>] {
        match self {
            CountryGeometry::Polygon(rings) => std::slice::from_ref(rings),
            CountryGeometry::MultiPolygon(polys) => polys,
        }
    }
}

/// One country record: marker position plus optional outline
#[derive(Clone, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub continent: String,
    pub country: String,
    pub geometry: Option<CountryGeometry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum GeometryType {
    Polygon,
    MultiPolygon,
}

impl GeometryType {
    fn name(self) -> &'static str {
        match self {
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPolygon => "MultiPolygon",
        }
    }
}

/// Nested position arrays; nesting depth tells the variants apart
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireCoordinates {
    Multi(Vec<Vec<Vec<Vec<f64>>>>),
    Single(Vec<Vec<Vec<f64>>>),
}

/// One NDJSON line as it appears on disk
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct WireRecord {
    pub lon: f64,
    pub lat: f64,
    pub country: String,
    pub continent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_type: Option<GeometryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<WireCoordinates>,
}

impl WireRecord {
    fn into_point(self, line: usize) -> DataResult<GeoPoint> {
        let geometry = match (self.geometry_type, self.coordinates) {
            (Some(kind), Some(coords)) => Some(build_geometry(kind, coords, line)?),
            _ => None,
        };
        Ok(GeoPoint {
            lat: self.lat,
            lon: self.lon,
            continent: self.continent,
            country: self.country,
            geometry,
        })
    }
}

fn build_geometry(kind: GeometryType, coords: WireCoordinates, line: usize) -> DataResult<CountryGeometry> {
    match (kind, coords) {
        (GeometryType::Polygon, WireCoordinates::Single(rings)) => {
            Ok(CountryGeometry::Polygon(to_rings(rings, line)?))
        }
        (GeometryType::MultiPolygon, WireCoordinates::Multi(polys)) => {
            let polys = polys
                .into_iter()
                .map(|rings| to_rings(rings, line))
                .collect::<DataResult<Vec<_>>>()?;
            Ok(CountryGeometry::MultiPolygon(polys))
        }
        // `[]` parses as the deeper variant; it is empty either way
        (GeometryType::Polygon, WireCoordinates::Multi(polys)) if polys.is_empty() => {
            Ok(CountryGeometry::Polygon(Vec::new()))
        }
        (kind, _) => Err(DataError::GeometryMismatch {
            line,
            geometry_type: kind.name(),
        }),
    }
}

fn to_rings(rings: Vec<Vec<Vec<f64>>>, line: usize) -> DataResult<Vec<Ring>> {
    rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|pos| match pos.as_slice() {
                    [lon, lat, ..] => Ok((*lon, *lat)),
                    _ => Err(DataError::ShortPosition { line }),
                })
                .collect()
        })
        .collect()
}

/// Parse newline-delimited JSON records.
///
/// Blank lines are skipped. Any malformed line fails the whole batch; the
/// error carries its 1-based line number.
pub fn parse_ndjson(text: &str) -> DataResult<Vec<GeoPoint>> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| (i + 1, l))
        .collect();

    lines
        .par_iter()
        .map(|&(line, content)| {
            let mut bytes = content.as_bytes().to_vec();
            let record: WireRecord = simd_json::serde::from_slice(&mut bytes)
                .map_err(|source| DataError::Parse { line, source })?;
            record.into_point(line)
        })
        .collect()
}

/// Read and parse an NDJSON file
pub fn load_ndjson(path: &Path) -> DataResult<Vec<GeoPoint>> {
    let content = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let points = parse_ndjson(&content)?;
    debug!(path = %path.display(), records = points.len(), "parsed records");
    Ok(points)
}

/// Load records on a background thread. The receiver yields exactly one result.
pub fn spawn_loader(path: PathBuf) -> Receiver<DataResult<Vec<GeoPoint>>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        info!(path = %path.display(), "loading records");
        let result = load_ndjson(&path);
        // Receiver may be gone if the app quit first
        let _ = tx.send(result);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOT: &str = r#"{"lat": 46.8, "lon": 8.2, "continent": "Europe", "country": "Switzerland"}"#;

    #[test]
    fn test_parse_markers_only() {
        let text = format!("{DOT}\n{DOT}\n");
        let points = parse_ndjson(&text).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].country, "Switzerland");
        assert_eq!(points[0].continent, "Europe");
        assert!((points[0].lat - 46.8).abs() < 1e-12);
        assert!(points[0].geometry.is_none());
    }

    #[test]
    fn test_parse_polygon_with_hole() {
        let text = r#"{"lat": 0.5, "lon": 0.5, "continent": "Africa", "country": "Square", "geometry_type": "Polygon", "coordinates": [[[0,0],[4,0],[4,4],[0,4],[0,0]], [[1,1],[2,1],[2,2],[1,1]]]}"#;
        let points = parse_ndjson(text).unwrap();
        match &points[0].geometry {
            Some(CountryGeometry::Polygon(rings)) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[0][1], (4.0, 0.0));
            }
            other => panic!("unexpected geometry {other:?}"),
        }
    }

    #[test]
    fn test_parse_multipolygon() {
        let text = r#"{"lat": 1, "lon": 2, "continent": "Oceania", "country": "Isles", "geometry_type": "MultiPolygon", "coordinates": [[[[0,0],[1,0],[1,1],[0,0]]], [[[5,5],[6,5],[6,6],[5,5]]]]}"#;
        let points = parse_ndjson(text).unwrap();
        let geometry = points[0].geometry.as_ref().unwrap();
        assert_eq!(geometry.polygons().len(), 2);
    }

    #[test]
    fn test_type_without_coordinates_has_no_geometry() {
        let text = r#"{"lat": 1, "lon": 2, "continent": "Asia", "country": "X", "geometry_type": "Polygon"}"#;
        let points = parse_ndjson(text).unwrap();
        assert!(points[0].geometry.is_none());
    }

    #[test]
    fn test_malformed_line_fails_batch() {
        let text = format!("{DOT}\n\n{{\"lat\": 1, \"lon\": \n{DOT}\n");
        match parse_ndjson(&text) {
            Err(DataError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_fails_batch() {
        let text = r#"{"lat": 1, "continent": "Asia", "country": "X"}"#;
        assert!(matches!(parse_ndjson(text), Err(DataError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_geometry_mismatch() {
        let text = r#"{"lat": 1, "lon": 2, "continent": "Asia", "country": "X", "geometry_type": "MultiPolygon", "coordinates": [[[0,0],[1,0],[1,1]]]}"#;
        assert!(matches!(
            parse_ndjson(text),
            Err(DataError::GeometryMismatch { line: 1, geometry_type: "MultiPolygon" })
        ));
    }

    #[test]
    fn test_short_position() {
        let text = r#"{"lat": 1, "lon": 2, "continent": "Asia", "country": "X", "geometry_type": "Polygon", "coordinates": [[[0],[1,0],[1,1]]]}"#;
        assert!(matches!(parse_ndjson(text), Err(DataError::ShortPosition { line: 1 })));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_ndjson("").unwrap().is_empty());
        assert!(parse_ndjson("\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = load_ndjson(Path::new("definitely/not/here.ndjson")).unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }

    #[test]
    fn test_spawn_loader_reports_failure() {
        let rx = spawn_loader(PathBuf::from("definitely/not/here.ndjson"));
        let result = rx.recv().unwrap();
        assert!(result.is_err());
    }
}
