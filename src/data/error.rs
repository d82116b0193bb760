use std::path::PathBuf;
use thiserror::Error;

/// Result alias for data loading
pub type DataResult<T> = Result<T, DataError>;

/// Errors raised while loading or converting geographic records
#[derive(Error, Debug)]
pub enum DataError {
    /// File could not be read or written
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record line is not valid JSON for the expected shape
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: simd_json::Error,
    },

    /// `geometry_type` disagrees with the nesting of `coordinates`
    #[error("line {line}: geometry_type {geometry_type} does not match coordinates")]
    GeometryMismatch {
        line: usize,
        geometry_type: &'static str,
    },

    /// A coordinate position has fewer than two components
    #[error("line {line}: position needs at least [lon, lat]")]
    ShortPosition { line: usize },

    /// GeoJSON input could not be parsed
    #[error("geojson: {0}")]
    GeoJson(#[from] geojson::Error),

    /// GeoJSON input is valid but not a FeatureCollection
    #[error("expected a FeatureCollection")]
    NotFeatureCollection,

    /// Record could not be serialized
    #[error("serialize: {0}")]
    Serialize(simd_json::Error),

    /// Background loader went away without answering
    #[error("loader thread exited without a result")]
    LoaderGone,
}
