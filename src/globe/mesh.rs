use earcutr::earcut;
use glam::DVec3;
use tracing::trace;

use crate::data::Ring;
use crate::globe::projection::lat_lon_to_vec3;

/// Triangulated country polygon lifted onto the sphere, plus its ring outlines.
#[derive(Clone, Debug, Default)]
pub struct PolygonMesh {
    /// Vertices in globe-local space
    pub vertices: Vec<DVec3>,
    /// Triangle list, three indices per triangle
    pub indices: Vec<usize>,
    /// One closed loop per ring, in globe-local space
    pub borders: Vec<Vec<DVec3>>,
}

impl PolygonMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangulate rings in the (lon, lat) plane and lift the vertices to
    /// `fill_radius`. Border loops are lifted to `border_radius`.
    ///
    /// Returns `None` when the exterior ring has fewer than three distinct points.
    pub fn build(rings: &[Ring], fill_radius: f64, border_radius: f64) -> Option<Self> {
        let exterior = rings.first()?;
        if open_ring(exterior).len() < 3 {
            return None;
        }

        let mut coords_2d: Vec<f64> = Vec::new();
        let mut hole_indices: Vec<usize> = Vec::new();
        let mut vertices: Vec<DVec3> = Vec::new();
        let mut borders: Vec<Vec<DVec3>> = Vec::with_capacity(rings.len());

        for (ring_i, ring) in rings.iter().enumerate() {
            let ring = open_ring(ring);
            if ring.len() < 3 {
                continue;
            }
            if ring_i > 0 {
                hole_indices.push(vertices.len());
            }
            for &(lon, lat) in ring {
                coords_2d.push(lon);
                coords_2d.push(lat);
                vertices.push(lat_lon_to_vec3(lat, lon, fill_radius));
            }
            borders.push(
                ring.iter()
                    .map(|&(lon, lat)| lat_lon_to_vec3(lat, lon, border_radius))
                    .collect(),
            );
        }

        let indices = match earcut(&coords_2d, &hole_indices, 2) {
            Ok(ix) => ix,
            Err(_) => {
                trace!(vertices = vertices.len(), "earcut failed; keeping outline only");
                Vec::new()
            }
        };

        Some(Self {
            vertices,
            indices,
            borders,
        })
    }
}

/// Ring without its closing duplicate point, if it has one
fn open_ring(ring: &[(f64, f64)]) -> &[(f64, f64)] {
    match (ring.first(), ring.last()) {
        (Some(a), Some(b)) if ring.len() >= 2 && (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9 => {
            &ring[..ring.len() - 1]
        }
        _ => ring,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Ring {
        vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ]
    }

    #[test]
    fn test_square_makes_two_triangles() {
        let mesh = PolygonMesh::build(&[square(0.0, 0.0, 10.0)], 5.01, 5.012).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.borders.len(), 1);
        assert_eq!(mesh.borders[0].len(), 4);
        for v in &mesh.vertices {
            assert!((v.length() - 5.01).abs() < 1e-9);
        }
        for v in &mesh.borders[0] {
            assert!((v.length() - 5.012).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hole_adds_triangles() {
        let rings = vec![square(0.0, 0.0, 10.0), square(3.0, 3.0, 2.0)];
        let mesh = PolygonMesh::build(&rings, 5.0, 5.0).unwrap();
        assert_eq!(mesh.vertices.len(), 8);
        // Square with square hole: 8 triangles
        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.borders.len(), 2);
        assert!(mesh.indices.iter().all(|&i| i < mesh.vertices.len()));
    }

    #[test]
    fn test_degenerate_exterior() {
        assert!(PolygonMesh::build(&[vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]], 5.0, 5.0).is_none());
        assert!(PolygonMesh::build(&[], 5.0, 5.0).is_none());
    }
}
