use glam::{DMat3, DVec3};
use rayon::prelude::*;
use std::f64::consts::TAU;
use tracing::debug;

use crate::braille::BrailleCanvas;
use crate::data::GeoPoint;
use crate::globe::camera::{Camera, Orientation};
use crate::globe::geometry::{draw_circle, draw_line, fill_triangle};
use crate::globe::mesh::PolygonMesh;
use crate::globe::palette::{Continent, POLE_NORTH, POLE_SOUTH};
use crate::globe::projection::lat_lon_to_vec3;
use crate::interaction::{MarkerPicker, Pick};

/// Globe body used for occluding picks, relative to the globe radius
const OCCLUDER_SCALE: f64 = 0.9;

/// Geometry constants for the globe scene
#[derive(Clone, Debug)]
pub struct SceneSettings {
    /// Globe radius in world units
    pub radius: f64,
    /// Fill meshes float this far above the surface
    pub fill_lift: f64,
    /// Border loops float this far above the surface
    pub border_lift: f64,
    /// Marker pick sphere radius in world units
    pub hit_radius: f64,
    /// Graticule spacing in degrees
    pub graticule_step: f64,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            radius: 5.0,
            fill_lift: 0.01,
            border_lift: 0.012,
            hit_radius: 0.15,
            graticule_step: 30.0,
        }
    }
}

/// Layer visibility toggles
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    pub show_fills: bool,
    pub show_borders: bool,
    pub show_markers: bool,
    pub show_graticule: bool,
    pub show_poles: bool,
    pub show_legend: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_fills: true,
            show_borders: true,
            show_markers: true,
            show_graticule: true,
            show_poles: false,
            show_legend: true,
        }
    }
}

impl DisplaySettings {
    pub fn toggle_fills(&mut self) {
        self.show_fills = !self.show_fills;
    }

    pub fn toggle_borders(&mut self) {
        self.show_borders = !self.show_borders;
    }

    pub fn toggle_markers(&mut self) {
        self.show_markers = !self.show_markers;
    }

    pub fn toggle_graticule(&mut self) {
        self.show_graticule = !self.show_graticule;
    }

    pub fn toggle_poles(&mut self) {
        self.show_poles = !self.show_poles;
    }

    pub fn toggle_legend(&mut self) {
        self.show_legend = !self.show_legend;
    }
}

/// A country dot on the globe surface
#[derive(Clone, Debug)]
pub struct Marker {
    /// Globe-local position
    pub position: DVec3,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
    pub color: u32,
    /// Dot radius in braille pixels
    pub size: i32,
}

/// A filled country polygon with its colour
#[derive(Clone, Debug)]
pub struct CountryShape {
    pub color: u32,
    pub mesh: PolygonMesh,
}

/// One colour's worth of braille dots
pub struct ColorLayer {
    pub color: u32,
    pub canvas: BrailleCanvas,
}

/// Rendered globe, back to front
pub struct GlobeLayers {
    pub graticule: BrailleCanvas,
    pub fills: Vec<ColorLayer>,
    pub borders: BrailleCanvas,
    pub markers: Vec<ColorLayer>,
}

impl GlobeLayers {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            graticule: BrailleCanvas::new(cols, rows),
            fills: Vec::new(),
            borders: BrailleCanvas::new(cols, rows),
            markers: Vec::new(),
        }
    }
}

/// Canvas for `color`, created on first use
fn layer_for(layers: &mut Vec<ColorLayer>, color: u32, cols: usize, rows: usize) -> &mut BrailleCanvas {
    let idx = match layers.iter().position(|l| l.color == color) {
        Some(idx) => idx,
        None => {
            layers.push(ColorLayer {
                color,
                canvas: BrailleCanvas::new(cols, rows),
            });
            layers.len() - 1
        }
    };
    &mut layers[idx].canvas
}

/// Markers, country meshes and reference lines in globe-local space
pub struct GlobeScene {
    settings: SceneSettings,
    markers: Vec<Marker>,
    poles: Vec<Marker>,
    shapes: Vec<CountryShape>,
    graticule: Vec<Vec<DVec3>>,
}

impl GlobeScene {
    /// Empty globe: graticule and pole markers only
    pub fn new(settings: SceneSettings) -> Self {
        let r = settings.radius;
        let poles = vec![
            Marker {
                position: lat_lon_to_vec3(90.0, 0.0, r),
                lat: 90.0,
                lon: 0.0,
                country: "North Pole".to_string(),
                color: POLE_NORTH,
                size: 2,
            },
            Marker {
                position: lat_lon_to_vec3(-90.0, 0.0, r),
                lat: -90.0,
                lon: 0.0,
                country: "South Pole".to_string(),
                color: POLE_SOUTH,
                size: 2,
            },
        ];
        let graticule = build_graticule(r, settings.graticule_step);
        Self {
            settings,
            markers: Vec::new(),
            poles,
            shapes: Vec::new(),
            graticule,
        }
    }

    /// Build with records already loaded
    pub fn build(points: &[GeoPoint], settings: SceneSettings) -> Self {
        let mut scene = Self::new(settings);
        scene.populate(points);
        scene
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    /// Add a marker per record and a mesh per polygon
    pub fn populate(&mut self, points: &[GeoPoint]) {
        let r = self.settings.radius;
        let fill_r = r + self.settings.fill_lift;
        let border_r = r + self.settings.border_lift;

        self.markers.extend(points.iter().map(|p| Marker {
            position: lat_lon_to_vec3(p.lat, p.lon, r),
            lat: p.lat,
            lon: p.lon,
            country: p.country.clone(),
            color: Continent::from_name(&p.continent).rgb(),
            size: 1,
        }));

        let shapes: Vec<CountryShape> = points
            .par_iter()
            .filter_map(|p| {
                let geometry = p.geometry.as_ref()?;
                let color = Continent::from_name(&p.continent).rgb();
                Some(
                    geometry
                        .polygons()
                        .iter()
                        .filter_map(|rings| PolygonMesh::build(rings, fill_r, border_r))
                        .map(|mesh| CountryShape { color, mesh })
                        .collect::<Vec<_>>(),
                )
            })
            .flatten()
            .collect();

        debug!(
            markers = self.markers.len(),
            shapes = shapes.len(),
            triangles = shapes.iter().map(|s| s.mesh.triangle_count()).sum::<usize>(),
            "scene populated"
        );
        self.shapes.extend(shapes);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn shapes(&self) -> &[CountryShape] {
        &self.shapes
    }

    /// Render into braille layers sized `cols` x `rows` characters
    pub fn render(
        &self,
        orientation: &Orientation,
        camera: &Camera,
        cols: usize,
        rows: usize,
        display: &DisplaySettings,
    ) -> GlobeLayers {
        let mut layers = GlobeLayers::new(cols, rows);
        let w = cols * 2;
        let h = rows * 4;
        if w == 0 || h == 0 {
            return layers;
        }
        let rot = orientation.rotation();

        if display.show_graticule {
            self.draw_limb(&mut layers.graticule, camera, w, h);
            for line in &self.graticule {
                draw_polyline(&mut layers.graticule, line, &rot, camera, w, h, false);
            }
        }

        if display.show_fills {
            for shape in &self.shapes {
                let canvas = layer_for(&mut layers.fills, shape.color, cols, rows);
                fill_mesh(canvas, &shape.mesh, &rot, camera, w, h);
            }
        }

        if display.show_borders {
            for shape in &self.shapes {
                for ring in &shape.mesh.borders {
                    draw_polyline(&mut layers.borders, ring, &rot, camera, w, h, true);
                }
            }
        }

        if display.show_markers {
            for marker in &self.markers {
                draw_marker(&mut layers.markers, marker, &rot, camera, cols, rows);
            }
        }
        if display.show_poles {
            for marker in &self.poles {
                draw_marker(&mut layers.markers, marker, &rot, camera, cols, rows);
            }
        }

        layers
    }

    /// Outline of the globe disk
    fn draw_limb(&self, canvas: &mut BrailleCanvas, camera: &Camera, w: usize, h: usize) {
        let Some((cx, cy)) = camera.project(DVec3::ZERO, w, h) else {
            return;
        };
        let radius = camera.disk_radius(self.settings.radius, h);
        if !radius.is_finite() {
            return;
        }
        let steps = 96;
        let mut prev: Option<(i32, i32)> = None;
        for i in 0..=steps {
            let a = i as f64 / steps as f64 * TAU;
            let p = ((cx + radius * a.cos()) as i32, (cy + radius * a.sin()) as i32);
            if let Some(q) = prev {
                draw_line(canvas, q.0, q.1, p.0, p.1);
            }
            prev = Some(p);
        }
    }

    /// Nearest pickable marker under braille pixel (px, py), skipping markers
    /// hidden behind the globe body.
    pub fn pick(
        &self,
        orientation: &Orientation,
        camera: &Camera,
        px: f64,
        py: f64,
        width: usize,
        height: usize,
    ) -> Option<&Marker> {
        let ray = camera.ray(px, py, width, height);
        let rot = orientation.rotation();
        let body = ray.hit_sphere(DVec3::ZERO, self.settings.radius * OCCLUDER_SCALE);

        self.markers
            .iter()
            .filter_map(|m| {
                let t = ray.hit_sphere(rot * m.position, self.settings.hit_radius)?;
                match body {
                    Some(body_t) if t > body_t => None,
                    _ => Some((t, m)),
                }
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, m)| m)
    }
}

/// Picks against a scene as seen by a camera on a canvas of fixed pixel size
pub struct ScenePicker<'a> {
    pub scene: &'a GlobeScene,
    pub camera: &'a Camera,
    pub width: usize,
    pub height: usize,
}

impl MarkerPicker for ScenePicker<'_> {
    fn pick(&self, orientation: Orientation, x: f64, y: f64) -> Option<Pick> {
        self.scene
            .pick(&orientation, self.camera, x, y, self.width, self.height)
            .map(|m| Pick {
                country: m.country.clone(),
                lat: m.lat,
                lon: m.lon,
            })
    }
}

fn build_graticule(radius: f64, step: f64) -> Vec<Vec<DVec3>> {
    let step = if step > 0.0 { step } else { 30.0 };
    let mut lines = Vec::new();

    // Meridians, sampled every 5°
    let mut lon = -180.0;
    while lon < 180.0 {
        lines.push(
            (0..=36)
                .map(|i| lat_lon_to_vec3(-90.0 + i as f64 * 5.0, lon, radius))
                .collect(),
        );
        lon += step;
    }

    // Parallels, poles excluded
    let mut lat = -90.0 + step;
    while lat < 90.0 {
        lines.push(
            (0..=72)
                .map(|i| lat_lon_to_vec3(lat, -180.0 + i as f64 * 5.0, radius))
                .collect(),
        );
        lat += step;
    }
    lines
}

#[inline]
fn to_pixel(p: (f64, f64)) -> (i32, i32) {
    (p.0.round() as i32, p.1.round() as i32)
}

/// Draw segments whose endpoints both face the camera
fn draw_polyline(
    canvas: &mut BrailleCanvas,
    points: &[DVec3],
    rot: &DMat3,
    camera: &Camera,
    w: usize,
    h: usize,
    closed: bool,
) {
    if points.len() < 2 {
        return;
    }
    let project = |p: &DVec3| {
        let world = *rot * *p;
        if camera.faces(world) {
            camera.project(world, w, h).map(to_pixel)
        } else {
            None
        }
    };

    let mut first: Option<(i32, i32)> = None;
    let mut prev: Option<(i32, i32)> = None;
    for (i, p) in points.iter().enumerate() {
        let cur = project(p);
        if i == 0 {
            first = cur;
        }
        if let (Some(a), Some(b)) = (prev, cur) {
            draw_line(canvas, a.0, a.1, b.0, b.1);
        }
        prev = cur;
    }
    if closed {
        if let (Some(a), Some(b)) = (prev, first) {
            draw_line(canvas, a.0, a.1, b.0, b.1);
        }
    }
}

/// Fill mesh triangles whose three vertices all face the camera
fn fill_mesh(canvas: &mut BrailleCanvas, mesh: &PolygonMesh, rot: &DMat3, camera: &Camera, w: usize, h: usize) {
    let projected: Vec<Option<(f64, f64)>> = mesh
        .vertices
        .iter()
        .map(|v| {
            let world = *rot * *v;
            if camera.faces(world) {
                camera.project(world, w, h)
            } else {
                None
            }
        })
        .collect();

    for tri in mesh.indices.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (
            projected.get(tri[0]).copied().flatten(),
            projected.get(tri[1]).copied().flatten(),
            projected.get(tri[2]).copied().flatten(),
        ) else {
            continue;
        };
        fill_triangle(canvas, a, b, c);
    }
}

fn draw_marker(
    layers: &mut Vec<ColorLayer>,
    marker: &Marker,
    rot: &DMat3,
    camera: &Camera,
    cols: usize,
    rows: usize,
) {
    let world = *rot * marker.position;
    if !camera.faces(world) {
        return;
    }
    if let Some(p) = camera.project(world, cols * 2, rows * 4) {
        let (x, y) = to_pixel(p);
        let canvas = layer_for(layers, marker.color, cols, rows);
        draw_circle(canvas, x, y, marker.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CountryGeometry;

    fn point(country: &str, continent: &str, lat: f64, lon: f64) -> GeoPoint {
        GeoPoint {
            lat,
            lon,
            continent: continent.to_string(),
            country: country.to_string(),
            geometry: None,
        }
    }

    fn facing(lon: f64) -> Orientation {
        Orientation::new(-lon.to_radians(), 0.0)
    }

    #[test]
    fn test_markers_placed_on_sphere() {
        let scene = GlobeScene::build(&[point("A", "Asia", 10.0, 20.0)], SceneSettings::default());
        assert_eq!(scene.markers().len(), 1);
        assert!((scene.markers()[0].position.length() - 5.0).abs() < 1e-9);
        assert_eq!(scene.markers()[0].color, Continent::Asia.rgb());
    }

    #[test]
    fn test_pick_front_marker_at_screen_center() {
        let scene = GlobeScene::build(&[point("Kenya", "Africa", 0.0, 38.0)], SceneSettings::default());
        let cam = Camera::default();
        let hit = scene.pick(&facing(38.0), &cam, 80.0, 60.0, 160, 120).unwrap();
        assert_eq!(hit.country, "Kenya");
    }

    #[test]
    fn test_pick_misses_empty_space() {
        let scene = GlobeScene::build(&[point("Kenya", "Africa", 0.0, 38.0)], SceneSettings::default());
        let cam = Camera::default();
        assert!(scene.pick(&facing(38.0), &cam, 2.0, 2.0, 160, 120).is_none());
    }

    #[test]
    fn test_pick_ignores_far_side() {
        // Marker on the antipode sits right behind screen centre
        let scene = GlobeScene::build(&[point("Back", "Asia", 0.0, -142.0)], SceneSettings::default());
        let cam = Camera::default();
        assert!(scene.pick(&facing(38.0), &cam, 80.0, 60.0, 160, 120).is_none());
    }

    #[test]
    fn test_pick_prefers_nearest() {
        let points = [point("Front", "Europe", 0.0, 0.0), point("Back", "Asia", 0.0, 180.0)];
        let scene = GlobeScene::build(&points, SceneSettings::default());
        let cam = Camera::default();
        let hit = scene.pick(&facing(0.0), &cam, 80.0, 60.0, 160, 120).unwrap();
        assert_eq!(hit.country, "Front");
    }

    #[test]
    fn test_empty_scene_picks_nothing() {
        let scene = GlobeScene::new(SceneSettings::default());
        let cam = Camera::default();
        assert!(scene.pick(&Orientation::default(), &cam, 80.0, 60.0, 160, 120).is_none());
    }

    #[test]
    fn test_render_draws_visible_marker_only() {
        let scene = GlobeScene::build(
            &[point("Front", "Europe", 0.0, 0.0), point("Back", "Asia", 0.0, 180.0)],
            SceneSettings::default(),
        );
        let cam = Camera::default();
        let display = DisplaySettings::default();
        let layers = scene.render(&facing(0.0), &cam, 80, 30, &display);
        let europe = layers.markers.iter().find(|l| l.color == Continent::Europe.rgb());
        assert!(europe.is_some_and(|l| !l.canvas.is_empty()));
        assert!(layers.markers.iter().all(|l| l.color != Continent::Asia.rgb()));
        assert!(!layers.graticule.is_empty());
    }

    #[test]
    fn test_render_fills_facing_polygon() {
        let mut p = point("Block", "Oceania", 0.0, 0.0);
        p.geometry = Some(CountryGeometry::Polygon(vec![vec![
            (-20.0, -20.0),
            (20.0, -20.0),
            (20.0, 20.0),
            (-20.0, 20.0),
            (-20.0, -20.0),
        ]]));
        let scene = GlobeScene::build(&[p], SceneSettings::default());
        assert_eq!(scene.shapes().len(), 1);

        let cam = Camera::default();
        let display = DisplaySettings::default();
        let front = scene.render(&facing(0.0), &cam, 80, 30, &display);
        assert!(front.fills.iter().any(|l| !l.canvas.is_empty()));
        assert!(!front.borders.is_empty());

        let back = scene.render(&facing(180.0), &cam, 80, 30, &display);
        assert!(back.fills.iter().all(|l| l.canvas.is_empty()));
        assert!(back.borders.is_empty());
    }

    #[test]
    fn test_toggles_hide_layers() {
        let scene = GlobeScene::build(&[point("Front", "Europe", 0.0, 0.0)], SceneSettings::default());
        let cam = Camera::default();
        let mut display = DisplaySettings::default();
        display.toggle_markers();
        display.toggle_graticule();
        let layers = scene.render(&facing(0.0), &cam, 80, 30, &display);
        assert!(layers.markers.is_empty());
        assert!(layers.graticule.is_empty());

        // Tilted so the north pole faces the camera
        display.toggle_poles();
        let layers = scene.render(&Orientation::new(0.0, -(60f64).to_radians()), &cam, 80, 30, &display);
        assert!(layers.markers.iter().any(|l| l.color == POLE_NORTH));
    }

    #[test]
    fn test_render_zero_size() {
        let scene = GlobeScene::new(SceneSettings::default());
        let layers = scene.render(&Orientation::default(), &Camera::default(), 0, 0, &DisplaySettings::default());
        assert!(layers.graticule.is_empty());
    }
}
