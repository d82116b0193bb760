pub mod camera;
pub mod geometry;
pub mod mesh;
pub mod palette;
pub mod projection;
pub mod scene;

pub use camera::{Camera, Orientation, Ray};
pub use palette::Continent;
pub use projection::{lat_lon_to_vec3, normalize_angle, shortest_delta, smoothstep};
pub use scene::{DisplaySettings, GlobeLayers, GlobeScene, SceneSettings, ScenePicker};
