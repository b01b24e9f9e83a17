//! The cartoon playing on the living-room TV: a vector display list,
//! scripted scenes and a tiny-skia rasterizer feeding a GPU texture.

pub mod characters;
pub mod drawing;
pub mod episode;
pub mod raster;
pub mod scenes;

pub use characters::{cat, mouse, CatPose};
pub use drawing::{Drawing, Element, Group, Node, Shape};
pub use episode::CartoonEpisode;
pub use raster::{rasterize, render_into, CANVAS_HEIGHT, CANVAS_WIDTH};
pub use scenes::CartoonScene;
