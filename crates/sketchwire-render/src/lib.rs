//! SketchWire rendering.
//!
//! The drawing surface is an opaque capability: anything that can render a
//! line, a rectangle outline and a circle outline implements
//! [`DrawSurface`]. The [`CanvasRenderer`] replays committed history and
//! transient in-progress segments onto whatever surface is attached, and
//! [`Pixmap`] is a software raster surface backing image export and tests.

pub mod export;
pub mod pixmap;
pub mod renderer;
pub mod surface;

pub use export::{export_png, save_png, ExportError};
pub use pixmap::Pixmap;
pub use renderer::{circle_geometry, CanvasRenderer};
pub use surface::{DrawSurface, SurfaceDimensions};
