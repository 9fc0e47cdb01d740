//! SketchWire Core Library
//!
//! Platform-agnostic protocol vocabulary and per-participant drawing state
//! for the SketchWire shared surface. Networking and pixels live in the
//! `sketchwire-client` and `sketchwire-render` crates.

pub mod capture;
pub mod color;
pub mod protocol;
pub mod store;

pub use capture::{GestureMove, StrokeCapture, ToolKind, ToolSettings};
pub use color::Rgba;
pub use protocol::{Point, ProtocolError, Segment, SegmentKind, Stroke, StrokeKind, WireEvent};
pub use store::StrokeStore;
