//! Wire protocol for the shared drawing surface.
//!
//! Events are JSON with an `event` tag and an optional `data` payload:
//!
//! ```json
//! { "event": "commit-stroke", "data": { "type": "freehand", "points": [...], "color": "#ff0000", "brushSize": 4.0 } }
//! { "event": "in-progress-segment", "data": { "type": "line", "start": {...}, "end": {...}, "color": "#ff0000", "brushSize": 4.0 } }
//! { "event": "undo" }
//! ```
//!
//! Strokes are anonymous: there is no identifier on the wire, so undo, redo
//! and clear address whatever is at the tail of each recipient's own stacks.
//! Delivery is best-effort and unordered across senders; consistency is an
//! eventual property of every participant applying the same transitions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Protocol errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed wire event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A point in surface-local coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The kind of a committed stroke.
///
/// An absent `type` on the wire means [`StrokeKind::Freehand`]; an
/// unrecognized one is preserved as [`StrokeKind::Unknown`] so the renderer
/// can skip that single stroke instead of rejecting the whole event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StrokeKind {
    #[default]
    Freehand,
    Rectangle,
    Circle,
    Unknown(String),
}

impl StrokeKind {
    pub fn as_str(&self) -> &str {
        match self {
            StrokeKind::Freehand => "freehand",
            StrokeKind::Rectangle => "rectangle",
            StrokeKind::Circle => "circle",
            StrokeKind::Unknown(other) => other,
        }
    }
}

impl Serialize for StrokeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StrokeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "freehand" => StrokeKind::Freehand,
            "rectangle" => StrokeKind::Rectangle,
            "circle" => StrokeKind::Circle,
            _ => StrokeKind::Unknown(s),
        })
    }
}

/// The kind of an in-progress segment. Brush and eraser gestures are
/// provisional `line` segments until commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SegmentKind {
    #[default]
    Line,
    Rectangle,
    Circle,
    Unknown(String),
}

impl SegmentKind {
    pub fn as_str(&self) -> &str {
        match self {
            SegmentKind::Line => "line",
            SegmentKind::Rectangle => "rectangle",
            SegmentKind::Circle => "circle",
            SegmentKind::Unknown(other) => other,
        }
    }

    /// Whether previewing this segment requires clearing and replaying the
    /// committed history first (shape previews would otherwise stack ghost
    /// outlines on every move).
    pub fn is_shape(&self) -> bool {
        matches!(self, SegmentKind::Rectangle | SegmentKind::Circle)
    }
}

impl Serialize for SegmentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SegmentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "line" => SegmentKind::Line,
            "rectangle" => SegmentKind::Rectangle,
            "circle" => SegmentKind::Circle,
            _ => SegmentKind::Unknown(s),
        })
    }
}

/// One committed drawing action with fixed color and size attributes.
///
/// Freehand strokes carry an ordered point sequence; shapes carry start and
/// end corners. Both encodings share one struct because the wire object is
/// shaped that way and because strokes have no identity beyond their data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    #[serde(rename = "type", default)]
    pub kind: StrokeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_point: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_point: Option<Point>,
    pub color: String,
    pub brush_size: f64,
}

impl Stroke {
    /// A freehand stroke through an ordered point sequence.
    pub fn freehand(points: Vec<Point>, color: impl Into<String>, brush_size: f64) -> Self {
        Self {
            kind: StrokeKind::Freehand,
            points,
            start_point: None,
            end_point: None,
            color: color.into(),
            brush_size,
        }
    }

    /// A shape stroke between two corners.
    pub fn shape(
        kind: StrokeKind,
        start: Point,
        end: Point,
        color: impl Into<String>,
        brush_size: f64,
    ) -> Self {
        Self {
            kind,
            points: Vec::new(),
            start_point: Some(start),
            end_point: Some(end),
            color: color.into(),
            brush_size,
        }
    }

    /// The shape corners, if both are present.
    pub fn corners(&self) -> Option<(Point, Point)> {
        Some((self.start_point?, self.end_point?))
    }

    /// The minimum-size predicate: a freehand stroke needs at least two
    /// points, a shape needs distinct corners. Strokes failing this are
    /// discarded at gesture end, never committed, never broadcast.
    pub fn is_valid(&self) -> bool {
        match self.kind {
            StrokeKind::Freehand => self.points.len() >= 2,
            StrokeKind::Rectangle | StrokeKind::Circle => {
                matches!(self.corners(), Some((a, b)) if a != b)
            }
            StrokeKind::Unknown(_) => false,
        }
    }
}

/// A transient, uncommitted delta broadcast for live peer preview.
///
/// Always the incremental delta, never the whole stroke: for freehand the
/// previous and new point, for shapes the anchor corner and the new end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub start: Point,
    pub end: Point,
    pub color: String,
    pub brush_size: f64,
}

/// The full event vocabulary exchanged through the relay hub.
///
/// Fan-out is the hub's concern: `clear` goes to every connection including
/// the sender, everything else to every connection except the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum WireEvent {
    CommitStroke(Stroke),
    InProgressSegment(Segment),
    Undo,
    Redo,
    Clear,
}

impl WireEvent {
    /// Encode for transmission.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a received frame.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl std::str::FromStr for WireEvent {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_stroke_wire_shape() {
        let stroke = Stroke::freehand(
            vec![Point::new(10.0, 10.0), Point::new(20.0, 10.0)],
            "#ff0000",
            4.0,
        );
        let json = WireEvent::CommitStroke(stroke).to_json().unwrap();
        assert!(json.contains(r#""event":"commit-stroke""#));
        assert!(json.contains(r#""type":"freehand""#));
        assert!(json.contains(r#""brushSize":4.0"#));
        assert!(json.contains(r##""color":"#ff0000""##));
    }

    #[test]
    fn test_shape_stroke_wire_shape() {
        let stroke = Stroke::shape(
            StrokeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(100.0, 50.0),
            "#000000",
            2.0,
        );
        let json = serde_json::to_string(&stroke).unwrap();
        assert!(json.contains(r#""startPoint":{"x":0.0,"y":0.0}"#));
        assert!(json.contains(r#""endPoint":{"x":100.0,"y":50.0}"#));
        assert!(!json.contains("points"));
    }

    #[test]
    fn test_missing_type_defaults_to_freehand() {
        let json = r##"{"event":"commit-stroke","data":{"points":[{"x":1.0,"y":2.0},{"x":3.0,"y":4.0}],"color":"#000000","brushSize":2.0}}"##;
        let event = WireEvent::from_json(json).unwrap();
        match event {
            WireEvent::CommitStroke(stroke) => {
                assert_eq!(stroke.kind, StrokeKind::Freehand);
                assert_eq!(stroke.points.len(), 2);
            }
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_stroke_kind_still_parses() {
        let json = r##"{"event":"commit-stroke","data":{"type":"spline","startPoint":{"x":0.0,"y":0.0},"endPoint":{"x":1.0,"y":1.0},"color":"#000000","brushSize":2.0}}"##;
        let event = WireEvent::from_json(json).unwrap();
        match event {
            WireEvent::CommitStroke(stroke) => {
                assert_eq!(stroke.kind, StrokeKind::Unknown("spline".to_string()));
                assert!(!stroke.is_valid());
            }
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn test_payloadless_events() {
        for (event, name) in [
            (WireEvent::Undo, "undo"),
            (WireEvent::Redo, "redo"),
            (WireEvent::Clear, "clear"),
        ] {
            let json = event.to_json().unwrap();
            assert_eq!(json, format!(r#"{{"event":"{name}"}}"#));
            assert_eq!(WireEvent::from_json(&json).unwrap(), event);
        }
    }

    #[test]
    fn test_segment_roundtrip() {
        let segment = Segment {
            kind: SegmentKind::Line,
            start: Point::new(1.0, 2.0),
            end: Point::new(3.0, 4.0),
            color: "#abcdef".to_string(),
            brush_size: 6.0,
        };
        let json = WireEvent::InProgressSegment(segment.clone()).to_json().unwrap();
        assert!(json.contains(r#""event":"in-progress-segment""#));
        assert!(json.contains(r#""type":"line""#));
        match WireEvent::from_json(&json).unwrap() {
            WireEvent::InProgressSegment(parsed) => assert_eq!(parsed, segment),
            other => panic!("wrong event: {other:?}"),
        }
    }

    #[test]
    fn test_minimum_size_predicate() {
        let short = Stroke::freehand(vec![Point::new(0.0, 0.0)], "#000000", 2.0);
        assert!(!short.is_valid());

        let degenerate = Stroke::shape(
            StrokeKind::Circle,
            Point::new(5.0, 5.0),
            Point::new(5.0, 5.0),
            "#000000",
            2.0,
        );
        assert!(!degenerate.is_valid());

        let ok = Stroke::shape(
            StrokeKind::Circle,
            Point::new(5.0, 5.0),
            Point::new(6.0, 5.0),
            "#000000",
            2.0,
        );
        assert!(ok.is_valid());
    }

    #[test]
    fn test_malformed_event_is_an_error() {
        assert!(WireEvent::from_json("not json").is_err());
        assert!(WireEvent::from_json(r#"{"event":"teleport"}"#).is_err());
    }
}
