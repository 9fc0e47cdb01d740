//! Gesture capture: turning raw pointer gestures into strokes.
//!
//! The machine is `Idle -> Capturing -> {committed, discarded}`. Tool
//! settings are snapshotted once at gesture start, so a color or size
//! change mid-gesture never affects the stroke in flight.

use crate::protocol::{Point, Segment, SegmentKind, Stroke, StrokeKind};

/// Available drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
    Rectangle,
    Circle,
}

/// Local-only tool state. Never synchronized between participants; the
/// capture machine takes an immutable snapshot of it at gesture start.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: String,
    pub brush_size: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: ToolKind::Brush,
            color: "#000000".to_string(),
            brush_size: 2.0,
        }
    }
}

/// What a pointer move produced, both for local painting and for the
/// in-progress event broadcast to peers.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureMove {
    /// Freehand delta: paint just this segment on top of the surface.
    Draw(Segment),
    /// Shape delta: clear, replay committed history, then paint the live
    /// shape outline from `segment.start` to `segment.end`.
    Preview(Segment),
}

impl GestureMove {
    /// The segment to broadcast, whichever way it is painted locally.
    pub fn segment(&self) -> &Segment {
        match self {
            GestureMove::Draw(segment) | GestureMove::Preview(segment) => segment,
        }
    }
}

#[derive(Debug, Clone, Default)]
enum CaptureState {
    #[default]
    Idle,
    Capturing {
        tool: ToolKind,
        /// Effective color: the snapshot color, or the surface background
        /// for the eraser (compositing trick, not true pixel erasure).
        color: String,
        brush_size: f64,
        start: Point,
        current: Point,
        /// Accumulated path for freehand tools; unused for shapes.
        points: Vec<Point>,
    },
}

/// The per-participant gesture state machine.
///
/// A pending gesture resolves only on a subsequent move/end/leave input;
/// there is no timer-based cancellation.
#[derive(Debug, Clone)]
pub struct StrokeCapture {
    state: CaptureState,
    /// Surface background color; the eraser draws with this.
    background: String,
}

impl StrokeCapture {
    pub fn new(background: impl Into<String>) -> Self {
        Self {
            state: CaptureState::Idle,
            background: background.into(),
        }
    }

    /// Whether a gesture is in flight.
    pub fn is_capturing(&self) -> bool {
        matches!(self.state, CaptureState::Capturing { .. })
    }

    /// Begin a gesture: snapshot the tool settings and record the first
    /// point. A gesture already in flight is replaced; the old one is
    /// discarded without an event.
    pub fn gesture_start(&mut self, point: Point, tools: &ToolSettings) {
        let color = match tools.tool {
            ToolKind::Eraser => self.background.clone(),
            _ => tools.color.clone(),
        };
        self.state = CaptureState::Capturing {
            tool: tools.tool,
            color,
            brush_size: tools.brush_size,
            start: point,
            current: point,
            points: vec![point],
        };
    }

    /// Advance the gesture to a new pointer position.
    ///
    /// Returns the incremental delta to paint and broadcast, or `None`
    /// when no gesture is in flight.
    pub fn gesture_move(&mut self, point: Point) -> Option<GestureMove> {
        let CaptureState::Capturing {
            tool,
            color,
            brush_size,
            start,
            current,
            points,
        } = &mut self.state
        else {
            return None;
        };

        let previous = *current;
        *current = point;

        match tool {
            ToolKind::Brush | ToolKind::Eraser => {
                points.push(point);
                Some(GestureMove::Draw(Segment {
                    kind: SegmentKind::Line,
                    start: previous,
                    end: point,
                    color: color.clone(),
                    brush_size: *brush_size,
                }))
            }
            ToolKind::Rectangle | ToolKind::Circle => {
                let kind = match tool {
                    ToolKind::Rectangle => SegmentKind::Rectangle,
                    _ => SegmentKind::Circle,
                };
                Some(GestureMove::Preview(Segment {
                    kind,
                    start: *start,
                    end: point,
                    color: color.clone(),
                    brush_size: *brush_size,
                }))
            }
        }
    }

    /// End the gesture and return the frozen stroke if it satisfies the
    /// minimum-size predicate, `None` if it was discarded.
    ///
    /// Leaving the drawing surface mid-gesture goes through here too, so
    /// in-flight gestures are never silently lost.
    pub fn gesture_end(&mut self) -> Option<Stroke> {
        let state = std::mem::take(&mut self.state);
        let CaptureState::Capturing {
            tool,
            color,
            brush_size,
            start,
            current,
            points,
        } = state
        else {
            return None;
        };

        let stroke = match tool {
            ToolKind::Brush | ToolKind::Eraser => Stroke::freehand(points, color, brush_size),
            ToolKind::Rectangle => {
                Stroke::shape(StrokeKind::Rectangle, start, current, color, brush_size)
            }
            ToolKind::Circle => {
                Stroke::shape(StrokeKind::Circle, start, current, color, brush_size)
            }
        };

        stroke.is_valid().then_some(stroke)
    }
}
