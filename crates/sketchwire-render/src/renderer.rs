//! History replay and in-progress painting.

use crate::surface::{DrawSurface, SurfaceDimensions};
use sketchwire_core::{Point, Rgba, Segment, SegmentKind, Stroke, StrokeKind};

fn kpoint(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x, p.y)
}

/// The circle geometry rule: the radius is the Euclidean length of the
/// full diagonal between the start and end corners, centered at the
/// bounding-box midpoint. Note the radius equals the box diagonal, not
/// the inscribed or circumscribed radius; every participant must agree
/// on this formula or circles render differently across surfaces.
pub fn circle_geometry(a: Point, b: Point) -> (Point, f64) {
    let rect = kurbo::Rect::from_points(kpoint(a), kpoint(b));
    let center = rect.center();
    let radius = rect.width().hypot(rect.height());
    (Point::new(center.x, center.y), radius)
}

/// Paint one stroke onto a surface, with its coordinates multiplied by the
/// given scale factors. A malformed or unrecognized stroke is logged and
/// skipped; painting never aborts a replay.
pub(crate) fn paint_stroke<S: DrawSurface>(surface: &mut S, stroke: &Stroke, sx: f64, sy: f64) {
    let color = Rgba::parse_hex(&stroke.color);
    let scaled = |p: Point| Point::new(p.x * sx, p.y * sy);

    match &stroke.kind {
        StrokeKind::Freehand => {
            if stroke.points.len() < 2 {
                log::warn!("skipping freehand stroke with {} point(s)", stroke.points.len());
                return;
            }
            for window in stroke.points.windows(2) {
                surface.draw_line(scaled(window[0]), scaled(window[1]), color, stroke.brush_size);
            }
        }
        StrokeKind::Rectangle => match stroke.corners() {
            Some((a, b)) => surface.draw_rect(scaled(a), scaled(b), color, stroke.brush_size),
            None => log::warn!("skipping rectangle stroke without corners"),
        },
        StrokeKind::Circle => match stroke.corners() {
            Some((a, b)) => {
                let (center, radius) = circle_geometry(scaled(a), scaled(b));
                surface.draw_circle(center, radius, color, stroke.brush_size);
            }
            None => log::warn!("skipping circle stroke without corners"),
        },
        StrokeKind::Unknown(kind) => {
            log::warn!("skipping stroke with unrecognized type '{kind}'");
        }
    }
}

/// Paint an in-progress segment onto a surface at raw coordinates.
fn paint_segment<S: DrawSurface>(surface: &mut S, segment: &Segment) {
    let color = Rgba::parse_hex(&segment.color);
    match &segment.kind {
        SegmentKind::Line => {
            surface.draw_line(segment.start, segment.end, color, segment.brush_size);
        }
        SegmentKind::Rectangle => {
            surface.draw_rect(segment.start, segment.end, color, segment.brush_size);
        }
        SegmentKind::Circle => {
            let (center, radius) = circle_geometry(segment.start, segment.end);
            surface.draw_circle(center, radius, color, segment.brush_size);
        }
        SegmentKind::Unknown(kind) => {
            log::warn!("skipping in-progress segment with unrecognized type '{kind}'");
        }
    }
}

/// Replays committed history and transient segments onto an attached
/// surface, rescaling on resize.
///
/// Paint calls issued before a surface is attached are no-ops. Incremental
/// paints (new segments, freshly received commits) use raw coordinates;
/// full replays multiply every stored coordinate by the scale factors
/// derived from the most recent resize. History is never rewritten, so
/// successive resizes compose from the immediately preceding coordinate
/// space rather than resetting from the original one.
#[derive(Debug, Default)]
pub struct CanvasRenderer<S> {
    surface: Option<S>,
    dimensions: Option<SurfaceDimensions>,
    previous: Option<SurfaceDimensions>,
}

impl<S: DrawSurface> CanvasRenderer<S> {
    pub fn new() -> Self {
        Self {
            surface: None,
            dimensions: None,
            previous: None,
        }
    }

    /// Attach the drawing surface once it exists.
    pub fn attach(&mut self, surface: S) {
        self.surface = Some(surface);
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Current surface dimensions, if a layout has been observed.
    pub fn dimensions(&self) -> Option<SurfaceDimensions> {
        self.dimensions
    }

    /// The scale factors applied to stored coordinates on replay:
    /// current dimensions over the dimensions recorded just before the
    /// most recent resize, or identity when there was no prior layout.
    pub fn scale(&self) -> (f64, f64) {
        match (self.previous, self.dimensions) {
            (Some(old), Some(new)) if !old.is_degenerate() => {
                (new.width / old.width, new.height / old.height)
            }
            _ => (1.0, 1.0),
        }
    }

    /// Record a new surface size and re-render history at the new scale.
    /// Skipped entirely on the first layout, when no prior dimensions
    /// exist to derive scale factors from.
    pub fn resize(&mut self, new: SurfaceDimensions, history: &[Stroke]) {
        let had_layout = self.dimensions.is_some();
        self.previous = self.dimensions;
        self.dimensions = Some(new);
        if had_layout {
            self.replay(history);
        }
    }

    /// Clear the surface and repaint the full history in order.
    pub fn replay(&mut self, history: &[Stroke]) {
        let (sx, sy) = self.scale();
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.clear();
        for stroke in history {
            paint_stroke(surface, stroke, sx, sy);
        }
    }

    /// Paint one committed stroke on top of the current pixels, without
    /// clearing. Used for freshly received remote commits.
    pub fn draw_stroke(&mut self, stroke: &Stroke) {
        if let Some(surface) = self.surface.as_mut() {
            paint_stroke(surface, stroke, 1.0, 1.0);
        }
    }

    /// Paint an incremental segment directly, without clearing. Used for
    /// freehand deltas, local and remote.
    pub fn draw_segment(&mut self, segment: &Segment) {
        if let Some(surface) = self.surface.as_mut() {
            paint_segment(surface, segment);
        }
    }

    /// Paint a live shape preview: clear, replay the committed history,
    /// then paint the outline from the segment's anchor to its end. The
    /// clear-and-replay prevents successive previews of the same
    /// in-progress shape from stacking ghost outlines.
    pub fn preview_segment(&mut self, history: &[Stroke], segment: &Segment) {
        self.replay(history);
        if let Some(surface) = self.surface.as_mut() {
            paint_segment(surface, segment);
        }
    }

    /// Blank the surface, dropping all painted content.
    pub fn clear_surface(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Op {
        Line(Point, Point),
        Rect(Point, Point),
        Circle(Point, f64),
        Clear,
    }

    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    impl DrawSurface for RecordingSurface {
        fn draw_line(&mut self, from: Point, to: Point, _color: Rgba, _width: f64) {
            self.ops.push(Op::Line(from, to));
        }

        fn draw_rect(&mut self, a: Point, b: Point, _color: Rgba, _width: f64) {
            self.ops.push(Op::Rect(a, b));
        }

        fn draw_circle(&mut self, center: Point, radius: f64, _color: Rgba, _width: f64) {
            self.ops.push(Op::Circle(center, radius));
        }

        fn clear(&mut self) {
            self.ops.push(Op::Clear);
        }

        fn fill(&mut self, _color: Rgba) {}
    }

    fn renderer() -> CanvasRenderer<RecordingSurface> {
        let mut r = CanvasRenderer::new();
        r.attach(RecordingSurface::default());
        r
    }

    fn freehand(points: Vec<Point>) -> Stroke {
        Stroke::freehand(points, "#000000", 2.0)
    }

    #[test]
    fn test_circle_radius_is_box_diagonal() {
        let (center, radius) = circle_geometry(Point::new(0.0, 0.0), Point::new(30.0, 40.0));
        assert_eq!(center, Point::new(15.0, 20.0));
        assert!((radius - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_geometry_corner_order_irrelevant() {
        let a = circle_geometry(Point::new(30.0, 40.0), Point::new(0.0, 0.0));
        let b = circle_geometry(Point::new(0.0, 40.0), Point::new(30.0, 0.0));
        assert_eq!(a.0, b.0);
        assert!((a.1 - b.1).abs() < 1e-9);
    }

    #[test]
    fn test_replay_paints_history_in_order() {
        let mut r = renderer();
        let history = vec![
            freehand(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
            Stroke::shape(
                StrokeKind::Rectangle,
                Point::new(0.0, 0.0),
                Point::new(100.0, 50.0),
                "#000000",
                2.0,
            ),
        ];
        r.replay(&history);

        let ops = &r.surface().unwrap().ops;
        assert_eq!(ops[0], Op::Clear);
        assert_eq!(ops[1], Op::Line(Point::new(0.0, 0.0), Point::new(10.0, 0.0)));
        assert_eq!(ops[2], Op::Rect(Point::new(0.0, 0.0), Point::new(100.0, 50.0)));
    }

    #[test]
    fn test_resize_scales_from_previous_dimensions() {
        let mut r = renderer();
        let history = vec![freehand(vec![Point::new(10.0, 20.0), Point::new(50.0, 80.0)])];

        // First layout: dimensions recorded, nothing painted.
        r.resize(SurfaceDimensions::new(100.0, 100.0), &history);
        assert!(r.surface().unwrap().ops.is_empty());

        // Second layout: scale (2.0, 0.5) from the previous dimensions.
        r.resize(SurfaceDimensions::new(200.0, 50.0), &history);
        let ops = &r.surface().unwrap().ops;
        assert_eq!(ops[0], Op::Clear);
        assert_eq!(ops[1], Op::Line(Point::new(20.0, 10.0), Point::new(100.0, 40.0)));
    }

    #[test]
    fn test_successive_resizes_compose_from_latest_pair() {
        let mut r = renderer();
        let history = vec![freehand(vec![Point::new(10.0, 10.0), Point::new(20.0, 20.0)])];
        r.resize(SurfaceDimensions::new(100.0, 100.0), &history);
        r.resize(SurfaceDimensions::new(200.0, 200.0), &history);
        r.resize(SurfaceDimensions::new(400.0, 400.0), &history);

        // The last replay uses only the (200, 400) pair against the raw
        // stored coordinates; earlier factors are not accumulated.
        let ops = &r.surface().unwrap().ops;
        let last = ops.last().unwrap();
        assert_eq!(*last, Op::Line(Point::new(20.0, 20.0), Point::new(40.0, 40.0)));
    }

    #[test]
    fn test_unknown_stroke_kind_skipped() {
        let mut r = renderer();
        let mut stroke = freehand(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        stroke.kind = StrokeKind::Unknown("spline".to_string());
        let history = vec![stroke, freehand(vec![Point::new(2.0, 2.0), Point::new(3.0, 3.0)])];
        r.replay(&history);

        // One clear, one line: the unknown stroke contributed nothing and
        // did not abort the replay.
        let ops = &r.surface().unwrap().ops;
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[1], Op::Line(Point::new(2.0, 2.0), Point::new(3.0, 3.0)));
    }

    #[test]
    fn test_shape_preview_clears_and_replays() {
        let mut r = renderer();
        let history = vec![freehand(vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)])];
        let segment = Segment {
            kind: SegmentKind::Circle,
            start: Point::new(0.0, 0.0),
            end: Point::new(30.0, 40.0),
            color: "#000000".to_string(),
            brush_size: 2.0,
        };
        r.preview_segment(&history, &segment);

        let ops = &r.surface().unwrap().ops;
        assert_eq!(ops[0], Op::Clear);
        assert_eq!(ops[1], Op::Line(Point::new(0.0, 0.0), Point::new(5.0, 5.0)));
        assert_eq!(ops[2], Op::Circle(Point::new(15.0, 20.0), 50.0));
    }

    #[test]
    fn test_freehand_segment_paints_without_clearing() {
        let mut r = renderer();
        let segment = Segment {
            kind: SegmentKind::Line,
            start: Point::new(1.0, 1.0),
            end: Point::new(2.0, 2.0),
            color: "#000000".to_string(),
            brush_size: 2.0,
        };
        r.draw_segment(&segment);

        let ops = &r.surface().unwrap().ops;
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0], Op::Line(Point::new(1.0, 1.0), Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_paints_before_surface_exists_are_noops() {
        let mut r: CanvasRenderer<RecordingSurface> = CanvasRenderer::new();
        let history = vec![freehand(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)])];
        // None of these may panic or paint.
        r.replay(&history);
        r.draw_stroke(&history[0]);
        r.clear_surface();
        r.resize(SurfaceDimensions::new(100.0, 100.0), &history);
        assert!(r.surface().is_none());
    }
}
