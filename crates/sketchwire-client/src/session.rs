//! The per-participant reconciliation loop.
//!
//! A session owns the gesture capture machine, the stroke store and the
//! renderer, and exchanges wire events with the relay hub. It never shares
//! memory with other participants: consistency is purely a messaging
//! property, and every remote event runs the identical transition against
//! this session's own stacks.

use std::path::Path;

use crate::net::{NetEvent, RelayConnection};
use sketchwire_core::{
    GestureMove, Point, Rgba, StrokeCapture, StrokeStore, ToolKind, ToolSettings, WireEvent,
};
use sketchwire_render::{export, CanvasRenderer, DrawSurface, ExportError, SurfaceDimensions};

/// Surface background color; also what the eraser paints with.
const BACKGROUND_COLOR: &str = "#ffffff";

/// One connected drawing participant.
pub struct Session<S> {
    tools: ToolSettings,
    capture: StrokeCapture,
    store: StrokeStore,
    renderer: CanvasRenderer<S>,
    connected: bool,
    /// Encoded events waiting to be handed to the transport.
    outgoing: Vec<String>,
}

impl<S: DrawSurface> Session<S> {
    /// Create a session with empty history. New participants always start
    /// empty: there is no late-join sync.
    pub fn new() -> Self {
        Self {
            tools: ToolSettings::default(),
            capture: StrokeCapture::new(BACKGROUND_COLOR),
            store: StrokeStore::new(),
            renderer: CanvasRenderer::new(),
            connected: false,
            outgoing: Vec::new(),
        }
    }

    /// Attach the drawing surface once it exists. Until then all paint
    /// calls are no-ops.
    pub fn attach_surface(&mut self, surface: S) {
        self.renderer.attach(surface);
    }

    pub fn renderer(&self) -> &CanvasRenderer<S> {
        &self.renderer
    }

    pub fn store(&self) -> &StrokeStore {
        &self.store
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    // --- Tool state (local-only, never synchronized) ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.tool = tool;
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.tools.color = color.into();
    }

    pub fn set_brush_size(&mut self, brush_size: f64) {
        self.tools.brush_size = brush_size;
    }

    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    // --- Local gestures ---

    /// Gesture start: snapshot the tool state and open a provisional
    /// stroke.
    pub fn pointer_down(&mut self, point: Point) {
        self.capture.gesture_start(point, &self.tools);
    }

    /// Gesture move: paint locally and broadcast the incremental delta.
    pub fn pointer_move(&mut self, point: Point) {
        match self.capture.gesture_move(point) {
            Some(GestureMove::Draw(segment)) => {
                self.renderer.draw_segment(&segment);
                self.send(WireEvent::InProgressSegment(segment));
            }
            Some(GestureMove::Preview(segment)) => {
                self.renderer.preview_segment(self.store.history(), &segment);
                self.send(WireEvent::InProgressSegment(segment));
            }
            None => {}
        }
    }

    /// Gesture end: commit-if-valid, then broadcast the full stroke.
    pub fn pointer_up(&mut self) {
        self.finish_gesture();
    }

    /// Leaving the drawing surface mid-gesture commits exactly like a
    /// normal gesture end; in-flight gestures are never silently lost.
    pub fn pointer_leave(&mut self) {
        self.finish_gesture();
    }

    fn finish_gesture(&mut self) {
        if let Some(stroke) = self.capture.gesture_end() {
            self.store.commit(stroke.clone());
            self.send(WireEvent::CommitStroke(stroke));
        }
    }

    // --- Local undo / redo / clear ---

    /// Pop the newest stroke and broadcast; a no-op with nothing to undo.
    pub fn undo(&mut self) {
        if self.store.undo() {
            self.renderer.replay(self.store.history());
            self.send(WireEvent::Undo);
        }
    }

    /// Restore the most recently undone stroke and broadcast.
    pub fn redo(&mut self) {
        if self.store.redo() {
            self.renderer.replay(self.store.history());
            self.send(WireEvent::Redo);
        }
    }

    /// Empty both stacks, blank the surface, and broadcast. The hub echoes
    /// clear back to the sender; re-applying it on empty stacks is
    /// harmless.
    pub fn clear_canvas(&mut self) {
        self.store.clear();
        self.renderer.clear_surface();
        self.send(WireEvent::Clear);
    }

    // --- Remote events ---

    /// Apply one frame received from the hub. A malformed frame is logged
    /// and dropped; it never aborts the session.
    pub fn apply_remote(&mut self, text: &str) {
        let event = match WireEvent::from_json(text) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("ignoring malformed wire event: {e}");
                return;
            }
        };

        match event {
            WireEvent::CommitStroke(stroke) => {
                // Painted on top of current pixels; appended in receipt
                // order. The redo stack is untouched by remote commits.
                self.renderer.draw_stroke(&stroke);
                self.store.apply_remote(stroke);
            }
            WireEvent::InProgressSegment(segment) => {
                if segment.kind.is_shape() {
                    self.renderer.preview_segment(self.store.history(), &segment);
                } else {
                    self.renderer.draw_segment(&segment);
                }
            }
            WireEvent::Undo => {
                if self.store.undo() {
                    self.renderer.replay(self.store.history());
                }
            }
            WireEvent::Redo => {
                if self.store.redo() {
                    self.renderer.replay(self.store.history());
                }
            }
            WireEvent::Clear => {
                self.store.clear();
                self.renderer.clear_surface();
            }
        }
    }

    // --- Surface ---

    /// Record a new surface size and rescale the rendered history from the
    /// dimensions in effect just before this resize.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.renderer
            .resize(SurfaceDimensions::new(width, height), self.store.history());
    }

    // --- Export ---

    /// Rasterize the current history to PNG bytes at the current surface
    /// dimensions, optionally over a background fill.
    pub fn export_png(&self, include_background: bool) -> Result<Vec<u8>, ExportError> {
        let dimensions = self.renderer.dimensions().unwrap_or_default();
        let background = include_background.then(|| Rgba::parse_hex(BACKGROUND_COLOR));
        export::export_png(
            self.store.history(),
            dimensions,
            self.renderer.scale(),
            background,
        )
    }

    /// Export and write the artifact to a local file.
    pub fn export_png_to_file(
        &self,
        path: impl AsRef<Path>,
        include_background: bool,
    ) -> Result<(), ExportError> {
        let data = self.export_png(include_background)?;
        export::save_png(path, &data)
    }

    // --- Transport wiring ---

    /// Feed one transport event into the session.
    pub fn handle_net(&mut self, event: NetEvent) {
        match event {
            NetEvent::Connected => self.connected = true,
            NetEvent::Disconnected => self.connected = false,
            NetEvent::Message(text) => self.apply_remote(&text),
        }
    }

    /// Drain the queued outgoing frames.
    pub fn poll_outgoing(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outgoing)
    }

    /// One turn of the event loop: apply everything the socket delivered,
    /// then flush queued frames to it.
    pub fn pump(&mut self, connection: &mut RelayConnection) {
        for event in connection.poll_events() {
            self.handle_net(event);
        }
        for frame in self.poll_outgoing() {
            if let Err(e) = connection.send(&frame) {
                log::debug!("dropping frame: {e}");
            }
        }
    }

    /// Queue an event for the hub. Events produced while disconnected are
    /// dropped on the floor: no queue, no replay, no retry.
    fn send(&mut self, event: WireEvent) {
        if !self.connected {
            log::debug!("dropping event while disconnected");
            return;
        }
        match event.to_json() {
            Ok(json) => self.outgoing.push(json),
            Err(e) => log::warn!("failed to encode event: {e}"),
        }
    }
}

impl<S: DrawSurface> Default for Session<S> {
    fn default() -> Self {
        Self::new()
    }
}
