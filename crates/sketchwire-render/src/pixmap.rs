//! Software raster surface.
//!
//! Backs PNG export and the test suite. Strokes paint with round caps:
//! lines are stamped as overlapping discs, circles as short chords. Alpha
//! is not composited; the newest paint wins, matching the opaque stroke
//! model of the shared surface.

use crate::surface::DrawSurface;
use sketchwire_core::{Point, Rgba};

/// An RGBA8 pixel buffer implementing [`DrawSurface`].
#[derive(Debug, Clone)]
pub struct Pixmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Pixmap {
    /// Create a blank (fully transparent) pixmap. Zero extents are
    /// clamped to one pixel.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, row-major from the top-left.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Read one pixel. Out-of-bounds reads return transparent.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        if x >= self.width || y >= self.height {
            return Rgba::transparent();
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Rgba::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        )
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.pixels[i] = color.r;
        self.pixels[i + 1] = color.g;
        self.pixels[i + 2] = color.b;
        self.pixels[i + 3] = color.a;
    }

    /// Stamp a filled disc (a round brush dab).
    fn stamp(&mut self, center: Point, radius: f64, color: Rgba) {
        let r = radius.max(0.5);
        let x0 = (center.x - r).floor() as i64;
        let x1 = (center.x + r).ceil() as i64;
        let y0 = (center.y - r).floor() as i64;
        let y1 = (center.y + r).ceil() as i64;
        let r2 = r * r;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = (x as f64 + 0.5) - center.x;
                let dy = (y as f64 + 0.5) - center.y;
                if dx * dx + dy * dy <= r2 {
                    self.put(x, y, color);
                }
            }
        }
    }
}

impl DrawSurface for Pixmap {
    fn draw_line(&mut self, from: Point, to: Point, color: Rgba, width: f64) {
        let radius = (width / 2.0).max(0.5);
        let length = from.distance(to);
        // Dab spacing of half a pixel keeps the cap overlap seamless.
        let steps = (length * 2.0).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let p = Point::new(
                from.x + (to.x - from.x) * t,
                from.y + (to.y - from.y) * t,
            );
            self.stamp(p, radius, color);
        }
    }

    fn draw_rect(&mut self, a: Point, b: Point, color: Rgba, width: f64) {
        let rect = kurbo::Rect::from_points(
            kurbo::Point::new(a.x, a.y),
            kurbo::Point::new(b.x, b.y),
        );
        let tl = Point::new(rect.x0, rect.y0);
        let tr = Point::new(rect.x1, rect.y0);
        let br = Point::new(rect.x1, rect.y1);
        let bl = Point::new(rect.x0, rect.y1);
        self.draw_line(tl, tr, color, width);
        self.draw_line(tr, br, color, width);
        self.draw_line(br, bl, color, width);
        self.draw_line(bl, tl, color, width);
    }

    fn draw_circle(&mut self, center: Point, radius: f64, color: Rgba, width: f64) {
        if radius <= 0.0 {
            return;
        }
        // Chord count grows with circumference so big circles stay round.
        let steps = ((radius * std::f64::consts::TAU) / 2.0)
            .ceil()
            .clamp(16.0, 512.0) as usize;
        let mut previous = Point::new(center.x + radius, center.y);
        for i in 1..=steps {
            let angle = std::f64::consts::TAU * (i as f64 / steps as f64);
            let next = Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            );
            self.draw_line(previous, next, color, width);
            previous = next;
        }
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn fill(&mut self, color: Rgba) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk[0] = color.r;
            chunk[1] = color.g;
            chunk[2] = color.b;
            chunk[3] = color.a;
        }
    }
}
