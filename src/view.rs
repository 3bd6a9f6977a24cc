//! View transform: zoom, pan, and screen ↔ scene coordinate mapping.
//!
//! A scene point `p` maps to the viewport as `p * scale + offset`. Zooming
//! re-solves the offset so the scene point under the anchor stays put.

use crate::annotation::Point;
use crate::constants::{threshold, zoom};

/// Pan/zoom state for one loaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    /// Fit-to-viewport scale, computed once per loaded image.
    fit_scale: f32,
    viewport: (f32, f32),
    image: (f32, f32),
}

impl ViewTransform {
    /// Create a transform fitted to the viewport, or `None` while the
    /// viewport has no usable size (not yet laid out).
    pub fn fit(viewport: (f32, f32), image: (f32, f32)) -> Option<Self> {
        if viewport.0 <= 0.0 || viewport.1 <= 0.0 || image.0 <= 0.0 || image.1 <= 0.0 {
            return None;
        }

        let fit_scale = (viewport.0 / image.0)
            .min(viewport.1 / image.1)
            .min(1.0)
            .clamp(zoom::MIN, zoom::MAX);

        let mut view = Self {
            scale: fit_scale,
            offset_x: 0.0,
            offset_y: 0.0,
            fit_scale,
            viewport,
            image,
        };
        view.center();
        Some(view)
    }

    /// Current zoom level, always within `[zoom::MIN, zoom::MAX]`.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The fit-to-viewport scale this transform was created with.
    pub fn fit_scale(&self) -> f32 {
        self.fit_scale
    }

    /// Convert a viewport position to scene coordinates.
    pub fn screen_to_scene(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset_x) / self.scale,
            (p.y - self.offset_y) / self.scale,
        )
    }

    /// Convert a scene position to viewport coordinates.
    pub fn scene_to_screen(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset_x,
            p.y * self.scale + self.offset_y,
        )
    }

    /// Zoom in one step, anchored at the viewport center (toolbar button,
    /// no cursor to anchor on).
    pub fn zoom_in(&mut self) {
        self.zoom_at(self.viewport_center(), self.scale * zoom::STEP);
    }

    /// Zoom out one step, anchored at the viewport center.
    pub fn zoom_out(&mut self) {
        self.zoom_at(self.viewport_center(), self.scale / zoom::STEP);
    }

    /// Wheel-driven zoom anchored at the cursor; positive steps zoom in.
    /// The scene point under the cursor stays under the cursor.
    pub fn zoom_wheel(&mut self, cursor: Point, steps: i32) {
        if steps == 0 {
            return;
        }
        let factor = zoom::WHEEL_STEP.powi(steps);
        self.zoom_at(cursor, self.scale * factor);
    }

    /// Restore the fit-to-viewport scale and recenter the image.
    pub fn reset(&mut self) {
        self.scale = self.fit_scale;
        self.center();
        log::debug!("🔄 View reset to fit scale {:.2}x", self.scale);
    }

    /// Apply a pan delta in viewport pixels. Never alters the scale.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Zoom to `new_scale` keeping the scene point under `anchor` fixed.
    /// The anchor is in viewport pixels.
    fn zoom_at(&mut self, anchor: Point, new_scale: f32) {
        let new_scale = new_scale.clamp(zoom::MIN, zoom::MAX);
        if (new_scale - self.scale).abs() < threshold::FLOAT_EPSILON {
            return;
        }

        let ratio = new_scale / self.scale;
        self.offset_x = anchor.x - (anchor.x - self.offset_x) * ratio;
        self.offset_y = anchor.y - (anchor.y - self.offset_y) * ratio;
        self.scale = new_scale;
        log::debug!("🔍 Zoom: {:.2}x at ({:.1}, {:.1})", new_scale, anchor.x, anchor.y);
    }

    /// Center the image in the viewport at the current scale.
    fn center(&mut self) {
        self.offset_x = (self.viewport.0 - self.image.0 * self.scale) / 2.0;
        self.offset_y = (self.viewport.1 - self.image.1 * self.scale) / 2.0;
    }

    fn viewport_center(&self) -> Point {
        Point::new(self.viewport.0 / 2.0, self.viewport.1 / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn fit_scale_caps_at_one_then_fits() {
        // 1600x1200 image in an 800x600 viewport: fit = 0.5
        let view = ViewTransform::fit((800.0, 600.0), (1600.0, 1200.0)).expect("valid");
        assert!(approx_eq(view.scale(), 0.5));

        // Small image never upscales past 1.0
        let view = ViewTransform::fit((800.0, 600.0), (100.0, 100.0)).expect("valid");
        assert!(approx_eq(view.scale(), 1.0));
    }

    #[test]
    fn zero_viewport_defers() {
        assert!(ViewTransform::fit((0.0, 0.0), (100.0, 100.0)).is_none());
        assert!(ViewTransform::fit((800.0, 600.0), (0.0, 0.0)).is_none());
    }

    #[test]
    fn fit_centers_image() {
        let view = ViewTransform::fit((800.0, 600.0), (1600.0, 1200.0)).expect("valid");
        // Image exactly fills the viewport at fit scale, so the image center
        // lands at the viewport center.
        let center = view.scene_to_screen(Point::new(800.0, 600.0));
        assert!(approx_eq(center.x, 400.0));
        assert!(approx_eq(center.y, 300.0));
    }

    #[test]
    fn screen_scene_roundtrip() {
        let mut view = ViewTransform::fit((800.0, 600.0), (1600.0, 1200.0)).expect("valid");
        view.zoom_wheel(Point::new(123.0, 456.0), 3);
        view.pan_by(17.0, -9.0);

        let scene = Point::new(321.5, 654.25);
        let back = view.screen_to_scene(view.scene_to_screen(scene));
        assert!(approx_eq(back.x, scene.x));
        assert!(approx_eq(back.y, scene.y));
    }

    #[test]
    fn zoom_in_converges_to_max() {
        let mut view = ViewTransform::fit((800.0, 600.0), (800.0, 600.0)).expect("valid");
        for _ in 0..100 {
            view.zoom_in();
            assert!(view.scale() <= 5.0 + EPSILON);
        }
        assert!(approx_eq(view.scale(), 5.0));
    }

    #[test]
    fn zoom_out_converges_to_min() {
        let mut view = ViewTransform::fit((800.0, 600.0), (800.0, 600.0)).expect("valid");
        for _ in 0..100 {
            view.zoom_out();
            assert!(view.scale() >= 0.1 - EPSILON);
        }
        assert!(approx_eq(view.scale(), 0.1));
    }

    #[test]
    fn center_zoom_keeps_center_point() {
        let mut view = ViewTransform::fit((800.0, 600.0), (1600.0, 1200.0)).expect("valid");
        let before = view.screen_to_scene(Point::new(400.0, 300.0));
        view.zoom_in();
        let after = view.screen_to_scene(Point::new(400.0, 300.0));
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn wheel_zoom_keeps_cursor_point() {
        // The scene point under the cursor must survive the zoom, for
        // several distinct starting scales.
        for start_steps in [0, 5, -5] {
            let mut view = ViewTransform::fit((800.0, 600.0), (1600.0, 1200.0)).expect("valid");
            view.zoom_wheel(Point::new(400.0, 300.0), start_steps);

            let cursor = Point::new(610.0, 140.0);
            let before = view.screen_to_scene(cursor);
            view.zoom_wheel(cursor, 1);
            let after = view.screen_to_scene(cursor);

            assert!(approx_eq(before.x, after.x), "x drifted at {start_steps}");
            assert!(approx_eq(before.y, after.y), "y drifted at {start_steps}");
        }
    }

    #[test]
    fn pan_preserves_scale() {
        let mut view = ViewTransform::fit((800.0, 600.0), (1600.0, 1200.0)).expect("valid");
        let scale = view.scale();
        view.pan_by(100.0, -200.0);
        assert_eq!(view.scale(), scale);

        let p = view.screen_to_scene(Point::new(0.0, 0.0));
        view.pan_by(50.0, 50.0);
        let q = view.screen_to_scene(Point::new(50.0, 50.0));
        assert!(approx_eq(p.x, q.x));
        assert!(approx_eq(p.y, q.y));
    }

    #[test]
    fn reset_restores_fit() {
        let mut view = ViewTransform::fit((800.0, 600.0), (1600.0, 1200.0)).expect("valid");
        view.zoom_wheel(Point::new(100.0, 100.0), 7);
        view.pan_by(300.0, 300.0);
        view.reset();
        assert!(approx_eq(view.scale(), 0.5));
        let center = view.scene_to_screen(Point::new(800.0, 600.0));
        assert!(approx_eq(center.x, 400.0));
        assert!(approx_eq(center.y, 300.0));
    }
}
