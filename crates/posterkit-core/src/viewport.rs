//! Viewport pan/zoom transform.

use crate::config::EditorConfig;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// The view transform of the stage.
///
/// Screen coordinates are relative to the stage container; canvas
/// coordinates are the poster's logical pixels. Not part of undo history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Translation in screen pixels.
    pub pan: Vec2,
    /// Scale factor (1.0 = 100%).
    pub zoom: f64,
    /// When set, pointer drags on the stage pan instead of moving elements.
    pub pan_mode: bool,
    min_zoom: f64,
    max_zoom: f64,
    zoom_in_factor: f64,
    zoom_out_factor: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0_f64.clamp(config.min_zoom, config.max_zoom),
            pan_mode: false,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            zoom_in_factor: config.zoom_in_factor,
            zoom_out_factor: config.zoom_out_factor,
        }
    }

    /// Canvas to screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Screen to canvas.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    pub fn screen_to_canvas(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn canvas_to_screen(&self, canvas_point: Point) -> Point {
        self.transform() * canvas_point
    }

    /// Multiply the zoom by `factor`, clamped to the allowed range.
    /// Returns true if the zoom changed.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = new_zoom;
        true
    }

    /// Apply a wheel event: scrolling up (negative delta) zooms in.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if -delta_y > 0.0 {
            self.zoom_by(self.zoom_in_factor)
        } else {
            self.zoom_by(self.zoom_out_factor)
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_by(self.zoom_in_factor)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_by(self.zoom_out_factor)
    }

    /// Pan the view by a delta in screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Back to 100% with no pan. Pan mode is left as is.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0_f64.clamp(self.min_zoom, self.max_zoom);
    }

    /// Zoom as a whole percentage, for status display.
    pub fn zoom_percent(&self) -> i64 {
        (self.zoom * 100.0).round() as i64
    }
}

/// An in-progress pan drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    /// Pointer position minus pan at the start of the gesture.
    grab: Vec2,
}

impl PanGesture {
    pub fn begin(viewport: &Viewport, pointer: Point) -> Self {
        Self {
            grab: pointer.to_vec2() - viewport.pan,
        }
    }

    /// Move the view so the grabbed point follows the pointer.
    pub fn update(&self, viewport: &mut Viewport, pointer: Point) {
        viewport.pan = pointer.to_vec2() - self.grab;
    }
}
