//! Snap functionality for aligning dragged elements to the grid, the canvas
//! center and other elements.

use crate::config::EditorConfig;
use kurbo::{Point, Rect, Size};

/// Tolerance for treating an edge as lying on a guide line.
const GUIDE_EPSILON: f64 = 1e-6;

/// Snap-line positions shown while dragging, in canvas units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Guides {
    /// X positions of vertical lines.
    pub vertical: Vec<f64>,
    /// Y positions of horizontal lines.
    pub horizontal: Vec<f64>,
}

impl Guides {
    pub fn is_empty(&self) -> bool {
        self.vertical.is_empty() && self.horizontal.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertical.clear();
        self.horizontal.clear();
    }
}

/// Result of a snap operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// The snapped, clamped top-left corner.
    pub point: Point,
    /// Whether an alignment snap moved the X coordinate.
    pub snapped_x: bool,
    /// Whether an alignment snap moved the Y coordinate.
    pub snapped_y: bool,
    pub guides: Guides,
}

impl SnapResult {
    /// Check if any alignment snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Keep an element of `extent` fully inside a square canvas.
///
/// Elements larger than the canvas are pinned to the origin.
pub fn clamp_to_canvas(point: Point, extent: Size, canvas_size: f64) -> Point {
    Point::new(
        point.x.min(canvas_size - extent.width).max(0.0),
        point.y.min(canvas_size - extent.height).max(0.0),
    )
}

/// Start, end and center of a span.
fn lines(start: f64, length: f64) -> [f64; 3] {
    [start, start + length, start + length / 2.0]
}

/// One axis of the alignment problem.
struct Axis<'a> {
    start: f64,
    length: f64,
    canvas_center: f64,
    /// `(start, length)` of every reference element on this axis.
    references: &'a [(f64, f64)],
}

impl Axis<'_> {
    /// Shift that puts the nearest matching edge exactly on its line, if
    /// any match lies within `threshold`.
    fn nearest_shift(&self, threshold: f64) -> Option<f64> {
        let mut best: Option<f64> = None;
        let mut consider = |shift: f64| {
            if shift.abs() <= threshold && best.is_none_or(|b| shift.abs() < b.abs()) {
                best = Some(shift);
            }
        };

        consider(self.canvas_center - (self.start + self.length / 2.0));
        let edges = lines(self.start, self.length);
        for &(other_start, other_length) in self.references {
            for line in lines(other_start, other_length) {
                for edge in edges {
                    consider(line - edge);
                }
            }
        }
        best
    }

    /// Reference lines an edge currently lies on, deduplicated, first `max`.
    fn guides(&self, max: usize) -> Vec<f64> {
        let edges = lines(self.start, self.length);
        let on_edge = |line: f64| edges.iter().any(|e| (e - line).abs() < GUIDE_EPSILON);

        let mut found: Vec<f64> = Vec::new();
        let mut push = |line: f64| {
            if found.len() < max && !found.iter().any(|g| (g - line).abs() < GUIDE_EPSILON) {
                found.push(line);
            }
        };

        if (self.start + self.length / 2.0 - self.canvas_center).abs() < GUIDE_EPSILON {
            push(self.canvas_center);
        }
        for &(other_start, other_length) in self.references {
            for line in lines(other_start, other_length) {
                if on_edge(line) {
                    push(line);
                }
            }
        }
        found
    }
}

/// Compute where a dragged element lands.
///
/// `candidate` is the proposed top-left corner, `extent` the element's size
/// (zero when intrinsic) and `others` the bounds of elements it may align
/// with. Grid snapping runs first unless `bypass_grid` is set; then each axis
/// independently snaps to its nearest alignment line within the threshold,
/// and the result is clamped to the canvas.
pub fn snap_position(
    candidate: Point,
    extent: Size,
    others: &[Rect],
    bypass_grid: bool,
    config: &EditorConfig,
) -> SnapResult {
    let mut point = if bypass_grid {
        candidate
    } else {
        snap_to_grid(candidate, config.grid_size)
    };

    let xs: Vec<(f64, f64)> = others.iter().map(|r| (r.x0, r.width())).collect();
    let ys: Vec<(f64, f64)> = others.iter().map(|r| (r.y0, r.height())).collect();
    let center = config.canvas_center();

    let x_axis = Axis {
        start: point.x,
        length: extent.width,
        canvas_center: center,
        references: &xs,
    };
    let y_axis = Axis {
        start: point.y,
        length: extent.height,
        canvas_center: center,
        references: &ys,
    };
    let shift_x = x_axis.nearest_shift(config.snap_threshold);
    let shift_y = y_axis.nearest_shift(config.snap_threshold);
    point.x += shift_x.unwrap_or(0.0);
    point.y += shift_y.unwrap_or(0.0);

    let point = clamp_to_canvas(point, extent, config.canvas_size);

    let guides = Guides {
        vertical: Axis {
            start: point.x,
            ..x_axis
        }
        .guides(config.max_guides_per_axis),
        horizontal: Axis {
            start: point.y,
            ..y_axis
        }
        .guides(config.max_guides_per_axis),
    };

    SnapResult {
        point,
        snapped_x: shift_x.is_some(),
        snapped_y: shift_y.is_some(),
        guides,
    }
}
