//! Drawing tools and the in-progress draft buffer.
//!
//! A draft is a not-yet-committed shape that exists only in the scene. It
//! becomes an annotation (through a command) only when the finishing gesture
//! passes the shape's validity threshold; otherwise it is discarded with no
//! history entry.

use crate::annotation::{BoundingBox, Point, Polygon, Shape};
use crate::constants::threshold;

/// The active annotation tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Selection and native shape manipulation.
    #[default]
    Select,
    /// Drawing bounding boxes by drag-release.
    BoundingBox,
    /// Drawing polygons vertex by vertex.
    Polygon,
}

/// Vertex buffer for the current drawing gesture.
#[derive(Debug, Clone, Default)]
pub struct DraftState {
    points: Vec<Point>,
    active: bool,
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn first_vertex(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Begin a new gesture at a point. Any previous buffer is discarded.
    pub fn start(&mut self, point: Point) {
        self.points.clear();
        self.points.push(point);
        self.active = true;
    }

    /// Append a vertex (polygon clicks).
    pub fn push_vertex(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Move the trailing corner (bounding-box drag). A second point is
    /// created on the first move.
    pub fn drag_to(&mut self, point: Point) {
        if !self.active {
            return;
        }
        if self.points.len() < 2 {
            self.points.push(point);
        } else if let Some(last) = self.points.last_mut() {
            *last = point;
        }
    }

    /// Discard the buffer. Returns true if a gesture was in progress.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.active;
        self.points.clear();
        self.active = false;
        was_active
    }

    /// Finalize a bounding-box gesture. Returns `None` (and discards the
    /// draft) when either edge is under the minimum size.
    pub fn finish_box(&mut self) -> Option<BoundingBox> {
        if !self.active {
            return None;
        }
        self.active = false;

        let bbox = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() >= 2 => {
                BoundingBox::from_corners(*first, *last)
            }
            _ => {
                self.points.clear();
                return None;
            }
        };
        self.points.clear();

        if bbox.meets_min_size() {
            Some(bbox)
        } else {
            log::debug!(
                "✂️ Discarded sub-threshold box {:.1} x {:.1}",
                bbox.width,
                bbox.height
            );
            None
        }
    }

    /// Finalize a polygon gesture. With fewer than 3 vertices the close
    /// attempt is a no-op and the shape stays open.
    pub fn finish_polygon(&mut self) -> Option<Polygon> {
        if !self.active {
            return None;
        }
        if self.points.len() < threshold::MIN_POLYGON_VERTICES {
            log::debug!(
                "📐 Polygon needs at least {} vertices, has {}",
                threshold::MIN_POLYGON_VERTICES,
                self.points.len()
            );
            return None;
        }

        self.active = false;
        Some(Polygon::new(std::mem::take(&mut self.points)))
    }

    /// Preview shape for rendering the in-progress gesture.
    pub fn preview(&self, tool: Tool) -> Option<Shape> {
        if !self.active {
            return None;
        }
        match tool {
            Tool::Select => None,
            Tool::BoundingBox => {
                if self.points.len() >= 2 {
                    Some(Shape::BoundingBox(BoundingBox::from_corners(
                        self.points[0],
                        *self.points.last()?,
                    )))
                } else {
                    None
                }
            }
            Tool::Polygon => Some(Shape::Polygon(Polygon::new(self.points.clone()))),
        }
    }
}
