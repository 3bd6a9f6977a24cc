//! Annotation data model.
//!
//! This module provides the core types for image annotations:
//! - Geometry types (points, bounding boxes, polygons)
//! - Labels and the label set
//! - The authoritative [`Document`] store (single source of truth for
//!   "what annotations exist" on the loaded image)
//! - The stripped [`AnnotationRecord`] handed to persistence collaborators

use crate::constants::{style, threshold};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point in scene (image pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned bounding box in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top-left corner X coordinate
    pub x: f32,
    /// Top-left corner Y coordinate
    pub y: f32,
    /// Width of the box
    pub width: f32,
    /// Height of the box
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a bounding box from two corner points, in any drag direction.
    /// The origin snaps to whichever corner is smaller in each axis.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self {
            x: p1.x.min(p2.x),
            y: p1.y.min(p2.y),
            width: (p1.x - p2.x).abs(),
            height: (p1.y - p2.y).abs(),
        }
    }

    /// Check if a point is inside the box.
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Get the area of the box.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Whether both edges meet the minimum creation size.
    pub fn meets_min_size(&self) -> bool {
        self.width >= threshold::MIN_BOX_SIZE && self.height >= threshold::MIN_BOX_SIZE
    }
}

/// A closed polygon defined by an ordered sequence of vertices.
///
/// Committed polygons always have at least 3 vertices; shorter vertex lists
/// exist only as drafts inside the tool state machine, never in a
/// [`Document`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    /// The vertices of the polygon in click order.
    pub vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Check if the polygon is a valid closed shape (≥ 3 vertices).
    pub fn is_valid(&self) -> bool {
        self.vertices.len() >= threshold::MIN_POLYGON_VERTICES
    }

    /// Get the axis-aligned bounding box of the polygon.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if self.vertices.is_empty() {
            return None;
        }

        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for p in &self.vertices {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Check if a point is inside the polygon (ray casting).
    pub fn contains(&self, point: &Point) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }

        let mut inside = false;
        let n = self.vertices.len();

        let mut j = n - 1;
        for i in 0..n {
            let vi = &self.vertices[i];
            let vj = &self.vertices[j];

            if ((vi.y > point.y) != (vj.y > point.y))
                && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }
}

// ============================================================================
// Shape
// ============================================================================

/// The geometry of an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// An axis-aligned bounding box.
    BoundingBox(BoundingBox),
    /// A closed polygon.
    Polygon(Polygon),
}

impl Shape {
    /// Get the axis-aligned bounding box of this shape.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Shape::BoundingBox(b) => Some(*b),
            Shape::Polygon(poly) => poly.bounding_box(),
        }
    }

    /// Check if a point is inside this shape.
    pub fn contains(&self, point: &Point) -> bool {
        match self {
            Shape::BoundingBox(b) => b.contains(point),
            Shape::Polygon(poly) => poly.contains(point),
        }
    }

    /// Area of the shape's bounding box (used for hit-test ordering).
    pub fn hit_area(&self) -> f32 {
        self.bounding_box().map(|b| b.area()).unwrap_or(0.0)
    }

    /// Translate the shape by a scene-coordinate delta.
    pub fn translated(&self, dx: f32, dy: f32) -> Shape {
        match self {
            Shape::BoundingBox(b) => {
                Shape::BoundingBox(BoundingBox::new(b.x + dx, b.y + dy, b.width, b.height))
            }
            Shape::Polygon(poly) => Shape::Polygon(Polygon::new(
                poly.vertices
                    .iter()
                    .map(|p| Point::new(p.x + dx, p.y + dy))
                    .collect(),
            )),
        }
    }
}

// ============================================================================
// Labels
// ============================================================================

/// A categorical label assignable to annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Unique identifier for the label.
    pub id: u32,
    /// Display name of the label.
    pub name: String,
    /// Color for rendering (RGBA, 0-1).
    pub color: [f32; 4],
    /// Optional numeric shortcut digit (1-9) assigned by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<u8>,
}

impl Label {
    /// Create a label with a generated color based on its id.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        let hue = (id as f32 * style::GOLDEN_ANGLE) % 360.0;
        let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
        Self {
            id,
            name: name.into(),
            color: [r, g, b, 1.0],
            shortcut: None,
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Create a label from a backend-style `#RRGGBB` hex color.
    pub fn with_hex_color(self, hex: &str) -> Self {
        match parse_hex_color(hex) {
            Some(color) => self.with_color(color),
            None => {
                log::warn!("🎨 Ignoring malformed hex color '{hex}'");
                self
            }
        }
    }
}

/// The ordered set of labels available for the current project.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    /// Get a label by ID.
    pub fn get(&self, id: u32) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == id)
    }

    /// Resolve the render color for a label id, falling back to gray for
    /// orphaned ids (e.g. after external label deletion).
    pub fn color_of(&self, id: u32) -> [f32; 4] {
        self.get(id).map(|l| l.color).unwrap_or(style::ORPHAN_GRAY)
    }

    /// Iterate labels in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Convert HSV to RGB (h in degrees, s and v in 0-1).
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Parse a backend-style `#RRGGBB` color string.
pub fn parse_hex_color(hex: &str) -> Option<[f32; 4]> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        1.0,
    ])
}

/// Format an RGBA color as a `#RRGGBB` string (alpha dropped).
pub fn format_hex_color(color: [f32; 4]) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02X}{:02X}{:02X}",
        channel(color[0]),
        channel(color[1]),
        channel(color[2])
    )
}

// ============================================================================
// Annotation
// ============================================================================

/// A single annotation on the loaded image.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Locally generated id, unique within the document and stable for this
    /// editing session. Not meaningful to the backend.
    pub id: u64,
    /// Persisted-storage id; `None` until the annotation has been saved.
    pub db_id: Option<i64>,
    /// Foreign key into the label set. Orphans are tolerated and rendered
    /// with the fallback color.
    pub label_id: u32,
    /// Denormalized display hint; may be stale. Rendering re-resolves from
    /// the current label set.
    pub label_name: Option<String>,
    /// Denormalized display hint; may be stale.
    pub label_color: Option<[f32; 4]>,
    /// The geometry of the annotation.
    pub shape: Shape,
}

impl Annotation {
    pub fn new(id: u64, label_id: u32, shape: Shape) -> Self {
        Self {
            id,
            db_id: None,
            label_id,
            label_name: None,
            label_color: None,
            shape,
        }
    }

    /// Attach the denormalized display hints from a label set.
    pub fn with_hints(mut self, labels: &LabelSet) -> Self {
        if let Some(label) = labels.get(self.label_id) {
            self.label_name = Some(label.name.clone());
            self.label_color = Some(label.color);
        }
        self
    }

    /// Convert to the stripped persistence record.
    pub fn to_record(&self) -> AnnotationRecord {
        match &self.shape {
            Shape::BoundingBox(b) => AnnotationRecord::BoundingBox {
                db_id: self.db_id,
                label_id: self.label_id,
                x: b.x,
                y: b.y,
                width: b.width,
                height: b.height,
            },
            Shape::Polygon(poly) => AnnotationRecord::Polygon {
                db_id: self.db_id,
                label_id: self.label_id,
                points: poly.vertices.iter().map(|p| [p.x, p.y]).collect(),
            },
        }
    }
}

// ============================================================================
// Persistence Records
// ============================================================================

/// The wire-facing snapshot of an annotation, stripped of purely-local
/// fields. Field layout mirrors the backend's `bbox_annotations` and
/// `polygon_annotations` tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotationRecord {
    /// A bounding box row.
    BoundingBox {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        db_id: Option<i64>,
        label_id: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// A polygon row; `points` is the ordered vertex list.
    Polygon {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        db_id: Option<i64>,
        label_id: u32,
        points: Vec<[f32; 2]>,
    },
}

impl AnnotationRecord {
    /// Validate the record and extract its shape.
    pub fn shape(&self) -> Result<Shape, EngineError> {
        match self {
            AnnotationRecord::BoundingBox {
                x,
                y,
                width,
                height,
                ..
            } => {
                if *width <= 0.0 || *height <= 0.0 {
                    return Err(EngineError::invalid_geometry(format!(
                        "bounding box with non-positive size {width} x {height}"
                    )));
                }
                Ok(Shape::BoundingBox(BoundingBox::new(*x, *y, *width, *height)))
            }
            AnnotationRecord::Polygon { points, .. } => {
                if points.len() < threshold::MIN_POLYGON_VERTICES {
                    return Err(EngineError::invalid_geometry(format!(
                        "polygon with {} vertices",
                        points.len()
                    )));
                }
                Ok(Shape::Polygon(Polygon::new(
                    points.iter().map(|p| Point::new(p[0], p[1])).collect(),
                )))
            }
        }
    }

    pub fn db_id(&self) -> Option<i64> {
        match self {
            AnnotationRecord::BoundingBox { db_id, .. } => *db_id,
            AnnotationRecord::Polygon { db_id, .. } => *db_id,
        }
    }

    pub fn label_id(&self) -> u32 {
        match self {
            AnnotationRecord::BoundingBox { label_id, .. } => *label_id,
            AnnotationRecord::Polygon { label_id, .. } => *label_id,
        }
    }
}

// ============================================================================
// Document
// ============================================================================

/// The authoritative annotation store for the loaded image.
///
/// Rendering code never reads or writes this directly; all mutation flows
/// through the command layer so the Scene stays in lockstep.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// All annotations, keyed by local id.
    annotations: HashMap<u64, Annotation>,
    /// Counter for generating unique local ids.
    next_id: u64,
    /// Currently selected annotation id.
    selected_id: Option<u64>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            annotations: HashMap::new(),
            next_id: 1,
            selected_id: None,
        }
    }

    /// Allocate a fresh local id.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert an annotation under its own id. Used by command execution and
    /// undo-of-remove; the id must have come from [`Document::allocate_id`].
    pub fn insert(&mut self, annotation: Annotation) {
        debug_assert!(
            !self.annotations.contains_key(&annotation.id),
            "duplicate annotation id {}",
            annotation.id
        );
        self.next_id = self.next_id.max(annotation.id + 1);
        self.annotations.insert(annotation.id, annotation);
    }

    /// Remove an annotation by id, returning it for undo capture.
    pub fn remove(&mut self, id: u64) -> Option<Annotation> {
        if self.selected_id == Some(id) {
            self.selected_id = None;
        }
        self.annotations.remove(&id)
    }

    pub fn get(&self, id: u64) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    /// Replace the shape of an annotation.
    pub fn update_shape(&mut self, id: u64, shape: Shape) {
        if let Some(ann) = self.annotations.get_mut(&id) {
            ann.shape = shape;
        } else {
            log::warn!("⚠️ update_shape: no annotation {id}");
        }
    }

    /// Reassign the label of an annotation. The stale display hints are
    /// cleared; rendering re-resolves from the label set.
    pub fn set_label(&mut self, id: u64, label_id: u32) {
        if let Some(ann) = self.annotations.get_mut(&id) {
            ann.label_id = label_id;
            ann.label_name = None;
            ann.label_color = None;
        } else {
            log::warn!("⚠️ set_label: no annotation {id}");
        }
    }

    /// Iterate all annotations (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.values()
    }

    /// All local ids, sorted.
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.annotations.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Remove everything, including the selection.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.selected_id = None;
    }

    /// Set the selection. Returns true if the selection changed.
    pub fn select(&mut self, id: Option<u64>) -> bool {
        if let Some(wanted) = id
            && !self.annotations.contains_key(&wanted)
        {
            log::warn!("⚠️ select: no annotation {wanted}");
            return false;
        }
        if self.selected_id != id {
            self.selected_id = id;
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<u64> {
        self.selected_id
    }

    /// Find the annotation under a scene point. When several shapes overlap,
    /// the smallest one wins so nested boxes stay selectable.
    pub fn hit_test(&self, point: &Point) -> Option<u64> {
        self.annotations
            .values()
            .filter(|ann| ann.shape.contains(point))
            .min_by(|a, b| {
                a.shape
                    .hit_area()
                    .partial_cmp(&b.shape.hit_area())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|ann| ann.id)
    }

    /// Snapshot of all annotations as stripped records, in id order.
    pub fn records(&self) -> Vec<AnnotationRecord> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.annotations.get(&id))
            .map(Annotation::to_record)
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 0.001);
    }

    #[test]
    fn bounding_box_from_corners_any_direction() {
        let bbox = BoundingBox::from_corners(Point::new(10.0, 20.0), Point::new(50.0, 80.0));
        assert_eq!(bbox.x, 10.0);
        assert_eq!(bbox.y, 20.0);
        assert_eq!(bbox.width, 40.0);
        assert_eq!(bbox.height, 60.0);

        // Dragging up-left must anchor at the smaller corner
        let bbox2 = BoundingBox::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(bbox, bbox2);
    }

    #[test]
    fn bounding_box_min_size() {
        assert!(BoundingBox::new(0.0, 0.0, 5.0, 5.0).meets_min_size());
        assert!(!BoundingBox::new(0.0, 0.0, 4.9, 100.0).meets_min_size());
        assert!(!BoundingBox::new(0.0, 0.0, 100.0, 4.9).meets_min_size());
    }

    #[test]
    fn polygon_contains() {
        let poly = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ]);
        assert!(poly.contains(&Point::new(50.0, 50.0)));
        assert!(!poly.contains(&Point::new(150.0, 50.0)));
    }

    #[test]
    fn polygon_validity() {
        assert!(!Polygon::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).is_valid());
        assert!(
            Polygon::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
            ])
            .is_valid()
        );
    }

    #[test]
    fn shape_translated() {
        let shape = Shape::BoundingBox(BoundingBox::new(10.0, 10.0, 20.0, 20.0));
        let moved = shape.translated(5.0, -5.0);
        assert_eq!(
            moved,
            Shape::BoundingBox(BoundingBox::new(15.0, 5.0, 20.0, 20.0))
        );
    }

    #[test]
    fn hex_color_roundtrip() {
        let color = parse_hex_color("#3B82F6").expect("valid hex");
        let hex = format_hex_color(color);
        assert_eq!(hex, "#3B82F6");

        assert!(parse_hex_color("3B82F6").is_none());
        assert!(parse_hex_color("#3B82F").is_none());
        assert!(parse_hex_color("#GGGGGG").is_none());
    }

    #[test]
    fn label_set_fallback_color() {
        let labels = LabelSet::new(vec![Label::new(1, "Car").with_color([1.0, 0.0, 0.0, 1.0])]);
        assert_eq!(labels.color_of(1), [1.0, 0.0, 0.0, 1.0]);
        // Orphaned label id falls back to gray instead of being rejected
        assert_eq!(labels.color_of(99), style::ORPHAN_GRAY);
    }

    #[test]
    fn document_insert_remove() {
        let mut doc = Document::new();
        let id1 = doc.allocate_id();
        doc.insert(Annotation::new(
            id1,
            1,
            Shape::BoundingBox(BoundingBox::new(10.0, 10.0, 50.0, 50.0)),
        ));
        let id2 = doc.allocate_id();
        doc.insert(Annotation::new(
            id2,
            2,
            Shape::BoundingBox(BoundingBox::new(100.0, 100.0, 20.0, 20.0)),
        ));
        assert_ne!(id1, id2);
        assert_eq!(doc.len(), 2);

        let removed = doc.remove(id1).expect("present");
        assert_eq!(removed.id, id1);
        assert_eq!(doc.len(), 1);

        // A restored annotation keeps its id and never collides with new ones
        doc.insert(removed);
        let id3 = doc.allocate_id();
        assert!(id3 > id2);
    }

    #[test]
    fn document_selection_cleared_on_remove() {
        let mut doc = Document::new();
        let id = doc.allocate_id();
        doc.insert(Annotation::new(
            id,
            0,
            Shape::BoundingBox(BoundingBox::new(0.0, 0.0, 10.0, 10.0)),
        ));
        assert!(doc.select(Some(id)));
        doc.remove(id);
        assert_eq!(doc.selected(), None);
    }

    #[test]
    fn hit_test_prefers_smallest() {
        let mut doc = Document::new();
        let big = doc.allocate_id();
        doc.insert(Annotation::new(
            big,
            0,
            Shape::BoundingBox(BoundingBox::new(0.0, 0.0, 200.0, 200.0)),
        ));
        let small = doc.allocate_id();
        doc.insert(Annotation::new(
            small,
            0,
            Shape::BoundingBox(BoundingBox::new(50.0, 50.0, 20.0, 20.0)),
        ));

        assert_eq!(doc.hit_test(&Point::new(60.0, 60.0)), Some(small));
        assert_eq!(doc.hit_test(&Point::new(150.0, 150.0)), Some(big));
        assert_eq!(doc.hit_test(&Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn record_validation() {
        let bad_box = AnnotationRecord::BoundingBox {
            db_id: None,
            label_id: 1,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 10.0,
        };
        assert!(bad_box.shape().is_err());

        let bad_poly = AnnotationRecord::Polygon {
            db_id: None,
            label_id: 1,
            points: vec![[0.0, 0.0], [1.0, 1.0]],
        };
        assert!(bad_poly.shape().is_err());

        let good = AnnotationRecord::Polygon {
            db_id: Some(7),
            label_id: 1,
            points: vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]],
        };
        let shape = good.shape().expect("valid polygon");
        assert!(matches!(shape, Shape::Polygon(ref p) if p.vertices.len() == 3));
    }

    #[test]
    fn record_strips_local_fields() {
        let mut doc = Document::new();
        let id = doc.allocate_id();
        let ann = Annotation {
            id,
            db_id: Some(42),
            label_id: 3,
            label_name: Some("stale".to_string()),
            label_color: Some([0.1, 0.2, 0.3, 1.0]),
            shape: Shape::BoundingBox(BoundingBox::new(1.0, 2.0, 3.0, 4.0)),
        };
        doc.insert(ann);

        let records = doc.records();
        assert_eq!(records.len(), 1);
        let json = serde_json::to_string(&records[0]).expect("serializable");
        // Only db_id, label_id and geometry go to the backend
        assert!(json.contains("\"db_id\":42"));
        assert!(json.contains("\"label_id\":3"));
        assert!(!json.contains("stale"));
        assert!(!json.contains("label_color"));
    }
}
