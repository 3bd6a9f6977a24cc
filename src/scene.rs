//! Renderer-side scene graph kept in lockstep with the [`Document`].
//!
//! The scene holds one tagged drawable node per annotation plus at most one
//! ephemeral draft shape. It never holds authoritative state: on any
//! disagreement the document wins and the node is rebuilt.

use crate::annotation::{Annotation, Document, LabelSet, Shape};
use crate::constants::style;
use std::collections::HashMap;

/// Resolved render style for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    /// Fill color (label color at reduced opacity).
    pub fill: [f32; 4],
    /// Solid stroke color.
    pub stroke: [f32; 4],
    /// Stroke width in scene pixels.
    pub stroke_width: f32,
}

impl NodeStyle {
    fn for_label(color: [f32; 4], fill_alpha: f32) -> Self {
        Self {
            fill: [color[0], color[1], color[2], fill_alpha],
            stroke: [color[0], color[1], color[2], 1.0],
            stroke_width: style::STROKE_WIDTH,
        }
    }
}

/// One drawable primitive, tagged with enough metadata to map scene-side
/// events back to the document.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// The annotation this node draws.
    pub annotation_id: u64,
    /// Label tag at the time the node was (re)built.
    pub label_id: u32,
    /// Geometry copy used for drawing.
    pub shape: Shape,
    /// Resolved style.
    pub style: NodeStyle,
}

/// The live drawable graph for the currently loaded image.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: HashMap<u64, SceneNode>,
    draft: Option<(Shape, NodeStyle)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize a node for an annotation if none exists yet.
    pub fn add(&mut self, annotation: &Annotation, labels: &LabelSet) {
        if self.nodes.contains_key(&annotation.id) {
            log::warn!("⚠️ Scene already has node {}", annotation.id);
            return;
        }
        self.nodes
            .insert(annotation.id, Self::build_node(annotation, labels));
    }

    /// Remove the node for an annotation, if present.
    pub fn remove(&mut self, id: u64) {
        if self.nodes.remove(&id).is_none() {
            log::warn!("⚠️ Scene has no node {id} to remove");
        }
    }

    /// Update the drawn geometry of a node.
    pub fn update_shape(&mut self, id: u64, shape: &Shape) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.shape = shape.clone();
        } else {
            log::warn!("⚠️ Scene has no node {id} to reshape");
        }
    }

    /// Retag and restyle a node after a label change.
    pub fn restyle(&mut self, id: u64, label_id: u32, labels: &LabelSet) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.label_id = label_id;
            node.style = NodeStyle::for_label(labels.color_of(label_id), style::FILL_ALPHA);
        } else {
            log::warn!("⚠️ Scene has no node {id} to restyle");
        }
    }

    /// Replace the ephemeral draft shape (or clear it with `None`).
    pub fn set_draft(&mut self, shape: Option<Shape>, color: [f32; 4]) {
        self.draft = shape.map(|s| (s, NodeStyle::for_label(color, style::DRAFT_ALPHA)));
    }

    pub fn draft(&self) -> Option<&(Shape, NodeStyle)> {
        self.draft.as_ref()
    }

    /// Drop every node and the draft.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.draft = None;
    }

    pub fn node(&self, id: u64) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Iterate nodes (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All tagged ids, sorted. Test and diagnostics helper for checking the
    /// document ↔ scene bijection.
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Defensive bijection check. Rebuilds nodes missing for document
    /// entries and drops nodes with no document counterpart, preferring
    /// document truth. Returns the number of repairs performed.
    pub fn repair(&mut self, doc: &Document, labels: &LabelSet) -> usize {
        let mut repairs = 0;

        let stale: Vec<u64> = self
            .nodes
            .keys()
            .copied()
            .filter(|id| doc.get(*id).is_none())
            .collect();
        for id in stale {
            self.nodes.remove(&id);
            repairs += 1;
            log::warn!("🔧 Dropped orphan scene node {id}");
        }

        for ann in doc.iter() {
            let rebuilt = Self::build_node(ann, labels);
            match self.nodes.get(&ann.id) {
                Some(node) if *node == rebuilt => {}
                existing => {
                    if existing.is_some() {
                        log::warn!("🔧 Rebuilt diverged scene node {}", ann.id);
                    } else {
                        log::warn!("🔧 Rebuilt missing scene node {}", ann.id);
                    }
                    self.nodes.insert(ann.id, rebuilt);
                    repairs += 1;
                }
            }
        }

        repairs
    }

    fn build_node(annotation: &Annotation, labels: &LabelSet) -> SceneNode {
        SceneNode {
            annotation_id: annotation.id,
            label_id: annotation.label_id,
            shape: annotation.shape.clone(),
            style: NodeStyle::for_label(labels.color_of(annotation.label_id), style::FILL_ALPHA),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{BoundingBox, Label, Point, Polygon};

    fn labels() -> LabelSet {
        LabelSet::new(vec![
            Label::new(1, "Car").with_color([1.0, 0.0, 0.0, 1.0]),
            Label::new(2, "Person").with_color([0.0, 1.0, 0.0, 1.0]),
        ])
    }

    fn boxed(doc: &mut Document, label_id: u32) -> Annotation {
        let id = doc.allocate_id();
        let ann = Annotation::new(
            id,
            label_id,
            Shape::BoundingBox(BoundingBox::new(10.0, 10.0, 50.0, 50.0)),
        );
        doc.insert(ann.clone());
        ann
    }

    #[test]
    fn add_tags_and_styles() {
        let labels = labels();
        let mut doc = Document::new();
        let mut scene = Scene::new();

        let ann = boxed(&mut doc, 1);
        scene.add(&ann, &labels);

        let node = scene.node(ann.id).expect("node exists");
        assert_eq!(node.annotation_id, ann.id);
        assert_eq!(node.label_id, 1);
        assert_eq!(node.style.stroke, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(node.style.fill[3], style::FILL_ALPHA);
    }

    #[test]
    fn orphan_label_gets_fallback_gray() {
        let labels = labels();
        let mut doc = Document::new();
        let mut scene = Scene::new();

        let ann = boxed(&mut doc, 99);
        scene.add(&ann, &labels);
        let node = scene.node(ann.id).expect("node exists");
        assert_eq!(&node.style.stroke[..3], &style::ORPHAN_GRAY[..3]);
    }

    #[test]
    fn restyle_on_label_change() {
        let labels = labels();
        let mut doc = Document::new();
        let mut scene = Scene::new();

        let ann = boxed(&mut doc, 1);
        scene.add(&ann, &labels);
        scene.restyle(ann.id, 2, &labels);

        let node = scene.node(ann.id).expect("node exists");
        assert_eq!(node.label_id, 2);
        assert_eq!(node.style.stroke, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn repair_rebuilds_from_document_truth() {
        let labels = labels();
        let mut doc = Document::new();
        let mut scene = Scene::new();

        // Missing node for a document entry
        let ann = boxed(&mut doc, 1);
        // Orphan node with no document counterpart
        let ghost = Annotation::new(
            777,
            1,
            Shape::Polygon(Polygon::new(vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
            ])),
        );
        scene.add(&ghost, &labels);

        let repairs = scene.repair(&doc, &labels);
        assert_eq!(repairs, 2);
        assert_eq!(scene.ids(), doc.ids());
        assert!(scene.node(ann.id).is_some());
        assert!(scene.node(777).is_none());

        // A consistent scene needs no repairs
        assert_eq!(scene.repair(&doc, &labels), 0);
    }

    #[test]
    fn draft_is_scene_only() {
        let mut scene = Scene::new();
        scene.set_draft(
            Some(Shape::BoundingBox(BoundingBox::new(0.0, 0.0, 10.0, 10.0))),
            [1.0, 0.0, 0.0, 1.0],
        );
        assert!(scene.draft().is_some());
        assert_eq!(scene.len(), 0);

        let (_, draft_style) = scene.draft().expect("draft set");
        assert_eq!(draft_style.fill[3], style::DRAFT_ALPHA);

        scene.set_draft(None, [0.0; 4]);
        assert!(scene.draft().is_none());
    }
}
