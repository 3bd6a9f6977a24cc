//! The annotation canvas engine.
//!
//! [`CanvasEngine`] owns the document, scene, history, view transform, and
//! tool state for one loaded image, and exposes the operation surface the
//! host UI drives. The engine has no ambient event subscriptions: the host
//! owns input capture and calls these methods directly, which keeps the core
//! testable without any windowing stack.
//!
//! All pointer positions entering the engine are viewport pixels; the view
//! transform maps them into scene coordinates where all geometry lives.

use crate::annotation::{
    Annotation, AnnotationRecord, Document, LabelSet, Point, Shape,
};
use crate::constants::threshold;
use crate::history::{Command, History};
use crate::scene::Scene;
use crate::tools::{DraftState, Tool};
use crate::view::ViewTransform;

/// Pointer button identity for [`CanvasEngine::pointer_down`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// The primary (usually left) button; draws and selects.
    Primary,
    /// Any non-primary button; starts a pan regardless of the active tool.
    Secondary,
}

/// Callback invoked after every settled annotation mutation.
pub type AnnotationsChanged = Box<dyn FnMut(&[AnnotationRecord])>;
/// Callback invoked whenever the selection changes.
pub type SelectionChanged = Box<dyn FnMut(Option<u64>)>;

/// In-progress select-tool drag of an existing shape. The scene moves live;
/// the document is only touched by the Modify command built on pointer-up.
#[derive(Debug, Clone)]
struct ShapeDrag {
    annotation_id: u64,
    start_shape: Shape,
    grab: Point,
    delta: (f32, f32),
    moved: bool,
}

/// The core engine: one instance per hosting view, rebuilt per image.
#[derive(Default)]
pub struct CanvasEngine {
    doc: Document,
    scene: Scene,
    history: History,
    view: Option<ViewTransform>,
    /// Image dimensions of the current document, retained for viewport
    /// refits and for setups deferred until the host has laid out.
    image_size: Option<(f32, f32)>,
    labels: LabelSet,
    active_label: Option<u32>,
    tool: Tool,
    draft: DraftState,
    /// Pan latched by `start_panning` (modifier key held by the host).
    pan_latched: bool,
    /// Last pointer position while a pan drag is active.
    pan_anchor: Option<Point>,
    drag: Option<ShapeDrag>,
    /// Content of the last bulk load, for the idempotent-reload check.
    loaded_snapshot: Option<Vec<AnnotationRecord>>,
    on_annotations_changed: Option<AnnotationsChanged>,
    on_selection_changed: Option<SelectionChanged>,
}

impl CanvasEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Document lifecycle
    // ========================================================================

    /// Tear down the current scene and rebuild for a new image, decoding
    /// `image_bytes` to obtain its dimensions. On decode failure the engine
    /// stays idle with an empty scene; subsequent operations that need a
    /// scene are no-ops.
    pub fn init_document(&mut self, viewport: (f32, f32), image_bytes: &[u8]) {
        self.teardown();
        match image::load_from_memory(image_bytes) {
            Ok(img) => {
                let (w, h) = (img.width() as f32, img.height() as f32);
                log::info!("🖼️ Image decoded: {w} x {h}");
                self.setup_view(viewport, (w, h));
            }
            Err(e) => {
                log::error!("🖼️ Image decode failed, engine idle: {e}");
            }
        }
    }

    /// Rebuild for a new image whose dimensions are already known (hosts
    /// that decode elsewhere).
    pub fn init_document_with_size(&mut self, viewport: (f32, f32), width: f32, height: f32) {
        self.teardown();
        self.setup_view(viewport, (width, height));
    }

    /// Supply a (new) viewport size. Completes a deferred setup once the
    /// host has laid out, or refits an existing document to the resized
    /// viewport (annotations are untouched; only the transform changes).
    pub fn set_viewport(&mut self, viewport: (f32, f32)) {
        if let Some(image) = self.image_size {
            self.setup_view(viewport, image);
        }
    }

    /// Whether a document is loaded and the scene exists.
    pub fn has_scene(&self) -> bool {
        self.view.is_some()
    }

    fn setup_view(&mut self, viewport: (f32, f32), image: (f32, f32)) {
        self.image_size = Some(image);
        match ViewTransform::fit(viewport, image) {
            Some(view) => {
                self.view = Some(view);
            }
            None => {
                // Not laid out yet; wait for set_viewport.
                log::debug!("🖼️ Viewport {viewport:?} unusable, deferring scene setup");
                self.view = None;
            }
        }
    }

    fn teardown(&mut self) {
        let had_selection = self.doc.selected().is_some();
        self.doc.clear();
        self.scene.clear();
        self.history.clear();
        self.draft.cancel();
        self.view = None;
        self.image_size = None;
        self.pan_anchor = None;
        self.drag = None;
        self.loaded_snapshot = None;
        if had_selection {
            self.emit_selection_changed();
        }
    }

    // ========================================================================
    // Annotations in / out
    // ========================================================================

    /// Atomically replace all annotations and the label set, clearing
    /// history. Reloading identical content is skipped entirely (no scene
    /// rebuild, no history reset), so parent re-renders cause no churn.
    /// Returns true if a replace happened.
    pub fn load_annotations(&mut self, records: &[AnnotationRecord], labels: &LabelSet) -> bool {
        if !self.has_scene() {
            log::debug!("📥 load_annotations ignored: no scene");
            return false;
        }
        if self.loaded_snapshot.as_deref() == Some(records) && self.labels == *labels {
            log::debug!("📥 load_annotations skipped: content unchanged");
            return false;
        }

        let had_selection = self.doc.selected().is_some();
        self.doc.clear();
        self.scene.clear();
        self.history.clear();
        self.draft.cancel();
        self.drag = None;
        self.labels = labels.clone();

        let mut loaded = 0usize;
        for record in records {
            match record.shape() {
                Ok(shape) => {
                    let id = self.doc.allocate_id();
                    let ann = Annotation {
                        id,
                        db_id: record.db_id(),
                        label_id: record.label_id(),
                        label_name: None,
                        label_color: None,
                        shape,
                    }
                    .with_hints(labels);
                    self.scene.add(&ann, labels);
                    self.doc.insert(ann);
                    loaded += 1;
                }
                Err(e) => {
                    log::warn!("📥 Skipping malformed annotation record: {e}");
                }
            }
        }
        self.loaded_snapshot = Some(records.to_vec());
        log::info!("📥 Loaded {loaded} annotations ({} labels)", labels.len());
        if had_selection {
            // The replaced selection is gone; the host must hear about it.
            self.emit_selection_changed();
        }
        true
    }

    /// Snapshot of the current annotations as stripped records, in id
    /// order. Purely-local fields never reach the persistence layer.
    pub fn annotations(&self) -> Vec<AnnotationRecord> {
        self.doc.records()
    }

    pub fn annotation_count(&self) -> usize {
        self.doc.len()
    }

    // ========================================================================
    // Tool and label state
    // ========================================================================

    /// Switch the active tool. Any unfinished draft is cancelled with no
    /// persisted effect and no history entry.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.draft.cancel() {
            self.scene.set_draft(None, [0.0; 4]);
            log::debug!("❌ Draft cancelled by tool switch");
        }
        self.drag = None;
        self.tool = tool;
        log::debug!("🖌️ Tool: {tool:?}");
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Set the label assigned to newly drawn annotations. Drawing gestures
    /// are ignored while no label is active.
    pub fn set_active_label(&mut self, label_id: u32) {
        self.active_label = Some(label_id);
        log::debug!("🏷️ Active label: {label_id}");
    }

    pub fn active_label(&self) -> Option<u32> {
        self.active_label
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    // ========================================================================
    // Selection-based operations
    // ========================================================================

    pub fn selected_annotation(&self) -> Option<u64> {
        self.doc.selected()
    }

    /// Delete the selected annotation. Returns false when nothing is
    /// selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.doc.selected() else {
            return false;
        };
        let Some(annotation) = self.doc.get(id).cloned() else {
            return false;
        };

        self.history.execute(
            Command::Remove { annotation },
            &mut self.doc,
            &mut self.scene,
            &self.labels,
        );
        self.emit_annotations_changed();
        self.emit_selection_changed();
        true
    }

    /// Reassign the selected annotation's label as one undoable step.
    /// A redundant change (new equals current) produces no history entry.
    pub fn change_selected_label(&mut self, label_id: u32) -> bool {
        let Some(id) = self.doc.selected() else {
            return false;
        };
        let Some(old_label_id) = self.doc.get(id).map(|a| a.label_id) else {
            return false;
        };
        if old_label_id == label_id {
            log::debug!("🏷️ Label unchanged, no command");
            return false;
        }

        self.history.execute(
            Command::ChangeLabel {
                annotation_id: id,
                old_label_id,
                new_label_id: label_id,
            },
            &mut self.doc,
            &mut self.scene,
            &self.labels,
        );
        self.emit_annotations_changed();
        true
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn undo(&mut self) -> bool {
        let before = self.doc.selected();
        if !self.history.undo(&mut self.doc, &mut self.scene, &self.labels) {
            return false;
        }
        self.after_history_step(before);
        true
    }

    pub fn redo(&mut self) -> bool {
        let before = self.doc.selected();
        if !self.history.redo(&mut self.doc, &mut self.scene, &self.labels) {
            return false;
        }
        self.after_history_step(before);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Description of the step `undo` would revert, for menu labels.
    pub fn undo_description(&self) -> Option<String> {
        self.history.undo_description()
    }

    /// Description of the step `redo` would re-apply.
    pub fn redo_description(&self) -> Option<String> {
        self.history.redo_description()
    }

    fn after_history_step(&mut self, selection_before: Option<u64>) {
        // Bijection check: prefer document truth if anything diverged.
        let repairs = self.scene.repair(&self.doc, &self.labels);
        if repairs > 0 {
            log::warn!("🔧 Scene repaired after history step ({repairs} fixes)");
        }
        self.emit_annotations_changed();
        if self.doc.selected() != selection_before {
            self.emit_selection_changed();
        }
    }

    // ========================================================================
    // View operations
    // ========================================================================

    /// Current zoom level, if a document is loaded.
    pub fn scale(&self) -> Option<f32> {
        self.view.as_ref().map(ViewTransform::scale)
    }

    pub fn view(&self) -> Option<&ViewTransform> {
        self.view.as_ref()
    }

    /// Zoom in one step, anchored at the viewport center.
    pub fn zoom_in(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.zoom_in();
        }
    }

    /// Zoom out one step, anchored at the viewport center.
    pub fn zoom_out(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.zoom_out();
        }
    }

    /// Restore the fit-to-viewport scale and recenter.
    pub fn reset_zoom(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.reset();
        }
    }

    /// Wheel zoom anchored at the cursor (viewport pixels).
    pub fn zoom_wheel(&mut self, cursor: Point, steps: i32) {
        if let Some(view) = self.view.as_mut() {
            view.zoom_wheel(cursor, steps);
        }
    }

    /// Latch pan mode (host holds the pan modifier key). While latched,
    /// pointer gestures pan instead of drawing or selecting.
    pub fn start_panning(&mut self) {
        self.pan_latched = true;
        log::debug!("🖐️ Panning latched");
    }

    /// Release latched pan mode.
    pub fn stop_panning(&mut self) {
        self.pan_latched = false;
        self.pan_anchor = None;
        log::debug!("🖐️ Panning released");
    }

    pub fn is_panning(&self) -> bool {
        self.pan_latched || self.pan_anchor.is_some()
    }

    // ========================================================================
    // Pointer gestures
    // ========================================================================

    /// Handle a pointer press at a viewport position.
    pub fn pointer_down(&mut self, pos: Point, button: PointerButton) {
        if !self.has_scene() {
            return;
        }

        // Pan paths never reach the tools, even mid-draft.
        if button == PointerButton::Secondary || self.pan_latched {
            self.pan_anchor = Some(pos);
            return;
        }

        let Some(view) = self.view.as_ref() else {
            return;
        };
        let scene_pos = view.screen_to_scene(pos);
        let scale = view.scale();

        match self.tool {
            Tool::Select => self.select_down(scene_pos),
            Tool::BoundingBox => {
                if !self.require_label() {
                    return;
                }
                self.draft.start(scene_pos);
                self.sync_draft_preview();
                log::debug!("✏️ Box started at ({:.1}, {:.1})", scene_pos.x, scene_pos.y);
            }
            Tool::Polygon => {
                if !self.require_label() {
                    return;
                }
                self.polygon_down(scene_pos, scale);
            }
        }
    }

    /// Handle pointer movement at a viewport position.
    pub fn pointer_move(&mut self, pos: Point) {
        // Active pan drag consumes all movement.
        if let Some(prev) = self.pan_anchor {
            let (dx, dy) = (pos.x - prev.x, pos.y - prev.y);
            if dx.abs() > threshold::DRAG_MOVEMENT || dy.abs() > threshold::DRAG_MOVEMENT {
                if let Some(view) = self.view.as_mut() {
                    view.pan_by(dx, dy);
                }
                self.pan_anchor = Some(pos);
            }
            return;
        }

        let Some(view) = self.view.as_ref() else {
            return;
        };
        let scene_pos = view.screen_to_scene(pos);
        let scale = view.scale();

        match self.tool {
            Tool::Select => {
                if let Some(drag) = self.drag.as_mut() {
                    let dx = scene_pos.x - drag.grab.x;
                    let dy = scene_pos.y - drag.grab.y;
                    // Dead zone is in viewport pixels, like the pan path.
                    if !drag.moved
                        && dx.abs() * scale < threshold::DRAG_MOVEMENT
                        && dy.abs() * scale < threshold::DRAG_MOVEMENT
                    {
                        return;
                    }
                    drag.moved = true;
                    drag.delta = (dx, dy);
                    // Native manipulation: only the scene moves during the
                    // drag; the document is reconciled on pointer-up.
                    let shape = drag.start_shape.translated(dx, dy);
                    let id = drag.annotation_id;
                    self.scene.update_shape(id, &shape);
                }
            }
            Tool::BoundingBox => {
                if self.draft.is_active() {
                    self.draft.drag_to(scene_pos);
                    self.sync_draft_preview();
                }
            }
            Tool::Polygon => {
                // Vertices are added on click, not on move.
            }
        }
    }

    /// Handle a pointer release at a viewport position.
    pub fn pointer_up(&mut self, _pos: Point) {
        // End of a button-driven pan drag (latched pan survives until
        // stop_panning).
        if self.pan_anchor.is_some() && !self.pan_latched {
            self.pan_anchor = None;
            return;
        }
        if self.pan_latched {
            self.pan_anchor = None;
            return;
        }

        match self.tool {
            Tool::Select => self.finish_shape_drag(),
            Tool::BoundingBox => {
                self.commit_box();
            }
            Tool::Polygon => {
                // Polygons close on double-click, first-vertex click, or
                // finish_polygon; release alone does nothing.
            }
        }
    }

    /// Handle a double-click: closes the in-progress polygon when it has
    /// enough vertices; a no-op otherwise.
    pub fn double_click(&mut self, _pos: Point) {
        if self.tool == Tool::Polygon {
            self.commit_polygon();
        }
    }

    /// Explicitly close the in-progress polygon (host key binding).
    pub fn finish_polygon(&mut self) -> bool {
        if self.tool != Tool::Polygon {
            return false;
        }
        self.commit_polygon()
    }

    /// Discard the in-progress draft, if any.
    pub fn cancel_draft(&mut self) {
        if self.draft.cancel() {
            self.scene.set_draft(None, [0.0; 4]);
            log::debug!("❌ Draft cancelled");
        }
    }

    /// The in-progress draft shape for host-side rendering.
    pub fn draft_preview(&self) -> Option<Shape> {
        self.draft.preview(self.tool)
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Register the annotation-list-changed callback. Fires once per
    /// settled mutation, never per intermediate draft frame, and never
    /// carries error state.
    pub fn set_on_annotations_changed(&mut self, callback: AnnotationsChanged) {
        self.on_annotations_changed = Some(callback);
    }

    /// Register the selection-changed callback.
    pub fn set_on_selection_changed(&mut self, callback: SelectionChanged) {
        self.on_selection_changed = Some(callback);
    }

    fn emit_annotations_changed(&mut self) {
        if let Some(cb) = self.on_annotations_changed.as_mut() {
            let records = self.doc.records();
            cb(&records);
        }
    }

    fn emit_selection_changed(&mut self) {
        if let Some(cb) = self.on_selection_changed.as_mut() {
            cb(self.doc.selected());
        }
    }

    // ========================================================================
    // Gesture internals
    // ========================================================================

    fn require_label(&self) -> bool {
        if self.active_label.is_none() {
            log::debug!("🏷️ Drawing ignored: no active label");
            return false;
        }
        true
    }

    fn select_down(&mut self, scene_pos: Point) {
        let hit = self.doc.hit_test(&scene_pos);
        let changed = self.doc.select(hit);
        self.drag = hit.and_then(|id| {
            log::debug!("🔍 Selected annotation {id}");
            self.doc.get(id).map(|a| ShapeDrag {
                annotation_id: id,
                start_shape: a.shape.clone(),
                grab: scene_pos,
                delta: (0.0, 0.0),
                moved: false,
            })
        });
        if changed {
            self.emit_selection_changed();
        }
    }

    fn finish_shape_drag(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if !drag.moved {
            return;
        }

        let new_shape = drag.start_shape.translated(drag.delta.0, drag.delta.1);
        // Reconcile the manipulation into one undoable step; adjacent drags
        // on the same shape merge within the history's merge window.
        self.history.execute(
            Command::modify(drag.annotation_id, drag.start_shape, new_shape),
            &mut self.doc,
            &mut self.scene,
            &self.labels,
        );
        self.emit_annotations_changed();
    }

    fn polygon_down(&mut self, scene_pos: Point, scale: f32) {
        if self.draft.is_active() {
            // Clicking the first vertex closes, when the shape is valid.
            if self.draft.vertex_count() >= threshold::MIN_POLYGON_VERTICES
                && let Some(first) = self.draft.first_vertex()
                && first.distance_to(&scene_pos) < threshold::POLYGON_CLOSE / scale
            {
                self.commit_polygon();
                return;
            }
            self.draft.push_vertex(scene_pos);
            log::debug!(
                "✏️ Polygon vertex {} at ({:.1}, {:.1})",
                self.draft.vertex_count(),
                scene_pos.x,
                scene_pos.y
            );
        } else {
            self.draft.start(scene_pos);
            log::debug!("✏️ Polygon started at ({:.1}, {:.1})", scene_pos.x, scene_pos.y);
        }
        self.sync_draft_preview();
    }

    fn commit_box(&mut self) -> bool {
        let Some(label_id) = self.active_label else {
            self.cancel_draft();
            return false;
        };
        let Some(bbox) = self.draft.finish_box() else {
            self.scene.set_draft(None, [0.0; 4]);
            return false;
        };
        self.scene.set_draft(None, [0.0; 4]);
        self.commit_shape(Shape::BoundingBox(bbox), label_id);
        true
    }

    fn commit_polygon(&mut self) -> bool {
        let Some(label_id) = self.active_label else {
            self.cancel_draft();
            return false;
        };
        let Some(polygon) = self.draft.finish_polygon() else {
            // Under 3 vertices: the close attempt is a no-op, shape stays open.
            return false;
        };
        self.scene.set_draft(None, [0.0; 4]);
        self.commit_shape(Shape::Polygon(polygon), label_id);
        true
    }

    fn commit_shape(&mut self, shape: Shape, label_id: u32) {
        let id = self.doc.allocate_id();
        let annotation = Annotation::new(id, label_id, shape).with_hints(&self.labels);
        self.history.execute(
            Command::Add { annotation },
            &mut self.doc,
            &mut self.scene,
            &self.labels,
        );
        log::info!("✅ Created annotation {id} (label {label_id})");
        self.emit_annotations_changed();
    }

    fn sync_draft_preview(&mut self) {
        let color = self
            .active_label
            .map(|id| self.labels.color_of(id))
            .unwrap_or(crate::constants::style::ORPHAN_GRAY);
        self.scene.set_draft(self.draft.preview(self.tool), color);
    }
}

// ============================================================================
// Tests
// ============================================================================
