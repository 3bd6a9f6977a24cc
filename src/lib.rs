//! # labelcanvas
//!
//! Headless annotation canvas engine for image-labeling tools: bounding-box
//! and polygon drawing, selection and dragging, bounded undo/redo with drag
//! merging, and the pan/zoom view transform between image (scene) space and
//! viewport pixels.
//!
//! The crate renders nothing and owns no event loop. A host UI feeds pointer
//! and tool events into a [`CanvasEngine`] and reads back the scene and
//! annotation records to draw and persist:
//!
//! ```
//! use labelcanvas::{CanvasEngine, Point, PointerButton, Tool};
//!
//! let mut engine = CanvasEngine::new();
//! engine.init_document_with_size((800.0, 600.0), 1600.0, 1200.0);
//! engine.set_tool(Tool::BoundingBox);
//! engine.set_active_label(1);
//!
//! engine.pointer_down(Point::new(50.0, 50.0), PointerButton::Primary);
//! engine.pointer_move(Point::new(150.0, 125.0));
//! engine.pointer_up(Point::new(150.0, 125.0));
//!
//! assert_eq!(engine.annotations().len(), 1);
//! assert!(engine.undo());
//! ```
//!
//! All geometry is stored in scene coordinates (image pixels), so zooming and
//! panning never rewrite annotation data.

pub mod annotation;
pub mod constants;
pub mod engine;
pub mod error;
pub mod history;
pub mod scene;
pub mod tools;
pub mod view;

pub use annotation::{
    Annotation, AnnotationRecord, BoundingBox, Document, Label, LabelSet, Point, Polygon, Shape,
};
pub use engine::{CanvasEngine, PointerButton};
pub use error::EngineError;
pub use history::{Command, History};
pub use scene::{NodeStyle, Scene, SceneNode};
pub use tools::{DraftState, Tool};
pub use view::ViewTransform;
