//! Engine constants for thresholds, zoom behavior, and shape styling.
//!
//! This module centralizes the hardcoded values used across the engine so
//! that tools, history, and the view transform agree on one set of numbers.

/// Interaction threshold constants.
pub mod threshold {
    /// Minimum bounding-box edge length (scene pixels) accepted at creation.
    /// Boxes smaller than this in either axis are discarded as accidental clicks.
    pub const MIN_BOX_SIZE: f32 = 5.0;
    /// Polygon close distance (scene coords at scale 1.0); divided by the
    /// current scale so the click target stays constant on screen.
    pub const POLYGON_CLOSE: f32 = 15.0;
    /// Minimum committed vertex count for a closed polygon.
    pub const MIN_POLYGON_VERTICES: usize = 3;
    /// Minimum pointer movement (viewport pixels) recognized as a drag.
    pub const DRAG_MOVEMENT: f32 = 0.5;
    /// Epsilon for float comparison in zoom/pan change detection.
    pub const FLOAT_EPSILON: f32 = 0.001;
}

/// Zoom constants.
pub mod zoom {
    /// Zoom step factor for toolbar/keyboard zoom.
    pub const STEP: f32 = 1.2;
    /// Finer step factor for wheel zoom-to-cursor.
    pub const WHEEL_STEP: f32 = 1.1;
    /// Maximum zoom level.
    pub const MAX: f32 = 5.0;
    /// Minimum zoom level.
    pub const MIN: f32 = 0.1;
}

/// History constants.
pub mod history {
    use web_time::Duration;

    /// Maximum number of commands kept in the undo stack.
    pub const MAX_DEPTH: usize = 50;
    /// Window within which adjacent Modify commands on the same
    /// annotation collapse into one history entry.
    pub const MERGE_WINDOW: Duration = Duration::from_millis(500);
}

/// Shape styling constants.
pub mod style {
    /// Fill alpha for committed annotation shapes.
    pub const FILL_ALPHA: f32 = 0.25;
    /// Fill alpha for in-progress draft shapes.
    pub const DRAFT_ALPHA: f32 = 0.15;
    /// Stroke width in scene pixels at scale 1.0.
    pub const STROKE_WIDTH: f32 = 2.0;
    /// Fallback color for annotations whose label no longer exists.
    pub const ORPHAN_GRAY: [f32; 4] = [0.7, 0.7, 0.7, 1.0];
    /// Golden angle for label fallback color generation (degrees).
    pub const GOLDEN_ANGLE: f32 = 137.5;
}
