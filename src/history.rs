//! Undo/redo history for annotation operations.
//!
//! Every mutation of the document goes through a [`Command`] so it can be
//! reversed. Forward and reverse application run against the document and
//! the scene together, which is what keeps the id bijection intact under
//! undo/redo.

use crate::annotation::{Annotation, Document, LabelSet, Shape};
use crate::constants::history as history_const;
use crate::scene::Scene;
use web_time::Instant;

// ============================================================================
// Command Types
// ============================================================================

/// A command that can be undone and redone.
/// Each command stores enough captured state to reverse its effect.
#[derive(Debug, Clone)]
pub enum Command {
    /// Insert an annotation into document and scene.
    Add {
        /// The annotation that was added.
        annotation: Annotation,
    },
    /// Remove an annotation by id.
    Remove {
        /// Captured snapshot, reinserted on undo.
        annotation: Annotation,
    },
    /// Replace an annotation's geometry.
    Modify {
        /// The annotation id.
        annotation_id: u64,
        /// Geometry before modification.
        old_shape: Shape,
        /// Geometry after modification.
        new_shape: Shape,
        /// When this command was last extended; merge-window state is
        /// command-local and never references other (possibly evicted)
        /// history entries.
        touched: Instant,
    },
    /// Reassign an annotation's label.
    ChangeLabel {
        /// The annotation id.
        annotation_id: u64,
        /// Label before the change.
        old_label_id: u32,
        /// Label after the change.
        new_label_id: u32,
    },
    /// Groups multiple commands into one atomic undo step.
    Batch {
        /// Description of the batch operation.
        description: String,
        /// The commands, executed in order and undone in reverse.
        commands: Vec<Command>,
    },
}

impl Command {
    /// Build a Modify command stamped with the current time.
    pub fn modify(annotation_id: u64, old_shape: Shape, new_shape: Shape) -> Self {
        Command::Modify {
            annotation_id,
            old_shape,
            new_shape,
            touched: Instant::now(),
        }
    }

    /// Get a human-readable description of this command.
    pub fn description(&self) -> String {
        match self {
            Command::Add { .. } => "Add annotation".to_string(),
            Command::Remove { .. } => "Delete annotation".to_string(),
            Command::Modify { .. } => "Move/resize annotation".to_string(),
            Command::ChangeLabel { .. } => "Change label".to_string(),
            Command::Batch { description, .. } => description.clone(),
        }
    }

    /// Whether `incoming` can collapse into this command: both Modify, same
    /// target, and pushed within the merge window.
    fn can_merge(&self, incoming: &Command) -> bool {
        match (self, incoming) {
            (
                Command::Modify {
                    annotation_id: a,
                    touched: prev,
                    ..
                },
                Command::Modify {
                    annotation_id: b,
                    touched: next,
                    ..
                },
            ) => {
                a == b
                    && next.saturating_duration_since(*prev) <= history_const::MERGE_WINDOW
            }
            _ => false,
        }
    }

    /// Collapse `incoming` into this command: undo keeps going back to the
    /// oldest captured state, redo to the newest.
    fn merge(&mut self, incoming: Command) {
        if let (
            Command::Modify {
                new_shape, touched, ..
            },
            Command::Modify {
                new_shape: incoming_new,
                touched: incoming_touched,
                ..
            },
        ) = (self, incoming)
        {
            *new_shape = incoming_new;
            *touched = incoming_touched;
        }
    }
}

// ============================================================================
// Forward / Reverse Application
// ============================================================================

/// Apply the forward effect of a command to document and scene.
pub fn apply_forward(cmd: &Command, doc: &mut Document, scene: &mut Scene, labels: &LabelSet) {
    match cmd {
        Command::Add { annotation } => {
            doc.insert(annotation.clone());
            scene.add(annotation, labels);
            log::debug!("➕ Added annotation {}", annotation.id);
        }
        Command::Remove { annotation } => {
            doc.remove(annotation.id);
            scene.remove(annotation.id);
            log::debug!("🗑️ Removed annotation {}", annotation.id);
        }
        Command::Modify {
            annotation_id,
            new_shape,
            ..
        } => {
            doc.update_shape(*annotation_id, new_shape.clone());
            scene.update_shape(*annotation_id, new_shape);
            log::debug!("✏️ Modified annotation {annotation_id}");
        }
        Command::ChangeLabel {
            annotation_id,
            new_label_id,
            ..
        } => {
            doc.set_label(*annotation_id, *new_label_id);
            scene.restyle(*annotation_id, *new_label_id, labels);
            log::debug!("🏷️ Annotation {annotation_id} label -> {new_label_id}");
        }
        Command::Batch { commands, .. } => {
            for cmd in commands {
                apply_forward(cmd, doc, scene, labels);
            }
        }
    }
}

/// Apply the reverse effect of a command to document and scene.
pub fn apply_reverse(cmd: &Command, doc: &mut Document, scene: &mut Scene, labels: &LabelSet) {
    match cmd {
        Command::Add { annotation } => {
            doc.remove(annotation.id);
            scene.remove(annotation.id);
            log::debug!("⏪ Undid add of annotation {}", annotation.id);
        }
        Command::Remove { annotation } => {
            doc.insert(annotation.clone());
            scene.add(annotation, labels);
            log::debug!("⏪ Undid remove of annotation {}", annotation.id);
        }
        Command::Modify {
            annotation_id,
            old_shape,
            ..
        } => {
            doc.update_shape(*annotation_id, old_shape.clone());
            scene.update_shape(*annotation_id, old_shape);
            log::debug!("⏪ Undid modify of annotation {annotation_id}");
        }
        Command::ChangeLabel {
            annotation_id,
            old_label_id,
            ..
        } => {
            doc.set_label(*annotation_id, *old_label_id);
            scene.restyle(*annotation_id, *old_label_id, labels);
            log::debug!("⏪ Undid label change of annotation {annotation_id}");
        }
        Command::Batch { commands, .. } => {
            for cmd in commands.iter().rev() {
                apply_reverse(cmd, doc, scene, labels);
            }
        }
    }
}

// ============================================================================
// History
// ============================================================================

/// Bounded undo/redo stacks.
///
/// Executing a new command clears the redo stack (no branching timelines).
/// Pushing past the depth bound evicts the oldest entry; its effect stays
/// applied and becomes permanently non-reversible, which is accepted
/// behavior rather than an error.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_depth(history_const::MAX_DEPTH)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a custom depth bound.
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Run the command's forward effect and record it, merging with the top
    /// of the undo stack when eligible.
    pub fn execute(
        &mut self,
        cmd: Command,
        doc: &mut Document,
        scene: &mut Scene,
        labels: &LabelSet,
    ) {
        apply_forward(&cmd, doc, scene, labels);
        log::debug!("📝 History: '{}'", cmd.description());

        self.redo_stack.clear();
        if let Some(top) = self.undo_stack.last_mut()
            && top.can_merge(&cmd)
        {
            top.merge(cmd);
            log::debug!("🔗 Merged with previous history entry");
            return;
        }

        self.undo_stack.push(cmd);
        while self.undo_stack.len() > self.max_depth {
            // Evicted command stays applied; only its reversibility is lost.
            self.undo_stack.remove(0);
            log::debug!("♻️ History bound reached, evicted oldest entry");
        }
    }

    /// Undo the most recent command. Returns false if there was nothing to
    /// undo.
    pub fn undo(&mut self, doc: &mut Document, scene: &mut Scene, labels: &LabelSet) -> bool {
        let Some(cmd) = self.undo_stack.pop() else {
            return false;
        };
        log::debug!("⏪ Undo: '{}'", cmd.description());
        apply_reverse(&cmd, doc, scene, labels);
        self.redo_stack.push(cmd);
        true
    }

    /// Redo the most recently undone command. Returns false if there was
    /// nothing to redo.
    pub fn redo(&mut self, doc: &mut Document, scene: &mut Scene, labels: &LabelSet) -> bool {
        let Some(cmd) = self.redo_stack.pop() else {
            return false;
        };
        log::debug!("⏩ Redo: '{}'", cmd.description());
        apply_forward(&cmd, doc, scene, labels);
        self.undo_stack.push(cmd);
        true
    }

    /// Empty both stacks. Called on every document load so a fresh image can
    /// never be undone into the previous image's state.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ History cleared");
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Description of the command that would be undone.
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(Command::description)
    }

    /// Description of the command that would be redone.
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(Command::description)
    }
}

// ============================================================================
// Tests
// ============================================================================
