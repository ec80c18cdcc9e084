//! Display preferences that are not part of the annotation history.

use std::collections::HashSet;

use crate::constants::DEFAULT_BOX_OPACITY;
use crate::model::{CLASSES, ClassId};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    /// Fill alpha of annotation boxes, 0..1
    box_opacity: f64,
    pub show_labels: bool,
    pub show_help: bool,
    /// Classes skipped by rendering and body hit testing
    pub hidden_classes: HashSet<ClassId>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            box_opacity: DEFAULT_BOX_OPACITY,
            show_labels: true,
            show_help: false,
            hidden_classes: HashSet::new(),
        }
    }
}

impl ViewSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn box_opacity(&self) -> f64 {
        self.box_opacity
    }

    /// Non-finite values are ignored.
    pub fn set_box_opacity(&mut self, opacity: f64) {
        if opacity.is_finite() {
            self.box_opacity = opacity.clamp(0.0, 1.0);
        }
    }

    pub fn toggle_labels(&mut self) {
        self.show_labels = !self.show_labels;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn is_hidden(&self, class_id: ClassId) -> bool {
        self.hidden_classes.contains(&class_id)
    }

    pub fn toggle_class_visibility(&mut self, class_id: ClassId) {
        if !self.hidden_classes.remove(&class_id) {
            self.hidden_classes.insert(class_id);
        }
        log::debug!("Hidden classes: {:?}", self.hidden_classes);
    }

    /// Hide every class if all are visible, otherwise show them all.
    pub fn toggle_all_class_visibility(&mut self) {
        if self.hidden_classes.is_empty() {
            self.hidden_classes = CLASSES.iter().map(|c| c.id).collect();
        } else {
            self.hidden_classes.clear();
        }
    }
}
