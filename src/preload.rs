use crate::stage::{ElementId, Stage};

/// Gate over the pooled image elements: the trail controller is only
/// constructed once every image has finished loading.
#[derive(Clone, Debug)]
pub struct Preloader {
    images: Vec<ElementId>,
}

impl Preloader {
    pub fn from_prefix(stage: &Stage, prefix: &str) -> Self {
        Self {
            images: stage.select_all(prefix),
        }
    }

    pub fn images(&self) -> &[ElementId] {
        &self.images
    }

    pub fn mark_loaded(&self, stage: &mut Stage, element: ElementId) {
        if self.images.contains(&element) {
            stage.element_mut(element).loaded = true;
        }
    }

    pub fn ready(&self, stage: &Stage) -> bool {
        self.images.iter().all(|&id| stage.element(id).loaded)
    }
}
