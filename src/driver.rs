use crate::{
    error::TrailResult,
    stage::{ElementId, Stage},
    tween::{Animator, ChannelTarget, Timeline},
};

/// Minimal seam between effect logic and the tween engine, so controllers
/// can be exercised against a fake in tests.
pub trait AnimationDriver {
    /// Apply property values immediately.
    fn set_properties(
        &mut self,
        stage: &mut Stage,
        element: ElementId,
        values: &[ChannelTarget],
        z_index: Option<i32>,
    );

    /// Start a timeline against `element`.
    fn animate_to(
        &mut self,
        stage: &mut Stage,
        element: ElementId,
        timeline: Timeline,
    ) -> TrailResult<()>;

    /// Kill all scheduled and in-flight work on `element`.
    fn cancel(&mut self, element: ElementId);

    /// True while `element` has scheduled or in-flight tweens.
    fn is_animating(&self, element: ElementId) -> bool;
}

impl AnimationDriver for Animator {
    fn set_properties(
        &mut self,
        stage: &mut Stage,
        element: ElementId,
        values: &[ChannelTarget],
        z_index: Option<i32>,
    ) {
        self.set_now(stage, element, values, z_index);
    }

    fn animate_to(
        &mut self,
        stage: &mut Stage,
        element: ElementId,
        timeline: Timeline,
    ) -> TrailResult<()> {
        let _ = stage;
        self.schedule(element, timeline)
    }

    fn cancel(&mut self, element: ElementId) {
        self.kill_tweens_of(element);
    }

    fn is_animating(&self, element: ElementId) -> bool {
        self.is_tweening(element)
    }
}
