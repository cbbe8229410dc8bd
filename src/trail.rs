//! The cursor image trail: a fixed pool of images revealed along the pointer
//! path whenever it has travelled far enough since the last reveal. Each
//! reveal plays a four-segment timeline (appear, slide to the cursor, fade
//! out, fall below the fold) while a self-incrementing z-index keeps newer
//! images stacked above older ones.

use crate::{
    driver::AnimationDriver,
    ease::Ease,
    error::{TrailError, TrailResult},
    geom::{Point, Rect},
    input::FrameCtx,
    stage::{Channel, ElementId, Stage},
    tween::{ChannelTarget, Timeline, TweenSpec},
};

/// Pointer travel (px) required before the next image is revealed.
pub const REVEAL_THRESHOLD: f64 = 50.0;

const SLIDE_SECS: f64 = 1.6;
const EXIT_DELAY_SECS: f64 = 0.4;
const FADE_SECS: f64 = 1.0;
const FALL_SECS: f64 = 1.0;

fn default_style() -> [ChannelTarget; 3] {
    [
        ChannelTarget::to(Channel::X, 0.0),
        ChannelTarget::to(Channel::Y, 0.0),
        ChannelTarget::to(Channel::Opacity, 0.0),
    ]
}

/// Wraps one pooled image element: its cached layout rect and the reset /
/// activity operations the trail loop needs.
#[derive(Clone, Debug)]
pub struct TrailImage {
    element: ElementId,
    rect: Rect,
}

impl TrailImage {
    pub fn new(stage: &Stage, element: ElementId) -> Self {
        Self {
            element,
            rect: stage.element(element).rect,
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Re-read the layout rect from the stage.
    pub fn recompute_rect(&mut self, stage: &Stage) {
        self.rect = stage.element(self.element).rect;
    }

    /// Reset to the default style, then refresh the rect. Viewport resizes
    /// are the only caller.
    pub fn resize(&mut self, stage: &mut Stage, driver: &mut dyn AnimationDriver) {
        driver.set_properties(stage, self.element, &default_style(), None);
        self.recompute_rect(stage);
    }

    /// Mid-animation, or still visible. Drives idle detection only.
    pub fn is_active(&self, stage: &Stage, driver: &dyn AnimationDriver) -> bool {
        driver.is_animating(self.element) || stage.element(self.element).channel(Channel::Opacity) != 0.0
    }
}

/// One fired reveal, reported for observation and tests.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Reveal {
    pub image_index: usize,
    pub z_index: i32,
    pub at: Point,
}

/// The trail controller: ordered image pool, rotating insertion cursor,
/// z-index counter and the per-frame reveal decision.
#[derive(Clone, Debug)]
pub struct ImageTrail {
    images: Vec<TrailImage>,
    images_total: usize,
    img_position: usize,
    z_index_val: i32,
    threshold: f64,
}

impl ImageTrail {
    /// Build the pool from every element whose name starts with `prefix`,
    /// in stage order.
    pub fn from_prefix(stage: &Stage, prefix: &str) -> TrailResult<Self> {
        let ids = stage.select_all(prefix);
        Self::new(stage, &ids)
    }

    pub fn new(stage: &Stage, elements: &[ElementId]) -> TrailResult<Self> {
        if elements.is_empty() {
            return Err(TrailError::validation("image trail needs at least one image"));
        }
        let images: Vec<TrailImage> = elements.iter().map(|&id| TrailImage::new(stage, id)).collect();
        let images_total = images.len();
        Ok(Self {
            images,
            images_total,
            img_position: 0,
            z_index_val: 1,
            threshold: REVEAL_THRESHOLD,
        })
    }

    pub fn images_total(&self) -> usize {
        self.images_total
    }

    /// Rotating cursor; always a valid pool index.
    pub fn img_position(&self) -> usize {
        self.img_position
    }

    /// Z-index for the upcoming reveal; always >= 1.
    pub fn z_index_val(&self) -> i32 {
        self.z_index_val
    }

    /// One frame of the reveal loop. Returns the reveal that fired, if any.
    #[tracing::instrument(skip_all, level = "trace")]
    pub fn update(
        &mut self,
        ctx: &mut FrameCtx,
        stage: &mut Stage,
        driver: &mut dyn AnimationDriver,
    ) -> TrailResult<Option<Reveal>> {
        let travelled = ctx.pointer.travel();
        let cache_pos = ctx.pointer.smooth();

        let mut fired = None;
        if travelled > self.threshold {
            let mouse_pos = ctx.pointer.mouse_pos;
            self.show_next(ctx, cache_pos, mouse_pos, stage, driver)?;

            fired = Some(Reveal {
                image_index: self.img_position,
                z_index: self.z_index_val,
                at: mouse_pos,
            });
            tracing::debug!(index = self.img_position, z = self.z_index_val, "reveal");

            self.z_index_val += 1;
            self.img_position = if self.img_position < self.images_total - 1 {
                self.img_position + 1
            } else {
                0
            };
            ctx.pointer.mark_reveal();
        }

        // Once everything has settled, restart the stacking order.
        if self.z_index_val != 1 && self.is_idle(stage, driver) {
            self.z_index_val = 1;
        }

        Ok(fired)
    }

    /// True when no pooled image is visible or mid-animation.
    pub fn is_idle(&self, stage: &Stage, driver: &dyn AnimationDriver) -> bool {
        self.images.iter().all(|img| !img.is_active(stage, driver))
    }

    /// Reset every image to its default style and refresh its rect.
    pub fn resize(&mut self, stage: &mut Stage, driver: &mut dyn AnimationDriver) {
        for img in &mut self.images {
            img.resize(stage, driver);
        }
    }

    fn show_next(
        &mut self,
        ctx: &FrameCtx,
        cache_pos: Point,
        mouse_pos: Point,
        stage: &mut Stage,
        driver: &mut dyn AnimationDriver,
    ) -> TrailResult<()> {
        let img = &self.images[self.img_position];
        let rect = img.rect();
        let half_w = rect.width() / 2.0;
        let half_h = rect.height() / 2.0;

        // Last reveal wins on this element.
        driver.cancel(img.element());

        let timeline = Timeline::new()
            // Appear centered on the smoothed pointer position.
            .set(
                0.0,
                vec![
                    ChannelTarget::to(Channel::Opacity, 1.0),
                    ChannelTarget::to(Channel::X, cache_pos.x - half_w),
                    ChannelTarget::to(Channel::Y, cache_pos.y - half_h),
                ],
                Some(self.z_index_val),
            )
            // Slide to center on the raw pointer position.
            .to(
                0.0,
                TweenSpec::new(
                    SLIDE_SECS,
                    Ease::OutExpo,
                    vec![
                        ChannelTarget::to(Channel::X, mouse_pos.x - half_w),
                        ChannelTarget::to(Channel::Y, mouse_pos.y - half_h),
                    ],
                ),
            )
            // Fade out.
            .to(
                EXIT_DELAY_SECS,
                TweenSpec::new(
                    FADE_SECS,
                    Ease::OutQuad,
                    vec![ChannelTarget::to(Channel::Opacity, 0.0)],
                ),
            )
            // Fall below the fold.
            .to(
                EXIT_DELAY_SECS,
                TweenSpec::new(
                    FALL_SECS,
                    Ease::InOutQuint,
                    vec![ChannelTarget::by(Channel::Y, ctx.viewport.height + half_h)],
                ),
            );

        driver.animate_to(stage, img.element(), timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::Viewport,
        input::PointerEvent,
        tween::Animator,
    };

    const DT: f64 = 1.0 / 60.0;

    fn rig(images: usize) -> (Stage, Animator, FrameCtx, ImageTrail) {
        let mut stage = Stage::new();
        for i in 0..images {
            stage.insert_image(
                format!("content-img-{i}"),
                Rect::from_origin_size(Point::ORIGIN, (200.0, 150.0)),
            );
        }
        let trail = ImageTrail::from_prefix(&stage, "content-img").unwrap();
        let ctx = FrameCtx::new(Viewport::new(1280.0, 720.0).unwrap());
        (stage, Animator::new(), ctx, trail)
    }

    fn move_to(ctx: &mut FrameCtx, x: f64, y: f64) {
        ctx.pointer.apply(&PointerEvent::at_page(x, y));
    }

    #[test]
    fn reveal_requires_travel_beyond_threshold() {
        let (mut stage, mut animator, mut ctx, mut trail) = rig(3);

        move_to(&mut ctx, 30.0, 0.0);
        let fired = trail.update(&mut ctx, &mut stage, &mut animator).unwrap();
        assert!(fired.is_none());
        assert_eq!(trail.img_position(), 0);

        move_to(&mut ctx, 60.0, 0.0);
        let fired = trail.update(&mut ctx, &mut stage, &mut animator).unwrap();
        assert_eq!(
            fired,
            Some(Reveal {
                image_index: 0,
                z_index: 1,
                at: Point::new(60.0, 0.0),
            })
        );
        assert_eq!(trail.img_position(), 1);
        assert_eq!(trail.z_index_val(), 2);
    }

    #[test]
    fn cursor_wraps_through_the_pool() {
        let (mut stage, mut animator, mut ctx, mut trail) = rig(3);

        let mut positions = Vec::new();
        for x in [100.0, 200.0, 300.0, 400.0] {
            move_to(&mut ctx, x, 0.0);
            let fired = trail.update(&mut ctx, &mut stage, &mut animator).unwrap();
            assert!(fired.is_some());
            positions.push(trail.img_position());
            animator.tick(&mut stage, DT);
        }
        assert_eq!(positions, vec![1, 2, 0, 1]);
        assert_eq!(trail.z_index_val(), 5);
    }

    #[test]
    fn reveal_appears_at_cache_and_slides_to_mouse() {
        let (mut stage, mut animator, mut ctx, mut trail) = rig(1);
        let id = stage.select("content-img-0").unwrap();

        // Seed the cache at the origin, then jump the pointer.
        move_to(&mut ctx, 0.0, 0.0);
        trail.update(&mut ctx, &mut stage, &mut animator).unwrap();
        move_to(&mut ctx, 100.0, 0.0);
        trail.update(&mut ctx, &mut stage, &mut animator).unwrap();

        // First tick applies the instant set: centered at the smoothed
        // position (10, 0), i.e. x = 10 - 100, y = 0 - 75.
        animator.tick(&mut stage, 0.0);
        assert_eq!(stage.element(id).channel(Channel::Opacity), 1.0);
        assert_eq!(stage.element(id).channel(Channel::X), -90.0);
        assert_eq!(stage.element(id).channel(Channel::Y), -75.0);
        assert_eq!(stage.element(id).z_index, 1);

        // By the end of the slide the image centers on the raw pointer.
        animator.tick(&mut stage, SLIDE_SECS);
        assert_eq!(stage.element(id).channel(Channel::X), 0.0);
        assert_eq!(stage.element(id).channel(Channel::Opacity), 0.0);
    }

    #[test]
    fn idle_reset_restores_z_index() {
        let (mut stage, mut animator, mut ctx, mut trail) = rig(2);

        move_to(&mut ctx, 100.0, 0.0);
        trail.update(&mut ctx, &mut stage, &mut animator).unwrap();
        assert_eq!(trail.z_index_val(), 2);

        // While the reveal timeline runs the counter must hold.
        animator.tick(&mut stage, 0.5);
        trail.update(&mut ctx, &mut stage, &mut animator).unwrap();
        assert_eq!(trail.z_index_val(), 2);

        // All segments are done after 1.6s; opacity is back to 0.
        animator.tick(&mut stage, 1.2);
        trail.update(&mut ctx, &mut stage, &mut animator).unwrap();
        assert!(trail.is_idle(&stage, &animator));
        assert_eq!(trail.z_index_val(), 1);
    }

    #[test]
    fn resize_restores_default_style_and_rect() {
        let (mut stage, mut animator, mut ctx, mut trail) = rig(2);
        let id = stage.select("content-img-0").unwrap();

        move_to(&mut ctx, 300.0, 300.0);
        trail.update(&mut ctx, &mut stage, &mut animator).unwrap();
        animator.tick(&mut stage, 0.2);
        assert_ne!(stage.element(id).channel(Channel::X), 0.0);

        // Host relayout shrinks the image, then the resize handler runs.
        let new_rect = Rect::from_origin_size(Point::new(5.0, 5.0), (80.0, 60.0));
        stage.element_mut(id).rect = new_rect;
        trail.resize(&mut stage, &mut animator);

        assert_eq!(stage.element(id).channel(Channel::X), 0.0);
        assert_eq!(stage.element(id).channel(Channel::Y), 0.0);
        assert_eq!(stage.element(id).channel(Channel::Opacity), 0.0);
        assert_eq!(trail.images[0].rect(), new_rect);
    }

    #[test]
    fn empty_pool_is_rejected() {
        let stage = Stage::new();
        assert!(ImageTrail::from_prefix(&stage, "content-img").is_err());
    }
}
