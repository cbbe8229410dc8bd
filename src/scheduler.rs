//! The frame loop, made explicit: an `Engine` advances one frame at a time,
//! and `FrameLoop` drives it at a fixed rate until its handle is cancelled.
//! Tests and the CLI step the engine synchronously instead.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use crate::{
    effects::SiteEffects,
    error::TrailResult,
    geom::Viewport,
    input::{FrameCtx, PointerEvent},
    preload::Preloader,
    scroll::ScrollObserver,
    stage::{ElementId, Stage},
    trail::{ImageTrail, Reveal},
    tween::Animator,
};

/// Name prefix of the pooled trail images in the stage.
pub const TRAIL_IMAGE_PREFIX: &str = "content-img";

/// Everything one frame touches: stage, tween engine, pointer context,
/// scroll observer, and the trail controller once its images are loaded.
#[derive(Clone, Debug)]
pub struct Engine {
    stage: Stage,
    animator: Animator,
    ctx: FrameCtx,
    observer: ScrollObserver,
    preloader: Preloader,
    trail: Option<ImageTrail>,
    effects: Option<SiteEffects>,
}

impl Engine {
    pub fn new(stage: Stage, viewport: Viewport) -> Self {
        let preloader = Preloader::from_prefix(&stage, TRAIL_IMAGE_PREFIX);
        Self {
            stage,
            animator: Animator::new(),
            ctx: FrameCtx::new(viewport),
            observer: ScrollObserver::new(),
            preloader,
            trail: None,
            effects: None,
        }
    }

    /// Register the full set of page effects. Builders run in sequence and
    /// the first failure aborts the rest.
    pub fn init_site_effects(&mut self) -> TrailResult<()> {
        let effects = SiteEffects::init(
            &mut self.stage,
            &mut self.animator,
            &mut self.observer,
            self.ctx.viewport,
        )?;
        self.effects = Some(effects);
        Ok(())
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn observer_mut(&mut self) -> &mut ScrollObserver {
        &mut self.observer
    }

    pub fn trail(&self) -> Option<&ImageTrail> {
        self.trail.as_ref()
    }

    pub fn effects(&self) -> Option<&SiteEffects> {
        self.effects.as_ref()
    }

    /// True until every pooled image has loaded and the trail exists.
    pub fn is_loading(&self) -> bool {
        self.trail.is_none() && !self.preloader.images().is_empty()
    }

    pub fn trail_images(&self) -> Vec<ElementId> {
        self.preloader.images().to_vec()
    }

    /// Report one image as loaded; the trail controller is constructed the
    /// moment the whole pool is ready.
    pub fn mark_image_loaded(&mut self, element: ElementId) -> TrailResult<()> {
        self.preloader.mark_loaded(&mut self.stage, element);
        if self.trail.is_none()
            && !self.preloader.images().is_empty()
            && self.preloader.ready(&self.stage)
        {
            self.trail = Some(ImageTrail::new(&self.stage, self.preloader.images())?);
        }
        Ok(())
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        self.ctx.pointer.apply(event);
    }

    pub fn handle_scroll(&mut self, y: f64) {
        self.observer.scroll_to(y);
    }

    /// Swap in the new viewport and reset the trail pool, mirroring a
    /// window resize.
    pub fn handle_resize(&mut self, viewport: Viewport) {
        self.ctx.viewport = viewport;
        if let Some(trail) = &mut self.trail {
            trail.resize(&mut self.stage, &mut self.animator);
        }
    }

    pub fn is_idle(&self) -> bool {
        match &self.trail {
            Some(trail) => trail.is_idle(&self.stage, &self.animator),
            None => true,
        }
    }

    /// Advance one frame: trail decision first, then tween interpolation,
    /// scroll triggers and the countdown.
    pub fn step(&mut self, dt: f64) -> TrailResult<Option<Reveal>> {
        let reveal = match &mut self.trail {
            Some(trail) => trail.update(&mut self.ctx, &mut self.stage, &mut self.animator)?,
            None => None,
        };
        self.animator.tick(&mut self.stage, dt);
        self.observer
            .tick(&mut self.stage, &mut self.animator, dt)?;
        if let Some(effects) = &mut self.effects {
            effects.tick(&mut self.stage, dt);
        }
        Ok(reveal)
    }
}

/// Cooperative cancellation flag shared with a running loop.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Fixed-rate driver for an `Engine`. `run` blocks until cancelled;
/// `step_frames` advances synchronously without touching the wall clock.
#[derive(Clone, Debug)]
pub struct FrameLoop {
    frame_secs: f64,
    handle: CancelHandle,
}

impl FrameLoop {
    pub fn new(fps: f64) -> TrailResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(crate::error::TrailError::validation("fps must be > 0"));
        }
        Ok(Self {
            frame_secs: 1.0 / fps,
            handle: CancelHandle::new(),
        })
    }

    pub fn frame_secs(&self) -> f64 {
        self.frame_secs
    }

    pub fn handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    /// Run until cancelled. There is no natural termination; the loop is
    /// stopped from outside through its handle.
    pub fn run(&self, engine: &mut Engine) -> TrailResult<()> {
        while !self.handle.is_cancelled() {
            engine.step(self.frame_secs)?;
            std::thread::sleep(Duration::from_secs_f64(self.frame_secs));
        }
        Ok(())
    }

    pub fn step_frames(&self, engine: &mut Engine, frames: u64) -> TrailResult<()> {
        for _ in 0..frames {
            engine.step(self.frame_secs)?;
        }
        Ok(())
    }
}
