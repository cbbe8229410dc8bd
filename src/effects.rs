//! Declarative page effects: each builder selects its elements, computes the
//! scroll geometry from their layout rects, and registers tweens or
//! scroll triggers. Builders run strictly in sequence; the first missing
//! element aborts the remaining initializations.

use crate::{
    ease::Ease,
    error::{TrailError, TrailResult},
    geom::Viewport,
    scroll::{ScrollObserver, ScrollRange, ScrollTrigger, ScrubTween, TriggerAction},
    stage::{Channel, ElementId, Stage},
    tween::{Animator, ChannelTarget, Timeline, TweenSpec},
};

/// Fallback duration for tweens the host engine would default.
const DEFAULT_TWEEN_SECS: f64 = 0.5;

/// Numeric loading counter: after `delay` seconds it counts from 0 to
/// `limit`, one step per `interval` seconds.
#[derive(Clone, Copy, Debug)]
pub struct Countdown {
    delay: f64,
    interval: f64,
    limit: u32,
    elapsed: f64,
}

impl Countdown {
    pub fn new(delay: f64, interval: f64, limit: u32) -> Self {
        Self {
            delay,
            interval,
            limit,
            elapsed: 0.0,
        }
    }

    pub fn tick(&mut self, dt: f64) -> Option<u32> {
        self.elapsed += dt.max(0.0);
        self.value()
    }

    /// `None` until the start delay has passed.
    pub fn value(&self) -> Option<u32> {
        if self.elapsed < self.delay {
            return None;
        }
        let steps = ((self.elapsed - self.delay) / self.interval).floor();
        Some((steps as u32).min(self.limit))
    }

    pub fn is_done(&self) -> bool {
        self.value() == Some(self.limit)
    }
}

/// One hover-driven overlay: pointer enter sweeps it out to the right,
/// pointer leave sweeps it back out to the left.
#[derive(Clone, Debug)]
pub struct HoverOverlay {
    overlay: ElementId,
    width: f64,
}

impl HoverOverlay {
    const SWEEP_SECS: f64 = 0.3;

    pub fn enter(&self, animator: &mut Animator) -> TrailResult<()> {
        self.sweep(animator, self.width)
    }

    pub fn leave(&self, animator: &mut Animator) -> TrailResult<()> {
        self.sweep(animator, -self.width)
    }

    fn sweep(&self, animator: &mut Animator, x: f64) -> TrailResult<()> {
        let timeline = Timeline::new().to(
            0.0,
            TweenSpec::new(
                Self::SWEEP_SECS,
                Ease::OutQuad,
                vec![ChannelTarget::to(Channel::X, x)],
            ),
        );
        animator.schedule(self.overlay, timeline)
    }
}

/// The assembled site effects: the loader countdown plus the hover overlays
/// that stay interactive after startup. Everything else registers fire-and-
/// forget tweens or scroll triggers during `init`.
#[derive(Clone, Debug)]
pub struct SiteEffects {
    countdown: Countdown,
    counter_display: ElementId,
    overlays: Vec<HoverOverlay>,
}

impl SiteEffects {
    pub fn init(
        stage: &mut Stage,
        animator: &mut Animator,
        observer: &mut ScrollObserver,
        viewport: Viewport,
    ) -> TrailResult<Self> {
        let counter_display = loader_intro(stage, animator, viewport)?;
        parallax_slides(stage, observer, viewport)?;
        digit_roll(stage, observer, viewport)?;
        let overlays = hover_overlays(stage)?;
        arrow_bounce(stage, animator)?;
        clip_reveal(stage, observer, viewport)?;
        zoom_scrub(stage, observer, viewport)?;
        footer_clip(stage, observer, viewport)?;

        Ok(Self {
            countdown: Countdown::new(1.1, 0.008, 100),
            counter_display,
            overlays,
        })
    }

    /// Advance the countdown and mirror its value into the loader heading.
    pub fn tick(&mut self, stage: &mut Stage, dt: f64) {
        if let Some(value) = self.countdown.tick(dt) {
            stage.element_mut(self.counter_display).text = Some(value.to_string());
        }
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn pointer_enter(&self, animator: &mut Animator, index: usize) -> TrailResult<()> {
        self.overlay(index)?.enter(animator)
    }

    pub fn pointer_leave(&self, animator: &mut Animator, index: usize) -> TrailResult<()> {
        self.overlay(index)?.leave(animator)
    }

    fn overlay(&self, index: usize) -> TrailResult<&HoverOverlay> {
        self.overlays
            .get(index)
            .ok_or_else(|| TrailError::stage(format!("no overlay at index {index}")))
    }
}

/// Intro sequence: loader heading and loading page rise from below, the
/// loading page slides away, the loader hides and the first two pages fade
/// in. Returns the element the countdown writes into.
fn loader_intro(
    stage: &mut Stage,
    animator: &mut Animator,
    viewport: Viewport,
) -> TrailResult<ElementId> {
    let title = stage.select("loader-title")?;
    let loading_page = stage.select("loading-page")?;
    let loader = stage.select("loader")?;
    let content = stage.select("content")?;
    let page1 = stage.select("page1")?;
    let page2 = stage.select("page2")?;

    let rise = 0.8 * viewport.height;
    for el in [title, loading_page] {
        let timeline = Timeline::new()
            .set(
                0.0,
                vec![
                    ChannelTarget::to(Channel::Opacity, 1.0),
                    ChannelTarget::to(Channel::Y, rise),
                ],
                None,
            )
            .to(
                1.0,
                TweenSpec::new(1.5, Ease::OutQuad, vec![ChannelTarget::to(Channel::Y, 0.0)]),
            );
        animator.schedule(el, timeline)?;
    }

    // The loading page slides up by 26% of its own height once risen.
    let slide_up = -0.26 * stage.element(loading_page).rect.height();
    animator.schedule(
        loading_page,
        Timeline::new().to(
            2.5,
            TweenSpec::new(
                DEFAULT_TWEEN_SECS,
                Ease::OutQuad,
                vec![ChannelTarget::to(Channel::Y, slide_up)],
            ),
        ),
    )?;

    // Hide the loader chrome, then fade the first pages in.
    for el in [loader, content] {
        animator.schedule(
            el,
            Timeline::new().set(3.0, vec![ChannelTarget::to(Channel::Opacity, 0.0)], None),
        )?;
    }
    for (el, at) in [(page1, 3.0), (page2, 3.5)] {
        animator.schedule(
            el,
            Timeline::new().to(
                at,
                TweenSpec::new(
                    DEFAULT_TWEEN_SECS,
                    Ease::OutQuad,
                    vec![ChannelTarget::to(Channel::Opacity, 1.0)],
                ),
            ),
        )?;
    }

    Ok(title)
}

/// Alternating parallax: even slides drift left by 15% of their width, odd
/// slides right by 10%, scrubbed against the second page's top edge.
fn parallax_slides(
    stage: &mut Stage,
    observer: &mut ScrollObserver,
    viewport: Viewport,
) -> TrailResult<()> {
    let page2 = stage.select("page2")?;
    let slides = stage.select_all("slide-");
    if slides.is_empty() {
        return Err(TrailError::stage("no slide elements for parallax"));
    }

    let line = stage.element(page2).rect.y0 - 0.02 * viewport.height;
    let range = ScrollRange::new(line, line)?;

    for (index, slide) in slides.into_iter().enumerate() {
        let width = stage.element(slide).rect.width();
        let shift = if index % 2 == 0 {
            -0.15 * width
        } else {
            0.10 * width
        };
        let scrub = ScrubTween::new(
            stage,
            slide,
            &[
                ChannelTarget::to(Channel::X, shift),
                ChannelTarget::to(Channel::Scale, 1.0),
            ],
        );
        observer.add(ScrollTrigger::new(
            page2,
            range,
            Some(3.0),
            false,
            TriggerAction::Scrub(scrub),
        ));
    }
    Ok(())
}

/// Pinned numeric counter: four digit columns roll up by fixed offsets the
/// first time the counter scrolls into view, plus a pinned heading.
fn digit_roll(
    stage: &mut Stage,
    observer: &mut ScrollObserver,
    viewport: Viewport,
) -> TrailResult<()> {
    let counter = stage.select("counter")?;
    let heading = stage.select("heading")?;

    const ROLLS: [f64; 4] = [1990.0, 2240.0, 1990.0, 250.0];
    let mut timelines = Vec::with_capacity(ROLLS.len());
    for (index, roll) in ROLLS.iter().enumerate() {
        let digit = stage.select(&format!("digit-{index}"))?;
        timelines.push((
            digit,
            Timeline::new().to(
                0.0,
                TweenSpec::new(
                    4.0,
                    Ease::InOutQuart,
                    vec![ChannelTarget::by(Channel::Y, -roll)],
                ),
            ),
        ));
    }

    let line = stage.element(counter).rect.y0 - 0.85 * viewport.height;
    observer.add(ScrollTrigger::new(
        counter,
        ScrollRange::new(line, line)?,
        None,
        true,
        TriggerAction::EnterOnce(timelines),
    ));

    let heading_rect = stage.element(heading).rect;
    observer.add(ScrollTrigger::new(
        heading,
        ScrollRange::new(
            heading_rect.y0 - 0.75 * viewport.height,
            heading_rect.y1 - 0.21 * viewport.height,
        )?,
        None,
        true,
        TriggerAction::PinOnly,
    ));
    Ok(())
}

fn hover_overlays(stage: &Stage) -> TrailResult<Vec<HoverOverlay>> {
    let overlays = stage.select_all("overlay-");
    if overlays.is_empty() {
        return Err(TrailError::stage("no overlay elements for hover effect"));
    }
    Ok(overlays
        .into_iter()
        .map(|overlay| HoverOverlay {
            overlay,
            width: stage.element(overlay).rect.width(),
        })
        .collect())
}

/// Endless attention bounce on the scroll arrow: squash to half height,
/// yoyo back, short pause between cycles.
fn arrow_bounce(stage: &mut Stage, animator: &mut Animator) -> TrailResult<()> {
    let arrow = stage.select("page5-arrow")?;
    let spec = TweenSpec::new(
        1.0,
        Ease::OutQuad,
        vec![ChannelTarget::to(Channel::ScaleY, 0.5)],
    )
    .repeating(true, 0.2);
    animator.schedule(arrow, Timeline::new().to(0.0, spec))
}

/// Clip reveal on the showcase container: plays once on enter while the
/// container is pinned over a short scroll window.
fn clip_reveal(
    stage: &mut Stage,
    observer: &mut ScrollObserver,
    viewport: Viewport,
) -> TrailResult<()> {
    let container = stage.select("container")?;
    let start = stage.element(container).rect.y0 - 0.10 * viewport.height;
    let timeline = Timeline::new().to(
        0.0,
        TweenSpec::new(
            DEFAULT_TWEEN_SECS,
            Ease::OutQuad,
            vec![ChannelTarget::to(Channel::Progress, 1.0)],
        ),
    );
    observer.add(ScrollTrigger::new(
        container,
        ScrollRange::new(start, start + 0.30 * viewport.height)?,
        None,
        true,
        TriggerAction::EnterOnce(vec![(container, timeline)]),
    ));
    Ok(())
}

/// Slow zoom on the showcase image, scrubbed across its whole pass through
/// the viewport.
fn zoom_scrub(
    stage: &mut Stage,
    observer: &mut ScrollObserver,
    viewport: Viewport,
) -> TrailResult<()> {
    let image = stage.select("zoom-image")?;
    let rect = stage.element(image).rect;
    let scrub = ScrubTween::new(stage, image, &[ChannelTarget::to(Channel::Scale, 2.0)]);
    observer.add(ScrollTrigger::new(
        image,
        ScrollRange::new(rect.y0 - viewport.height, rect.y1 + viewport.height)?,
        Some(3.0),
        false,
        TriggerAction::Scrub(scrub),
    ));
    Ok(())
}

/// Footer clip shape, scrubbed around the footer's center line.
fn footer_clip(
    stage: &mut Stage,
    observer: &mut ScrollObserver,
    viewport: Viewport,
) -> TrailResult<()> {
    let footer = stage.select("footer")?;
    let footer_div = stage.select("footer-div")?;
    let rect = stage.element(footer).rect;
    let line = rect.y0 + rect.height() / 2.0 - viewport.height / 2.0;
    let scrub = ScrubTween::new(stage, footer_div, &[ChannelTarget::to(Channel::Progress, 1.0)]);
    observer.add(ScrollTrigger::new(
        footer,
        ScrollRange::new(line, line)?,
        Some(3.0),
        false,
        TriggerAction::Scrub(scrub),
    ));
    Ok(())
}
