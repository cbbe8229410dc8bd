//! Scroll-position observers: each trigger maps the page scroll offset onto
//! a 0..1 progress, optionally smoothed ("scrub"), and either drives style
//! channels directly or fires a one-shot timeline on first entry.

use crate::{
    error::{TrailError, TrailResult},
    geom::lerp,
    stage::{Channel, ElementId, Stage},
    tween::{Animator, ChannelTarget, Timeline},
};

/// Scroll offsets (page y, px) bounding a trigger. `start == end` behaves
/// as a step: progress snaps from 0 to 1 when the line is crossed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollRange {
    pub start: f64,
    pub end: f64,
}

impl ScrollRange {
    pub fn new(start: f64, end: f64) -> TrailResult<Self> {
        if !(start.is_finite() && end.is_finite()) {
            return Err(TrailError::validation("scroll range must be finite"));
        }
        if end < start {
            return Err(TrailError::validation("scroll range end must be >= start"));
        }
        Ok(Self { start, end })
    }

    fn progress(self, y: f64) -> f64 {
        if self.end > self.start {
            ((y - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
        } else if y >= self.start {
            1.0
        } else {
            0.0
        }
    }

    fn contains(self, y: f64) -> bool {
        self.start <= y && y <= self.end
    }
}

#[derive(Clone, Copy, Debug)]
struct ScrubChannel {
    channel: Channel,
    from: f64,
    to: f64,
}

/// Progress-driven interpolation of style channels on one element.
#[derive(Clone, Debug)]
pub struct ScrubTween {
    element: ElementId,
    channels: Vec<ScrubChannel>,
}

impl ScrubTween {
    /// Endpoints are captured from the element's current style, so a scrub
    /// registered at startup animates away from the resting layout.
    pub fn new(stage: &Stage, element: ElementId, targets: &[ChannelTarget]) -> Self {
        let channels = targets
            .iter()
            .map(|t| {
                let from = stage.element(element).channel(t.channel);
                let to = if t.relative { from + t.value } else { t.value };
                ScrubChannel {
                    channel: t.channel,
                    from,
                    to,
                }
            })
            .collect();
        Self { element, channels }
    }

    fn apply(&self, stage: &mut Stage, progress: f64) {
        let element = stage.element_mut(self.element);
        for c in &self.channels {
            element.set_channel(c.channel, lerp(c.from, c.to, progress));
        }
    }
}

#[derive(Clone, Debug)]
pub enum TriggerAction {
    /// Interpolate channels with the trigger's progress.
    Scrub(ScrubTween),
    /// Fire these timelines once, the first time the trigger is entered.
    EnterOnce(Vec<(ElementId, Timeline)>),
    /// Pin only; no animation.
    PinOnly,
}

#[derive(Clone, Debug)]
pub struct ScrollTrigger {
    pub trigger: ElementId,
    pub range: ScrollRange,
    /// Smoothing time constant in seconds; `None` tracks scroll exactly.
    pub scrub: Option<f64>,
    pub pin: bool,
    pub action: TriggerAction,
    entered: bool,
    progress: f64,
}

impl ScrollTrigger {
    pub fn new(
        trigger: ElementId,
        range: ScrollRange,
        scrub: Option<f64>,
        pin: bool,
        action: TriggerAction,
    ) -> Self {
        Self {
            trigger,
            range,
            scrub,
            pin,
            action,
            entered: false,
            progress: 0.0,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }
}

/// Owns the registered triggers and the current scroll offset.
#[derive(Clone, Debug, Default)]
pub struct ScrollObserver {
    triggers: Vec<ScrollTrigger>,
    scroll_y: f64,
}

impl ScrollObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, trigger: ScrollTrigger) {
        self.triggers.push(trigger);
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y;
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn triggers(&self) -> &[ScrollTrigger] {
        &self.triggers
    }

    /// Advance every trigger one frame.
    pub fn tick(&mut self, stage: &mut Stage, animator: &mut Animator, dt: f64) -> TrailResult<()> {
        let y = self.scroll_y;
        for tr in &mut self.triggers {
            let target = tr.range.progress(y);
            tr.progress = match tr.scrub {
                Some(s) if s > 0.0 => {
                    let factor = (dt / s).clamp(0.0, 1.0);
                    lerp(tr.progress, target, factor)
                }
                _ => target,
            };

            if tr.pin {
                stage.element_mut(tr.trigger).pinned = tr.range.contains(y);
            }

            if target > 0.0 && !tr.entered {
                tr.entered = true;
                if let TriggerAction::EnterOnce(timelines) = &tr.action {
                    for (element, timeline) in timelines {
                        animator.schedule(*element, timeline.clone())?;
                    }
                }
            }

            if let TriggerAction::Scrub(scrub) = &tr.action {
                scrub.apply(stage, tr.progress);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ease::Ease,
        geom::{Point, Rect},
        tween::TweenSpec,
    };

    fn rig() -> (Stage, Animator, ElementId) {
        let mut stage = Stage::new();
        let id = stage.insert(
            "zoom-image",
            Rect::from_origin_size(Point::new(0.0, 2000.0), (400.0, 300.0)),
        );
        (stage, Animator::new(), id)
    }

    #[test]
    fn progress_maps_scroll_offset_into_range() {
        let range = ScrollRange::new(100.0, 300.0).unwrap();
        assert_eq!(range.progress(0.0), 0.0);
        assert_eq!(range.progress(200.0), 0.5);
        assert_eq!(range.progress(900.0), 1.0);
    }

    #[test]
    fn degenerate_range_acts_as_step() {
        let range = ScrollRange::new(150.0, 150.0).unwrap();
        assert_eq!(range.progress(149.0), 0.0);
        assert_eq!(range.progress(150.0), 1.0);
    }

    #[test]
    fn unscrubbed_scrub_tween_tracks_scroll_exactly() {
        let (mut stage, mut animator, id) = rig();
        let scrub = ScrubTween::new(&stage, id, &[ChannelTarget::to(Channel::Scale, 2.0)]);
        let mut observer = ScrollObserver::new();
        observer.add(ScrollTrigger::new(
            id,
            ScrollRange::new(0.0, 100.0).unwrap(),
            None,
            false,
            TriggerAction::Scrub(scrub),
        ));

        observer.scroll_to(50.0);
        observer.tick(&mut stage, &mut animator, 1.0 / 60.0).unwrap();
        assert_eq!(stage.element(id).channel(Channel::Scale), 1.5);
    }

    #[test]
    fn scrubbed_progress_lags_then_settles() {
        let (mut stage, mut animator, id) = rig();
        let scrub = ScrubTween::new(&stage, id, &[ChannelTarget::to(Channel::Scale, 2.0)]);
        let mut observer = ScrollObserver::new();
        observer.add(ScrollTrigger::new(
            id,
            ScrollRange::new(0.0, 100.0).unwrap(),
            Some(0.5),
            false,
            TriggerAction::Scrub(scrub),
        ));

        observer.scroll_to(100.0);
        observer.tick(&mut stage, &mut animator, 0.25).unwrap();
        let mid = stage.element(id).channel(Channel::Scale);
        assert!(mid > 1.0 && mid < 2.0, "scrub should lag: {mid}");

        for _ in 0..200 {
            observer.tick(&mut stage, &mut animator, 0.25).unwrap();
        }
        let settled = stage.element(id).channel(Channel::Scale);
        assert!((settled - 2.0).abs() < 1e-6);
    }

    #[test]
    fn enter_once_fires_a_single_time() {
        let (mut stage, mut animator, id) = rig();
        let timeline = Timeline::new().to(
            0.0,
            TweenSpec::new(1.0, Ease::Linear, vec![ChannelTarget::by(Channel::Y, -250.0)]),
        );
        let mut observer = ScrollObserver::new();
        observer.add(ScrollTrigger::new(
            id,
            ScrollRange::new(100.0, 100.0).unwrap(),
            None,
            true,
            TriggerAction::EnterOnce(vec![(id, timeline)]),
        ));

        observer.scroll_to(120.0);
        observer.tick(&mut stage, &mut animator, 1.0 / 60.0).unwrap();
        animator.tick(&mut stage, 1.0);
        assert_eq!(stage.element(id).channel(Channel::Y), -250.0);

        // Leaving and re-entering must not re-fire.
        observer.scroll_to(0.0);
        observer.tick(&mut stage, &mut animator, 1.0 / 60.0).unwrap();
        observer.scroll_to(120.0);
        observer.tick(&mut stage, &mut animator, 1.0 / 60.0).unwrap();
        animator.tick(&mut stage, 1.0);
        assert_eq!(stage.element(id).channel(Channel::Y), -250.0);
    }

    #[test]
    fn pin_follows_the_range() {
        let (mut stage, mut animator, id) = rig();
        let mut observer = ScrollObserver::new();
        observer.add(ScrollTrigger::new(
            id,
            ScrollRange::new(100.0, 200.0).unwrap(),
            None,
            true,
            TriggerAction::PinOnly,
        ));

        observer.scroll_to(150.0);
        observer.tick(&mut stage, &mut animator, 1.0 / 60.0).unwrap();
        assert!(stage.element(id).pinned);

        observer.scroll_to(250.0);
        observer.tick(&mut stage, &mut animator, 1.0 / 60.0).unwrap();
        assert!(!stage.element(id).pinned);
    }
}
