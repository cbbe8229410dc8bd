use crate::{
    ease::Ease,
    error::{TrailError, TrailResult},
    geom::lerp,
    stage::{Channel, ElementId, Stage},
};

/// One animated channel endpoint. `relative` targets are resolved against
/// the channel's value at activation time (the `+=` form).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChannelTarget {
    pub channel: Channel,
    pub value: f64,
    pub relative: bool,
}

impl ChannelTarget {
    pub fn to(channel: Channel, value: f64) -> Self {
        Self {
            channel,
            value,
            relative: false,
        }
    }

    pub fn by(channel: Channel, delta: f64) -> Self {
        Self {
            channel,
            value: delta,
            relative: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Repeat {
    None,
    /// Endless repetition; with `yoyo` every other cycle plays backwards.
    Infinite { yoyo: bool, delay: f64 },
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TweenSpec {
    pub duration: f64, // seconds
    pub ease: Ease,
    pub targets: Vec<ChannelTarget>,
    pub repeat: Repeat,
}

impl TweenSpec {
    pub fn new(duration: f64, ease: Ease, targets: Vec<ChannelTarget>) -> Self {
        Self {
            duration,
            ease,
            targets,
            repeat: Repeat::None,
        }
    }

    pub fn repeating(mut self, yoyo: bool, delay: f64) -> Self {
        self.repeat = Repeat::Infinite { yoyo, delay };
        self
    }

    pub fn validate(&self) -> TrailResult<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(TrailError::validation("tween duration must be > 0"));
        }
        if self.targets.is_empty() {
            return Err(TrailError::validation(
                "tween must target at least one channel",
            ));
        }
        if let Repeat::Infinite { delay, .. } = self.repeat
            && (!delay.is_finite() || delay < 0.0)
        {
            return Err(TrailError::validation("repeat delay must be >= 0"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub enum TimelineEntry {
    /// Instant property write, optionally stamping a z-index.
    Set {
        at: f64,
        values: Vec<ChannelTarget>,
        z_index: Option<i32>,
    },
    /// Eased interpolation starting at `at`.
    To { at: f64, spec: TweenSpec },
}

impl TimelineEntry {
    fn at(&self) -> f64 {
        match self {
            Self::Set { at, .. } | Self::To { at, .. } => *at,
        }
    }
}

/// Entries positioned at time offsets from the timeline's start, the same
/// shape a positioned tween timeline has in the host animation engines.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, at: f64, values: Vec<ChannelTarget>, z_index: Option<i32>) -> Self {
        self.entries.push(TimelineEntry::Set { at, values, z_index });
        self
    }

    pub fn to(mut self, at: f64, spec: TweenSpec) -> Self {
        self.entries.push(TimelineEntry::To { at, spec });
        self
    }

    pub fn validate(&self) -> TrailResult<()> {
        if self.entries.is_empty() {
            return Err(TrailError::validation("timeline has no entries"));
        }
        for entry in &self.entries {
            if !entry.at().is_finite() || entry.at() < 0.0 {
                return Err(TrailError::validation(
                    "timeline entry offset must be >= 0",
                ));
            }
            if let TimelineEntry::To { spec, .. } = entry {
                spec.validate()?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct ChannelState {
    channel: Channel,
    from: f64,
    to: f64,
}

#[derive(Clone, Debug)]
struct ActiveTween {
    element: ElementId,
    start: f64, // animator clock seconds
    duration: f64,
    ease: Ease,
    repeat: Repeat,
    channels: Vec<ChannelState>,
}

impl ActiveTween {
    /// Eased progress at `time`, plus whether the tween has finished.
    fn progress(&self, time: f64) -> (f64, bool) {
        let elapsed = (time - self.start).max(0.0);
        match self.repeat {
            Repeat::None => {
                let t = (elapsed / self.duration).min(1.0);
                (t, elapsed >= self.duration)
            }
            Repeat::Infinite { yoyo, delay } => {
                let cycle = self.duration + delay;
                let k = (elapsed / cycle).floor();
                let within = (elapsed - k * cycle).min(self.duration);
                let mut t = within / self.duration;
                if yoyo && (k as u64) % 2 == 1 {
                    t = 1.0 - t;
                }
                (t, false)
            }
        }
    }
}

#[derive(Clone, Debug)]
struct Pending {
    element: ElementId,
    fire_at: f64,
    entry: TimelineEntry,
}

/// Deterministic tween scheduler.
///
/// Tweens capture their start values lazily, at activation time, and a
/// later-activated tween steals any channels it shares with an earlier one
/// on the same element (last reveal wins per channel). `tick` replays
/// activations in time order so results do not depend on the tick size.
#[derive(Clone, Debug, Default)]
pub struct Animator {
    clock: f64,
    pending: Vec<Pending>, // sorted by fire_at, FIFO among equal times
    active: Vec<ActiveTween>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.clock
    }

    /// Queue a timeline against `element`, offsets relative to the current
    /// clock. Entries apply on subsequent `tick` calls.
    pub fn schedule(&mut self, element: ElementId, timeline: Timeline) -> TrailResult<()> {
        timeline.validate()?;
        for entry in timeline.entries {
            let fire_at = self.clock + entry.at();
            let pending = Pending {
                element,
                fire_at,
                entry,
            };
            let idx = self
                .pending
                .partition_point(|p| p.fire_at <= pending.fire_at);
            self.pending.insert(idx, pending);
        }
        Ok(())
    }

    /// Apply property values immediately, outside any timeline.
    pub fn set_now(
        &mut self,
        stage: &mut Stage,
        element: ElementId,
        values: &[ChannelTarget],
        z_index: Option<i32>,
    ) {
        apply_set(stage, element, values, z_index);
    }

    /// Drop all pending and in-flight work on `element`.
    pub fn kill_tweens_of(&mut self, element: ElementId) {
        self.pending.retain(|p| p.element != element);
        self.active.retain(|t| t.element != element);
    }

    /// True while `element` has scheduled or in-flight tweens.
    pub fn is_tweening(&self, element: ElementId) -> bool {
        self.active.iter().any(|t| t.element == element)
            || self.pending.iter().any(|p| p.element == element)
    }

    /// Advance the clock by `dt` seconds, activating due entries in time
    /// order and interpolating active tweens.
    pub fn tick(&mut self, stage: &mut Stage, dt: f64) {
        let target = self.clock + dt.max(0.0);
        while let Some(fire_at) = self.pending.first().map(|p| p.fire_at)
            && fire_at <= target
        {
            // Bring in-flight tweens up to the activation instant first so a
            // newly captured `from` sees the mid-flight value.
            self.evaluate_active(stage, fire_at);
            let pending = self.pending.remove(0);
            self.activate(stage, pending);
        }
        self.evaluate_active(stage, target);
        self.clock = target;
    }

    fn activate(&mut self, stage: &mut Stage, pending: Pending) {
        match pending.entry {
            TimelineEntry::Set { values, z_index, .. } => {
                apply_set(stage, pending.element, &values, z_index);
            }
            TimelineEntry::To { spec, .. } => {
                let element = pending.element;
                let channels: Vec<ChannelState> = spec
                    .targets
                    .iter()
                    .map(|t| {
                        let from = stage.element(element).channel(t.channel);
                        let to = if t.relative { from + t.value } else { t.value };
                        ChannelState {
                            channel: t.channel,
                            from,
                            to,
                        }
                    })
                    .collect();

                // Channel overwrite: the newcomer owns its channels.
                for tween in &mut self.active {
                    if tween.element == element {
                        tween
                            .channels
                            .retain(|c| !channels.iter().any(|n| n.channel == c.channel));
                    }
                }
                self.active.retain(|t| !t.channels.is_empty());

                self.active.push(ActiveTween {
                    element,
                    start: pending.fire_at,
                    duration: spec.duration,
                    ease: spec.ease,
                    repeat: spec.repeat,
                    channels,
                });
            }
        }
    }

    fn evaluate_active(&mut self, stage: &mut Stage, time: f64) {
        self.active.retain_mut(|tween| {
            let (t, finished) = tween.progress(time);
            let eased = tween.ease.apply(t);
            let element = stage.element_mut(tween.element);
            for c in &tween.channels {
                element.set_channel(c.channel, lerp(c.from, c.to, eased));
            }
            !finished
        });
    }
}

fn apply_set(stage: &mut Stage, element: ElementId, values: &[ChannelTarget], z_index: Option<i32>) {
    let element = stage.element_mut(element);
    for t in values {
        let resolved = if t.relative {
            element.channel(t.channel) + t.value
        } else {
            t.value
        };
        element.set_channel(t.channel, resolved);
    }
    if let Some(z) = z_index {
        element.z_index = z;
    }
}
