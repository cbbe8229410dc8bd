//! Scripted headless runs: a `Scenario` declares the viewport, the image
//! pool and timestamped pointer/scroll samples; `run` replays it through an
//! `Engine` at a fixed frame rate and reports every reveal that fired.

use crate::{
    error::{TrailError, TrailResult},
    geom::{Rect, Viewport},
    input::PointerEvent,
    scheduler::Engine,
    stage::Stage,
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageDecl {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ImageDecl {
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size((self.x, self.y), (self.width, self.height))
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct PointerSample {
    pub t: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct ScrollSample {
    pub t: f64,
    pub y: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Scenario {
    pub viewport: Viewport,
    pub fps: f64,
    pub duration_secs: f64,
    pub images: Vec<ImageDecl>,
    #[serde(default)]
    pub pointer: Vec<PointerSample>,
    #[serde(default)]
    pub scroll: Vec<ScrollSample>,
}

impl Scenario {
    pub fn validate(&self) -> TrailResult<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(TrailError::validation("scenario fps must be > 0"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(TrailError::validation("scenario duration must be > 0"));
        }
        if self.images.is_empty() {
            return Err(TrailError::validation(
                "scenario needs at least one trail image",
            ));
        }
        for img in &self.images {
            if img.width <= 0.0 || img.height <= 0.0 {
                return Err(TrailError::validation(format!(
                    "image '{}' must have positive size",
                    img.name
                )));
            }
        }
        if !self.pointer.windows(2).all(|w| w[0].t <= w[1].t) {
            return Err(TrailError::validation(
                "pointer samples must be sorted by time",
            ));
        }
        if !self.scroll.windows(2).all(|w| w[0].t <= w[1].t) {
            return Err(TrailError::validation(
                "scroll samples must be sorted by time",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct RevealRecord {
    pub t: f64,
    pub image_index: usize,
    pub z_index: i32,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Report {
    pub frames: u64,
    pub reveals: Vec<RevealRecord>,
    pub final_img_position: usize,
    pub final_z_index: i32,
    pub idle: bool,
}

/// Replay `scenario` frame by frame and collect the reveal log.
#[tracing::instrument(skip(scenario))]
pub fn run(scenario: &Scenario) -> TrailResult<Report> {
    scenario.validate()?;

    let mut stage = Stage::new();
    for img in &scenario.images {
        stage.insert_image(img.name.as_str(), img.rect());
    }

    let mut engine = Engine::new(stage, scenario.viewport);
    for id in engine.trail_images() {
        engine.mark_image_loaded(id)?;
    }

    let dt = 1.0 / scenario.fps;
    let frames = (scenario.duration_secs * scenario.fps).ceil() as u64;
    let mut pointer = scenario.pointer.iter().peekable();
    let mut scroll = scenario.scroll.iter().peekable();
    let mut reveals = Vec::new();

    for frame in 0..frames {
        let now = frame as f64 * dt;
        while let Some(sample) = pointer.peek()
            && sample.t <= now
        {
            engine.handle_pointer(&PointerEvent::at_page(sample.x, sample.y));
            pointer.next();
        }
        while let Some(sample) = scroll.peek()
            && sample.t <= now
        {
            engine.handle_scroll(sample.y);
            scroll.next();
        }

        if let Some(reveal) = engine.step(dt)? {
            reveals.push(RevealRecord {
                t: now,
                image_index: reveal.image_index,
                z_index: reveal.z_index,
                x: reveal.at.x,
                y: reveal.at.y,
            });
        }
    }

    let trail = engine
        .trail()
        .ok_or_else(|| TrailError::animation("trail was never constructed"))?;
    let report = Report {
        frames,
        reveals,
        final_img_position: trail.img_position(),
        final_z_index: trail.z_index_val(),
        idle: engine.is_idle(),
    };
    tracing::info!(
        frames = report.frames,
        reveals = report.reveals.len(),
        "scenario finished"
    );
    Ok(report)
}
