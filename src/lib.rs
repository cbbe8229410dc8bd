#![forbid(unsafe_code)]

pub mod driver;
pub mod ease;
pub mod effects;
pub mod error;
pub mod geom;
pub mod input;
pub mod preload;
pub mod scenario;
pub mod scheduler;
pub mod scroll;
pub mod stage;
pub mod trail;
pub mod tween;

pub use driver::AnimationDriver;
pub use ease::Ease;
pub use effects::{Countdown, HoverOverlay, SiteEffects};
pub use error::{TrailError, TrailResult};
pub use geom::{Point, Rect, Vec2, Viewport, distance, lerp};
pub use input::{FrameCtx, PointerEvent, PointerState, ScrollOffsets};
pub use preload::Preloader;
pub use scenario::{Report, RevealRecord, Scenario};
pub use scheduler::{CancelHandle, Engine, FrameLoop};
pub use scroll::{ScrollObserver, ScrollRange, ScrollTrigger, ScrubTween, TriggerAction};
pub use stage::{Channel, Element, ElementId, Stage};
pub use trail::{ImageTrail, REVEAL_THRESHOLD, Reveal, TrailImage};
pub use tween::{Animator, ChannelTarget, Repeat, Timeline, TweenSpec};
