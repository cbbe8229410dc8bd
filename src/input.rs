use crate::geom::{Point, Vec2, Viewport, lerp};

/// Smoothing factor applied once per frame when easing the cached pointer
/// position toward the raw one.
pub const POINTER_SMOOTH_FACTOR: f64 = 0.1;

/// Scroll offsets of the two scrolling roots, needed to convert client
/// coordinates into page coordinates for legacy event shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollOffsets {
    pub body: Vec2,
    pub document: Vec2,
}

/// One raw pointer-move event as delivered by the host.
///
/// Page coordinates win when present; otherwise client coordinates are
/// corrected by both scroll offsets.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PointerEvent {
    pub page: Option<Point>,
    pub client: Option<Point>,
    pub scroll: ScrollOffsets,
}

impl PointerEvent {
    pub fn at_page(x: f64, y: f64) -> Self {
        Self {
            page: Some(Point::new(x, y)),
            client: None,
            scroll: ScrollOffsets::default(),
        }
    }

    pub fn at_client(x: f64, y: f64, scroll: ScrollOffsets) -> Self {
        Self {
            page: None,
            client: Some(Point::new(x, y)),
            scroll,
        }
    }

    pub fn position(&self) -> Point {
        if let Some(page) = self.page {
            return page;
        }
        if let Some(client) = self.client {
            return Point::new(
                client.x + self.scroll.body.x + self.scroll.document.x,
                client.y + self.scroll.body.y + self.scroll.document.y,
            );
        }
        Point::ORIGIN
    }
}

/// The three pointer snapshots the trail loop works from.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerState {
    /// Latest raw position; last write wins between frames.
    pub mouse_pos: Point,
    /// Exponentially smoothed position, seeded on first use.
    cache_mouse_pos: Option<Point>,
    /// Position recorded at the most recent reveal.
    pub last_mouse_pos: Point,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &PointerEvent) {
        self.mouse_pos = event.position();
    }

    /// Euclidean distance travelled since the last reveal.
    pub fn travel(&self) -> f64 {
        crate::geom::distance(self.mouse_pos, self.last_mouse_pos)
    }

    /// Advance the smoothed position one step toward the raw one and return
    /// it. The cache is seeded from the raw position before first use.
    pub fn smooth(&mut self) -> Point {
        let prev = self.cache_mouse_pos.unwrap_or(self.mouse_pos);
        let next = Point::new(
            lerp(prev.x, self.mouse_pos.x, POINTER_SMOOTH_FACTOR),
            lerp(prev.y, self.mouse_pos.y, POINTER_SMOOTH_FACTOR),
        );
        self.cache_mouse_pos = Some(next);
        next
    }

    /// Snapshot the current position as the reveal anchor.
    pub fn mark_reveal(&mut self) {
        self.last_mouse_pos = self.mouse_pos;
    }
}

/// Explicit per-frame context handed to the trail controller, replacing
/// free-floating shared mouse/viewport state.
#[derive(Clone, Copy, Debug)]
pub struct FrameCtx {
    pub viewport: Viewport,
    pub pointer: PointerState,
}

impl FrameCtx {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pointer: PointerState::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_coordinates_win_over_client() {
        let ev = PointerEvent {
            page: Some(Point::new(10.0, 20.0)),
            client: Some(Point::new(99.0, 99.0)),
            scroll: ScrollOffsets::default(),
        };
        assert_eq!(ev.position(), Point::new(10.0, 20.0));
    }

    #[test]
    fn client_coordinates_add_both_scroll_offsets() {
        let ev = PointerEvent::at_client(
            10.0,
            20.0,
            ScrollOffsets {
                body: Vec2::new(1.0, 2.0),
                document: Vec2::new(100.0, 200.0),
            },
        );
        assert_eq!(ev.position(), Point::new(111.0, 222.0));
    }

    #[test]
    fn smooth_seeds_from_raw_position() {
        let mut state = PointerState::new();
        state.apply(&PointerEvent::at_page(40.0, 80.0));
        // First step: cache starts at the raw position, so lerp is a no-op.
        assert_eq!(state.smooth(), Point::new(40.0, 80.0));
    }

    #[test]
    fn smooth_steps_one_tenth_toward_raw() {
        let mut state = PointerState::new();
        state.apply(&PointerEvent::at_page(0.0, 0.0));
        state.smooth();
        state.apply(&PointerEvent::at_page(100.0, 0.0));
        assert_eq!(state.smooth(), Point::new(10.0, 0.0));
    }

    #[test]
    fn travel_measures_from_last_reveal() {
        let mut state = PointerState::new();
        state.apply(&PointerEvent::at_page(60.0, 0.0));
        assert_eq!(state.travel(), 60.0);

        state.mark_reveal();
        assert_eq!(state.travel(), 0.0);

        state.apply(&PointerEvent::at_page(90.0, 0.0));
        assert_eq!(state.travel(), 30.0);
    }
}
