use crate::error::{TrailError, TrailResult};

pub use kurbo::{Point, Rect, Vec2};

/// Window size in CSS pixels, replaced wholesale on resize.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> TrailResult<Self> {
        if !(width.is_finite() && height.is_finite()) {
            return Err(TrailError::validation("viewport size must be finite"));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(TrailError::validation("viewport width/height must be > 0"));
        }
        Ok(Self { width, height })
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    (1.0 - t) * a + t * b
}

pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_one_tenth_step() {
        assert_eq!(lerp(0.0, 100.0, 0.1), 10.0);
        assert_eq!(lerp(5.0, 5.0, 0.3), 5.0);
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Point::new(60.0, 0.0), Point::ORIGIN), 60.0);
    }

    #[test]
    fn viewport_rejects_degenerate_sizes() {
        assert!(Viewport::new(0.0, 600.0).is_err());
        assert!(Viewport::new(800.0, f64::NAN).is_err());
        assert!(Viewport::new(800.0, 600.0).is_ok());
    }
}
