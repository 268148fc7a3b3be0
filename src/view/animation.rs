//! Time-based interpolation for viewport transitions.
//!
//! The host drives animation from its own frame callback, passing a
//! monotonic timestamp into `sample`. Progress is a function of elapsed
//! time, never of frame count, so the result is frame-rate independent.
//! Cancellation is replacement: the viewport holds at most one `Tween` and
//! starting a new one drops the old.

/// Ease-out-cubic: fast start, gentle landing.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Values that can be linearly interpolated.
pub trait Lerp: Copy {
    fn lerp(self, other: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for crate::geom::Vec2 {
    #[inline]
    fn lerp(self, other: Self, t: f32) -> Self {
        crate::geom::Vec2::lerp(self, other, t)
    }
}

/// A single from→to interpolation over a fixed duration.
///
/// The start time latches on the first `sample` call, so a tween created in
/// an event handler starts counting from the next frame.
#[derive(Debug, Clone)]
pub struct Tween<T> {
    from: T,
    to: T,
    duration_ms: f64,
    started_at: Option<f64>,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            duration_ms,
            started_at: None,
        }
    }

    /// Where this tween is headed.
    pub fn target(&self) -> T {
        self.to
    }

    /// Eased value at `now_ms`; the bool is true once the tween is finished.
    ///
    /// A non-positive duration finishes immediately at the target value.
    pub fn sample(&mut self, now_ms: f64) -> (T, bool) {
        if self.duration_ms <= 0.0 {
            return (self.to, true);
        }
        let started = *self.started_at.get_or_insert(now_ms);
        let t = ((now_ms - started) / self.duration_ms).clamp(0.0, 1.0) as f32;
        let value = self.from.lerp(self.to, ease_out_cubic(t));
        (value, t >= 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec2;

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        // Ease-out: more than half done at the midpoint.
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn test_tween_latches_start_on_first_sample() {
        let mut tween = Tween::new(0.0f32, 100.0, 200.0);
        let (v, done) = tween.sample(1000.0);
        assert_eq!(v, 0.0);
        assert!(!done);

        let (v, done) = tween.sample(1200.0);
        assert_eq!(v, 100.0);
        assert!(done);
    }

    #[test]
    fn test_tween_is_time_based() {
        // Same elapsed time yields the same value regardless of how many
        // samples happened in between.
        let mut few = Tween::new(0.0f32, 100.0, 1000.0);
        few.sample(0.0);
        let (few_value, _) = few.sample(500.0);

        let mut many = Tween::new(0.0f32, 100.0, 1000.0);
        many.sample(0.0);
        for i in 1..50 {
            many.sample(i as f64 * 10.0);
        }
        let (many_value, _) = many.sample(500.0);

        assert!((few_value - many_value).abs() < 1e-4);
    }

    #[test]
    fn test_tween_clamps_past_end() {
        let mut tween = Tween::new(0.0f32, 10.0, 100.0);
        tween.sample(0.0);
        let (v, done) = tween.sample(10_000.0);
        assert_eq!(v, 10.0);
        assert!(done);
    }

    #[test]
    fn test_zero_duration_jumps_to_target() {
        let mut tween = Tween::new(Vec2::ZERO, Vec2::new(5.0, 5.0), 0.0);
        let (v, done) = tween.sample(123.0);
        assert_eq!(v, Vec2::new(5.0, 5.0));
        assert!(done);
    }

    #[test]
    fn test_vec2_tween_moves_both_axes() {
        let mut tween = Tween::new(Vec2::ZERO, Vec2::new(100.0, -50.0), 100.0);
        tween.sample(0.0);
        let (v, _) = tween.sample(50.0);
        assert!(v.x > 0.0 && v.x < 100.0);
        assert!(v.y < 0.0 && v.y > -50.0);
        let ratio = v.y / v.x;
        assert!((ratio + 0.5).abs() < 1e-4, "axes interpolate in lockstep");
    }
}
