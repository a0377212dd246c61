use super::types::Animation;
use crate::types::DEFAULT_TICKS_PER_SECOND;
use std::time::Instant;

/// Converts elapsed milliseconds into a looping animation time in ticks.
/// A tick rate of zero (or less) is replaced by `DEFAULT_TICKS_PER_SECOND`.
/// A clip with no duration always reports time 0.
///
/// Elapsed time is kept in f64 until it has been wrapped into the clip, so
/// the looped time stays fine grained however long the clock has run.
///
/// There is no blending at the loop point so a clip whose first and last
/// poses differ will jump when it wraps.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn animation_time(
    elapsed_millis: f64,
    ticks_per_second: f32,
    duration: f32,
) -> f32 {
    let ticks_per_second = if ticks_per_second > 0.0 {
        ticks_per_second
    } else {
        DEFAULT_TICKS_PER_SECOND
    };
    if duration <= 0.0 {
        return 0.0;
    }
    let ticks = elapsed_millis / 1000.0 * f64::from(ticks_per_second);
    (ticks % f64::from(duration)) as f32
}

/// Wall clock start point for a playing clip
#[derive(Clone, Copy, Debug)]
pub struct AnimationClock {
    start: Instant,
}

impl AnimationClock {
    #[must_use]
    pub const fn new(start: Instant) -> Self {
        Self { start }
    }

    /// Clock starting at the current instant
    #[must_use]
    pub fn now() -> Self {
        Self::new(Instant::now())
    }

    #[must_use]
    pub const fn start(&self) -> Instant {
        self.start
    }

    /// Milliseconds since the start. An instant before the start counts as 0.
    #[must_use]
    pub fn elapsed_millis(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.start).as_secs_f64() * 1000.0
    }

    /// Current looped time in ticks for `animation`
    #[must_use]
    pub fn animation_time(&self, now: Instant, animation: &Animation) -> f32 {
        animation_time(
            self.elapsed_millis(now),
            animation.ticks_per_second,
            animation.duration,
        )
    }
}
