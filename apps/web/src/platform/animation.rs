//! Landing-page animations: stat counters and hero parallax.

use std::time::Duration;

pub const COUNTER_DURATION: Duration = Duration::from_millis(2000);
/// ~60 frames per second.
pub const COUNTER_TICK: Duration = Duration::from_millis(16);

const PARALLAX_FACTOR: f64 = 0.5;

/// Counts from 0 to `target` in equal steps, one per tick. Yields the rounded
/// value to display; the last value is always exactly `target`.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: f64,
    step: f64,
    current: f64,
    done: bool,
}

impl CounterAnimation {
    pub fn new(target: u32, duration: Duration, tick: Duration) -> Self {
        let frames = (duration.as_secs_f64() / tick.as_secs_f64()).max(1.0);
        Self {
            target: f64::from(target),
            step: f64::from(target) / frames,
            current: 0.0,
            done: false,
        }
    }
}

impl Iterator for CounterAnimation {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.done {
            return None;
        }
        self.current += self.step;
        if self.current >= self.target {
            self.current = self.target;
            self.done = true;
        }
        Some(self.current.round() as u32)
    }
}

/// CSS transform for the hero at the given scroll offset.
pub fn parallax_transform(scroll_offset: f64) -> String {
    format!("translateY({}px)", scroll_offset * PARALLAX_FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_ends_exactly_on_target() {
        let frames: Vec<u32> = CounterAnimation::new(1000, COUNTER_DURATION, COUNTER_TICK).collect();
        assert_eq!(*frames.last().unwrap(), 1000);
        assert_eq!(frames.len(), 125, "2000ms at 16ms per frame");
        assert!(frames.windows(2).all(|w| w[0] <= w[1]), "monotonic");
    }

    #[test]
    fn test_zero_target_finishes_immediately() {
        let frames: Vec<u32> = CounterAnimation::new(0, COUNTER_DURATION, COUNTER_TICK).collect();
        assert_eq!(frames, vec![0]);
    }

    #[test]
    fn test_parallax_moves_half_speed() {
        assert_eq!(parallax_transform(200.0), "translateY(100px)");
        assert_eq!(parallax_transform(15.0), "translateY(7.5px)");
    }
}
