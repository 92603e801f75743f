//! Frame pacing at the container's declared rate.

use std::time::{Duration, Instant};

/// Tracks when the next frame is due.
///
/// The playback context asks [`FramePacer::due`] on every display tick and
/// takes a frame only when it returns true. Deadlines advance by whole frame
/// durations so rounding does not drift; after a long pause the pacer
/// resynchronizes instead of bursting through the backlog.
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame_duration: Duration,
    next_deadline: Option<Instant>,
}

impl FramePacer {
    pub fn new(frame_duration: Duration) -> Self {
        Self {
            frame_duration,
            next_deadline: None,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Returns true if a new frame should be shown at `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.next_deadline else {
            self.next_deadline = Some(now + self.frame_duration);
            return true;
        };
        if now < deadline {
            return false;
        }
        let next = deadline + self.frame_duration;
        self.next_deadline = Some(if next <= now {
            now + self.frame_duration
        } else {
            next
        });
        true
    }

    /// Forget the schedule; the next call to [`FramePacer::due`] fires.
    pub fn reset(&mut self) {
        self.next_deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_due() {
        let mut pacer = FramePacer::new(Duration::from_millis(40));
        assert!(pacer.due(Instant::now()));
    }

    #[test]
    fn test_waits_for_frame_duration() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(Duration::from_millis(40));
        assert!(pacer.due(start));
        assert!(!pacer.due(start + Duration::from_millis(16)));
        assert!(!pacer.due(start + Duration::from_millis(39)));
        assert!(pacer.due(start + Duration::from_millis(41)));
        assert!(!pacer.due(start + Duration::from_millis(60)));
        assert!(pacer.due(start + Duration::from_millis(80)));
    }

    #[test]
    fn test_resync_after_pause() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(Duration::from_millis(40));
        assert!(pacer.due(start));
        let resumed = start + Duration::from_secs(5);
        assert!(pacer.due(resumed));
        assert!(!pacer.due(resumed + Duration::from_millis(1)));
    }

    #[test]
    fn test_reset() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(Duration::from_millis(40));
        assert!(pacer.due(start));
        pacer.reset();
        assert!(pacer.due(start + Duration::from_millis(1)));
    }
}
