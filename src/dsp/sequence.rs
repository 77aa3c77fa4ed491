//! Looping step sequence and its one-shot advance timer.

use crate::request::PlaybackRequest;

/// Called once per step with the request that just started sounding.
pub type StepCallback = Box<dyn FnMut(&PlaybackRequest)>;

/// An ordered, endlessly looping list of requests.
pub struct Sequence {
    requests: Vec<PlaybackRequest>,
    cursor: usize,
    step_frames: u64,
    on_step: StepCallback,
}

impl Sequence {
    /// Returns `None` for an empty list. `step_frames` is raised to at least 1.
    pub fn new(
        requests: Vec<PlaybackRequest>,
        step_frames: u64,
        on_step: StepCallback,
    ) -> Option<Self> {
        if requests.is_empty() {
            return None;
        }
        Some(Sequence {
            requests,
            cursor: 0,
            step_frames: step_frames.max(1),
            on_step,
        })
    }

    /// Take the request for the next step, wrapping after the last one.
    pub fn next_request(&mut self) -> PlaybackRequest {
        let request = self.requests[self.cursor];
        self.cursor = (self.cursor + 1) % self.requests.len();
        request
    }

    pub fn notify(&mut self, request: &PlaybackRequest) {
        (self.on_step)(request);
    }

    pub fn step_frames(&self) -> u64 {
        self.step_frames
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("requests", &self.requests)
            .field("cursor", &self.cursor)
            .field("step_frames", &self.step_frames)
            .finish_non_exhaustive()
    }
}

/// A pending one-shot deadline on the engine's frame clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTimer {
    due_frame: u64,
}

impl SequenceTimer {
    /// Arm for `delay_frames` after `now`. A deadline past the end of the
    /// clock is pinned to `u64::MAX`, i.e. never reached.
    pub fn arm(now: u64, delay_frames: u64) -> Self {
        SequenceTimer {
            due_frame: now.saturating_add(delay_frames),
        }
    }

    pub fn due_frame(&self) -> u64 {
        self.due_frame
    }

    pub fn is_due(&self, now: u64) -> bool {
        now >= self.due_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn req(hz: f64) -> PlaybackRequest {
        PlaybackRequest::plain(hz, 0.5).unwrap()
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(Sequence::new(Vec::new(), 100, Box::new(|_: &PlaybackRequest| {})).is_none());
    }

    #[test]
    fn wraps_in_order() {
        let mut seq = Sequence::new(
            vec![req(100.0), req(200.0), req(300.0)],
            10,
            Box::new(|_: &PlaybackRequest| {}),
        )
        .unwrap();
        let hz: Vec<f64> = (0..7).map(|_| seq.next_request().carrier_frequency()).collect();
        assert_eq!(hz, vec![100.0, 200.0, 300.0, 100.0, 200.0, 300.0, 100.0]);
    }

    #[test]
    fn notify_forwards_to_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut seq = Sequence::new(
            vec![req(528.0)],
            10,
            Box::new(move |r: &PlaybackRequest| sink.borrow_mut().push(r.carrier_frequency())),
        )
        .unwrap();
        let r = seq.next_request();
        seq.notify(&r);
        assert_eq!(*seen.borrow(), vec![528.0]);
    }

    #[test]
    fn zero_step_is_raised_to_one_frame() {
        let seq = Sequence::new(vec![req(100.0)], 0, Box::new(|_: &PlaybackRequest| {})).unwrap();
        assert_eq!(seq.step_frames(), 1);
    }

    #[test]
    fn timer_fires_at_deadline() {
        let t = SequenceTimer::arm(50, 100);
        assert_eq!(t.due_frame(), 150);
        assert!(!t.is_due(149));
        assert!(t.is_due(150));
    }

    #[test]
    fn huge_delay_saturates_instead_of_wrapping() {
        let t = SequenceTimer::arm(10, u64::MAX);
        assert_eq!(t.due_frame(), u64::MAX);
        assert!(!t.is_due(11));
        assert!(!t.is_due(u64::MAX - 1));
    }
}
