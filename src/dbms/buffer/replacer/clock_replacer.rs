use parking_lot::Mutex;

use crate::dbms::types::FrameId;

use super::buffer_pool_replacer::{check_frame_range, BufferPoolReplacerError, IBufferPoolReplacer};

#[derive(Debug, PartialEq, Clone)]
enum ClockFrameStatus {
    /// Not tracked
    Empty,
    /// Tracked, reference bit cleared by a sweep
    Untouched,
    /// Tracked, reference bit set
    Accessed,
}

struct ClockState {
    clock_hand: usize,
    frame_status: Vec<ClockFrameStatus>,
}

/// Second-chance replacer: the hand sweeps the frames, demoting referenced
/// ones and evicting the first one found unreferenced.
pub struct ClockReplacer {
    size: usize,
    state: Mutex<ClockState>,
}

impl ClockReplacer {
    /// Creates a new [`ClockReplacer`].
    pub fn new(size: usize) -> Self {
        ClockReplacer {
            size,
            state: Mutex::new(ClockState {
                clock_hand: 0,
                frame_status: vec![ClockFrameStatus::Empty; size],
            }),
        }
    }
}

fn tracked(frame_status: &[ClockFrameStatus]) -> usize {
    frame_status
        .iter()
        .filter(|status| **status != ClockFrameStatus::Empty)
        .count()
}

impl IBufferPoolReplacer for ClockReplacer {
    fn insert(&self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError> {
        check_frame_range(frame_id, self.size)?;

        self.state.lock().frame_status[frame_id] = ClockFrameStatus::Accessed;
        Ok(())
    }

    fn victim(&self) -> Result<Option<FrameId>, BufferPoolReplacerError> {
        let mut state = self.state.lock();
        if tracked(&state.frame_status) == 0 {
            return Ok(None);
        }

        // Terminates within two sweeps: the first demotes every tracked frame
        let mut victim = None;
        while victim.is_none() {
            let hand = state.clock_hand;
            match state.frame_status[hand] {
                ClockFrameStatus::Empty => {}
                ClockFrameStatus::Untouched => {
                    victim = Some(hand);
                }
                ClockFrameStatus::Accessed => {
                    state.frame_status[hand] = ClockFrameStatus::Untouched;
                }
            }
            state.clock_hand = (hand + 1) % self.size;
        }

        if let Some(idx) = victim {
            state.frame_status[idx] = ClockFrameStatus::Empty;
        }

        Ok(victim)
    }

    fn erase(&self, frame_id: FrameId) -> Result<bool, BufferPoolReplacerError> {
        check_frame_range(frame_id, self.size)?;

        let mut state = self.state.lock();
        let was_tracked = state.frame_status[frame_id] != ClockFrameStatus::Empty;
        state.frame_status[frame_id] = ClockFrameStatus::Empty;
        Ok(was_tracked)
    }

    fn size(&self) -> Result<usize, BufferPoolReplacerError> {
        Ok(tracked(&self.state.lock().frame_status))
    }
}
