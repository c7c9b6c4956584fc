// SPDX-License-Identifier: GPL-3.0-only

//! The capture event queue: a set-of-flags queue with a fixed priority pop
//! order (spec.md §3).

/// A capture event, as reported by a [`CaptureBackend`](super::backend::CaptureBackend).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    None,
    Sleep,
    NewFrame,
    NewVideoMode,
    SignalLost,
    SignalGained,
    InvalidSignal,
    InvalidDevice,
    UnrecoverableError,
}

/// All event tags, used to size the flag array and to define priority order.
///
/// Priority order for pop (highest first): `UnrecoverableError ->
/// NewVideoMode -> SignalLost -> InvalidSignal -> NewFrame -> (Sleep or
/// None)`. `InvalidDevice` and `SignalGained` are not named in spec.md's
/// priority chain; they're placed immediately below `InvalidSignal` and
/// above `NewFrame`, consistent with both being "signal state" events that
/// should be observed before a stale frame is acted on.
const PRIORITY_ORDER: [CaptureEvent; 9] = [
    CaptureEvent::UnrecoverableError,
    CaptureEvent::NewVideoMode,
    CaptureEvent::SignalLost,
    CaptureEvent::InvalidSignal,
    CaptureEvent::InvalidDevice,
    CaptureEvent::SignalGained,
    CaptureEvent::NewFrame,
    CaptureEvent::Sleep,
    CaptureEvent::None,
];

fn tag_index(event: CaptureEvent) -> usize {
    PRIORITY_ORDER.iter().position(|e| *e == event).expect("every CaptureEvent variant is in PRIORITY_ORDER")
}

/// A fixed-size boolean array indexed by event tag. `push` sets the flag for
/// an event kind; `pop` returns and clears the highest-priority pending
/// flag. At most one logical event of each kind can be pending at a time —
/// pushing the same kind repeatedly coalesces into a single pending flag.
#[derive(Debug, Clone)]
pub struct EventQueue {
    pending: [bool; PRIORITY_ORDER.len()],
}

impl EventQueue {
    pub fn new() -> Self {
        Self { pending: [false; PRIORITY_ORDER.len()] }
    }

    /// Marks `event` as pending. Coalesces with any previously pending
    /// event of the same kind.
    pub fn push(&mut self, event: CaptureEvent) {
        self.pending[tag_index(event)] = true;
    }

    /// Returns and clears the highest-priority pending event, or
    /// [`CaptureEvent::None`] if nothing is pending.
    pub fn pop(&mut self) -> CaptureEvent {
        for event in PRIORITY_ORDER {
            let idx = tag_index(event);
            if self.pending[idx] {
                self.pending[idx] = false;
                return event;
            }
        }
        CaptureEvent::None
    }

    /// `true` if `event` is currently flagged as pending.
    pub fn is_pending(&self, event: CaptureEvent) -> bool {
        self.pending[tag_index(event)]
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
