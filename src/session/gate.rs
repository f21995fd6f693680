use tracing::warn;

/// Why the editor is refusing new work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusyReason {
    /// A structural edit is running; holds the action name so only the
    /// matching handler can clear it
    Event(&'static str),
    /// The renumbering pass is running
    Renumber,
}

/// Gate state: at most one busy reason at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Idle,
    Busy(BusyReason),
}

/// Mutual-exclusion gate between structural edits and the renumbering pass.
///
/// Everything here runs on one thread; the gate exists because independent
/// event handlers (keyboard, menu, timer) can interleave between synchronous
/// runs and must not both mutate the tree. Actions that find the gate busy
/// are skipped, never queued.
#[derive(Debug, Default)]
pub struct EventGate {
    state: GateState,
}

impl EventGate {
    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GateState::Idle
    }

    /// Try to start a structural edit. Returns false (and logs the block)
    /// if any work is already in flight.
    pub fn begin_event(&mut self, action: &'static str) -> bool {
        match &self.state {
            GateState::Idle => {
                self.state = GateState::Busy(BusyReason::Event(action));
                true
            }
            GateState::Busy(reason) => {
                warn!(action, ?reason, "event blocked: gate busy");
                false
            }
        }
    }

    /// Clear the event flag. The action name must match the one that set
    /// it; a mismatched clear is a logged no-op, guarding against stale or
    /// duplicate handlers clearing someone else's flag.
    pub fn end_event(&mut self, action: &'static str) -> bool {
        match &self.state {
            GateState::Busy(BusyReason::Event(current)) if *current == action => {
                self.state = GateState::Idle;
                true
            }
            other => {
                warn!(action, state = ?other, "mismatched event clear ignored");
                false
            }
        }
    }

    /// Try to start the renumbering pass. Only allowed from idle.
    pub fn begin_renumber(&mut self) -> bool {
        match &self.state {
            GateState::Idle => {
                self.state = GateState::Busy(BusyReason::Renumber);
                true
            }
            GateState::Busy(reason) => {
                warn!(?reason, "renumber blocked: gate busy");
                false
            }
        }
    }

    pub fn end_renumber(&mut self) -> bool {
        match &self.state {
            GateState::Busy(BusyReason::Renumber) => {
                self.state = GateState::Idle;
                true
            }
            other => {
                warn!(state = ?other, "mismatched renumber clear ignored");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_and_end_event_round_trip() {
        let mut gate = EventGate::default();
        assert!(gate.begin_event("delete"));
        assert_eq!(
            *gate.state(),
            GateState::Busy(BusyReason::Event("delete"))
        );
        assert!(gate.end_event("delete"));
        assert!(gate.is_idle());
    }

    #[test]
    fn second_event_is_blocked_not_queued() {
        let mut gate = EventGate::default();
        assert!(gate.begin_event("duplicate"));
        assert!(!gate.begin_event("duplicate"));
        assert!(!gate.begin_event("delete"));
        // Still held by the first
        assert_eq!(
            *gate.state(),
            GateState::Busy(BusyReason::Event("duplicate"))
        );
    }

    #[test]
    fn mismatched_clear_is_a_no_op() {
        let mut gate = EventGate::default();
        assert!(gate.begin_event("add-same-level"));
        assert!(!gate.end_event("delete"));
        assert_eq!(
            *gate.state(),
            GateState::Busy(BusyReason::Event("add-same-level"))
        );
        assert!(gate.end_event("add-same-level"));
    }

    #[test]
    fn clear_when_idle_is_a_no_op() {
        let mut gate = EventGate::default();
        assert!(!gate.end_event("delete"));
        assert!(!gate.end_renumber());
        assert!(gate.is_idle());
    }

    #[test]
    fn event_and_renumber_are_mutually_exclusive() {
        let mut gate = EventGate::default();
        assert!(gate.begin_event("paste"));
        assert!(!gate.begin_renumber());
        assert!(gate.end_event("paste"));

        assert!(gate.begin_renumber());
        assert!(!gate.begin_event("paste"));
        assert!(!gate.begin_renumber());
        assert!(gate.end_renumber());
        assert!(gate.is_idle());
    }

    #[test]
    fn renumber_clear_does_not_clear_an_event() {
        let mut gate = EventGate::default();
        assert!(gate.begin_event("delete"));
        assert!(!gate.end_renumber());
        assert!(!gate.is_idle());
    }
}
