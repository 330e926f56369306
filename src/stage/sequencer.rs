//! Cursor over a stage list.

use std::marker::PhantomData;

use super::kinds::Stage;

/// Snapshot of "where the walk-through is", taken once per update cycle and
/// handed to both the metric engines and the presentation layer so the two
/// can never disagree about what is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate<S: Stage> {
    current: S,
}

impl<S: Stage> Gate<S> {
    /// Gate positioned at `current`.
    pub fn at(current: S) -> Self {
        Self { current }
    }

    /// The stage this gate was taken at.
    pub fn current(&self) -> S {
        self.current
    }

    /// `index(current) >= index(target)`.
    pub fn is_at_or_past(&self, target: S) -> bool {
        self.current.index() >= target.index()
    }

    /// Whether the gate sits on the last stage.
    pub fn is_terminal(&self) -> bool {
        self.current.index() == S::ORDER.len() - 1
    }
}

/// Zero-based cursor into `S::ORDER`.
///
/// The cursor only ever moves forward one stage at a time or jumps back to the
/// first stage. Advancing from the terminal stage is a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer<S: Stage> {
    cursor: usize,
    _stages: PhantomData<S>,
}

impl<S: Stage> Sequencer<S> {
    /// A sequencer at the first stage.
    pub fn new() -> Self {
        Self {
            cursor: 0,
            _stages: PhantomData,
        }
    }

    pub fn current(&self) -> S {
        S::ORDER[self.cursor]
    }

    /// Zero-based cursor position.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of stages in the sequence.
    pub fn len(&self) -> usize {
        S::ORDER.len()
    }

    /// Always false: every stage list has at least one stage.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Move to the next stage. Returns `false` (and does nothing) when already
    /// at the terminal stage.
    pub fn advance(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Jump back to the first stage.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn is_terminal(&self) -> bool {
        self.cursor == S::ORDER.len() - 1
    }

    pub fn is_at_or_past(&self, target: S) -> bool {
        self.gate().is_at_or_past(target)
    }

    /// Capture the current position as a [`Gate`].
    pub fn gate(&self) -> Gate<S> {
        Gate::at(self.current())
    }
}

impl<S: Stage> Default for Sequencer<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::kinds::{CispoStage, DpoStage, GfpoStage};

    #[test]
    fn test_starts_at_first_stage() {
        let seq = Sequencer::<DpoStage>::new();
        assert_eq!(seq.current(), DpoStage::Input);
        assert_eq!(seq.position(), 0);
        assert_eq!(seq.len(), 7);
        assert!(!seq.is_terminal());
    }

    #[test]
    fn test_advance_walks_the_order() {
        let mut seq = Sequencer::<GfpoStage>::new();
        let mut visited = vec![seq.current()];
        while seq.advance() {
            visited.push(seq.current());
        }
        assert_eq!(visited, GfpoStage::ORDER);
        assert!(seq.is_terminal());
    }

    #[test]
    fn test_advance_saturates_at_terminal() {
        let mut seq = Sequencer::<CispoStage>::new();
        for _ in 0..20 {
            seq.advance();
        }
        assert_eq!(seq.current(), CispoStage::Update);
        assert!(!seq.advance());
        assert_eq!(seq.current(), CispoStage::Update);
        assert_eq!(seq.position(), 4);
    }

    #[test]
    fn test_reset_returns_to_first() {
        let mut seq = Sequencer::<DpoStage>::new();
        seq.advance();
        seq.advance();
        seq.reset();
        assert_eq!(seq.current(), DpoStage::Input);
    }

    #[test]
    fn test_gate_is_monotonic() {
        let mut seq = Sequencer::<DpoStage>::new();
        let mut previously_open = 0;
        loop {
            let open = DpoStage::ORDER
                .iter()
                .filter(|&&target| seq.is_at_or_past(target))
                .count();
            // Exactly the stages up to and including the current one are open.
            assert_eq!(open, seq.position() + 1);
            assert!(open > previously_open);
            previously_open = open;
            if !seq.advance() {
                break;
            }
        }
    }

    #[test]
    fn test_gate_boundaries() {
        let gate = Gate::at(DpoStage::LossCalc);
        assert!(gate.is_at_or_past(DpoStage::Input));
        assert!(gate.is_at_or_past(DpoStage::LossCalc));
        assert!(!gate.is_at_or_past(DpoStage::Backward));
        assert!(!gate.is_terminal());
        assert!(Gate::at(DpoStage::Update).is_terminal());
    }
}
