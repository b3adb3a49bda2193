//! Run state machine.

use std::fmt;

use uuid::Uuid;

/// Where a pipeline run is in its lifecycle.
///
/// ```text
/// Init ──> Connecting ──> Running ──> Committing ──> Closed
///   │          │              └─────> Aborting ────────^
///   └──────────┴───────────────────────────────────────^
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
  /// Loading the task table.
  Init,
  /// Acquiring the run's database session.
  Connecting,
  /// Dispatching tasks.
  Running,
  /// Every attempted task succeeded and was committed.
  Committing,
  /// A task failed; uncommitted work is rolled back.
  Aborting,
  Closed,
}

impl RunState {
  /// Whether the run may move from `self` to `next`.
  pub fn can_transition_to(self, next: RunState) -> bool {
    use RunState::*;
    matches!(
      (self, next),
      (Init, Connecting)
        | (Init, Closed)
        | (Connecting, Running)
        | (Connecting, Closed)
        | (Running, Committing)
        | (Running, Aborting)
        | (Committing, Closed)
        | (Aborting, Closed)
    )
  }

  pub fn is_terminal(self) -> bool {
    self == RunState::Closed
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      RunState::Init => "init",
      RunState::Connecting => "connecting",
      RunState::Running => "running",
      RunState::Committing => "committing",
      RunState::Aborting => "aborting",
      RunState::Closed => "closed",
    };
    f.write_str(name)
  }
}

/// Identity and progress of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
  pub run_id: Uuid,
  pub failed: bool,
  state: RunState,
}

impl RunRecord {
  pub fn new(run_id: Uuid) -> Self {
    Self {
      run_id,
      failed: false,
      state: RunState::Init,
    }
  }

  pub fn state(&self) -> RunState {
    self.state
  }

  /// Move to `next`. Returns `false` and stays put if the move is not allowed.
  pub fn advance(&mut self, next: RunState) -> bool {
    if !self.state.can_transition_to(next) {
      tracing::warn!(from = %self.state, to = %next, "illegal run state transition");
      return false;
    }
    tracing::debug!(from = %self.state, to = %next, "run state transition");
    self.state = next;
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_happy_path_transitions() {
    let mut record = RunRecord::new(Uuid::new_v4());
    for next in [
      RunState::Connecting,
      RunState::Running,
      RunState::Committing,
      RunState::Closed,
    ] {
      assert!(record.advance(next));
    }
    assert!(record.state().is_terminal());
  }

  #[test]
  fn test_setup_failures_close_directly() {
    assert!(RunState::Init.can_transition_to(RunState::Closed));
    assert!(RunState::Connecting.can_transition_to(RunState::Closed));
    assert!(!RunState::Running.can_transition_to(RunState::Closed));
  }

  #[test]
  fn test_illegal_transition_is_rejected() {
    let mut record = RunRecord::new(Uuid::new_v4());
    assert!(!record.advance(RunState::Running));
    assert_eq!(record.state(), RunState::Init);

    assert!(!RunState::Closed.can_transition_to(RunState::Init));
    assert!(!RunState::Committing.can_transition_to(RunState::Aborting));
  }
}
