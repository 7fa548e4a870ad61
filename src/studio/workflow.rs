//! Generation request lifecycle.

use crate::errors::SoulCaptionError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum GenerationState {
    Idle,
    Loading,
    Ready,
    Failed { message: String },
}

/// Proof that a submission was accepted.
///
/// Only one submission is in flight at a time, so a ticket is never
/// superseded. It is consumed by exactly one of `succeed` or `fail`.
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Allows one request in flight at a time.
///
/// Submissions are never superseded: a second one is refused while the
/// first is loading, so completions need no staleness check.
#[derive(Debug)]
pub struct GenerationWorkflow {
    state: GenerationState,
    issued: u64,
}

impl Default for GenerationWorkflow {
    fn default() -> Self {
        Self {
            state: GenerationState::Idle,
            issued: 0,
        }
    }
}

impl GenerationWorkflow {
    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == GenerationState::Loading
    }

    pub fn begin(&mut self) -> Result<Ticket, SoulCaptionError> {
        if self.is_loading() {
            return Err(SoulCaptionError::GenerationInProgress);
        }
        self.issued += 1;
        self.state = GenerationState::Loading;
        Ok(Ticket(self.issued))
    }

    pub fn succeed(&mut self, ticket: Ticket) {
        debug_assert_eq!(ticket.0, self.issued);
        self.state = GenerationState::Ready;
    }

    pub fn fail(&mut self, ticket: Ticket, message: String) {
        debug_assert_eq!(ticket.0, self.issued);
        self.state = GenerationState::Failed { message };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_submission_rejected_while_loading() {
        let mut workflow = GenerationWorkflow::default();
        let ticket = workflow.begin().unwrap();
        assert!(workflow.is_loading());
        assert!(matches!(
            workflow.begin(),
            Err(SoulCaptionError::GenerationInProgress)
        ));

        workflow.succeed(ticket);
        assert_eq!(workflow.state(), &GenerationState::Ready);
    }

    #[test]
    fn test_failure_allows_retry() {
        let mut workflow = GenerationWorkflow::default();
        let ticket = workflow.begin().unwrap();
        let first = ticket.id();
        workflow.fail(ticket, "upstream down".into());
        assert_eq!(
            workflow.state(),
            &GenerationState::Failed {
                message: "upstream down".into()
            }
        );

        let retry = workflow.begin().unwrap();
        assert!(retry.id() > first);
        assert!(workflow.is_loading());
    }

    #[test]
    fn test_ready_allows_next_submission() {
        let mut workflow = GenerationWorkflow::default();
        let ticket = workflow.begin().unwrap();
        workflow.succeed(ticket);

        let next = workflow.begin().unwrap();
        assert_eq!(next.id(), 2);
        assert!(workflow.is_loading());
    }
}
