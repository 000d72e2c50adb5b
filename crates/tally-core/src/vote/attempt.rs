use crate::error::Failure;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VoteState {
    #[default]
    Idle,
    Pending,
    /// Terminal: the session has voted.
    Confirmed,
    /// Recoverable through retry with the same choice.
    Failed(Failure),
}

/// One user click on a choice and where it got to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteAttempt {
    choice_id: String,
    referral_code: Option<String>,
    pub state: VoteState,
}

impl VoteAttempt {
    pub fn new(choice_id: impl Into<String>, referral_code: Option<String>) -> Self {
        Self {
            choice_id: choice_id.into(),
            referral_code: referral_code.filter(|r| !r.trim().is_empty()),
            state: VoteState::Idle,
        }
    }

    pub fn choice_id(&self) -> &str {
        &self.choice_id
    }

    pub fn referral_code(&self) -> Option<&str> {
        self.referral_code.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.state == VoteState::Pending
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == VoteState::Confirmed
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.state {
            VoteState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub(crate) fn with_state(mut self, state: VoteState) -> Self {
        self.state = state;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_referral_dropped() {
        let attempt = VoteAttempt::new("ai", Some("  ".into()));
        assert_eq!(attempt.referral_code(), None);
        assert_eq!(attempt.state, VoteState::Idle);

        let attempt = VoteAttempt::new("ai", Some("ACME".into()));
        assert_eq!(attempt.referral_code(), Some("ACME"));
    }

    #[test]
    fn test_failure_accessor() {
        let attempt = VoteAttempt::new("ai", None).with_state(VoteState::Failed(Failure::network()));
        assert!(attempt.failure().is_some());
        assert!(!attempt.is_pending());
        assert!(!attempt.is_confirmed());
    }
}
