use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed,
    Denied { remaining: Duration },
}

impl ThrottleDecision {
    /// Remaining wait in whole seconds, rounded up so a user is never told 0.
    pub fn remaining_secs(&self) -> u64 {
        match self {
            ThrottleDecision::Allowed => 0,
            ThrottleDecision::Denied { remaining } => {
                remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
            }
        }
    }
}
