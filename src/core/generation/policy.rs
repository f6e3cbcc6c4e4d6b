//! Completion and shrink-retry policy.
//!
//! A response is usable only when its status is `completed`. When the model
//! ran out of output tokens on the first attempt of a task that opts in, one
//! retry is issued with a larger token ceiling and a smaller list bound.

use crate::core::openai::{TOKEN_BUDGET_REASON, UpstreamError};

use super::envelope::CompletionStatus;
use super::request::TokenLimits;

/// Smallest list bound a shrunk retry may request.
pub const MIN_LIST_ITEMS: u32 = 2;

/// Instruction appended to the user prompt of a shrunk retry.
pub const CONDENSED_INSTRUCTION: &str = "Your previous answer was cut off because it ran out of \
     output tokens. Keep every field short: use brief sentences, avoid repetition, and stay \
     within the item limits above.";

/// How much output a task asks the model for on one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputBudget {
    pub max_output_tokens: u32,
    /// Upper bound on list lengths the prompt asks for, when the task has one.
    pub max_list_items: Option<u32>,
    /// Set on the retry so the prompt asks for shorter output.
    pub condensed: bool,
}

impl OutputBudget {
    pub fn new(max_output_tokens: u32) -> Self {
        Self {
            max_output_tokens,
            max_list_items: None,
            condensed: false,
        }
    }

    pub fn with_max_list_items(mut self, items: u32) -> Self {
        self.max_list_items = Some(items);
        self
    }

    /// Budget for the retry: double the tokens up to `limits.max` and halve
    /// the list bound, never below [`MIN_LIST_ITEMS`].
    pub fn shrink(&self, limits: TokenLimits) -> Self {
        Self {
            max_output_tokens: limits.clamp(self.max_output_tokens.saturating_mul(2)),
            max_list_items: self
                .max_list_items
                .map(|items| (items / 2).max(MIN_LIST_ITEMS)),
            condensed: true,
        }
    }
}

/// Whether a task accepts an automatic retry after truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    #[default]
    Never,
    ShrinkOnce,
}

/// Outcome of inspecting one attempt.
#[derive(Debug)]
pub enum Verdict {
    Accept,
    Retry,
    Fail(UpstreamError),
}

/// Decide what to do with a response on attempt `attempt` (zero-based).
pub fn evaluate(status: &CompletionStatus, attempt: u32, policy: RetryPolicy) -> Verdict {
    match status {
        CompletionStatus::Completed => Verdict::Accept,
        CompletionStatus::Incomplete { reason } => {
            let truncated = reason.as_deref() == Some(TOKEN_BUDGET_REASON);
            if truncated && attempt == 0 && policy == RetryPolicy::ShrinkOnce {
                Verdict::Retry
            } else {
                Verdict::Fail(UpstreamError::incomplete(reason.as_deref()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truncated() -> CompletionStatus {
        CompletionStatus::Incomplete {
            reason: Some(TOKEN_BUDGET_REASON.to_string()),
        }
    }

    #[test]
    fn test_shrink_doubles_tokens_and_halves_items() {
        let budget = OutputBudget::new(1400).with_max_list_items(6);
        let shrunk = budget.shrink(TokenLimits::new(600, 3000));
        assert_eq!(shrunk.max_output_tokens, 2800);
        assert_eq!(shrunk.max_list_items, Some(3));
        assert!(shrunk.condensed);
    }

    #[test]
    fn test_shrink_caps_tokens_and_floors_items() {
        let budget = OutputBudget::new(2000).with_max_list_items(3);
        let shrunk = budget.shrink(TokenLimits::new(600, 3000));
        assert_eq!(shrunk.max_output_tokens, 3000);
        assert_eq!(shrunk.max_list_items, Some(MIN_LIST_ITEMS));
    }

    #[test]
    fn test_completed_is_accepted() {
        assert!(matches!(
            evaluate(&CompletionStatus::Completed, 1, RetryPolicy::Never),
            Verdict::Accept
        ));
    }

    #[test]
    fn test_truncation_retries_once() {
        assert!(matches!(
            evaluate(&truncated(), 0, RetryPolicy::ShrinkOnce),
            Verdict::Retry
        ));
        match evaluate(&truncated(), 1, RetryPolicy::ShrinkOnce) {
            Verdict::Fail(err) => assert!(err.is_token_budget_exhausted()),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_truncation_without_opt_in_fails() {
        assert!(matches!(
            evaluate(&truncated(), 0, RetryPolicy::Never),
            Verdict::Fail(_)
        ));
    }

    #[test]
    fn test_other_reasons_fail_immediately() {
        let filtered = CompletionStatus::Incomplete {
            reason: Some("content_filter".to_string()),
        };
        match evaluate(&filtered, 0, RetryPolicy::ShrinkOnce) {
            Verdict::Fail(err) => assert!(err.to_string().contains("content_filter")),
            other => panic!("expected failure, got {other:?}"),
        }
        let unknown = CompletionStatus::Incomplete { reason: None };
        assert!(matches!(
            evaluate(&unknown, 0, RetryPolicy::ShrinkOnce),
            Verdict::Fail(_)
        ));
    }
}
