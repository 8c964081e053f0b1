//! Turn orchestration.
//!
//! Two entry points: [`run_intake_turn`] for the deterministic structured
//! questionnaire and [`run_tool_turn`] for the model-driven tool loop.
//! Both take their collaborators as arguments so they can be exercised
//! with a scripted provider in tests.

pub mod intake;
pub mod mutation;
pub mod prompts;
pub mod session_lock;
pub mod tools;
pub mod turn;

pub use intake::run_intake_turn;
pub use turn::run_tool_turn;

use std::collections::BTreeMap;

use ne_domain::error::Error;

/// The result of one turn, in either mode.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub session_id: String,
    pub response: String,
    /// The collected data map. `None` while structured-mode collection is
    /// still in progress; always present in tool mode.
    pub collected: Option<BTreeMap<String, String>>,
}

/// How a turn failed. Handlers map these onto HTTP statuses.
#[derive(Debug)]
pub enum TurnError {
    /// The turn needs an LLM provider but none is registered.
    NoProvider,
    /// The provider call failed (upstream error or timeout).
    Provider(Error),
    /// Anything else.
    Internal(Error),
}

impl std::fmt::Display for TurnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnError::NoProvider => write!(f, "no LLM provider available"),
            TurnError::Provider(e) => write!(f, "provider error: {e}"),
            TurnError::Internal(e) => write!(f, "internal error: {e}"),
        }
    }
}

impl std::error::Error for TurnError {}
