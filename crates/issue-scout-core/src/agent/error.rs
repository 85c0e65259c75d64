use thiserror::Error;

use super::transcript::Transcript;

/// Why a model response could not be turned into an action or an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing 'Action:' after 'Thought:'")]
    MissingAction,
    #[error("missing 'Action Input:' after 'Action:'")]
    MissingActionInput,
    #[error("output contains both a final answer and a parse-able action")]
    AnswerAndAction,
    #[error("could not parse an action or a final answer")]
    Unrecognized,
}

/// Terminal failure of one question.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model output matched neither the action nor the final-answer format.
    #[error("step {step}: could not parse model output: {source}")]
    MalformedOutput {
        step: usize,
        #[source]
        source: ParseError,
        output: String,
    },

    /// The model selected a tool outside the configured set.
    #[error("step {step}: unknown tool '{name}' (available: {})", .available.join(", "))]
    UnknownTool {
        step: usize,
        name: String,
        available: Vec<String>,
    },

    /// No final answer within the step budget.
    #[error("no final answer after {max_steps} steps")]
    StepLimitExceeded {
        max_steps: usize,
        transcript: Transcript,
    },

    /// The language model call itself failed. `cause` holds the whole
    /// context chain, outermost first.
    #[error("step {step}: language model call failed: {cause}")]
    Model { step: usize, cause: String },
}
