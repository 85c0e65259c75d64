//! ReAct reasoning loop.
//!
//! The loop alternates between asking a [`LanguageModel`] for the next step
//! and running the selected tool from a [`Toolset`]. Each question gets its
//! own [`Transcript`]; nothing is shared between questions.
//!
//! The loop is an explicit state machine:
//!
//! ```text
//! AwaitingThought -> Thinking -> ActionSelected -> AwaitingObservation -> AwaitingThought
//!                             \-> FinalAnswerReached
//! ```
//!
//! It always terminates: either a final answer, a step failure, or
//! [`AgentError::StepLimitExceeded`] once `max_steps` model calls were spent.

pub mod error;
pub mod parser;
pub mod prompt;
pub mod tool;
pub mod transcript;

use async_trait::async_trait;
use tracing::debug;

pub use error::{AgentError, ParseError};
pub use parser::{parse_output, ModelDecision};
pub use tool::{ToolKind, ToolSpec, Toolset};
pub use transcript::{AgentAnswer, Step, Transcript};

pub const DEFAULT_MAX_STEPS: usize = 15;

/// Text generation backend used by the loop.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn model_name(&self) -> &str;

    /// Generate a continuation of `prompt`, stopping before any of `stop`.
    async fn generate(&self, prompt: &str, stop: &[String]) -> anyhow::Result<String>;
}

enum LoopState {
    AwaitingThought,
    Thinking {
        prompt: String,
    },
    ActionSelected {
        log: String,
        thought: String,
        tool: String,
        input: String,
    },
    AwaitingObservation {
        log: String,
        thought: String,
        kind: ToolKind,
        input: String,
    },
    FinalAnswerReached {
        answer: String,
    },
}

pub struct ReactAgent<M, T> {
    model: M,
    tools: T,
    template: String,
    max_steps: usize,
}

impl<M: LanguageModel, T: Toolset> ReactAgent<M, T> {
    pub fn new(model: M, tools: T) -> Self {
        Self {
            model,
            tools,
            template: prompt::DEFAULT_TEMPLATE.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Bound the number of model calls per question. Values below 1 are raised to 1.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn tools(&self) -> &T {
        &self.tools
    }

    /// Answer one question.
    pub async fn run(&self, question: &str) -> Result<AgentAnswer, AgentError> {
        let specs = self.tools.specs();
        let stop: Vec<String> = prompt::STOP_SEQUENCES
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut transcript = Transcript::new(question);
        let mut model_calls = 0usize;
        let mut state = LoopState::AwaitingThought;

        loop {
            state = match state {
                LoopState::AwaitingThought => {
                    if model_calls >= self.max_steps {
                        return Err(AgentError::StepLimitExceeded {
                            max_steps: self.max_steps,
                            transcript,
                        });
                    }
                    let prompt = prompt::render(
                        &self.template,
                        &specs,
                        question,
                        &transcript.scratchpad(),
                    );
                    LoopState::Thinking { prompt }
                }

                LoopState::Thinking { prompt } => {
                    model_calls += 1;
                    let step = model_calls;
                    let output = self
                        .model
                        .generate(&prompt, &stop)
                        .await
                        .map_err(|e| AgentError::Model {
                            step,
                            cause: format!("{:#}", e),
                        })?;
                    debug!(step, model = self.model.model_name(), output = %output, "model output");

                    match parse_output(&output) {
                        Ok(ModelDecision::Finish { answer, .. }) => {
                            LoopState::FinalAnswerReached { answer }
                        }
                        Ok(ModelDecision::Act {
                            thought,
                            tool,
                            input,
                        }) => LoopState::ActionSelected {
                            log: output.trim_end().to_string(),
                            thought,
                            tool,
                            input,
                        },
                        Err(source) => {
                            return Err(AgentError::MalformedOutput {
                                step,
                                source,
                                output,
                            })
                        }
                    }
                }

                LoopState::ActionSelected {
                    log,
                    thought,
                    tool,
                    input,
                } => {
                    let kind = tool
                        .parse::<ToolKind>()
                        .ok()
                        .filter(|kind| self.tools.provides(*kind));
                    match kind {
                        Some(kind) => LoopState::AwaitingObservation {
                            log,
                            thought,
                            kind,
                            input,
                        },
                        None => {
                            return Err(AgentError::UnknownTool {
                                step: model_calls,
                                name: tool,
                                available: specs
                                    .iter()
                                    .map(|s| s.kind.name().to_string())
                                    .collect(),
                            })
                        }
                    }
                }

                LoopState::AwaitingObservation {
                    log,
                    thought,
                    kind,
                    input,
                } => {
                    debug!(step = model_calls, tool = %kind, input = %input, "invoking tool");
                    let observation = self.tools.invoke(kind, &input).await;
                    debug!(step = model_calls, observation = %observation, "tool observation");
                    transcript.steps.push(Step {
                        thought,
                        action: kind,
                        action_input: input,
                        observation,
                        log,
                    });
                    LoopState::AwaitingThought
                }

                LoopState::FinalAnswerReached { answer } => {
                    return Ok(AgentAnswer {
                        answer,
                        transcript,
                        model_calls,
                    });
                }
            };
        }
    }
}
