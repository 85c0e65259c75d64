use serde::Serialize;

use super::tool::ToolKind;

/// One completed Thought → Action → Observation cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub thought: String,
    #[serde(serialize_with = "serialize_tool")]
    pub action: ToolKind,
    pub action_input: String,
    pub observation: String,
    /// Raw model output for this step, replayed verbatim in the scratchpad.
    pub log: String,
}

fn serialize_tool<S: serde::Serializer>(kind: &ToolKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.name())
}

/// Ordered record of the steps taken for one question.
///
/// Scoped to a single question; nothing carries over to the next one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    pub question: String,
    pub steps: Vec<Step>,
}

impl Transcript {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            steps: Vec::new(),
        }
    }

    /// Render the steps in the format the prompt's `{agent_scratchpad}` expects.
    pub fn scratchpad(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(&step.log);
            out.push_str("\nObservation: ");
            out.push_str(&step.observation);
            out.push_str("\nThought: ");
        }
        out
    }
}

/// The result of a question that reached a final answer.
#[derive(Debug, Clone, Serialize)]
pub struct AgentAnswer {
    pub answer: String,
    pub transcript: Transcript,
    /// Number of model calls made, including the one that produced the answer.
    pub model_calls: usize,
}
