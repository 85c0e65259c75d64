//! Prompt template for the ReAct loop.
//!
//! Placeholders: `{tools}`, `{tool_names}`, `{input}`, `{agent_scratchpad}`.

use super::tool::ToolSpec;

pub const DEFAULT_TEMPLATE: &str = r#"You are a helpful AI assistant that helps users find information about GitHub issues.

You have access to the following tools:

{tools}


Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Question: {input}
{agent_scratchpad}"#;

/// Stop sequences that cut the model off before it invents an observation.
pub const STOP_SEQUENCES: [&str; 1] = ["\nObservation"];

/// `name: description` lines, one per tool.
pub fn render_tools(specs: &[ToolSpec]) -> String {
    specs
        .iter()
        .map(|spec| format!("{}: {}", spec.kind.name(), spec.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comma-separated tool names.
pub fn render_tool_names(specs: &[ToolSpec]) -> String {
    specs
        .iter()
        .map(|spec| spec.kind.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fill every placeholder of `template`.
pub fn render(template: &str, specs: &[ToolSpec], question: &str, scratchpad: &str) -> String {
    template
        .replace("{tools}", &render_tools(specs))
        .replace("{tool_names}", &render_tool_names(specs))
        .replace("{input}", question)
        .replace("{agent_scratchpad}", scratchpad)
}
