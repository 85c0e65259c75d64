//! Parser for ReAct-formatted model output.
//!
//! The model answers each prompt with either
//!
//! ```text
//! Thought: <reasoning>
//! Action: <tool name>
//! Action Input: <input>
//! ```
//!
//! or
//!
//! ```text
//! Thought: I now know the final answer
//! Final Answer: <answer>
//! ```
//!
//! Tool names are returned as written; resolving them against the configured
//! tools happens in the loop.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ParseError;

pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

static ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action regex is valid")
});
static ACTION_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Action\s*\d*\s*:").expect("action marker regex is valid"));
static INPUT_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Action\s*\d*\s*Input\s*\d*\s*:").expect("input marker regex is valid")
});

/// What the model decided to do this step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelDecision {
    Act {
        thought: String,
        tool: String,
        input: String,
    },
    Finish {
        thought: String,
        answer: String,
    },
}

pub fn parse_output(text: &str) -> Result<ModelDecision, ParseError> {
    let includes_answer = text.contains(FINAL_ANSWER_MARKER);

    if let Some(caps) = ACTION_RE.captures(text) {
        if includes_answer {
            return Err(ParseError::AnswerAndAction);
        }
        let whole = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let tool = caps.get(1).map(|m| m.as_str()).unwrap_or("").trim();
        let input = caps
            .get(2)
            .map(|m| m.as_str())
            .unwrap_or("")
            .trim()
            .trim_matches('"');
        return Ok(ModelDecision::Act {
            thought: clean_thought(&text[..whole]),
            tool: tool.to_string(),
            input: input.to_string(),
        });
    }

    if includes_answer {
        let start = text.find(FINAL_ANSWER_MARKER).unwrap_or(0);
        let answer = text
            .rsplit(FINAL_ANSWER_MARKER)
            .next()
            .unwrap_or("")
            .trim();
        return Ok(ModelDecision::Finish {
            thought: clean_thought(&text[..start]),
            answer: answer.to_string(),
        });
    }

    if !ACTION_MARKER_RE.is_match(text) {
        Err(ParseError::MissingAction)
    } else if !INPUT_MARKER_RE.is_match(text) {
        Err(ParseError::MissingActionInput)
    } else {
        Err(ParseError::Unrecognized)
    }
}

fn clean_thought(prefix: &str) -> String {
    let trimmed = prefix.trim();
    trimmed
        .strip_prefix("Thought:")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_action() {
        let out = "Thought: I should search\nAction: github_search\nAction Input: crash on startup";
        assert_eq!(
            parse_output(out),
            Ok(ModelDecision::Act {
                thought: "I should search".into(),
                tool: "github_search".into(),
                input: "crash on startup".into(),
            })
        );
    }

    #[test]
    fn test_action_input_strips_quotes() {
        let out = "Action: note_tool\nAction Input: \"remember this\"\n";
        match parse_output(out).unwrap() {
            ModelDecision::Act { input, thought, .. } => {
                assert_eq!(input, "remember this");
                assert_eq!(thought, "");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parses_final_answer_verbatim() {
        let out = "Thought: I now know the final answer\nFinal Answer: Issue #12 tracks the crash.";
        assert_eq!(
            parse_output(out),
            Ok(ModelDecision::Finish {
                thought: "I now know the final answer".into(),
                answer: "Issue #12 tracks the crash.".into(),
            })
        );
    }

    #[test]
    fn test_final_answer_keeps_multiline_text() {
        let out = "Final Answer: line one\nline two";
        match parse_output(out).unwrap() {
            ModelDecision::Finish { answer, .. } => assert_eq!(answer, "line one\nline two"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_answer_and_action_is_ambiguous() {
        let out = "Action: github_search\nAction Input: x\nFinal Answer: y";
        assert_eq!(parse_output(out), Err(ParseError::AnswerAndAction));
    }

    #[test]
    fn test_missing_action() {
        assert_eq!(
            parse_output("I am just chatting"),
            Err(ParseError::MissingAction)
        );
    }

    #[test]
    fn test_missing_action_input() {
        assert_eq!(
            parse_output("Thought: hm\nAction: github_search"),
            Err(ParseError::MissingActionInput)
        );
    }

    #[test]
    fn test_numbered_markers_accepted() {
        let out = "Action 1: github_search\nAction 1 Input: labels";
        match parse_output(out).unwrap() {
            ModelDecision::Act { tool, input, .. } => {
                assert_eq!(tool, "github_search");
                assert_eq!(input, "labels");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
