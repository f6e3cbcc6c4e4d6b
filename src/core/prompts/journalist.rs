//! Realtime journalist persona.

use serde::{Deserialize, Serialize};

/// One main interview question and its optional follow-ups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InterviewQuestion {
    pub text: String,
    pub follow_ups: Vec<String>,
}

impl InterviewQuestion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            follow_ups: Vec::new(),
        }
    }

    pub fn with_follow_ups<I, S>(mut self, follow_ups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.follow_ups = follow_ups.into_iter().map(Into::into).collect();
        self
    }

    fn render(&self) -> String {
        let mut line = format!("- {}", self.text);
        for follow_up in &self.follow_ups {
            line.push_str("\n    - Follow-up: ");
            line.push_str(follow_up);
        }
        line
    }
}

pub const DEFAULT_JOURNALIST_CONTEXT: &str = "This is a general media interview practice \
session. The spokesperson is practicing answering common interview questions.";

pub fn default_journalist_questions() -> Vec<InterviewQuestion> {
    [
        "Tell me about your company and what problem you're solving.",
        "What makes you different from your competitors?",
        "What are your plans for growth in the next year?",
        "How do you respond to concerns about [relevant industry issue]?",
    ]
    .into_iter()
    .map(InterviewQuestion::new)
    .collect()
}

/// Render the journalist system prompt.
///
/// `extra_blocks` (company context, counterparty profile, situation) are
/// placed right after the interview context.
pub fn create_journalist_prompt(
    scenario_context: &str,
    questions: &[InterviewQuestion],
    extra_blocks: &[String],
) -> String {
    let questions_list = if questions.is_empty() {
        "- Ask general questions about the company and their role".to_string()
    } else {
        questions
            .iter()
            .map(InterviewQuestion::render)
            .collect::<Vec<_>>()
            .join("\n")
    };

    let extra_section = if extra_blocks.is_empty() {
        String::new()
    } else {
        format!("{}\n", extra_blocks.join("\n\n"))
    };

    format!(
        "You are an experienced journalist conducting an interview. Your goal is to get good quotes and uncover the real story.

## Interview Context
{scenario_context}
{extra_section}

## Your Behavior
- Be professional but probing
- Ask follow-up questions when answers are vague or incomplete
- Push back politely when you detect deflection
- Let them finish their answers before asking follow-ups
- Use the provided questions as a guide, but adapt based on their responses

## Questions to Cover
{questions_list}

## Interview Style
- Ask questions in the order listed, one at a time
- Start with question #1 immediately (do not wait for the spokesperson to speak first)
- After each answer, decide: ask one follow-up (if needed) OR move to the next main question
- Keep a brisk cadence; avoid long monologues
- If they give a good answer, acknowledge briefly and move on
- If they dodge or give a partial answer, press further
- After the final main question, ask one short wrap-up question and end the interview

## Important Notes
- You are playing the role of a journalist, not a coach
- Do NOT give coaching feedback - just conduct the interview
- Be realistic but fair - this is practice, not an interrogation

Begin the interview now with your first question.
"
    )
}
