//! Prompt templates for the realtime personas.

pub mod coach;
pub mod instructions;
pub mod journalist;
pub mod library;
pub mod nudge_tool;
pub mod profiles;

pub use coach::COACH_SYSTEM_PROMPT;
pub use instructions::{
    CoachingMode, ScenarioOverride, SessionBrief, build_instructions, format_company_brief,
};
pub use journalist::{InterviewQuestion, create_journalist_prompt};
pub use nudge_tool::nudge_tool;
