use serde_json::{Value, json};

pub const NUDGE_SEVERITIES: [&str; 3] = ["gentle", "firm", "urgent"];

pub const NUDGE_REASONS: [&str; 8] = [
    "pace",
    "filler",
    "bridge",
    "answer_length",
    "off_message",
    "risk",
    "dodge",
    "positive",
];

/// Function tool the realtime coach calls to show a coaching nudge.
pub fn nudge_tool() -> Value {
    json!({
        "type": "function",
        "name": "nudge",
        "description": "Give a brief coaching nudge to the spokesperson. Use sparingly - only when a real media coach would interrupt.",
        "parameters": {
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "Short coaching instruction (max 10 words)",
                },
                "severity": {
                    "type": "string",
                    "enum": NUDGE_SEVERITIES,
                    "description": "gentle=suggestion, firm=important, urgent=stop immediately",
                },
                "reason": {
                    "type": "string",
                    "enum": NUDGE_REASONS,
                    "description": "Category of the coaching issue (positive for encouragement)",
                },
            },
            "required": ["text", "severity", "reason"],
        },
    })
}
