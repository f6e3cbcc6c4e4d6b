//! Counterparty profiles and situation modifiers appended to realtime
//! instructions.

/// Who the spokesperson is talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterparty {
    Journalist,
    Customer,
    Partner,
    Stakeholder,
    Public,
}

impl Counterparty {
    /// Case-insensitive lookup; `"stake holder"` and `"stake_holder"` are
    /// accepted for stakeholder.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "journalist" => Some(Self::Journalist),
            "customer" => Some(Self::Customer),
            "partner" => Some(Self::Partner),
            "stakeholder" | "stake holder" | "stake_holder" => Some(Self::Stakeholder),
            "public" => Some(Self::Public),
            _ => None,
        }
    }

    pub fn profile(self) -> &'static str {
        match self {
            Self::Journalist => {
                "Professional, probing, and quote-seeking. Press for clarity, accountability, and \
                 numbers. Ask follow-ups when answers are vague or evasive."
            }
            Self::Customer => {
                "Empathetic and impact-focused. Prioritize customer experience, remediation steps, \
                 and what they should do now. Avoid combative framing."
            }
            Self::Partner => {
                "Commercial and integration-focused. Ask about timelines, dependencies, \
                 commitments, pricing, and go-to-market coordination."
            }
            Self::Stakeholder => {
                "Metrics, governance, and risk-focused. Ask about strategy, performance \
                 indicators, and decision accountability."
            }
            Self::Public => {
                "Clear, reassuring, and values-oriented. Avoid jargon. Focus on transparency and \
                 trust."
            }
        }
    }
}

/// The kind of conversation being rehearsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Situation {
    Crisis,
    Demo,
    Interview,
}

impl Situation {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "crisis" => Some(Self::Crisis),
            "demo" => Some(Self::Demo),
            "interview" => Some(Self::Interview),
            _ => None,
        }
    }

    pub fn modifier(self) -> &'static str {
        match self {
            Self::Crisis => {
                "Crisis constraints: avoid speculation, lead with empathy, state what is known, \
                 what is being done, and when the next update will come."
            }
            Self::Demo => {
                "Demo constraints: be clear and structured, highlight value quickly, handle \
                 objections, and keep answers concise and action-oriented."
            }
            Self::Interview => {
                "Interview constraints: balanced tone, short story + vision, answer first then \
                 expand, avoid rambling."
            }
        }
    }
}

pub fn counterparty_profile(value: Option<&str>) -> Option<&'static str> {
    value.and_then(Counterparty::parse).map(Counterparty::profile)
}

pub fn situation_modifier(value: Option<&str>) -> Option<&'static str> {
    value.and_then(Situation::parse).map(Situation::modifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterparty_aliases() {
        assert_eq!(Counterparty::parse(" Stake Holder "), Some(Counterparty::Stakeholder));
        assert_eq!(Counterparty::parse("stake_holder"), Some(Counterparty::Stakeholder));
        assert_eq!(Counterparty::parse("PUBLIC"), Some(Counterparty::Public));
        assert_eq!(Counterparty::parse("investor"), None);
    }

    #[test]
    fn test_profile_lookup() {
        assert!(counterparty_profile(Some("customer")).unwrap().starts_with("Empathetic"));
        assert!(counterparty_profile(Some("")).is_none());
        assert!(counterparty_profile(None).is_none());
    }

    #[test]
    fn test_situation_lookup() {
        assert!(situation_modifier(Some("Crisis")).unwrap().starts_with("Crisis constraints"));
        assert!(situation_modifier(Some("webinar")).is_none());
    }
}
