//! Built-in journalist scenarios selectable by id.

use super::journalist::InterviewQuestion;

/// A canned interview setup.
#[derive(Debug)]
pub struct LibraryScenario {
    pub id: &'static str,
    pub context: &'static str,
    questions: &'static [(&'static str, &'static [&'static str])],
}

impl LibraryScenario {
    pub fn questions(&self) -> Vec<InterviewQuestion> {
        self.questions
            .iter()
            .map(|(text, follow_ups)| {
                InterviewQuestion::new(*text).with_follow_ups(follow_ups.iter().copied())
            })
            .collect()
    }
}

static SCENARIOS: &[LibraryScenario] = &[
    LibraryScenario {
        id: "crisis-layoffs",
        context: "The company has just announced a 15% workforce reduction (approximately 500 employees).\n\
                  The spokesperson is the VP of Communications. This is the first media interview after the announcement.\n\
                  The journalist is from a major business publication and is known for tough questioning.",
        questions: &[
            (
                "Can you explain why the company decided to lay off 500 employees?",
                &[
                    "But your last earnings report showed record profits. How do you justify this?",
                    "Were executives asked to take pay cuts before this decision?",
                ],
            ),
            (
                "How do you respond to criticism that the company prioritized shareholders over employees?",
                &["So you are putting profits over people?"],
            ),
            (
                "Will there be more layoffs in the future?",
                &["So you can't guarantee that these will be the last layoffs?"],
            ),
        ],
    },
    LibraryScenario {
        id: "product-launch",
        context: "The company is launching a new AI-powered feature for its main product.\n\
                  This is an exclusive interview with a tech journalist from a respected publication.\n\
                  The journalist is generally favorable but will ask probing questions.",
        questions: &[
            (
                "What makes this new feature different from what competitors are offering?",
                &[
                    "But Company X announced something similar last month. Are you playing catch-up?",
                ],
            ),
            (
                "Tell me about the AI technology behind this. Is it built in-house or are you using third-party models?",
                &["What about data privacy concerns with AI?"],
            ),
            ("When will this be available and how much will it cost?", &[]),
        ],
    },
    LibraryScenario {
        id: "general-profile",
        context: "A business journalist is doing a profile piece on the company for a general business audience.\n\
                  This is a friendly but thorough interview.\n\
                  The journalist wants to understand the company story and vision.",
        questions: &[
            ("Tell me about the company and what problem you are solving.", &[]),
            (
                "What's the company culture like?",
                &["I've heard reports of burnout among employees. Can you address that?"],
            ),
            (
                "Where do you see the company in five years?",
                &["How will you compete against bigger players in the market?"],
            ),
        ],
    },
    LibraryScenario {
        id: "crisis-security",
        context: "The company recently discovered and disclosed a security incident that potentially affected customer data.\n\
                  The spokesperson is the Chief Information Security Officer.\n\
                  The journalist is a cybersecurity reporter with deep technical knowledge.",
        questions: &[
            (
                "Can you walk me through what exactly happened and when?",
                &["Why did it take so long to discover the breach?"],
            ),
            (
                "How many customers were affected and what type of data was compromised?",
                &[
                    "Were passwords or financial information included?",
                    "Have you seen any evidence of the data being used maliciously?",
                ],
            ),
            ("What are you doing to make sure this doesn't happen again?", &[]),
        ],
    },
];

/// Look up a built-in scenario. Unknown or blank ids yield `None`.
pub fn journalist_scenario(id: Option<&str>) -> Option<&'static LibraryScenario> {
    let id = id?.trim();
    SCENARIOS.iter().find(|scenario| scenario.id == id)
}

pub fn scenario_ids() -> impl Iterator<Item = &'static str> {
    SCENARIOS.iter().map(|scenario| scenario.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scenarios_are_addressable() {
        let ids: Vec<_> = scenario_ids().collect();
        assert_eq!(
            ids,
            vec!["crisis-layoffs", "product-launch", "general-profile", "crisis-security"]
        );
        for id in ids {
            let scenario = journalist_scenario(Some(id)).unwrap();
            assert_eq!(scenario.questions().len(), 3);
        }
    }

    #[test]
    fn test_context_lines_are_preserved() {
        let scenario = journalist_scenario(Some("crisis-layoffs")).unwrap();
        assert!(scenario.context.contains("(approximately 500 employees).\nThe spokesperson"));
        assert_eq!(scenario.questions()[0].follow_ups.len(), 2);
    }

    #[test]
    fn test_unknown_id() {
        assert!(journalist_scenario(Some("nope")).is_none());
        assert!(journalist_scenario(None).is_none());
    }
}
