//! Persona catalog — the closed set of response styles.
//!
//! Each persona is bound to exactly one [`PromptTemplate`] with two named
//! substitution points, `{history}` and `{input}`. Selection is an exhaustive
//! `match`, so adding a persona without a template does not compile.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DEFAULT_TEMPLATE: &str = "You are a helpful AI assistant.
Current conversation:
{history}
Human: {input}
AI:";

const EXPERT_TEMPLATE: &str = "You are an expert consultant with deep knowledge across multiple fields.
Please provide detailed, technical responses when appropriate.
Current conversation:
{history}
Human: {input}
Expert:";

const CREATIVE_TEMPLATE: &str = "You are a creative and imaginative AI that thinks outside the box.
Feel free to use metaphors and analogies in your responses.
Current conversation:
{history}
Human: {input}
Creative AI:";

/// A named response style.
///
/// Deserializes through [`FromStr`], so names from JSON or TOML are matched
/// case-insensitively just like CLI arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Persona {
    #[default]
    Default,
    Expert,
    Creative,
}

impl Persona {
    pub const ALL: [Persona; 3] = [Persona::Default, Persona::Expert, Persona::Creative];

    /// The prompt template bound to this persona.
    pub fn template(self) -> PromptTemplate {
        let text = match self {
            Persona::Default => DEFAULT_TEMPLATE,
            Persona::Expert => EXPERT_TEMPLATE,
            Persona::Creative => CREATIVE_TEMPLATE,
        };
        PromptTemplate::new(text)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Persona::Default => "Default",
            Persona::Expert => "Expert",
            Persona::Creative => "Creative",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Persona::Default => "A helpful general-purpose assistant",
            Persona::Expert => "Detailed, technical answers from an expert consultant",
            Persona::Creative => "Imaginative answers with metaphors and analogies",
        }
    }

    /// The speaker label the template ends with.
    pub fn assistant_label(self) -> &'static str {
        match self {
            Persona::Default => "AI",
            Persona::Expert => "Expert",
            Persona::Creative => "Creative AI",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a persona name is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown persona '{0}' (expected Default, Expert or Creative)")]
pub struct UnknownPersona(pub String);

impl FromStr for Persona {
    type Err = UnknownPersona;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Persona::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPersona(s.to_string()))
    }
}

impl TryFrom<String> for Persona {
    type Error = UnknownPersona;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A prompt template with `{history}` and `{input}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    text: &'static str,
}

impl PromptTemplate {
    pub const INPUT_VARIABLES: [&'static str; 2] = ["history", "input"];

    const fn new(text: &'static str) -> Self {
        Self { text }
    }

    pub fn as_str(&self) -> &'static str {
        self.text
    }

    /// Substitute both placeholders in a single left-to-right pass.
    ///
    /// Braces inside `history` or `input` are copied verbatim and never
    /// expanded.
    pub fn format(&self, history: &str, input: &str) -> String {
        let mut out = String::with_capacity(self.text.len() + history.len() + input.len());
        let mut rest = self.text;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open..];
            if let Some(tail) = after.strip_prefix("{history}") {
                out.push_str(history);
                rest = tail;
            } else if let Some(tail) = after.strip_prefix("{input}") {
                out.push_str(input);
                rest = tail;
            } else {
                out.push('{');
                rest = &after[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_has_both_placeholders_once() {
        for persona in Persona::ALL {
            let text = persona.template().as_str();
            for var in PromptTemplate::INPUT_VARIABLES {
                let placeholder = format!("{{{var}}}");
                assert_eq!(
                    text.matches(&placeholder).count(),
                    1,
                    "{persona} template must contain {placeholder} exactly once"
                );
            }
        }
    }

    #[test]
    fn format_substitutes_history_and_input() {
        let prompt = Persona::Default
            .template()
            .format("Human: hi\nAI: hello", "how are you?");
        assert_eq!(
            prompt,
            "You are a helpful AI assistant.\nCurrent conversation:\nHuman: hi\nAI: hello\nHuman: how are you?\nAI:"
        );
    }

    #[test]
    fn format_does_not_expand_braces_in_values() {
        let prompt = Persona::Default.template().format("{input}", "{history} {x}");
        assert!(prompt.contains("Current conversation:\n{input}\n"));
        assert!(prompt.contains("Human: {history} {x}\n"));
    }

    #[test]
    fn switching_persona_only_changes_the_wrapper() {
        let history = "Human: ping\nAI: pong";
        let input = "again";
        for persona in Persona::ALL {
            let prompt = persona.template().format(history, input);
            let template = persona.template().as_str();
            let (head, tail) = template.split_once("{history}").unwrap();
            let (middle, end) = tail.split_once("{input}").unwrap();
            assert_eq!(prompt, format!("{head}{history}{middle}{input}{end}"));
            assert!(prompt.ends_with(&format!("{}:", persona.assistant_label())));
        }
    }

    #[test]
    fn parse_persona_names() {
        assert_eq!("expert".parse::<Persona>().unwrap(), Persona::Expert);
        assert_eq!(" Creative ".parse::<Persona>().unwrap(), Persona::Creative);
        assert_eq!("DEFAULT".parse::<Persona>().unwrap(), Persona::Default);
        assert!("pirate".parse::<Persona>().is_err());
    }

    #[test]
    fn persona_serializes_as_display_name() {
        let json = serde_json::to_string(&Persona::Creative).unwrap();
        assert_eq!(json, "\"Creative\"");
        assert_eq!(Persona::default(), Persona::Default);
    }

    #[test]
    fn persona_deserializes_case_insensitively() {
        let p: Persona = serde_json::from_str("\"expert\"").unwrap();
        assert_eq!(p, Persona::Expert);
        let p: Persona = serde_json::from_str("\"CREATIVE\"").unwrap();
        assert_eq!(p, Persona::Creative);

        let err = serde_json::from_str::<Persona>("\"pirate\"").unwrap_err();
        assert!(err.to_string().contains("unknown persona"));
    }
}
