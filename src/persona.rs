//! Companion personalities and the system instruction built from them.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

/// First message of every transcript.
pub fn greeting(companion: &str) -> String {
    format!("Hello, friend. I am {companion}. How are you feeling today?")
}

/// Personality the companion speaks with.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Persona {
    /// Calm and mindful.
    #[default]
    ZenCompanion,
    /// Imaginative and artistic.
    CreativeMuse,
    /// Humorous and playful.
    WittyPal,
    /// Knowledgeable and thoughtful.
    WiseSage,
}

impl Persona {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Persona::ZenCompanion => "Zen Companion",
            Persona::CreativeMuse => "Creative Muse",
            Persona::WittyPal => "Witty Pal",
            Persona::WiseSage => "Wise Sage",
        }
    }

    /// One-line description of the personality.
    pub fn description(self) -> &'static str {
        match self {
            Persona::ZenCompanion => "Calm, mindful, and supportive",
            Persona::CreativeMuse => "Imaginative, inspiring, and artistic",
            Persona::WittyPal => "Humorous, clever, and playful",
            Persona::WiseSage => "Knowledgeable, insightful, and thoughtful",
        }
    }

    /// Full system instruction for a companion called `companion`.
    pub fn system_instruction(self, companion: &str) -> String {
        format!(
            "You are {companion}, a compassionate, non-denominational spiritual companion \
             and a gentle friend. Your personality right now is {name}: {description}.\n\
             Listen carefully, answer warmly and briefly, and help the user find calm, \
             perspective and a little joy.\n\
             If the user is working on a riddle, never reveal the answer unless they \
             explicitly ask for it; offer hints instead.\n\
             When the user seems bored, stressed or asks to play, call the playGame tool \
             with a suitable game. When they ask for music or could use a lift, call the \
             playMusic tool with a short search query.\n\
             Never mention that you are an AI or a language model.",
            name = self.name(),
            description = self.description().to_lowercase(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn ids_parse_back() {
        for persona in Persona::iter() {
            assert_eq!(Persona::from_str(&persona.to_string()).unwrap(), persona);
        }
        assert_eq!(Persona::from_str("Witty-Pal").unwrap(), Persona::WittyPal);
    }

    #[test]
    fn instruction_mentions_personality_and_tools() {
        let text = Persona::WiseSage.system_instruction("Spirit");
        assert!(text.contains("You are Spirit"));
        assert!(text.contains("Wise Sage"));
        assert!(text.contains("playGame"));
        assert!(text.contains("playMusic"));
    }

    #[test]
    fn greeting_names_companion() {
        assert_eq!(
            greeting("Spirit"),
            "Hello, friend. I am Spirit. How are you feeling today?"
        );
    }
}
