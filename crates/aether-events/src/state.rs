//! Application State Identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier for every application state the stack can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateId {
    SplashScreen,
    MainMenu,
    CharacterCreation,
    Loading,
    Gameplay,
    Combat,
    Dialogue,
    Inventory,
    CharacterSheet,
    QuestLog,
    WorldMap,
    Shop,
    Crafting,
    Settings,
    PauseMenu,
    SaveLoad,
    GameOver,
    Credits,
}

impl StateId {
    /// Returns all state identifiers.
    pub fn all() -> &'static [StateId] {
        &[
            StateId::SplashScreen,
            StateId::MainMenu,
            StateId::CharacterCreation,
            StateId::Loading,
            StateId::Gameplay,
            StateId::Combat,
            StateId::Dialogue,
            StateId::Inventory,
            StateId::CharacterSheet,
            StateId::QuestLog,
            StateId::WorldMap,
            StateId::Shop,
            StateId::Crafting,
            StateId::Settings,
            StateId::PauseMenu,
            StateId::SaveLoad,
            StateId::GameOver,
            StateId::Credits,
        ]
    }

    /// Stable snake_case name, identical to the serde encoding.
    pub fn name(self) -> &'static str {
        match self {
            StateId::SplashScreen => "splash_screen",
            StateId::MainMenu => "main_menu",
            StateId::CharacterCreation => "character_creation",
            StateId::Loading => "loading",
            StateId::Gameplay => "gameplay",
            StateId::Combat => "combat",
            StateId::Dialogue => "dialogue",
            StateId::Inventory => "inventory",
            StateId::CharacterSheet => "character_sheet",
            StateId::QuestLog => "quest_log",
            StateId::WorldMap => "world_map",
            StateId::Shop => "shop",
            StateId::Crafting => "crafting",
            StateId::Settings => "settings",
            StateId::PauseMenu => "pause_menu",
            StateId::SaveLoad => "save_load",
            StateId::GameOver => "game_over",
            StateId::Credits => "credits",
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error type for parsing a StateId from a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseStateError {
    unknown: String,
}

impl fmt::Display for ParseStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown state: '{}'", self.unknown)
    }
}

impl std::error::Error for ParseStateError {}

impl FromStr for StateId {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        StateId::all()
            .iter()
            .copied()
            .find(|id| id.name() == lower)
            .ok_or_else(|| ParseStateError {
                unknown: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_matches_serde_encoding() {
        for id in StateId::all() {
            let json = serde_json::to_string(id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.name()));
        }
    }

    #[test]
    fn test_parse_roundtrip() {
        for id in StateId::all() {
            let parsed: StateId = id.name().parse().unwrap();
            assert_eq!(parsed, *id);
        }
        assert!("lobby".parse::<StateId>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(StateId::PauseMenu.to_string(), "pause_menu");
    }
}
