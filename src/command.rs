//! Gesture commands: the typed bridge between the vision classifier and
//! theme selection.

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Classified intent produced by the vision collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureCommand {
    /// No recognizable gesture; leaves the theme unchanged.
    #[default]
    None,
    SwitchFire,
    SwitchGalaxy,
    SwitchNature,
    SwitchLove,
    /// Back to the default theme.
    Reset,
}

impl GestureCommand {
    /// The theme this command selects, if any.
    pub fn theme(self) -> Option<Theme> {
        match self {
            GestureCommand::None => None,
            GestureCommand::SwitchFire => Some(Theme::Fire),
            GestureCommand::SwitchGalaxy => Some(Theme::Galaxy),
            GestureCommand::SwitchNature => Some(Theme::Nature),
            GestureCommand::SwitchLove => Some(Theme::Love),
            GestureCommand::Reset => Some(Theme::Default),
        }
    }
}

fn default_reasoning() -> String {
    "No reasoning provided".to_string()
}

/// Result of one gesture classification.
///
/// Missing fields in the wire payload fall back to a no-op command with zero
/// confidence rather than failing the parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionResponse {
    #[serde(default)]
    pub command: GestureCommand,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default = "default_reasoning")]
    pub reasoning: String,
}

impl VisionResponse {
    /// A new classification result.
    pub fn new(command: GestureCommand, confidence: f32, reasoning: impl Into<String>) -> Self {
        Self {
            command,
            confidence,
            reasoning: reasoning.into(),
        }
    }

    /// The degraded result used when classification fails: no change, zero
    /// confidence, diagnostic text.
    pub fn failure(reasoning: impl Into<String>) -> Self {
        Self::new(GestureCommand::None, 0.0, reasoning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_to_theme_mapping() {
        assert_eq!(GestureCommand::None.theme(), None);
        assert_eq!(GestureCommand::SwitchFire.theme(), Some(Theme::Fire));
        assert_eq!(GestureCommand::SwitchGalaxy.theme(), Some(Theme::Galaxy));
        assert_eq!(GestureCommand::SwitchNature.theme(), Some(Theme::Nature));
        assert_eq!(GestureCommand::SwitchLove.theme(), Some(Theme::Love));
        assert_eq!(GestureCommand::Reset.theme(), Some(Theme::Default));
    }

    #[test]
    fn test_command_wire_names() {
        assert_eq!(
            serde_json::to_string(&GestureCommand::SwitchFire).unwrap(),
            "\"SWITCH_FIRE\""
        );
        assert_eq!(
            serde_json::from_str::<GestureCommand>("\"NONE\"").unwrap(),
            GestureCommand::None
        );
        assert_eq!(
            serde_json::from_str::<GestureCommand>("\"RESET\"").unwrap(),
            GestureCommand::Reset
        );
    }

    #[test]
    fn test_response_defaults() {
        let response: VisionResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.command, GestureCommand::None);
        assert_eq!(response.confidence, 0.0);
        assert_eq!(response.reasoning, "No reasoning provided");
    }

    #[test]
    fn test_failure_response() {
        let response = VisionResponse::failure("Error analyzing image");
        assert_eq!(response.command, GestureCommand::None);
        assert_eq!(response.confidence, 0.0);
        assert_eq!(response.reasoning, "Error analyzing image");
    }
}
