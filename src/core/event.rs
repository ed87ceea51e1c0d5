use serde::{Deserialize, Serialize};

use crate::core::store::UserId;

/// One user action delivered by the chat transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    pub user_id: UserId,
    pub kind: EventKind,
    /// Command name, button action id, or the typed answer text.
    pub payload: String,
    /// Supplied by the transport on first contact so the account can be
    /// registered with a readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Explicit event discriminant. Dispatch never pattern-matches display
/// strings, so a typed word can never fire a button handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Command,
    Button,
    Text,
}

/// Stable button action ids the transport sends back as payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    LearnNew,
    LearnSaved,
    NextCard,
    AddWord,
    DeleteWord,
    BackToMode,
}

impl ButtonAction {
    pub fn parse(payload: &str) -> Option<Self> {
        match payload {
            "learn_new" => Some(Self::LearnNew),
            "learn_saved" => Some(Self::LearnSaved),
            "next_card" => Some(Self::NextCard),
            "add_word" => Some(Self::AddWord),
            "delete_word" => Some(Self::DeleteWord),
            "back_to_mode" => Some(Self::BackToMode),
            _ => None,
        }
    }
}

/// Rendering instruction handed back to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundRender {
    pub text: String,
    /// Choice buttons in display order.
    pub choices: Vec<String>,
    /// Whether the next/add/delete/back affordances accompany the choices.
    pub card_actions: bool,
}

impl OutboundRender {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Vec::new(),
            card_actions: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_actions_parse_from_stable_ids() {
        assert_eq!(ButtonAction::parse("learn_new"), Some(ButtonAction::LearnNew));
        assert_eq!(ButtonAction::parse("next_card"), Some(ButtonAction::NextCard));
        assert_eq!(ButtonAction::parse("back_to_mode"), Some(ButtonAction::BackToMode));
        assert_eq!(ButtonAction::parse("Дальше ⏭"), None);
    }

    #[test]
    fn inbound_event_deserializes_from_transport_json() {
        let event: InboundEvent = serde_json::from_str(
            r#"{"userId": 42, "kind": "button", "payload": "learn_new"}"#,
        )
        .unwrap();
        assert_eq!(event.user_id, 42);
        assert_eq!(event.kind, EventKind::Button);
        assert_eq!(event.payload, "learn_new");
        assert!(event.display_name.is_none());
    }
}
