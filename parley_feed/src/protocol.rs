//! Inbound wire protocol.
//!
//! The backend pushes JSON frames shaped `{ "type": ..., "data": ... }`.
//! Only `conversation_update` is recognized; anything else (including
//! the profile-builder chat frames, which carry no `type` field at all)
//! is ignored. A frame that names the right type but fails to decode is
//! an error scoped to that single frame: the caller drops it and keeps
//! listening.

use parley_core::ConversationTurn;
use serde::Deserialize;
use serde_json::Value;

/// Frame type tag for conversation updates.
pub const CONVERSATION_UPDATE: &str = "conversation_update";

/// Envelope as it appears on the wire. `type` and `data` are both
/// optional so that unrecognized shapes deserialize instead of erroring.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: Option<String>,

    data: Option<Value>,
}

/// Result of decoding one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A conversation update to feed the reducer.
    Turn(ConversationTurn),

    /// Recognizably-shaped frame of a kind we do not consume.
    Ignored,
}

/// Decodes one text frame.
///
/// Unknown or absent `type` values yield `Ignored`; a malformed envelope
/// or a malformed `conversation_update` payload yields the decode error
/// for the caller to log and drop.
pub fn decode_frame(text: &str) -> Result<InboundEvent, serde_json::Error> {
    let frame: RawFrame = serde_json::from_str(text)?;

    match frame.kind.as_deref() {
        Some(CONVERSATION_UPDATE) => {
            let turn: ConversationTurn =
                serde_json::from_value(frame.data.unwrap_or(Value::Null))?;
            Ok(InboundEvent::Turn(turn))
        }
        _ => Ok(InboundEvent::Ignored),
    }
}
