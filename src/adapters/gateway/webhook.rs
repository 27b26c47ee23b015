//! Evolution webhook payload parsing.
//!
//! Evolution posts every event to the same URL; only `messages.upsert`
//! carries inbound user text. Everything else (status updates, our own
//! outbound messages echoed back) is ignored.

use serde_json::Value;

use crate::domain::foundation::SessionId;

/// An inbound WhatsApp text message, reduced to what the conversation
/// manager needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender phone number with the `@s.whatsapp.net` suffix stripped.
    pub phone: String,
    pub text: String,
}

impl InboundMessage {
    /// Sessions for WhatsApp users are keyed by phone number, so the same
    /// person always lands on the same session.
    pub fn session_id(&self) -> SessionId {
        SessionId::derived_from_key(&self.phone)
    }
}

/// Extracts an inbound text message from a webhook payload, or `None` when
/// the event is not an inbound text (other event types, messages we sent
/// ourselves, media without a text body).
pub fn parse_webhook(payload: &Value) -> Option<InboundMessage> {
    let event = payload.get("event").and_then(Value::as_str)?;
    if event != "messages.upsert" {
        return None;
    }

    let data = payload.get("data")?;
    let key = data.get("key")?;

    // fromMe marks our own outbound messages echoed back by Evolution.
    if key.get("fromMe").and_then(Value::as_bool) == Some(true) {
        return None;
    }

    let remote_jid = key.get("remoteJid").and_then(Value::as_str)?;
    let phone = remote_jid
        .strip_suffix("@s.whatsapp.net")
        .unwrap_or(remote_jid)
        .to_string();

    let message = data.get("message")?;
    let text = message
        .get("conversation")
        .and_then(Value::as_str)
        .or_else(|| {
            message
                .pointer("/extendedTextMessage/text")
                .and_then(Value::as_str)
        })?
        .to_string();

    if text.trim().is_empty() {
        return None;
    }

    Some(InboundMessage { phone, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upsert(key: Value, message: Value) -> Value {
        json!({
            "event": "messages.upsert",
            "instance": "lawfirm_bot",
            "data": { "key": key, "message": message }
        })
    }

    #[test]
    fn parses_plain_conversation_message() {
        let payload = upsert(
            json!({ "remoteJid": "5511918368812@s.whatsapp.net", "fromMe": false }),
            json!({ "conversation": "Hello, I need a lawyer" }),
        );

        let inbound = parse_webhook(&payload).unwrap();
        assert_eq!(inbound.phone, "5511918368812");
        assert_eq!(inbound.text, "Hello, I need a lawyer");
    }

    #[test]
    fn parses_extended_text_message() {
        let payload = upsert(
            json!({ "remoteJid": "5511918368812@s.whatsapp.net", "fromMe": false }),
            json!({ "extendedTextMessage": { "text": "quoted reply" } }),
        );

        assert_eq!(parse_webhook(&payload).unwrap().text, "quoted reply");
    }

    #[test]
    fn ignores_own_outbound_messages() {
        let payload = upsert(
            json!({ "remoteJid": "5511918368812@s.whatsapp.net", "fromMe": true }),
            json!({ "conversation": "What is your name?" }),
        );

        assert!(parse_webhook(&payload).is_none());
    }

    #[test]
    fn ignores_other_event_types() {
        let payload = json!({
            "event": "connection.update",
            "data": { "state": "open" }
        });

        assert!(parse_webhook(&payload).is_none());
    }

    #[test]
    fn ignores_media_without_text() {
        let payload = upsert(
            json!({ "remoteJid": "5511918368812@s.whatsapp.net", "fromMe": false }),
            json!({ "imageMessage": { "url": "https://example.com/img.jpg" } }),
        );

        assert!(parse_webhook(&payload).is_none());
    }

    #[test]
    fn same_phone_maps_to_same_session() {
        let a = InboundMessage {
            phone: "5511918368812".to_string(),
            text: "hi".to_string(),
        };
        let b = InboundMessage {
            phone: "5511918368812".to_string(),
            text: "again".to_string(),
        };
        assert_eq!(a.session_id(), b.session_id());

        let other = InboundMessage {
            phone: "5511999999999".to_string(),
            text: "hi".to_string(),
        };
        assert_ne!(a.session_id(), other.session_id());
    }
}
