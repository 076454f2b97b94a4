use super::*;

#[test]
fn deserializes_wire_message_with_renamed_text_field() {
    let payload = r#"{"message_id":"m1","sender":"ai","message":"hi","timestamp":"2026-08-24T10:00:00Z"}"#;
    let message: ChatMessage = serde_json::from_str(payload).expect("message should parse");
    assert_eq!(message.message_id, "m1");
    assert_eq!(message.sender, Sender::Ai);
    assert_eq!(message.text, "hi");
    assert_eq!(message.timestamp.as_deref(), Some("2026-08-24T10:00:00Z"));
}

#[test]
fn timestamp_is_optional_on_the_wire() {
    let payload = r#"{"message_id":"m1","sender":"user","message":"hello"}"#;
    let message: ChatMessage = serde_json::from_str(payload).expect("message should parse");
    assert_eq!(message.sender, Sender::User);
    assert!(message.timestamp.is_none());
}

#[test]
fn serializes_back_to_the_wire_field_names() {
    let message = ChatMessage {
        message_id: "m1".to_string(),
        sender: Sender::Ai,
        text: "hi".to_string(),
        timestamp: None,
    };
    let json = serde_json::to_value(&message).expect("message should serialize");
    assert_eq!(json["message"], "hi");
    assert_eq!(json["sender"], "ai");
    assert!(json.get("text").is_none());
    assert!(json.get("timestamp").is_none());
}

#[test]
fn append_preserves_insertion_order() {
    let mut store = MessageStore::default();
    store.append(ChatMessage::local_user("user", "first"));
    store.append(ChatMessage::local_ai_error("second"));
    store.append(ChatMessage::local_user("user", "third"));

    let texts: Vec<&str> = store
        .messages()
        .iter()
        .map(|message| message.text.as_str())
        .collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(store.len(), 3);
    assert_eq!(store.last().map(|m| m.text.as_str()), Some("third"));
}

#[test]
fn replace_all_discards_prior_content() {
    let mut store = MessageStore::default();
    store.append(ChatMessage::local_user("user", "old"));

    store.replace_all(vec![ChatMessage {
        message_id: "m1".to_string(),
        sender: Sender::Ai,
        text: "hi".to_string(),
        timestamp: None,
    }]);
    assert_eq!(store.len(), 1);
    assert_eq!(store.messages()[0].message_id, "m1");

    store.clear();
    assert!(store.is_empty());
}

#[test]
fn local_constructors_stamp_prefix_sender_and_timestamp() {
    let user = ChatMessage::local_user("user_file", "You sent a file: resume.pdf");
    assert!(user.message_id.starts_with("user_file_"));
    assert_eq!(user.sender, Sender::User);
    assert!(user.timestamp.is_some());

    let error = ChatMessage::local_ai_error("boom");
    assert!(error.message_id.starts_with("err_"));
    assert_eq!(error.sender, Sender::Ai);
}
