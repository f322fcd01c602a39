//! OpenAI request building and response parsing.

use retort::prompt::ComposedPrompt;
use retort::providers::openai::{build_request, parse_response};
use retort::providers::ProviderError;

fn prompt() -> ComposedPrompt {
    ComposedPrompt {
        system: "You are terse.".to_owned(),
        user: "Say hi.".to_owned(),
        temperature: 0.7,
        max_tokens: 128,
    }
}

#[test]
fn request_carries_system_then_user_message() {
    let request = build_request("gpt-4o-mini", &prompt());

    assert_eq!(request.model, "gpt-4o-mini");
    assert_eq!(request.temperature, 0.7);
    assert_eq!(request.max_tokens, 128);
    assert_eq!(request.messages.len(), 2);
    assert_eq!(request.messages[0].role, "system");
    assert_eq!(request.messages[0].content, "You are terse.");
    assert_eq!(request.messages[1].role, "user");
    assert_eq!(request.messages[1].content, "Say hi.");
}

#[test]
fn request_serializes_with_the_expected_field_names() {
    let value = serde_json::to_value(build_request("m", &prompt())).expect("serializes");
    assert!(value.get("model").is_some());
    assert!(value.get("messages").is_some());
    assert!(value.get("temperature").is_some());
    assert!(value.get("max_tokens").is_some());
}

#[test]
fn response_parsing_takes_the_first_choice() {
    let body = r#"{
        "choices": [
            {"message": {"content": "first"}},
            {"message": {"content": "second"}}
        ]
    }"#;
    assert_eq!(parse_response(body).expect("parses"), "first");
}

#[test]
fn null_content_parses_as_empty_text() {
    let body = r#"{"choices": [{"message": {"content": null}}]}"#;
    assert_eq!(parse_response(body).expect("parses"), "");
}

#[test]
fn empty_choices_is_a_parse_error() {
    let body = r#"{"choices": []}"#;
    assert!(matches!(
        parse_response(body),
        Err(ProviderError::Parse(msg)) if msg.contains("choices")
    ));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        parse_response("not json"),
        Err(ProviderError::Parse(_))
    ));
}
