//! Property-based tests for the completion wire layer
//!
//! - Context overflow is recognized whatever the status code
//! - Bodies that are not provider errors never look like overflow
//! - Status classes map to one error kind each
//! - Reply content and order survive parsing

use super::openai::{classify_error, parse_response};
use super::{LlmErrorKind, Role};
use proptest::prelude::*;
use serde_json::json;

fn arb_message() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.!?,]{1,80}"
}

fn arb_error_status() -> impl Strategy<Value = u16> {
    prop_oneof![Just(400u16), Just(401), Just(403), Just(404), Just(422), Just(429), 500u16..600]
}

proptest! {
    #[test]
    fn prop_overflow_code_wins(status in arb_error_status(), message in arb_message()) {
        let body = json!({
            "error": {
                "message": message,
                "type": "invalid_request_error",
                "code": "context_length_exceeded"
            }
        });
        let err = classify_error(status, &body.to_string());
        prop_assert_eq!(err.kind, LlmErrorKind::ContextLengthExceeded);
        prop_assert_eq!(err.message, message);
    }

    #[test]
    fn prop_plain_bodies_are_unknown(status in arb_error_status(), body in "[a-zA-Z <>/]{0,60}") {
        let err = classify_error(status, &body);
        prop_assert_eq!(err.kind, LlmErrorKind::Unknown);
        prop_assert!(err.message.contains(&status.to_string()));
    }

    #[test]
    fn prop_status_classes(status in arb_error_status(), message in arb_message()) {
        let body = json!({"error": {"message": message}});
        let kind = classify_error(status, &body.to_string()).kind;
        let expected = match status {
            401 | 403 => LlmErrorKind::Auth,
            429 => LlmErrorKind::RateLimit,
            400 | 404 | 422 => LlmErrorKind::InvalidRequest,
            _ => LlmErrorKind::ServerError,
        };
        prop_assert_eq!(kind, expected);
        prop_assert!(!kind.is_context_overflow());
    }

    #[test]
    fn prop_choices_preserved(contents in proptest::collection::vec(arb_message(), 1..4)) {
        let choices: Vec<_> = contents
            .iter()
            .enumerate()
            .map(|(index, content)| json!({
                "index": index,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }))
            .collect();
        let body = json!({"id": "chatcmpl-1", "choices": choices});

        let response = parse_response(&body.to_string()).unwrap();
        prop_assert_eq!(response.reply_text().unwrap(), contents[0].as_str());
        prop_assert_eq!(response.choices.len(), contents.len());
        for (choice, content) in response.choices.iter().zip(&contents) {
            prop_assert_eq!(choice.message.role, Role::Assistant);
            prop_assert_eq!(&choice.message.content, content);
        }
    }

    #[test]
    fn prop_truncated_json_is_malformed(cut in 1usize..40) {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "hello there"}}]
        })
        .to_string();
        let keep = body.chars().count().saturating_sub(cut);
        let truncated: String = body.chars().take(keep).collect();
        let err = parse_response(&truncated).unwrap_err();
        prop_assert_eq!(err.kind, LlmErrorKind::MalformedResponse);
    }
}
