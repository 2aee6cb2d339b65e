use std::cell::RefCell;

use super::*;
use crate::pipeline::stage4_classify::classify;

enum Reply {
    Text(&'static str),
    Connection,
    RateLimited,
    Http(u16),
    Malformed,
}

struct StubClient {
    reply: Reply,
    seen: RefCell<Vec<(String, String)>>,
}

impl StubClient {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl NarrativeClient for StubClient {
    fn complete(&self, system: &str, prompt: &str) -> std::result::Result<String, NarrativeError> {
        self.seen
            .borrow_mut()
            .push((system.to_string(), prompt.to_string()));
        match self.reply {
            Reply::Text(t) => Ok(t.to_string()),
            Reply::Connection => Err(NarrativeError::Connection("refused".to_string())),
            Reply::RateLimited => Err(NarrativeError::RateLimited),
            Reply::Http(status) => Err(NarrativeError::Http {
                status,
                body: "oops".to_string(),
            }),
            Reply::Malformed => Err(NarrativeError::Malformed("not json".to_string())),
        }
    }
}

fn biomarkers() -> BiomarkerSet {
    BiomarkerSet::from_volumes(3100.0, 2800.0, 1500.0, 1400.0, &[2.3])
}

fn scores(mmse: i32, cdr: f64, adas: f64) -> CognitiveScores {
    CognitiveScores::new(mmse, cdr, adas).unwrap()
}

#[test]
fn test_remote_text_returned_verbatim() {
    let client = StubClient::new(Reply::Text("  remote **report**\n"));
    let s = scores(24, 0.5, 12.0);
    let stage = classify(24, 0.5, 12.0).unwrap();
    let out = run_stage5(Some(&client), &biomarkers(), &s, stage).unwrap();
    assert_eq!(out.text, "  remote **report**\n");
    assert_eq!(out.source, NarrativeSource::Remote);

    let seen = client.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, SYSTEM_PROMPT);
    assert!(seen[0].1.contains("| MMSE | 27-30 | 24 |"));
    assert!(seen[0].1.contains("Hippocampal Volume (L/R): 3100.00/2800.00"));
}

#[test]
fn test_unreachable_service_falls_back_with_same_stage() {
    for (mmse, cdr, adas) in [(30, 0.0, 0.0), (24, 0.5, 12.0), (18, 1.0, 40.0), (30, 0.25, 5.0)] {
        let client = StubClient::new(Reply::Connection);
        let stage = classify(mmse, cdr, adas).unwrap();
        let out = run_stage5(Some(&client), &biomarkers(), &scores(mmse, cdr, adas), stage).unwrap();
        assert_eq!(out.source, NarrativeSource::Fallback);
        assert!(out.text.contains(stage.label()));
    }
}

#[test]
fn test_rate_limit_falls_back() {
    let client = StubClient::new(Reply::RateLimited);
    let stage = classify(20, 0.0, 0.0).unwrap();
    let out = run_stage5(Some(&client), &biomarkers(), &scores(20, 0.0, 0.0), stage).unwrap();
    assert_eq!(out.source, NarrativeSource::Fallback);
    assert!(out.text.contains("Alzheimer's"));
}

#[test]
fn test_no_client_falls_back() {
    let stage = classify(29, 0.0, 3.0).unwrap();
    let out = run_stage5(None, &biomarkers(), &scores(29, 0.0, 3.0), stage).unwrap();
    assert_eq!(out.source, NarrativeSource::Fallback);
    assert!(out.text.contains("Normal Cognition"));
}

#[test]
fn test_malformed_response_propagates() {
    let client = StubClient::new(Reply::Malformed);
    let stage = classify(29, 0.0, 3.0).unwrap();
    let err = run_stage5(Some(&client), &biomarkers(), &scores(29, 0.0, 3.0), stage).unwrap_err();
    assert!(matches!(err, AppError::ReportGeneration(_)));
}

#[test]
fn test_server_error_propagates() {
    let client = StubClient::new(Reply::Http(500));
    let stage = classify(29, 0.0, 3.0).unwrap();
    let err = run_stage5(Some(&client), &biomarkers(), &scores(29, 0.0, 3.0), stage).unwrap_err();
    assert!(err.to_string().contains("HTTP 500"));
}

#[test]
fn test_transient_classification() {
    assert!(NarrativeError::Connection(String::new()).is_transient());
    assert!(NarrativeError::RateLimited.is_transient());
    assert!(!NarrativeError::Malformed(String::new()).is_transient());
    assert!(
        !NarrativeError::Http {
            status: 401,
            body: String::new()
        }
        .is_transient()
    );
}

#[test]
fn test_client_requires_key_and_enabled() {
    let mut config = NarrativeConfig::default();
    config.api_key = None;
    assert!(ChatCompletionClient::from_config(&config).is_none());

    config.api_key = Some("sk-test".to_string());
    let client = ChatCompletionClient::from_config(&config).unwrap();
    assert_eq!(client.url, "https://api.openai.com/v1/chat/completions");

    config.enabled = false;
    assert!(ChatCompletionClient::from_config(&config).is_none());
}

#[test]
fn test_closed_port_is_transient_and_falls_back() {
    let config = NarrativeConfig {
        endpoint: "http://127.0.0.1:9/v1/".to_string(),
        api_key: Some("sk-test".to_string()),
        timeout_secs: 5,
        ..NarrativeConfig::default()
    };
    let client = ChatCompletionClient::from_config(&config).unwrap();
    assert_eq!(client.url, "http://127.0.0.1:9/v1/chat/completions");

    let err = client.complete(SYSTEM_PROMPT, "ping").unwrap_err();
    assert!(err.is_transient(), "unexpected error: {err}");

    let stage = classify(22, 0.0, 10.0).unwrap();
    let out = run_stage5(Some(&client), &biomarkers(), &scores(22, 0.0, 10.0), stage).unwrap();
    assert_eq!(out.source, NarrativeSource::Fallback);
    assert!(out.text.contains(stage.label()));
}

#[test]
fn test_request_wire_format() {
    let request = ChatRequest {
        model: "gpt-4-turbo",
        messages: [
            ChatMessage {
                role: "system",
                content: "sys",
            },
            ChatMessage {
                role: "user",
                content: "hi",
            },
        ],
        temperature: 0.5,
        max_tokens: 2000,
    };
    let v = serde_json::to_value(&request).unwrap();
    assert_eq!(v["model"], "gpt-4-turbo");
    assert_eq!(v["messages"][1]["role"], "user");
    assert_eq!(v["max_tokens"], 2000);
}

#[test]
fn test_response_wire_format() {
    let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"done"}}]}"#;
    let parsed: ChatResponse = serde_json::from_str(body).unwrap();
    assert_eq!(parsed.choices[0].message.content.as_deref(), Some("done"));
}
