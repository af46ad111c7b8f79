use chatmark_core::llm::validate_turn_order;
use chatmark_core::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Replays canned replies and records every request it was given.
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<&str, &str>>) -> (Self, Arc<Mutex<Vec<Vec<Message>>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            requests: requests.clone(),
        };
        (client, requests)
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, ChatmarkError> {
        validate_turn_order(messages)?;
        self.requests.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(LlmResponse {
                content: text,
                usage: Some(Usage {
                    input_tokens: 5,
                    output_tokens: 2,
                }),
            }),
            Some(Err(e)) => Err(ChatmarkError::Llm(e)),
            None => Err(ChatmarkError::Llm("script exhausted".into())),
        }
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn temperature(&self) -> f32 {
        0.0
    }
}

fn scripted_session(replies: Vec<Result<&str, &str>>) -> (ChatSession, Arc<Mutex<Vec<Vec<Message>>>>) {
    let (client, requests) = ScriptedClient::new(replies);
    (ChatSession::new(Box::new(client)), requests)
}

#[tokio::test]
async fn test_send_records_exchange_under_active_prompt() {
    let (mut session, _) = scripted_session(vec![Ok("Hello!")]);
    session.set_system_prompt("You are helpful.");

    let reply = session.send("Hi").await.unwrap();

    assert_eq!(reply, "Hello!");
    let groups = session.log().prompt_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].system_prompt, "You are helpful.");
    assert_eq!(groups[0].exchanges[0].user_message, "Hi");
    assert_eq!(groups[0].exchanges[0].bot_response, "Hello!");
    assert!(groups[0].exchanges[0].user_message_time <= groups[0].exchanges[0].bot_response_time);
}

#[tokio::test]
async fn test_log_meta_comes_from_client() {
    let (session, _) = scripted_session(vec![]);
    assert_eq!(session.log().meta().model_name, "scripted-model");
    assert_eq!(session.log().meta().temperature, 0.0);
}

#[tokio::test]
async fn test_requests_replay_history_under_current_prompt() {
    let (mut session, requests) = scripted_session(vec![Ok("r1"), Ok("r2")]);
    session.set_system_prompt("A");
    session.send("q1").await.unwrap();
    session.set_system_prompt("B");
    session.send("q2").await.unwrap();

    let requests = requests.lock().unwrap();
    let second = &requests[1];
    assert_eq!(second[0], Message::system("B"));
    assert_eq!(second[1], Message::user("q1"));
    assert_eq!(second[2], Message::assistant("r1"));
    assert_eq!(second[3], Message::user("q2"));
    assert_eq!(session.log().prompt_groups().len(), 2);
}

#[tokio::test]
async fn test_failed_completion_leaves_log_unchanged() {
    let (mut session, _) = scripted_session(vec![Ok("fine"), Err("provider down"), Ok("back")]);

    session.send("one").await.unwrap();
    let err = session.send("two").await.unwrap_err();
    assert!(err.to_string().contains("provider down"));
    assert_eq!(session.log().exchange_count(), 1);
    assert_eq!(session.usage().request_count, 1);

    // The session keeps working after the failure
    session.send("three").await.unwrap();
    let sent: Vec<&str> = session
        .log()
        .exchanges()
        .map(|e| e.user_message.as_str())
        .collect();
    assert_eq!(sent, vec!["one", "three"]);
}

#[tokio::test]
async fn test_undo_and_clear_are_visible_in_export() {
    let dir = TempDir::new().unwrap();
    let (session, _) = scripted_session(vec![Ok("r1"), Ok("r2")]);
    let mut session = session
        .with_output_dir(dir.path())
        .with_session_id("undo-test");

    session.send("keep me").await.unwrap();
    session.send("drop me").await.unwrap();
    let undone = session.undo_last_exchange().unwrap();
    assert_eq!(undone.user_message, "drop me");

    let path = session.export_at(chrono::Local::now()).unwrap();
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("keep me"));
    assert!(!content.contains("drop me"));

    session.clear_session();
    assert!(session.log().is_empty());
    assert_eq!(session.usage(), UsageTotals::default());
    assert_eq!(session.session_id(), "undo-test");
}

#[tokio::test]
async fn test_export_confirmation_names_the_file() {
    let dir = TempDir::new().unwrap();
    let (session, _) = scripted_session(vec![]);
    let session = session
        .with_output_dir(dir.path().join("out"))
        .with_session_id("abc");

    let message = session.export().unwrap();
    assert!(message.starts_with("Chat history saved to "));
    assert!(message.ends_with("_abc.md"));
}

#[tokio::test]
async fn test_snapshot_reflects_session_state() {
    let (mut session, _) = scripted_session(vec![Ok("r1"), Ok("r2")]);
    session.set_session_id("snap");
    session.set_system_prompt("A");
    session.send("q1").await.unwrap();
    session.set_system_prompt("B");
    session.send("q2").await.unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.session_id, "snap");
    assert_eq!(snapshot.system_prompt, "B");
    assert_eq!(snapshot.exchange_count(), 2);
    assert_eq!(snapshot.prompt_groups.len(), 2);
    assert_eq!(snapshot.prompt_groups[1].exchanges[0].bot_response, "r2");
    assert_eq!(snapshot.usage.total_input_tokens, 10);
}
