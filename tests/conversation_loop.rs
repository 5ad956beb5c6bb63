//! End-to-end behavior of the conversation loop with a scripted assistant.

mod common;

use common::{metrics_call, LoopingAssistant, ScriptedAssistant};
use health_metrics_agent::checkpoint::NullCheckpointStore;
use health_metrics_agent::{
    AgentBuilder, AssistantReply, CheckpointStore, ConversationState, Error, ErrorContext,
    MemoryCheckpointStore, Message, MessageRole, ProtocolError, ToolCall,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn agent_with(assistant: Arc<ScriptedAssistant>) -> health_metrics_agent::ConversationLoop {
    AgentBuilder::new().assistant(assistant).build().unwrap()
}

#[tokio::test]
async fn test_plain_answer_terminates_after_one_step() {
    let assistant = Arc::new(ScriptedAssistant::replying(vec![AssistantReply::text(
        "Please tell me your weight in kg.",
    )]));
    let state = agent_with(assistant.clone()).run("hello").await.unwrap();

    assert_eq!(assistant.calls(), 1);
    assert_eq!(state.len(), 2);
    assert_eq!(state.messages()[0], Message::user("hello"));
    assert_eq!(state.final_answer(), Some("Please tell me your weight in kg."));
}

#[tokio::test]
async fn test_invalid_weight_is_reported_back_and_loop_continues() {
    let assistant = Arc::new(ScriptedAssistant::replying(vec![
        AssistantReply::tool_calls("", vec![metrics_call("c1", 300.0)]),
        AssistantReply::tool_calls("", vec![metrics_call("c2", 70.0)]),
        AssistantReply::text("Your BMI is 24.2 (Normal Weight)."),
    ]));
    let state = agent_with(assistant.clone())
        .run("I weigh 300kg, 170cm, 30, male")
        .await
        .unwrap();

    let roles: Vec<MessageRole> = state.messages().iter().map(|m| m.role()).collect();
    assert_eq!(
        roles,
        [
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
            MessageRole::Assistant,
            MessageRole::Tool,
            MessageRole::Assistant,
        ]
    );
    assert_eq!(
        state.messages()[2],
        Message::tool_result(
            "c1",
            "Error: Weight must be between 40-200 kg. Got: 300kg\nplease fix your mistakes."
        )
    );

    let report: Value = serde_json::from_str(state.messages()[4].text()).unwrap();
    assert_eq!(report["bmi"], json!(24.2));
    assert_eq!(report["bmr"], 1618);
    assert_eq!(report["tdee"], 2507);
    assert_eq!(report["recommended_calories"]["mild_loss"], 2007);

    // The second assistant step saw the error and nothing after it.
    let seen = assistant.seen();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[1].len(), 3);
    assert!(seen[1].last().unwrap().text().ends_with("please fix your mistakes."));
    assert_eq!(state.final_answer(), Some("Your BMI is 24.2 (Normal Weight)."));
}

#[tokio::test]
async fn test_batch_with_one_failure_keeps_request_order() {
    let assistant = Arc::new(ScriptedAssistant::replying(vec![
        AssistantReply::tool_calls("", vec![metrics_call("ok", 70.0), metrics_call("bad", 20.0)]),
        AssistantReply::text("done"),
    ]));
    let state = agent_with(assistant).run("two people").await.unwrap();

    match (&state.messages()[2], &state.messages()[3]) {
        (
            Message::ToolResult {
                tool_call_id: first,
                content: first_content,
            },
            Message::ToolResult {
                tool_call_id: second,
                content: second_content,
            },
        ) => {
            assert_eq!(first, "ok");
            assert!(first_content.contains("\"bmi\""));
            assert_eq!(second, "bad");
            assert_eq!(
                second_content,
                "Error: Weight must be between 40-200 kg. Got: 20kg\nplease fix your mistakes."
            );
        }
        other => panic!("expected two tool results, got {:?}", other),
    }
    assert!(state.pending_tool_calls().is_empty());
}

#[tokio::test]
async fn test_parallel_dispatch_matches_sequential_transcript() {
    let script = || {
        vec![
            AssistantReply::tool_calls(
                "",
                vec![
                    metrics_call("a", 55.0),
                    metrics_call("b", 500.0),
                    metrics_call("c", 95.0),
                ],
            ),
            AssistantReply::text("done"),
        ]
    };

    let sequential = agent_with(Arc::new(ScriptedAssistant::replying(script())))
        .run("batch")
        .await
        .unwrap();
    let parallel = AgentBuilder::new()
        .assistant(Arc::new(ScriptedAssistant::replying(script())))
        .parallel_tool_calls(true)
        .build()
        .unwrap()
        .run("batch")
        .await
        .unwrap();

    assert_eq!(sequential, parallel);
}

#[tokio::test]
async fn test_unknown_tool_and_bad_arguments_become_results() {
    let assistant = Arc::new(ScriptedAssistant::replying(vec![
        AssistantReply::tool_calls(
            "",
            vec![
                ToolCall::new("x", "tavily_search", json!({"query": "bmi"})),
                ToolCall::new("y", "calculate_health_metrics", json!({"weight_kg": "heavy"})),
            ],
        ),
        AssistantReply::text("sorry"),
    ]));
    let state = agent_with(assistant).run("search").await.unwrap();

    let unknown = state.messages()[2].text();
    assert!(unknown.starts_with("Error: Unknown tool 'tavily_search'"), "{unknown}");
    assert!(unknown.contains("calculate_health_metrics"));
    assert!(unknown.ends_with("\nplease fix your mistakes."));

    let invalid = state.messages()[3].text();
    assert!(invalid.starts_with("Error: Invalid arguments for tool 'calculate_health_metrics'"));
    assert_eq!(state.final_answer(), Some("sorry"));
}

#[tokio::test]
async fn test_recursion_limit_aborts_the_run() {
    let assistant = Arc::new(LoopingAssistant::default());
    let agent = AgentBuilder::new()
        .assistant(assistant.clone())
        .recursion_limit(3)
        .build()
        .unwrap();

    let err = agent.run("loop forever").await.unwrap_err();
    assert!(matches!(err, Error::RecursionLimit { limit: 3 }));
    assert_eq!(assistant.calls(), 3);
}

#[tokio::test]
async fn test_assistant_failure_propagates() {
    let assistant = Arc::new(ScriptedAssistant::new(vec![
        Ok(AssistantReply::tool_calls("", vec![metrics_call("c1", 70.0)])),
        Err(Error::assistant_with_context(
            "upstream unavailable",
            ErrorContext::new().with_source("test"),
        )),
    ]));
    let err = agent_with(assistant.clone()).run("hi").await.unwrap_err();

    assert!(matches!(err, Error::Assistant { .. }));
    assert!(err.to_string().contains("upstream unavailable"));
    assert_eq!(assistant.calls(), 2);
}

#[tokio::test]
async fn test_duplicate_tool_call_ids_are_a_protocol_error() {
    let assistant = Arc::new(ScriptedAssistant::replying(vec![AssistantReply::tool_calls(
        "",
        vec![metrics_call("same", 70.0), metrics_call("same", 80.0)],
    )]));
    let err = agent_with(assistant).run("hi").await.unwrap_err();

    match err {
        Error::Protocol(ProtocolError::DuplicateToolCallId { tool_call_id }) => {
            assert_eq!(tool_call_id, "same")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_session_is_resumed_from_checkpoint() {
    let store = Arc::new(MemoryCheckpointStore::new());
    let assistant = Arc::new(ScriptedAssistant::replying(vec![
        AssistantReply::text("How tall are you?"),
        AssistantReply::tool_calls("", vec![metrics_call("c1", 70.0)]),
        AssistantReply::text("BMI 24.2"),
    ]));
    let agent = AgentBuilder::new()
        .assistant(assistant.clone())
        .checkpoint_store(store.clone())
        .build()
        .unwrap();

    let first = agent.run_session("s1", "I weigh 70kg").await.unwrap();
    assert_eq!(first.len(), 2);

    let second = agent.run_session("s1", "170cm, 30, male").await.unwrap();
    assert_eq!(second.len(), 6);
    assert_eq!(second.messages()[..2], first.messages()[..]);
    assert_eq!(second.final_answer(), Some("BMI 24.2"));
    assert_eq!(assistant.seen()[1].len(), 3);

    let stored = store.get("s1").await.unwrap().unwrap();
    assert_eq!(stored, second);

    assert!(agent.reset_session("s1").await.unwrap());
    assert!(store.get("s1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_turn_keeps_previous_checkpoint() {
    let store = Arc::new(MemoryCheckpointStore::new());
    let assistant = Arc::new(ScriptedAssistant::replying(vec![AssistantReply::text(
        "What is your weight?",
    )]));
    let agent = AgentBuilder::new()
        .assistant(assistant)
        .checkpoint_store(store.clone())
        .build()
        .unwrap();

    let first = agent.run_session("s2", "hi").await.unwrap();
    // Script is exhausted, so the next assistant step fails.
    assert!(agent.run_session("s2", "70kg").await.is_err());
    assert_eq!(store.get("s2").await.unwrap().unwrap(), first);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let assistant = Arc::new(ScriptedAssistant::replying(vec![
        AssistantReply::text("a"),
        AssistantReply::text("b"),
    ]));
    let agent = AgentBuilder::new()
        .assistant(assistant.clone())
        .checkpoint_store(Arc::new(MemoryCheckpointStore::new()))
        .build()
        .unwrap();

    agent.run_session("one", "first").await.unwrap();
    let other = agent.run_session("two", "second").await.unwrap();
    assert_eq!(other.len(), 2);
    assert_eq!(other.messages()[0], Message::user("second"));
}

#[tokio::test]
async fn test_null_store_forgets_between_turns() {
    let assistant = Arc::new(ScriptedAssistant::replying(vec![
        AssistantReply::text("a"),
        AssistantReply::text("b"),
    ]));
    let agent = AgentBuilder::new()
        .assistant(assistant)
        .checkpoint_store(Arc::new(NullCheckpointStore::new()))
        .build()
        .unwrap();

    agent.run_session("s", "first").await.unwrap();
    let state = agent.run_session("s", "second").await.unwrap();
    assert_eq!(state.len(), 2);
}

#[tokio::test]
async fn test_zero_recursion_limit_is_rejected() {
    let err = AgentBuilder::new()
        .assistant(Arc::new(ScriptedAssistant::default()))
        .recursion_limit(0)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

#[tokio::test]
async fn test_resume_runs_pending_tool_calls_first() {
    let transcript = ConversationState::from_messages(vec![
        Message::user("70kg, 170cm, 30, male"),
        Message::assistant_with_tool_calls("", vec![metrics_call("c1", 70.0)]),
    ])
    .unwrap();
    let assistant = Arc::new(ScriptedAssistant::replying(vec![AssistantReply::text("done")]));

    let state = agent_with(assistant.clone()).resume(transcript).await.unwrap();

    let roles: Vec<MessageRole> = state.messages().iter().map(|m| m.role()).collect();
    assert_eq!(
        roles,
        [
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
            MessageRole::Assistant,
        ]
    );
    assert!(state.pending_tool_calls().is_empty());
    assert_eq!(assistant.calls(), 1);
    assert_eq!(assistant.seen()[0].last().map(|m| m.role()), Some(MessageRole::Tool));
    assert_eq!(state.final_answer(), Some("done"));
}

#[tokio::test]
async fn test_resume_without_pending_calls_starts_at_assistant() {
    let transcript = ConversationState::from_messages(vec![
        Message::user("hi"),
        Message::assistant("What is your weight?"),
        Message::user("70kg"),
    ])
    .unwrap();
    let assistant = Arc::new(ScriptedAssistant::replying(vec![AssistantReply::text(
        "And your height?",
    )]));

    let state = agent_with(assistant.clone()).resume(transcript).await.unwrap();
    assert_eq!(state.len(), 4);
    assert_eq!(assistant.seen()[0].len(), 3);
}

#[tokio::test]
async fn test_resume_rejects_empty_transcript() {
    let assistant = Arc::new(ScriptedAssistant::default());
    let err = agent_with(assistant.clone())
        .resume(ConversationState::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Protocol(ProtocolError::EmptyTranscript)));
    assert_eq!(assistant.calls(), 0);
}
