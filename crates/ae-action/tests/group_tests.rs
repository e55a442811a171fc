//! Group action tests: ordering, timing and error surfacing

mod common;

use ae_action::ActionRunner;
use ae_core::{codes, ActionState, Value};
use common::*;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const STEP: u64 = 300;

#[tokio::test]
async fn test_sequential_group_runs_in_order() {
    let ctx = ctx();
    let finished = Arc::new(Mutex::new(Vec::new()));
    let action = group(
        "steps",
        vec![
            sleep("a", STEP, &finished),
            sleep("b", STEP, &finished),
            sleep("c", STEP, &finished),
        ],
        false,
    );
    let mut data = action.create_action_data();

    let started = Instant::now();
    ActionRunner::new()
        .handle_action(&ctx, &action, &mut data)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(2 * STEP));
    assert_eq!(*finished.lock().unwrap(), vec!["a", "b", "c"]);
    assert!(data.succeeded);

    let children: Vec<_> = data.group().unwrap().children.keys().cloned().collect();
    assert_eq!(children, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_parallel_group_overlaps_children() {
    let ctx = ctx();
    let finished = Arc::new(Mutex::new(Vec::new()));
    let action = group(
        "steps",
        vec![
            sleep("a", STEP, &finished),
            sleep("b", STEP, &finished),
            sleep("c", STEP, &finished),
        ],
        true,
    );
    let mut data = action.create_action_data();

    let started = Instant::now();
    ActionRunner::new()
        .handle_action(&ctx, &action, &mut data)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(2 * STEP));
    assert_eq!(finished.lock().unwrap().len(), 3);

    // records keep declaration order regardless of completion order
    let group = data.group().unwrap();
    assert!(group.parallel);
    let children: Vec<_> = group.children.keys().cloned().collect();
    assert_eq!(children, vec!["a", "b", "c"]);
    assert!(group.children.values().all(|child| child.succeeded));
}

#[tokio::test]
async fn test_sequential_group_stops_at_first_error() {
    let ctx = ctx();
    let action = group(
        "steps",
        vec![
            set_var("first", "first", true),
            raise("fail", "quote.declined"),
            set_var("second", "second", true),
        ],
        false,
    );
    let mut data = action.create_action_data();

    let err = ActionRunner::new()
        .handle_action(&ctx, &action, &mut data)
        .await
        .unwrap_err();

    assert_eq!(err.code, "quote.declined");
    assert!(!data.succeeded);
    assert_eq!(variable(&ctx, "first").await, Some(Value::Bool(true)));
    assert_eq!(variable(&ctx, "second").await, None);

    let children = &data.group().unwrap().children;
    assert!(children.contains_key("fail"));
    assert!(!children.contains_key("second"));
}

#[tokio::test]
async fn test_parallel_group_lets_siblings_finish() {
    let ctx = ctx();
    let finished = Arc::new(Mutex::new(Vec::new()));
    let action = group(
        "steps",
        vec![
            raise("fail", "quote.declined"),
            group(
                "slow",
                vec![sleep("wait", 100, &finished), set_var("set", "done", true)],
                false,
            ),
        ],
        true,
    );
    let mut data = action.create_action_data();

    let err = ActionRunner::new()
        .handle_action(&ctx, &action, &mut data)
        .await
        .unwrap_err();

    assert_eq!(err.code, "quote.declined");
    assert_eq!(variable(&ctx, "done").await, Some(Value::Bool(true)));
    assert!(data.group().unwrap().children["slow"].succeeded);
}

#[tokio::test]
async fn test_parallel_group_reports_first_declared_error() {
    let ctx = ctx();
    let finished = Arc::new(Mutex::new(Vec::new()));
    let action = group(
        "steps",
        vec![
            group(
                "slow",
                vec![sleep("wait", 150, &finished), raise("late", "late.error")],
                false,
            ),
            raise("early", "early.error"),
        ],
        true,
    );
    let mut data = action.create_action_data();

    let err = ActionRunner::new()
        .handle_action(&ctx, &action, &mut data)
        .await
        .unwrap_err();

    assert_eq!(err.code, "late.error");
    let children = &data.group().unwrap().children;
    assert_eq!(children["early"].error.as_ref().unwrap().code, "early.error");
}

#[tokio::test]
async fn test_empty_group_succeeds() {
    let ctx = ctx();
    let action = group("empty", Vec::new(), true);
    let mut data = action.create_action_data();

    ActionRunner::new()
        .handle_action(&ctx, &action, &mut data)
        .await
        .unwrap();

    assert_eq!(data.state, ActionState::Completed);
    assert!(data.succeeded);
    assert!(data.group().unwrap().children.is_empty());
}

#[tokio::test]
async fn test_parallel_writes_are_not_lost() {
    let ctx = ctx();
    let children = (0..20)
        .map(|i| set_var(&format!("set{i}"), &format!("v{i}"), i as i64))
        .collect();
    let action = group("writes", children, true);
    let mut data = action.create_action_data();

    ActionRunner::new()
        .handle_action(&ctx, &action, &mut data)
        .await
        .unwrap();

    assert_eq!(ctx.variables().await.len(), 20);
}

#[tokio::test]
async fn test_parallel_sibling_is_hidden_until_complete() {
    let ctx = ctx();
    let finished = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let action = group(
        "steps",
        vec![
            sleep("slow", STEP, &finished),
            group(
                "peek",
                vec![
                    sleep("pause", 50, &finished),
                    record("look", "/actions/slow/state", &seen),
                ],
                false,
            ),
        ],
        true,
    );
    let mut data = action.create_action_data();

    ActionRunner::new()
        .handle_action(&ctx, &action, &mut data)
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![Value::Null]);
    assert_eq!(
        ctx.action("slow").await.unwrap().to_json()["state"],
        serde_json::json!("completed")
    );
}

#[tokio::test]
async fn test_group_error_actions_absorb_child_error() {
    let ctx = ctx();
    let guarded = group(
        "guarded",
        vec![set_var("ok", "ok", true), raise("fail", "quote.declined")],
        false,
    )
    .with_error_actions(vec![Arc::new(set_var("handled", "handled", true))]);
    let action = group(
        "outer",
        vec![guarded, group("after", vec![set_var("next", "next", true)], false)],
        false,
    );
    let mut data = action.create_action_data();

    ActionRunner::new()
        .handle_action(&ctx, &action, &mut data)
        .await
        .unwrap();

    assert!(data.succeeded);
    let children = &data.group().unwrap().children;

    let guarded = &children["guarded"];
    assert!(!guarded.succeeded);
    let error = guarded.error.as_ref().unwrap();
    assert_eq!(error.code, "quote.declined");
    assert_eq!(error.message, "quote.declined was raised");
    assert!(guarded.error_actions["handled"].succeeded);

    assert!(children["after"].succeeded);
    assert_eq!(variable(&ctx, "ok").await, Some(Value::Bool(true)));
    assert_eq!(variable(&ctx, "handled").await, Some(Value::Bool(true)));
    assert_eq!(variable(&ctx, "next").await, Some(Value::Bool(true)));
}

#[tokio::test]
async fn test_handler_panic_fails_the_action_in_both_modes() {
    for parallel in [false, true] {
        let ctx = ctx();
        let action = group(
            "steps",
            vec![panicking("boom"), set_var("after", "after", true)],
            parallel,
        );
        let mut data = action.create_action_data();

        let err = ActionRunner::new()
            .handle_action(&ctx, &action, &mut data)
            .await
            .unwrap_err();

        assert_eq!(err.code, codes::ACTION_FAILED, "parallel: {parallel}");
        assert!(err.message.contains("handler gave up"), "{}", err.message);
        let boom = &data.group().unwrap().children["boom"];
        assert_eq!(boom.state, ActionState::Completed);
        assert!(!boom.succeeded);
    }
}
