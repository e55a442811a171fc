//! Compiling and running automation definitions

use ae_action::{ActionHandler, HandlerError};
use ae_config::{parse_automation, ActionBuilder, ActionRegistry, ConfigError, Format};
use ae_core::{AutomationData, ExternalData, ObjectPath, Value};
use async_trait::async_trait;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

fn compile(yaml: &str, registry: ActionRegistry) -> Result<ae_action::Automation, ConfigError> {
    let config = parse_automation(yaml, Format::Yaml, Path::new("test.yaml"))?;
    ActionBuilder::new(registry).build_automation(&config)
}

fn ctx(trigger: serde_json::Value) -> Arc<AutomationData> {
    Arc::new(AutomationData::new(Value::from(trigger)))
}

const QUOTE: &str = r#"
name: quote
actions:
  - type: setVariable
    alias: setCustomer
    propertyName: name
    path: customer
    value:
      objectPathLookup: /trigger/name
  - type: iterate
    alias: drivers
    list:
      objectPathLookup: /trigger/drivers
    actions:
      - type: setVariable
        alias: lastDriver
        propertyName: lastDriver
        value:
          objectPathLookup: /actions/drivers/currentIteration/item
  - type: group
    alias: checks
    parallel: true
    actions:
      - type: raiseError
        alias: tooYoung
        runCondition:
          numberLessThan:
            left:
              objectPathLookup: /trigger/age
            right: 18
        error:
          code: quote.declined.age
          title: Declined
          message: Driver is too young
          httpStatusCode: 409
      - type: setVariable
        alias: checked
        propertyName: checked
        value: true
"#;

#[tokio::test]
async fn test_compiled_automation_runs() {
    let automation = compile(QUOTE, ActionRegistry::default()).unwrap();
    let ctx = ctx(json!({"name": "Peter", "age": 30, "drivers": ["ann", "bob"]}));

    let outcome = automation.run(&ctx).await;

    assert!(outcome.succeeded(), "{:?}", outcome.error);
    assert_eq!(
        Value::Object(ctx.variables().await).to_json(),
        json!({"customer": {"name": "Peter"}, "lastDriver": "bob", "checked": true})
    );
    assert_eq!(outcome.actions["drivers"].iterate().unwrap().iterations_completed, 2);
}

#[tokio::test]
async fn test_compiled_error_surfaces() {
    let automation = compile(QUOTE, ActionRegistry::default()).unwrap();
    let ctx = ctx(json!({"name": "Peter", "age": 17, "drivers": []}));

    let outcome = automation.run(&ctx).await;

    let error = outcome.error.unwrap();
    assert_eq!(error.code, "quote.declined.age");
    assert_eq!(error.http_status_code, 409);
    // the parallel sibling still ran
    assert_eq!(
        ctx.lookup(&ObjectPath::parse("/variables/checked")).await,
        Some(Value::Bool(true))
    );
}

#[tokio::test]
async fn test_error_actions_and_conditions() {
    let yaml = r#"
name: guarded
actions:
  - type: setVariable
    alias: guarded
    propertyName: status
    value: accepted
    beforeRunErrorConditions:
      - condition:
          objectPathLookupExists: /trigger/blocked
        error:
          code: quote.blocked
          title: Blocked
          message: Customer is blocked
          httpStatusCode: 403
    errorActions:
      - type: setVariable
        alias: recordBlock
        propertyName: status
        value:
          objectPathLookup: /actions/guarded/error/code
"#;
    let automation = compile(yaml, ActionRegistry::default()).unwrap();
    let ctx = ctx(json!({"blocked": true}));

    let outcome = automation.run(&ctx).await;

    assert!(outcome.succeeded());
    assert!(!outcome.actions["guarded"].succeeded);
    assert_eq!(
        ctx.lookup(&ObjectPath::parse("/variables/status")).await,
        Some(Value::from("quote.blocked"))
    );
}

#[test]
fn test_duplicate_sibling_alias_rejected() {
    let yaml = r#"
name: duplicate
actions:
  - type: group
    alias: steps
    actions:
      - type: setVariable
        alias: same
        propertyName: a
      - type: setVariable
        alias: same
        propertyName: b
"#;
    let err = compile(yaml, ActionRegistry::default()).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateAlias { alias } if alias == "same"));
}

#[test]
fn test_same_alias_in_different_scopes_allowed() {
    let yaml = r#"
name: scopes
actions:
  - type: group
    alias: first
    actions:
      - type: setVariable
        alias: inner
        propertyName: a
  - type: group
    alias: second
    actions:
      - type: setVariable
        alias: inner
        propertyName: b
"#;
    assert!(compile(yaml, ActionRegistry::default()).is_ok());
}

#[test]
fn test_unknown_action_type() {
    let yaml = r#"
name: unknown
actions:
  - type: sendEmail
    alias: mail
"#;
    let err = compile(yaml, ActionRegistry::default()).unwrap_err();
    assert!(
        matches!(err, ConfigError::UnknownActionType { action_type, .. } if action_type == "sendEmail")
    );
}

#[test]
fn test_invalid_property_name_rejected_at_build() {
    let yaml = r#"
name: invalid
actions:
  - type: setVariable
    alias: set
    propertyName: Not Valid
"#;
    let err = compile(yaml, ActionRegistry::default()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[derive(Debug)]
struct Greeter;

#[async_trait]
impl ActionHandler for Greeter {
    fn type_name(&self) -> &str {
        "greet"
    }

    async fn handle(
        &self,
        ctx: &AutomationData,
        output: &mut ExternalData,
    ) -> Result<(), HandlerError> {
        let name = ctx
            .lookup(&ObjectPath::parse("/trigger/name"))
            .await
            .ok_or_else(|| anyhow::anyhow!("no name in trigger"))?;
        output.output = Some(Value::from(format!("Hello {}", name.to_text())));
        Ok(())
    }
}

#[tokio::test]
async fn test_registered_handler() {
    let mut registry = ActionRegistry::default();
    registry.register_handler(Arc::new(Greeter));
    assert!(registry.contains("greet"));

    let yaml = r#"
name: greeting
actions:
  - type: greet
    alias: hello
  - type: setVariable
    alias: copy
    propertyName: greeting
    value:
      objectPathLookup: /actions/hello/output
"#;
    let automation = compile(yaml, registry).unwrap();
    let ctx = ctx(json!({"name": "Peter"}));

    let outcome = automation.run(&ctx).await;

    assert!(outcome.succeeded());
    assert_eq!(
        ctx.lookup(&ObjectPath::parse("/variables/greeting")).await,
        Some(Value::from("Hello Peter"))
    );
}

#[tokio::test]
async fn test_handler_unexpected_error_is_wrapped() {
    let mut registry = ActionRegistry::default();
    registry.register_handler(Arc::new(Greeter));

    let yaml = r#"
name: greeting
actions:
  - type: greet
    alias: hello
"#;
    let automation = compile(yaml, registry).unwrap();

    let outcome = automation.run(&ctx(json!({}))).await;

    assert_eq!(outcome.error.unwrap().code, ae_core::codes::ACTION_FAILED);
}
