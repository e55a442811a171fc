//! Per-run execution record of one action

use crate::error::{codes, AutomationResult, ConfiguredError};
use crate::state::ActionState;
use crate::value::Value;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Mutable audit record for one execution attempt of an action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionData {
    pub name: String,

    pub alias: String,

    #[serde(rename = "type")]
    pub action_type: String,

    pub state: ActionState,

    pub started_timestamp: Option<DateTime<Utc>>,

    pub completed_timestamp: Option<DateTime<Utc>>,

    pub error: Option<ConfiguredError>,

    pub succeeded: bool,

    /// Records of error-handling actions, keyed by alias
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub error_actions: IndexMap<String, ActionData>,

    /// Type-specific execution detail, flattened into the record
    #[serde(flatten)]
    pub detail: ActionDetail,
}

/// Type-specific part of an [`ActionData`]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionDetail {
    Group(GroupData),
    Iterate(IterateData),
    RaiseError,
    SetVariable(SetVariableData),
    External(ExternalData),
}

/// Children of a group, keyed by alias in declaration order
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupData {
    pub parallel: bool,
    pub children: IndexMap<String, ActionData>,
}

/// Resolved settings and progress of an iterate action
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterateData {
    pub start_index: Option<i64>,
    pub end_index: Option<i64>,
    pub reverse: bool,
    pub iterations_completed: usize,
    pub last_iteration: Option<IterationItem>,
    pub current_iteration: Option<IterationItem>,
    pub iterations: Vec<IterationRecord>,
}

/// Index and item of one iteration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationItem {
    pub index: usize,
    pub item: Value,
}

/// Child records of one iteration
#[derive(Debug, Clone, Serialize)]
pub struct IterationRecord {
    pub index: usize,
    pub actions: IndexMap<String, ActionData>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVariableData {
    pub property_name: Option<String>,
    pub path: Option<String>,
    pub value: Option<Value>,
}

/// Output recorded by an externally implemented action
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExternalData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl ActionData {
    pub fn new(
        name: impl Into<String>,
        alias: impl Into<String>,
        action_type: impl Into<String>,
        detail: ActionDetail,
    ) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
            action_type: action_type.into(),
            state: ActionState::NotStarted,
            started_timestamp: None,
            completed_timestamp: None,
            error: None,
            succeeded: false,
            error_actions: IndexMap::new(),
            detail,
        }
    }

    /// Move to the next lifecycle state.
    ///
    /// Invalid transitions are reported as configured errors so they flow
    /// through the regular error path.
    pub fn transition(&mut self, to: ActionState) -> AutomationResult<()> {
        self.state = self.state.try_transition(to).map_err(|e| {
            ConfiguredError::new(
                codes::INVALID_STATE_TRANSITION,
                "Invalid action state transition",
                format!("Action \"{}\": {}", self.alias, e),
                500,
            )
        })?;
        match to {
            ActionState::Started => self.started_timestamp = Some(Utc::now()),
            ActionState::Skipped | ActionState::Completed => {
                self.completed_timestamp = Some(Utc::now())
            }
            _ => {}
        }
        Ok(())
    }

    /// Record an error; the action is no longer considered successful
    pub fn record_error(&mut self, error: ConfiguredError) {
        self.error = Some(error);
        self.succeeded = false;
    }

    /// Mark as completed from whatever non-terminal state the run stopped in
    pub fn finish(&mut self, succeeded: bool) {
        if !self.state.is_terminal() {
            self.state = ActionState::Completed;
            self.completed_timestamp = Some(Utc::now());
        }
        self.succeeded = succeeded && self.error.is_none();
    }

    pub fn group(&self) -> Option<&GroupData> {
        match &self.detail {
            ActionDetail::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn group_mut(&mut self) -> Option<&mut GroupData> {
        match &mut self.detail {
            ActionDetail::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn iterate(&self) -> Option<&IterateData> {
        match &self.detail {
            ActionDetail::Iterate(iterate) => Some(iterate),
            _ => None,
        }
    }

    pub fn iterate_mut(&mut self) -> Option<&mut IterateData> {
        match &mut self.detail {
            ActionDetail::Iterate(iterate) => Some(iterate),
            _ => None,
        }
    }

    pub fn set_variable_mut(&mut self) -> Option<&mut SetVariableData> {
        match &mut self.detail {
            ActionDetail::SetVariable(data) => Some(data),
            _ => None,
        }
    }

    pub fn external_mut(&mut self) -> Option<&mut ExternalData> {
        match &mut self.detail {
            ActionDetail::External(data) => Some(data),
            _ => None,
        }
    }

    /// Snapshot for publication in the context's action registry.
    ///
    /// Nested records (group children, iterations, error actions) are left
    /// out; nested actions publish under their own aliases. The snapshot stays
    /// the same size however many iterations have run.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(RegistrySnapshot::from(self))
            .map(Value::from)
            .unwrap_or(Value::Null)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegistrySnapshot<'a> {
    name: &'a str,
    alias: &'a str,
    #[serde(rename = "type")]
    action_type: &'a str,
    state: ActionState,
    started_timestamp: Option<DateTime<Utc>>,
    completed_timestamp: Option<DateTime<Utc>>,
    error: Option<&'a ConfiguredError>,
    succeeded: bool,
    #[serde(flatten)]
    detail: DetailSnapshot<'a>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum DetailSnapshot<'a> {
    Group { parallel: bool },
    Iterate(IterateSnapshot<'a>),
    RaiseError,
    SetVariable(&'a SetVariableData),
    External(&'a ExternalData),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IterateSnapshot<'a> {
    start_index: Option<i64>,
    end_index: Option<i64>,
    reverse: bool,
    iterations_completed: usize,
    last_iteration: Option<&'a IterationItem>,
    current_iteration: Option<&'a IterationItem>,
}

impl<'a> From<&'a ActionData> for RegistrySnapshot<'a> {
    fn from(data: &'a ActionData) -> Self {
        let detail = match &data.detail {
            ActionDetail::Group(group) => DetailSnapshot::Group {
                parallel: group.parallel,
            },
            ActionDetail::Iterate(iterate) => DetailSnapshot::Iterate(IterateSnapshot {
                start_index: iterate.start_index,
                end_index: iterate.end_index,
                reverse: iterate.reverse,
                iterations_completed: iterate.iterations_completed,
                last_iteration: iterate.last_iteration.as_ref(),
                current_iteration: iterate.current_iteration.as_ref(),
            }),
            ActionDetail::RaiseError => DetailSnapshot::RaiseError,
            ActionDetail::SetVariable(set) => DetailSnapshot::SetVariable(set),
            ActionDetail::External(external) => DetailSnapshot::External(external),
        };
        Self {
            name: &data.name,
            alias: &data.alias,
            action_type: &data.action_type,
            state: data.state,
            started_timestamp: data.started_timestamp,
            completed_timestamp: data.completed_timestamp,
            error: data.error.as_ref(),
            succeeded: data.succeeded,
            detail,
        }
    }
}
