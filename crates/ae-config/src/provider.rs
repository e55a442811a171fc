//! Provider configuration
//!
//! A provider is configured either as a single-key object naming the provider
//! (`{"objectPathLookup": "/trigger/quote"}`) or as a bare literal, which
//! becomes a static value. Objects whose single key is not a provider name
//! are literals too; `{"static": ...}` forces a literal.

use crate::error::{ConfigError, ConfigResult};
use ae_core::{ConfiguredError, Value};
use ae_provider::{
    AndCondition, AsValue, BoxProvider, ComparisonOperator, ConfiguredErrorProvider,
    CountListProvider, DynamicObjectProvider, FileProvider, FromValue, ListProvider,
    NotCondition, NumberComparison, ObjectPathLookup, ObjectPathLookupExists, OrCondition,
    ProviderExt, StaticProvider, TextCondition, TextOperator, Typed, ValueEqualsCondition,
};
use serde_json::{Map, Value as JsonValue};
use std::fmt::Debug;
use tracing::trace;

/// Names of the configurable providers
pub mod provider_names {
    pub const STATIC: &str = "static";
    pub const OBJECT_PATH_LOOKUP: &str = "objectPathLookup";
    pub const OBJECT_PATH_LOOKUP_EXISTS: &str = "objectPathLookupExists";
    pub const LIST: &str = "list";
    pub const OBJECT: &str = "object";
    pub const FILE: &str = "file";
    pub const COUNT_LIST: &str = "countList";
    pub const AND: &str = "and";
    pub const OR: &str = "or";
    pub const NOT: &str = "not";
    pub const TEXT_STARTS_WITH: &str = "textStartsWith";
    pub const TEXT_ENDS_WITH: &str = "textEndsWith";
    pub const TEXT_CONTAINS: &str = "textContains";
    pub const TEXT_EQUALS: &str = "textEquals";
    pub const VALUE_EQUALS: &str = "valueEquals";
    pub const NUMBER_GREATER_THAN: &str = "numberGreaterThan";
    pub const NUMBER_GREATER_THAN_OR_EQUAL: &str = "numberGreaterThanOrEqual";
    pub const NUMBER_LESS_THAN: &str = "numberLessThan";
    pub const NUMBER_LESS_THAN_OR_EQUAL: &str = "numberLessThanOrEqual";
    pub const NUMBER_EQUALS: &str = "numberEquals";

    pub const ALL: &[&str] = &[
        STATIC,
        OBJECT_PATH_LOOKUP,
        OBJECT_PATH_LOOKUP_EXISTS,
        LIST,
        OBJECT,
        FILE,
        COUNT_LIST,
        AND,
        OR,
        NOT,
        TEXT_STARTS_WITH,
        TEXT_ENDS_WITH,
        TEXT_CONTAINS,
        TEXT_EQUALS,
        VALUE_EQUALS,
        NUMBER_GREATER_THAN,
        NUMBER_GREATER_THAN_OR_EQUAL,
        NUMBER_LESS_THAN,
        NUMBER_LESS_THAN_OR_EQUAL,
        NUMBER_EQUALS,
    ];
}

use provider_names as names;

/// Compiles provider configuration into providers
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderBuilder;

impl ProviderBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Provider of an arbitrary value
    pub fn value(&self, config: &JsonValue) -> ConfigResult<BoxProvider<Value>> {
        let Some((name, args)) = provider_call(config) else {
            return Ok(StaticProvider::<Value>::new(Value::from(config.clone())).boxed());
        };
        trace!(provider = name, "Building provider");

        let provider = match name {
            names::STATIC => StaticProvider::<Value>::new(Value::from(args.clone())).boxed(),
            names::OBJECT_PATH_LOOKUP => self.lookup(args)?,
            names::LIST => {
                let items = array(name, args)?
                    .iter()
                    .map(|item| self.value(item))
                    .collect::<ConfigResult<Vec<_>>>()?;
                ListProvider::new(items).boxed()
            }
            names::OBJECT => {
                let properties = object(name, args)?
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), self.value(value)?)))
                    .collect::<ConfigResult<Vec<_>>>()?;
                DynamicObjectProvider::new(properties)
                    .map_err(|e| ConfigError::provider(name, e.to_string()))?
                    .boxed()
            }
            names::FILE => {
                let args = object(name, args)?;
                FileProvider::new(
                    self.typed(field(name, args, "fileName")?)?,
                    self.value(field(name, args, "content")?)?,
                )
                .boxed()
            }
            names::COUNT_LIST => AsValue::new(self.count(name, args)?).boxed(),
            _ => AsValue::new(self.condition(config)?).boxed(),
        };
        Ok(provider)
    }

    /// Provider converting a resolved value to `T`
    pub fn typed<T>(&self, config: &JsonValue) -> ConfigResult<BoxProvider<T>>
    where
        T: FromValue + Send + Debug + 'static,
    {
        Ok(Typed::<T>::new(self.value(config)?).boxed())
    }

    /// Boolean provider; condition providers are used directly
    pub fn condition(&self, config: &JsonValue) -> ConfigResult<BoxProvider<bool>> {
        let Some((name, args)) = provider_call(config) else {
            return self.typed(config);
        };

        let condition = match name {
            names::OBJECT_PATH_LOOKUP_EXISTS => {
                ObjectPathLookupExists::new(string(name, args)?).boxed()
            }
            names::AND => AndCondition::new(self.conditions(name, args)?).boxed(),
            names::OR => OrCondition::new(self.conditions(name, args)?).boxed(),
            names::NOT => NotCondition::new(self.condition(args)?).boxed(),
            names::TEXT_STARTS_WITH => self.text(name, TextOperator::StartsWith, args)?,
            names::TEXT_ENDS_WITH => self.text(name, TextOperator::EndsWith, args)?,
            names::TEXT_CONTAINS => self.text(name, TextOperator::Contains, args)?,
            names::TEXT_EQUALS => self.text(name, TextOperator::Equals, args)?,
            names::VALUE_EQUALS => {
                let args = object(name, args)?;
                ValueEqualsCondition::new(
                    self.value(field(name, args, "left")?)?,
                    self.value(field(name, args, "right")?)?,
                )
                .boxed()
            }
            names::NUMBER_GREATER_THAN => {
                self.compare(name, ComparisonOperator::GreaterThan, args)?
            }
            names::NUMBER_GREATER_THAN_OR_EQUAL => {
                self.compare(name, ComparisonOperator::GreaterThanOrEqual, args)?
            }
            names::NUMBER_LESS_THAN => self.compare(name, ComparisonOperator::LessThan, args)?,
            names::NUMBER_LESS_THAN_OR_EQUAL => {
                self.compare(name, ComparisonOperator::LessThanOrEqual, args)?
            }
            names::NUMBER_EQUALS => self.compare(name, ComparisonOperator::Equal, args)?,
            _ => self.typed(config)?,
        };
        Ok(condition)
    }

    /// Integer provider; `countList` is used directly
    pub fn integer(&self, config: &JsonValue) -> ConfigResult<BoxProvider<i64>> {
        match provider_call(config) {
            Some((name, args)) if name == names::COUNT_LIST => self.count(name, args),
            _ => self.typed(config),
        }
    }

    /// Provider of a configured error.
    ///
    /// Expects an object with `code`, `title`, `message` and
    /// `httpStatusCode`, plus optional `additionalDetails` and `data`. Each
    /// field is itself a provider configuration.
    pub fn configured_error(
        &self,
        config: &JsonValue,
    ) -> ConfigResult<BoxProvider<ConfiguredError>> {
        let name = "configuredError";
        let args = object(name, config)?;

        let code = field(name, args, "code")?;
        if code.as_str().is_some_and(|code| code.trim().is_empty()) {
            return Err(ConfigError::provider(name, "error code must not be empty"));
        }

        let mut provider = ConfiguredErrorProvider::new(
            self.typed(code)?,
            self.typed(field(name, args, "title")?)?,
            self.typed(field(name, args, "message")?)?,
            self.typed(field(name, args, "httpStatusCode")?)?,
        );
        if let Some(details) = args.get("additionalDetails") {
            provider = provider.with_additional_details(self.typed(details)?);
        }
        if let Some(data) = args.get("data") {
            provider = provider.with_data(self.value(data)?);
        }
        Ok(provider.boxed())
    }

    fn lookup(&self, args: &JsonValue) -> ConfigResult<BoxProvider<Value>> {
        let name = names::OBJECT_PATH_LOOKUP;
        let provider = match args {
            JsonValue::String(path) => ObjectPathLookup::new(path.as_str()),
            JsonValue::Object(args) => {
                let lookup = ObjectPathLookup::new(string(name, field(name, args, "path")?)?);
                match args.get("default") {
                    Some(default) => lookup.with_default(Value::from(default.clone())),
                    None => lookup,
                }
            }
            _ => return Err(ConfigError::provider(name, "expected a path or {path, default}")),
        };
        Ok(provider.boxed())
    }

    fn count(&self, name: &str, args: &JsonValue) -> ConfigResult<BoxProvider<i64>> {
        let list: BoxProvider<Vec<Value>> = self.typed(args)?;
        trace!(provider = name, "Building list count");
        Ok(CountListProvider::new(list).boxed())
    }

    fn conditions(&self, name: &str, args: &JsonValue) -> ConfigResult<Vec<BoxProvider<bool>>> {
        array(name, args)?
            .iter()
            .map(|condition| self.condition(condition))
            .collect()
    }

    fn text(
        &self,
        name: &str,
        operator: TextOperator,
        args: &JsonValue,
    ) -> ConfigResult<BoxProvider<bool>> {
        let args = object(name, args)?;
        let ignore_case = args
            .get("ignoreCase")
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        Ok(TextCondition::new(
            operator,
            self.typed(field(name, args, "text")?)?,
            self.typed(field(name, args, "value")?)?,
        )
        .ignore_case(ignore_case)
        .boxed())
    }

    fn compare(
        &self,
        name: &str,
        operator: ComparisonOperator,
        args: &JsonValue,
    ) -> ConfigResult<BoxProvider<bool>> {
        let args = object(name, args)?;
        Ok(NumberComparison::new(
            operator,
            self.typed(field(name, args, "left")?)?,
            self.typed(field(name, args, "right")?)?,
        )
        .boxed())
    }
}

/// Provider name and arguments of a single-key provider object
fn provider_call(config: &JsonValue) -> Option<(&str, &JsonValue)> {
    let map = config.as_object()?;
    if map.len() != 1 {
        return None;
    }
    let (name, args) = map.iter().next()?;
    names::ALL
        .contains(&name.as_str())
        .then_some((name.as_str(), args))
}

fn object<'a>(name: &str, args: &'a JsonValue) -> ConfigResult<&'a Map<String, JsonValue>> {
    args.as_object()
        .ok_or_else(|| ConfigError::provider(name, "expected an object"))
}

fn array<'a>(name: &str, args: &'a JsonValue) -> ConfigResult<&'a Vec<JsonValue>> {
    args.as_array()
        .ok_or_else(|| ConfigError::provider(name, "expected a list"))
}

fn string<'a>(name: &str, args: &'a JsonValue) -> ConfigResult<&'a str> {
    args.as_str()
        .ok_or_else(|| ConfigError::provider(name, "expected a string"))
}

fn field<'a>(
    name: &str,
    args: &'a Map<String, JsonValue>,
    key: &str,
) -> ConfigResult<&'a JsonValue> {
    args.get(key)
        .ok_or_else(|| ConfigError::provider(name, format!("missing '{key}'")))
}
