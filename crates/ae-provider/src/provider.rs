//! The provider contract and the generic providers

use crate::error::{ProviderError, ProviderResult};
use ae_core::{AutomationData, Value};
use async_trait::async_trait;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

/// Lazily resolves a value of type `T` from the run context.
///
/// Resolution may suspend (nested providers, I/O backed providers) and must
/// not mutate the context.
#[async_trait]
pub trait Provider<T>: Send + Sync + Debug {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<T>;
}

/// Shared, type-erased provider
pub type BoxProvider<T> = Arc<dyn Provider<T>>;

/// Convenience conversion into a [`BoxProvider`]
pub trait ProviderExt<T>: Provider<T> + Sized + 'static {
    fn boxed(self) -> BoxProvider<T> {
        Arc::new(self)
    }
}

impl<T, P: Provider<T> + 'static> ProviderExt<T> for P {}

/// Always resolves to the same value
#[derive(Debug, Clone)]
pub struct StaticProvider<T> {
    value: T,
}

impl<T> StaticProvider<T> {
    pub fn new(value: impl Into<T>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[async_trait]
impl<T> Provider<T> for StaticProvider<T>
where
    T: Clone + Send + Sync + Debug,
{
    async fn resolve(&self, _ctx: &AutomationData) -> ProviderResult<T> {
        Ok(self.value.clone())
    }
}

/// Conversion of a resolved [`Value`] into a concrete type
pub trait FromValue: Sized {
    /// Kind name reported on mismatch
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "any";

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_value(value: Value) -> Option<Self> {
        match &value {
            Value::String(s) => s.trim().parse().ok(),
            other => other.as_i64(),
        }
    }
}

impl FromValue for f64 {
    const EXPECTED: &'static str = "number";

    fn from_value(value: Value) -> Option<Self> {
        match &value {
            Value::String(s) => s.trim().parse().ok(),
            other => other.as_f64(),
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "text";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            Value::Bool(_) | Value::Number(_) => Some(value.to_text()),
            _ => None,
        }
    }
}

impl FromValue for Vec<Value> {
    const EXPECTED: &'static str = "list";

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

/// Resolves a [`Value`] and converts it to `T`
#[derive(Debug)]
pub struct Typed<T> {
    inner: BoxProvider<Value>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Typed<T> {
    pub fn new(inner: BoxProvider<Value>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> Provider<T> for Typed<T>
where
    T: FromValue + Send + Debug + 'static,
{
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<T> {
        let value = self.inner.resolve(ctx).await?;
        let found = value.type_name();
        T::from_value(value).ok_or(ProviderError::TypeMismatch {
            expected: T::EXPECTED,
            found,
        })
    }
}

/// Resolves a typed provider and exposes the result as a [`Value`]
#[derive(Debug)]
pub struct AsValue<T> {
    inner: BoxProvider<T>,
}

impl<T> AsValue<T> {
    pub fn new(inner: BoxProvider<T>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T> Provider<Value> for AsValue<T>
where
    T: Into<Value> + Send + Debug + 'static,
{
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<Value> {
        Ok(self.inner.resolve(ctx).await?.into())
    }
}
