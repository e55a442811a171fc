//! Providers
//!
//! A provider lazily resolves a typed value from the [`AutomationData`] of a
//! run. Providers are composable: static values, object path lookups,
//! list/object construction from other providers, and boolean conditions.
//!
//! Providers never mutate the context; all mutation goes through actions.
//!
//! # Key Types
//!
//! - [`Provider`] - The resolution contract
//! - [`BoxProvider`] - Shared, type-erased provider
//! - [`ProviderError`] - Resolution failures, convertible to configured errors
//!
//! [`AutomationData`]: ae_core::AutomationData

pub mod condition;
pub mod configured_error;
pub mod error;
pub mod lookup;
pub mod provider;
pub mod structure;

pub use condition::{
    AndCondition, ComparisonOperator, NotCondition, NumberComparison, OrCondition,
    TextCondition, TextOperator, ValueEqualsCondition,
};
pub use configured_error::ConfiguredErrorProvider;
pub use error::{ProviderError, ProviderResult};
pub use lookup::{ObjectPathLookup, ObjectPathLookupExists};
pub use provider::{AsValue, BoxProvider, FromValue, Provider, ProviderExt, StaticProvider, Typed};
pub use structure::{CountListProvider, DynamicObjectProvider, FileProvider, ListProvider};
