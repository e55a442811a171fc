//! Automation definitions
//!
//! This crate turns JSON or YAML automation documents into immutable
//! [`Action`] and provider graphs:
//!
//! - [`AutomationConfig`] / [`ActionConfig`] - serde model of a document
//! - [`ProviderBuilder`] - single-key provider objects and literals
//! - [`ActionRegistry`] - type discriminator to constructor mapping
//! - [`ActionBuilder`] - compiles configuration, validating aliases
//!
//! # Example
//!
//! ```ignore
//! use ae_config::{load_automation, ActionBuilder, ActionRegistry};
//!
//! let config = load_automation("quote.yaml")?;
//! let automation = ActionBuilder::new(ActionRegistry::default()).build_automation(&config)?;
//! ```
//!
//! [`Action`]: ae_action::Action

mod builder;
mod error;
mod loader;
mod model;
mod provider;
mod registry;

pub use builder::ActionBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::{load_automation, load_value, parse_automation, Format};
pub use model::{ActionConfig, AutomationConfig, ErrorConditionConfig};
pub use provider::{provider_names, ProviderBuilder};
pub use registry::{ActionFactory, ActionRegistry};
