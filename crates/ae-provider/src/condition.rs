//! Boolean condition providers
//!
//! Conditions combine other providers: `and`/`or`/`not`, text comparisons,
//! value equality and numeric comparisons.

use crate::error::ProviderResult;
use crate::provider::{BoxProvider, Provider};
use ae_core::{AutomationData, Value};
use async_trait::async_trait;
use tracing::trace;

/// All conditions must be true; evaluation stops at the first false one
#[derive(Debug)]
pub struct AndCondition {
    conditions: Vec<BoxProvider<bool>>,
}

impl AndCondition {
    pub fn new(conditions: Vec<BoxProvider<bool>>) -> Self {
        Self { conditions }
    }
}

#[async_trait]
impl Provider<bool> for AndCondition {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<bool> {
        for condition in &self.conditions {
            if !condition.resolve(ctx).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Any condition must be true; evaluation stops at the first true one
#[derive(Debug)]
pub struct OrCondition {
    conditions: Vec<BoxProvider<bool>>,
}

impl OrCondition {
    pub fn new(conditions: Vec<BoxProvider<bool>>) -> Self {
        Self { conditions }
    }
}

#[async_trait]
impl Provider<bool> for OrCondition {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<bool> {
        for condition in &self.conditions {
            if condition.resolve(ctx).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[derive(Debug)]
pub struct NotCondition {
    condition: BoxProvider<bool>,
}

impl NotCondition {
    pub fn new(condition: BoxProvider<bool>) -> Self {
        Self { condition }
    }
}

#[async_trait]
impl Provider<bool> for NotCondition {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<bool> {
        Ok(!self.condition.resolve(ctx).await?)
    }
}

/// Text comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOperator {
    StartsWith,
    EndsWith,
    Contains,
    Equals,
}

/// Compares `text` against `value` with a [`TextOperator`]
#[derive(Debug)]
pub struct TextCondition {
    operator: TextOperator,
    text: BoxProvider<String>,
    value: BoxProvider<String>,
    ignore_case: bool,
}

impl TextCondition {
    pub fn new(
        operator: TextOperator,
        text: BoxProvider<String>,
        value: BoxProvider<String>,
    ) -> Self {
        Self {
            operator,
            text,
            value,
            ignore_case: false,
        }
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }
}

#[async_trait]
impl Provider<bool> for TextCondition {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<bool> {
        let mut text = self.text.resolve(ctx).await?;
        let mut value = self.value.resolve(ctx).await?;
        if self.ignore_case {
            text = text.to_lowercase();
            value = value.to_lowercase();
        }
        let result = match self.operator {
            TextOperator::StartsWith => text.starts_with(&value),
            TextOperator::EndsWith => text.ends_with(&value),
            TextOperator::Contains => text.contains(&value),
            TextOperator::Equals => text == value,
        };
        trace!(operator = ?self.operator, result, "Text condition");
        Ok(result)
    }
}

/// Structural equality of two values; numbers compare by magnitude
#[derive(Debug)]
pub struct ValueEqualsCondition {
    left: BoxProvider<Value>,
    right: BoxProvider<Value>,
}

impl ValueEqualsCondition {
    pub fn new(left: BoxProvider<Value>, right: BoxProvider<Value>) -> Self {
        Self { left, right }
    }
}

#[async_trait]
impl Provider<bool> for ValueEqualsCondition {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<bool> {
        let left = self.left.resolve(ctx).await?;
        let right = self.right.resolve(ctx).await?;
        Ok(match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => l == r,
            _ => left == right,
        })
    }
}

/// Numeric comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Equal,
}

impl ComparisonOperator {
    pub fn compare(self, left: f64, right: f64) -> bool {
        match self {
            ComparisonOperator::GreaterThan => left > right,
            ComparisonOperator::GreaterThanOrEqual => left >= right,
            ComparisonOperator::LessThan => left < right,
            ComparisonOperator::LessThanOrEqual => left <= right,
            ComparisonOperator::Equal => left == right,
        }
    }
}

/// Compares two numbers: `left <operator> right`
#[derive(Debug)]
pub struct NumberComparison {
    operator: ComparisonOperator,
    left: BoxProvider<f64>,
    right: BoxProvider<f64>,
}

impl NumberComparison {
    pub fn new(
        operator: ComparisonOperator,
        left: BoxProvider<f64>,
        right: BoxProvider<f64>,
    ) -> Self {
        Self {
            operator,
            left,
            right,
        }
    }
}

#[async_trait]
impl Provider<bool> for NumberComparison {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<bool> {
        let left = self.left.resolve(ctx).await?;
        let right = self.right.resolve(ctx).await?;
        let result = self.operator.compare(left, right);
        trace!(operator = ?self.operator, left, right, result, "Number comparison");
        Ok(result)
    }
}
