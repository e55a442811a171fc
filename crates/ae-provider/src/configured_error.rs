//! Provider of configured errors

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxProvider, Provider};
use ae_core::{AutomationData, ConfiguredError, Value};
use async_trait::async_trait;

/// Resolves each field of a [`ConfiguredError`] from its own provider
#[derive(Debug)]
pub struct ConfiguredErrorProvider {
    code: BoxProvider<String>,
    title: BoxProvider<String>,
    message: BoxProvider<String>,
    http_status_code: BoxProvider<i64>,
    additional_details: Option<BoxProvider<Vec<Value>>>,
    data: Option<BoxProvider<Value>>,
}

impl ConfiguredErrorProvider {
    pub fn new(
        code: BoxProvider<String>,
        title: BoxProvider<String>,
        message: BoxProvider<String>,
        http_status_code: BoxProvider<i64>,
    ) -> Self {
        Self {
            code,
            title,
            message,
            http_status_code,
            additional_details: None,
            data: None,
        }
    }

    pub fn with_additional_details(mut self, details: BoxProvider<Vec<Value>>) -> Self {
        self.additional_details = Some(details);
        self
    }

    pub fn with_data(mut self, data: BoxProvider<Value>) -> Self {
        self.data = Some(data);
        self
    }
}

#[async_trait]
impl Provider<ConfiguredError> for ConfiguredErrorProvider {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<ConfiguredError> {
        let status = self.http_status_code.resolve(ctx).await?;
        let http_status_code = u16::try_from(status).map_err(|_| ProviderError::InvalidValue {
            reason: format!("{status} is not a valid HTTP status code"),
        })?;

        let mut error = ConfiguredError::new(
            self.code.resolve(ctx).await?,
            self.title.resolve(ctx).await?,
            self.message.resolve(ctx).await?,
            http_status_code,
        );
        if let Some(details) = &self.additional_details {
            error.additional_details = details
                .resolve(ctx)
                .await?
                .iter()
                .map(Value::to_text)
                .collect();
        }
        if let Some(data) = &self.data {
            error.data = Some(data.resolve(ctx).await?);
        }

        error
            .validate()
            .map_err(|reason| ProviderError::InvalidValue { reason })?;
        Ok(error)
    }
}
