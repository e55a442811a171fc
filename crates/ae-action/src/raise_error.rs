//! Raise-error action

use ae_core::{ActionData, AutomationData, AutomationResult, ConfiguredError};
use ae_provider::BoxProvider;
use tracing::debug;

/// Resolves a configured error and raises it
#[derive(Debug)]
pub struct RaiseErrorAction {
    error: BoxProvider<ConfiguredError>,
}

impl RaiseErrorAction {
    pub fn new(error: BoxProvider<ConfiguredError>) -> Self {
        Self { error }
    }

    pub(crate) async fn run(
        &self,
        ctx: &AutomationData,
        data: &mut ActionData,
    ) -> AutomationResult<()> {
        let error = self.error.resolve(ctx).await?;
        debug!(code = %error.code, "Raising configured error");
        data.record_error(error.clone());
        Err(error)
    }
}
