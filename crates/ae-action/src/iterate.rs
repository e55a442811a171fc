//! Iterate action
//!
//! Runs a list of nested actions once per item of a resolved list. The
//! direction and bounds come from optional start/end indices and a reverse
//! flag; explicit indices always win over the flag.

use crate::action::Action;
use crate::runner::ActionRunner;
use ae_core::{
    codes, ActionData, ActionDetail, AutomationData, AutomationResult, IterateData,
    IterationItem, IterationRecord, Value,
};
use ae_provider::BoxProvider;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Inclusive bounds and direction of an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationRange {
    pub start: usize,
    pub end: usize,
    pub reverse: bool,
}

impl IterationRange {
    /// Resolve bounds against a non-empty list of `len` items.
    ///
    /// With both indices given, `start > end` means reverse. With one index
    /// missing, the reverse flag picks the direction and the missing bound
    /// defaults to the matching end of the list. Returns the first index that
    /// falls outside the list.
    pub fn resolve(
        len: usize,
        start: Option<i64>,
        end: Option<i64>,
        reverse: bool,
    ) -> Result<Self, i64> {
        let last = len.saturating_sub(1);
        let check = |index: i64| -> Result<usize, i64> {
            usize::try_from(index)
                .ok()
                .filter(|i| *i < len)
                .ok_or(index)
        };

        let start = start.map(check).transpose()?;
        let end = end.map(check).transpose()?;

        let range = match (start, end) {
            (Some(start), Some(end)) => Self {
                start,
                end,
                reverse: start > end,
            },
            (start, end) if reverse => Self {
                start: start.unwrap_or(last),
                end: end.unwrap_or(0),
                reverse: true,
            },
            (start, end) => Self {
                start: start.unwrap_or(0),
                end: end.unwrap_or(last),
                reverse: false,
            },
        };
        Ok(range)
    }

    /// Indices in visiting order
    pub fn indices(&self) -> Vec<usize> {
        if self.reverse {
            (self.end..=self.start).rev().collect()
        } else if self.start <= self.end {
            (self.start..=self.end).collect()
        } else {
            Vec::new()
        }
    }
}

/// Runs nested actions once per list item
#[derive(Debug)]
pub struct IterateAction {
    list: BoxProvider<Vec<Value>>,
    start_index: Option<BoxProvider<i64>>,
    end_index: Option<BoxProvider<i64>>,
    reverse: Option<BoxProvider<bool>>,
    do_while: Option<BoxProvider<bool>>,
    actions: Vec<Arc<Action>>,
}

impl IterateAction {
    pub fn new(list: BoxProvider<Vec<Value>>, actions: Vec<Arc<Action>>) -> Self {
        Self {
            list,
            start_index: None,
            end_index: None,
            reverse: None,
            do_while: None,
            actions,
        }
    }

    pub fn with_start_index(mut self, index: BoxProvider<i64>) -> Self {
        self.start_index = Some(index);
        self
    }

    pub fn with_end_index(mut self, index: BoxProvider<i64>) -> Self {
        self.end_index = Some(index);
        self
    }

    pub fn with_reverse(mut self, reverse: BoxProvider<bool>) -> Self {
        self.reverse = Some(reverse);
        self
    }

    /// Evaluated after each iteration; iteration stops once it is false
    pub fn with_do_while(mut self, condition: BoxProvider<bool>) -> Self {
        self.do_while = Some(condition);
        self
    }

    pub fn actions(&self) -> &[Arc<Action>] {
        &self.actions
    }

    pub(crate) async fn run(
        &self,
        ctx: &Arc<AutomationData>,
        alias: &str,
        data: &mut ActionData,
    ) -> AutomationResult<()> {
        let items = self.list.resolve(ctx).await?;
        let start = resolve_optional(&self.start_index, ctx).await?;
        let end = resolve_optional(&self.end_index, ctx).await?;
        let reverse = resolve_optional(&self.reverse, ctx).await?.unwrap_or(false);

        if items.is_empty() {
            let detail = progress(data);
            detail.start_index = start;
            detail.end_index = end;
            detail.reverse = match (start, end) {
                (Some(start), Some(end)) => start > end,
                _ => reverse,
            };
            debug!("Nothing to iterate");
            return Ok(());
        }

        let range = IterationRange::resolve(items.len(), start, end, reverse)
            .map_err(|index| codes::iterate_index_out_of_range(alias, index, items.len()))?;
        {
            let detail = progress(data);
            detail.start_index = Some(range.start as i64);
            detail.end_index = Some(range.end as i64);
            detail.reverse = range.reverse;
        }
        debug!(
            start = range.start,
            end = range.end,
            reverse = range.reverse,
            "Iterating"
        );

        let runner = ActionRunner::new();
        for index in range.indices() {
            ctx.ensure_not_cancelled(alias)?;

            let current = IterationItem {
                index,
                item: items[index].clone(),
            };
            progress(data).current_iteration = Some(current.clone());
            // nested actions read the current item through the registry
            ctx.publish_action(alias, data.to_value()).await;
            trace!(index, "Starting iteration");

            let mut records = IndexMap::new();
            let result = runner.run_sequence(ctx, &self.actions, &mut records).await;
            progress(data).iterations.push(IterationRecord {
                index,
                actions: records,
            });
            result?;

            let detail = progress(data);
            detail.iterations_completed += 1;
            detail.last_iteration = Some(current);
            ctx.publish_action(alias, data.to_value()).await;

            if let Some(condition) = &self.do_while {
                if !condition.resolve(ctx).await? {
                    debug!(index, "Do-while condition no longer holds");
                    break;
                }
            }
        }

        progress(data).current_iteration = None;
        Ok(())
    }
}

async fn resolve_optional<T>(
    provider: &Option<BoxProvider<T>>,
    ctx: &AutomationData,
) -> AutomationResult<Option<T>> {
    match provider {
        Some(provider) => Ok(Some(provider.resolve(ctx).await?)),
        None => Ok(None),
    }
}

fn progress(data: &mut ActionData) -> &mut IterateData {
    if data.iterate().is_none() {
        data.detail = ActionDetail::Iterate(IterateData::default());
    }
    match &mut data.detail {
        ActionDetail::Iterate(progress) => progress,
        _ => unreachable!("detail was just set to iterate"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_range_forward() {
        let range = IterationRange::resolve(3, None, None, false).unwrap();
        assert_eq!(range.indices(), vec![0, 1, 2]);
    }

    #[test]
    fn test_full_range_reverse_flag() {
        let range = IterationRange::resolve(3, None, None, true).unwrap();
        assert!(range.reverse);
        assert_eq!(range.indices(), vec![2, 1, 0]);
    }

    #[test]
    fn test_indices_override_flag() {
        let range = IterationRange::resolve(5, Some(3), Some(1), false).unwrap();
        assert!(range.reverse);
        assert_eq!(range.indices(), vec![3, 2, 1]);

        let range = IterationRange::resolve(5, Some(1), Some(3), true).unwrap();
        assert!(!range.reverse);
        assert_eq!(range.indices(), vec![1, 2, 3]);
    }

    #[test]
    fn test_single_index_defaults() {
        let range = IterationRange::resolve(5, Some(2), None, false).unwrap();
        assert_eq!(range.indices(), vec![2, 3, 4]);

        let range = IterationRange::resolve(5, Some(2), None, true).unwrap();
        assert_eq!(range.indices(), vec![2, 1, 0]);

        let range = IterationRange::resolve(5, None, Some(1), true).unwrap();
        assert_eq!(range.indices(), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(IterationRange::resolve(3, Some(3), None, false), Err(3));
        assert_eq!(IterationRange::resolve(3, None, Some(-1), false), Err(-1));
    }
}
