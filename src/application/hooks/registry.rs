//! Registry of step completion hooks, keyed by step kind.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::pipeline::StepKind;
use crate::ports::{StepCompletion, StepCompletionHook};

/// A hook that returned an error.
#[derive(Debug, Clone)]
pub struct HookFailure {
    pub hook: &'static str,
    pub error: DomainError,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook '{}' failed: {}", self.hook, self.error)
    }
}

impl std::error::Error for HookFailure {}

/// Maps step kinds to the hooks that run when a step of that kind completes.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<StepKind, Vec<Arc<dyn StepCompletionHook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hook` for `kind`. Hooks run in registration order.
    pub fn register(mut self, kind: StepKind, hook: Arc<dyn StepCompletionHook>) -> Self {
        self.hooks.entry(kind).or_default().push(hook);
        self
    }

    /// Runs every hook registered for the completed step's kind.
    ///
    /// Stops at the first failure. Returns how many hooks ran.
    pub async fn run(&self, completion: &StepCompletion) -> Result<usize, HookFailure> {
        let Some(hooks) = self.hooks.get(&completion.step.kind) else {
            return Ok(0);
        };

        for hook in hooks {
            tracing::debug!(
                hook = hook.name(),
                step_id = %completion.step.id,
                pipeline_group_id = %completion.pipeline_group_id,
                "Running step completion hook"
            );
            hook.on_step_completed(completion).await.map_err(|error| {
                tracing::error!(
                    hook = hook.name(),
                    step_id = %completion.step.id,
                    pipeline_group_id = %completion.pipeline_group_id,
                    error = %error,
                    "Step completion hook failed"
                );
                HookFailure {
                    hook: hook.name(),
                    error,
                }
            })?;
        }

        Ok(hooks.len())
    }
}
