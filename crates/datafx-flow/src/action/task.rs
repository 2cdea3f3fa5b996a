use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use datafx_core::prelude::*;

use super::FlowAction;
use crate::handler::{FlowActionHandle, FlowHandler};

/// Work unit instantiated fresh for every task invocation
pub trait Runnable {
    fn run(&mut self, handler: &mut FlowHandler) -> HookResult;
}

type UiTask = Rc<dyn Fn(&mut FlowHandler) -> HookResult>;
type RunnableFactory = Rc<dyn Fn() -> Box<dyn Runnable>>;
type BackgroundTask = Arc<dyn Fn(FlowActionHandle) -> HookResult + Send + Sync>;

#[derive(Clone)]
enum TaskKind {
    Ui(UiTask),
    Runnable(RunnableFactory),
    Background(BackgroundTask),
}

/// Runs a unit of work when its action fires
///
/// UI tasks run synchronously on the UI thread with access to the handler.
/// Background tasks run on the handler's worker pool and get a
/// [`FlowActionHandle`] to send UI-side effects back; the action returns as
/// soon as the work is scheduled.
#[derive(Clone)]
pub struct TaskAction {
    kind: TaskKind,
}

impl fmt::Debug for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TaskKind::Ui(_) => "ui",
            TaskKind::Runnable(_) => "runnable",
            TaskKind::Background(_) => "background",
        };
        f.debug_struct("TaskAction").field("kind", &kind).finish()
    }
}

impl TaskAction {
    pub fn ui(task: impl Fn(&mut FlowHandler) -> HookResult + 'static) -> Self {
        Self {
            kind: TaskKind::Ui(Rc::new(task)),
        }
    }

    pub fn runnable<R: Runnable + Default + 'static>() -> Self {
        Self {
            kind: TaskKind::Runnable(Rc::new(|| Box::new(R::default()) as Box<dyn Runnable>)),
        }
    }

    pub fn background(
        task: impl Fn(FlowActionHandle) -> HookResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: TaskKind::Background(Arc::new(task)),
        }
    }

    pub fn is_background(&self) -> bool {
        matches!(self.kind, TaskKind::Background(_))
    }
}

fn task_error(action_id: &str, error: BoxError) -> Error {
    Error::Task {
        action_id: action_id.to_string(),
        message: error.to_string(),
    }
}

impl FlowAction for TaskAction {
    fn handle(&self, handler: &mut FlowHandler, action_id: &str) -> Result<()> {
        match &self.kind {
            TaskKind::Ui(task) => task(handler).map_err(|e| task_error(action_id, e)),
            TaskKind::Runnable(factory) => {
                let mut runnable = factory();
                runnable
                    .run(handler)
                    .map_err(|e| task_error(action_id, e))
            }
            TaskKind::Background(task) => {
                let pool = handler.worker_pool()?;
                let handle = handler.action_handle();
                let task = Arc::clone(task);
                let action_id = action_id.to_string();
                debug!("Scheduling background task '{}'", action_id);
                pool.spawn_blocking(move || {
                    if let Err(e) = task(handle.clone()) {
                        if handle.report_error(task_error(&action_id, e)).is_err() {
                            warn!("Background task '{}' failed after its flow was dropped", action_id);
                        }
                    }
                });
                Ok(())
            }
        }
    }
}
