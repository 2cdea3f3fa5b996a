//! Framework error types with rich context

use std::fmt;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Error type returned by user code: controller factories, lifecycle hooks,
/// action methods and tasks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a user-supplied hook
pub type HookResult<T = ()> = std::result::Result<T, BoxError>;

/// Controller lifecycle hook kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    PostConstruct,
    Show,
    Hide,
    PreDestroy,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookKind::PostConstruct => "post-construct",
            HookKind::Show => "show",
            HookKind::Hide => "hide",
            HookKind::PreDestroy => "pre-destroy",
        };
        f.write_str(name)
    }
}

/// Framework error types organized by layer
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Terminal error: {message}")]
    Terminal { message: String },

    // ─────────────────────────────────────────────────────────────
    // View Construction Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Can't create flow view for controller {controller}: {source}")]
    ViewConstruction {
        controller: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Can't instantiate controller {controller}: {source}")]
    ControllerInstantiation {
        controller: String,
        #[source]
        source: BoxError,
    },

    #[error("No layout resource found for controller {controller}: {message}")]
    LayoutResolution { controller: String, message: String },

    #[error("Invalid layout resource '{resource}': {message}")]
    Layout { resource: String, message: String },

    #[error("Injection into field '{field}' of {controller} failed: {message}")]
    Injection {
        controller: String,
        field: String,
        message: String,
    },

    #[error("Field '{field}' of {controller} is claimed by more than one resource provider")]
    DuplicateInjection { controller: String, field: String },

    #[error("Annotation {annotation} is claimed by more than one resource provider")]
    DuplicateProvider { annotation: String },

    // ─────────────────────────────────────────────────────────────
    // Lifecycle Errors
    // ─────────────────────────────────────────────────────────────
    #[error("{kind} hook of {controller} failed: {source}")]
    LifecycleHook {
        controller: String,
        kind: HookKind,
        #[source]
        source: BoxError,
    },

    #[error("Last view of {controller} can't be destroyed: {source}")]
    Destroy {
        controller: String,
        #[source]
        source: Box<Error>,
    },

    #[error("View of {controller} was already destroyed")]
    UseAfterDestroy { controller: String },

    #[error("View holds a {actual} controller, not {expected}")]
    ControllerMismatch { expected: String, actual: String },

    // ─────────────────────────────────────────────────────────────
    // Action Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Can't find an action with id {action_id}")]
    ActionNotFound { action_id: String },

    #[error("Action '{action_id}' failed on {controller}: {source}")]
    ActionInvocation {
        action_id: String,
        controller: String,
        #[source]
        source: BoxError,
    },

    #[error("Action hook for '{action_id}' failed: {source}")]
    ActionHook {
        action_id: String,
        #[source]
        source: BoxError,
    },

    #[error("Action '{action_id}' was vetoed: {reason}")]
    Vetoed { action_id: String, reason: String },

    #[error("Task '{action_id}' failed: {message}")]
    Task { action_id: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Flow Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Flow error: {message}: {source}")]
    Flow {
        message: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Navigation history is empty")]
    HistoryEmpty,

    #[error("Flow has not been started")]
    NotStarted,

    #[error("Flow was already started")]
    AlreadyStarted,

    #[error("Flow handler was destroyed")]
    HandlerDestroyed,
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    pub fn view_construction(controller: impl Into<String>, source: Error) -> Self {
        Self::ViewConstruction {
            controller: controller.into(),
            source: Box::new(source),
        }
    }

    pub fn layout_resolution(controller: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LayoutResolution {
            controller: controller.into(),
            message: message.into(),
        }
    }

    pub fn layout(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Layout {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn injection(
        controller: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Injection {
            controller: controller.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn action_not_found(action_id: impl Into<String>) -> Self {
        Self::ActionNotFound {
            action_id: action_id.into(),
        }
    }

    pub fn flow(message: impl Into<String>, source: Error) -> Self {
        Self::Flow {
            message: message.into(),
            source: Box::new(source),
        }
    }

    pub fn use_after_destroy(controller: impl Into<String>) -> Self {
        Self::UseAfterDestroy {
            controller: controller.into(),
        }
    }

    /// Unwrap `Flow` and `ViewConstruction` layers down to the root cause
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Flow { source, .. }
            | Error::ViewConstruction { source, .. }
            | Error::Destroy { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Check if the flow stays usable after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ActionNotFound { .. }
                | Error::Vetoed { .. }
                | Error::HistoryEmpty
                | Error::ActionInvocation { .. }
                | Error::ActionHook { .. }
                | Error::Task { .. }
                | Error::ViewConstruction { .. }
                | Error::Flow { .. }
        )
    }

    /// Check if this error means the flow can't continue at all
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::DuplicateProvider { .. } | Error::HandlerDestroyed | Error::Terminal { .. }
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display_messages() {
        let err = Error::action_not_found("next");
        assert_eq!(err.to_string(), "Can't find an action with id next");

        let err = Error::HistoryEmpty;
        assert!(err.to_string().contains("history is empty"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_root_cause_unwraps_flow_layers() {
        let inner = Error::layout_resolution("HomeController", "no layout");
        let err = Error::flow(
            "start failed",
            Error::view_construction("HomeController", inner),
        );
        assert!(matches!(err.root_cause(), Error::LayoutResolution { .. }));
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::action_not_found("x").is_recoverable());
        assert!(Error::HistoryEmpty.is_recoverable());
        assert!(!Error::HandlerDestroyed.is_recoverable());
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::DuplicateProvider {
            annotation: "FeatureToggle".into()
        }
        .is_fatal());
        assert!(!Error::HistoryEmpty.is_fatal());
    }

    #[test]
    fn test_hook_kind_display() {
        assert_eq!(HookKind::PreDestroy.to_string(), "pre-destroy");
        let err = Error::LifecycleHook {
            controller: "WizardController".into(),
            kind: HookKind::Show,
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "show hook of WizardController failed: boom");
    }

    #[test]
    fn test_config_path_error() {
        let err = Error::config(format!("bad file {}", PathBuf::from("/x").display()));
        assert!(err.to_string().contains("/x"));
    }
}
