//! Sink for errors raised from UI event wiring
//!
//! Errors triggered by node activations have no caller to return to, so the
//! flow handler routes them here. Listeners can react (show a dialog, quit).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, Local};

use crate::error::Error;

/// One reported error
#[derive(Debug, Clone)]
pub struct ExceptionRecord {
    pub error: Rc<Error>,
    pub timestamp: DateTime<Local>,
}

type ExceptionListener = Rc<dyn Fn(&ExceptionRecord)>;

#[derive(Default)]
pub struct ExceptionHandler {
    last: RefCell<Option<ExceptionRecord>>,
    count: Cell<usize>,
    listeners: RefCell<Vec<ExceptionListener>>,
}

impl std::fmt::Debug for ExceptionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExceptionHandler")
            .field("last", &self.last.borrow())
            .field("count", &self.count.get())
            .finish()
    }
}

impl ExceptionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error`, log it and notify listeners
    pub fn set_exception(&self, error: Error) {
        tracing::error!("Unhandled flow error: {}", error);
        let record = ExceptionRecord {
            error: Rc::new(error),
            timestamp: Local::now(),
        };
        *self.last.borrow_mut() = Some(record.clone());
        self.count.set(self.count.get() + 1);

        let listeners: Vec<ExceptionListener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&record);
        }
    }

    pub fn last_exception(&self) -> Option<ExceptionRecord> {
        self.last.borrow().clone()
    }

    /// Number of errors reported since creation
    pub fn exception_count(&self) -> usize {
        self.count.get()
    }

    pub fn clear(&self) {
        self.last.borrow_mut().take();
    }

    pub fn add_listener(&self, listener: impl Fn(&ExceptionRecord) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_exception_records_and_notifies() {
        let handler = ExceptionHandler::new();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        handler.add_listener(move |record| {
            assert!(matches!(*record.error, Error::HistoryEmpty));
            counter.set(counter.get() + 1);
        });

        handler.set_exception(Error::HistoryEmpty);

        assert_eq!(seen.get(), 1);
        assert_eq!(handler.exception_count(), 1);
        assert!(handler.last_exception().is_some());

        handler.clear();
        assert!(handler.last_exception().is_none());
        assert_eq!(handler.exception_count(), 1);
    }
}
