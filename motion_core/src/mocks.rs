//! Test and helper mocks for motion_core

use std::cell::RefCell;
use std::rc::Rc;

use crate::logger::DiagnosticSink;
use crate::signal::{Broadcaster, MotionSignal};

/// Records every published signal. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingBroadcaster {
    signals: Rc<RefCell<Vec<MotionSignal>>>,
}

impl RecordingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> Vec<MotionSignal> {
        self.signals.borrow().clone()
    }

    pub fn count(&self, signal: MotionSignal) -> usize {
        self.signals.borrow().iter().filter(|s| **s == signal).count()
    }

    pub fn clear(&self) {
        self.signals.borrow_mut().clear();
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn publish(&self, signal: MotionSignal) {
        self.signals.borrow_mut().push(signal);
    }
}

/// Records diagnostic notes. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    notes: Rc<RefCell<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.borrow().clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn note(&self, message: &str) {
        self.notes.borrow_mut().push(message.to_string());
    }
}
