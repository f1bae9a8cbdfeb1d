//! Document-order element events over a parsed SVG document.

use std::cell::Cell;
use std::rc::Rc;

use roxmltree::{Document, Node};

use crate::element::SvgElement;
use crate::error::Result;

/// Consumer of start/end element events.
pub trait ElementHandler {
    fn element_start(&mut self, el: &dyn SvgElement) -> Result<()>;

    fn element_end(&mut self, el: &dyn SvgElement) -> Result<()>;
}

/// Shared cancellation switch, checked before every event.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Rc<Cell<bool>>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    Cancelled,
}

pub struct SvgStream<'input> {
    doc: Document<'input>,
    cancel: CancelFlag,
}

impl<'input> SvgStream<'input> {
    pub fn parse(text: &'input str) -> Result<Self> {
        let doc = Document::parse(text)?;
        Ok(Self {
            doc,
            cancel: CancelFlag::default(),
        })
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Walks every element in document order, emitting correctly nested start/end pairs.
    ///
    /// Stops at the first handler error, or without error once the flag is cancelled.
    pub fn run(&self, handler: &mut dyn ElementHandler) -> Result<StreamOutcome> {
        let mut events = 0usize;
        let outcome = self.walk(self.doc.root_element(), handler, &mut events)?;
        match outcome {
            StreamOutcome::Completed => tracing::debug!(events, "svg stream completed"),
            StreamOutcome::Cancelled => tracing::debug!(events, "svg stream cancelled"),
        }
        Ok(outcome)
    }

    fn walk(
        &self,
        node: Node<'_, 'input>,
        handler: &mut dyn ElementHandler,
        events: &mut usize,
    ) -> Result<StreamOutcome> {
        if self.cancel.is_cancelled() {
            return Ok(StreamOutcome::Cancelled);
        }
        handler.element_start(&node)?;
        *events += 1;

        for child in node.children().filter(Node::is_element) {
            if self.walk(child, handler, events)? == StreamOutcome::Cancelled {
                return Ok(StreamOutcome::Cancelled);
            }
        }

        if self.cancel.is_cancelled() {
            return Ok(StreamOutcome::Cancelled);
        }
        handler.element_end(&node)?;
        *events += 1;
        Ok(StreamOutcome::Completed)
    }
}
