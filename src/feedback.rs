//! Utilities to report the outcome of view operations to the rendering layer

use std::fmt::{Display, Error, Formatter};

use chrono::NaiveDate;

use crate::todo::TodoId;
use crate::utils::format_date;

/// An operation of a [`TodoView`](crate::view_model::TodoView)
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    SelectDate(NaiveDate),
    Refresh(NaiveDate),
    Add{ title: String },
    Toggle(TodoId),
    Delete(TodoId),
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Operation::SelectDate(date) => write!(f, "select {}", format_date(*date)),
            Operation::Refresh(date) => write!(f, "fetch todos of {}", format_date(*date)),
            Operation::Add{ title } => write!(f, "add {:?}", title),
            Operation::Toggle(id) => write!(f, "toggle todo {}", id),
            Operation::Delete(id) => write!(f, "delete todo {}", id),
        }
    }
}

/// An event that happens while a view operation runs
#[derive(Clone, Debug, PartialEq)]
pub enum ViewEvent {
    /// Nothing has happened yet
    Idle,
    /// An operation has started, and is waiting for the server
    Started(Operation),
    /// An operation has completed successfully
    Succeeded(Operation),
    /// An operation has been refused before anything was sent to the server
    Rejected{ operation: Operation, reason: String },
    /// An operation failed. The view still shows the last successfully fetched data
    Failed{ operation: Operation, reason: String },
    /// A list was received, but a more recent fetch has been requested since then, so it has been ignored
    Discarded(Operation),
}

impl ViewEvent {
    /// Whether this event is a failure the user should be told about
    pub fn is_error(&self) -> bool {
        match self {
            ViewEvent::Rejected{..} | ViewEvent::Failed{..} => true,
            _ => false,
        }
    }
}

impl Display for ViewEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            ViewEvent::Idle => write!(f, "Idle"),
            ViewEvent::Started(op) => write!(f, "Trying to {}...", op),
            ViewEvent::Succeeded(op) => write!(f, "Done: {}", op),
            ViewEvent::Rejected{ operation, reason } => write!(f, "Cannot {}: {}", operation, reason),
            ViewEvent::Failed{ operation, reason } => write!(f, "Unable to {}: {}", operation, reason),
            ViewEvent::Discarded(op) => write!(f, "Ignored an outdated result ({})", op),
        }
    }
}

impl Default for ViewEvent {
    fn default() -> Self {
        Self::Idle
    }
}



/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<ViewEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<ViewEvent>;

/// Create a feeback channel, that can be used to retrieve the outcome of the latest view operation
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(ViewEvent::default())
}




/// Logs what happens to an operation, and forwards it to the feedback channel (if any)
pub struct OperationProgress<'a> {
    operation: Operation,
    feedback_channel: Option<&'a FeedbackSender>,
}

impl<'a> OperationProgress<'a> {
    pub fn new(operation: Operation, feedback_channel: Option<&'a FeedbackSender>) -> Self {
        Self { operation, feedback_channel }
    }

    pub fn started(&self) {
        log::debug!("Starting to {}", self.operation);
        self.feedback(ViewEvent::Started(self.operation.clone()));
    }

    pub fn succeeded(&self) {
        log::debug!("Done: {}", self.operation);
        self.feedback(ViewEvent::Succeeded(self.operation.clone()));
    }

    /// Log a refusal
    pub fn rejected(&self, reason: &str) {
        log::warn!("Cannot {}: {}", self.operation, reason);
        self.feedback(ViewEvent::Rejected{ operation: self.operation.clone(), reason: reason.to_string() });
    }

    /// Log an error
    pub fn failed(&self, reason: &str) {
        log::error!("Unable to {}: {}", self.operation, reason);
        self.feedback(ViewEvent::Failed{ operation: self.operation.clone(), reason: reason.to_string() });
    }

    pub fn discarded(&self) {
        log::warn!("Ignoring an outdated response ({})", self.operation);
        self.feedback(ViewEvent::Discarded(self.operation.clone()));
    }

    /// Send an event as a feedback to the listener (if any).
    fn feedback(&self, event: ViewEvent) {
        if let Some(sender) = self.feedback_channel {
            // An error only means nobody is listening anymore
            let _ = sender.send(event);
        }
    }
}
