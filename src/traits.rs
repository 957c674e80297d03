use std::error::Error;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::todo::{Todo, TodoId};

/// A source of to-dos.
///
/// This is usually a remote API reached by a [`Client`](crate::client::Client), but tests can provide any other source.
/// Every call may be slow, and may fail.
#[async_trait]
pub trait TodoSource {
    /// Returns every to-do of a given date, as the source currently knows them
    async fn list_todos(&self, date: NaiveDate) -> Result<Vec<Todo>, Box<dyn Error>>;

    /// Creates a to-do. The source is responsible for assigning its ID
    async fn add_todo(&self, title: &str, date: NaiveDate) -> Result<(), Box<dyn Error>>;

    /// Sets the completion status of an existing to-do
    async fn set_completed(&self, id: &TodoId, completed: bool) -> Result<(), Box<dyn Error>>;

    /// Deletes an existing to-do
    async fn delete_todo(&self, id: &TodoId) -> Result<(), Box<dyn Error>>;
}
