//! To-do items, as served by the remote API

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer};
use serde::de::{self, Visitor};
use chrono::NaiveDate;

/// A to-do item.
///
/// Instances are only ever built from server responses: the client never edits them in place,
/// it re-fetches the whole list instead.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Todo {
    /// The server-assigned identifier
    #[serde(alias = "_id")]
    id: TodoId,

    /// The display name of the to-do
    title: String,

    /// Whether this to-do has been done
    #[serde(default)]
    completed: bool,

    /// The calendar date this to-do belongs to. It is set by the server at creation
    #[serde(deserialize_with = "crate::utils::deserialize_date")]
    date: NaiveDate,
}

impl Todo {
    /// Create a Todo instance.
    /// Apart from tests and mocked sources, items should rather come from the server
    pub fn new(id: TodoId, title: String, completed: bool, date: NaiveDate) -> Self {
        Self { id, title, completed, date }
    }

    pub fn id(&self) -> &TodoId     { &self.id         }
    pub fn title(&self) -> &str     { &self.title      }
    pub fn completed(&self) -> bool { self.completed   }
    pub fn date(&self) -> NaiveDate { self.date        }

    #[cfg(test)]
    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}


/// An opaque to-do identifier.
///
/// Servers may send it either as a JSON number or a JSON string. The client never interprets it,
/// it only renders it into request paths.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TodoId {
    content: String,
}

impl TodoId {
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<String> for TodoId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for TodoId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl From<u64> for TodoId {
    fn from(number: u64) -> Self {
        Self { content: number.to_string() }
    }
}

impl Display for TodoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

struct TodoIdVisitor;

impl<'de> Visitor<'de> for TodoIdVisitor {
    type Value = TodoId;

    fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "a string or an integer identifier")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<TodoId, E> {
        Ok(TodoId::from(value))
    }
    fn visit_string<E: de::Error>(self, value: String) -> Result<TodoId, E> {
        Ok(TodoId::from(value))
    }
    fn visit_u64<E: de::Error>(self, value: u64) -> Result<TodoId, E> {
        Ok(TodoId::from(value))
    }
    fn visit_i64<E: de::Error>(self, value: i64) -> Result<TodoId, E> {
        Ok(TodoId::from(value.to_string()))
    }
}

/// Used to support serde
impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D>(deserializer: D) -> Result<TodoId, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TodoIdVisitor)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_server_todos() {
        let json = r#"[
            {"id": 1, "title": "Buy milk", "completed": false, "date": "2024-05-01"},
            {"_id": "65f1c0ffee", "title": "Call mum", "completed": true, "date": "2024-05-01T00:00:00.000Z"}
        ]"#;
        let todos: Vec<Todo> = serde_json::from_str(json).unwrap();

        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].id(), &TodoId::from(1));
        assert_eq!(todos[0].title(), "Buy milk");
        assert_eq!(todos[0].completed(), false);
        assert_eq!(todos[1].id().as_str(), "65f1c0ffee");
        assert_eq!(todos[1].completed(), true);
        assert_eq!(todos[1].date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn malformed_todos_are_errors() {
        assert!(serde_json::from_str::<Vec<Todo>>(r#"[{"id": 1}]"#).is_err());
        assert!(serde_json::from_str::<Vec<Todo>>(r#"[{"id": 1, "title": "a", "date": "yesterday"}]"#).is_err());
        assert!(serde_json::from_str::<Vec<Todo>>(r#"{"error": "oops"}"#).is_err());
    }
}
