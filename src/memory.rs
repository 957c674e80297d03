//! An in-memory to-do source, that mocks a remote API in tests
#![cfg(test)]

use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::mock_behaviour::MockBehaviour;
use crate::todo::{Todo, TodoId};
use crate::traits::TodoSource;

/// A request that has been received by a [`MemorySource`]
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    List(NaiveDate),
    Add{ title: String, date: NaiveDate },
    SetCompleted{ id: TodoId, completed: bool },
    Delete(TodoId),
}

#[derive(Default)]
struct MemoryData {
    todos: Vec<Todo>,
    last_id: u64,
    requests: Vec<Request>,
    list_delays: HashMap<NaiveDate, Duration>,
    mock_behaviour: MockBehaviour,
}

/// A source that behaves like the remote API, but stores its items in memory
#[derive(Default)]
pub struct MemorySource {
    data: Mutex<MemoryData>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item directly, as if it had been created by another client. Returns its new ID
    pub fn insert(&self, title: &str, completed: bool, date: NaiveDate) -> TodoId {
        let mut data = self.data.lock().unwrap();
        data.last_id += 1;
        let id = TodoId::from(data.last_id);
        data.todos.push(Todo::new(id.clone(), title.to_string(), completed, date));
        id
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.data.lock().unwrap().todos.clone()
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<Request> {
        self.data.lock().unwrap().requests.clone()
    }

    /// Make every listing of `date` take `delay` before it answers
    pub fn set_list_delay(&self, date: NaiveDate, delay: Duration) {
        self.data.lock().unwrap().list_delays.insert(date, delay);
    }

    pub fn set_mock_behaviour(&self, behaviour: MockBehaviour) {
        self.data.lock().unwrap().mock_behaviour = behaviour;
    }
}

#[async_trait]
impl TodoSource for MemorySource {
    async fn list_todos(&self, date: NaiveDate) -> Result<Vec<Todo>, Box<dyn Error>> {
        let delay = {
            let mut data = self.data.lock().unwrap();
            data.requests.push(Request::List(date));
            data.list_delays.get(&date).cloned()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut data = self.data.lock().unwrap();
        data.mock_behaviour.can_list_todos()?;
        Ok(data.todos.iter()
            .filter(|todo| todo.date() == date)
            .cloned()
            .collect())
    }

    async fn add_todo(&self, title: &str, date: NaiveDate) -> Result<(), Box<dyn Error>> {
        {
            let mut data = self.data.lock().unwrap();
            data.requests.push(Request::Add{ title: title.to_string(), date });
            data.mock_behaviour.can_add_todo()?;
        }
        self.insert(title, false, date);
        Ok(())
    }

    async fn set_completed(&self, id: &TodoId, completed: bool) -> Result<(), Box<dyn Error>> {
        let mut data = self.data.lock().unwrap();
        data.requests.push(Request::SetCompleted{ id: id.clone(), completed });
        data.mock_behaviour.can_set_completed()?;
        match data.todos.iter_mut().find(|todo| todo.id() == id) {
            None => Err(format!("No todo with ID {}", id).into()),
            Some(todo) => {
                todo.set_completed(completed);
                Ok(())
            },
        }
    }

    async fn delete_todo(&self, id: &TodoId) -> Result<(), Box<dyn Error>> {
        let mut data = self.data.lock().unwrap();
        data.requests.push(Request::Delete(id.clone()));
        data.mock_behaviour.can_delete_todo()?;
        let len_before = data.todos.len();
        data.todos.retain(|todo| todo.id() != id);
        if data.todos.len() == len_before {
            return Err(format!("No todo with ID {}", id).into());
        }
        Ok(())
    }
}
