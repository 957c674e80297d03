//! This module provides a client to connect to a to-do REST API

use std::error::Error;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::USER_AGENT;
use reqwest::Response;
use serde::Serialize;
use url::Url;

use crate::config::Settings;
use crate::todo::{Todo, TodoId};
use crate::traits::TodoSource;
use crate::utils::format_date;


#[derive(Serialize)]
struct NewTodoBody<'a> {
    title: &'a str,
    #[serde(with = "wire_date")]
    date: NaiveDate,
}

#[derive(Serialize)]
struct CompletionBody {
    completed: bool,
}

mod wire_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::utils::format_date(*date))
    }
}


/// A to-do source that fetches its data from a remote API
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, Box<dyn Error>> {
        let base_url = Url::parse(base_url.as_ref())?;
        Self::with_url(base_url)
    }

    /// Create a client for the API configured in some [`Settings`]
    pub fn from_settings(settings: &Settings) -> Result<Self, Box<dyn Error>> {
        Self::with_url(settings.api_url.clone())
    }

    fn with_url(base_url: Url) -> Result<Self, Box<dyn Error>> {
        if base_url.cannot_be_a_base() {
            return Err(format!("{} cannot be used as an API base URL", base_url).into());
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self { base_url, http })
    }

    /// Build the URL of an endpoint, by appending path segments to the path of the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url, Box<dyn Error>> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot be used as an API base URL", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Turn a non-2xx response into an error
fn check_status(response: Response) -> Result<Response, Box<dyn Error>> {
    if response.status().is_success() == false {
        return Err(format!("Unexpected HTTP status code {:?} for {}", response.status(), response.url()).into());
    }
    Ok(response)
}

#[async_trait]
impl TodoSource for Client {
    async fn list_todos(&self, date: NaiveDate) -> Result<Vec<Todo>, Box<dyn Error>> {
        let mut url = self.endpoint(&["get-todos"])?;
        url.query_pairs_mut().append_pair("date", &format_date(date));
        log::debug!("GET {}", url);

        let response = self.http
            .get(url)
            .header(USER_AGENT, crate::config::user_agent())
            .send()
            .await?;
        let response = check_status(response)?;

        let text = response.text().await?;
        let todos: Vec<Todo> = serde_json::from_str(&text)
            .map_err(|err| format!("Malformed to-do list for {}: {}", format_date(date), err))?;
        Ok(todos)
    }

    async fn add_todo(&self, title: &str, date: NaiveDate) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint(&["add-todo"])?;
        log::debug!("POST {} ({:?} for {})", url, title, format_date(date));

        let response = self.http
            .post(url)
            .header(USER_AGENT, crate::config::user_agent())
            .json(&NewTodoBody { title, date })
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn set_completed(&self, id: &TodoId, completed: bool) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint(&["toggle-todo-complete", id.as_str()])?;
        log::debug!("PUT {} (completed: {})", url, completed);

        let response = self.http
            .put(url)
            .header(USER_AGENT, crate::config::user_agent())
            .json(&CompletionBody { completed })
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn delete_todo(&self, id: &TodoId) -> Result<(), Box<dyn Error>> {
        let url = self.endpoint(&["delete-todo", id.as_str()])?;
        log::debug!("DELETE {}", url);

        let response = self.http
            .delete(url)
            .header(USER_AGENT, crate::config::user_agent())
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }
}
