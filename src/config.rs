//! Support for library configuration options

use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use url::Url;

/// The product name that is sent in the `User-Agent` header of every request.
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("TodoFridge".to_string())));

/// Name of the environment variable that holds the API base URL
pub const API_URL_VAR: &str = "TODO_API_URL";
/// Name of the environment variable that holds the [`AddDatePolicy`]
pub const ADD_DATE_VAR: &str = "TODO_ADD_DATE";


/// Which date newly added to-dos are created for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddDatePolicy {
    /// New to-dos are always created for the current date, whatever date is being viewed
    Today,
    /// New to-dos are created for the date that is currently selected
    SelectedDate,
}

impl Default for AddDatePolicy {
    fn default() -> Self {
        AddDatePolicy::Today
    }
}

impl FromStr for AddDatePolicy {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(AddDatePolicy::Today),
            "selected" | "selected-date" => Ok(AddDatePolicy::SelectedDate),
            other => Err(format!("Invalid add date policy {:?} (expected \"today\" or \"selected\")", other).into()),
        }
    }
}


/// Runtime settings of a to-do client
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// The base URL the API endpoints are relative to
    pub api_url: Url,
    pub add_date_policy: AddDatePolicy,
}

impl Settings {
    /// Read the settings from the process environment
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the settings from any key-value lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = match lookup(API_URL_VAR) {
            None => return Err(format!("Missing environment variable {}", API_URL_VAR).into()),
            Some(url) => url,
        };
        let api_url = Url::parse(raw_url.trim())
            .map_err(|err| format!("Invalid {} {:?}: {}", API_URL_VAR, raw_url, err))?;

        let add_date_policy = match lookup(ADD_DATE_VAR) {
            None => AddDatePolicy::default(),
            Some(s) if s.trim().is_empty() => AddDatePolicy::default(),
            Some(s) => s.parse()?,
        };

        Ok(Self { api_url, add_date_policy })
    }
}


/// The value of the `User-Agent` header
pub(crate) fn user_agent() -> String {
    let product = match PRODUCT_NAME.lock() {
        Ok(name) => name.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    format!("{}/{}", product, env!("CARGO_PKG_VERSION"))
}
