//! This crate provides a client for a date-based to-do list API.
//!
//! It provides an HTTP client in the [`client`] module, that can be used as a stand-alone module.
//!
//! The [`view_model`] module provides a [`TodoView`](view_model::TodoView), that holds the state of a "to-dos of the day" screen
//! (the selected date, the to-dos of that date, the title being typed) and keeps it in sync with any [`TodoSource`](traits::TodoSource),
//! by re-fetching the whole list after every change. \
//! Its outcomes can be observed by a rendering layer through the [`feedback`] channel.

pub mod traits;

mod todo;
pub use todo::{Todo, TodoId};
pub mod view_model;
pub use view_model::TodoView;
pub mod feedback;

pub mod client;
pub use client::Client;

pub mod config;
pub mod utils;

mod mock_behaviour;
mod memory;
