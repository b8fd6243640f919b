//! Core library for Tarefas
//!
//! This crate contains the task record store:
//! - The `Task` model and its status/priority choices
//! - Field validation for creation and updates
//! - The `TaskRepository` trait and a JSON file implementation

pub mod error;
pub mod task;

pub use error::{Error, FieldError, ValidationErrors};
pub type Result<T> = std::result::Result<T, Error>;
