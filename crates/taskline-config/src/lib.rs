//! Taskline Config
//!
//! This crate contains the configuration types for taskline: the ordered task
//! table (one [`TaskDescriptor`] per CSV row) and the [`PipelineSettings`]
//! passed into a pipeline run.
//!
//! The task table is a CSV file with the columns
//! `task_order,task_name,task_type,enabled,script_path`. [`load_tasks`] reads
//! it and returns the descriptors sorted by `task_order`.

mod error;
mod settings;
mod task;

pub use error::ConfigError;
pub use settings::{DatabaseSettings, NotifySettings, PipelineSettings, ProcessSettings, SqlSettings};
pub use task::{TaskDescriptor, TaskType, UnknownTaskType, load_tasks};
