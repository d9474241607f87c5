//! `serviceflow` - worship planning document to `ProPresenter` playlist.
//!
//! A run reads a `.docx` planning document, classifies its songs and psalm
//! readings, resolves songs against the `ProPresenter` library, fetches psalm
//! text from a translation service, and builds a playlist in one pass.
//! Item failures are recorded in an outcome log; only document, classification
//! and playlist creation failures stop a run.

pub mod bible;
pub mod classify;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod propresenter;
pub mod services;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{continuation, ContinueHandle, Continuation, Pipeline, PipelineEvent, RunReport};
