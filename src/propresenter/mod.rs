//! `ProPresenter` integration.
//!
//! Provides the network control API client and the library snapshot used to
//! resolve songs by name.

/// API client for the `ProPresenter` control API
pub mod api;
/// Read-only library snapshot and name lookup
pub mod library;

pub use api::ProPresenterClient;
pub use library::{LibraryEntry, LibrarySnapshot};
