//! Service layer between the remote clients and the pipeline.
//!
//! Resolution joins classified items with library and scripture data; the
//! playlist service turns resolved items into remote playlist mutations.

pub mod playlist;
pub mod resolve;

pub use playlist::{AssemblyReport, AssemblyState, PlaylistAssembler, PlaylistBackend};
pub use resolve::{resolve_items, resolve_song, Resolution};
