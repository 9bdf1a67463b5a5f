//! `ev-core` — foundational types for the `rust_evac` routing workspace.
//!
//! This crate is a dependency of every other `ev-*` crate.  It has no `ev-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`ids`]      | `NodeId`, `EdgeId`                                      |
//! | [`geo`]      | `LngLat`, `NodeKey`, planar km distance, projection     |
//! | [`config`]   | `RouterConfig`, `HazardBands`                           |
//! | [`error`]    | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{HazardBands, RouterConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{LngLat, NodeKey};
pub use ids::{EdgeId, NodeId};
