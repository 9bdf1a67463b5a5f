//! `ev-spatial` — road network, snapping, hazard penalties, and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`network`]  | `RoadNetwork` (CSR), `RoadNetworkBuilder`, `EdgeAttrs`       |
//! | [`loader`]   | `load_geojson_path` / `_reader` / `_str`, direction rules   |
//! | [`index`]    | `SegmentIndex` (R-tree of base segments), `Segment`         |
//! | [`overlay`]  | `WorkingGraph`: per-query delta over the base network       |
//! | [`snap`]     | `snap_point`, `split_segment`                               |
//! | [`hazard`]   | `Hazard`, `apply_hazard`, `HazardReport`                    |
//! | [`search`]   | `RoutingGraph`, `shortest_path`, `KShortestPaths`, `Path`   |
//! | [`assemble`] | `Route`, `assemble`                                         |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Query lifecycle
//!
//! The base network is built once and never mutated.  A query creates a
//! [`WorkingGraph`], snaps its endpoints into it, applies hazard penalties to
//! it, searches it, and drops it.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Route`.                |

pub mod assemble;
pub mod error;
pub mod hazard;
pub mod index;
pub mod loader;
pub mod network;
pub mod overlay;
pub mod search;
pub mod snap;


pub use assemble::{assemble, Route};
pub use error::{SpatialError, SpatialResult};
pub use hazard::{apply_hazard, Hazard, HazardBand, HazardReport};
pub use index::{Segment, SegmentIndex};
pub use loader::{load_geojson_path, load_geojson_reader, load_geojson_str, Direction};
pub use network::{EdgeAttrs, RoadNetwork, RoadNetworkBuilder};
pub use overlay::WorkingGraph;
pub use search::{shortest_path, KShortestPaths, Path, RoutingGraph};
pub use snap::{snap_point, split_segment};
