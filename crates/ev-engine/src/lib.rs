//! `ev-engine` — load-once, hazard-aware road routing.
//!
//! # Query pipeline
//!
//! ```text
//! route / route_k(start, end, hazard?, k, hard_block_core):
//!   ① Validate  — coordinates finite and in range; k ≥ 1, capped at max_k.
//!   ② Load      — build the base network on first use (once, guarded).
//!   ③ Overlay   — fresh WorkingGraph borrowing the base network.
//!   ④ Snap      — split the nearest segment at start and at end.
//!   ⑤ Hazard    — penalize (or, for route_k, optionally remove) edges in
//!                 the core / near / mid bands.
//!   ⑥ Search    — Dijkstra (route) or lazy Yen iterator .take(k) (route_k).
//!   ⑦ Assemble  — coordinates, distance_km, eta_min per path.
//! ```
//!
//! The overlay is dropped at the end of the query, so no query ever sees
//! another's splits or penalties.  An empty network, an unsnappable point,
//! or an unreachable target all produce an empty result, not an error.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | `route_k_many` runs queries on Rayon's thread pool.    |
//! | `serde`    | Serialize/deserialize responses and `RouterConfig`.    |

pub mod engine;
pub mod error;
pub mod query;

#[cfg(test)]
mod tests;

pub use engine::RoadRouter;
pub use error::{EngineError, EngineResult};
pub use query::{RouteQuery, RouteResponse, RouteSet, MODE_DIRECTED, MODE_DIRECTED_K};

pub use ev_spatial::{Hazard, Route};
