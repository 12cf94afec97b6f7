//! Fee Engine library crate.
//!
//! This crate exposes the parking fee computation engine and API
//! components as reusable modules.  External applications may depend
//! on the `fee_engine` crate and call into `engine::compute_fee`
//! directly or embed the API via `api::build_router`.

pub mod models;
pub mod calendar;
pub mod error;
pub mod engine;
pub mod api;
