//! Client for the surface pricing service
//!
//! This module contains the REST client that fetches volatility surface grids.

mod rest;

pub use rest::{SurfaceClient, SurfaceRequest};
