//! # volsurf-viz
//!
//! Turns an implied volatility surface, sampled on a rectangular
//! (maturity x delta) grid, into a color-mapped triangle mesh and renders it.
//!
//! ## Features
//!
//! - Async REST client for the surface pricing service
//! - Grid validation (mismatched or jagged arrays are rejected)
//! - Grid to mesh conversion with per-vertex volatility colors
//! - Mesh cache keyed by grid content
//! - 3D rendering of the mesh to PNG or an in-memory image
//! - Environment-based configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use volsurf_viz::api::SurfaceClient;
//! use volsurf_viz::config::Config;
//! use volsurf_viz::utils::{build_mesh, render_mesh, RenderOptions};
//!
//! #[tokio::main]
//! async fn main() -> volsurf_viz::error::Result<()> {
//!     let config = Config::from_env()?;
//!     config.init_logging()?;
//!
//!     let client = SurfaceClient::new(config.api.clone());
//!     let grid = client.fetch_grid().await?;
//!
//!     let mesh = build_mesh(&grid);
//!     render_mesh(&mesh, "volatility_surface.png", &RenderOptions::default())?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use api::SurfaceClient;
pub use config::Config;
pub use error::{Result, VizError};
pub use models::{Grid, Mesh, SurfaceData, VertexLayout};
pub use utils::{build_mesh, MeshBuilder};
