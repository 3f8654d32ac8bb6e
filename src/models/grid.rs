//! Volatility surface grids
//!
//! `SurfaceData` is the wire form delivered by the pricing service: three
//! nested arrays with no guarantees about their shape. `Grid` is the validated
//! form the mesh builder consumes.

use crate::error::{Result, VizError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Raw surface payload as received from the pricing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceData {
    /// Maturity coordinate per cell
    pub grid_x: Vec<Vec<f64>>,
    /// Delta/strike coordinate per cell
    pub grid_y: Vec<Vec<f64>>,
    /// Implied volatility per cell
    pub grid_vol: Vec<Vec<f64>>,
}

impl SurfaceData {
    /// Validate the payload into a `Grid`.
    pub fn into_grid(self) -> Result<Grid> {
        Grid::try_from(self)
    }
}

/// Rectangular grid of (maturity, delta, volatility) samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    x: Array2<f64>,
    y: Array2<f64>,
    vol: Array2<f64>,
}

impl Grid {
    /// Build a grid from three arrays that must share one shape.
    pub fn new(x: Array2<f64>, y: Array2<f64>, vol: Array2<f64>) -> Result<Self> {
        if x.dim() != y.dim() || x.dim() != vol.dim() {
            return Err(VizError::MalformedGrid(format!(
                "shape mismatch: gridX {:?}, gridY {:?}, gridVol {:?}",
                x.dim(),
                y.dim(),
                vol.dim()
            )));
        }
        Ok(Self { x, y, vol })
    }

    /// Build a grid from nested rows, rejecting jagged or mismatched input.
    pub fn from_rows(x: &[Vec<f64>], y: &[Vec<f64>], vol: &[Vec<f64>]) -> Result<Self> {
        let rows = x.len();
        if y.len() != rows || vol.len() != rows {
            return Err(VizError::MalformedGrid(format!(
                "row count mismatch: gridX has {}, gridY has {}, gridVol has {}",
                rows,
                y.len(),
                vol.len()
            )));
        }
        let cols = x.first().map_or(0, Vec::len);

        let x = to_array("gridX", x, rows, cols)?;
        let y = to_array("gridY", y, rows, cols)?;
        let vol = to_array("gridVol", vol, rows, cols)?;
        Ok(Self { x, y, vol })
    }

    /// Synthetic surface used when no service data is available.
    pub fn demo(size: usize) -> Self {
        let x = Array2::from_shape_fn((size, size), |(_, j)| j as f64);
        let y = Array2::from_shape_fn((size, size), |(_, j)| j as f64);
        let vol = Array2::from_shape_fn((size, size), |(i, j)| {
            (i as f64 / 2.0).sin() * (j as f64 / 2.0).cos() * 5.0
        });
        Self { x, y, vol }
    }

    pub fn rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn cols(&self) -> usize {
        self.x.ncols()
    }

    /// (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        self.x.dim()
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    pub fn vol(&self) -> &Array2<f64> {
        &self.vol
    }

    /// Convert back into the wire representation.
    pub fn to_surface_data(&self) -> SurfaceData {
        let rows = |a: &Array2<f64>| -> Vec<Vec<f64>> {
            a.outer_iter().map(|row| row.to_vec()).collect()
        };
        SurfaceData {
            grid_x: rows(&self.x),
            grid_y: rows(&self.y),
            grid_vol: rows(&self.vol),
        }
    }
}

impl TryFrom<SurfaceData> for Grid {
    type Error = VizError;

    fn try_from(data: SurfaceData) -> Result<Self> {
        Grid::from_rows(&data.grid_x, &data.grid_y, &data.grid_vol)
    }
}

impl TryFrom<&SurfaceData> for Grid {
    type Error = VizError;

    fn try_from(data: &SurfaceData) -> Result<Self> {
        Grid::from_rows(&data.grid_x, &data.grid_y, &data.grid_vol)
    }
}

fn to_array(name: &str, rows: &[Vec<f64>], n_rows: usize, n_cols: usize) -> Result<Array2<f64>> {
    let mut flat = Vec::with_capacity(n_rows * n_cols);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(VizError::MalformedGrid(format!(
                "{} row {} has {} columns, expected {}",
                name,
                i,
                row.len(),
                n_cols
            )));
        }
        flat.extend_from_slice(row);
    }
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| VizError::MalformedGrid(format!("{}: {}", name, e)))
}
