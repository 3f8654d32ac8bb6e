use crate::config::ApiConfig;
use crate::error::{Result, VizError};
use crate::models::{Grid, SurfaceData};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Body of the surface request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRequest {
    pub symbol: String,
}

pub struct SurfaceClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl SurfaceClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn request_body(&self) -> SurfaceRequest {
        SurfaceRequest {
            symbol: self.config.symbol.clone(),
        }
    }

    /// POST the surface request and decode the raw grid payload
    pub async fn fetch_surface(&self) -> Result<SurfaceData> {
        let body = self.request_body();
        debug!("Requesting surface for {} from {}", body.symbol, self.config.url);

        let resp = self
            .client
            .post(&self.config.url)
            .json(&body)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| VizError::FetchError(format!("Request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(VizError::FetchError(format!(
                "Surface service returned {}",
                status
            )));
        }

        let data = resp.json::<SurfaceData>().await.map_err(|e| {
            VizError::ParseError(format!("Failed to parse surface data: {}", e))
        })?;

        info!(
            "Received surface grid: gridX {} rows, gridY {} rows, gridVol {} rows",
            data.grid_x.len(),
            data.grid_y.len(),
            data.grid_vol.len()
        );

        Ok(data)
    }

    /// Fetch and validate the grid
    pub async fn fetch_grid(&self) -> Result<Grid> {
        self.fetch_surface().await?.into_grid()
    }
}
