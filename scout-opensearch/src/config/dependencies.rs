//! Dependency initialization and wiring for the Scout engine.

use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::AppError;
use scout_opensearch_repository::{OpenSearchTransport, ScoutEngine};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured engine.
    pub engine: ScoutEngine,
    /// The settings the engine was built from.
    pub settings: Settings,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`Settings::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If the settings are invalid or the transport cannot be built
    pub fn new() -> Result<Self, AppError> {
        Self::from_settings(Settings::from_env()?)
    }

    /// Build the transport and engine from already loaded settings.
    pub fn from_settings(settings: Settings) -> Result<Self, AppError> {
        info!(
            connection = ?settings.connection,
            soft_delete = settings.engine.soft_delete,
            "Initializing dependencies"
        );

        let transport = OpenSearchTransport::new(settings.connection.clone()).map_err(|e| {
            AppError::config(format!("Failed to create OpenSearch transport: {}", e))
        })?;

        let engine = ScoutEngine::with_config(Arc::new(transport), settings.engine.clone());

        Ok(Self { engine, settings })
    }
}
