use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::ai::AiGateway;
use crate::dashboard::Dashboard;
use crate::errors::AppError;
use crate::render::Renderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Single owner of consultants, session and UI state. Handlers never interleave.
    pub dashboard: Arc<Mutex<Dashboard>>,
    /// Pluggable AI backend. Default: the Anthropic `LlmClient`.
    pub ai: Arc<dyn AiGateway>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    pub fn new(dashboard: Dashboard, ai: Arc<dyn AiGateway>, renderer: Renderer) -> Self {
        Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
            ai,
            renderer: Arc::new(renderer),
        }
    }

    /// Runs an AI driver on its own task so a client disconnect cannot drop it halfway
    /// and leave a loading flag set.
    pub async fn run_detached<F, Fut>(&self, driver: F) -> Result<(), AppError>
    where
        F: FnOnce(Arc<Mutex<Dashboard>>, Arc<dyn AiGateway>) -> Fut,
        Fut: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let task = tokio::spawn(driver(self.dashboard.clone(), self.ai.clone()));
        task.await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("AI task aborted: {e}")))?
    }
}
