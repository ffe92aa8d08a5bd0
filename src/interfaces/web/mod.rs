//! HTTP dispatch surface: receives inbound create/get/delete calls and
//! routes them to the registered agent for the task type. The dispatch
//! layer owns no job state; it is a thin pass-through over the registry.

mod handlers;
mod router;

pub use router::build_router;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::core::registry::AgentRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AgentRegistry>,
}

pub struct DispatchServer {
    host: String,
    port: u16,
    registry: Arc<AgentRegistry>,
}

impl DispatchServer {
    pub fn new(host: String, port: u16, registry: Arc<AgentRegistry>) -> Self {
        Self {
            host,
            port,
            registry,
        }
    }

    pub async fn run(self) -> Result<()> {
        let app = build_router(AppState {
            registry: self.registry.clone(),
        });
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(
            addr = %addr,
            task_types = ?self.registry.task_types(),
            "dispatch server listening"
        );
        axum::serve(listener, app).await?;
        Ok(())
    }
}
