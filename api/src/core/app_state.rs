use std::sync::Arc;

use forge_client::ForgeClient;
use job_queue::JobQueue;

/// Shared state handed to every handler via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub forge: ForgeClient,
    pub queue: Arc<JobQueue>,
    pub webhook_secret: Arc<str>,
}
