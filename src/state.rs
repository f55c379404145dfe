use std::sync::Arc;

use crate::application::services::IdentityService;
use crate::domain::delete_worker::DeleteQueue;
use crate::domain::repositories::UrlRepository;

/// Shared handles passed to request handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn UrlRepository>,
    pub identity: Arc<IdentityService>,
    pub delete_queue: DeleteQueue,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn UrlRepository>,
        identity: Arc<IdentityService>,
        delete_queue: DeleteQueue,
    ) -> Self {
        Self {
            repository,
            identity,
            delete_queue,
        }
    }
}
