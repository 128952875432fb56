use crate::config::Config;
use crate::store::CollectionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CollectionStore>,
    pub config: Config,
}
