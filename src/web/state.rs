use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::predict::TleLoader;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tle_loader: Arc<RwLock<TleLoader>>,
}
