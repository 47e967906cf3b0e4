use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::bridge::Bridge;
use crate::config::AppConfig;

pub struct AppState {
    pub bridge: Arc<Bridge>,
    pub config: Mutex<AppConfig>,
    pub config_path: Mutex<Option<PathBuf>>,
}

impl AppState {
    pub fn new(bridge: Arc<Bridge>, config: AppConfig, config_path: Option<PathBuf>) -> Self {
        Self {
            bridge,
            config: Mutex::new(config),
            config_path: Mutex::new(config_path),
        }
    }
}
