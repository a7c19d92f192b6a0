use std::sync::Arc;

use crate::{config::AppConfig, printer::PrinterAdapter, service::ServiceRegistry};

/// Everything handlers need, injected through `dptree::deps!`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: ServiceRegistry,
    pub printer: Arc<dyn PrinterAdapter>,
}

impl AppState {
    pub fn new(config: AppConfig, printer: Arc<dyn PrinterAdapter>) -> Self {
        let services = ServiceRegistry::new(&config);
        Self {
            config: Arc::new(config),
            services,
            printer,
        }
    }
}
