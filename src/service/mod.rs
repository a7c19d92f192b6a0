use crate::config::AppConfig;

mod access;
mod ratelimit;

pub use access::AccessService;
pub use ratelimit::{RateLimitService, ThrottleDecision};

#[derive(Clone)]
pub struct ServiceRegistry {
    pub access: AccessService,
    pub ratelimit: RateLimitService,
}

impl ServiceRegistry {
    pub fn new(config: &AppConfig) -> Self {
        info!("Initializing service registry");

        let access = AccessService::new(&config.telegram.whitelist, config.telegram.admin_id);
        let ratelimit = RateLimitService::new(config.print.rate_limit_secs);

        info!(
            "Service registry initialized ({} whitelisted users, {}s print window)",
            access.whitelist_size(),
            config.print.rate_limit_secs
        );

        Self { access, ratelimit }
    }
}
