use std::env::var;

use lazy_static::lazy_static;

lazy_static! {
    pub static ref MONGO_URI: Option<String> = var("MONGOURI").ok();
    pub static ref ISSUES_DATABASE: String =
        var("ISSUES_DATABASE").unwrap_or_else(|_| "issue_tracker".to_string());
    pub static ref API_PREFIX: String = var("API_PREFIX").unwrap_or_else(|_| "/api".to_string());
    pub static ref PORT: u16 = port_from_env("PORT", 3000);
    pub static ref SWAGGER_PORT: u16 = port_from_env("SWAGGER_PORT", 8080);
}

pub const ISSUES_COLLECTION: &str = "issues";

fn port_from_env(name: &str, default: u16) -> u16 {
    match var(name).map(|value| value.parse::<u16>()) {
        Ok(Ok(port)) => port,
        Ok(Err(err)) => {
            log::warn!("Invalid {}: {}, falling back to {}", name, err, default);
            default
        }
        Err(_) => default,
    }
}
