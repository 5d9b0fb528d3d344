//! Client Config Command

use list_sync_core::ClientConfig;

use super::call;

/// Host-provided configuration, or the defaults when there is none
pub async fn get_client_config() -> ClientConfig {
    match call::<(), Option<ClientConfig>>("get_client_config", None).await {
        Ok(Some(config)) => config.sanitized(),
        Ok(None) => ClientConfig::default(),
        Err(e) => {
            tracing::warn!(error = %e, "client config unavailable, using defaults");
            ClientConfig::default()
        }
    }
}
