//! Hub Negotiation Command

use serde::Serialize;

use list_sync_core::hub::protocol::{negotiate_url, NegotiateResponse};
use list_sync_core::{SyncError, SyncResult};

use super::call;

#[derive(Serialize)]
struct NegotiateArgs {
    url: String,
}

/// POST the negotiate endpoint below `hub_url` through the host
pub async fn negotiate_hub(hub_url: &str) -> SyncResult<NegotiateResponse> {
    let args = NegotiateArgs {
        url: negotiate_url(hub_url),
    };
    call("negotiate_hub", Some(&args))
        .await
        .map_err(|e| SyncError::Connection(e.to_string()))
}
