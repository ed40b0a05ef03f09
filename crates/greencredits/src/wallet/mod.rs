use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RpcError;

mod http;

#[cfg(test)]
pub(crate) mod mock;

pub(crate) use http::HttpWallet;

/// An EIP-1193 wallet the host can talk to.
#[async_trait]
pub(crate) trait InjectedWallet: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Set on the wallet implementation the host prefers when several are exposed.
    fn is_primary(&self) -> bool;

    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

/// Picks the primary wallet if one is flagged, otherwise the first available.
pub(crate) fn select_injected(
    wallets: &[Arc<dyn InjectedWallet>],
) -> Option<Arc<dyn InjectedWallet>> {
    wallets
        .iter()
        .find(|wallet| wallet.is_primary())
        .or_else(|| wallets.first())
        .map(Arc::clone)
}
