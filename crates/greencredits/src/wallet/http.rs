use alloy::{
    providers::{Provider, ProviderBuilder, RootProvider},
    transports::{BoxTransport, RpcError as TransportError},
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;
use url::Url;

use super::InjectedWallet;
use crate::error::RpcError;

/// A wallet exposing EIP-1193 over JSON-RPC on HTTP (Frame, a local signer, ...).
#[derive(Debug)]
pub(crate) struct HttpWallet {
    url: Url,
    primary: bool,
    provider: RootProvider<BoxTransport>,
}

impl HttpWallet {
    pub(crate) fn new(url: Url, primary: bool) -> Self {
        let provider = ProviderBuilder::new().on_http(url.clone()).boxed();

        Self {
            url,
            primary,
            provider,
        }
    }
}

#[async_trait]
impl InjectedWallet for HttpWallet {
    fn name(&self) -> &str {
        self.url.as_str()
    }

    fn is_primary(&self) -> bool {
        self.primary
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        trace!(url = %self.url, method, "Wallet request");

        self.provider
            .raw_request::<_, Value>(method.to_owned().into(), params)
            .await
            .map_err(|err| match err {
                TransportError::ErrorResp(payload) => {
                    RpcError::new(payload.code, payload.message.into_owned())
                }
                err => RpcError::transport(err.to_string()),
            })
    }
}
