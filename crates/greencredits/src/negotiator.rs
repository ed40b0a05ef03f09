use std::sync::Arc;

use alloy::primitives::Address;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    data::NetworkDescriptor,
    error::{ConnectError, UNRECOGNIZED_CHAIN_CODE},
    state::{Connection, WalletProvider},
    storage::{KeyValueStore, LAST_CONNECTED_WALLET_KEY},
    utils::{parse_chain_id, short_address},
    wallet::{select_injected, InjectedWallet},
};

/// Brings an injected wallet onto the target network and obtains its account.
#[derive(Debug)]
pub(crate) struct ConnectionNegotiator {
    wallets: Vec<Arc<dyn InjectedWallet>>,
    network: NetworkDescriptor,
    store: Arc<dyn KeyValueStore>,
    pending: Mutex<()>,
}

impl ConnectionNegotiator {
    pub(crate) fn new(
        wallets: Vec<Arc<dyn InjectedWallet>>,
        network: NetworkDescriptor,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            wallets,
            network,
            store,
            pending: Mutex::new(()),
        }
    }

    pub(crate) fn network(&self) -> &NetworkDescriptor {
        &self.network
    }

    pub(crate) fn detect(&self) -> Option<Arc<dyn InjectedWallet>> {
        select_injected(&self.wallets)
    }

    /// Runs the full handshake. Only one attempt runs at a time; overlapping
    /// calls fail fast with [`ConnectError::AlreadyPending`].
    pub(crate) async fn connect(&self) -> Result<Connection, ConnectError> {
        let Ok(_guard) = self.pending.try_lock() else {
            debug!("Connect requested while another attempt is pending");
            return Err(ConnectError::AlreadyPending);
        };

        let wallet = self.detect().ok_or(ConnectError::NoWallet)?;
        debug!(wallet = wallet.name(), "Connecting wallet");

        self.ensure_network(wallet.as_ref()).await?;

        wallet
            .request("eth_requestAccounts", json!([]))
            .await
            .map_err(ConnectError::from_rpc)?;

        let provider = WalletProvider::new(Arc::clone(&wallet), self.network.chain_id_number());
        let signer = provider.signer().await?;
        let address = signer.address;

        let previous_wallet = self.remember_wallet(&address);
        info!(address = %short_address(&address), wallet = wallet.name(), "Wallet connected");

        Ok(Connection {
            provider,
            signer,
            address,
            previous_wallet,
        })
    }

    async fn ensure_network(&self, wallet: &dyn InjectedWallet) -> Result<(), ConnectError> {
        let current = wallet
            .request("eth_chainId", json!([]))
            .await
            .map_err(ConnectError::from_rpc)?;
        let current = current.as_str().and_then(parse_chain_id);

        if current.is_some() && current == self.network.chain_id_number() {
            return Ok(());
        }
        debug!(?current, expected = %self.network.chain_id, "Switching network");

        let switched = wallet
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": self.network.chain_id }]),
            )
            .await;

        match switched {
            Ok(_) => Ok(()),
            Err(err) if err.code == UNRECOGNIZED_CHAIN_CODE => {
                info!(chain = %self.network.chain_name, "Adding network to wallet");

                wallet
                    .request("wallet_addEthereumChain", json!([self.network]))
                    .await
                    .map(|_| ())
                    .map_err(ConnectError::from_rpc)
            }
            Err(err) => Err(ConnectError::from_rpc(err)),
        }
    }

    /// Stores `address` as the last connected wallet and returns the value it replaced.
    fn remember_wallet(&self, address: &Address) -> Option<Address> {
        let previous = match self.store.get(LAST_CONNECTED_WALLET_KEY) {
            Ok(previous) => previous.and_then(|value| value.parse().ok()),
            Err(err) => {
                warn!(%err, "Failed to read last connected wallet");
                None
            }
        };

        if let Err(err) = self
            .store
            .set(LAST_CONNECTED_WALLET_KEY, &address.to_string())
        {
            warn!(%err, "Failed to persist last connected wallet");
        }

        previous
    }
}
