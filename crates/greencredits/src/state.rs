use std::sync::Arc;

use alloy::primitives::Address;
use serde_json::{json, Value};

use crate::{error::ConnectError, wallet::InjectedWallet};

/// Handle on an injected wallet, optionally pinned to the chain it was negotiated for.
#[derive(Debug, Clone)]
pub(crate) struct WalletProvider {
    pub(crate) wallet: Arc<dyn InjectedWallet>,
    pub(crate) chain_id: Option<u64>,
}

impl WalletProvider {
    pub(crate) fn new(wallet: Arc<dyn InjectedWallet>, chain_id: Option<u64>) -> Self {
        Self { wallet, chain_id }
    }

    /// Derives the signer for the wallet's first authorised account.
    pub(crate) async fn signer(&self) -> Result<WalletSigner, ConnectError> {
        let accounts = self
            .wallet
            .request("eth_accounts", json!([]))
            .await
            .map_err(ConnectError::from_rpc)?;

        let account = match accounts {
            Value::Array(accounts) => accounts.into_iter().next(),
            _ => None,
        }
        .and_then(|account| account.as_str().map(str::to_owned))
        .ok_or_else(|| ConnectError::UnexpectedProvider("Wallet exposed no accounts".to_owned()))?;

        let address = account.parse::<Address>().map_err(|e| {
            ConnectError::UnexpectedProvider(format!("Invalid account {account}: {e}"))
        })?;

        Ok(WalletSigner {
            wallet: Arc::clone(&self.wallet),
            address,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct WalletSigner {
    pub(crate) wallet: Arc<dyn InjectedWallet>,
    pub(crate) address: Address,
}

/// Result of a completed connect, applied to [`ConnectionState`] in one step.
#[derive(Debug, Clone)]
pub(crate) struct Connection {
    pub(crate) provider: WalletProvider,
    pub(crate) signer: WalletSigner,
    pub(crate) address: Address,
    /// Value of the last-connected marker before this connection overwrote it.
    pub(crate) previous_wallet: Option<Address>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ConnectionState {
    pub(crate) provider: Option<WalletProvider>,
    pub(crate) signer: Option<WalletSigner>,
    pub(crate) address: Option<Address>,
}

impl ConnectionState {
    pub(crate) fn connected(&self) -> bool {
        self.address.is_some() && self.provider.is_some()
    }

    pub(crate) fn chain_id(&self) -> Option<u64> {
        self.provider.as_ref().and_then(|provider| provider.chain_id)
    }

    pub(crate) fn apply(&mut self, connection: Connection) {
        self.provider = Some(connection.provider);
        self.signer = Some(connection.signer);
        self.address = Some(connection.address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::RpcError,
        wallet::mock::{ScriptedWallet, ALICE},
    };

    #[test]
    fn connected_needs_address_and_provider() {
        let wallet: Arc<dyn InjectedWallet> = Arc::new(ScriptedWallet::named("w", true));
        let mut state = ConnectionState::default();
        assert!(!state.connected());

        state.provider = Some(WalletProvider::new(Arc::clone(&wallet), None));
        assert!(!state.connected());

        let address: Address = ALICE.parse().unwrap();
        state.apply(Connection {
            provider: WalletProvider::new(Arc::clone(&wallet), Some(1287)),
            signer: WalletSigner {
                wallet,
                address,
            },
            address,
            previous_wallet: None,
        });
        assert!(state.connected());
        assert_eq!(state.chain_id(), Some(1287));
    }

    #[tokio::test]
    async fn signer_uses_first_account() {
        let wallet = Arc::new(ScriptedWallet::named("w", true));
        wallet.reply(
            "eth_accounts",
            Ok(json!([ALICE, "0x0000000000000000000000000000000000000001"])),
        );

        let signer = WalletProvider::new(wallet, Some(1)).signer().await.unwrap();
        assert_eq!(signer.address, ALICE.parse::<Address>().unwrap());
    }

    #[tokio::test]
    async fn signer_without_accounts_is_unexpected() {
        let wallet = Arc::new(ScriptedWallet::named("w", true));
        wallet.reply("eth_accounts", Ok(json!([])));

        let err = WalletProvider::new(wallet, None).signer().await.unwrap_err();
        assert!(matches!(err, ConnectError::UnexpectedProvider(_)));
    }

    #[tokio::test]
    async fn signer_rejection_maps_to_user_rejected() {
        let wallet = Arc::new(ScriptedWallet::named("w", true));
        wallet.reply("eth_accounts", Err(RpcError::new(4001, "denied")));

        let err = WalletProvider::new(wallet, None).signer().await.unwrap_err();
        assert_eq!(err, ConnectError::UserRejected);
    }
}
