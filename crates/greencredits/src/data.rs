use std::path::Path;

use eyre::{ensure, WrapErr};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::parse_chain_id;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub(crate) struct NativeCurrency {
    pub(crate) name: String,
    pub(crate) symbol: String,
    pub(crate) decimals: u8,
}

/// Parameters of `wallet_addEthereumChain`, serialised as the wallet expects them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NetworkDescriptor {
    pub(crate) chain_id: String,
    pub(crate) chain_name: String,
    pub(crate) native_currency: NativeCurrency,
    pub(crate) rpc_urls: Vec<String>,
    pub(crate) block_explorer_urls: Vec<String>,
}

impl NetworkDescriptor {
    pub(crate) fn moonbase_alpha() -> Self {
        Self {
            chain_id: "0x507".to_owned(), // 1287
            chain_name: "Moonbase Alpha".to_owned(),
            native_currency: NativeCurrency {
                name: "Dev".to_owned(),
                symbol: "DEV".to_owned(),
                decimals: 18,
            },
            rpc_urls: vec!["https://rpc.api.moonbase.moonbeam.network".to_owned()],
            block_explorer_urls: vec!["https://moonbase.moonscan.io".to_owned()],
        }
    }

    /// Numeric form of `chain_id`. Validated descriptors always have one.
    pub(crate) fn chain_id_number(&self) -> Option<u64> {
        parse_chain_id(&self.chain_id)
    }

    fn validate(&self) -> eyre::Result<()> {
        ensure!(
            self.chain_id_number().is_some(),
            "chain id {:?} is not a hex quantity",
            self.chain_id
        );
        ensure!(!self.rpc_urls.is_empty(), "at least one rpc url is required");

        for url in self.rpc_urls.iter().chain(&self.block_explorer_urls) {
            Url::parse(url).wrap_err_with(|| format!("invalid url {url:?}"))?;
        }

        Ok(())
    }

    pub(crate) async fn load(path: &Path) -> eyre::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let descriptor: Self = serde_json::from_str(&contents)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        descriptor.validate()?;

        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moonbase_serialises_as_add_chain_params() {
        let value = serde_json::to_value(NetworkDescriptor::moonbase_alpha()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "chainId": "0x507",
                "chainName": "Moonbase Alpha",
                "nativeCurrency": { "name": "Dev", "symbol": "DEV", "decimals": 18 },
                "rpcUrls": ["https://rpc.api.moonbase.moonbeam.network"],
                "blockExplorerUrls": ["https://moonbase.moonscan.io"],
            })
        );
        assert_eq!(NetworkDescriptor::moonbase_alpha().chain_id_number(), Some(1287));
    }

    #[tokio::test]
    async fn load_rejects_bad_chain_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        let mut descriptor = NetworkDescriptor::moonbase_alpha();
        descriptor.chain_id = "moonbase".to_owned();
        std::fs::write(&path, serde_json::to_string(&descriptor).unwrap()).unwrap();

        assert!(NetworkDescriptor::load(&path).await.is_err());
    }

    #[tokio::test]
    async fn load_reads_custom_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("network.json");
        let mut descriptor = NetworkDescriptor::moonbase_alpha();
        descriptor.chain_id = "0x504".to_owned();
        descriptor.chain_name = "Moonbeam".to_owned();
        std::fs::write(&path, serde_json::to_string(&descriptor).unwrap()).unwrap();

        let loaded = NetworkDescriptor::load(&path).await.unwrap();
        assert_eq!(loaded, descriptor);
        assert_eq!(loaded.chain_id_number(), Some(1284));
    }
}
