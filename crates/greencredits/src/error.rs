use thiserror::Error;

/// EIP-1193 "user rejected the request".
pub(crate) const USER_REJECTED_CODE: i64 = 4001;
/// `wallet_switchEthereumChain` on a chain the wallet has never seen.
pub(crate) const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Error object returned by an injected wallet's `request` call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("wallet error {code}: {message}")]
pub(crate) struct RpcError {
    pub(crate) code: i64,
    pub(crate) message: String,
}

impl RpcError {
    pub(crate) fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Failures below the JSON-RPC layer (HTTP, decoding) carry no wallet code.
    pub(crate) fn transport(message: impl Into<String>) -> Self {
        Self::new(-32603, message)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConnectError {
    #[error("No injected wallet found")]
    NoWallet,

    #[error("Wallet does not know the requested network: {0}")]
    UnknownNetwork(RpcError),

    #[error("Request rejected by the user")]
    UserRejected,

    #[error("Unexpected provider error: {0}")]
    UnexpectedProvider(String),

    #[error("A connection request is already pending")]
    AlreadyPending,

    #[error("Connection request was cancelled")]
    Cancelled,
}

impl ConnectError {
    /// Maps a failed wallet request onto the connection taxonomy.
    pub(crate) fn from_rpc(err: RpcError) -> Self {
        match err.code {
            USER_REJECTED_CODE => Self::UserRejected,
            UNRECOGNIZED_CHAIN_CODE => Self::UnknownNetwork(err),
            _ => Self::UnexpectedProvider(err.message),
        }
    }

    /// Whether the UI should be told about this failure at all.
    pub(crate) fn is_silent(&self) -> bool {
        matches!(self, Self::AlreadyPending | Self::Cancelled)
    }

    /// The single message shown to the user for a failed attempt.
    pub(crate) fn user_message(&self) -> String {
        match self {
            Self::NoWallet => "No injected wallet found. Please install MetaMask.".to_owned(),
            Self::UnknownNetwork(_) => {
                "Your wallet could not add the required network.".to_owned()
            }
            Self::UserRejected => "The request was rejected in your wallet.".to_owned(),
            Self::UnexpectedProvider(message) if !message.is_empty() => message.to_owned(),
            Self::UnexpectedProvider(_) => "Failed to connect wallet".to_owned(),
            Self::AlreadyPending => "A wallet connection is already in progress.".to_owned(),
            Self::Cancelled => "The wallet connection was cancelled.".to_owned(),
        }
    }
}

#[derive(Error, Debug)]
pub(crate) enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
#[error("telemetry sink unavailable: {0}")]
pub(crate) struct TelemetryError(pub(crate) String);
