use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StepAction {
    Connect,
    Demo,
}

impl StepAction {
    pub(crate) fn label(self) -> &'static str {
        match self {
            StepAction::Connect => "🔗 Connect Wallet",
            StepAction::Demo => "🎮 Try Demo Mode",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(crate) struct StepActions {
    pub(crate) primary: Option<StepAction>,
    pub(crate) secondary: Option<StepAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OnboardingStep {
    pub(crate) id: &'static str,
    pub(crate) title: &'static str,
    pub(crate) content_key: &'static str,
    pub(crate) show_buttons: bool,
    pub(crate) actions: Option<StepActions>,
}

pub(crate) const WALKTHROUGH_STEPS: &[OnboardingStep] = &[
    OnboardingStep {
        id: "welcome",
        title: "Welcome to Green Credits",
        content_key: "welcome",
        show_buttons: true,
        actions: None,
    },
    OnboardingStep {
        id: "connect-wallet",
        title: "Connect Your Wallet or Try Demo",
        content_key: "connect",
        show_buttons: false,
        actions: Some(StepActions {
            primary: Some(StepAction::Connect),
            secondary: Some(StepAction::Demo),
        }),
    },
    OnboardingStep {
        id: "mobile-wallets",
        title: "Mobile Wallet Recommendations",
        content_key: "mobileWallets",
        show_buttons: true,
        actions: None,
    },
    OnboardingStep {
        id: "submit-action",
        title: "How to Submit an Action",
        content_key: "submitAction",
        show_buttons: true,
        actions: None,
    },
    OnboardingStep {
        id: "donate",
        title: "How to Donate",
        content_key: "donate",
        show_buttons: true,
        actions: None,
    },
    OnboardingStep {
        id: "moonbase-network",
        title: "Moonbase Network Requirement",
        content_key: "moonbase",
        show_buttons: true,
        actions: None,
    },
];

/// Body paragraphs for a step's content key.
pub(crate) fn content(key: &str) -> &'static [&'static str] {
    match key {
        "welcome" => &[
            "Green Credits rewards users with Green Credit Tokens (GCT) for verified real-world environmental actions on the Moonbeam blockchain.",
            "Earn tokens by submitting proof of actions like tree planting, waste reduction, or sustainable farming.",
            "Join a transparent, community-driven ecosystem that incentivizes planetary healing.",
        ],
        "connect" => &[
            "To start earning and managing GCT tokens, connect a Web3 wallet like MetaMask.",
            "You can also explore the platform in demo mode without connecting a wallet.",
        ],
        "mobileWallets" => &[
            "For the best mobile experience, use MetaMask Mobile or WalletConnect-enabled wallets such as Trust Wallet.",
        ],
        "submitAction" => &[
            "Navigate to the \"Submit Action\" page and provide details about your eco-friendly activity.",
            "After verification, you'll earn GCT tokens based on the impact of your submission.",
        ],
        "donate" => &[
            "Donate your earned GCT tokens to verified NGOs and environmental causes.",
            "Your contributions directly support real-world conservation efforts.",
        ],
        "moonbase" => &[
            "All Green Credits transactions run on Moonbase Alpha, part of the Moonbeam ecosystem on Polkadot.",
            "This ensures low-cost testing, fast transactions, and interoperability.",
        ],
        _ => &[],
    }
}
