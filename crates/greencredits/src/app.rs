use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};

use alloy::primitives::Address;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::{
    error::ConnectError,
    negotiator::ConnectionNegotiator,
    onboarding::{
        keyboard::{Key, KeyboardHub},
        sequencer::{StepView, Walkthrough, WalkthroughCallbacks},
        should_show,
        steps::WALKTHROUGH_STEPS,
        MountedWalkthrough, OnboardingProgress, WalkthroughCommand,
    },
    state::{ConnectionState, WalletProvider},
    storage::KeyValueStore,
    telemetry::Telemetry,
    utils::short_address,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConnectionSnapshot {
    pub(crate) connected: bool,
    pub(crate) address: Option<Address>,
    pub(crate) chain_id: Option<u64>,
    pub(crate) wallet: Option<String>,
    pub(crate) demo_mode: bool,
}

/// Updates pushed to the UI.
#[derive(Debug, Clone)]
pub(crate) enum AppEvent {
    Connection(ConnectionSnapshot),
    WalkthroughStep(StepView),
    WalkthroughClosed,
    Alert(String),
}

/// Root context: owns the connection state and the onboarding modal, and is
/// handed by reference to every route and socket.
#[derive(Debug)]
pub(crate) struct App {
    connection: RwLock<ConnectionState>,
    negotiator: ConnectionNegotiator,
    store: Arc<dyn KeyValueStore>,
    telemetry: Arc<dyn Telemetry>,
    keyboard: KeyboardHub,
    walkthrough: Mutex<Option<MountedWalkthrough>>,
    current_step: Mutex<Option<StepView>>,
    demo_mode: AtomicBool,
    events: broadcast::Sender<AppEvent>,
    lifetime: watch::Sender<()>,
    this: Weak<App>,
}

impl App {
    pub(crate) fn new(
        negotiator: ConnectionNegotiator,
        store: Arc<dyn KeyValueStore>,
        telemetry: Arc<dyn Telemetry>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        let (lifetime, _) = watch::channel(());

        Arc::new_cyclic(|this| Self {
            connection: RwLock::new(ConnectionState::default()),
            negotiator,
            store,
            telemetry,
            keyboard: KeyboardHub::default(),
            walkthrough: Mutex::new(None),
            current_step: Mutex::new(None),
            demo_mode: AtomicBool::new(false),
            events,
            lifetime,
            this: Weak::clone(this),
        })
    }

    /// Picks up an injected wallet and opens the walkthrough for first-time visitors.
    pub(crate) fn start(&self) {
        if let Some(wallet) = self.negotiator.detect() {
            info!(wallet = wallet.name(), "Injected wallet detected");
            self.connection_mut().provider = Some(WalletProvider::new(wallet, None));
        } else {
            info!("No injected wallet detected");
        }

        let progress = OnboardingProgress::load(self.store.as_ref());
        if should_show(progress.completed, None, progress.last_wallet.as_ref()) {
            self.open_walkthrough();
        }
    }

    fn connection(&self) -> RwLockReadGuard<'_, ConnectionState> {
        self.connection.read().unwrap_or_else(|e| e.into_inner())
    }

    fn connection_mut(&self) -> RwLockWriteGuard<'_, ConnectionState> {
        self.connection.write().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn connected(&self) -> bool {
        self.connection().connected()
    }

    pub(crate) fn snapshot(&self) -> ConnectionSnapshot {
        let connection = self.connection();

        ConnectionSnapshot {
            connected: connection.connected(),
            address: connection.address,
            chain_id: connection.chain_id(),
            wallet: connection
                .signer
                .as_ref()
                .map(|signer| signer.wallet.name().to_owned()),
            demo_mode: self.demo_mode.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn network_name(&self) -> &str {
        &self.negotiator.network().chain_name
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    /// Resolves when the app shuts down.
    pub(crate) fn lifetime(&self) -> watch::Receiver<()> {
        self.lifetime.subscribe()
    }

    pub(crate) fn shutdown(&self) {
        self.walkthrough
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        self.emit(AppEvent::WalkthroughClosed);
        self.lifetime.send_replace(());
    }

    /// Step the UI should be showing, for clients that attach late.
    pub(crate) fn current_step(&self) -> Option<StepView> {
        self.current_step
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn emit(&self, event: AppEvent) {
        match &event {
            AppEvent::WalkthroughStep(view) => {
                *self.current_step.lock().unwrap_or_else(|e| e.into_inner()) = Some(view.clone());
            }
            AppEvent::WalkthroughClosed => {
                self.current_step
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .take();
            }
            AppEvent::Connection(_) | AppEvent::Alert(_) => {}
        }

        // No subscribers is fine, nobody is looking
        self.events.send(event).ok();
    }

    /// Connects the injected wallet unless `cancel` fires first, in which case
    /// the outcome is dropped and the connection state stays as it was.
    pub(crate) async fn connect_wallet(
        &self,
        mut cancel: watch::Receiver<()>,
    ) -> Result<Address, ConnectError> {
        let result = tokio::select! {
            biased;

            _ = cancel.changed() => Err(ConnectError::Cancelled),
            result = self.negotiator.connect() => result,
        };

        let connection = match result {
            Ok(connection) => connection,
            Err(err) if err.is_silent() => {
                debug!(%err, "Connect attempt dropped");
                return Err(err);
            }
            Err(err) => {
                warn!(%err, "Wallet connection failed");
                self.emit(AppEvent::Alert(err.user_message()));
                return Err(err);
            }
        };

        let address = connection.address;
        let previous_wallet = connection.previous_wallet;
        self.connection_mut().apply(connection);
        self.emit(AppEvent::Connection(self.snapshot()));
        debug!(address = %short_address(&address), "Connection state updated");

        let progress = OnboardingProgress::load(self.store.as_ref());
        if should_show(progress.completed, Some(&address), previous_wallet.as_ref()) {
            info!(address = %short_address(&address), "New wallet, reopening walkthrough");
            self.open_walkthrough();
        } else {
            self.dismiss_walkthrough();
        }

        Ok(address)
    }

    /// Preview mode without a wallet handshake.
    pub(crate) fn enable_demo(&self) {
        if !self.demo_mode.swap(true, Ordering::Relaxed) {
            info!("Demo mode enabled");
        }
        self.emit(AppEvent::Connection(self.snapshot()));
    }

    /// Mounts a fresh walkthrough at step 0, replacing any open one.
    pub(crate) fn open_walkthrough(&self) {
        let listener = self.keyboard.listen();
        let walkthrough = Walkthrough::open(
            WALKTHROUGH_STEPS,
            Arc::clone(&self.store),
            Arc::clone(&self.telemetry),
            self.walkthrough_callbacks(),
        );
        let mounted = MountedWalkthrough::mount(walkthrough, listener);

        let replaced = self
            .walkthrough
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(mounted);
        debug!(replaced = replaced.is_some(), "Walkthrough mounted");
    }

    /// Unmounts an open walkthrough without marking onboarding completed.
    fn dismiss_walkthrough(&self) {
        let dismissed = {
            let mut walkthrough = self.walkthrough.lock().unwrap_or_else(|e| e.into_inner());
            if walkthrough.as_ref().is_some_and(MountedWalkthrough::is_mounted) {
                walkthrough.take()
            } else {
                None
            }
        };

        if dismissed.is_some() {
            debug!("Walkthrough dismissed after connect");
            self.emit(AppEvent::WalkthroughClosed);
        }
    }

    fn walkthrough_callbacks(&self) -> WalkthroughCallbacks {
        let on_step = Weak::clone(&self.this);
        let on_close = Weak::clone(&self.this);
        let on_connect = Weak::clone(&self.this);
        let on_demo = Weak::clone(&self.this);

        WalkthroughCallbacks {
            on_step: Box::new(move |view: StepView| {
                if let Some(app) = on_step.upgrade() {
                    app.emit(AppEvent::WalkthroughStep(view));
                }
            }),
            on_close: Box::new(move || {
                if let Some(app) = on_close.upgrade() {
                    app.emit(AppEvent::WalkthroughClosed);
                }
            }),
            on_connect: Box::new(move || {
                let Some(app) = on_connect.upgrade() else {
                    return;
                };
                app.emit(AppEvent::WalkthroughClosed);

                tokio::spawn(async move {
                    let cancel = app.lifetime();
                    app.connect_wallet(cancel).await.ok();
                });
            }),
            on_demo: Box::new(move || {
                if let Some(app) = on_demo.upgrade() {
                    app.emit(AppEvent::WalkthroughClosed);
                    app.enable_demo();
                }
            }),
        }
    }

    pub(crate) fn is_walkthrough_open(&self) -> bool {
        self.walkthrough
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(MountedWalkthrough::is_mounted)
    }

    pub(crate) fn press_key(&self, key: Key) {
        let listeners = self.keyboard.press(key);
        if listeners == 0 {
            debug!(?key, "Key pressed with no walkthrough mounted");
        }
    }

    pub(crate) fn walkthrough_command(&self, command: WalkthroughCommand) {
        let sent = self
            .walkthrough
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|mounted| mounted.send(command));

        if !sent {
            debug!(?command, "Walkthrough command with no walkthrough mounted");
        }
    }

    #[cfg(test)]
    pub(crate) fn keyboard_listeners(&self) -> usize {
        self.keyboard.listener_count()
    }
}
