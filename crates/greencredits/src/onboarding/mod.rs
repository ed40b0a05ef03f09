use alloy::primitives::Address;
use serde::Deserialize;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::warn;

use crate::storage::{KeyValueStore, LAST_CONNECTED_WALLET_KEY, ONBOARDING_COMPLETED_KEY};

pub(crate) mod keyboard;
pub(crate) mod sequencer;
pub(crate) mod steps;

use keyboard::KeyListener;
use sequencer::{ActionSlot, Walkthrough};

/// Persisted onboarding flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct OnboardingProgress {
    pub(crate) completed: bool,
    pub(crate) last_wallet: Option<Address>,
}

impl OnboardingProgress {
    /// Unreadable entries count as absent.
    pub(crate) fn load(store: &dyn KeyValueStore) -> Self {
        let completed = match store.get(ONBOARDING_COMPLETED_KEY) {
            Ok(value) => value.is_some_and(|value| value == "true"),
            Err(err) => {
                warn!(%err, "Failed to read onboarding flag");
                false
            }
        };
        let last_wallet = match store.get(LAST_CONNECTED_WALLET_KEY) {
            Ok(value) => value.and_then(|value| value.parse().ok()),
            Err(err) => {
                warn!(%err, "Failed to read last connected wallet");
                None
            }
        };

        Self {
            completed,
            last_wallet,
        }
    }
}

/// Whether the walkthrough should open on its own: first visit without a
/// wallet, or a returning user who just connected a wallet not seen before.
pub(crate) fn should_show(
    completed: bool,
    address: Option<&Address>,
    last_seen: Option<&Address>,
) -> bool {
    match address {
        None => !completed,
        Some(address) => completed && last_seen != Some(address),
    }
}

/// Button presses coming from the rendered modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum WalkthroughCommand {
    Next,
    Prev,
    Finish,
    Close,
    Primary,
    Secondary,
}

/// A walkthrough attached to the keyboard and driven on its own task.
/// Dropping the handle unmounts it.
#[derive(Debug)]
pub(crate) struct MountedWalkthrough {
    commands: mpsc::UnboundedSender<WalkthroughCommand>,
    task: JoinHandle<()>,
}

impl MountedWalkthrough {
    pub(crate) fn mount(mut walkthrough: Walkthrough, mut keys: KeyListener) -> Self {
        let (commands, mut rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            while walkthrough.is_open() {
                tokio::select! {
                    Some(key) = keys.next() => walkthrough.handle_key(key),
                    Some(command) = rx.recv() => match command {
                        WalkthroughCommand::Next => walkthrough.next(),
                        WalkthroughCommand::Prev => walkthrough.prev(),
                        WalkthroughCommand::Finish => walkthrough.finish(),
                        WalkthroughCommand::Close => walkthrough.close(),
                        WalkthroughCommand::Primary => {
                            walkthrough.select_action(ActionSlot::Primary)
                        }
                        WalkthroughCommand::Secondary => {
                            walkthrough.select_action(ActionSlot::Secondary)
                        }
                    },
                    else => break,
                }
            }
            // `keys` drops here, detaching from the keyboard
        });

        Self { commands, task }
    }

    pub(crate) fn is_mounted(&self) -> bool {
        !self.task.is_finished()
    }

    pub(crate) fn send(&self, command: WalkthroughCommand) -> bool {
        self.commands.send(command).is_ok()
    }
}

impl Drop for MountedWalkthrough {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::{
        keyboard::{Key, KeyboardHub},
        sequencer::{StepView, WalkthroughCallbacks},
        steps::WALKTHROUGH_STEPS,
        *,
    };
    use crate::{
        storage::MemoryStore,
        telemetry::testing::RecordingTelemetry,
        wallet::mock::{ALICE, BOB},
    };

    fn address(value: &str) -> Address {
        value.parse().unwrap()
    }

    #[test]
    fn first_visit_shows() {
        assert!(should_show(false, None, None));
    }

    #[test]
    fn completed_without_wallet_stays_hidden() {
        assert!(!should_show(true, None, None));
        assert!(!should_show(true, None, Some(&address(ALICE))));
    }

    #[test]
    fn new_wallet_after_completion_shows() {
        let (alice, bob) = (address(ALICE), address(BOB));

        assert!(should_show(true, Some(&bob), Some(&alice)));
        assert!(should_show(true, Some(&bob), None));
        assert!(!should_show(true, Some(&alice), Some(&alice)));
    }

    #[test]
    fn connected_before_completing_stays_hidden() {
        assert!(!should_show(false, Some(&address(ALICE)), None));
    }

    #[test]
    fn progress_reads_both_flags() {
        let store = MemoryStore::default();
        assert_eq!(OnboardingProgress::load(&store), OnboardingProgress::default());

        store.set(ONBOARDING_COMPLETED_KEY, "true").unwrap();
        store
            .set(LAST_CONNECTED_WALLET_KEY, &address(ALICE).to_string())
            .unwrap();

        assert_eq!(
            OnboardingProgress::load(&store),
            OnboardingProgress {
                completed: true,
                last_wallet: Some(address(ALICE)),
            }
        );
    }

    fn noop_callbacks() -> WalkthroughCallbacks {
        WalkthroughCallbacks {
            on_step: Box::new(|_: StepView| {}),
            on_close: Box::new(|| {}),
            on_connect: Box::new(|| {}),
            on_demo: Box::new(|| {}),
        }
    }

    async fn settle(hub: &KeyboardHub) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while hub.listener_count() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn escape_unmounts_and_detaches_listener() {
        let hub = KeyboardHub::default();
        let walkthrough = Walkthrough::open(
            WALKTHROUGH_STEPS,
            Arc::new(MemoryStore::default()),
            Arc::new(RecordingTelemetry::default()),
            noop_callbacks(),
        );
        let mounted = MountedWalkthrough::mount(walkthrough, hub.listen());
        assert_eq!(hub.listener_count(), 1);

        hub.press(Key::Escape);
        settle(&hub).await;

        assert!(!mounted.is_mounted());
        assert!(!mounted.send(WalkthroughCommand::Next));
    }

    #[tokio::test]
    async fn dropping_handle_detaches_listener() {
        let hub = KeyboardHub::default();
        let walkthrough = Walkthrough::open(
            WALKTHROUGH_STEPS,
            Arc::new(MemoryStore::default()),
            Arc::new(RecordingTelemetry::default()),
            noop_callbacks(),
        );
        let mounted = MountedWalkthrough::mount(walkthrough, hub.listen());

        drop(mounted);
        settle(&hub).await;

        assert_eq!(hub.press(Key::ArrowRight), 0);
    }

    #[tokio::test]
    async fn finish_command_completes() {
        let hub = KeyboardHub::default();
        let store = Arc::new(MemoryStore::default());
        let walkthrough = Walkthrough::open(
            WALKTHROUGH_STEPS,
            Arc::clone(&store) as Arc<dyn KeyValueStore>,
            Arc::new(RecordingTelemetry::default()),
            noop_callbacks(),
        );
        let mounted = MountedWalkthrough::mount(walkthrough, hub.listen());

        assert!(mounted.send(WalkthroughCommand::Finish));
        settle(&hub).await;

        assert!(OnboardingProgress::load(store.as_ref()).completed);
    }
}
