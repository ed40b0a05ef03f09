use std::{fmt, sync::Arc};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{
    keyboard::Key,
    steps::{content, OnboardingStep, StepAction},
};
use crate::{
    storage::{KeyValueStore, ONBOARDING_COMPLETED_KEY},
    telemetry::Telemetry,
};

type Callback = Box<dyn Fn() + Send + Sync>;

/// Hooks into the host, mirroring the modal's `onClose` / `onConnect` / `onDemo` props.
pub(crate) struct WalkthroughCallbacks {
    pub(crate) on_step: Box<dyn Fn(StepView) + Send + Sync>,
    pub(crate) on_close: Callback,
    pub(crate) on_connect: Callback,
    pub(crate) on_demo: Callback,
}

impl fmt::Debug for WalkthroughCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkthroughCallbacks").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ActionButton {
    pub(crate) action: StepAction,
    pub(crate) label: &'static str,
}

impl From<StepAction> for ActionButton {
    fn from(action: StepAction) -> Self {
        Self {
            action,
            label: action.label(),
        }
    }
}

/// Everything the UI needs to render the current step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StepView {
    pub(crate) index: usize,
    pub(crate) total: usize,
    pub(crate) id: &'static str,
    pub(crate) title: &'static str,
    pub(crate) body: &'static [&'static str],
    pub(crate) show_buttons: bool,
    pub(crate) primary: Option<ActionButton>,
    pub(crate) secondary: Option<ActionButton>,
    pub(crate) is_last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ActionSlot {
    Primary,
    Secondary,
}

/// The onboarding modal's state machine. Closing is terminal; reopening
/// means building a new `Walkthrough`, which starts again at step 0.
#[derive(Debug)]
pub(crate) struct Walkthrough {
    steps: &'static [OnboardingStep],
    index: usize,
    open: bool,
    store: Arc<dyn KeyValueStore>,
    telemetry: Arc<dyn Telemetry>,
    callbacks: WalkthroughCallbacks,
}

impl Walkthrough {
    pub(crate) fn open(
        steps: &'static [OnboardingStep],
        store: Arc<dyn KeyValueStore>,
        telemetry: Arc<dyn Telemetry>,
        callbacks: WalkthroughCallbacks,
    ) -> Self {
        let walkthrough = Self {
            steps,
            index: 0,
            open: !steps.is_empty(),
            store,
            telemetry,
            callbacks,
        };

        if walkthrough.open {
            walkthrough.track("walkthrough_started", json!({}));
            walkthrough.step_changed();
        }

        walkthrough
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn current(&self) -> Option<&OnboardingStep> {
        self.steps.get(self.index).filter(|_| self.open)
    }

    pub(crate) fn view(&self) -> Option<StepView> {
        let step = self.current()?;
        let actions = step.actions.unwrap_or_default();

        Some(StepView {
            index: self.index,
            total: self.steps.len(),
            id: step.id,
            title: step.title,
            body: content(step.content_key),
            show_buttons: step.show_buttons,
            primary: actions.primary.map(ActionButton::from),
            secondary: actions.secondary.map(ActionButton::from),
            is_last: self.is_last(),
        })
    }

    fn is_last(&self) -> bool {
        self.index + 1 == self.steps.len()
    }

    pub(crate) fn next(&mut self) {
        if !self.open {
            return;
        }

        if self.is_last() {
            self.finish();
        } else {
            self.index += 1;
            self.step_changed();
        }
    }

    pub(crate) fn prev(&mut self) {
        if !self.open || self.index == 0 {
            return;
        }

        self.index -= 1;
        self.step_changed();
    }

    /// Marks onboarding as completed and closes.
    pub(crate) fn finish(&mut self) {
        if !self.open {
            return;
        }

        self.mark_completed();
        self.track("walkthrough_completed", json!({}));
        self.close();
    }

    pub(crate) fn close(&mut self) {
        if !self.open {
            return;
        }

        self.open = false;
        debug!(step = self.index, "Walkthrough closed");
        (self.callbacks.on_close)();
    }

    pub(crate) fn select_action(&mut self, slot: ActionSlot) {
        let Some(actions) = self.current().and_then(|step| step.actions) else {
            return;
        };
        let action = match slot {
            ActionSlot::Primary => actions.primary,
            ActionSlot::Secondary => actions.secondary,
        };

        match action {
            Some(StepAction::Connect) => {
                self.track("walkthrough_connect_clicked", json!({}));
                self.open = false;
                (self.callbacks.on_connect)();
            }
            Some(StepAction::Demo) => {
                self.track("walkthrough_demo_clicked", json!({}));
                self.mark_completed();
                self.open = false;
                (self.callbacks.on_demo)();
            }
            None => {}
        }
    }

    pub(crate) fn handle_key(&mut self, key: Key) {
        match key {
            Key::ArrowRight | Key::Enter => self.next(),
            Key::ArrowLeft => self.prev(),
            Key::Escape => self.close(),
            Key::Other => {}
        }
    }

    fn step_changed(&self) {
        if let Some(step) = self.current() {
            self.track(
                "walkthrough_step_viewed",
                json!({ "stepId": step.id, "stepIndex": self.index }),
            );
        }
        if let Some(view) = self.view() {
            (self.callbacks.on_step)(view);
        }
    }

    fn mark_completed(&self) {
        if let Err(err) = self.store.set(ONBOARDING_COMPLETED_KEY, "true") {
            warn!(%err, "Failed to persist onboarding completion");
        }
    }

    fn track(&self, event: &str, data: Value) {
        if let Err(err) = self.telemetry.track(event, data) {
            debug!(%err, event, "Dropped analytics event");
        }
    }
}
