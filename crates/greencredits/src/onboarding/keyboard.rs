use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::debug;

/// Keys the walkthrough reacts to, named as in DOM `KeyboardEvent.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub(crate) enum Key {
    ArrowRight,
    ArrowLeft,
    Enter,
    Escape,
    #[serde(other)]
    Other,
}

/// Fans key presses out to whichever listeners are currently attached.
#[derive(Debug, Clone)]
pub(crate) struct KeyboardHub {
    tx: broadcast::Sender<Key>,
}

impl Default for KeyboardHub {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(32);

        Self { tx }
    }
}

impl KeyboardHub {
    /// Returns how many listeners received the key.
    pub(crate) fn press(&self, key: Key) -> usize {
        self.tx.send(key).unwrap_or(0)
    }

    /// Attaches a listener; it detaches when dropped.
    pub(crate) fn listen(&self) -> KeyListener {
        KeyListener {
            rx: self.tx.subscribe(),
        }
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[derive(Debug)]
pub(crate) struct KeyListener {
    rx: broadcast::Receiver<Key>,
}

impl KeyListener {
    pub(crate) async fn next(&mut self) -> Option<Key> {
        loop {
            match self.rx.recv().await {
                Ok(key) => return Some(key),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Keyboard listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
