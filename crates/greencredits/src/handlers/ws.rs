use std::sync::Arc;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use socketioxide::{
    extract::{Data as SocketData, SocketRef, State as SocketState},
    socket::Sid as SocketSid,
};
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};
use tracing::debug;

use crate::{
    app::{App, AppEvent},
    error::ConnectError,
    onboarding::{keyboard::Key, WalkthroughCommand},
};

#[derive(Debug, Deserialize)]
pub(crate) struct KeyData {
    pub(crate) key: Key,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommandData {
    pub(crate) command: WalkthroughCommand,
}

#[derive(Debug, Serialize)]
pub(crate) struct AlertData<'a> {
    pub(crate) id: SocketSid,
    pub(crate) message: &'a str,
}

fn emit_event(socket: &SocketRef, event: &AppEvent) {
    let sent = match event {
        AppEvent::Connection(snapshot) => socket.emit("connection", snapshot),
        AppEvent::WalkthroughStep(view) => socket.emit("walkthrough_step", view),
        AppEvent::WalkthroughClosed => socket.emit("walkthrough_closed", &()),
        AppEvent::Alert(message) => {
            let data = AlertData {
                id: socket.id,
                message,
            };
            socket.emit("alert", &data)
        }
    };

    if let Err(err) = sent {
        debug!(?socket.id, ?err, "Failed to emit event");
    }
}

/// Work started on behalf of one socket, cancelled when that socket goes away.
#[derive(Debug)]
pub(crate) struct SocketSession {
    app: Arc<App>,
    disconnect: watch::Sender<()>,
    // Cloned per task; the clones observe a disconnect even if it came first
    cancel: watch::Receiver<()>,
}

impl SocketSession {
    pub(crate) fn new(app: Arc<App>) -> Self {
        let (disconnect, cancel) = watch::channel(());

        Self {
            app,
            disconnect,
            cancel,
        }
    }

    pub(crate) fn disconnect(&self) {
        self.disconnect.send_replace(());
    }

    /// Connects the wallet unless the socket disconnects first.
    pub(crate) async fn connect_wallet(&self) -> Result<Address, ConnectError> {
        self.app.connect_wallet(self.cancel.clone()).await
    }

    /// Streams app events into `emit` until the socket disconnects.
    pub(crate) fn forward_events(
        &self,
        mut emit: impl FnMut(&AppEvent) + Send + 'static,
    ) -> JoinHandle<()> {
        let mut events = self.app.subscribe();
        let mut cancel = self.cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased; // Check for task cancellation first

                    _ = cancel.changed() => {
                        debug!("Event forwarding cancelled");

                        break;
                    },
                    event = events.recv() => match event {
                        Ok(event) => emit(&event),
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "Event forwarding lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        })
    }
}

pub(crate) async fn ws(socket: SocketRef, state: SocketState<Arc<App>>) {
    debug!(ns = socket.ns(), ?socket.id, "Socket.IO connected");

    let app = Arc::clone(&state);
    let session = Arc::new(SocketSession::new(Arc::clone(&app)));

    // Send disconnect event when the socket goes away
    socket.on_disconnect({
        let session = Arc::clone(&session);
        move || {
            debug!("Socket disconnected");

            session.disconnect();
        }
    });

    // Bring the client up to date before streaming changes
    emit_event(&socket, &AppEvent::Connection(app.snapshot()));
    if let Some(view) = app.current_step() {
        emit_event(&socket, &AppEvent::WalkthroughStep(view));
    }

    let forward = socket.clone();
    session.forward_events(move |event| emit_event(&forward, event));

    socket.on("connect_wallet", {
        let session = Arc::clone(&session);
        move |socket: SocketRef| {
            let session = Arc::clone(&session);
            async move {
                debug!(?socket.id, "Connect requested");

                // Failures reach the client as an `alert` event
                session.connect_wallet().await.ok();
            }
        }
    });

    socket.on("demo", {
        let app = Arc::clone(&app);
        move |socket: SocketRef| {
            let app = Arc::clone(&app);
            async move {
                debug!(?socket.id, "Demo mode requested");

                app.enable_demo()
            }
        }
    });

    socket.on("key", {
        let app = Arc::clone(&app);
        move |SocketData::<KeyData>(data)| {
            let app = Arc::clone(&app);
            async move { app.press_key(data.key) }
        }
    });

    socket.on("walkthrough", {
        let app = Arc::clone(&app);
        move |SocketData::<CommandData>(data)| {
            let app = Arc::clone(&app);
            async move { app.walkthrough_command(data.command) }
        }
    });

    socket.on("walkthrough_open", {
        let app = Arc::clone(&app);
        move |socket: SocketRef| {
            let app = Arc::clone(&app);
            async move {
                debug!(?socket.id, "Walkthrough reopened");

                app.open_walkthrough()
            }
        }
    });
}
