// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Post-commit notification fan-out.
//!
//! Handlers hand committed notifications to the dispatcher, which
//! broadcasts them to every subscribed sink. Delivery is fire-and-forget:
//! a slow or absent sink never blocks or fails a request.
//!
//! The only sink wired up today logs each notification. An SMS or inbox
//! sink subscribes the same way.

use agri_connect::Notification;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Maximum number of notifications to buffer in the broadcast channel.
/// If a sink cannot keep up, older notifications are dropped for it.
const EVENT_BUFFER_SIZE: usize = 100;

/// Broadcaster for committed notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: broadcast::Sender<Notification>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher with no sinks.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Hands notifications to every sink.
    ///
    /// With no sink subscribed the notifications are dropped.
    pub fn dispatch(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            let request_id: i64 = notification.request_id;
            match self.tx.send(notification) {
                Ok(receivers) => debug!(request_id, receivers, "Dispatched notification"),
                Err(_) => debug!(request_id, "No sinks for notification"),
            }
        }
    }

    /// Subscribes a sink to future notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Starts the logging sink.
    ///
    /// The task ends once every dispatcher handle has been dropped.
    #[must_use]
    pub fn spawn_log_sink(&self) -> JoinHandle<()> {
        let mut rx: broadcast::Receiver<Notification> = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(notification) => info!(
                        user_id = notification.user_id,
                        kind = notification.kind.as_str(),
                        request_id = notification.request_id,
                        message = %notification.message,
                        "Delivering notification"
                    ),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Notification sink fell behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
