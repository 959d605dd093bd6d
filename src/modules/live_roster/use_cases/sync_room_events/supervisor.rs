// Realtime connection lifecycle for one room.
//
// Purpose
// - Keep the room joined: connect, send `join_room`, pump frames into the router,
//   and reconnect with capped exponential backoff after any drop.
//
// Responsibilities
// - Re-send `join_room` on every successful connect.
// - Count a join that drops before `stable_after` as a failed attempt.
// - Tell the user once per outage after too many consecutive failures, and again
//   once a connection has stayed up.
// - On shutdown (also mid-connect, mid-join or mid-backoff) send `leave_room` when
//   the join went out, close any open connection and stop.

use crate::modules::live_roster::use_cases::sync_room_events::backoff::ReconnectPolicy;
use crate::modules::live_roster::use_cases::sync_room_events::router::RoomEventRouter;
use crate::shared::core::primitives::RoomId;
use crate::shared::infrastructure::notifications::{Notification, Notifier};
use crate::shared::infrastructure::realtime::{
    ControlMessage, RealtimeConnection, RealtimeTransport, TransportError,
};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const OUTAGE_MESSAGE: &str = "Live updates are unavailable, still trying to reconnect";
pub const RESTORED_MESSAGE: &str = "Live updates are back";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Joined,
    Closed,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Joined => "joined",
            ConnectionState::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStatus {
    pub state: ConnectionState,
    /// Successful joins so far; anything above one means the room was rejoined.
    pub joins: u64,
    /// Consecutive failed attempts. Cleared once a joined connection turns stable.
    pub failed_attempts: u32,
}

enum Connect {
    Joined(Box<dyn RealtimeConnection>),
    Failed(TransportError),
    Shutdown,
}

enum PumpExit {
    Shutdown,
    Dropped { stable: bool },
}

#[derive(Default)]
struct Outage {
    failures: u32,
    surfaced: bool,
}

pub struct RoomSyncSupervisor {
    room_id: RoomId,
    transport: Arc<dyn RealtimeTransport>,
    router: RoomEventRouter,
    policy: ReconnectPolicy,
    notifier: Arc<dyn Notifier>,
    status: watch::Sender<SyncStatus>,
}

impl RoomSyncSupervisor {
    pub fn new(
        room_id: RoomId,
        transport: Arc<dyn RealtimeTransport>,
        router: RoomEventRouter,
        policy: ReconnectPolicy,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            room_id,
            transport,
            router,
            policy,
            notifier,
            status,
        }
    }

    pub fn spawn(self) -> SyncHandle {
        let (shutdown, signal) = oneshot::channel();
        let status = self.status.subscribe();
        let task = tokio::spawn(self.run(signal));
        SyncHandle {
            shutdown: Some(shutdown),
            task: Some(task),
            status,
        }
    }

    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut outage = Outage::default();

        loop {
            self.status
                .send_modify(|status| status.state = ConnectionState::Connecting);

            match self.connect_and_join(&mut shutdown).await {
                Connect::Shutdown => break,
                Connect::Joined(mut connection) => {
                    self.status.send_modify(|status| {
                        status.state = ConnectionState::Joined;
                        status.joins += 1;
                    });
                    info!(room_id = %self.room_id, "joined room");

                    match self
                        .pump(connection.as_mut(), &mut shutdown, &mut outage)
                        .await
                    {
                        PumpExit::Shutdown => {
                            self.leave(connection).await;
                            break;
                        }
                        PumpExit::Dropped { stable: true } => {
                            warn!(room_id = %self.room_id, "realtime connection dropped");
                            self.status
                                .send_modify(|status| status.state = ConnectionState::Disconnected);
                        }
                        PumpExit::Dropped { stable: false } => {
                            self.record_failure(&mut outage, "dropped right after joining");
                        }
                    }
                }
                Connect::Failed(error) => self.record_failure(&mut outage, error),
            }

            let delay = self.policy.delay_for(outage.failures.saturating_sub(1));
            debug!(
                room_id = %self.room_id,
                delay_ms = delay.as_millis() as u64,
                "reconnecting after delay"
            );
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.status
            .send_modify(|status| status.state = ConnectionState::Closed);
        info!(room_id = %self.room_id, "room sync stopped");
    }

    /// Only the connect itself races shutdown. Once a connection exists it is either
    /// returned joined or torn down here.
    async fn connect_and_join(&self, shutdown: &mut oneshot::Receiver<()>) -> Connect {
        let connected = tokio::select! {
            biased;
            _ = &mut *shutdown => return Connect::Shutdown,
            result = self.transport.connect() => result,
        };
        let mut connection = match connected {
            Ok(connection) => connection,
            Err(error) => return Connect::Failed(error),
        };
        if let Err(error) = connection.send(&ControlMessage::join(&self.room_id)).await {
            let _ = connection.close().await;
            return Connect::Failed(error);
        }
        if !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)) {
            debug!(room_id = %self.room_id, "shutdown requested while joining");
            self.leave(connection).await;
            return Connect::Shutdown;
        }
        Connect::Joined(connection)
    }

    async fn pump(
        &self,
        connection: &mut dyn RealtimeConnection,
        shutdown: &mut oneshot::Receiver<()>,
        outage: &mut Outage,
    ) -> PumpExit {
        let settle = tokio::time::sleep(self.policy.stable_after);
        tokio::pin!(settle);
        let mut stable = false;
        loop {
            tokio::select! {
                biased;
                _ = &mut *shutdown => return PumpExit::Shutdown,
                _ = &mut settle, if !stable => {
                    stable = true;
                    self.settle(outage);
                }
                frame = connection.next_frame() => match frame {
                    Some(Ok(text)) => {
                        self.router.route_frame(&text).await;
                    }
                    Some(Err(error)) => {
                        warn!(room_id = %self.room_id, %error, "realtime receive failed");
                        return PumpExit::Dropped { stable };
                    }
                    None => return PumpExit::Dropped { stable },
                },
            }
        }
    }

    fn record_failure(&self, outage: &mut Outage, reason: impl Display) {
        outage.failures += 1;
        let failures = outage.failures;
        self.status.send_modify(|status| {
            status.state = ConnectionState::Disconnected;
            status.failed_attempts = failures;
        });
        warn!(room_id = %self.room_id, attempt = failures, %reason, "realtime attempt failed");
        if failures >= self.policy.surface_after_attempts && !outage.surfaced {
            outage.surfaced = true;
            self.notifier.notify(Notification::error(OUTAGE_MESSAGE));
        }
    }

    fn settle(&self, outage: &mut Outage) {
        if outage.surfaced {
            self.notifier.notify(Notification::info(RESTORED_MESSAGE));
        }
        if outage.failures > 0 {
            info!(
                room_id = %self.room_id,
                after = outage.failures,
                "realtime connection recovered"
            );
        }
        *outage = Outage::default();
        self.status
            .send_if_modified(|status| std::mem::take(&mut status.failed_attempts) > 0);
    }

    async fn leave(&self, mut connection: Box<dyn RealtimeConnection>) {
        if let Err(error) = connection.send(&ControlMessage::leave(&self.room_id)).await {
            debug!(room_id = %self.room_id, %error, "leave_room not delivered");
        }
        if let Err(error) = connection.close().await {
            debug!(room_id = %self.room_id, %error, "close failed");
        }
    }
}

/// Owner side of a running supervisor.
pub struct SyncHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    status: watch::Receiver<SyncStatus>,
}

impl SyncHandle {
    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    /// Stops the supervisor and waits for its teardown to finish.
    pub async fn shutdown(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                warn!(%error, "room sync task ended abnormally");
            }
        }
    }
}
