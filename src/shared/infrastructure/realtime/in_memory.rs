use crate::shared::infrastructure::realtime::{
    ControlMessage, RealtimeConnection, RealtimeTransport, TransportError,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

#[derive(Default)]
struct HubState {
    connections: Vec<(u64, mpsc::UnboundedSender<String>)>,
    next_connection: u64,
    sent: Vec<ControlMessage>,
    connect_attempts: usize,
    failing_connects: usize,
    connect_delay: Option<Duration>,
    send_delay: Option<Duration>,
    closed: usize,
}

/// A broadcast hub standing in for the realtime server.
///
/// Every open connection receives every published frame, whatever room it joined,
/// so room filtering stays the client's job.
#[derive(Clone, Default)]
pub struct InMemoryRealtime {
    hub: Arc<Mutex<HubState>>,
}

impl InMemoryRealtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn publish(&self, frame: impl Into<String>) {
        let frame = frame.into();
        let mut hub = self.hub.lock().await;
        hub.connections
            .retain(|(_, sender)| sender.send(frame.clone()).is_ok());
    }

    /// Drops every open connection as if the server went away.
    pub async fn drop_connections(&self) {
        self.hub.lock().await.connections.clear();
    }

    pub async fn fail_next_connects(&self, count: usize) {
        self.hub.lock().await.failing_connects = count;
    }

    /// Each connect waits this long before the hub answers it.
    pub async fn delay_connects(&self, delay: Duration) {
        self.hub.lock().await.connect_delay = Some(delay);
    }

    /// Each control message waits this long before the hub records it.
    pub async fn delay_sends(&self, delay: Duration) {
        self.hub.lock().await.send_delay = Some(delay);
    }

    pub async fn sent(&self) -> Vec<ControlMessage> {
        self.hub.lock().await.sent.clone()
    }

    pub async fn connect_attempts(&self) -> usize {
        self.hub.lock().await.connect_attempts
    }

    pub async fn open_connections(&self) -> usize {
        self.hub.lock().await.connections.len()
    }

    pub async fn closed(&self) -> usize {
        self.hub.lock().await.closed
    }
}

#[async_trait]
impl RealtimeTransport for InMemoryRealtime {
    async fn connect(&self) -> Result<Box<dyn RealtimeConnection>, TransportError> {
        let delay = {
            let mut hub = self.hub.lock().await;
            hub.connect_attempts += 1;
            hub.connect_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut hub = self.hub.lock().await;
        if hub.failing_connects > 0 {
            hub.failing_connects -= 1;
            return Err(TransportError::Connect("Realtime hub offline".into()));
        }
        let (sender, frames) = mpsc::unbounded_channel();
        let id = hub.next_connection;
        hub.next_connection += 1;
        hub.connections.push((id, sender));
        Ok(Box::new(InMemoryConnection {
            id,
            frames,
            hub: self.hub.clone(),
        }))
    }
}

struct InMemoryConnection {
    id: u64,
    frames: mpsc::UnboundedReceiver<String>,
    hub: Arc<Mutex<HubState>>,
}

#[async_trait]
impl RealtimeConnection for InMemoryConnection {
    async fn send(&mut self, message: &ControlMessage) -> Result<(), TransportError> {
        let delay = self.hub.lock().await.send_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut hub = self.hub.lock().await;
        if !hub.connections.iter().any(|(id, _)| *id == self.id) {
            return Err(TransportError::Send("connection closed".into()));
        }
        hub.sent.push(message.clone());
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        self.frames.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let mut hub = self.hub.lock().await;
        hub.connections.retain(|(id, _)| *id != self.id);
        hub.closed += 1;
        self.frames.close();
        Ok(())
    }
}
