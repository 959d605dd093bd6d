use crate::shared::infrastructure::auth::AccessTokenProvider;
use crate::shared::infrastructure::realtime::{
    ControlMessage, RealtimeConnection, RealtimeTransport, TransportError,
};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header::AUTHORIZATION};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WebSocketTransport {
    url: Url,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl WebSocketTransport {
    pub fn new(url: &str, tokens: Arc<dyn AccessTokenProvider>) -> Result<Self, TransportError> {
        let url = Url::parse(url).map_err(|e| TransportError::Connect(format!("{url}: {e}")))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(TransportError::Connect(format!(
                "unsupported realtime scheme: {}",
                url.scheme()
            )));
        }
        Ok(Self { url, tokens })
    }
}

#[async_trait]
impl RealtimeTransport for WebSocketTransport {
    async fn connect(&self) -> Result<Box<dyn RealtimeConnection>, TransportError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        if let Some(token) = self.tokens.access_token().await {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| TransportError::Connect(e.to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        debug!(url = %self.url, "realtime connection open");
        Ok(Box::new(WebSocketConnection { stream }))
    }
}

struct WebSocketConnection {
    stream: WsStream,
}

#[async_trait]
impl RealtimeConnection for WebSocketConnection {
    async fn send(&mut self, message: &ControlMessage) -> Result<(), TransportError> {
        let payload = message.encode()?;
        self.stream
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => debug!("skipping non utf-8 binary frame"),
                },
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(TransportError::Receive(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }
}
