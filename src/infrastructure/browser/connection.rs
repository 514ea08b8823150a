//! WebSocket connection to a browser's DevTools endpoint

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::BrowserError;
use super::protocol::{BrowserVersion, CdpRequest, CdpResponse};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, BrowserError>>>>>;

/// Resolve the browser WebSocket URL from a DevTools HTTP endpoint
pub async fn discover_ws_url(endpoint: &str, timeout: Duration) -> Result<String, BrowserError> {
    let version_url = format!("{}/json/version", endpoint.trim_end_matches('/'));
    debug!("Fetching browser version from {}", version_url);

    let unavailable = |e: reqwest::Error| {
        if e.is_timeout() {
            BrowserError::Timeout(format!("{} did not answer within {:?}", version_url, timeout))
        } else {
            BrowserError::Unavailable(format!("{}: {}", endpoint, e))
        }
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(unavailable)?;

    let version: BrowserVersion = client
        .get(&version_url)
        .send()
        .await
        .map_err(unavailable)?
        .json()
        .await
        .map_err(unavailable)?;

    debug!("Found browser: {}", version.browser);

    Ok(version.web_socket_debugger_url)
}

/// Browser-level CDP connection.
///
/// Commands are matched to replies by id; events are dropped since page
/// state is polled rather than observed.
pub struct CdpConnection {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: PendingMap,
    call_timeout: Duration,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpConnection {
    pub async fn connect(ws_url: &str, call_timeout: Duration) -> Result<Self, BrowserError> {
        let (ws_stream, _) = tokio::time::timeout(call_timeout, tokio_tungstenite::connect_async(ws_url))
            .await
            .map_err(|_| BrowserError::Timeout(format!("WebSocket handshake with {}", ws_url)))??;
        let (ws_sink, ws_source) = ws_stream.split();

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let recv_task = tokio::spawn(Self::receive_loop(ws_source, pending.clone()));

        debug!("CDP connection open to {}", ws_url);

        Ok(Self {
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            request_id: AtomicU64::new(1),
            pending,
            call_timeout,
            recv_task,
        })
    }

    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text.as_str());

                    let response = match serde_json::from_str::<CdpResponse>(text.as_str()) {
                        Ok(response) => response,
                        Err(e) => {
                            warn!("Failed to parse CDP message: {}", e);
                            continue;
                        }
                    };

                    let Some(id) = response.id else {
                        if let Some(method) = response.method.as_deref() {
                            trace!("CDP event {} ignored", method);
                        }
                        continue;
                    };

                    if let Some(tx) = pending.lock().remove(&id) {
                        let result = match response.error {
                            Some(error) => Err(BrowserError::Protocol {
                                code: error.code,
                                message: error.message,
                            }),
                            None => Ok(response.result.unwrap_or(Value::Null)),
                        };
                        let _ = tx.send(result);
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("CDP WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("CDP WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Waiters see SessionClosed once their senders drop
        pending.lock().clear();
    }

    /// Send a command, optionally scoped to an attached target session
    pub async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, BrowserError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let json = serde_json::to_string(&CdpRequest {
            id,
            method,
            params,
            session_id,
        })?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let sending = async { self.ws_tx.lock().await.send(Message::Text(json.into())).await };
        let sent = match tokio::time::timeout(self.call_timeout, sending).await {
            Ok(sent) => sent.map_err(BrowserError::from),
            Err(_) => Err(BrowserError::Timeout(format!("sending {}", method))),
        };
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(self.call_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BrowserError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(BrowserError::Timeout(format!("{} timed out", method)))
            }
        }
    }

    pub async fn close(&self) {
        let closing = async { self.ws_tx.lock().await.close().await };

        match tokio::time::timeout(self.call_timeout, closing).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Closing CDP WebSocket: {}", e),
            Err(_) => debug!("Closing CDP WebSocket timed out"),
        }
    }
}

impl Drop for CdpConnection {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

/// Commands scoped to one attached page target
pub struct PageSession<'a> {
    connection: &'a CdpConnection,
    session_id: String,
}

impl<'a> PageSession<'a> {
    pub fn new(connection: &'a CdpConnection, session_id: String) -> Self {
        Self {
            connection,
            session_id,
        }
    }

    pub async fn call(&self, method: &str, params: Value) -> Result<Value, BrowserError> {
        self.connection
            .call(method, Some(params), Some(&self.session_id))
            .await
    }

    /// Evaluate an expression and return its JSON value
    pub async fn evaluate(&self, expression: &str) -> Result<Value, BrowserError> {
        let result = self
            .call(
                "Runtime.evaluate",
                serde_json::json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            return Err(BrowserError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }
}
