//! Scripted DevTools endpoints and a stand-in browser executable

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

use super::error::BrowserError;
use super::launcher::BrowserProcess;
use crate::config::BrowserConfig;

/// Accepts TCP connections and never writes a byte
pub async fn silent_listener() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    addr
}

/// What the fake endpoint answers to one command
pub enum Reply {
    Result(Value),
    Error(i64, &'static str),
    /// Drop the socket without answering
    Hangup,
}

type Script = Arc<dyn Fn(&str, &Value) -> Reply + Send + Sync>;

/// WebSocket endpoint that answers CDP commands from a script and records them
pub struct FakeDevTools {
    pub ws_url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeDevTools {
    pub async fn start<F>(script: F) -> Self
    where
        F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_url = format!("ws://{}/devtools/browser/fake", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let script: Script = Arc::new(script);

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, script.clone(), recorded.clone()));
            }
        });

        Self { ws_url, requests }
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r["method"].as_str().map(str::to_string))
            .collect()
    }

    pub fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r["method"] == method)
            .cloned()
            .collect()
    }

    pub fn evaluations_of(&self, expression: &str) -> usize {
        self.requests_for("Runtime.evaluate")
            .iter()
            .filter(|r| r["params"]["expression"] == expression)
            .count()
    }
}

async fn serve(stream: TcpStream, script: Script, requests: Arc<Mutex<Vec<Value>>>) {
    let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
        return;
    };

    while let Some(Ok(message)) = ws.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        let request: Value = serde_json::from_str(text.as_str()).unwrap();
        requests.lock().push(request.clone());

        let method = request["method"].as_str().unwrap_or_default();
        let reply = match script(method, &request["params"]) {
            Reply::Result(result) => json!({ "id": request["id"], "result": result }),
            Reply::Error(code, message) => {
                json!({ "id": request["id"], "error": { "code": code, "message": message } })
            }
            Reply::Hangup => return,
        };

        // An unrelated event ahead of every reply
        let event = json!({ "method": "Page.lifecycleEvent", "params": { "name": "load" } });
        if ws.send(Message::Text(event.to_string().into())).await.is_err() {
            return;
        }
        if ws.send(Message::Text(reply.to_string().into())).await.is_err() {
            return;
        }
    }
}

/// Answers the target commands of one page render
pub fn page_script(ready_state: &'static str, html: &'static str) -> impl Fn(&str, &Value) -> Reply {
    move |method: &str, params: &Value| match method {
        "Browser.getVersion" => Reply::Result(json!({ "product": "HeadlessChrome/120.0" })),
        "Target.createBrowserContext" => Reply::Result(json!({ "browserContextId": "CTX1" })),
        "Target.createTarget" => Reply::Result(json!({ "targetId": "T1" })),
        "Target.attachToTarget" => Reply::Result(json!({ "sessionId": "S1" })),
        "Page.navigate" => Reply::Result(json!({ "frameId": "F1" })),
        "Runtime.evaluate" => {
            let value = match params["expression"].as_str() {
                Some("document.readyState") => ready_state,
                _ => html,
            };
            Reply::Result(json!({ "result": { "type": "string", "value": value } }))
        }
        _ => Reply::Result(json!({})),
    }
}

#[cfg(unix)]
/// Shell script that behaves like a browser launch: it creates the profile
/// dir, records its path in `marker`, prints the DevTools banner and waits
pub fn fake_browser(dir: &Path, ws_url: &str) -> (PathBuf, PathBuf) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::create_dir_all(dir).unwrap();
    let executable = dir.join("fake-chromium");
    let marker = dir.join("profile-path");

    let script = format!(
        r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    --user-data-dir=*)
      profile="${{arg#--user-data-dir=}}"
      mkdir -p "$profile"
      printf '%s' "$profile" > "{marker}"
      ;;
  esac
done
echo "DevTools listening on {ws_url}" >&2
exec sleep 30
"#,
        marker = marker.display(),
        ws_url = ws_url,
    );

    std::fs::write(&executable, script).unwrap();
    std::fs::set_permissions(&executable, std::fs::Permissions::from_mode(0o755)).unwrap();

    (executable, marker)
}

#[cfg(unix)]
/// Launch, retrying while the freshly written script is still busy
pub async fn launch_fake(config: &BrowserConfig) -> BrowserProcess {
    for _ in 0..20 {
        match BrowserProcess::launch(config).await {
            Ok(process) => return process,
            Err(BrowserError::Launch(message)) if message.contains("busy") => {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Err(e) => panic!("fake browser did not start: {}", e),
        }
    }
    panic!("fake browser stayed busy");
}
