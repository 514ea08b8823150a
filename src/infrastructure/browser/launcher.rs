//! Local headless Chromium process

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::error::BrowserError;
use crate::config::BrowserConfig;

const DEVTOOLS_BANNER: &str = "DevTools listening on ";
const STARTUP_TIMEOUT: Duration = Duration::from_secs(15);

/// Command line for a throwaway browser with an OS-assigned debugging port
pub fn launch_args(config: &BrowserConfig, profile_dir: &Path) -> Vec<String> {
    let mut args = Vec::new();

    if config.headless {
        args.push("--headless=new".to_string());
    }

    args.extend(
        [
            "--no-sandbox",
            "--disable-setuid-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--no-first-run",
            "--no-default-browser-check",
            "--remote-debugging-port=0",
        ]
        .map(String::from),
    );
    args.push(format!("--user-data-dir={}", profile_dir.display()));

    if let Some(proxy) = config.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        args.push(format!("--proxy-server={}", proxy));
    }

    args.push("about:blank".to_string());
    args
}

/// Extract the WebSocket URL from the startup banner line
pub fn parse_devtools_line(line: &str) -> Option<&str> {
    let url = line.trim().strip_prefix(DEVTOOLS_BANNER)?.trim();
    url.starts_with("ws://").then_some(url)
}

/// A running browser.
///
/// Dropping it, including when a fetch is cancelled midway, kills the
/// child and removes the profile directory.
pub struct BrowserProcess {
    child: Child,
    profile_dir: PathBuf,
    ws_url: String,
}

impl BrowserProcess {
    pub async fn launch(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let profile_dir =
            std::env::temp_dir().join(format!("mangatek-browser-{}", uuid::Uuid::new_v4()));

        let mut child = Command::new(&config.executable)
            .args(launch_args(config, &profile_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BrowserError::Launch(format!("{}: {}", config.executable, e)))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| BrowserError::Launch("stderr not captured".to_string()))?;
        let mut lines = BufReader::new(stderr).lines();

        let banner = tokio::time::timeout(STARTUP_TIMEOUT, async {
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(url) = parse_devtools_line(&line) {
                    return Some(url.to_string());
                }
                debug!(target: "browser", "{}", line);
            }
            None
        })
        .await;

        let ws_url = match banner {
            Ok(Some(url)) => url,
            Ok(None) => {
                let _ = tokio::fs::remove_dir_all(&profile_dir).await;
                return Err(BrowserError::Launch(
                    "browser exited before announcing its DevTools endpoint".to_string(),
                ));
            }
            Err(_) => {
                let _ = child.kill().await;
                let _ = tokio::fs::remove_dir_all(&profile_dir).await;
                return Err(BrowserError::Timeout("browser startup".to_string()));
            }
        };

        // Keep draining stderr so the browser never blocks on a full pipe
        tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target: "browser", "{}", line);
            }
        });

        info!("Launched {} ({})", config.executable, ws_url);

        Ok(Self {
            child,
            profile_dir,
            ws_url,
        })
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Stop the browser and wait for it to exit; the profile goes on drop
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("Failed to stop browser: {}", e);
        }
    }
}

impl Drop for BrowserProcess {
    fn drop(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!("Browser already stopped: {}", e);
        }
        if let Err(e) = std::fs::remove_dir_all(&self.profile_dir) {
            debug!("Failed to remove {}: {}", self.profile_dir.display(), e);
        }
    }
}
