use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::ProgressEvent;

/// Push-channel frames the backend addresses to one client.
#[derive(Debug, Deserialize)]
struct PushFrame {
    event: String,
    data: serde_json::Value,
}

const EVENT_SCAN_PROGRESS: &str = "scan_progress";
const EVENT_BUFFER: usize = 64;

/// Owns the push-channel connection and the session identity that the
/// backend uses to route progress events back to this client.
///
/// The session id is minted locally when the socket is opened, not fetched
/// in a round trip, so it is available synchronously once `open_session`
/// returns. Exactly one reader task forwards frames into the event queue for
/// the lifetime of a connection; reopening an already-live session is a
/// no-op, so successive scans never stack up duplicate handlers.
pub struct Correlator {
    ws_endpoint: Option<String>,
    link: Option<PushLink>,
}

struct PushLink {
    session_id: String,
    events: mpsc::Receiver<ProgressEvent>,
    alive: Arc<AtomicBool>,
}

impl Correlator {
    /// Correlator that will connect to `ws_endpoint` on first use.
    pub fn new(ws_endpoint: impl Into<String>) -> Self {
        Self {
            ws_endpoint: Some(ws_endpoint.into()),
            link: None,
        }
    }

    /// Correlator with no push channel at all. Scans run in degraded mode
    /// with a static indicator.
    pub fn detached() -> Self {
        Self {
            ws_endpoint: None,
            link: None,
        }
    }

    /// Correlator fed by an in-process channel instead of a socket. The
    /// queue behaves exactly like a connected link; used by tests and by
    /// embedders that bring their own transport.
    pub fn from_channel(
        session_id: impl Into<String>,
        events: mpsc::Receiver<ProgressEvent>,
    ) -> Self {
        Self {
            ws_endpoint: None,
            link: Some(PushLink {
                session_id: session_id.into(),
                events,
                alive: Arc::new(AtomicBool::new(true)),
            }),
        }
    }

    /// Ensure a live push session and return its identity.
    ///
    /// Reuses the existing connection when it is still up, reconnects under
    /// a fresh identity when the reader has died, and returns `None` when no
    /// channel can be established — the scan must still proceed without live
    /// progress in that case.
    pub async fn open_session(&mut self) -> Option<String> {
        if let Some(link) = &self.link {
            if link.alive.load(Ordering::Relaxed) {
                return Some(link.session_id.clone());
            }
            debug!("push channel reader gone, reconnecting");
            self.link = None;
        }

        let endpoint = self.ws_endpoint.as_deref()?;
        let session_id = Uuid::new_v4().to_string();
        let request_url = format!("{endpoint}?sid={session_id}");

        let (stream, _resp) = match connect_async(request_url).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "push channel unavailable, scanning without live progress");
                return None;
            }
        };

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let alive = Arc::new(AtomicBool::new(true));
        let alive_reader = alive.clone();

        tokio::spawn(async move {
            let (_write, mut read) = stream.split();
            while let Some(msg) = read.next().await {
                let text = match msg {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => continue,
                };
                let frame: PushFrame = match serde_json::from_str(&text) {
                    Ok(frame) => frame,
                    Err(e) => {
                        debug!(error = %e, "dropping unparseable push frame");
                        continue;
                    }
                };
                if frame.event != EVENT_SCAN_PROGRESS {
                    debug!(event = %frame.event, "ignoring unrelated push event");
                    continue;
                }
                match serde_json::from_value::<ProgressEvent>(frame.data) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => debug!(error = %e, "dropping malformed progress payload"),
                }
            }
            alive_reader.store(false, Ordering::Relaxed);
        });

        debug!(%session_id, "push session established");
        self.link = Some(PushLink {
            session_id: session_id.clone(),
            events: rx,
            alive,
        });
        Some(session_id)
    }

    /// Identity of the current session, if one is open.
    pub fn session_id(&self) -> Option<&str> {
        self.link.as_ref().map(|l| l.session_id.as_str())
    }

    /// Mutable access to the event queue for the session's select loop.
    pub fn events_mut(&mut self) -> Option<&mut mpsc::Receiver<ProgressEvent>> {
        self.link.as_mut().map(|l| &mut l.events)
    }

    /// Throw away events queued by a previous scan so a stale burst cannot
    /// bleed into the next one.
    pub fn drain_stale(&mut self) {
        if let Some(link) = &mut self.link {
            while link.events.try_recv().is_ok() {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detached_correlator_yields_no_session() {
        let mut c = Correlator::detached();
        assert_eq!(c.open_session().await, None);
        assert!(c.session_id().is_none());
        assert!(c.events_mut().is_none());
    }

    #[tokio::test]
    async fn channel_correlator_delivers_events() {
        let (tx, rx) = mpsc::channel(8);
        let mut c = Correlator::from_channel("sid-1", rx);
        assert_eq!(c.session_id(), Some("sid-1"));

        tx.send(ProgressEvent {
            step: "Validating URL".into(),
            detail: "parsing".into(),
        })
        .await
        .unwrap();

        let ev = c.events_mut().unwrap().recv().await.unwrap();
        assert_eq!(ev.step, "Validating URL");
    }

    #[tokio::test]
    async fn drain_stale_discards_queued_events() {
        let (tx, rx) = mpsc::channel(8);
        let mut c = Correlator::from_channel("sid-2", rx);
        for i in 0..3 {
            tx.send(ProgressEvent {
                step: "Checking DNS Records".into(),
                detail: format!("pass {i}"),
            })
            .await
            .unwrap();
        }
        c.drain_stale();
        assert!(c.events_mut().unwrap().try_recv().is_err());
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_none() {
        // Nothing listens on this port; connect must fail fast and degrade.
        let mut c = Correlator::new("ws://127.0.0.1:1/progress");
        assert_eq!(c.open_session().await, None);
    }
}
