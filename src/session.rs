use std::time::Duration;

use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::backend::ScanBackend;
use crate::dashboard::RefreshHook;
use crate::error::ScanError;
use crate::progress::ProgressTracker;
use crate::push::Correlator;
use crate::render::{Panel, RenderSurface};
use crate::types::{ProgressEvent, RiskTier, ScanReport};
use crate::urlcheck;

/// Lifecycle of one scan as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    InProgress,
    Settling,
    Revealed,
}

/// Pacing knobs for the progress animation and the staged reveal.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    /// Period of the interpolation ticker (one displayed unit per tick).
    pub tick: Duration,
    /// Hold at 100% before the first panel, so the full bar is perceivable.
    pub settle_delay: Duration,
    /// Delay between consecutive panel reveals.
    pub reveal_stagger: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(30),
            settle_delay: Duration::from_millis(400),
            reveal_stagger: Duration::from_millis(120),
        }
    }
}

/// Per-scan state, constructed fresh for every scan and discarded once the
/// scan settles. Owning the tracker and cancellation token here is what
/// keeps a stale timer from a previous scan from ever touching a new one.
struct ScanSession {
    raw_input: String,
    session_id: Option<String>,
    tracker: ProgressTracker,
    cancel: CancellationToken,
}

impl ScanSession {
    fn new(raw_input: String, session_id: Option<String>, cancel: CancellationToken) -> Self {
        Self {
            raw_input,
            session_id,
            tracker: ProgressTracker::new(),
            cancel,
        }
    }
}

/// The settled outcome handed back to the caller after the reveal.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub report: ScanReport,
    pub tier: RiskTier,
}

/// Drives one scan end to end: validates input, correlates the push
/// session, issues the tagged request, and multiplexes the three per-scan
/// timelines (request settlement, push events, interpolation ticker) on one
/// event loop until the result is revealed or the scan fails.
///
/// Invariant: at most one scan in flight per coordinator. Starting a new
/// scan first cancels the previous session's token and drains any progress
/// events it left queued.
pub struct Coordinator<B, S> {
    backend: B,
    surface: S,
    correlator: Correlator,
    timings: Timings,
    refresh_hook: Option<RefreshHook>,
    active: Option<CancellationToken>,
    phase: ScanPhase,
}

impl<B: ScanBackend, S: RenderSurface> Coordinator<B, S> {
    pub fn new(backend: B, correlator: Correlator, surface: S) -> Self {
        Self {
            backend,
            surface,
            correlator,
            timings: Timings::default(),
            refresh_hook: None,
            active: None,
            phase: ScanPhase::Idle,
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Register the hook fired after every successful reveal.
    pub fn on_refresh(mut self, hook: RefreshHook) -> Self {
        self.refresh_hook = Some(hook);
        self
    }

    /// Phase the last scan reached: `Revealed` after success, `Idle` after
    /// any failure.
    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub async fn run_scan(&mut self, raw_input: &str) -> Result<ScanOutcome, ScanError> {
        // Neutralize the previous session before building fresh state.
        if let Some(prev) = self.active.take() {
            prev.cancel();
        }
        self.phase = ScanPhase::Idle;

        let url = match urlcheck::validate_and_normalize(raw_input) {
            Ok(url) => url,
            Err(err) => {
                self.surface.invalid_input(&err.to_string());
                return Err(err);
            }
        };

        let cancel = CancellationToken::new();
        self.active = Some(cancel.clone());

        // Session identity before the request, so the backend can route
        // progress pushes here. Failure degrades to a static indicator.
        let session_id = self.correlator.open_session().await;
        self.correlator.drain_stale();
        let mut session = ScanSession::new(raw_input.to_string(), session_id, cancel);
        debug!(
            input = %session.raw_input,
            sid = ?session.session_id,
            "scan session created"
        );

        self.phase = ScanPhase::InProgress;
        self.surface.scan_started();
        self.surface.progress(0, "");

        let settled = self.drive(&mut session, &url).await;

        match settled {
            Ok(report) => {
                self.phase = ScanPhase::Settling;
                session.tracker.force_complete();
                self.surface.progress(100, session.tracker.label());

                sleep(self.timings.settle_delay).await;
                for (idx, panel) in Panel::REVEAL_ORDER.iter().enumerate() {
                    if idx > 0 {
                        sleep(self.timings.reveal_stagger).await;
                    }
                    self.surface.reveal_panel(*panel, &report);
                }

                self.phase = ScanPhase::Revealed;
                self.surface.scan_finished();
                if let Some(hook) = &self.refresh_hook {
                    hook();
                }
                self.active = None;
                info!(score = report.risk_score, "scan revealed");
                Ok(ScanOutcome {
                    tier: report.tier(),
                    report,
                })
            }
            Err(err) => {
                // Recoverable state: indicator hidden, error surfaced,
                // trigger re-enabled, nothing revealed.
                self.phase = ScanPhase::Idle;
                session.tracker.reset();
                self.surface.scan_failed(&err.to_string());
                self.surface.scan_finished();
                self.active = None;
                warn!(error = %err, "scan failed");
                Err(err)
            }
        }
    }

    /// Await settlement while interleaving push events and the ticker.
    async fn drive(
        &mut self,
        session: &mut ScanSession,
        url: &Url,
    ) -> Result<ScanReport, ScanError> {
        let Coordinator {
            backend,
            surface,
            correlator,
            timings,
            ..
        } = self;

        let cancel = session.cancel.clone();
        let request = backend.submit(url, session.session_id.as_deref());
        tokio::pin!(request);

        let mut ticker = interval(timings.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut events = correlator.events_mut();
        let mut live = events.is_some();

        loop {
            tokio::select! {
                settled = &mut request => return settled,

                _ = cancel.cancelled() => return Err(ScanError::Superseded),

                arrival = next_event(&mut events), if live => match arrival {
                    Some(event) => {
                        if session.tracker.on_event(&event) {
                            surface.progress(session.tracker.displayed(), session.tracker.label());
                        }
                    }
                    None => {
                        // Push channel dropped mid-scan; carry on without
                        // live progress.
                        debug!("push channel closed during scan");
                        live = false;
                    }
                },

                _ = ticker.tick(), if session.tracker.lagging() => {
                    if session.tracker.tick() {
                        surface.progress(session.tracker.displayed(), session.tracker.label());
                    }
                }
            }
        }
    }
}

async fn next_event(
    events: &mut Option<&mut tokio::sync::mpsc::Receiver<ProgressEvent>>,
) -> Option<ProgressEvent> {
    match events.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScanReport;

    struct NeverBackend;

    impl ScanBackend for NeverBackend {
        async fn submit(
            &self,
            _url: &Url,
            _session_id: Option<&str>,
        ) -> Result<ScanReport, ScanError> {
            std::future::pending().await
        }
    }

    struct NullSurface;

    impl RenderSurface for NullSurface {
        fn invalid_input(&mut self, _message: &str) {}
        fn scan_started(&mut self) {}
        fn progress(&mut self, _percent: u8, _label: &str) {}
        fn reveal_panel(&mut self, _panel: Panel, _report: &ScanReport) {}
        fn scan_failed(&mut self, _message: &str) {}
        fn scan_finished(&mut self) {}
    }

    #[tokio::test]
    async fn superseded_session_settles_as_error() {
        let mut coord = Coordinator::new(NeverBackend, Correlator::detached(), NullSurface);
        let mut session = ScanSession::new(
            "http://example.com".into(),
            None,
            CancellationToken::new(),
        );
        session.cancel.cancel();

        let url = Url::parse("http://example.com/").unwrap();
        let err = coord.drive(&mut session, &url).await.unwrap_err();
        assert!(matches!(err, ScanError::Superseded));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_backend() {
        let mut coord = Coordinator::new(NeverBackend, Correlator::detached(), NullSurface);
        // NeverBackend would hang forever if a request were issued.
        let err = coord.run_scan("not a url at all ://").await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidUrl(_)));
        assert_eq!(coord.phase(), ScanPhase::Idle);
    }
}
