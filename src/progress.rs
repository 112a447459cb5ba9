use crate::steps;
use crate::types::ProgressEvent;

/// Transient progress state for one scan.
///
/// Two writers feed it, both on the same event loop: push-event arrivals
/// raise `target`, and the session's interpolation ticker walks `displayed`
/// toward `target` one unit at a time so the bar fills smoothly instead of
/// jumping. `displayed` never exceeds `target` and never decreases except
/// through `reset`.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    displayed: u8,
    target: u8,
    label: String,
    terminal: bool,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            displayed: 0,
            target: 0,
            label: String::new(),
            terminal: false,
        }
    }

    /// Fold one push event into the state. Returns whether anything changed.
    ///
    /// The label always reflects the latest event, even for step names
    /// outside the fixed vocabulary; only known steps may move the target,
    /// and a late lower-percentage arrival never regresses it. Once the
    /// tracker is terminal the event is an orphan and is dropped.
    pub fn on_event(&mut self, event: &ProgressEvent) -> bool {
        if self.terminal {
            return false;
        }
        self.label = format!("{} - {}", event.step, event.detail);
        if let Some(pct) = steps::target_percent(&event.step) {
            self.target = self.target.max(pct.min(100));
        }
        true
    }

    /// Advance the displayed percentage one unit toward the target.
    /// Returns whether it moved.
    pub fn tick(&mut self) -> bool {
        if self.displayed < self.target {
            self.displayed += 1;
            true
        } else {
            false
        }
    }

    /// Whether the interpolation ticker still has work to do.
    pub fn lagging(&self) -> bool {
        self.displayed < self.target
    }

    /// Force the bar to exactly 100% with the terminal label and latch the
    /// tracker; later events are ignored. Called when the request settles,
    /// whether or not every expected step was announced.
    pub fn force_complete(&mut self) {
        self.displayed = 100;
        self.target = 100;
        self.label = steps::TERMINAL_STEP.to_string();
        self.terminal = true;
    }

    /// Return to the pristine state for a new scan.
    pub fn reset(&mut self) {
        self.displayed = 0;
        self.target = 0;
        self.label.clear();
        self.terminal = false;
    }

    pub fn displayed(&self) -> u8 {
        self.displayed
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
