//! Guided calibration state machine
//!
//! Both sensors share the same linear workflow: Idle, then one
//! capture per reference point, then Done, then save or cancel. The
//! session owns a working copy of the record; the persisted record is
//! untouched until a completed session is committed through the
//! store. At most one session exists per sensor.

/// Current position in the guided calibration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalStep {
    /// No calibration in progress.
    Idle,
    /// Waiting for the capture of point `n` (zero-based).
    Point(u8),
    /// All points captured; ready to save.
    Done,
}

/// Calibration workflow misuse, reported to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalError {
    /// Save requested before every point was captured.
    Incomplete,
    /// Capture requested outside the point sequence.
    OutOfSequence,
}

/// Step-wise calibration session over a working record.
///
/// Generic over the record type and the number of capture steps, so
/// the pH (3 points) and colour (2 points) workflows share one
/// implementation.
pub struct CalSession<R, const STEPS: u8> {
    step: CalStep,
    working: R,
}

impl<R: Clone, const STEPS: u8> CalSession<R, STEPS> {
    /// Create an idle session seeded from the persisted record.
    pub fn new(persisted: &R) -> Self {
        Self {
            step: CalStep::Idle,
            working: persisted.clone(),
        }
    }

    /// Start (or restart) the sequence at the first point.
    ///
    /// Callable from any state; an in-progress session is abandoned
    /// and the working record reset from `persisted`.
    pub fn begin(&mut self, persisted: &R) {
        self.working = persisted.clone();
        self.step = CalStep::Point(0);
    }

    /// Record a sample for the current point via `record`, then
    /// advance. Returns the index just captured.
    ///
    /// In `Idle` or `Done` this is a no-op reported as
    /// [`CalError::OutOfSequence`].
    pub fn capture_with(&mut self, record: impl FnOnce(&mut R, u8)) -> Result<u8, CalError> {
        match self.step {
            CalStep::Point(index) => {
                record(&mut self.working, index);
                self.step = if index + 1 >= STEPS {
                    CalStep::Done
                } else {
                    CalStep::Point(index + 1)
                };
                Ok(index)
            }
            _ => Err(CalError::OutOfSequence),
        }
    }

    /// The completed working record, available only in `Done`.
    pub fn completed(&self) -> Result<&R, CalError> {
        if self.step == CalStep::Done {
            Ok(&self.working)
        } else {
            Err(CalError::Incomplete)
        }
    }

    /// Discard the working record and return to `Idle`.
    ///
    /// Used both for cancel (reseeding from the untouched persisted
    /// record) and after a successful save (reseeding from the record
    /// just committed).
    pub fn reset(&mut self, persisted: &R) {
        self.working = persisted.clone();
        self.step = CalStep::Idle;
    }

    /// Current step, a pure query with no side effects.
    pub fn step(&self) -> CalStep {
        self.step
    }

    /// True while a sequence is underway or awaiting save.
    pub fn in_progress(&self) -> bool {
        self.step != CalStep::Idle
    }
}

/// Human-readable prompt for `step`, given the per-point prompts of a
/// sensor kind. Total over all states: an out-of-range point index
/// yields the `"Unknown"` sentinel instead of failing.
pub fn step_label(step: CalStep, prompts: &'static [&'static str]) -> &'static str {
    match step {
        CalStep::Idle => "Idle",
        CalStep::Point(index) => prompts.get(index as usize).copied().unwrap_or("Unknown"),
        CalStep::Done => "Press SELECT to save",
    }
}
