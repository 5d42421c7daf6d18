use serde::Serialize;

/// Closed set of transitions the reconciliation engine knows how to fold.
/// Anything else the device (or a future firmware) sends is carried as
/// `Unrecognized` and logged without touching session state.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub enum TransitionKind {
    IdleToWork,
    WorkToBreak,
    WorkToIdle,
    BreakToIdle,
    Unrecognized,
}

impl TransitionKind {
    /// Classify the raw `transition` payload field. Missing counts as
    /// unrecognized, not as an error.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("idle_to_work") => Self::IdleToWork,
            Some("work_to_break") => Self::WorkToBreak,
            Some("work_to_idle") => Self::WorkToIdle,
            Some("break_to_idle") => Self::BreakToIdle,
            _ => Self::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdleToWork => "idle_to_work",
            Self::WorkToBreak => "work_to_break",
            Self::WorkToIdle => "work_to_idle",
            Self::BreakToIdle => "break_to_idle",
            Self::Unrecognized => "unrecognized",
        }
    }
}
