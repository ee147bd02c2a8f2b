//! Panel lifecycle: idle → generating → completed | error, and back to generating
//! on regeneration.

use super::Panel;
use crate::error::TransitionError;
use crate::types::ImageLocator;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    /// No attempt yet
    Idle,
    /// One or more attempts in flight
    Generating,
    /// Last attempt produced an image
    Completed,
    /// Last attempt produced nothing
    Error,
}

impl PanelStatus {
    pub const ALL: [PanelStatus; 4] = [
        PanelStatus::Idle,
        PanelStatus::Generating,
        PanelStatus::Completed,
        PanelStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelStatus::Idle => "idle",
            PanelStatus::Generating => "generating",
            PanelStatus::Completed => "completed",
            PanelStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PanelStatus::Completed | PanelStatus::Error)
    }
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs that move a panel between states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// A generation attempt (bulk pass or user regeneration) has begun
    AttemptStarted,
    /// An attempt finished; `None` means the attempt failed
    AttemptResolved(Option<ImageLocator>),
    /// The process stopped while an attempt was in flight
    Interrupted,
}

impl Panel {
    /// Compute the panel that results from `event`.
    ///
    /// Starting while already generating keeps the panel generating. Resolution is only
    /// accepted while generating; a stale outcome arriving after another attempt
    /// already resolved the panel is rejected.
    pub fn apply_event(&self, event: PanelEvent) -> Result<Panel, TransitionError> {
        let mut next = self.clone();
        match event {
            PanelEvent::AttemptStarted => {
                next.status = PanelStatus::Generating;
                next.image_url = None;
            }
            PanelEvent::AttemptResolved(outcome) => {
                self.require_generating()?;
                match outcome {
                    Some(locator) => {
                        next.status = PanelStatus::Completed;
                        next.image_url = Some(locator);
                    }
                    None => {
                        next.status = PanelStatus::Error;
                        next.image_url = None;
                    }
                }
            }
            PanelEvent::Interrupted => {
                self.require_generating()?;
                next.status = PanelStatus::Error;
                next.image_url = None;
            }
        }
        Ok(next)
    }

    /// Repair a panel loaded from storage so it satisfies the lifecycle invariants.
    pub(crate) fn normalized(self) -> Panel {
        let mut panel = if self.status == PanelStatus::Generating {
            self.apply_event(PanelEvent::Interrupted).unwrap_or(self)
        } else {
            self
        };
        match (panel.status, panel.image_url.is_some()) {
            (PanelStatus::Completed, false) => panel.status = PanelStatus::Error,
            (PanelStatus::Completed, true) => {}
            (_, true) => panel.image_url = None,
            (_, false) => {}
        }
        panel
    }

    fn require_generating(&self) -> Result<(), TransitionError> {
        if self.status == PanelStatus::Generating {
            Ok(())
        } else {
            Err(TransitionError::NotGenerating(self.status.to_string()))
        }
    }
}
