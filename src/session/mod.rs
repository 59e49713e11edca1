//! One tutoring session: the current answer, its view state, and request sequencing.
//!
//! Every submission is issued a ticket. Only the completion carrying the most
//! recent ticket is applied; anything older is stale and dropped. A failure
//! never clears an answer that is already on screen.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::PipelineResult;
use crate::pipeline::AnalysisRequest;
use crate::presenter::MapState;
use crate::tree::{AnalysisBranch, GeometryResponse};

/// Monotonically increasing submission number.
pub type Ticket = u64;

/// A submission waiting for its result.
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    /// Pass back to [`Session::complete`]
    pub ticket: Ticket,
    /// The request to run
    pub request: AnalysisRequest,
}

/// What happened to a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The new answer replaced the previous one.
    Applied,
    /// The call failed; the previous answer stays.
    Failed,
    /// A newer submission exists (or the session was reset); ignored.
    Stale,
}

/// State for one user's session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session identifier.
    pub id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time the last completion was applied or failed.
    pub updated_at: DateTime<Utc>,
    issued: Ticket,
    outstanding: Option<Ticket>,
    last_request: Option<AnalysisRequest>,
    response: Option<GeometryResponse>,
    active_branch: usize,
    map: Option<MapState>,
    last_error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            issued: 0,
            outstanding: None,
            last_request: None,
            response: None,
            active_branch: 0,
            map: None,
            last_error: None,
        }
    }

    /// Register a new submission; any outstanding one becomes stale
    pub fn submit(&mut self, request: AnalysisRequest) -> PendingAnalysis {
        self.issued += 1;
        let ticket = self.issued;
        if let Some(previous) = self.outstanding.replace(ticket) {
            debug!(session = %self.id, previous, ticket, "Superseding outstanding request");
        }
        self.last_request = Some(request.clone());
        PendingAnalysis { ticket, request }
    }

    /// Resubmit the last problem with feedback; `None` if nothing was submitted yet
    pub fn refine(&mut self, feedback: impl Into<String>) -> Option<PendingAnalysis> {
        let request = self.last_request.clone()?.with_feedback(feedback);
        Some(self.submit(request))
    }

    /// Apply the result for a ticket
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: PipelineResult<GeometryResponse>,
    ) -> CompletionOutcome {
        if self.outstanding != Some(ticket) {
            warn!(session = %self.id, ticket, latest = self.issued, "Discarding stale completion");
            return CompletionOutcome::Stale;
        }

        self.outstanding = None;
        self.updated_at = Utc::now();

        match result {
            Ok(response) => {
                info!(
                    session = %self.id,
                    ticket,
                    branches = response.branches.len(),
                    "Analysis applied"
                );
                self.map = response.branches.first().map(|b| MapState::new(&b.root));
                self.response = Some(response);
                self.active_branch = 0;
                self.last_error = None;
                CompletionOutcome::Applied
            }
            Err(e) => {
                warn!(session = %self.id, ticket, error = %e, "Analysis failed");
                self.last_error = Some(e.to_string());
                CompletionOutcome::Failed
            }
        }
    }

    /// True while the latest submission has not completed
    pub fn busy(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Current answer
    pub fn response(&self) -> Option<&GeometryResponse> {
        self.response.as_ref()
    }

    /// Message of the last failure, cleared by the next success
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Index of the branch on display
    pub fn active_branch_index(&self) -> usize {
        self.active_branch
    }

    /// Branch on display
    pub fn active_branch(&self) -> Option<&AnalysisBranch> {
        self.response.as_ref()?.branch(self.active_branch)
    }

    /// Switch branch; its map starts fresh. Returns false for an unknown index
    pub fn select_branch(&mut self, index: usize) -> bool {
        let Some(branch) = self.response.as_ref().and_then(|r| r.branch(index)) else {
            return false;
        };
        self.map = Some(MapState::new(&branch.root));
        self.active_branch = index;
        true
    }

    /// Map state of the active branch
    pub fn map(&self) -> Option<&MapState> {
        self.map.as_ref()
    }

    /// Mutable map state for click handling
    pub fn map_mut(&mut self) -> Option<&mut MapState> {
        self.map.as_mut()
    }

    /// Drop everything; outstanding tickets become stale
    pub fn reset(&mut self) {
        info!(session = %self.id, "Session reset");
        self.outstanding = None;
        self.last_request = None;
        self.response = None;
        self.active_branch = 0;
        self.map = None;
        self.last_error = None;
        self.updated_at = Utc::now();
    }
}
