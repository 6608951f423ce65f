//! InteractionFacade: the AI panels of one session (CV analysis and
//! optimization, cover-letter generation and job scanning).
//!
//! Each action issues at most one request. On success the result is shown
//! in a modal; on failure a generic error banner is shown and the error is
//! logged and swallowed. The loading overlay is held by a `LoadingGuard`, so
//! it is gone before the terminal modal or banner appears.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::ai::upload::CvUpload;
use crate::errors::UiError;
use crate::matching_client::types::{
    CoverLetter, CoverLetterRequest, CvAnalysis, JobMatch, JobScanRequest, LetterLength,
    OptimizationTargets, OptimizeCvRequest, OptimizedCv, Tone,
};
use crate::matching_client::MatchingApi;
use crate::ui::dom::{NodeId, SharedDocument};
use crate::ui::overlay::{NotificationKind, Overlays};
use crate::ui::pending::{InFlight, InFlightToken, BUSY_MESSAGE};
use crate::ui::views;

pub const AI_LOADING_SLOT: &str = "aiLoading";

const ANALYZE_FAILED: &str = "Failed to analyze CV. Please try again.";
const OPTIMIZE_FAILED: &str = "Failed to optimize CV. Please try again.";
const COVER_LETTER_FAILED: &str = "Failed to generate cover letter. Please try again.";
const SCAN_FAILED: &str = "Failed to scan job opportunities. Please try again.";
const ANALYZE_FIRST: &str = "Please analyze your CV first.";
const NOTHING_TO_REGENERATE: &str = "Please generate a cover letter first.";

/// Tone and length for a generated letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverLetterOptions {
    pub tone: Tone,
    pub length: LetterLength,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct InteractionFacade {
    api: Arc<dyn MatchingApi>,
    overlays: Overlays,
    analysis: Mutex<Option<CvAnalysis>>,
    last_cover_letter: Mutex<Option<CoverLetterRequest>>,
    in_flight: InFlight,
}

impl InteractionFacade {
    pub fn new(doc: SharedDocument, api: Arc<dyn MatchingApi>, transient_ttl: Duration) -> Self {
        Self {
            api,
            overlays: Overlays::new(doc, AI_LOADING_SLOT, transient_ttl),
            analysis: Mutex::new(None),
            last_cover_letter: Mutex::new(None),
            in_flight: InFlight::default(),
        }
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    /// The most recent successful analysis, if any.
    pub fn analysis(&self) -> Option<CvAnalysis> {
        lock(&self.analysis).clone()
    }

    pub fn show_error(&self, message: &str) -> NodeId {
        self.overlays.show_error(message)
    }

    pub fn dismiss(&self, id: NodeId) -> bool {
        self.overlays.dismiss(id)
    }

    fn begin(&self) -> Option<InFlightToken> {
        let token = self.in_flight.try_begin();
        if token.is_none() {
            debug!("AI action rejected: another request is in flight");
            self.overlays
                .show_notification(BUSY_MESSAGE, NotificationKind::Warning);
        }
        token
    }

    /// Logs the failure and shows its banner. Validation failures show their
    /// own message; transport failures show the action's generic one.
    fn report(&self, err: UiError, generic: &str) {
        match &err {
            UiError::Validation(reason) => {
                warn!("AI action validation failure: {reason}");
                self.overlays.show_error(reason);
            }
            UiError::TransportOrServer(e) => {
                error!("{generic} ({e})");
                self.overlays.show_error(generic);
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // CV analysis & optimization
    // ────────────────────────────────────────────────────────────────────────

    /// Entry point for the upload control. Unsupported files never reach the
    /// network.
    pub async fn select_cv(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: bytes::Bytes,
    ) -> Option<CvAnalysis> {
        match CvUpload::new(file_name, content_type, bytes) {
            Ok(upload) => self.analyze_cv(upload).await,
            Err(e) => {
                self.report(e, ANALYZE_FAILED);
                None
            }
        }
    }

    pub async fn analyze_cv(&self, upload: CvUpload) -> Option<CvAnalysis> {
        let _token = self.begin()?;

        let result = {
            let _loading = self.overlays.loading("AI is analyzing your CV...");
            self.api.analyze_cv(&upload).await
        };

        match result {
            Ok(analysis) => {
                info!(
                    file = %upload.file_name,
                    score = analysis.overall_score,
                    "CV analyzed"
                );
                *lock(&self.analysis) = Some(analysis.clone());
                self.overlays
                    .show_modal("CV Analysis Results", views::cv_analysis(&analysis));
                Some(analysis)
            }
            Err(e) => {
                self.report(e.into(), ANALYZE_FAILED);
                None
            }
        }
    }

    pub async fn optimize_cv(&self, targets: OptimizationTargets) -> Option<OptimizedCv> {
        let Some(original_analysis) = self.analysis() else {
            self.report(UiError::Validation(ANALYZE_FIRST.to_string()), OPTIMIZE_FAILED);
            return None;
        };

        let _token = self.begin()?;

        let request = OptimizeCvRequest {
            original_analysis,
            target_industry: targets.target_industry,
            experience_level: targets.experience_level,
        };

        let result = {
            let _loading = self.overlays.loading("AI is optimizing your CV...");
            self.api.optimize_cv(&request).await
        };

        match result {
            Ok(optimized) => {
                info!(ats_score = optimized.ats_score, "CV optimized");
                self.overlays
                    .show_modal("Optimized CV Ready", views::optimized_cv(&optimized));
                Some(optimized)
            }
            Err(e) => {
                self.report(e.into(), OPTIMIZE_FAILED);
                None
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Cover letters
    // ────────────────────────────────────────────────────────────────────────

    pub async fn generate_cover_letter(
        &self,
        job_description: &str,
        cv_data: Value,
        options: CoverLetterOptions,
    ) -> Option<CoverLetter> {
        let request = CoverLetterRequest {
            job_description: job_description.to_string(),
            cv_data,
            tone: options.tone,
            length: options.length,
        };
        self.send_cover_letter(request).await
    }

    /// Re-issues the last cover-letter request.
    pub async fn regenerate_cover_letter(&self) -> Option<CoverLetter> {
        let Some(request) = lock(&self.last_cover_letter).clone() else {
            self.report(
                UiError::Validation(NOTHING_TO_REGENERATE.to_string()),
                COVER_LETTER_FAILED,
            );
            return None;
        };
        self.send_cover_letter(request).await
    }

    async fn send_cover_letter(&self, request: CoverLetterRequest) -> Option<CoverLetter> {
        let _token = self.begin()?;
        *lock(&self.last_cover_letter) = Some(request.clone());

        let result = {
            let _loading = self.overlays.loading("AI is generating your cover letter...");
            self.api.generate_cover_letter(&request).await
        };

        match result {
            Ok(letter) => {
                info!(relevance = letter.relevance_score, "Cover letter generated");
                self.overlays
                    .show_modal("Cover Letter Generated", views::cover_letter(&letter));
                Some(letter)
            }
            Err(e) => {
                self.report(e.into(), COVER_LETTER_FAILED);
                None
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Job scanning
    // ────────────────────────────────────────────────────────────────────────

    pub async fn scan_job_opportunities(&self, profile: &JobScanRequest) -> Option<Vec<JobMatch>> {
        let _token = self.begin()?;

        let result = {
            let _loading = self.overlays.loading("Scanning for perfect job matches...");
            self.api.scan_jobs(profile).await
        };

        match result {
            Ok(matches) => {
                info!(count = matches.len(), "Job scan completed");
                self.overlays
                    .show_modal("Job Matches", views::job_matches(&matches));
                Some(matches)
            }
            Err(e) => {
                self.report(e.into(), SCAN_FAILED);
                None
            }
        }
    }
}
