//! PlatformFacade: job browsing, registration and landing-page behaviour
//! for one session.
//!
//! Failures are reported as error notifications and swallowed; the visitor
//! retries by hand. One action runs at a time (see `ui::pending`).

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::errors::UiError;
use crate::models::job::JobPosting;
use crate::models::user::{Plan, UserProfile};
use crate::platform::animation::{self, CounterAnimation, COUNTER_DURATION, COUNTER_TICK};
use crate::platform::backend::{ApplicationReceipt, PlatformBackend};
use crate::platform::jobs::{self, SearchCriteria};
use crate::platform::provinces;
use crate::platform::registration::RegistrationForm;
use crate::ui::dom::{NodeId, SharedDocument};
use crate::ui::overlay::{NotificationKind, Overlays};
use crate::ui::pending::{InFlight, InFlightToken, BUSY_MESSAGE};
use crate::ui::views::{
    self, CITY_SELECT_ID, HERO_CLASS, JOBS_GRID_ID, PLAN_FIELD_ID, REGISTRATION_MODAL_ID,
};

pub const PLATFORM_LOADING_SLOT: &str = "platformLoading";

const SEARCH_DELAY: Duration = Duration::from_millis(1000);
const WELCOME_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct PlatformTimings {
    pub search_delay: Duration,
    pub welcome_delay: Duration,
    pub counter_duration: Duration,
    pub counter_tick: Duration,
}

impl Default for PlatformTimings {
    fn default() -> Self {
        Self {
            search_delay: SEARCH_DELAY,
            welcome_delay: WELCOME_DELAY,
            counter_duration: COUNTER_DURATION,
            counter_tick: COUNTER_TICK,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// No registered user; the registration modal was opened instead.
    RegistrationRequired,
    UnknownJob,
    Busy,
    Submitted(ApplicationReceipt),
    Declined(ApplicationReceipt),
    Failed,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct PlatformFacade {
    overlays: Overlays,
    backend: Arc<dyn PlatformBackend>,
    timings: PlatformTimings,
    jobs: Mutex<Vec<JobPosting>>,
    saved: Mutex<BTreeSet<u32>>,
    current_user: Mutex<Option<UserProfile>>,
    in_flight: InFlight,
}

impl PlatformFacade {
    pub fn new(
        doc: SharedDocument,
        backend: Arc<dyn PlatformBackend>,
        transient_ttl: Duration,
        timings: PlatformTimings,
    ) -> Self {
        Self {
            overlays: Overlays::new(doc, PLATFORM_LOADING_SLOT, transient_ttl),
            backend,
            timings,
            jobs: Mutex::new(Vec::new()),
            saved: Mutex::new(BTreeSet::new()),
            current_user: Mutex::new(None),
            in_flight: InFlight::default(),
        }
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn jobs(&self) -> Vec<JobPosting> {
        lock(&self.jobs).clone()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        lock(&self.current_user).clone()
    }

    pub fn saved_jobs(&self) -> Vec<u32> {
        lock(&self.saved).iter().copied().collect()
    }

    pub fn show_notification(&self, message: &str, kind: NotificationKind) -> NodeId {
        self.overlays.show_notification(message, kind)
    }

    pub fn dismiss(&self, id: NodeId) -> bool {
        self.overlays.dismiss(id)
    }

    fn doc(&self) -> &SharedDocument {
        self.overlays.document()
    }

    fn begin(&self) -> Option<InFlightToken> {
        let token = self.in_flight.try_begin();
        if token.is_none() {
            debug!("Platform action rejected: another action is in flight");
            self.overlays
                .show_notification(BUSY_MESSAGE, NotificationKind::Warning);
        }
        token
    }

    fn fail(&self, err: UiError, message: &str) {
        match &err {
            UiError::Validation(reason) => {
                warn!("Platform validation failure: {reason}");
                self.overlays
                    .show_notification(reason, NotificationKind::Error);
            }
            UiError::TransportOrServer(e) => {
                error!("{message}: {e}");
                self.overlays
                    .show_notification(message, NotificationKind::Error);
            }
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Jobs
    // ────────────────────────────────────────────────────────────────────────

    pub fn load_sample_jobs(&self) -> usize {
        *lock(&self.jobs) = jobs::sample_jobs();
        self.render_jobs()
    }

    /// Replaces the jobs grid with one card per job. Returns the number of
    /// cards rendered, 0 when the grid is not on the page.
    pub fn render_jobs(&self) -> usize {
        let jobs = self.jobs();
        let rendered = self
            .doc()
            .with(|doc| doc.replace_children(JOBS_GRID_ID, views::job_cards(&jobs)));
        if !rendered {
            warn!("#{JOBS_GRID_ID} not found; skipping job render");
            return 0;
        }
        jobs.len()
    }

    /// Resets the city selector for a province. Returns the number of cities
    /// offered besides "All Cities".
    pub fn update_city_options(&self, province: &str) -> usize {
        let cities = provinces::cities_for(province);
        let updated = self
            .doc()
            .with(|doc| doc.replace_children(CITY_SELECT_ID, views::city_options(cities)));
        if !updated {
            warn!("#{CITY_SELECT_ID} not found; skipping city update");
            return 0;
        }
        cities.len()
    }

    pub async fn search_jobs(&self, criteria: &SearchCriteria) -> Option<usize> {
        let _token = self.begin()?;

        self.overlays
            .show_notification("Searching for matching jobs...", NotificationKind::Info);
        tokio::time::sleep(self.timings.search_delay).await;

        let found = jobs::search(&jobs::sample_jobs(), criteria);
        let count = found.len();
        *lock(&self.jobs) = found;
        self.render_jobs();

        info!(count, "Job search completed");
        self.overlays.show_notification(
            &format!("Found {count} matching jobs!"),
            NotificationKind::Success,
        );
        Some(count)
    }

    pub async fn apply_to_job(&self, job_id: u32) -> ApplyOutcome {
        if self.current_user().is_none() {
            self.show_registration_modal();
            return ApplyOutcome::RegistrationRequired;
        }

        let Some(job) = self.jobs().into_iter().find(|j| j.id == job_id) else {
            debug!("Apply ignored: job {job_id} is not listed");
            return ApplyOutcome::UnknownJob;
        };

        let Some(_token) = self.begin() else {
            return ApplyOutcome::Busy;
        };

        let result = {
            let _loading = self.overlays.loading("Submitting your application...");
            self.backend.submit_application(&job).await
        };

        match result {
            Ok(receipt) if receipt.accepted => {
                info!(job_id, application_id = %receipt.application_id, "Application submitted");
                self.overlays.show_notification(
                    "Application submitted successfully!",
                    NotificationKind::Success,
                );
                ApplyOutcome::Submitted(receipt)
            }
            Ok(receipt) => {
                warn!(job_id, "Application declined: {}", receipt.message);
                self.overlays.show_notification(
                    "Application failed. Please try again.",
                    NotificationKind::Error,
                );
                ApplyOutcome::Declined(receipt)
            }
            Err(e) => {
                self.fail(e.into(), "Error submitting application");
                ApplyOutcome::Failed
            }
        }
    }

    /// Toggles a job in the saved list. `None` for jobs not on the page,
    /// otherwise whether the job is now saved.
    pub fn save_job(&self, job_id: u32) -> Option<bool> {
        if !self.jobs().iter().any(|j| j.id == job_id) {
            return None;
        }

        let now_saved = {
            let mut saved = lock(&self.saved);
            if saved.remove(&job_id) {
                false
            } else {
                saved.insert(job_id);
                true
            }
        };

        let message = if now_saved {
            "Job saved to your list"
        } else {
            "Job removed from your list"
        };
        self.overlays
            .show_notification(message, NotificationKind::Info);
        Some(now_saved)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Registration
    // ────────────────────────────────────────────────────────────────────────

    pub fn show_registration_modal(&self) -> bool {
        let shown = self
            .doc()
            .with(|doc| doc.set_attr(REGISTRATION_MODAL_ID, "style", "display: block"));
        if !shown {
            warn!("#{REGISTRATION_MODAL_ID} not found");
        }
        shown
    }

    pub fn close_registration_modal(&self) -> bool {
        self.doc()
            .with(|doc| doc.set_attr(REGISTRATION_MODAL_ID, "style", "display: none"))
    }

    pub fn select_plan(&self, plan: Plan) -> bool {
        let shown = self.show_registration_modal();
        let preset = self
            .doc()
            .with(|doc| doc.set_attr(PLAN_FIELD_ID, "value", plan.as_str()));
        shown && preset
    }

    pub async fn handle_registration(&self, form: &RegistrationForm) -> Option<UserProfile> {
        let _token = self.begin()?;

        let registration = match form.validate() {
            Ok(r) => r,
            Err(e) => {
                self.fail(e, "Registration failed. Please try again.");
                return None;
            }
        };

        let result = {
            let _loading = self.overlays.loading("Creating your account...");
            self.backend.register_user(&registration).await
        };

        let user = match result {
            Ok(user) => user,
            Err(e) => {
                self.fail(e.into(), "Registration failed. Please try again.");
                return None;
            }
        };

        info!(user_id = %user.id, plan = %user.plan, "User registered");
        *lock(&self.current_user) = Some(user.clone());
        self.overlays
            .show_notification("Registration successful!", NotificationKind::Success);
        self.close_registration_modal();
        self.schedule_welcome(user.clone());

        Some(user)
    }

    fn schedule_welcome(&self, user: UserProfile) {
        let overlays = self.overlays.clone();
        let delay = self.timings.welcome_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            overlays.show_panel(|id| views::welcome_screen(id, &user));
        });
    }

    // ────────────────────────────────────────────────────────────────────────
    // Animations
    // ────────────────────────────────────────────────────────────────────────

    /// Starts one counter per `[data-count]` element. Returns how many started.
    pub fn start_counters(&self) -> usize {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime available; counters stay static");
            return 0;
        };

        let targets = self.doc().lock().elements_with_attr("data-count");
        let mut started = 0;

        for (dom_id, raw) in targets {
            let Ok(target) = raw.trim().parse::<u32>() else {
                warn!("#{dom_id} has a non-numeric data-count '{raw}'");
                continue;
            };
            let frames =
                CounterAnimation::new(target, self.timings.counter_duration, self.timings.counter_tick);
            runtime.spawn(run_counter(
                self.doc().clone(),
                dom_id,
                frames,
                self.timings.counter_tick,
            ));
            started += 1;
        }
        started
    }

    pub fn handle_scroll(&self, scroll_offset: f64) -> bool {
        let transform = animation::parallax_transform(scroll_offset);
        self.doc().with(|doc| match doc.first_by_class_mut(HERO_CLASS) {
            Some(hero) => {
                hero.set_attr("style", format!("transform: {transform}"));
                true
            }
            None => false,
        })
    }
}

async fn run_counter(doc: SharedDocument, dom_id: String, frames: CounterAnimation, tick: Duration) {
    let mut interval = tokio::time::interval(tick);
    interval.tick().await;
    for value in frames {
        interval.tick().await;
        if !doc.with(|d| d.set_text(&dom_id, value.to_string())) {
            debug!("Counter #{dom_id} left the page; stopping");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::matching_client::ApiError;
    use crate::platform::backend::SimulatedBackend;
    use crate::platform::registration::ValidRegistration;
    use crate::ui::dom::{Document, Mutation};
    use crate::ui::overlay::DEFAULT_TRANSIENT_TTL;
    use crate::ui::views::STAT_COUNTERS;

    #[derive(Default)]
    struct FakeBackend {
        registrations: AtomicUsize,
        applications: AtomicUsize,
        fail_applications: bool,
        decline_applications: bool,
    }

    #[async_trait]
    impl PlatformBackend for FakeBackend {
        async fn register_user(
            &self,
            registration: &ValidRegistration,
        ) -> Result<UserProfile, ApiError> {
            self.registrations.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(UserProfile {
                id: Uuid::new_v4(),
                name: registration.name.clone(),
                email: registration.email.clone(),
                phone: registration.phone.clone(),
                province: registration.province.clone(),
                plan: registration.plan,
                join_date: Utc::now(),
            })
        }

        async fn submit_application(
            &self,
            _job: &JobPosting,
        ) -> Result<ApplicationReceipt, ApiError> {
            self.applications.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if self.fail_applications {
                return Err(ApiError::Rejected("backend down".into()));
            }
            Ok(ApplicationReceipt {
                accepted: !self.decline_applications,
                application_id: Uuid::new_v4(),
                message: "ok".into(),
                optimization_score: 92,
            })
        }
    }

    fn landing_doc() -> SharedDocument {
        let doc = SharedDocument::new(Document::new());
        doc.with(|d| {
            for el in views::landing_page(&[]) {
                d.append(el);
            }
        });
        doc
    }

    fn facade_with(backend: Arc<dyn PlatformBackend>) -> PlatformFacade {
        PlatformFacade::new(
            landing_doc(),
            backend,
            DEFAULT_TRANSIENT_TTL,
            PlatformTimings::default(),
        )
    }

    fn form() -> RegistrationForm {
        RegistrationForm {
            name: "Thandi Nkosi".into(),
            email: "thandi@example.co.za".into(),
            phone: "082 555 0101".into(),
            province: "gauteng".into(),
            plan: "premium".into(),
        }
    }

    fn html(f: &PlatformFacade) -> String {
        f.doc().lock().to_html()
    }

    fn modal_style(f: &PlatformFacade) -> Option<String> {
        f.doc()
            .lock()
            .element_by_id(REGISTRATION_MODAL_ID)
            .and_then(|m| m.attr_value("style").map(str::to_string))
    }

    fn loading_events(f: &PlatformFacade) -> (usize, usize) {
        let doc = f.doc().lock();
        let inserted = doc
            .journal()
            .filter(|m| matches!(m, Mutation::Inserted(_, l) if l == "ai-loading"))
            .count();
        let removed = doc
            .journal()
            .filter(|m| matches!(m, Mutation::Removed(_, l) if l == "ai-loading"))
            .count();
        (inserted, removed)
    }

    #[tokio::test]
    async fn test_sample_jobs_render_three_cards() {
        let f = facade_with(Arc::new(SimulatedBackend::default()));
        assert_eq!(f.load_sample_jobs(), 3);
        let doc = f.doc().lock();
        assert_eq!(doc.count_class("job-card"), 3);
        assert_eq!(doc.count_class("card-badge"), 2);
    }

    #[tokio::test]
    async fn test_render_without_grid_is_noop() {
        let f = PlatformFacade::new(
            SharedDocument::default(),
            Arc::new(SimulatedBackend::default()),
            DEFAULT_TRANSIENT_TTL,
            PlatformTimings::default(),
        );
        assert_eq!(f.load_sample_jobs(), 0);
        assert_eq!(f.update_city_options("gauteng"), 0);
        assert!(!f.show_registration_modal());
        assert!(!f.handle_scroll(10.0));
    }

    #[tokio::test]
    async fn test_city_options_follow_province() {
        let f = facade_with(Arc::new(SimulatedBackend::default()));
        assert_eq!(f.update_city_options("gauteng"), 5);
        assert_eq!(f.doc().lock().element_by_id(CITY_SELECT_ID).unwrap().children.len(), 6);

        assert_eq!(f.update_city_options(""), 0);
        assert_eq!(f.doc().lock().element_by_id(CITY_SELECT_ID).unwrap().children.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_registration_creates_profile_then_welcome_screen() {
        let f = facade_with(Arc::new(SimulatedBackend::default()));
        f.show_registration_modal();

        let user = f.handle_registration(&form()).await.expect("registered");
        assert_eq!(user.name, "Thandi Nkosi");
        assert_eq!(user.email, "thandi@example.co.za");
        assert_eq!(user.phone, "082 555 0101");
        assert_eq!(user.province, "gauteng");
        assert_eq!(user.plan, Plan::Premium);
        assert!(user.join_date <= Utc::now());
        assert_eq!(f.current_user(), Some(user));

        assert!(html(&f).contains("Registration successful!"));
        assert_eq!(modal_style(&f).as_deref(), Some("display: none"));
        assert_eq!(f.doc().lock().count_class("welcome-screen"), 0);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(f.doc().lock().count_class("welcome-screen"), 1);
        assert_eq!(loading_events(&f), (1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_registration_issues_no_request() {
        let backend = Arc::new(FakeBackend::default());
        let f = facade_with(backend.clone());
        let mut bad = form();
        bad.email = "not-an-email".into();

        assert!(f.handle_registration(&bad).await.is_none());
        assert_eq!(backend.registrations.load(Ordering::SeqCst), 0);
        assert!(html(&f).contains("Please enter a valid email address."));
        assert_eq!(f.doc().lock().count_class("notification-error"), 1);
        assert_eq!(loading_events(&f), (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_without_user_opens_registration() {
        let backend = Arc::new(FakeBackend::default());
        let f = facade_with(backend.clone());
        f.load_sample_jobs();

        assert_eq!(f.apply_to_job(1).await, ApplyOutcome::RegistrationRequired);
        assert_eq!(modal_style(&f).as_deref(), Some("display: block"));
        assert_eq!(backend.applications.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_after_registration_submits_once() {
        let backend = Arc::new(FakeBackend::default());
        let f = facade_with(backend.clone());
        f.load_sample_jobs();
        f.handle_registration(&form()).await.unwrap();

        let outcome = f.apply_to_job(2).await;
        assert!(matches!(outcome, ApplyOutcome::Submitted(_)));
        assert_eq!(backend.applications.load(Ordering::SeqCst), 1);
        assert!(html(&f).contains("Application submitted successfully!"));
        // one loading overlay for registration, one for the application
        assert_eq!(loading_events(&f), (2, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_to_unknown_job_is_ignored() {
        let backend = Arc::new(FakeBackend::default());
        let f = facade_with(backend.clone());
        f.load_sample_jobs();
        f.handle_registration(&form()).await.unwrap();

        assert_eq!(f.apply_to_job(99).await, ApplyOutcome::UnknownJob);
        assert_eq!(backend.applications.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_application_failure_releases_loading_and_notifies() {
        let backend = Arc::new(FakeBackend {
            fail_applications: true,
            ..Default::default()
        });
        let f = facade_with(backend);
        f.load_sample_jobs();
        f.handle_registration(&form()).await.unwrap();

        assert_eq!(f.apply_to_job(1).await, ApplyOutcome::Failed);
        assert!(!f.overlays().is_loading());
        assert!(html(&f).contains("Error submitting application"));
        assert_eq!(loading_events(&f), (2, 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_declined_application_notifies_failure() {
        let backend = Arc::new(FakeBackend {
            decline_applications: true,
            ..Default::default()
        });
        let f = facade_with(backend);
        f.load_sample_jobs();
        f.handle_registration(&form()).await.unwrap();

        assert!(matches!(f.apply_to_job(1).await, ApplyOutcome::Declined(_)));
        assert!(html(&f).contains("Application failed. Please try again."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_apply_is_rejected_while_pending() {
        let backend = Arc::new(FakeBackend::default());
        let f = facade_with(backend.clone());
        f.load_sample_jobs();
        f.handle_registration(&form()).await.unwrap();

        let (first, second) = tokio::join!(f.apply_to_job(1), f.apply_to_job(2));
        assert!(matches!(first, ApplyOutcome::Submitted(_)));
        assert_eq!(second, ApplyOutcome::Busy);
        assert_eq!(backend.applications.load(Ordering::SeqCst), 1);
        assert!(html(&f).contains(BUSY_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_filters_and_rerenders() {
        let f = facade_with(Arc::new(SimulatedBackend::default()));
        f.load_sample_jobs();

        let criteria = SearchCriteria {
            province: Some("kzn".into()),
            ..Default::default()
        };
        assert_eq!(f.search_jobs(&criteria).await, Some(1));
        assert_eq!(f.doc().lock().count_class("job-card"), 1);
        let page = html(&f);
        assert!(page.contains("Searching for matching jobs..."));
        assert!(page.contains("Found 1 matching jobs!"));
    }

    #[tokio::test]
    async fn test_save_job_toggles() {
        let f = facade_with(Arc::new(SimulatedBackend::default()));
        f.load_sample_jobs();
        assert_eq!(f.save_job(3), Some(true));
        assert_eq!(f.saved_jobs(), vec![3]);
        assert_eq!(f.save_job(3), Some(false));
        assert!(f.saved_jobs().is_empty());
        assert_eq!(f.save_job(42), None);
    }

    #[tokio::test]
    async fn test_select_plan_opens_modal_and_presets_plan() {
        let f = facade_with(Arc::new(SimulatedBackend::default()));
        assert!(f.select_plan(Plan::Enterprise));
        assert_eq!(modal_style(&f).as_deref(), Some("display: block"));
        let plan = f
            .doc()
            .lock()
            .element_by_id(PLAN_FIELD_ID)
            .and_then(|el| el.attr_value("value").map(str::to_string));
        assert_eq!(plan.as_deref(), Some("enterprise"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_counters_reach_targets() {
        let f = facade_with(Arc::new(SimulatedBackend::default()));
        assert_eq!(f.start_counters(), STAT_COUNTERS.len());

        tokio::time::sleep(Duration::from_millis(2100)).await;
        let doc = f.doc().lock();
        for (id, target, _) in STAT_COUNTERS {
            assert_eq!(
                doc.element_by_id(id).unwrap().text_content(),
                target.to_string(),
                "counter #{id}"
            );
        }
    }

    #[tokio::test]
    async fn test_scroll_sets_parallax_on_hero() {
        let f = facade_with(Arc::new(SimulatedBackend::default()));
        assert!(f.handle_scroll(300.0));
        let html = html(&f);
        assert!(html.contains("transform: translateY(150px)"));
    }
}
