//! Transient UI state: loading overlay, modals, error banners and
//! notifications around asynchronous actions.
//!
//! Rules:
//! - The loading overlay lives in a fixed identity slot per façade. Showing it
//!   again replaces the message in place; it never stacks.
//! - Modals are independent: each owns its node and its close control.
//! - Banners and notifications expire after the configured TTL (5 s by
//!   default). Early dismissal cancels the expiry timer, and removal is
//!   idempotent either way.
//! - `LoadingGuard` hides the overlay on drop, so every exit path of an
//!   action releases it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::ui::dom::{Element, NodeId, SharedDocument};
use crate::ui::views;

pub const DEFAULT_TRANSIENT_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "check-circle",
            NotificationKind::Error => "exclamation-circle",
            NotificationKind::Warning => "exclamation-triangle",
            NotificationKind::Info => "info-circle",
        }
    }
}

/// Transient nodes this controller mounted, with their pending expiry timer.
/// Anything not in the map is page structure and cannot be dismissed.
type TransientMap = Arc<Mutex<HashMap<NodeId, Option<AbortHandle>>>>;

fn lock_transient(map: &TransientMap) -> MutexGuard<'_, HashMap<NodeId, Option<AbortHandle>>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Overlay controller bound to one document and one loading slot.
#[derive(Clone)]
pub struct Overlays {
    doc: SharedDocument,
    loading_slot: &'static str,
    ttl: Duration,
    transient: TransientMap,
}

impl Overlays {
    pub fn new(doc: SharedDocument, loading_slot: &'static str, ttl: Duration) -> Self {
        Self {
            doc,
            loading_slot,
            ttl,
            transient: Arc::default(),
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    pub fn show_loading(&self, message: &str) -> NodeId {
        let slot = self.loading_slot;
        self.doc.with(|doc| match doc.mounted_with_dom_id(slot) {
            Some(id) => {
                doc.replace(id, views::loading(slot, message));
                id
            }
            None => doc.append(views::loading(slot, message)),
        })
    }

    /// Returns `false` when no overlay was showing.
    pub fn hide_loading(&self) -> bool {
        let slot = self.loading_slot;
        self.doc.with(|doc| match doc.mounted_with_dom_id(slot) {
            Some(id) => doc.remove(id),
            None => false,
        })
    }

    pub fn is_loading(&self) -> bool {
        self.doc.lock().mounted_with_dom_id(self.loading_slot).is_some()
    }

    /// Shows the loading overlay for as long as the returned guard lives.
    pub fn loading(&self, message: &str) -> LoadingGuard {
        self.show_loading(message);
        LoadingGuard {
            overlays: self.clone(),
        }
    }

    pub fn show_modal(&self, title: &str, body: Element) -> NodeId {
        let id = self.show_panel(|id| views::modal(id, title, body));
        debug!("Modal {id} shown: {title}");
        id
    }

    /// Mounts a dismissible element that stays until the user closes it.
    pub fn show_panel(&self, build: impl FnOnce(NodeId) -> Element) -> NodeId {
        let mut transient = lock_transient(&self.transient);
        let id = self.doc.with(|doc| {
            let id = doc.mount(build);
            doc.stamp_created_at(id);
            id
        });
        transient.insert(id, None);
        id
    }

    pub fn show_error(&self, message: &str) -> NodeId {
        let id = self.show_panel(|id| views::error_banner(id, message));
        self.schedule_expiry(id);
        id
    }

    pub fn show_notification(&self, message: &str, kind: NotificationKind) -> NodeId {
        let id = self.show_panel(|id| views::notification(id, message, kind));
        self.schedule_expiry(id);
        id
    }

    /// Explicit user dismissal. Only nodes this controller mounted as
    /// transient are removed; page structure and the loading slot are not.
    pub fn dismiss(&self, id: NodeId) -> bool {
        let Some(timer) = lock_transient(&self.transient).remove(&id) else {
            return false;
        };
        if let Some(timer) = timer {
            timer.abort();
        }
        self.doc.with(|doc| doc.remove(id))
    }

    /// Number of expiry timers still pending.
    pub fn pending_timers(&self) -> usize {
        lock_transient(&self.transient)
            .values()
            .filter(|t| t.is_some())
            .count()
    }

    fn schedule_expiry(&self, id: NodeId) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No runtime available; node {id} will stay until dismissed");
            return;
        };

        let doc = self.doc.clone();
        let transient = Arc::clone(&self.transient);
        let ttl = self.ttl;

        // Held across the spawn so the task cannot deregister before it is registered.
        let mut pending = lock_transient(&self.transient);
        let task = handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            lock_transient(&transient).remove(&id);
            if doc.with(|d| d.remove(id)) {
                debug!("Node {id} expired after {}ms", ttl.as_millis());
            }
        });
        match pending.get_mut(&id) {
            Some(slot) => *slot = Some(task.abort_handle()),
            // Dismissed before the timer was armed.
            None => task.abort(),
        }
    }
}

/// Scoped ownership of the loading overlay.
#[must_use = "the loading overlay is hidden as soon as the guard is dropped"]
pub struct LoadingGuard {
    overlays: Overlays,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.overlays.hide_loading();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::dom::{Document, Mutation};

    fn overlays() -> Overlays {
        Overlays::new(
            SharedDocument::new(Document::new()),
            "aiLoading",
            DEFAULT_TRANSIENT_TTL,
        )
    }

    fn count(ov: &Overlays, class: &str) -> usize {
        ov.document().lock().count_class(class)
    }

    #[test]
    fn test_notification_icons() {
        assert_eq!(NotificationKind::Success.icon(), "check-circle");
        assert_eq!(NotificationKind::Error.icon(), "exclamation-circle");
        assert_eq!(NotificationKind::Warning.icon(), "exclamation-triangle");
        assert_eq!(NotificationKind::Info.icon(), "info-circle");
    }

    #[test]
    fn test_show_loading_twice_replaces_message_in_place() {
        let ov = overlays();
        let first = ov.show_loading("one");
        let second = ov.show_loading("two");
        assert_eq!(first, second);
        assert_eq!(count(&ov, "ai-loading"), 1);
        let doc = ov.document().lock();
        assert_eq!(doc.element_by_id("aiLoading").unwrap().text_content(), "two");
    }

    #[test]
    fn test_hide_loading_without_overlay_is_noop() {
        let ov = overlays();
        assert!(!ov.hide_loading());
        ov.show_loading("busy");
        assert!(ov.hide_loading());
        assert!(!ov.hide_loading());
    }

    #[test]
    fn test_loading_guard_releases_on_drop() {
        let ov = overlays();
        {
            let _guard = ov.loading("working");
            assert!(ov.is_loading());
        }
        assert!(!ov.is_loading());
    }

    #[test]
    fn test_loading_guard_releases_on_early_return() {
        fn run(ov: &Overlays, fail: bool) -> Result<(), &'static str> {
            let _guard = ov.loading("working");
            if fail {
                return Err("boom");
            }
            Ok(())
        }
        let ov = overlays();
        assert!(run(&ov, true).is_err());
        assert!(!ov.is_loading());
        assert!(run(&ov, false).is_ok());
        assert!(!ov.is_loading());
    }

    #[test]
    fn test_modals_coexist_and_close_independently() {
        let ov = overlays();
        let a = ov.show_modal("A", Element::new("p"));
        let b = ov.show_modal("B", Element::new("p"));
        assert_eq!(count(&ov, "ai-modal"), 2);
        assert!(ov.dismiss(a));
        assert_eq!(count(&ov, "ai-modal"), 1);
        assert!(ov.document().lock().contains(b));
    }

    #[test]
    fn test_dismiss_leaves_page_structure_and_loading_slot() {
        let ov = overlays();
        let grid = ov
            .document()
            .with(|d| d.append(Element::new("div").id("jobsGrid")));
        let loading = ov.show_loading("busy");

        assert!(!ov.dismiss(grid));
        assert!(!ov.dismiss(loading));

        let doc = ov.document().lock();
        assert!(doc.contains(grid));
        assert!(doc.contains(loading));
    }

    #[test]
    fn test_transient_elements_carry_creation_time() {
        let ov = overlays();
        ov.show_modal("Results", Element::new("p"));
        ov.show_notification("Saved", NotificationKind::Success);
        assert_eq!(ov.document().lock().to_html().matches("data-created-at=\"").count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_banner_expires_after_ttl() {
        let ov = overlays();
        let id = ov.show_error("Failed");

        tokio::time::sleep(Duration::from_millis(4999)).await;
        assert!(ov.document().lock().contains(id), "still visible before 5s");

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!ov.document().lock().contains(id), "gone after 5s");
        assert_eq!(ov.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_dismissal_cancels_timer() {
        let ov = overlays();
        let id = ov.show_notification("Saved", NotificationKind::Success);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(ov.dismiss(id));
        assert_eq!(ov.pending_timers(), 0);

        tokio::time::sleep(Duration::from_millis(6000)).await;
        let removals = ov
            .document()
            .lock()
            .journal()
            .filter(|m| matches!(m, Mutation::Removed(r, _) if *r == id))
            .count();
        assert_eq!(removals, 1, "dismissed banner must be removed exactly once");
        assert!(!ov.dismiss(id), "second dismissal is a no-op");
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_banner_expires_on_its_own_timer() {
        let ov = overlays();
        let first = ov.show_error("first");
        tokio::time::sleep(Duration::from_millis(3000)).await;
        let second = ov.show_error("second");

        tokio::time::sleep(Duration::from_millis(2001)).await;
        let doc = ov.document().lock();
        assert!(!doc.contains(first));
        assert!(doc.contains(second), "later banner must outlive the earlier one");
    }

    #[test]
    fn test_banner_without_runtime_stays_until_dismissed() {
        let ov = overlays();
        let id = ov.show_error("offline");
        assert_eq!(ov.pending_timers(), 0);
        assert!(ov.dismiss(id));
    }
}
