//! The "currently inspected entity" state machine.
//!
//! ```text
//! Idle ──request──▶ Loading(ref) ──ok──▶ Ready(detail)   (drawer opens)
//!                        │
//!                        └──err──▶ Failed(ref)           (drawer untouched)
//! Ready/Failed ──request──▶ Loading(ref)
//! ```
//!
//! [`SelectionController::request`] is the single entry point for both
//! search selections and map clicks. It switches to `Loading` immediately
//! and spawns the detail fetch. Fetch results come back as
//! [`DetailCompletion`] messages tagged with the sequence number of the
//! request that issued them; only the completion of the most recent
//! request is applied, so a slow earlier fetch can never overwrite a later
//! selection. In-flight fetches are not cancelled. A fetch task that dies
//! without a result still reports back, as a failure.
//!
//! Drawer visibility is tracked separately from the state: closing the
//! drawer keeps a `Ready` detail, and [`SelectionController::open_drawer`]
//! shows it again without refetching.

use std::sync::Arc;

use lone_star_ledger_client::{ClientError, DataService};
use lone_star_ledger_models::{EntityDetail, EntityRef};
use tokio::sync::{mpsc, watch};

/// Where the current selection is in its fetch lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectionState {
    /// Nothing has been selected yet.
    #[default]
    Idle,
    /// The detail fetch for this entity is outstanding.
    Loading(EntityRef),
    /// The detail was fetched.
    Ready(EntityDetail),
    /// The detail fetch failed.
    Failed(EntityRef),
}

impl SelectionState {
    /// The entity this state concerns, if any.
    #[must_use]
    pub fn entity(&self) -> Option<EntityRef> {
        match self {
            Self::Idle => None,
            Self::Loading(entity) | Self::Failed(entity) => Some(entity.clone()),
            Self::Ready(detail) => Some(detail.entity_ref()),
        }
    }
}

/// What the rendering layer observes: the state plus drawer visibility.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionView {
    /// Fetch lifecycle of the current selection.
    pub state: SelectionState,
    /// Whether the detail drawer is shown.
    pub drawer_visible: bool,
}

/// Result of one detail fetch, tagged with the issuing request.
#[derive(Debug)]
pub struct DetailCompletion {
    /// Sequence number of the request that issued the fetch.
    pub seq: u64,
    /// The entity that was requested.
    pub entity: EntityRef,
    /// The fetch outcome.
    pub result: Result<EntityDetail, ClientError>,
}

/// Owns [`SelectionState`] and drawer visibility. Nothing else writes
/// them.
pub struct SelectionController {
    service: Arc<dyn DataService>,
    view: SelectionView,
    latest_seq: u64,
    in_flight: usize,
    completions_tx: mpsc::UnboundedSender<DetailCompletion>,
    completions_rx: mpsc::UnboundedReceiver<DetailCompletion>,
    watchers: watch::Sender<SelectionView>,
}

impl SelectionController {
    /// Creates an idle controller fetching details from `service`.
    #[must_use]
    pub fn new(service: Arc<dyn DataService>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (watchers, _) = watch::channel(SelectionView::default());
        Self {
            service,
            view: SelectionView::default(),
            latest_seq: 0,
            in_flight: 0,
            completions_tx,
            completions_rx,
            watchers,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.view.state
    }

    /// Whether the detail drawer is shown.
    #[must_use]
    pub const fn drawer_visible(&self) -> bool {
        self.view.drawer_visible
    }

    /// Snapshot of state and drawer visibility.
    #[must_use]
    pub fn view(&self) -> SelectionView {
        self.view.clone()
    }

    /// Whether the most recent request is still outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.view.state, SelectionState::Loading(_))
    }

    /// Sequence number of the most recent request (0 before any).
    #[must_use]
    pub const fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Number of fetches whose completion has not been received yet,
    /// including superseded ones.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Subscribes to state changes. Receivers observe; they cannot mutate.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SelectionView> {
        self.watchers.subscribe()
    }

    /// Selects `entity`: switches to `Loading` now and spawns the detail
    /// fetch. Returns the request's sequence number.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn request(&mut self, entity: EntityRef) -> u64 {
        self.latest_seq += 1;
        let seq = self.latest_seq;
        log::info!("Selecting {} ({}) as request #{seq}", entity.name, entity.id);

        self.view.state = SelectionState::Loading(entity.clone());
        self.publish();

        let service = Arc::clone(&self.service);
        let guard = CompletionGuard {
            seq,
            entity,
            tx: Some(self.completions_tx.clone()),
        };
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = service.school_detail(&guard.entity.id).await;
            guard.complete(result);
        });

        seq
    }

    /// Applies a fetch result. Returns `false` if the completion was stale
    /// and discarded.
    pub fn apply(&mut self, completion: DetailCompletion) -> bool {
        let DetailCompletion {
            seq,
            entity,
            result,
        } = completion;

        if seq != self.latest_seq {
            log::debug!(
                "Discarding stale detail for {} (request #{seq}, latest #{})",
                entity.id,
                self.latest_seq
            );
            return false;
        }

        match result {
            Ok(detail) if detail.id == entity.id => {
                log::debug!("Loaded detail for {} ({})", detail.name, detail.id);
                self.view.state = SelectionState::Ready(detail);
                self.view.drawer_visible = true;
            }
            Ok(detail) => {
                log::error!(
                    "Detail fetch for {} returned entity {} instead",
                    entity.id,
                    detail.id
                );
                self.view.state = SelectionState::Failed(entity);
            }
            Err(e) => {
                log::error!("Failed to fetch detail for {}: {e}", entity.id);
                self.view.state = SelectionState::Failed(entity);
            }
        }

        self.publish();
        true
    }

    /// Waits for the next fetch to finish and applies it. Returns `None`
    /// when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<bool> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.completions_rx.recv().await?;
        self.in_flight -= 1;
        Some(self.apply(completion))
    }

    /// Applies every completion that has already arrived, without
    /// waiting. Returns how many were applied (stale ones excluded).
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits until the most recent request has resolved to `Ready` or
    /// `Failed`.
    pub async fn settle(&mut self) {
        while self.is_loading() {
            if self.next_completion().await.is_none() {
                break;
            }
        }
    }

    /// Hides the drawer. The state, including any `Ready` detail, is kept.
    pub fn close_drawer(&mut self) {
        if self.view.drawer_visible {
            self.view.drawer_visible = false;
            self.publish();
        }
    }

    /// Shows the drawer again for an already-fetched detail. Never fetches.
    /// Returns whether the drawer is now visible.
    pub fn open_drawer(&mut self) -> bool {
        if !matches!(self.view.state, SelectionState::Ready(_)) {
            return false;
        }
        if !self.view.drawer_visible {
            self.view.drawer_visible = true;
            self.publish();
        }
        true
    }

    fn publish(&self) {
        self.watchers.send_replace(self.view.clone());
    }
}

/// Sends exactly one [`DetailCompletion`] per spawned fetch, even when the
/// task unwinds before finishing.
struct CompletionGuard {
    seq: u64,
    entity: EntityRef,
    tx: Option<mpsc::UnboundedSender<DetailCompletion>>,
}

impl CompletionGuard {
    fn complete(mut self, result: Result<EntityDetail, ClientError>) {
        if let Some(tx) = self.tx.take() {
            self.send(&tx, result);
        }
    }

    fn send(
        &self,
        tx: &mpsc::UnboundedSender<DetailCompletion>,
        result: Result<EntityDetail, ClientError>,
    ) {
        let completion = DetailCompletion {
            seq: self.seq,
            entity: self.entity.clone(),
            result,
        };
        if tx.send(completion).is_err() {
            log::debug!(
                "Selection controller dropped before request #{} completed",
                self.seq
            );
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            log::error!(
                "Detail fetch for {} (request #{}) ended without a result",
                self.entity.id,
                self.seq
            );
            self.send(
                &tx,
                Err(ClientError::Interrupted {
                    id: self.entity.id.clone(),
                }),
            );
        }
    }
}
