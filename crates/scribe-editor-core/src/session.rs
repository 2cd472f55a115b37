//! The editing session: mode transitions, focus/blur/key routing, and the
//! blur-triggered diff cycle.
//!
//! A session binds one surface to one remote document. The store and bus
//! are injected dependencies; the session never reaches for globals. All
//! session state is mutated inside synchronous calls — in particular the
//! focus reference is always fully overwritten (old marker cleared, new one
//! set) before any suspension point, so interleaved async cycles never see
//! it half-updated.
//!
//! Teardown releases the store subscription unconditionally, whether or not
//! editing was ever entered. A diff cycle already in flight at teardown is
//! allowed to complete; only new events stop being routed.

use std::sync::Arc;

use scribe_api::{DocumentHandle, DocumentStructure, ElementKind, SessionConfig};
use tracing::{debug, warn};

use crate::caret;
use crate::diff::{changed_lines, select};
use crate::emit::emit_update;
use crate::error::SessionError;
use crate::events::{classify, KeyCapture, KeyInput};
use crate::format;
use crate::ids::IdProvider;
use crate::store::{CommandBus, DocumentStore, StoreUpdate, SubscriptionId};
use crate::structure::{build_line, build_structure, render_structure};
use crate::surface::{NodeIndex, Surface};

/// Session mode. Starts in `Viewing`; `Editing` is entered by an explicit
/// host action and left only at teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Viewing,
    Editing,
}

/// One editing session over one remote document.
pub struct EditSession<S: DocumentStore, B: CommandBus, I: IdProvider> {
    config: SessionConfig,
    store: S,
    bus: B,
    ids: I,
    surface: Surface,
    mode: SessionMode,
    focused: Option<NodeIndex>,
    subscription: Option<SubscriptionId>,
}

impl<S: DocumentStore, B: CommandBus, I: IdProvider> EditSession<S, B, I> {
    /// Attach a session: fetch the document, render it read-only, and
    /// subscribe to its change notifications.
    ///
    /// Any failure here yields an error and no session — there is no
    /// partially attached state.
    pub async fn attach(
        config: SessionConfig,
        store: S,
        bus: B,
        ids: I,
    ) -> Result<Self, SessionError> {
        let structure = store.document(&config.document).await?;
        let mut surface = Surface::new();
        render_structure(&structure, &mut surface, false);

        let subscription = store.subscribe(
            &config.document,
            Arc::new(|update: &StoreUpdate| {
                debug!(
                    document = %update.document,
                    key = %update.key,
                    removed = update.value.is_none(),
                    "document change notification"
                );
            }),
        )?;

        debug!(document = %config.document, lines = surface.len(), "session attached");
        Ok(Self {
            config,
            store,
            bus,
            ids,
            surface,
            mode: SessionMode::Viewing,
            focused: None,
            subscription: Some(subscription),
        })
    }

    /// Attach from the host's JSON configuration string.
    pub async fn attach_json(raw: &str, store: S, bus: B, ids: I) -> Result<Self, SessionError> {
        let config = SessionConfig::from_json(raw)?;
        Self::attach(config, store, bus, ids).await
    }

    /// Tear the session down: clear focus state and release the store
    /// subscription. Safe to call from any mode, and idempotent.
    pub fn detach(&mut self) {
        self.mode = SessionMode::Viewing;
        self.focused = None;
        self.surface.clear_focus();
        self.surface.set_all_editable(false);
        if let Some(subscription) = self.subscription.take() {
            self.store.unsubscribe(&self.config.document, subscription);
            debug!(document = %self.config.document, "session detached");
        }
    }

    /// Enter edit mode: mark every line editable and move focus to the last
    /// line with the caret at its end. No-op when already editing or after
    /// teardown started.
    pub fn enter_edit(&mut self) {
        if self.mode == SessionMode::Editing {
            return;
        }
        self.mode = SessionMode::Editing;
        self.surface.set_all_editable(true);
        if let Some(last) = self.surface.last() {
            self.surface.focus(last);
            caret::place_at_end(&mut self.surface, last);
            self.focused = Some(last);
        }
        debug!(document = %self.config.document, "edit mode entered");
    }

    /// Route a focus-gain event onto a line node.
    ///
    /// Outside `Editing` this is a no-op (no listeners are attached).
    pub fn handle_focus_in(&mut self, idx: NodeIndex) -> Result<(), SessionError> {
        if self.mode != SessionMode::Editing {
            return Ok(());
        }
        if !self.surface.focus(idx) {
            return Err(SessionError::StaleNode(idx.index()));
        }
        self.focused = Some(idx);
        debug!(position = idx.index(), "line focused");
        Ok(())
    }

    /// Route a focus-loss event: build the blurred line's structure, diff it
    /// against the store, and publish one batched update command when
    /// anything changed.
    ///
    /// Returns whether a command was published. A store-read failure aborts
    /// the cycle with an error and publishes nothing; no retry is attempted
    /// here.
    pub async fn handle_focus_out(&mut self, idx: NodeIndex) -> Result<bool, SessionError> {
        if self.mode != SessionMode::Editing {
            return Ok(false);
        }
        if self.surface.get(idx).is_none() {
            return Err(SessionError::StaleNode(idx.index()));
        }
        let Some(scoped) = build_line(&self.surface, idx) else {
            warn!(position = idx.index(), "blurred line has no identifier, skipping diff");
            return Ok(false);
        };

        let changed = changed_lines(&scoped, &self.config.document, &self.store).await?;
        if changed.is_empty() {
            debug!(position = idx.index(), "blurred line unchanged, nothing to publish");
            return Ok(false);
        }

        emit_update(
            &self.store,
            &self.bus,
            &self.config.document,
            select(&scoped, &changed),
        )
        .await?;
        Ok(true)
    }

    /// Classify a key event. Outside `Editing` every key passes through.
    pub fn handle_key(&self, input: &KeyInput) -> KeyCapture {
        if self.mode != SessionMode::Editing {
            return KeyCapture::Pass;
        }
        classify(input)
    }

    /// Convert the focused line to `kind` (an `Editing` self-transition), or
    /// create a fresh line of that kind when nothing is focused.
    ///
    /// Returns the resulting node, or `None` outside `Editing`.
    pub fn format_focused(&mut self, kind: ElementKind) -> Option<NodeIndex> {
        if self.mode != SessionMode::Editing {
            return None;
        }
        let idx = format::convert_focused(&mut self.surface, self.focused, kind, &mut self.ids);
        self.focused = Some(idx);
        Some(idx)
    }

    /// Explicit create-line action: append an empty editable line and focus
    /// it. Returns `None` outside `Editing`.
    pub fn create_line(&mut self, kind: ElementKind) -> Option<NodeIndex> {
        if self.mode != SessionMode::Editing {
            return None;
        }
        let idx = format::create_line(&mut self.surface, kind, &mut self.ids);
        self.focused = Some(idx);
        Some(idx)
    }

    /// Build the normalized structure of the whole surface.
    pub fn structure(&self) -> DocumentStructure {
        build_structure(&self.surface)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Mutable surface access for hosts mirroring user edits.
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// The session's reference to the currently focused line, if any.
    pub fn focused(&self) -> Option<NodeIndex> {
        self.focused
    }

    pub fn document(&self) -> &DocumentHandle {
        &self.config.document
    }
}

impl<S: DocumentStore, B: CommandBus, I: IdProvider> Drop for EditSession<S, B, I> {
    fn drop(&mut self) {
        // Scoped release: the subscription never outlives the session even
        // when the host forgets to detach.
        if let Some(subscription) = self.subscription.take() {
            self.store.unsubscribe(&self.config.document, subscription);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caret;
    use crate::ids::SequentialIds;
    use crate::store::{MemoryStore, RecordingBus};
    use scribe_api::{Command, DocumentVersion, LineId, LineRecord};

    struct FailingIds;

    impl IdProvider for FailingIds {
        fn generate(&mut self) -> Option<LineId> {
            None
        }
    }

    fn record(id: &str, kind: ElementKind, content: &str, order: usize) -> LineRecord {
        LineRecord::new(LineId::from(id), kind, content, order)
    }

    fn seeded_store(records: &[LineRecord], version: DocumentVersion) -> (MemoryStore, DocumentHandle) {
        let store = MemoryStore::new();
        let handle = DocumentHandle::from("page/alpha");
        let structure: DocumentStructure = records.iter().cloned().collect();
        store.seed(&handle, &structure, version);
        (store, handle)
    }

    async fn attached(
        records: &[LineRecord],
        version: DocumentVersion,
    ) -> (
        EditSession<MemoryStore, RecordingBus, SequentialIds>,
        MemoryStore,
        RecordingBus,
        DocumentHandle,
    ) {
        let (store, handle) = seeded_store(records, version);
        let bus = RecordingBus::new();
        let session = EditSession::attach(
            SessionConfig::new(handle.clone()),
            store.clone(),
            bus.clone(),
            SequentialIds::new(),
        )
        .await
        .unwrap();
        (session, store, bus, handle)
    }

    #[tokio::test]
    async fn test_attach_renders_document_read_only() {
        let (session, store, _bus, handle) = attached(
            &[
                record("a", ElementKind::H1, "Title", 0),
                record("b", ElementKind::Paragraph, "Body", 1),
            ],
            DocumentVersion(1),
        )
        .await;

        assert_eq!(session.mode(), SessionMode::Viewing);
        let contents: Vec<&str> = session
            .surface()
            .iter()
            .map(|(_, n)| n.content.as_str())
            .collect();
        assert_eq!(contents, vec!["Title", "Body"]);
        assert!(session.surface().iter().all(|(_, n)| !n.editable));
        assert_eq!(store.subscriber_count(&handle), 1);
    }

    #[tokio::test]
    async fn test_attach_unknown_document_fails_cleanly() {
        let store = MemoryStore::new();
        let result = EditSession::attach(
            SessionConfig::new(DocumentHandle::from("missing")),
            store.clone(),
            RecordingBus::new(),
            SequentialIds::new(),
        )
        .await;
        assert!(matches!(result, Err(SessionError::Store(_))));
    }

    #[tokio::test]
    async fn test_attach_json_rejects_malformed_config() {
        let store = MemoryStore::new();
        let result = EditSession::attach_json(
            "{not json",
            store,
            RecordingBus::new(),
            SequentialIds::new(),
        )
        .await;
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[tokio::test]
    async fn test_enter_edit_focuses_last_line_caret_at_end() {
        let (mut session, _store, _bus, _handle) = attached(
            &[
                record("a", ElementKind::Paragraph, "foo", 0),
                record("b", ElementKind::Paragraph, "bar", 1),
            ],
            DocumentVersion(1),
        )
        .await;

        session.enter_edit();
        assert_eq!(session.mode(), SessionMode::Editing);
        assert!(session.surface().iter().all(|(_, n)| n.editable));

        let last = session.focused().unwrap();
        assert_eq!(
            session.surface().get(last).unwrap().id,
            Some(LineId::from("b"))
        );
        assert_eq!(caret::measure(session.surface(), last), 3);
    }

    #[tokio::test]
    async fn test_changed_line_blur_publishes_one_batched_command() {
        let (mut session, _store, bus, handle) = attached(
            &[
                record("a", ElementKind::Paragraph, "foo", 0),
                record("b", ElementKind::Paragraph, "bar", 1),
            ],
            DocumentVersion(7),
        )
        .await;
        session.enter_edit();

        let b = session.surface().find(&LineId::from("b")).unwrap();
        session.handle_focus_in(b).unwrap();
        session.surface_mut().get_mut(b).unwrap().content = "baz".into();

        let emitted = session.handle_focus_out(b).await.unwrap();
        assert!(emitted);

        let published = bus.published();
        assert_eq!(published.len(), 1);
        let Command::UpdateLines(update) = &published[0] else {
            panic!("expected an update command");
        };
        assert_eq!(update.document_version, DocumentVersion(7));
        assert_eq!(update.document, handle);
        assert_eq!(update.changed_lines.len(), 1);
        assert_eq!(
            update.changed_lines.get(&LineId::from("b")).unwrap().content,
            "baz"
        );
    }

    #[tokio::test]
    async fn test_unchanged_blur_publishes_nothing() {
        let (mut session, _store, bus, _handle) = attached(
            &[record("a", ElementKind::Paragraph, "foo", 0)],
            DocumentVersion(1),
        )
        .await;
        session.enter_edit();

        let a = session.surface().find(&LineId::from("a")).unwrap();
        session.handle_focus_in(a).unwrap();
        let emitted = session.handle_focus_out(a).await.unwrap();

        assert!(!emitted);
        assert!(bus.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_aborts_cycle_without_command() {
        let (mut session, store, bus, handle) = attached(
            &[record("a", ElementKind::Paragraph, "foo", 0)],
            DocumentVersion(1),
        )
        .await;
        session.enter_edit();

        let a = session.surface().find(&LineId::from("a")).unwrap();
        session.surface_mut().get_mut(a).unwrap().content = "edited".into();
        store.drop_document(&handle);

        let result = session.handle_focus_out(a).await;
        assert!(matches!(result, Err(SessionError::Store(_))));
        assert!(bus.is_empty());
    }

    #[tokio::test]
    async fn test_format_scenario_paragraph_to_heading() {
        let (mut session, _store, _bus, _handle) = attached(
            &[record("x1", ElementKind::Paragraph, "Hello", 0)],
            DocumentVersion(1),
        )
        .await;
        session.enter_edit();

        let idx = session.format_focused(ElementKind::H1).unwrap();
        let node = session.surface().get(idx).unwrap();
        assert_eq!(node.kind, ElementKind::H1);
        assert_eq!(node.id, Some(LineId::from("x1")));
        assert_eq!(node.content, "Hello");
        assert!(node.focused);
    }

    #[tokio::test]
    async fn test_format_without_focus_inserts_fresh_line() {
        let (mut session, _store, _bus, _handle) =
            attached(&[], DocumentVersion(1)).await;
        session.enter_edit();
        assert!(session.focused().is_none());

        let idx = session.format_focused(ElementKind::H2).unwrap();
        let node = session.surface().get(idx).unwrap();
        assert_eq!(node.kind, ElementKind::H2);
        assert_eq!(node.content, "");
        assert!(node.focused);
    }

    #[tokio::test]
    async fn test_key_routing_gated_on_mode() {
        let (mut session, _store, _bus, _handle) = attached(
            &[record("a", ElementKind::Paragraph, "foo", 0)],
            DocumentVersion(1),
        )
        .await;

        let enter = KeyInput::plain("Enter");
        assert_eq!(session.handle_key(&enter), KeyCapture::Pass);

        session.enter_edit();
        assert_eq!(session.handle_key(&enter), KeyCapture::SplitLine);
        assert_eq!(
            session.handle_key(&KeyInput::plain("o").ctrl()),
            KeyCapture::Suppress
        );
        assert_eq!(session.handle_key(&KeyInput::plain("a")), KeyCapture::Pass);
    }

    #[tokio::test]
    async fn test_detach_releases_subscription_and_silences_events() {
        let (mut session, store, _bus, handle) = attached(
            &[record("a", ElementKind::Paragraph, "foo", 0)],
            DocumentVersion(1),
        )
        .await;
        session.enter_edit();
        session.detach();

        assert_eq!(store.subscriber_count(&handle), 0);
        assert_eq!(session.mode(), SessionMode::Viewing);

        // A simulated focusin after teardown changes no focus state.
        let a = session.surface().find(&LineId::from("a")).unwrap();
        session.handle_focus_in(a).unwrap();
        assert!(session.focused().is_none());
        assert!(session.surface().focused().is_none());

        // Detach is idempotent.
        session.detach();
        assert_eq!(store.subscriber_count(&handle), 0);
    }

    #[tokio::test]
    async fn test_detach_without_editing_still_unsubscribes() {
        let (mut session, store, _bus, handle) = attached(
            &[record("a", ElementKind::Paragraph, "foo", 0)],
            DocumentVersion(1),
        )
        .await;
        session.detach();
        assert_eq!(store.subscriber_count(&handle), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let (session, store, _bus, handle) = attached(
            &[record("a", ElementKind::Paragraph, "foo", 0)],
            DocumentVersion(1),
        )
        .await;
        assert_eq!(store.subscriber_count(&handle), 1);
        drop(session);
        assert_eq!(store.subscriber_count(&handle), 0);
    }

    #[tokio::test]
    async fn test_untracked_line_blur_is_skipped() {
        let (store, handle) = seeded_store(&[], DocumentVersion(1));
        let bus = RecordingBus::new();
        let mut session = EditSession::attach(
            SessionConfig::new(handle.clone()),
            store.clone(),
            bus.clone(),
            FailingIds,
        )
        .await
        .unwrap();
        session.enter_edit();

        let idx = session.create_line(ElementKind::Paragraph).unwrap();
        assert!(session.surface().get(idx).unwrap().id.is_none());
        session.surface_mut().get_mut(idx).unwrap().content = "orphan".into();

        let emitted = session.handle_focus_out(idx).await.unwrap();
        assert!(!emitted);
        assert!(bus.is_empty());
    }

    #[tokio::test]
    async fn test_stale_handle_is_an_error() {
        let (mut session, _store, _bus, _handle) = attached(
            &[record("a", ElementKind::Paragraph, "foo", 0)],
            DocumentVersion(1),
        )
        .await;
        session.enter_edit();

        let stale = NodeIndex(9);
        assert!(matches!(
            session.handle_focus_in(stale),
            Err(SessionError::StaleNode(9))
        ));
        assert!(matches!(
            session.handle_focus_out(stale).await,
            Err(SessionError::StaleNode(9))
        ));
    }

    #[tokio::test]
    async fn test_structure_reflects_surface_edits() {
        let (mut session, _store, _bus, _handle) = attached(
            &[record("a", ElementKind::Paragraph, "foo", 0)],
            DocumentVersion(1),
        )
        .await;
        session.enter_edit();
        session.format_focused(ElementKind::Quote);

        let structure = session.structure();
        assert_eq!(
            structure.get(&LineId::from("a")).unwrap().kind,
            ElementKind::Quote
        );
    }
}
