//! The sequence edit engine.
//!
//! [`SequenceEditor`] owns all editing-session state: the current
//! sequence, the known sequence list, the undo/redo history, selection,
//! and the latest validation findings.  Every mutating operation follows
//! the same shape: mark loading, call the backend, on success update
//! state and mirror it to the local snapshot store, on failure record a
//! human-readable error *and* return it, finally clear loading.  No
//! operation retries; retry is the caller's decision.
//!
//! # Concurrency model
//!
//! One logical editor per editing session.  State lives behind a std
//! `Mutex` whose guard is never held across an `await`: operations clone
//! what they need out, await the backend, then re-lock and apply the
//! result.  Two overlapping validations therefore resolve
//! last-write-wins, which is the intended (weak) ordering guarantee.
//!
//! # Observing state
//!
//! Consumers subscribe through a `tokio::sync::watch` channel; every
//! state change publishes a fresh [`EditorState`] clone.  The dual error
//! channel follows from this: failures land both in
//! [`EditorState::error`] for passive observers and in the returned
//! `Err` for callers that `await` the operation directly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use msc_core::{
    CreateSequenceRequest, HexDecodeRequest, HistoryRing, IdentifierSuggestion, Message,
    MessageDraft, MessagePayload, Sequence, SequencePatch, TransferError, ValidationResult,
};

use crate::application::fallback::{DecodeChain, DecodeOutcome};
use crate::application::optimistic::{classify_commit, CommitOutcome};
use crate::domain::config::EditorConfig;
use crate::infrastructure::api::{ApiError, DecodeApi, SequenceApi};
use crate::infrastructure::store::{DebouncedWriter, SnapshotStore, StoreError};

/// Error type for editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A backend call failed.
    #[error("backend request failed: {0}")]
    Api(#[from] ApiError),

    /// The operation needs a current sequence and none is loaded.
    #[error("no sequence is currently loaded")]
    NoCurrentSequence,

    /// The addressed sequence does not exist server-side.
    #[error("Sequence not found")]
    SequenceNotFound,

    /// The addressed message is not in the current sequence.
    #[error("message {0} not found in the current sequence")]
    MessageNotFound(String),

    /// Sequence creation was rejected.
    #[error("failed to create sequence: {0}")]
    Creation(String),

    /// An import document was malformed.
    #[error(transparent)]
    InvalidImport(#[from] TransferError),

    /// A local snapshot write failed.
    #[error("snapshot store failure: {0}")]
    Store(#[from] StoreError),

    /// Every decode strategy failed for the given hex.
    #[error("hex decode failed: {0}")]
    Decode(String),
}

/// Observable editor state, published on every change.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub current_sequence: Option<Sequence>,
    pub sequences: Vec<Sequence>,
    pub validation_results: Vec<ValidationResult>,
    pub suggestions: Vec<IdentifierSuggestion>,
    pub selected_message_index: Option<usize>,
    pub is_loading: bool,
    pub is_validating: bool,
    pub is_initialized: bool,
    /// Human-readable description of the most recent failure.
    pub error: Option<String>,
}

struct Inner {
    state: EditorState,
    history: HistoryRing,
}

/// The sequence edit engine.
pub struct SequenceEditor {
    api: Arc<dyn SequenceApi>,
    decoder: Arc<dyn DecodeApi>,
    store: Arc<SnapshotStore>,
    writer: DebouncedWriter,
    inner: Mutex<Inner>,
    watch_tx: watch::Sender<EditorState>,
}

impl SequenceEditor {
    /// Creates an editor over the given backend and snapshot store.
    ///
    /// Must run inside a tokio runtime: the debounced snapshot writer is
    /// spawned here.
    pub fn new(
        api: Arc<dyn SequenceApi>,
        decoder: Arc<dyn DecodeApi>,
        store: Arc<SnapshotStore>,
        config: &EditorConfig,
    ) -> Self {
        let writer = DebouncedWriter::spawn(
            store.clone(),
            Duration::from_millis(config.persist_debounce_ms),
        );
        let (watch_tx, _) = watch::channel(EditorState::default());
        Self {
            api,
            decoder,
            store,
            writer,
            inner: Mutex::new(Inner {
                state: EditorState::default(),
                history: HistoryRing::with_capacity(config.history_capacity),
            }),
            watch_tx,
        }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<EditorState> {
        self.watch_tx.subscribe()
    }

    /// Clones the current observable state.
    pub fn state(&self) -> EditorState {
        self.with_inner(|inner| inner.state.clone())
    }

    /// Whether an older history snapshot exists.
    pub fn can_undo(&self) -> bool {
        self.with_inner(|inner| inner.history.can_undo())
    }

    /// Whether a newer history snapshot exists.
    pub fn can_redo(&self) -> bool {
        self.with_inner(|inner| inner.history.can_redo())
    }

    /// Flushes pending snapshot writes and stops the writer task.
    pub async fn dispose(self) {
        self.writer.shutdown().await;
    }

    // ── Initialization ────────────────────────────────────────────────────────

    /// Restores persisted local state and merges in the remote sequence
    /// list.  Runs once; only after the restoration attempt does
    /// `is_initialized` flip to `true`.
    ///
    /// A remote listing failure degrades to local-only state rather than
    /// failing initialization: the editor must come up even when the
    /// backend is unreachable.
    pub async fn initialize(&self) -> Result<(), EditorError> {
        let local_sequences = self.store.load_sequences();
        let local_current = self.store.load_current();
        let local_index = self.store.load_selected_index();

        let remote = match self.api.list_sequences(None, None).await {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "sequence listing failed, starting from local snapshots");
                self.mutate(|inner| {
                    inner.state.error = Some(format!("failed to list sequences: {e}"));
                });
                Vec::new()
            }
        };

        // Remote entries win on id collision; local-only ones survive.
        let mut merged = remote;
        for local in local_sequences {
            if merged.iter().all(|s| s.id != local.id) {
                merged.push(local);
            }
        }

        self.mutate(|inner| {
            if inner.state.current_sequence.is_none() {
                if let Some(current) = local_current {
                    if merged.iter().all(|s| s.id != current.id) {
                        merged.push(current.clone());
                    }
                    inner.state.selected_message_index =
                        local_index.filter(|i| *i < current.messages.len());
                    inner.history.record(current.clone());
                    inner.state.current_sequence = Some(current);
                }
            }
            inner.state.sequences = merged;
            inner.state.is_initialized = true;
        });

        info!("editor initialized");
        Ok(())
    }

    // ── Sequence CRUD ─────────────────────────────────────────────────────────

    /// Creates a new sequence and makes it current.
    pub async fn create_sequence(
        &self,
        name: &str,
        protocol: &str,
        session_id: Option<&str>,
    ) -> Result<Sequence, EditorError> {
        self.set_loading(true);
        let request = CreateSequenceRequest {
            name: name.to_string(),
            protocol: protocol.to_string(),
            session_id: session_id.map(str::to_string),
        };

        match self.api.create_sequence(request).await {
            Ok(sequence) => {
                self.mutate(|inner| {
                    inner.state.sequences.push(sequence.clone());
                    inner.state.selected_message_index = None;
                    inner.state.validation_results.clear();
                    inner.state.suggestions.clear();
                    // A new sequence starts a fresh editing history.
                    inner.history.clear();
                    inner.history.record(sequence.clone());
                    inner.state.current_sequence = Some(sequence.clone());
                    inner.state.is_loading = false;
                    inner.state.error = None;
                });
                self.mirror_all(&sequence);
                Ok(sequence)
            }
            Err(e) => Err(self.fail(EditorError::Creation(e.to_string()))),
        }
    }

    /// Loads a sequence by id and makes it current.
    ///
    /// A missing sequence is a distinct outcome: the current sequence is
    /// left untouched and [`EditorError::SequenceNotFound`] is returned.
    /// Loading implies validating; the returned state never carries stale
    /// validation results.
    pub async fn load_sequence(&self, id: &str) -> Result<Sequence, EditorError> {
        self.set_loading(true);

        let sequence = match self.api.get_sequence(id).await {
            Ok(Some(sequence)) => sequence,
            Ok(None) => return Err(self.fail(EditorError::SequenceNotFound)),
            Err(e) => return Err(self.fail(e.into())),
        };

        self.mutate(|inner| {
            inner.state.selected_message_index = None;
            inner.state.validation_results.clear();
            inner.state.suggestions.clear();
            inner.history.clear();
            inner.history.record(sequence.clone());
            inner.state.current_sequence = Some(sequence.clone());
            upsert(&mut inner.state.sequences, &sequence);
            inner.state.is_loading = false;
            inner.state.error = None;
        });
        self.mirror_all(&sequence);

        let _ = self.validate_sequence().await;
        Ok(self
            .with_inner(|inner| inner.state.current_sequence.clone())
            .unwrap_or(sequence))
    }

    /// Deletes a sequence; if it was current, the editing session resets.
    pub async fn delete_sequence(&self, id: &str) -> Result<bool, EditorError> {
        self.set_loading(true);

        match self.api.delete_sequence(id).await {
            Ok(deleted) => {
                self.mutate(|inner| {
                    inner.state.sequences.retain(|s| s.id != id);
                    let was_current = inner
                        .state
                        .current_sequence
                        .as_ref()
                        .is_some_and(|s| s.id == id);
                    if was_current {
                        inner.state.current_sequence = None;
                        inner.state.selected_message_index = None;
                        inner.state.validation_results.clear();
                        inner.state.suggestions.clear();
                        inner.history.clear();
                    }
                    inner.state.is_loading = false;
                    inner.state.error = None;
                });
                let state = self.state();
                self.mirror_list(&state.sequences);
                if state.current_sequence.is_none() {
                    if let Err(e) = self.store.clear_current() {
                        warn!(error = %e, "failed to clear current-sequence snapshot");
                    }
                    self.mirror_selection(None);
                }
                Ok(deleted)
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    // ── Message operations ────────────────────────────────────────────────────

    /// Appends a message to the current sequence.
    ///
    /// Missing actors default to `"UE"` → `"gNB"` and missing data to an
    /// empty object.  When `position` is given the new message is moved
    /// there locally (the patch protocol itself only appends).  The newly
    /// added message becomes the selection, and revalidation runs before
    /// this call returns.
    pub async fn add_message(
        &self,
        draft: MessageDraft,
        position: Option<usize>,
    ) -> Result<Sequence, EditorError> {
        let current_id = self.require_current()?;
        self.set_loading(true);

        let payload = MessagePayload::from(&draft);
        match self.api.add_message(&current_id, payload).await {
            Ok(Some(mut updated)) => {
                let last = updated.messages.len().saturating_sub(1);
                let selected = match position {
                    Some(position) if position < last => {
                        let added = updated.messages.remove(last);
                        updated.messages.insert(position, added);
                        position
                    }
                    _ => last,
                };

                self.apply_updated_sequence(updated.clone(), Some(selected));
                let _ = self.validate_sequence().await;
                Ok(updated)
            }
            Ok(None) => Err(self.fail(EditorError::SequenceNotFound)),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Replaces the field data of one message, then revalidates.
    pub async fn update_message(
        &self,
        message_id: &str,
        data: Value,
    ) -> Result<Sequence, EditorError> {
        let current_id = self.require_current()?;
        self.set_loading(true);

        let patch = SequencePatch::UpdateMessage {
            id: message_id.to_string(),
            data,
        };
        match self.api.update_sequence(&current_id, patch).await {
            Ok(Some(updated)) => {
                let selected = self.with_inner(|inner| inner.state.selected_message_index);
                self.apply_updated_sequence(updated.clone(), selected);
                let _ = self.validate_sequence().await;
                Ok(updated)
            }
            Ok(None) => Err(self.fail(EditorError::SequenceNotFound)),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Removes a message by id, then revalidates.
    ///
    /// No local existence pre-check: the remove patch is issued for
    /// whatever id the caller passes.  The selection is cleared
    /// unconditionally, even when the removed message was not the
    /// selected one.
    pub async fn remove_message(&self, message_id: &str) -> Result<Sequence, EditorError> {
        let current_id = self.require_current()?;
        self.set_loading(true);

        let patch = SequencePatch::RemoveMessage(message_id.to_string());
        match self.api.update_sequence(&current_id, patch).await {
            Ok(Some(updated)) => {
                self.apply_updated_sequence(updated.clone(), None);
                self.mirror_selection(None);
                let _ = self.validate_sequence().await;
                Ok(updated)
            }
            Ok(None) => Err(self.fail(EditorError::SequenceNotFound)),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Duplicates a message, placing the copy immediately after the
    /// original.  The backend assigns the copy a fresh id.
    pub async fn duplicate_message(&self, message_id: &str) -> Result<Sequence, EditorError> {
        let (original, position) = self
            .with_inner(|inner| {
                let sequence = inner.state.current_sequence.as_ref()?;
                let index = sequence.message_index(message_id)?;
                Some((sequence.messages[index].clone(), index + 1))
            })
            .ok_or_else(|| self.fail(EditorError::MessageNotFound(message_id.to_string())))?;

        let draft = draft_from(&original);
        self.add_message(draft, Some(position)).await
    }

    /// Decodes pasted hex through the fallback chain and appends the
    /// result as a new message.
    pub async fn add_message_from_hex(
        &self,
        hex_data: &str,
        type_name: Option<&str>,
    ) -> Result<Sequence, EditorError> {
        let protocol = self
            .with_inner(|inner| {
                inner
                    .state
                    .current_sequence
                    .as_ref()
                    .map(|s| s.protocol.clone())
            })
            .ok_or_else(|| self.fail(EditorError::NoCurrentSequence))?;

        let mut request = HexDecodeRequest::new(hex_data, protocol);
        if let Some(type_name) = type_name {
            request = request.with_type(type_name);
        }

        match DecodeChain::default().run(self.decoder.as_ref(), &request).await {
            DecodeOutcome::Decoded(draft) => self.add_message(draft, None).await,
            DecodeOutcome::Failed(reasons) => {
                Err(self.fail(EditorError::Decode(reasons.join("; "))))
            }
        }
    }

    // ── Rename (optimistic) ───────────────────────────────────────────────────

    /// Renames the current sequence optimistically.
    ///
    /// The new name is applied locally before the backend confirms.  On a
    /// transient failure the name rolls back to the value captured at
    /// call time (not whatever it is when the failure resolves).  When
    /// the sequence turns out to no longer exist server-side, the current
    /// sequence is discarded instead of rolled back.
    pub async fn set_sequence_name(&self, name: &str) -> Result<(), EditorError> {
        let captured = self.with_inner(|inner| {
            inner
                .state
                .current_sequence
                .as_ref()
                .map(|s| (s.id.clone(), s.name.clone()))
        });
        let (id, previous) = match captured {
            Some(pair) => pair,
            None => {
                warn!("rename requested with no current sequence, ignoring");
                return Ok(());
            }
        };
        if previous == name {
            return Ok(());
        }

        // Optimistic local apply.
        self.mutate(|inner| {
            if let Some(sequence) = inner.state.current_sequence.as_mut() {
                sequence.name = name.to_string();
                rename_in_list(&mut inner.state.sequences, &id, name);
            }
        });
        self.mirror_current();

        let result = self
            .api
            .update_sequence(&id, SequencePatch::Rename(name.to_string()))
            .await;
        match classify_commit(result) {
            CommitOutcome::Committed(confirmed) => {
                self.mutate(|inner| {
                    upsert(&mut inner.state.sequences, &confirmed);
                    inner.state.error = None;
                });
                let state = self.state();
                self.mirror_list(&state.sequences);
                Ok(())
            }
            CommitOutcome::EntityGone => {
                warn!(id, "rename target vanished server-side, discarding sequence");
                self.mutate(|inner| {
                    let still_current = inner
                        .state
                        .current_sequence
                        .as_ref()
                        .is_some_and(|s| s.id == id);
                    if still_current {
                        inner.state.current_sequence = None;
                        inner.state.selected_message_index = None;
                        inner.state.validation_results.clear();
                        inner.state.suggestions.clear();
                        inner.history.clear();
                    }
                    inner.state.sequences.retain(|s| s.id != id);
                });
                if let Err(e) = self.store.clear_current() {
                    warn!(error = %e, "failed to clear current-sequence snapshot");
                }
                Err(self.fail(EditorError::SequenceNotFound))
            }
            CommitOutcome::Failed(e) => {
                // Roll back to the captured name, never the current one.
                self.mutate(|inner| {
                    let still_current = inner
                        .state
                        .current_sequence
                        .as_ref()
                        .is_some_and(|s| s.id == id);
                    if still_current {
                        if let Some(sequence) = inner.state.current_sequence.as_mut() {
                            sequence.name = previous.clone();
                        }
                        rename_in_list(&mut inner.state.sequences, &id, &previous);
                    }
                });
                self.mirror_current();
                Err(self.fail(e.into()))
            }
        }
    }

    // ── Undo / redo ───────────────────────────────────────────────────────────

    /// Steps back one history snapshot and revalidates it.
    pub async fn undo(&self) -> Result<Option<Sequence>, EditorError> {
        let restored = self.mutate(|inner| {
            let snapshot = inner.history.undo().cloned();
            if let Some(snapshot) = &snapshot {
                Self::install_snapshot(inner, snapshot.clone());
            }
            snapshot
        });

        if restored.is_some() {
            self.mirror_current();
            let _ = self.validate_sequence().await;
        }
        Ok(restored)
    }

    /// Steps forward one history snapshot and revalidates it.
    pub async fn redo(&self) -> Result<Option<Sequence>, EditorError> {
        let restored = self.mutate(|inner| {
            let snapshot = inner.history.redo().cloned();
            if let Some(snapshot) = &snapshot {
                Self::install_snapshot(inner, snapshot.clone());
            }
            snapshot
        });

        if restored.is_some() {
            self.mirror_current();
            let _ = self.validate_sequence().await;
        }
        Ok(restored)
    }

    fn install_snapshot(inner: &mut Inner, snapshot: Sequence) {
        inner.state.validation_results.clear();
        inner.state.suggestions.clear();
        // Clamp a selection that the restored snapshot cannot satisfy.
        inner.state.selected_message_index = inner
            .state
            .selected_message_index
            .filter(|i| *i < snapshot.messages.len());
        upsert(&mut inner.state.sequences, &snapshot);
        inner.state.current_sequence = Some(snapshot);
    }

    // ── Validation and lookups ────────────────────────────────────────────────

    /// Validates the current sequence against the backend.
    ///
    /// A no-op without a current sequence.  Overlapping validations
    /// settle last-resolved-wins: each success unconditionally replaces
    /// `validation_results`.
    pub async fn validate_sequence(&self) -> Result<Vec<ValidationResult>, EditorError> {
        let current_id = match self.with_inner(|inner| {
            inner.state.current_sequence.as_ref().map(|s| s.id.clone())
        }) {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };

        self.mutate(|inner| inner.state.is_validating = true);
        let result = self.api.validate_sequence(&current_id).await;
        match result {
            Ok(report) => {
                self.mutate(|inner| {
                    inner.state.validation_results = report.results.clone();
                    inner.state.is_validating = false;
                });
                Ok(report.results)
            }
            Err(e) => {
                self.mutate(|inner| inner.state.is_validating = false);
                Err(self.fail(e.into()))
            }
        }
    }

    /// Looks up identifier-value suggestions for a field of one message.
    ///
    /// Best-effort: failures (and the no-current-sequence case) degrade
    /// to an empty list, with the error surfaced only through state.
    pub async fn field_suggestions(
        &self,
        message_index: usize,
        field_name: &str,
    ) -> Vec<IdentifierSuggestion> {
        let context = self.with_inner(|inner| {
            let sequence = inner.state.current_sequence.as_ref()?;
            let message = sequence.messages.get(message_index)?;
            Some((
                sequence.id.clone(),
                sequence.protocol.clone(),
                message.type_name.clone(),
            ))
        });
        let (id, protocol, type_name) = match context {
            Some(context) => context,
            None => return Vec::new(),
        };

        match self
            .api
            .field_suggestions(&id, message_index, field_name, &protocol, &type_name)
            .await
        {
            Ok(suggestions) => {
                self.mutate(|inner| inner.state.suggestions = suggestions.clone());
                suggestions
            }
            Err(e) => {
                warn!(error = %e, field_name, "suggestion lookup failed");
                self.mutate(|inner| {
                    inner.state.error = Some(format!("suggestion lookup failed: {e}"));
                });
                Vec::new()
            }
        }
    }

    /// Looks up which fields of a message type are tracked identifiers.
    ///
    /// Best-effort like [`Self::field_suggestions`].
    pub async fn detect_identifiers(&self, type_name: &str) -> Vec<String> {
        let protocol = match self.with_inner(|inner| {
            inner
                .state
                .current_sequence
                .as_ref()
                .map(|s| s.protocol.clone())
        }) {
            Some(protocol) => protocol,
            None => return Vec::new(),
        };

        match self.api.detect_identifiers(&protocol, type_name).await {
            Ok(identifiers) => identifiers,
            Err(e) => {
                warn!(error = %e, type_name, "identifier detection failed");
                self.mutate(|inner| {
                    inner.state.error = Some(format!("identifier detection failed: {e}"));
                });
                Vec::new()
            }
        }
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    /// Selects (or deselects) a message by index; persisted immediately.
    pub fn select_message(&self, index: Option<usize>) {
        self.mutate(|inner| inner.state.selected_message_index = index);
        self.mirror_selection(index);
    }

    // ── Export / import ───────────────────────────────────────────────────────

    /// Serializes the current sequence to the transfer JSON format.
    pub fn export_sequence(&self) -> Result<String, EditorError> {
        let sequence = self
            .with_inner(|inner| inner.state.current_sequence.clone())
            .ok_or(EditorError::NoCurrentSequence)?;
        let export = msc_core::export_sequence(&sequence);
        Ok(serde_json::to_string_pretty(&export).map_err(StoreError::Serialize)?)
    }

    /// Imports a transfer document by re-creating the sequence and
    /// replaying its messages.
    ///
    /// The replay is strictly sequential so message order and backend id
    /// assignment stay causally consistent.  Ids in the document are
    /// discarded; the backend assigns fresh ones.
    pub async fn import_sequence(&self, raw: &str) -> Result<Sequence, EditorError> {
        let imported = match msc_core::parse_import(raw) {
            Ok(imported) => imported,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.create_sequence(&imported.name, &imported.protocol, None)
            .await?;
        for message in &imported.messages {
            self.add_message(draft_from(message), None).await?;
        }

        self.with_inner(|inner| inner.state.current_sequence.clone())
            .ok_or(EditorError::NoCurrentSequence)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn with_inner<R>(&self, f: impl FnOnce(&Inner) -> R) -> R {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        f(&inner)
    }

    /// Locks, mutates, and publishes the resulting state.
    fn mutate<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let result = f(&mut inner);
        self.watch_tx.send_replace(inner.state.clone());
        result
    }

    fn require_current(&self) -> Result<String, EditorError> {
        self.with_inner(|inner| inner.state.current_sequence.as_ref().map(|s| s.id.clone()))
            .ok_or_else(|| self.fail(EditorError::NoCurrentSequence))
    }

    fn set_loading(&self, loading: bool) {
        self.mutate(|inner| {
            inner.state.is_loading = loading;
            if loading {
                inner.state.error = None;
            }
        });
    }

    /// Records the failure in observable state and hands it back for the
    /// caller's error channel.
    fn fail(&self, error: EditorError) -> EditorError {
        self.mutate(|inner| {
            inner.state.error = Some(error.to_string());
            inner.state.is_loading = false;
        });
        error
    }

    /// Installs a backend-updated sequence as current, snapshotting it
    /// into history when its message structure changed.
    fn apply_updated_sequence(&self, updated: Sequence, selected: Option<usize>) {
        self.mutate(|inner| {
            let changed = inner.history.current().map(Sequence::edit_signature)
                != Some(updated.edit_signature());
            if changed {
                inner.history.record(updated.clone());
            }
            upsert(&mut inner.state.sequences, &updated);
            inner.state.current_sequence = Some(updated);
            inner.state.selected_message_index = selected;
            inner.state.suggestions.clear();
            inner.state.is_loading = false;
            inner.state.error = None;
        });
        let state = self.state();
        self.mirror_current();
        self.mirror_list(&state.sequences);
        self.mirror_selection(state.selected_message_index);
    }

    fn mirror_all(&self, current: &Sequence) {
        let state = self.state();
        self.writer.schedule(current.clone());
        self.mirror_list(&state.sequences);
        self.mirror_selection(state.selected_message_index);
    }

    fn mirror_current(&self) {
        if let Some(sequence) = self.with_inner(|inner| inner.state.current_sequence.clone()) {
            self.writer.schedule(sequence);
        }
    }

    fn mirror_list(&self, sequences: &[Sequence]) {
        if let Err(e) = self.store.save_sequences(sequences) {
            warn!(error = %e, "failed to persist sequence list");
        }
    }

    fn mirror_selection(&self, index: Option<usize>) {
        if let Err(e) = self.store.save_selected_index(index) {
            warn!(error = %e, "failed to persist selected message index");
        }
    }
}

fn draft_from(message: &Message) -> MessageDraft {
    MessageDraft {
        type_name: message.type_name.clone(),
        data: Some(message.data.clone()),
        source_actor: Some(message.source_actor.clone()),
        target_actor: Some(message.target_actor.clone()),
    }
}

fn upsert(sequences: &mut Vec<Sequence>, sequence: &Sequence) {
    match sequences.iter_mut().find(|s| s.id == sequence.id) {
        Some(existing) => *existing = sequence.clone(),
        None => sequences.push(sequence.clone()),
    }
}

fn rename_in_list(sequences: &mut [Sequence], id: &str, name: &str) {
    if let Some(entry) = sequences.iter_mut().find(|s| s.id == id) {
        entry.name = name.to_string();
    }
}
