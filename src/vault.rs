// Dory: Vault Session
//
// The explicit state object for one running front end. It owns the gate,
// the session state, and the editor form, and shares the sync controller.
// Every user action is a method here; renderers only read.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::form::{Form, ValidationError};
use crate::gate::{AuthOutcome, Authenticator, Symbol, SymbolPool};
use crate::session::{RecordView, SessionState, View};
use crate::store::{Mutation, RecordId, RecordStore, StoreError};
use crate::sync::{MutationReport, RefreshOutcome, SyncController};

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("The vault is locked")]
    Locked,

    #[error("No loaded record with id {0}")]
    UnknownRecord(RecordId),

    #[error("Delete confirmation was already used or superseded")]
    StaleConfirmation,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Proof that the user confirmed deleting one record.
///
/// Only [`Vault::request_delete`] can produce one, it is consumed by
/// [`Vault::confirm_delete`], and it is honoured at most once: only the most
/// recently issued ticket is accepted, and logout revokes it.
#[derive(Debug, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: RecordId,
    service: String,
    ticket: u64,
}

impl DeleteConfirmation {
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Service name, for the confirmation prompt.
    pub fn service(&self) -> &str {
        &self.service
    }
}

pub struct Vault<S> {
    auth: Authenticator,
    session: SessionState,
    form: Form,
    sync: Arc<SyncController<S>>,
    display_name: String,
    mask: String,
    next_ticket: u64,
    outstanding_delete: Option<u64>,
}

impl<S: RecordStore> Vault<S> {
    pub fn new(
        auth: Authenticator,
        sync: Arc<SyncController<S>>,
        display_name: impl Into<String>,
        mask: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            session: SessionState::default(),
            form: Form::new(),
            sync,
            display_name: display_name.into(),
            mask: mask.into(),
            next_ticket: 0,
            outstanding_delete: None,
        }
    }

    /// Assemble a vault around `store` from a validated configuration.
    pub fn from_config(config: &Config, store: S) -> Result<Self, ConfigError> {
        let pool = SymbolPool::new(config.alphabet())?;
        let auth = Authenticator::new(pool, Box::new(config.verifier()?));
        let sync = Arc::new(SyncController::new(store, config.settle_delay()));
        Ok(Self::new(auth, sync, config.display_name.clone(), config.mask.clone()))
    }

    // ─── Read access ─────────────────────────────────────────────────────────

    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn sync(&self) -> &Arc<SyncController<S>> {
        &self.sync
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_loading(&self) -> bool {
        self.sync.is_loading()
    }

    /// Loaded records as they should be displayed right now.
    pub async fn records_view(&self) -> Vec<RecordView> {
        if !self.session.authenticated {
            return Vec::new();
        }
        self.sync
            .snapshot()
            .await
            .iter()
            .map(|record| RecordView::of(record, self.session.panic_mode, &self.mask))
            .collect()
    }

    // ─── Gate ────────────────────────────────────────────────────────────────

    pub fn select_symbol(&mut self, symbol: &Symbol) -> bool {
        self.auth.select_symbol(symbol)
    }

    pub fn select_position(&mut self, position: usize) -> bool {
        self.auth.select_position(position)
    }

    /// Check the attempt; on success, unlock and issue the initial load.
    pub async fn confirm(&mut self) -> AuthOutcome {
        let outcome = self.auth.confirm();
        if outcome == AuthOutcome::Granted {
            self.session = SessionState {
                authenticated: true,
                ..SessionState::default()
            };
            let loaded = self.sync.load().await;
            tracing::info!(?loaded, "Vault unlocked");
        }
        outcome
    }

    pub fn reset(&mut self) -> bool {
        self.auth.reset()
    }

    /// Lock the vault. Refreshes still in flight are discarded when they land.
    pub async fn logout(&mut self) -> bool {
        if !self.auth.logout() {
            return false;
        }
        self.session.reset();
        self.form.clear();
        self.outstanding_delete = None;
        self.sync.invalidate().await;
        true
    }

    // ─── Dashboard ───────────────────────────────────────────────────────────

    pub fn toggle_panic(&mut self) -> Result<bool, VaultError> {
        self.ensure_unlocked()?;
        Ok(self.session.toggle_panic())
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, VaultError> {
        self.ensure_unlocked()?;
        Ok(self.sync.load().await)
    }

    /// Open an empty editor for a new record.
    pub fn new_record(&mut self) -> Result<(), VaultError> {
        self.ensure_unlocked()?;
        self.form.clear();
        self.session.editing = None;
        self.session.view = View::Editor;
        Ok(())
    }

    /// Map an id as the user typed it to the id of a loaded record.
    pub async fn resolve_id(&self, label: &str) -> Result<RecordId, VaultError> {
        self.ensure_unlocked()?;
        let label = label.trim();
        self.sync
            .resolve(label)
            .await
            .ok_or_else(|| VaultError::UnknownRecord(RecordId::from(label)))
    }

    /// Open the editor seeded from a loaded record.
    pub async fn edit_record(&mut self, id: &RecordId) -> Result<(), VaultError> {
        self.ensure_unlocked()?;
        let record = self
            .sync
            .find(id)
            .await
            .ok_or_else(|| VaultError::UnknownRecord(id.clone()))?;
        self.form.seed(&record);
        self.session.editing = Some(record.id);
        self.session.view = View::Editor;
        Ok(())
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Leave the editor without writing anything.
    pub fn cancel_edit(&mut self) {
        self.form.clear();
        self.session.editing = None;
        self.session.view = View::List;
    }

    /// Submit the editor. On success the form resets and the list is shown;
    /// on failure the form is left intact for a manual retry.
    pub async fn save(&mut self) -> Result<MutationReport, VaultError> {
        self.ensure_unlocked()?;
        let mutation = self.form.reconcile(self.session.editing.as_ref())?;
        let report = self.sync.perform_mutation(mutation).await?;

        self.form.clear();
        self.session.editing = None;
        self.session.view = View::List;
        Ok(report)
    }

    /// First half of a delete: identify the record and hand back a token the
    /// caller must present after the user confirms.
    pub async fn request_delete(&mut self, id: &RecordId) -> Result<DeleteConfirmation, VaultError> {
        self.ensure_unlocked()?;
        let record = self
            .sync
            .find(id)
            .await
            .ok_or_else(|| VaultError::UnknownRecord(id.clone()))?;
        self.next_ticket += 1;
        self.outstanding_delete = Some(self.next_ticket);
        Ok(DeleteConfirmation {
            id: record.id,
            service: record.fields.service,
            ticket: self.next_ticket,
        })
    }

    pub async fn confirm_delete(
        &mut self,
        confirmation: DeleteConfirmation,
    ) -> Result<MutationReport, VaultError> {
        self.ensure_unlocked()?;
        if self.outstanding_delete != Some(confirmation.ticket) {
            return Err(VaultError::StaleConfirmation);
        }
        self.outstanding_delete = None;
        let report = self
            .sync
            .perform_mutation(Mutation::Delete {
                id: confirmation.id,
            })
            .await?;
        self.session.view = View::List;
        Ok(report)
    }

    fn ensure_unlocked(&self) -> Result<(), VaultError> {
        if self.session.authenticated {
            Ok(())
        } else {
            Err(VaultError::Locked)
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
