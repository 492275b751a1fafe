//! Wizard draft persistence.
//!
//! Defines `DraftStore` for keeping the last-entered values of every wizard
//! step, so that closing the wizard without confirming and reopening it
//! restores what the user typed instead of resetting to defaults.
//!
//! Drafts are never cleared on cancel; only a later merge (or an explicit
//! reset) overwrites them. The store is an explicit object owned by the
//! wizard, so independent wizards (and tests) get independent drafts.

use std::collections::HashMap;

use rvtrigger_types::draft::{Draft, DraftKind};
use tracing::{debug, warn};

/// Current shape version of the serialized drafts.
pub const DRAFT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Domain types
// ---------------------------------------------------------------------------

/// A saved draft containing the full serialized step state.
///
/// `state_json` holds the serialized draft. The `schema_version` field
/// enables forward-compatible deserialization if the draft shapes change.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDraft {
    pub kind: DraftKind,
    pub state_json: serde_json::Value,
    pub schema_version: u32,
    /// Incremented on every save of this kind.
    pub revision: u64,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Persistence interface for wizard drafts, keyed by step.
pub trait DraftStore {
    /// Load the stored draft for a step, if any.
    fn load_draft(&self, kind: DraftKind) -> Option<&StoredDraft>;

    /// Save or replace the draft for `draft.kind`.
    fn save_draft(&mut self, draft: StoredDraft);

    /// Delete the draft for a step. No-op if none is stored.
    fn delete_draft(&mut self, kind: DraftKind);
}

/// Typed access on top of any `DraftStore`.
pub trait DraftStoreExt: DraftStore {
    /// Most recently stored draft of type `D`, or `D::default()`.
    fn get<D: Draft>(&self) -> D {
        let Some(stored) = self.load_draft(D::KIND) else {
            return D::default();
        };
        match serde_json::from_value::<D>(stored.state_json.clone()) {
            Ok(draft) => draft,
            Err(err) => {
                let kind = D::KIND;
                warn!(%kind, %err, "Stored draft is unreadable, using defaults");
                D::default()
            }
        }
    }

    /// Shallow-merge `patch` into the stored draft and persist the result.
    fn merge<D: Draft>(&mut self, patch: D::Patch) -> D {
        let mut draft = self.get::<D>();
        draft.apply(patch);
        self.put(&draft);
        draft
    }

    /// Replace the stored draft wholesale.
    fn put<D: Draft>(&mut self, draft: &D) {
        let kind = D::KIND;
        let revision = self.load_draft(kind).map_or(0, |d| d.revision) + 1;
        match serde_json::to_value(draft) {
            Ok(state_json) => {
                debug!(%kind, revision, "Draft saved");
                self.save_draft(StoredDraft {
                    kind,
                    state_json,
                    schema_version: DRAFT_SCHEMA_VERSION,
                    revision,
                });
            }
            Err(err) => warn!(%kind, %err, "Failed to serialize draft"),
        }
    }

    /// Drop the stored draft and return the default.
    fn reset<D: Draft>(&mut self) -> D {
        self.delete_draft(D::KIND);
        D::default()
    }
}

impl<S: DraftStore + ?Sized> DraftStoreExt for S {}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// Process-lifetime draft store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    drafts: HashMap<DraftKind, StoredDraft>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

impl DraftStore for InMemoryDraftStore {
    fn load_draft(&self, kind: DraftKind) -> Option<&StoredDraft> {
        self.drafts.get(&kind)
    }

    fn save_draft(&mut self, draft: StoredDraft) {
        self.drafts.insert(draft.kind, draft);
    }

    fn delete_draft(&mut self, kind: DraftKind) {
        self.drafts.remove(&kind);
    }
}
