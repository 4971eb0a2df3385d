//! Generic list controller: cached items, input buffers and the CRUD command
//! protocol shared by every entity kind.
//!
//! Every mutating command follows the same shape: validate locally, check
//! preconditions against the cached list, issue exactly one remote call, and on
//! success refetch the whole collection. Failures never escape a command; they
//! land in the single `last_error` slot.

use std::{fmt, sync::Arc};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::{Command, CommandError},
    kind::{is_positive, EntityKind},
    repository::Repository,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// The remote call went through. A failed follow-up refresh is reported
    /// through `last_error` only.
    Succeeded,
    /// Rejected before any mutating request was sent.
    Aborted,
    /// The remote call failed.
    Failed,
}

impl CommandStatus {
    pub fn is_success(self) -> bool {
        self == Self::Succeeded
    }
}

/// Input buffers, one per command form.
pub struct FormState<K: EntityKind> {
    pub draft: K::Draft,
    pub update_id: Option<K::Id>,
    pub patch: K::Patch,
    pub delete_id: Option<K::Id>,
    pub find_id: Option<K::Id>,
}

impl<K: EntityKind> Default for FormState<K> {
    fn default() -> Self {
        Self {
            draft: K::Draft::default(),
            update_id: None,
            patch: K::Patch::default(),
            delete_id: None,
            find_id: None,
        }
    }
}

impl<K: EntityKind> Clone for FormState<K> {
    fn clone(&self) -> Self {
        Self {
            draft: self.draft.clone(),
            update_id: self.update_id,
            patch: self.patch.clone(),
            delete_id: self.delete_id,
            find_id: self.find_id,
        }
    }
}

impl<K: EntityKind> PartialEq for FormState<K> {
    fn eq(&self, other: &Self) -> bool {
        self.draft == other.draft
            && self.update_id == other.update_id
            && self.patch == other.patch
            && self.delete_id == other.delete_id
            && self.find_id == other.find_id
    }
}

impl<K: EntityKind> fmt::Debug for FormState<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("draft", &self.draft)
            .field("update_id", &self.update_id)
            .field("patch", &self.patch)
            .field("delete_id", &self.delete_id)
            .field("find_id", &self.find_id)
            .finish()
    }
}

/// Point-in-time copy of everything the view renders.
pub struct ControllerSnapshot<K: EntityKind> {
    pub items: Vec<K::Entity>,
    pub forms: FormState<K>,
    pub found: Option<K::Entity>,
    pub last_error: Option<CommandError>,
}

struct ControllerState<K: EntityKind> {
    items: Vec<K::Entity>,
    forms: FormState<K>,
    found: Option<K::Entity>,
    last_error: Option<CommandError>,
}

pub struct ListController<K: EntityKind> {
    repository: Arc<dyn Repository<K>>,
    // Never held across a remote call, so commands may overlap.
    state: Mutex<ControllerState<K>>,
}

impl<K: EntityKind> ListController<K> {
    pub fn new(repository: Arc<dyn Repository<K>>) -> Self {
        Self {
            repository,
            state: Mutex::new(ControllerState {
                items: Vec::new(),
                forms: FormState::default(),
                found: None,
                last_error: None,
            }),
        }
    }

    pub async fn items(&self) -> Vec<K::Entity> {
        self.state.lock().await.items.clone()
    }

    pub async fn last_error(&self) -> Option<CommandError> {
        self.state.lock().await.last_error.clone()
    }

    pub async fn forms(&self) -> FormState<K> {
        self.state.lock().await.forms.clone()
    }

    pub async fn snapshot(&self) -> ControllerSnapshot<K> {
        let guard = self.state.lock().await;
        ControllerSnapshot {
            items: guard.items.clone(),
            forms: guard.forms.clone(),
            found: guard.found.clone(),
            last_error: guard.last_error.clone(),
        }
    }

    /// Lets the view edit the input buffers between commands.
    pub async fn edit_forms<F>(&self, edit: F)
    where
        F: FnOnce(&mut FormState<K>),
    {
        edit(&mut self.state.lock().await.forms);
    }

    pub async fn clear_error(&self) {
        self.state.lock().await.last_error = None;
    }

    /// Replaces the cached list with the remote collection, sorted by id.
    pub async fn refresh(&self) -> CommandStatus {
        debug!(kind = K::NAME, "refreshing list");
        match self.repository.list().await {
            Ok(mut items) => {
                items.sort_by_key(K::sort_key);
                debug!(kind = K::NAME, count = items.len(), "list refreshed");
                self.state.lock().await.items = items;
                CommandStatus::Succeeded
            }
            Err(err) => {
                self.record_error(CommandError::remote(Command::Refresh, K::COLLECTION, &err))
                    .await;
                CommandStatus::Failed
            }
        }
    }

    pub async fn create(&self, draft: K::Draft) -> CommandStatus {
        let duplicate = {
            let mut guard = self.state.lock().await;
            guard.forms.draft = draft.clone();
            guard
                .items
                .iter()
                .any(|existing| K::is_duplicate(existing, &draft))
        };

        if let Err(message) = K::validate_draft(&draft) {
            self.record_error(CommandError::validation(Command::Create, message))
                .await;
            return CommandStatus::Aborted;
        }
        if duplicate {
            self.record_error(CommandError::conflict(
                Command::Create,
                format!("{} already exists", K::NAME),
            ))
            .await;
            return CommandStatus::Aborted;
        }

        match self.repository.create(&draft).await {
            Ok(created) => {
                info!(kind = K::NAME, id = ?K::id(&created), "record created");
                self.state.lock().await.forms.draft = K::Draft::default();
                self.refresh().await;
                CommandStatus::Succeeded
            }
            Err(err) => {
                self.record_error(CommandError::remote(Command::Create, K::NAME, &err))
                    .await;
                CommandStatus::Failed
            }
        }
    }

    pub async fn update(&self, id: Option<K::Id>, patch: K::Patch) -> CommandStatus {
        {
            let mut guard = self.state.lock().await;
            guard.forms.update_id = id;
            guard.forms.patch = patch.clone();
        }

        let Some(id) = id.filter(|id| is_positive(*id)) else {
            self.record_error(CommandError::validation(
                Command::Update,
                format!("enter a positive {} id to update", K::NAME),
            ))
            .await;
            return CommandStatus::Aborted;
        };
        let patch = K::prune_patch(patch);
        if K::patch_is_empty(&patch) {
            self.record_error(CommandError::validation(
                Command::Update,
                format!("change at least one {} field", K::NAME),
            ))
            .await;
            return CommandStatus::Aborted;
        }

        match self.repository.update_by_id(id, &patch).await {
            Ok(_) => {
                info!(kind = K::NAME, %id, "record updated");
                {
                    let mut guard = self.state.lock().await;
                    guard.forms.update_id = None;
                    guard.forms.patch = K::Patch::default();
                }
                self.refresh().await;
                CommandStatus::Succeeded
            }
            Err(err) => {
                self.record_error(CommandError::remote(Command::Update, K::NAME, &err))
                    .await;
                CommandStatus::Failed
            }
        }
    }

    /// Deletes by id without checking the cached list first; the service
    /// decides whether the record exists.
    pub async fn delete(&self, id: Option<K::Id>) -> CommandStatus {
        self.state.lock().await.forms.delete_id = id;

        let Some(id) = id.filter(|id| is_positive(*id)) else {
            self.record_error(CommandError::validation(
                Command::Delete,
                format!("enter a positive {} id to delete", K::NAME),
            ))
            .await;
            return CommandStatus::Aborted;
        };

        match self.repository.delete_by_id(id).await {
            Ok(()) => {
                info!(kind = K::NAME, %id, "record deleted");
                self.state.lock().await.forms.delete_id = None;
                self.refresh().await;
                CommandStatus::Succeeded
            }
            Err(err) => {
                self.record_error(CommandError::remote(Command::Delete, K::NAME, &err))
                    .await;
                CommandStatus::Failed
            }
        }
    }

    /// Looks a record up remotely. The cached list is left alone; the previous
    /// result is dropped before the lookup.
    pub async fn find(&self, id: Option<K::Id>) -> Option<K::Entity> {
        {
            let mut guard = self.state.lock().await;
            guard.forms.find_id = id;
            guard.found = None;
        }

        let Some(id) = id.filter(|id| is_positive(*id)) else {
            self.record_error(CommandError::validation(
                Command::Find,
                format!("enter a positive {} id", K::NAME),
            ))
            .await;
            return None;
        };

        match self.repository.get_by_id(id).await {
            Ok(Some(entity)) => {
                self.state.lock().await.found = Some(entity.clone());
                Some(entity)
            }
            Ok(None) => {
                self.record_error(CommandError::not_found(
                    Command::Find,
                    format!("{} {id} not found", K::NAME),
                ))
                .await;
                None
            }
            Err(err) => {
                self.record_error(CommandError::remote(Command::Find, K::NAME, &err))
                    .await;
                None
            }
        }
    }

    async fn record_error(&self, err: CommandError) {
        warn!(
            kind = K::NAME,
            command = err.command().as_str(),
            category = ?err.category(),
            "{}",
            err.message()
        );
        self.state.lock().await.last_error = Some(err);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
