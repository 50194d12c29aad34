//! Category store: the client plus the screen state it keeps in sync

use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::client::CategoryClient;
use crate::model::{Category, CategoryForm, FetchOptions};
use crate::state::{CategoryAction, CategoryState};
use crate::tree::would_create_cycle;
use crate::{CategoryError, Result};

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Keeps a [`CategoryState`] synchronized with the admin API.
///
/// Operations never return errors: failures end up in `state.error` as a
/// displayable string and the method returns `false`.
#[derive(Clone)]
pub struct CategoryStore {
    client: CategoryClient,
    state: Arc<RwLock<CategoryState>>,
}

impl CategoryStore {
    pub fn new(client: CategoryClient) -> Self {
        let state = CategoryState::new(client.options().success_message_ttl);
        Self {
            client,
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn client(&self) -> &CategoryClient {
        &self.client
    }

    fn read(&self) -> RwLockReadGuard<'_, CategoryState> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CategoryState> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> CategoryState {
        self.read().clone()
    }

    pub fn dispatch(&self, action: CategoryAction) {
        self.write().apply(action);
    }

    /// Load categories, replacing local state only on success
    pub async fn fetch_categories(&self, opts: FetchOptions) -> bool {
        self.dispatch(CategoryAction::FetchStarted(opts.clone()));

        match self.client.list(&opts).await {
            Ok(listing) => {
                self.dispatch(CategoryAction::FetchSucceeded(listing));
                true
            }
            Err(e) => {
                log::error!("failed to fetch categories: {}", e);
                self.dispatch(CategoryAction::FetchFailed(e.user_message()));
                false
            }
        }
    }

    /// Re-run the last fetch
    pub async fn refresh(&self) -> bool {
        let opts = self.read().last_fetch.clone();
        self.fetch_categories(opts).await
    }

    pub async fn add_category(&self, form: &CategoryForm) -> bool {
        self.run_mutation(async {
            let payload = form.normalized()?;
            self.client.create(&payload).await
        })
        .await
    }

    pub async fn edit_category(&self, id: &str, form: &CategoryForm) -> bool {
        self.run_mutation(async {
            let payload = form.normalized()?;
            let cyclic = {
                let state = self.read();
                would_create_cycle(&state.flat, id, payload.parent.as_deref())
            };
            if cyclic {
                return Err(CategoryError::Cycle {
                    id: id.to_string(),
                    parent: payload.parent.unwrap_or_default(),
                });
            }
            self.client.update(id, &payload).await
        })
        .await
    }

    /// Delete after confirmation; a declined prompt sends nothing
    pub async fn delete_category(&self, id: &str, confirm: &dyn Confirm) -> bool {
        let prompt = match self.read().find(id) {
            Some(category) => format!(
                "Are you sure you want to delete \"{}\"? This cannot be undone.",
                category.name
            ),
            None => "Are you sure you want to delete this category? This cannot be undone."
                .to_string(),
        };
        if !confirm.confirm(&prompt) {
            log::debug!("delete of category {} cancelled", id);
            return false;
        }

        self.run_mutation(self.client.delete(id)).await
    }

    /// Submit the form draft as a create or an update
    pub async fn submit(&self) -> bool {
        let form = self.read().form.clone();
        let saved = match form.editing.as_deref() {
            Some(id) => self.edit_category(id, &form.draft).await,
            None => self.add_category(&form.draft).await,
        };
        if saved {
            self.dispatch(CategoryAction::ResetForm);
        }
        saved
    }

    /// Load a category into the form for editing
    pub fn start_edit(&self, category: &Category) {
        self.dispatch(CategoryAction::StartEdit(category.clone()));
    }

    pub fn expire_messages(&self, now: Instant) {
        self.dispatch(CategoryAction::ExpireMessages { now });
    }

    async fn run_mutation<F>(&self, request: F) -> bool
    where
        F: Future<Output = Result<String>>,
    {
        {
            let mut state = self.write();
            if state.submitting {
                state.error = Some(CategoryError::Busy.user_message());
                return false;
            }
            state.apply(CategoryAction::MutationStarted);
        }

        let mut in_flight = InFlight {
            store: self,
            armed: true,
        };
        let result = request.await;
        in_flight.armed = false;

        match result {
            Ok(message) => {
                self.dispatch(CategoryAction::MutationSucceeded {
                    message,
                    at: Instant::now(),
                });
                self.refresh().await;
                true
            }
            Err(e) => {
                log::error!("category change failed: {}", e);
                self.dispatch(CategoryAction::MutationFailed(e.user_message()));
                false
            }
        }
    }
}

/// Clears `submitting` if the mutation future is dropped before it completes
struct InFlight<'a> {
    store: &'a CategoryStore,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        log::warn!("category change dropped before completion");
        self.store.dispatch(CategoryAction::MutationCancelled);
    }
}
