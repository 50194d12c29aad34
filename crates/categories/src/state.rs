//! Category screen state and its reducer

use std::time::{Duration, Instant};

use crate::form::FormState;
use crate::model::{Category, CategoryListing, CategoryNode, FetchOptions};

/// A success message that disappears after a while
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub shown_at: Instant,
}

/// Everything the category admin screen renders from
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub tree: Vec<CategoryNode>,
    pub flat: Vec<Category>,
    pub form: FormState,
    pub loading: bool,
    pub submitting: bool,
    pub error: Option<String>,
    pub success: Option<Notice>,
    /// Options of the last successful fetch, reused for refreshes after a mutation
    pub last_fetch: FetchOptions,
    /// Options of the fetch in progress
    pending_fetch: Option<FetchOptions>,
    success_ttl: Duration,
}

/// State transitions
#[derive(Debug, Clone)]
pub enum CategoryAction {
    FetchStarted(FetchOptions),
    FetchSucceeded(CategoryListing),
    FetchFailed(String),
    MutationStarted,
    MutationSucceeded { message: String, at: Instant },
    MutationFailed(String),
    /// The request was abandoned before it finished
    MutationCancelled,
    /// Drop the success message once it has been shown long enough
    ExpireMessages { now: Instant },
    ClearError,
    EditName(String),
    EditSlug(String),
    EditDescription(String),
    EditParent(Option<String>),
    StartEdit(Category),
    ResetForm,
}

impl Default for CategoryState {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}

impl CategoryState {
    pub fn new(success_ttl: Duration) -> Self {
        Self {
            tree: Vec::new(),
            flat: Vec::new(),
            form: FormState::new(),
            loading: false,
            submitting: false,
            error: None,
            success: None,
            last_fetch: FetchOptions::default(),
            pending_fetch: None,
            success_ttl,
        }
    }

    /// The category forest
    pub fn categories(&self) -> &[CategoryNode] {
        &self.tree
    }

    pub fn find(&self, id: &str) -> Option<&Category> {
        self.flat.iter().find(|c| c.id == id)
    }

    /// Success text, if it has not yet timed out at `now`
    pub fn success_message(&self, now: Instant) -> Option<&str> {
        self.success
            .as_ref()
            .filter(|notice| now.saturating_duration_since(notice.shown_at) < self.success_ttl)
            .map(|notice| notice.text.as_str())
    }

    pub fn apply(&mut self, action: CategoryAction) {
        match action {
            CategoryAction::FetchStarted(opts) => {
                self.loading = true;
                self.error = None;
                self.pending_fetch = Some(opts);
            }
            CategoryAction::FetchSucceeded(listing) => {
                self.loading = false;
                if let Some(opts) = self.pending_fetch.take() {
                    self.last_fetch = opts;
                }
                self.tree = listing.tree;
                self.flat = listing.flat;
            }
            CategoryAction::FetchFailed(message) => {
                self.loading = false;
                self.pending_fetch = None;
                self.error = Some(message);
            }
            CategoryAction::MutationStarted => {
                self.submitting = true;
                self.error = None;
                self.success = None;
            }
            CategoryAction::MutationSucceeded { message, at } => {
                self.submitting = false;
                self.success = Some(Notice {
                    text: message,
                    shown_at: at,
                });
            }
            CategoryAction::MutationFailed(message) => {
                self.submitting = false;
                self.error = Some(message);
            }
            CategoryAction::MutationCancelled => self.submitting = false,
            CategoryAction::ExpireMessages { now } => {
                if self.success_message(now).is_none() {
                    self.success = None;
                }
            }
            CategoryAction::ClearError => self.error = None,
            CategoryAction::EditName(name) => self.form.set_name(&name),
            CategoryAction::EditSlug(slug) => self.form.set_slug(&slug),
            CategoryAction::EditDescription(text) => self.form.set_description(&text),
            CategoryAction::EditParent(parent) => self.form.set_parent(parent.as_deref()),
            CategoryAction::StartEdit(category) => self.form.start_edit(&category),
            CategoryAction::ResetForm => self.form.reset(),
        }
    }

    /// Consuming form of [`CategoryState::apply`]
    pub fn reduce(mut self, action: CategoryAction) -> Self {
        self.apply(action);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_category_tree;

    fn listing() -> CategoryListing {
        let flat = vec![
            Category::new("1", "Shoes", None),
            Category::new("2", "Boots", Some("1")),
        ];
        CategoryListing {
            tree: build_category_tree(&flat, None).unwrap(),
            flat,
        }
    }

    #[test]
    fn test_fetch_cycle() {
        let state = CategoryState::default()
            .reduce(CategoryAction::FetchStarted(FetchOptions::new().with_hierarchy(true)))
            .reduce(CategoryAction::FetchSucceeded(listing()));

        assert!(!state.loading);
        assert_eq!(state.categories().len(), 1);
        assert_eq!(state.flat.len(), 2);
        assert!(state.last_fetch.hierarchy);
        assert_eq!(state.find("2").map(|c| c.name.as_str()), Some("Boots"));
    }

    #[test]
    fn test_failed_fetch_keeps_categories() {
        let state = CategoryState::default()
            .reduce(CategoryAction::FetchSucceeded(listing()))
            .reduce(CategoryAction::FetchStarted(FetchOptions::new()))
            .reduce(CategoryAction::FetchFailed("Server unavailable".to_string()));

        assert_eq!(state.flat.len(), 2);
        assert_eq!(state.error.as_deref(), Some("Server unavailable"));
        assert!(!state.loading);
    }

    #[test]
    fn test_failed_fetch_keeps_last_good_options() {
        let state = CategoryState::default()
            .reduce(CategoryAction::FetchStarted(FetchOptions::new().with_hierarchy(true)))
            .reduce(CategoryAction::FetchSucceeded(listing()))
            .reduce(CategoryAction::FetchStarted(
                FetchOptions::new().with_search("boots"),
            ))
            .reduce(CategoryAction::FetchFailed("Server unavailable".to_string()));

        assert!(state.last_fetch.hierarchy);
        assert_eq!(state.last_fetch.search, None);
    }

    #[test]
    fn test_cancelled_mutation_clears_submitting() {
        let state = CategoryState::default()
            .reduce(CategoryAction::MutationStarted)
            .reduce(CategoryAction::MutationCancelled);

        assert!(!state.submitting);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_mutation_messages() {
        let start = Instant::now();
        let state = CategoryState::new(Duration::from_secs(3))
            .reduce(CategoryAction::MutationStarted)
            .reduce(CategoryAction::MutationSucceeded {
                message: "Category created".to_string(),
                at: start,
            });

        assert!(!state.submitting);
        assert_eq!(state.success_message(start), Some("Category created"));
        assert_eq!(
            state.success_message(start + Duration::from_secs(2)),
            Some("Category created")
        );
        assert_eq!(state.success_message(start + Duration::from_secs(3)), None);

        let state = state.reduce(CategoryAction::ExpireMessages {
            now: start + Duration::from_secs(1),
        });
        assert!(state.success.is_some());

        let state = state.reduce(CategoryAction::ExpireMessages {
            now: start + Duration::from_secs(5),
        });
        assert!(state.success.is_none());
    }

    #[test]
    fn test_mutation_failure_clears_busy() {
        let state = CategoryState::default()
            .reduce(CategoryAction::MutationStarted)
            .reduce(CategoryAction::MutationFailed("Slug already exists".to_string()));

        assert!(!state.submitting);
        assert_eq!(state.error.as_deref(), Some("Slug already exists"));

        let state = state.reduce(CategoryAction::ClearError);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_form_actions() {
        let state = CategoryState::default()
            .reduce(CategoryAction::EditName("Men's Shoes".to_string()))
            .reduce(CategoryAction::EditDescription("All of them".to_string()))
            .reduce(CategoryAction::EditParent(Some("1".to_string())));

        assert_eq!(state.form.draft.slug, "mens-shoes");
        assert_eq!(state.form.draft.parent.as_deref(), Some("1"));

        let state = state
            .reduce(CategoryAction::StartEdit(Category::new("2", "Boots", None)))
            .reduce(CategoryAction::EditSlug("winter-boots".to_string()));
        assert_eq!(state.form.editing.as_deref(), Some("2"));
        assert_eq!(state.form.draft.slug, "winter-boots");

        let state = state.reduce(CategoryAction::ResetForm);
        assert!(!state.form.is_editing());
    }
}
