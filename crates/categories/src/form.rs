//! Draft state for the create/edit category form

use crate::model::{Category, CategoryForm};
use crate::slug::{generate_slug, is_valid_slug};
use crate::CategoryError;

/// The draft plus which category, if any, is being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub draft: CategoryForm,
    pub editing: Option<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Update the name, regenerating the slug while it still tracks the name
    pub fn set_name(&mut self, name: &str) {
        let tracking = self.draft.slug.is_empty() || self.draft.slug == generate_slug(&self.draft.name);
        if tracking {
            self.draft.slug = generate_slug(name);
        }
        self.draft.name = name.to_string();
    }

    pub fn set_slug(&mut self, slug: &str) {
        self.draft.slug = slug.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.draft.description = description.to_string();
    }

    pub fn set_parent(&mut self, parent: Option<&str>) {
        self.draft.parent = parent
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
    }

    /// Load an existing category into the form
    pub fn start_edit(&mut self, category: &Category) {
        self.draft = CategoryForm::from(category);
        self.editing = Some(category.id.clone());
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validate the draft and produce the request body
    pub fn payload(&self) -> Result<CategoryForm, CategoryError> {
        self.draft.normalized()
    }
}

impl CategoryForm {
    /// Trimmed copy with the slug filled in from the name when left blank
    pub fn normalized(&self) -> Result<CategoryForm, CategoryError> {
        let name = self.draft_name()?;

        let slug = match self.slug.trim() {
            "" => generate_slug(&name),
            slug => slug.to_string(),
        };
        if slug.is_empty() {
            return Err(CategoryError::InvalidForm(
                "Category name must contain at least one letter or digit".to_string(),
            ));
        }
        if !is_valid_slug(&slug) {
            return Err(CategoryError::InvalidForm(
                "Slug may only contain lowercase letters, numbers and single hyphens".to_string(),
            ));
        }

        Ok(CategoryForm {
            name,
            slug,
            description: self.description.trim().to_string(),
            parent: self
                .parent
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        })
    }

    fn draft_name(&self) -> Result<String, CategoryError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CategoryError::InvalidForm("Category name is required".to_string()));
        }
        Ok(name.to_string())
    }
}
