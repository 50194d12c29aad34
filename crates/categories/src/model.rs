//! Category records as the admin API returns them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent: Option<ParentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Category {
    /// Minimal constructor, mostly useful for tests and fixtures
    pub fn new(id: &str, name: &str, parent: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            slug: crate::generate_slug(name),
            description: None,
            parent: parent.map(|p| ParentRef::Id(p.to_string())),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent
            .as_ref()
            .map(ParentRef::id)
            .filter(|id| !id.is_empty())
    }
}

/// The `parent` field is either a bare id or a populated parent document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParentRef {
    Id(String),
    Populated(ParentSummary),
}

impl ParentRef {
    pub fn id(&self) -> &str {
        match self {
            ParentRef::Id(id) => id,
            ParentRef::Populated(parent) => &parent.id,
        }
    }
}

/// Populated parent; the API usually selects only a few fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// A category with its subcategories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    #[serde(default)]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn leaf(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including itself
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&CategoryNode> {
        if self.category.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Body of a create or update request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent: Option<String>,
}

impl From<&Category> for CategoryForm {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone().unwrap_or_default(),
            parent: category.parent_id().map(str::to_string),
        }
    }
}

/// Query options for listing categories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Ask the server to nest categories itself
    pub hierarchy: bool,
    pub search: Option<String>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hierarchy(mut self, hierarchy: bool) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn with_search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search = if term.is_empty() {
            None
        } else {
            Some(term.to_string())
        };
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.hierarchy {
            pairs.push(("hierarchy", "true".to_string()));
        }
        if let Some(term) = &self.search {
            pairs.push(("search", term.clone()));
        }
        pairs
    }
}

/// `GET /admin/categories` response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CategoryListResponse {
    pub categories: Vec<CategoryNode>,
    #[serde(default)]
    pub flat: Option<Vec<Category>>,
}

/// `{message}` acknowledgement returned by mutations and errors alike
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Categories in both shapes the UI renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryListing {
    pub tree: Vec<CategoryNode>,
    pub flat: Vec<Category>,
}
