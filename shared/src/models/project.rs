//! Project data model.

use serde::{Deserialize, Serialize};

/// A project registered with the error-tracking backend.
///
/// Projects are addressed by `slug` everywhere in the console: the URL
/// fragment, the persisted last-selection, and the CLI all carry slugs,
/// not numeric ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Backend-assigned identifier.
    pub id: u64,

    /// URL-safe unique name, used for selection and deep links.
    pub slug: String,

    /// Human-readable display name.
    pub name: String,
}

impl Project {
    /// Creates a new project with the given id, slug, and display name.
    #[must_use]
    pub fn new(id: u64, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            name: name.into(),
        }
    }
}
