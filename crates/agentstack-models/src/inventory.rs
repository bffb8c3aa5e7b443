//! Installed model inventory and name matching.

use serde::Deserialize;

/// One installed model as listed by `/api/tags`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModelRecord {
    /// Full model name including tag (e.g., "llava:7b")
    pub name: String,

    /// Size on disk in bytes
    #[serde(default)]
    pub size: Option<u64>,

    /// Content digest
    #[serde(default)]
    pub digest: Option<String>,

    /// Last modification timestamp as reported by the server
    #[serde(default)]
    pub modified_at: Option<String>,
}

/// `/api/tags` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    models: Option<Vec<ModelRecord>>,
}

impl From<TagsResponse> for ModelInventory {
    fn from(response: TagsResponse) -> Self {
        ModelInventory::new(response.models.unwrap_or_default())
    }
}

/// Snapshot of installed models, in server order.
///
/// Built fresh from every tags query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelInventory {
    models: Vec<ModelRecord>,
}

impl ModelInventory {
    pub fn new(models: Vec<ModelRecord>) -> Self {
        Self { models }
    }

    /// Build an inventory from bare names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| ModelRecord {
                    name: name.into(),
                    size: None,
                    digest: None,
                    modified_at: None,
                })
                .collect(),
        )
    }

    pub fn records(&self) -> &[ModelRecord] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// True iff some installed name starts with `name` (case-sensitive).
    pub fn has_model(&self, name: &str) -> bool {
        has_model(self, name)
    }

    /// Every record whose name starts with `name`, in inventory order.
    pub fn matching(&self, name: &str) -> Vec<&ModelRecord> {
        self.models
            .iter()
            .filter(|m| m.name.starts_with(name))
            .collect()
    }

    /// Names of every record matching `name`.
    pub fn matching_names(&self, name: &str) -> Vec<String> {
        self.matching(name)
            .into_iter()
            .map(|m| m.name.clone())
            .collect()
    }
}

/// Prefix membership test used for availability checks.
///
/// `"llava"` matches `"llava:7b"` and also `"llava-extended"`.
pub fn has_model(inventory: &ModelInventory, name: &str) -> bool {
    inventory.models.iter().any(|m| m.name.starts_with(name))
}
