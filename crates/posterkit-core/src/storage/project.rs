//! Persisted project format.

use super::{Storage, StorageError, StorageResult};
use crate::document::Document;
use crate::element::Element;
use serde::{Deserialize, Serialize};

/// Storage key of the saved project.
pub const PROJECT_KEY: &str = "html-poster-editor:v1";

/// The saved form of a poster: `{ "elements": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub elements: Vec<Element>,
}

impl Project {
    pub fn from_document(document: &Document) -> Self {
        Self {
            elements: document.elements().to_vec(),
        }
    }

    /// Convert to a document, regenerating duplicate ids.
    pub fn into_document(self) -> Document {
        Document::from_elements(self.elements)
    }

    pub fn to_json(&self) -> StorageResult<String> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> StorageResult<Self> {
        serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Save `document` under [`PROJECT_KEY`].
pub fn save_project(storage: &dyn Storage, document: &Document) -> StorageResult<()> {
    let json = Project::from_document(document).to_json()?;
    storage.set(PROJECT_KEY, &json)?;
    log::info!("Saved project with {} elements", document.len());
    Ok(())
}

/// Load the saved project.
///
/// Returns `Ok(None)` when nothing is saved or the saved project has no
/// elements; malformed data is an error.
pub fn load_project(storage: &dyn Storage) -> StorageResult<Option<Document>> {
    let Some(json) = storage.get(PROJECT_KEY)? else {
        return Ok(None);
    };
    let project = Project::from_json(&json)?;
    if project.elements.is_empty() {
        return Ok(None);
    }
    let document = project.into_document();
    log::info!("Loaded project with {} elements", document.len());
    Ok(Some(document))
}

/// Remove the saved project.
pub fn clear_project(storage: &dyn Storage) -> StorageResult<()> {
    storage.remove(PROJECT_KEY)
}
