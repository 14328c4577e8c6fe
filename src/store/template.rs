use std::path::{Path, PathBuf};

use super::{json_files, read_json, write_json};
use crate::errors::StoreError;
use crate::request::GenerationRequest;

/// Named request templates, one JSON file each.
pub struct TemplateStore {
    dir: PathBuf,
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl TemplateStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_name(name) {
            return Err(StoreError::InvalidTemplateName {
                name: name.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    /// Save (or overwrite) a template.
    pub fn save(&self, name: &str, request: &GenerationRequest) -> Result<PathBuf, StoreError> {
        let path = self.path_for(name)?;
        write_json(&path, request)?;
        tracing::debug!(template = name, "saved template");
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<GenerationRequest, StoreError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StoreError::TemplateNotFound {
                name: name.to_string(),
            });
        }
        read_json(&path)
    }

    /// Template names, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(json_files(&self.dir)?
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect())
    }

    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StoreError::TemplateNotFound {
                name: name.to_string(),
            });
        }
        std::fs::remove_file(&path).map_err(|source| StoreError::Io { path, source })
    }
}
