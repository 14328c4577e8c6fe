use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{ContentKind, GeneratedContentItem, ScoreData};

/// Ordered, append-only list of generated items.
///
/// Items are never removed individually. Attaching a score by id is the
/// only in-place update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentStore {
    items: Vec<GeneratedContentItem>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<GeneratedContentItem>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: GeneratedContentItem) {
        self.items.push(item);
    }

    /// Drop every item. Only a new primary run does this.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Attach a score to the item with `id`. Returns false if no such item.
    pub fn attach_score(&mut self, id: Uuid, score: ScoreData) -> bool {
        match self.get_mut(id) {
            Some(item) => {
                item.score = Some(score);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&GeneratedContentItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut GeneratedContentItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Look up an item by full id or a unique id prefix.
    ///
    /// Returns `None` when nothing matches or the prefix is ambiguous.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<&GeneratedContentItem> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return None;
        }
        let mut matches = self
            .items
            .iter()
            .filter(|i| i.id.to_string().starts_with(&prefix));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }

    pub fn items(&self) -> &[GeneratedContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_kind(&self, kind: ContentKind) -> usize {
        self.items.iter().filter(|i| i.kind() == kind).count()
    }
}
