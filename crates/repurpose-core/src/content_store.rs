//! In-memory view of the content library and its generations.

use std::collections::HashMap;

use crate::models::{Content, Generation};

/// Mirror of what the UI currently shows. Holds no credentials and never
/// talks to the backend.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    contents: Vec<Content>,
    selected: Option<i64>,
    generations: HashMap<i64, Vec<Generation>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    pub fn set_contents(&mut self, contents: Vec<Content>) {
        self.contents = contents;
    }

    /// Newly uploaded content goes to the front of the list. An item that
    /// is already loaded is replaced where it stands.
    pub fn add_content(&mut self, content: Content) {
        match self.contents.iter_mut().find(|c| c.id == content.id) {
            Some(existing) => *existing = content,
            None => self.contents.insert(0, content),
        }
    }

    /// Drop a content item along with its generations and selection.
    pub fn remove_content(&mut self, content_id: i64) -> Option<Content> {
        let index = self.contents.iter().position(|c| c.id == content_id)?;
        self.generations.remove(&content_id);
        if self.selected == Some(content_id) {
            self.selected = None;
        }
        Some(self.contents.remove(index))
    }

    pub fn selected(&self) -> Option<&Content> {
        let id = self.selected?;
        self.contents.iter().find(|c| c.id == id)
    }

    /// Select by id. Unknown ids clear the selection.
    pub fn set_selected(&mut self, content_id: Option<i64>) {
        self.selected = content_id.filter(|id| self.contents.iter().any(|c| c.id == *id));
    }

    pub fn generations(&self, content_id: i64) -> &[Generation] {
        self.generations
            .get(&content_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_generations(&mut self, content_id: i64, generations: Vec<Generation>) {
        self.generations.insert(content_id, generations);
    }

    pub fn add_generation(&mut self, content_id: i64, generation: Generation) {
        self.generations.entry(content_id).or_default().push(generation);
    }

    pub fn remove_generation(&mut self, generation_id: i64) -> Option<Generation> {
        for generations in self.generations.values_mut() {
            if let Some(index) = generations.iter().position(|g| g.id == generation_id) {
                return Some(generations.remove(index));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::models::ContentType;

    fn ts() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-03-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn content(id: i64) -> Content {
        Content {
            id,
            user_id: 1,
            title: Some(format!("Post {}", id)),
            original_content: "body".to_string(),
            content_type: ContentType::Text,
            word_count: Some(1),
            created_at: ts(),
            updated_at: None,
        }
    }

    fn generation(id: i64, content_id: i64) -> Generation {
        Generation {
            id,
            content_id,
            platform: "twitter".to_string(),
            generated_text: "short".to_string(),
            tone: "Casual".to_string(),
            created_at: ts(),
        }
    }

    #[test]
    fn test_add_content_prepends() {
        let mut store = ContentStore::new();
        store.set_contents(vec![content(1), content(2)]);
        store.add_content(content(3));
        let ids: Vec<i64> = store.contents().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_add_loaded_content_replaces_it() {
        let mut store = ContentStore::new();
        store.set_contents(vec![content(1), content(2)]);

        let mut fresh = content(2);
        fresh.title = Some("Edited".to_string());
        store.add_content(fresh);

        let ids: Vec<i64> = store.contents().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.contents()[1].title.as_deref(), Some("Edited"));
    }

    #[test]
    fn test_selection() {
        let mut store = ContentStore::new();
        store.set_contents(vec![content(1), content(2)]);
        store.set_selected(Some(2));
        assert_eq!(store.selected().map(|c| c.id), Some(2));

        store.set_selected(Some(99));
        assert!(store.selected().is_none());
    }

    #[test]
    fn test_generations_per_content() {
        let mut store = ContentStore::new();
        assert!(store.generations(1).is_empty());

        store.set_generations(1, vec![generation(10, 1)]);
        store.add_generation(1, generation(11, 1));
        store.add_generation(2, generation(20, 2));

        assert_eq!(store.generations(1).len(), 2);
        assert_eq!(store.generations(1)[1].id, 11);
        assert_eq!(store.generations(2).len(), 1);

        assert_eq!(store.remove_generation(10).map(|g| g.id), Some(10));
        assert_eq!(store.generations(1).len(), 1);
        assert!(store.remove_generation(10).is_none());
    }

    #[test]
    fn test_remove_content_drops_related_state() {
        let mut store = ContentStore::new();
        store.set_contents(vec![content(1), content(2)]);
        store.set_selected(Some(1));
        store.add_generation(1, generation(10, 1));

        assert!(store.remove_content(1).is_some());
        assert!(store.selected().is_none());
        assert!(store.generations(1).is_empty());
        assert_eq!(store.contents().len(), 1);
        assert!(store.remove_content(1).is_none());
    }
}
