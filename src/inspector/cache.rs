//! Bounded FIFO store of recently inspected elements.
//!
//! The history panel must not grow without bound during a long session, so
//! distinct selections are kept in an insertion-ordered map capped at
//! `max_history` entries. Eviction is FIFO, not LRU: re-observing an element
//! refreshes its entry in place without bumping it, so genuinely new finds
//! are what push old ones out.

use std::collections::VecDeque;

use chrono::Local;

use crate::inspector::descriptor::ElementDescriptor;

/// Composite identity of a selection. Two observations with the same tag,
/// id and class list are the same element as far as history is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectionKey {
    tag: String,
    id: String,
    class_attr: String,
}

impl SelectionKey {
    fn of(descriptor: &ElementDescriptor) -> Self {
        Self {
            tag: descriptor.tag.clone(),
            id: descriptor.id.clone(),
            class_attr: descriptor.class_attr.clone(),
        }
    }
}

/// One line of the history panel, captured when its element was first
/// observed (and refreshed in place on later observations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Local time of day, `HH:MM:SS`.
    pub captured_at: String,
    pub tag: String,
    /// Element id, or `"-"` when empty.
    pub id: String,
    /// Class list, or `"-"` when empty.
    pub class_attr: String,
}

impl HistoryEntry {
    fn capture(descriptor: &ElementDescriptor) -> Self {
        let dash_if_empty = |s: &str| {
            if s.is_empty() {
                "-".to_string()
            } else {
                s.to_string()
            }
        };
        Self {
            captured_at: Local::now().format("%H:%M:%S").to_string(),
            tag: descriptor.tag.clone(),
            id: dash_if_empty(&descriptor.id),
            class_attr: dash_if_empty(&descriptor.class_attr),
        }
    }
}

/// Insertion-ordered `(tag, id, class)` → [`HistoryEntry`] map bounded at
/// `max_history` entries.
#[derive(Debug)]
pub struct SelectionCache {
    max_history: usize,
    entries: VecDeque<(SelectionKey, HistoryEntry)>,
}

impl SelectionCache {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            entries: VecDeque::with_capacity(max_history + 1),
        }
    }

    /// Record an observation of `descriptor`. `None` is a no-op.
    ///
    /// A new key is appended at the back; when that pushes the size past
    /// `max_history`, the oldest-inserted entry is evicted. An existing key
    /// has its entry overwritten in place — its position never changes.
    pub fn touch(&mut self, descriptor: Option<&ElementDescriptor>) {
        let Some(descriptor) = descriptor else {
            return;
        };
        let key = SelectionKey::of(descriptor);
        let entry = HistoryEntry::capture(descriptor);

        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = entry;
            return;
        }

        self.entries.push_back((key, entry));
        while self.entries.len() > self.max_history {
            self.entries.pop_front();
        }
    }

    /// Entries in insertion order, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::descriptor::Dimensions;

    fn descriptor(tag: &str, id: &str, class_attr: &str) -> ElementDescriptor {
        ElementDescriptor {
            tag: tag.to_string(),
            class_attr: class_attr.to_string(),
            id: id.to_string(),
            attributes: String::new(),
            text: String::new(),
            html: String::new(),
            dimensions: Dimensions::default(),
            child_count: 0,
            parent_tag: "none".to_string(),
        }
    }

    fn tags(cache: &SelectionCache) -> Vec<String> {
        cache.entries().map(|e| e.tag.clone()).collect()
    }

    #[test]
    fn touch_none_is_a_noop() {
        let mut cache = SelectionCache::new(5);
        cache.touch(None);
        assert!(cache.is_empty());

        cache.touch(Some(&descriptor("div", "a", "")));
        cache.touch(None);
        assert_eq!(cache.len(), 1);
        assert_eq!(tags(&cache), vec!["div"]);
    }

    #[test]
    fn single_selection_records_fields() {
        let mut cache = SelectionCache::new(5);
        cache.touch(Some(&descriptor("div", "main", "box")));

        let entries: Vec<&HistoryEntry> = cache.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].tag, "div");
        assert_eq!(entries[0].id, "main");
        assert_eq!(entries[0].class_attr, "box");
        // HH:MM:SS
        assert_eq!(entries[0].captured_at.len(), 8);
    }

    #[test]
    fn empty_id_and_class_render_as_dash() {
        let mut cache = SelectionCache::new(5);
        cache.touch(Some(&descriptor("span", "", "")));

        let entry = cache.entries().next().unwrap();
        assert_eq!(entry.id, "-");
        assert_eq!(entry.class_attr, "-");
    }

    #[test]
    fn overflow_evicts_oldest_first_inserted() {
        let mut cache = SelectionCache::new(5);
        for tag in ["e1", "e2", "e3", "e4", "e5", "e6"] {
            cache.touch(Some(&descriptor(tag, "", "")));
        }
        assert_eq!(cache.len(), 5);
        assert_eq!(tags(&cache), vec!["e2", "e3", "e4", "e5", "e6"]);
    }

    #[test]
    fn bound_holds_for_long_distinct_sequences() {
        let mut cache = SelectionCache::new(5);
        for i in 0..100 {
            cache.touch(Some(&descriptor("div", &format!("id{i}"), "")));
            assert!(cache.len() <= 5);
        }
        let ids: Vec<String> = cache.entries().map(|e| e.id.clone()).collect();
        assert_eq!(ids, vec!["id95", "id96", "id97", "id98", "id99"]);
    }

    #[test]
    fn retouch_refreshes_in_place_without_moving() {
        let mut cache = SelectionCache::new(5);
        cache.touch(Some(&descriptor("a", "first", "")));
        cache.touch(Some(&descriptor("b", "second", "")));
        cache.touch(Some(&descriptor("c", "third", "")));

        // Re-observe the oldest element; it must keep its slot.
        cache.touch(Some(&descriptor("a", "first", "")));
        assert_eq!(tags(&cache), vec!["a", "b", "c"]);
    }

    #[test]
    fn fifo_eviction_ignores_recent_touches() {
        // E1 is re-touched right before overflow; FIFO still evicts it.
        let mut cache = SelectionCache::new(2);
        cache.touch(Some(&descriptor("e1", "", "")));
        cache.touch(Some(&descriptor("e2", "", "")));
        cache.touch(Some(&descriptor("e1", "", "")));
        cache.touch(Some(&descriptor("e3", "", "")));

        assert_eq!(tags(&cache), vec!["e2", "e3"]);
    }

    #[test]
    fn same_tag_different_identity_is_distinct() {
        let mut cache = SelectionCache::new(5);
        cache.touch(Some(&descriptor("div", "a", "")));
        cache.touch(Some(&descriptor("div", "b", "")));
        cache.touch(Some(&descriptor("div", "a", "box")));
        assert_eq!(cache.len(), 3);
    }
}
