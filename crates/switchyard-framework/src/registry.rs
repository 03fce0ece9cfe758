//! Group registry.
//!
//! Handlers are registered into integer-keyed groups. Groups are evaluated
//! lowest key first; handlers inside a group in registration order.
//!
//! The registry keeps one ordered map from key to handler sequence. Its key
//! set is the list of active groups: always ascending, never duplicated, and
//! never containing a key whose group is empty. Emptying a group, either
//! with [`remove_group`](GroupRegistry::remove_group) or by removing its
//! last handler, drops the key.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::handler::{BoxedHandler, HandlerId};

/// Priority key of a handler group. Lower keys run first.
pub type GroupKey = i32;

/// The group every handler lands in when no key is given.
pub const DEFAULT_GROUP: GroupKey = 0;

/// Ordered collection of handler groups.
#[derive(Default, Clone)]
pub struct GroupRegistry {
    groups: BTreeMap<GroupKey, Vec<BoxedHandler>>,
}

impl GroupRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Appends `handler` to the group `key`, creating the group if needed.
    ///
    /// Returns the handler's own id.
    pub fn add_to_group(&mut self, key: GroupKey, handler: BoxedHandler) -> HandlerId {
        let id = handler.id();
        let group = self.groups.entry(key).or_default();
        group.push(handler);
        debug!(group = key, handler = %id, position = group.len() - 1, "Handler registered");
        id
    }

    /// Appends `handler` to the default group `0`.
    pub fn add(&mut self, handler: BoxedHandler) -> HandlerId {
        self.add_to_group(DEFAULT_GROUP, handler)
    }

    /// Removes the whole group `key`.
    ///
    /// Returns `false` (and does nothing) if the group does not exist.
    pub fn remove_group(&mut self, key: GroupKey) -> bool {
        match self.groups.remove(&key) {
            Some(handlers) => {
                debug!(group = key, handlers = handlers.len(), "Group removed");
                true
            }
            None => false,
        }
    }

    /// Removes the first handler whose id is `id`.
    ///
    /// Groups are scanned in ascending key order. The relative order of the
    /// remaining handlers is preserved, and a group left empty is dropped.
    /// Returns `false` (and changes nothing) if no handler has this id.
    pub fn remove_handler(&mut self, id: &HandlerId) -> bool {
        let found = self.groups.iter().find_map(|(key, handlers)| {
            handlers
                .iter()
                .position(|h| &h.id() == id)
                .map(|index| (*key, index))
        });

        let Some((key, index)) = found else {
            trace!(handler = %id, "No handler with this id");
            return false;
        };

        if let Some(handlers) = self.groups.get_mut(&key) {
            handlers.remove(index);
            if handlers.is_empty() {
                self.groups.remove(&key);
            }
        }
        debug!(group = key, handler = %id, "Handler removed");
        true
    }

    /// Returns the active group keys in ascending order.
    pub fn group_keys(&self) -> Vec<GroupKey> {
        self.groups.keys().copied().collect()
    }

    /// Returns the number of handlers in group `key`.
    pub fn group_len(&self, key: GroupKey) -> usize {
        self.groups.get(&key).map_or(0, Vec::len)
    }

    /// Returns the handlers of group `key` in evaluation order.
    pub fn group(&self, key: GroupKey) -> &[BoxedHandler] {
        self.groups.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the total number of registered handlers.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns `true` if some group holds a handler with this id.
    pub fn contains(&self, id: &HandlerId) -> bool {
        self.groups
            .values()
            .flatten()
            .any(|handler| &handler.id() == id)
    }

    /// Removes every group.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    /// Copies the groups, in evaluation order, for one dispatch pass.
    pub fn snapshot(&self) -> Vec<(GroupKey, Vec<BoxedHandler>)> {
        self.groups
            .iter()
            .map(|(key, handlers)| (*key, handlers.clone()))
            .collect()
    }
}

impl std::fmt::Debug for GroupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, handlers) in &self.groups {
            let ids: Vec<HandlerId> = handlers.iter().map(|h| h.id()).collect();
            map.entry(key, &ids);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;

    fn ids(handlers: &[BoxedHandler]) -> Vec<String> {
        handlers.iter().map(|h| h.id().to_string()).collect()
    }

    #[test]
    fn test_add_returns_handler_id() {
        let recorder = Recorder::new();
        let mut registry = GroupRegistry::new();

        let id = registry.add(recorder.handler("a"));

        assert_eq!(id, HandlerId::new("a"));
        assert_eq!(registry.group_keys(), vec![DEFAULT_GROUP]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_keys_stay_sorted_and_unique() {
        let recorder = Recorder::new();
        let mut registry = GroupRegistry::new();

        registry.add_to_group(5, recorder.handler("a"));
        registry.add_to_group(-3, recorder.handler("b"));
        registry.add_to_group(5, recorder.handler("c"));
        registry.add_to_group(0, recorder.handler("d"));
        registry.add_to_group(-3, recorder.handler("e"));

        assert_eq!(registry.group_keys(), vec![-3, 0, 5]);
        assert_eq!(ids(registry.group(5)), vec!["a", "c"]);
        assert_eq!(ids(registry.group(-3)), vec!["b", "e"]);
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_same_new_key_twice_reuses_group() {
        let recorder = Recorder::new();
        let mut registry = GroupRegistry::new();

        registry.add_to_group(7, recorder.handler("a"));
        registry.add_to_group(7, recorder.handler("b"));

        assert_eq!(registry.group_keys(), vec![7]);
        assert_eq!(registry.group_len(7), 2);
        assert_eq!(ids(registry.group(7)), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_unknown_handler_changes_nothing() {
        let recorder = Recorder::new();
        let mut registry = GroupRegistry::new();
        registry.add_to_group(1, recorder.handler("a"));
        registry.add_to_group(2, recorder.handler("b"));
        let before = format!("{registry:?}");

        assert!(!registry.remove_handler(&HandlerId::new("missing")));
        assert_eq!(format!("{registry:?}"), before);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_handler_preserves_order() {
        let recorder = Recorder::new();
        let mut registry = GroupRegistry::new();
        for name in ["a", "b", "c", "d"] {
            registry.add(recorder.handler(name));
        }

        assert!(registry.remove_handler(&HandlerId::new("b")));

        assert_eq!(ids(registry.group(0)), vec!["a", "c", "d"]);
        assert!(!registry.contains(&HandlerId::new("b")));
    }

    #[test]
    fn test_removing_last_handler_prunes_key() {
        let recorder = Recorder::new();
        let mut registry = GroupRegistry::new();
        registry.add_to_group(1, recorder.handler("a"));
        registry.add_to_group(2, recorder.handler("b"));

        assert!(registry.remove_handler(&HandlerId::new("a")));

        assert_eq!(registry.group_keys(), vec![2]);
        assert_eq!(registry.group_len(1), 0);
    }

    #[test]
    fn test_remove_handler_takes_lowest_group_first() {
        let recorder = Recorder::new();
        let mut registry = GroupRegistry::new();
        registry.add_to_group(9, recorder.handler("dup"));
        registry.add_to_group(-1, recorder.handler("dup"));

        assert!(registry.remove_handler(&HandlerId::new("dup")));

        assert_eq!(registry.group_keys(), vec![9]);
        assert!(registry.contains(&HandlerId::new("dup")));
    }

    #[test]
    fn test_remove_group_prunes_key_and_is_idempotent() {
        let recorder = Recorder::new();
        let mut registry = GroupRegistry::new();
        registry.add_to_group(1, recorder.handler("a"));
        registry.add_to_group(2, recorder.handler("b"));

        assert!(registry.remove_group(1));
        assert!(!registry.remove_group(1));
        assert!(!registry.remove_group(42));
        assert_eq!(registry.group_keys(), vec![2]);

        registry.add_to_group(1, recorder.handler("c"));
        assert_eq!(registry.group_keys(), vec![1, 2]);
        assert_eq!(ids(registry.group(1)), vec!["c"]);
    }

    #[test]
    fn test_snapshot_is_ordered_and_detached() {
        let recorder = Recorder::new();
        let mut registry = GroupRegistry::new();
        registry.add_to_group(10, recorder.handler("late"));
        registry.add_to_group(-10, recorder.handler("early"));

        let snapshot = registry.snapshot();
        registry.clear();

        let keys: Vec<GroupKey> = snapshot.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![-10, 10]);
        assert_eq!(ids(&snapshot[0].1), vec!["early"]);
        assert!(registry.is_empty());
    }
}
