//! The chord-to-actions map.

use std::collections::HashMap;
use std::sync::Arc;

use horizon_dock_core::logging::targets;
use parking_lot::RwLock;

use super::{ActionRef, MultipleKeyAction};
use crate::error::Result;
use crate::keys::KeyChord;
use crate::provider::ProviderRef;

/// Maps each bound chord to the bucket of actions sharing it.
#[derive(Debug, Default)]
pub struct KeyBindingRegistry {
    buckets: RwLock<HashMap<KeyChord, Arc<MultipleKeyAction>>>,
}

impl KeyBindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `action` under its current chord. Unbound actions are ignored.
    pub fn register(&self, action: &ActionRef, provider: Option<&ProviderRef>) -> Result<()> {
        let Some(chord) = action.key_binding() else {
            return Ok(());
        };
        let mut buckets = self.buckets.write();
        let bucket = buckets
            .entry(chord)
            .or_insert_with(|| Arc::new(MultipleKeyAction::new(chord)));
        if let Err(err) = bucket.add_action(action.clone(), provider.cloned()) {
            if bucket.is_empty() {
                buckets.remove(&chord);
            }
            return Err(err);
        }
        drop(buckets);
        tracing::trace!(
            target: targets::KEYS,
            action = %action.full_name(),
            %chord,
            "key binding registered"
        );
        Ok(())
    }

    /// Unbind `action` from `chord`, dropping the bucket once empty.
    pub fn unregister(&self, action: &ActionRef, chord: KeyChord) -> bool {
        let mut buckets = self.buckets.write();
        let Some(bucket) = buckets.get(&chord) else {
            return false;
        };
        let removed = bucket.remove_action(action);
        if bucket.is_empty() {
            buckets.remove(&chord);
        }
        removed
    }

    /// Unbind every binding the predicate selects, in every bucket, and
    /// return the unbound actions.
    pub(crate) fn remove_where(
        &self,
        mut remove: impl FnMut(&ActionRef, Option<&ProviderRef>) -> bool,
    ) -> Vec<ActionRef> {
        let mut buckets = self.buckets.write();
        let removed = buckets
            .values()
            .flat_map(|bucket| bucket.remove_where(&mut remove))
            .collect();
        buckets.retain(|_, bucket| !bucket.is_empty());
        removed
    }

    /// The bucket for `chord`, if anything is bound to it.
    pub fn bucket(&self, chord: KeyChord) -> Option<Arc<MultipleKeyAction>> {
        self.buckets.read().get(&chord).cloned()
    }

    /// Every chord with at least one binding.
    pub fn chords(&self) -> Vec<KeyChord> {
        let mut chords: Vec<KeyChord> = self.buckets.read().keys().copied().collect();
        chords.sort();
        chords
    }

    pub fn len(&self) -> usize {
        self.buckets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }

    pub fn clear(&self) {
        self.buckets.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{same_action, DockingAction, DockingActionIf, KeyBindingData};
    use crate::keys::Key;

    fn bound(name: &str, chord: KeyChord) -> ActionRef {
        Arc::new(DockingAction::new(name, "TestPlugin").with_key_binding(KeyBindingData::new(chord)))
    }

    #[test]
    fn test_register_groups_by_chord() {
        let registry = KeyBindingRegistry::new();
        let a = bound("A", KeyChord::ctrl(Key::A));
        let b = bound("B", KeyChord::ctrl(Key::A));
        let c = bound("C", KeyChord::ctrl(Key::C));
        for action in [&a, &b, &c] {
            registry.register(action, None).unwrap();
        }

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.bucket(KeyChord::ctrl(Key::A)).map(|b| b.len()), Some(2));
        assert_eq!(registry.chords(), vec![KeyChord::ctrl(Key::A), KeyChord::ctrl(Key::C)]);
    }

    #[test]
    fn test_unbound_actions_are_ignored() {
        let registry = KeyBindingRegistry::new();
        let action: ActionRef = Arc::new(DockingAction::new("Plain", "TestPlugin"));
        registry.register(&action, None).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_buckets_are_dropped() {
        let registry = KeyBindingRegistry::new();
        let a = bound("A", KeyChord::ctrl(Key::A));
        registry.register(&a, None).unwrap();

        assert!(registry.unregister(&a, KeyChord::ctrl(Key::A)));
        assert!(registry.bucket(KeyChord::ctrl(Key::A)).is_none());
        assert!(!registry.unregister(&a, KeyChord::ctrl(Key::A)));
    }

    #[test]
    fn test_remove_where_by_owner() {
        let registry = KeyBindingRegistry::new();
        let a = bound("A", KeyChord::ctrl(Key::A));
        let other: ActionRef = Arc::new(
            DockingAction::new("B", "OtherPlugin")
                .with_key_binding(KeyBindingData::new(KeyChord::ctrl(Key::A))),
        );
        registry.register(&a, None).unwrap();
        registry.register(&other, None).unwrap();

        let removed = registry.remove_where(|action, _| action.owner() == "TestPlugin");
        assert_eq!(removed.len(), 1);
        assert!(same_action(&removed[0], &a));
        assert_eq!(registry.bucket(KeyChord::ctrl(Key::A)).map(|b| b.len()), Some(1));
    }

    #[test]
    fn test_concurrent_rebinds_on_one_chord() {
        let registry = Arc::new(KeyBindingRegistry::new());
        let chord = KeyChord::ctrl_shift(Key::X);
        let workers: Vec<_> = ["A", "B"]
            .into_iter()
            .map(|name| {
                let registry = registry.clone();
                let action = bound(name, chord);
                std::thread::spawn(move || {
                    for _ in 0..2_000 {
                        registry.register(&action, None).unwrap();
                        let bucket = registry.bucket(chord).expect("bound chord has a bucket");
                        assert!(bucket.actions().iter().any(|a| same_action(a, &action)));
                        assert!(registry.unregister(&action, chord));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert!(registry.is_empty());
    }
}
