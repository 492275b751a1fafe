//! Trigger collection manager.
//!
//! `TriggerCollection` owns the ordered list of committed descriptors that
//! the host panel renders. Every operation is synchronous and completes
//! fully before returning; the only multi-item mutations are the documented
//! bulk switches.

use rvtrigger_types::config::CollectionConfig;
use rvtrigger_types::error::{CollectionError, Field, ValidationErrors};
use rvtrigger_types::trigger::{TriggerDescriptor, TriggerId};
use tracing::{debug, info};

use crate::validation::validate_descriptor;

/// Ordered list of committed triggers.
#[derive(Debug, Clone, Default)]
pub struct TriggerCollection {
    triggers: Vec<TriggerDescriptor>,
    /// Global on/off switch driven by `toggle_all_enabled`.
    all_disabled: bool,
    capacity: Option<usize>,
}

impl TriggerCollection {
    /// Create an unbounded, empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection limited to the configured slot count.
    pub fn with_config(config: &CollectionConfig) -> Self {
        Self {
            capacity: config.capacity(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn get(&self, id: &TriggerId) -> Option<&TriggerDescriptor> {
        self.triggers.iter().find(|t| t.id == *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TriggerDescriptor> {
        self.triggers.iter()
    }

    pub fn as_slice(&self) -> &[TriggerDescriptor] {
        &self.triggers
    }

    /// State of the global switch: `true` after `toggle_all_enabled` turned
    /// every trigger off.
    pub fn all_disabled(&self) -> bool {
        self.all_disabled
    }

    fn position(&self, id: &TriggerId) -> Result<usize, CollectionError> {
        self.triggers
            .iter()
            .position(|t| t.id == *id)
            .ok_or(CollectionError::NotFound(*id))
    }

    /// Append a descriptor. Its id must not already be present.
    pub fn add(&mut self, descriptor: TriggerDescriptor) -> Result<(), CollectionError> {
        if self.get(&descriptor.id).is_some() {
            return Err(CollectionError::DuplicateId(descriptor.id));
        }
        if let Some(max) = self.capacity {
            if self.triggers.len() >= max {
                return Err(CollectionError::CapacityExceeded(max));
            }
        }
        validate_descriptor(&descriptor).map_err(CollectionError::Invalid)?;

        info!(
            id = %descriptor.id,
            name = %descriptor.name,
            kind = %descriptor.kind(),
            "Trigger added"
        );
        self.triggers.push(descriptor);
        Ok(())
    }

    /// Swap the descriptor with `id` in place, keeping list order.
    ///
    /// The replacement must carry the same id (the wizard preserves it on
    /// edit).
    pub fn replace(
        &mut self,
        id: &TriggerId,
        descriptor: TriggerDescriptor,
    ) -> Result<(), CollectionError> {
        let index = self.position(id)?;
        if descriptor.id != *id {
            let mut errors = ValidationErrors::new();
            errors.push(
                Field::Id,
                format!("replacement id {} does not match {id}", descriptor.id),
            );
            return Err(CollectionError::Invalid(errors));
        }
        validate_descriptor(&descriptor).map_err(CollectionError::Invalid)?;

        info!(%id, name = %descriptor.name, "Trigger replaced");
        self.triggers[index] = descriptor;
        Ok(())
    }

    /// Remove and return the descriptor with `id`.
    pub fn remove(&mut self, id: &TriggerId) -> Result<TriggerDescriptor, CollectionError> {
        let index = self.position(id)?;
        let removed = self.triggers.remove(index);
        info!(%id, name = %removed.name, "Trigger removed");
        Ok(removed)
    }

    /// Remove every descriptor. Returns how many were removed.
    pub fn remove_all(&mut self) -> usize {
        let count = self.triggers.len();
        self.triggers.clear();
        info!(count, "All triggers removed");
        count
    }

    pub fn set_enabled(&mut self, id: &TriggerId, enabled: bool) -> Result<(), CollectionError> {
        let index = self.position(id)?;
        self.triggers[index].enabled = enabled;
        debug!(%id, enabled, "Trigger enable flag set");
        Ok(())
    }

    /// Flip the global switch and apply it to every trigger.
    ///
    /// Individual enable states are not remembered: after the call every
    /// trigger is enabled, or every trigger is disabled. Returns the new
    /// `enabled` value.
    pub fn toggle_all_enabled(&mut self) -> bool {
        self.all_disabled = !self.all_disabled;
        let enabled = !self.all_disabled;
        self.apply_enabled(enabled);
        enabled
    }

    /// Enable every trigger and reset the global switch to "on".
    pub fn enable_all(&mut self) {
        self.all_disabled = false;
        self.apply_enabled(true);
    }

    /// Disable every trigger and set the global switch to "off".
    pub fn disable_all(&mut self) {
        self.all_disabled = true;
        self.apply_enabled(false);
    }

    fn apply_enabled(&mut self, enabled: bool) {
        for trigger in &mut self.triggers {
            trigger.enabled = enabled;
        }
        info!(enabled, count = self.triggers.len(), "Bulk enable flag applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rvtrigger_types::trigger::{ICountBlock, PrivilegeModes, TriggerControl};

    fn icount(name: &str, count: u32) -> TriggerDescriptor {
        TriggerDescriptor {
            id: TriggerId::new(),
            name: name.to_string(),
            enabled: true,
            hart_id: None,
            control: TriggerControl::ICount(ICountBlock {
                dmode: false,
                hit: false,
                action: 0,
                count,
                modes: PrivilegeModes {
                    machine: true,
                    supervisor: false,
                    user: false,
                },
            }),
            secondary_data: None,
            aux_select: None,
            aux_value: None,
        }
    }

    fn names(collection: &TriggerCollection) -> Vec<&str> {
        collection.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut collection = TriggerCollection::new();
        collection.add(icount("a", 1)).unwrap();
        collection.add(icount("b", 2)).unwrap();
        assert_eq!(names(&collection), vec!["a", "b"]);
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut collection = TriggerCollection::new();
        let trigger = icount("a", 1);
        collection.add(trigger.clone()).unwrap();
        assert!(matches!(
            collection.add(trigger),
            Err(CollectionError::DuplicateId(_))
        ));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_add_rejects_invalid_descriptor() {
        let mut collection = TriggerCollection::new();
        let err = collection.add(icount("  ", 0)).unwrap_err();
        match err {
            CollectionError::Invalid(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected invalid, got {other:?}"),
        }
        assert!(collection.is_empty());
    }

    #[test]
    fn test_add_respects_capacity() {
        let mut collection = TriggerCollection::with_config(&CollectionConfig {
            max_triggers: Some(1),
        });
        collection.add(icount("a", 1)).unwrap();
        assert!(matches!(
            collection.add(icount("b", 1)),
            Err(CollectionError::CapacityExceeded(1))
        ));
    }

    #[test]
    fn test_replace_preserves_order() {
        let mut collection = TriggerCollection::new();
        collection.add(icount("a", 1)).unwrap();
        let middle = icount("b", 2);
        let id = middle.id;
        collection.add(middle).unwrap();
        collection.add(icount("c", 3)).unwrap();

        let mut edited = icount("b2", 9);
        edited.id = id;
        collection.replace(&id, edited).unwrap();

        assert_eq!(names(&collection), vec!["a", "b2", "c"]);
    }

    #[test]
    fn test_replace_unknown_id_is_not_found() {
        let mut collection = TriggerCollection::new();
        let stray = icount("x", 1);
        let id = stray.id;
        assert!(matches!(
            collection.replace(&id, stray),
            Err(CollectionError::NotFound(_))
        ));
    }

    #[test]
    fn test_replace_rejects_different_id() {
        let mut collection = TriggerCollection::new();
        let original = icount("a", 1);
        let id = original.id;
        collection.add(original).unwrap();

        let err = collection.replace(&id, icount("b", 1)).unwrap_err();
        match err {
            CollectionError::Invalid(errors) => assert!(errors.has_field(Field::Id)),
            other => panic!("expected invalid, got {other:?}"),
        }
        assert_eq!(collection.get(&id).unwrap().name, "a");
    }

    #[test]
    fn test_remove_and_remove_all() {
        let mut collection = TriggerCollection::new();
        let first = icount("a", 1);
        let id = first.id;
        collection.add(first).unwrap();
        collection.add(icount("b", 1)).unwrap();

        let removed = collection.remove(&id).unwrap();
        assert_eq!(removed.name, "a");
        assert!(matches!(
            collection.remove(&id),
            Err(CollectionError::NotFound(_))
        ));

        assert_eq!(collection.remove_all(), 1);
        assert!(collection.is_empty());
    }

    #[test]
    fn test_set_enabled() {
        let mut collection = TriggerCollection::new();
        let trigger = icount("a", 1);
        let id = trigger.id;
        collection.add(trigger).unwrap();

        collection.set_enabled(&id, false).unwrap();
        assert!(!collection.get(&id).unwrap().enabled);
        assert!(collection.set_enabled(&TriggerId::new(), true).is_err());
    }

    #[test]
    fn test_toggle_all_is_a_global_switch() {
        let mut collection = TriggerCollection::new();
        let a = icount("a", 1);
        let a_id = a.id;
        collection.add(a).unwrap();
        collection.add(icount("b", 1)).unwrap();

        // Mixed individual states do not matter.
        collection.set_enabled(&a_id, false).unwrap();

        assert!(!collection.toggle_all_enabled());
        assert!(collection.all_disabled());
        assert!(collection.iter().all(|t| !t.enabled));

        assert!(collection.toggle_all_enabled());
        assert!(collection.iter().all(|t| t.enabled));
    }

    #[test]
    fn test_enable_and_disable_all_reset_switch() {
        let mut collection = TriggerCollection::new();
        collection.add(icount("a", 1)).unwrap();

        collection.disable_all();
        assert!(collection.all_disabled());
        assert!(collection.iter().all(|t| !t.enabled));

        collection.enable_all();
        assert!(!collection.all_disabled());
        // Next toggle turns everything off again.
        assert!(!collection.toggle_all_enabled());
    }
}
