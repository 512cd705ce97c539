//! The shared class definition cache.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use super::portable::ClassDefinition;
use crate::Result;

/// Process-wide cache of Portable class definitions keyed by
/// `(class_id, version)`.
///
/// Every envelope decoded or encoded under the same context shares this
/// cache. Each `lookup` and `register` is a single atomic map operation;
/// the cache only grows. When two callers race to register the same key
/// the first definition wins and both receive it.
#[derive(Default)]
pub struct SerializationContext {
    portable_version: i32,
    class_definitions: DashMap<(i32, i32), Arc<ClassDefinition>>,
}

impl SerializationContext {
    /// Creates an empty context that stamps `portable_version` on the
    /// definitions it builds for local types.
    pub fn new(portable_version: i32) -> Self {
        Self {
            portable_version,
            class_definitions: DashMap::new(),
        }
    }

    /// The version assigned to locally built class definitions.
    pub fn portable_version(&self) -> i32 {
        self.portable_version
    }

    /// Looks up a definition by identity.
    pub fn lookup(&self, class_id: i32, version: i32) -> Option<Arc<ClassDefinition>> {
        self.class_definitions
            .get(&(class_id, version))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Inserts `class_def` unless its identity is already cached, returning
    /// whichever definition the cache holds afterwards.
    pub fn register(&self, class_def: ClassDefinition) -> Arc<ClassDefinition> {
        let key = (class_def.class_id(), class_def.version());
        let entry = self.class_definitions.entry(key).or_insert_with(|| {
            tracing::debug!(
                factory_id = class_def.factory_id(),
                class_id = key.0,
                version = key.1,
                fields = class_def.field_count(),
                "registered class definition"
            );
            Arc::new(class_def)
        });
        Arc::clone(entry.value())
    }

    /// Parses a definition received from a peer and registers it.
    pub fn create_class_definition(&self, binary: &[u8]) -> Result<Arc<ClassDefinition>> {
        let class_def = ClassDefinition::from_binary(binary)?;
        Ok(self.register(class_def))
    }

    /// Number of cached definitions.
    pub fn len(&self) -> usize {
        self.class_definitions.len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.class_definitions.is_empty()
    }
}

impl fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationContext")
            .field("portable_version", &self.portable_version)
            .field("class_definitions", &self.class_definitions.len())
            .finish()
    }
}
