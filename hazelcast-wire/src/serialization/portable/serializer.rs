//! Portable encoding on top of the shared schema cache.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use super::{
    ClassDefinition, ClassDefinitionWriter, DefaultPortableReader, DefaultPortableWriter, Portable,
    PortableFactory,
};
use crate::error::{HazelcastError, Result};
use crate::serialization::SerializationContext;

/// Serializer for Portable objects.
///
/// Class definitions are derived from a type's own `write_portable` the
/// first time it is encoded and registered in the shared context, so every
/// later envelope of that type reuses the same descriptor.
pub struct PortableSerializer {
    context: Arc<SerializationContext>,
    factories: DashMap<i32, Arc<dyn PortableFactory>>,
}

impl fmt::Debug for PortableSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortableSerializer")
            .field("context", &self.context)
            .field("factories", &self.factories.len())
            .finish()
    }
}

impl PortableSerializer {
    /// Creates a serializer backed by `context`.
    pub fn new(context: Arc<SerializationContext>) -> Self {
        Self {
            context,
            factories: DashMap::new(),
        }
    }

    /// Registers a factory used by [`create`](Self::create).
    pub fn register_factory(&self, factory: Arc<dyn PortableFactory>) {
        self.factories.insert(factory.factory_id(), factory);
    }

    /// Returns the definition for `portable`, building and registering it on
    /// first use.
    pub fn class_definition_for<P: Portable + ?Sized>(
        &self,
        portable: &P,
    ) -> Result<Arc<ClassDefinition>> {
        let version = self.context.portable_version();
        let class_def = match self.context.lookup(portable.class_id(), version) {
            Some(known) => known,
            None => {
                let mut recorder =
                    ClassDefinitionWriter::new(portable.factory_id(), portable.class_id(), version);
                portable.write_portable(&mut recorder)?;
                self.context.register(recorder.build()?)
            }
        };

        if class_def.factory_id() != portable.factory_id() {
            return Err(HazelcastError::Serialization(format!(
                "class id {} version {} is registered for factory {}, not {}",
                class_def.class_id(),
                version,
                class_def.factory_id(),
                portable.factory_id()
            )));
        }
        Ok(class_def)
    }

    /// Encodes `portable`, returning its class definition and payload bytes.
    pub fn write<P: Portable + ?Sized>(
        &self,
        portable: &P,
    ) -> Result<(Arc<ClassDefinition>, Vec<u8>)> {
        let class_def = self.class_definition_for(portable)?;
        let mut writer = DefaultPortableWriter::new(&class_def);
        portable.write_portable(&mut writer)?;
        let bytes = writer.to_bytes()?;
        Ok((class_def, bytes))
    }

    /// Populates `target` from a payload laid out by `class_def`.
    pub fn read_into<P: Portable + ?Sized>(
        &self,
        class_def: &ClassDefinition,
        payload: &[u8],
        target: &mut P,
    ) -> Result<()> {
        if target.factory_id() != class_def.factory_id() || target.class_id() != class_def.class_id()
        {
            return Err(HazelcastError::Serialization(format!(
                "type mismatch: expected factory_id={}, class_id={}, got factory_id={}, class_id={}",
                target.factory_id(),
                target.class_id(),
                class_def.factory_id(),
                class_def.class_id()
            )));
        }
        let mut reader = DefaultPortableReader::from_bytes(class_def, payload, &self.context)?;
        target.read_portable(&mut reader)
    }

    /// Creates and populates an instance through the registered factory.
    pub fn create(&self, class_def: &ClassDefinition, payload: &[u8]) -> Result<Box<dyn Portable>> {
        let factory = self
            .factories
            .get(&class_def.factory_id())
            .map(|f| Arc::clone(f.value()))
            .ok_or_else(|| {
                HazelcastError::Serialization(format!(
                    "no factory registered for factory_id={}",
                    class_def.factory_id()
                ))
            })?;
        let mut instance = factory.create(class_def.class_id()).ok_or_else(|| {
            HazelcastError::Serialization(format!(
                "factory {} cannot create class_id={}",
                class_def.factory_id(),
                class_def.class_id()
            ))
        })?;
        self.read_into(class_def, payload, instance.as_mut())?;
        Ok(instance)
    }
}
