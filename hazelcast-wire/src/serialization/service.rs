//! Conversion between values and [`Data`] envelopes.

use std::sync::Arc;

use super::constants::{
    BOOLEAN_TYPE_ID, BYTE_ARRAY_TYPE_ID, INTEGER_TYPE_ID, LONG_TYPE_ID, PORTABLE_TYPE_ID,
    STRING_TYPE_ID,
};
use super::portable::{
    ClassDefinition, ClassDefinitionRef, Portable, PortableFactory, PortableSerializer,
};
use super::{Data, DataInput, DataOutput, ObjectDataInput, ObjectDataOutput, SerializationContext};
use crate::error::{HazelcastError, Result};
use crate::partition_aware::PartitionAware;

/// Values that can be turned into an envelope.
pub trait ToData: Send + Sync {
    /// Encodes `self` with the given service.
    fn to_data(&self, service: &SerializationService) -> Result<Data>;
}

/// Values that can be read back from an envelope.
pub trait FromData: Sized {
    /// Decodes a value from `data`.
    fn from_data(data: &Data, service: &SerializationService) -> Result<Self>;
}

/// The serialization entry point of a member.
///
/// Owns the shared [`SerializationContext`]; every envelope produced or
/// read through the same service shares one class definition cache.
#[derive(Debug)]
pub struct SerializationService {
    context: Arc<SerializationContext>,
    portable: PortableSerializer,
}

impl SerializationService {
    /// Creates a service with a fresh context.
    pub fn new(portable_version: i32) -> Self {
        Self::with_context(Arc::new(SerializationContext::new(portable_version)))
    }

    /// Creates a service over an existing context.
    pub fn with_context(context: Arc<SerializationContext>) -> Self {
        Self {
            portable: PortableSerializer::new(Arc::clone(&context)),
            context,
        }
    }

    /// Returns the shared class definition cache.
    pub fn context(&self) -> &Arc<SerializationContext> {
        &self.context
    }

    /// Registers a factory for [`to_portable_object`](Self::to_portable_object).
    pub fn register_portable_factory(&self, factory: Arc<dyn PortableFactory>) {
        self.portable.register_factory(factory);
    }

    /// Encodes any supported value.
    pub fn to_data<T: ToData + ?Sized>(&self, value: &T) -> Result<Data> {
        value.to_data(self)
    }

    /// Decodes any supported value.
    pub fn to_object<T: FromData>(&self, data: &Data) -> Result<T> {
        T::from_data(data, self)
    }

    /// Encodes `value` and routes it by `key` instead of by its content.
    pub fn to_data_with_partition_key<T, K>(&self, value: &T, key: &K) -> Result<Data>
    where
        T: ToData + ?Sized,
        K: PartitionAware + ?Sized,
    {
        let data = self.to_data(value)?;
        data.set_partition_hash(key.partition_hash());
        Ok(data)
    }

    /// Encodes a Portable value with its class definition attached.
    pub fn portable_to_data<P: Portable + ?Sized>(&self, portable: &P) -> Result<Data> {
        let (class_def, payload) = self.portable.write(portable)?;
        Ok(Data::with_class_definition(PORTABLE_TYPE_ID, class_def, payload))
    }

    /// Decodes a Portable value of a statically known type.
    pub fn to_portable<P: Portable + Default>(&self, data: &Data) -> Result<P> {
        let mut instance = P::default();
        self.read_portable_into(data, &mut instance)?;
        Ok(instance)
    }

    /// Populates `target` from a Portable envelope.
    pub fn read_portable_into<P: Portable + ?Sized>(
        &self,
        data: &Data,
        target: &mut P,
    ) -> Result<()> {
        let class_def = self.portable_class_definition(data)?;
        self.portable.read_into(&class_def, data.buffer(), target)
    }

    /// Decodes a Portable envelope through the registered factories.
    pub fn to_portable_object(&self, data: &Data) -> Result<Box<dyn Portable>> {
        let class_def = self.portable_class_definition(data)?;
        self.portable.create(&class_def, data.buffer())
    }

    /// The resolved class definition of a Portable envelope.
    pub fn portable_class_definition(&self, data: &Data) -> Result<Arc<ClassDefinition>> {
        if data.type_id() != PORTABLE_TYPE_ID {
            return Err(HazelcastError::Serialization(format!(
                "expected a portable envelope, got type {}",
                data.type_id()
            )));
        }
        match data.class_definition() {
            Some(ClassDefinitionRef::Resolved(cd)) => Ok(Arc::clone(cd)),
            Some(ClassDefinitionRef::Proxy(proxy)) => proxy.to_real(&self.context),
            None => Err(HazelcastError::Serialization(
                "portable envelope carries no class definition".to_string(),
            )),
        }
    }
}

fn encode(type_id: i32, write: impl FnOnce(&mut ObjectDataOutput) -> Result<()>) -> Result<Data> {
    let mut out = ObjectDataOutput::with_capacity(16);
    write(&mut out)?;
    Ok(Data::new(type_id, out.freeze()))
}

fn decode<T>(
    data: &Data,
    type_id: i32,
    read: impl FnOnce(&mut ObjectDataInput<'_>) -> Result<T>,
) -> Result<T> {
    if data.type_id() != type_id {
        return Err(HazelcastError::Serialization(format!(
            "expected type {}, got {}",
            type_id,
            data.type_id()
        )));
    }
    let mut input = ObjectDataInput::new(data.buffer());
    let value = read(&mut input)?;
    if input.remaining() != 0 {
        return Err(HazelcastError::Serialization(format!(
            "{} unread payload bytes for type {}",
            input.remaining(),
            type_id
        )));
    }
    Ok(value)
}

impl ToData for Data {
    fn to_data(&self, _service: &SerializationService) -> Result<Data> {
        Ok(self.clone())
    }
}

impl FromData for Data {
    fn from_data(data: &Data, _service: &SerializationService) -> Result<Self> {
        Ok(data.clone())
    }
}

impl ToData for bool {
    fn to_data(&self, _service: &SerializationService) -> Result<Data> {
        encode(BOOLEAN_TYPE_ID, |out| out.write_bool(*self))
    }
}

impl FromData for bool {
    fn from_data(data: &Data, _service: &SerializationService) -> Result<Self> {
        decode(data, BOOLEAN_TYPE_ID, |input| input.read_bool())
    }
}

impl ToData for i32 {
    fn to_data(&self, _service: &SerializationService) -> Result<Data> {
        encode(INTEGER_TYPE_ID, |out| out.write_int(*self))
    }
}

impl FromData for i32 {
    fn from_data(data: &Data, _service: &SerializationService) -> Result<Self> {
        decode(data, INTEGER_TYPE_ID, |input| input.read_int())
    }
}

impl ToData for i64 {
    fn to_data(&self, _service: &SerializationService) -> Result<Data> {
        encode(LONG_TYPE_ID, |out| out.write_long(*self))
    }
}

impl FromData for i64 {
    fn from_data(data: &Data, _service: &SerializationService) -> Result<Self> {
        decode(data, LONG_TYPE_ID, |input| input.read_long())
    }
}

impl ToData for str {
    fn to_data(&self, _service: &SerializationService) -> Result<Data> {
        encode(STRING_TYPE_ID, |out| out.write_string(self))
    }
}

impl ToData for String {
    fn to_data(&self, service: &SerializationService) -> Result<Data> {
        self.as_str().to_data(service)
    }
}

impl FromData for String {
    fn from_data(data: &Data, _service: &SerializationService) -> Result<Self> {
        decode(data, STRING_TYPE_ID, |input| input.read_string())
    }
}

impl ToData for Vec<u8> {
    fn to_data(&self, _service: &SerializationService) -> Result<Data> {
        encode(BYTE_ARRAY_TYPE_ID, |out| {
            out.write_length(self.len())?;
            out.write_bytes(self)
        })
    }
}

impl FromData for Vec<u8> {
    fn from_data(data: &Data, _service: &SerializationService) -> Result<Self> {
        decode(data, BYTE_ARRAY_TYPE_ID, |input| {
            let len = input.read_length()?;
            input.read_bytes(len)
        })
    }
}
