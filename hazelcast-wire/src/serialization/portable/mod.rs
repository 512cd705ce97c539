//! Portable class definitions: the schema descriptors carried inside a
//! [`Data`](crate::serialization::Data) envelope.

mod reader_writer;
mod serializer;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::serialization::{Data, DataInput, DataOutput, ObjectDataInput, ObjectDataOutput};
use crate::serialization::SerializationContext;
use crate::{HazelcastError, Result};

pub use reader_writer::{ClassDefinitionWriter, DefaultPortableReader, DefaultPortableWriter};
pub use serializer::PortableSerializer;

/// Supported field types in Portable serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum FieldType {
    /// Signed 8-bit integer.
    Byte = 1,
    /// Boolean value.
    Bool = 2,
    /// 16-bit Unicode character.
    Char = 3,
    /// Signed 16-bit integer.
    Short = 4,
    /// Signed 32-bit integer.
    Int = 5,
    /// Signed 64-bit integer.
    Long = 6,
    /// 32-bit floating point.
    Float = 7,
    /// 64-bit floating point.
    Double = 8,
    /// UTF-8 string.
    Utf8 = 9,
    /// Nested Portable object.
    Portable = 10,
    /// Array of bytes.
    ByteArray = 11,
    /// Array of booleans.
    BoolArray = 12,
    /// Array of chars.
    CharArray = 13,
    /// Array of shorts.
    ShortArray = 14,
    /// Array of ints.
    IntArray = 15,
    /// Array of longs.
    LongArray = 16,
    /// Array of floats.
    FloatArray = 17,
    /// Array of doubles.
    DoubleArray = 18,
    /// Array of strings.
    Utf8Array = 19,
    /// Array of Portable objects.
    PortableArray = 20,
}

impl FieldType {
    const ALL: [FieldType; 20] = [
        Self::Byte,
        Self::Bool,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
        Self::Utf8,
        Self::Portable,
        Self::ByteArray,
        Self::BoolArray,
        Self::CharArray,
        Self::ShortArray,
        Self::IntArray,
        Self::LongArray,
        Self::FloatArray,
        Self::DoubleArray,
        Self::Utf8Array,
        Self::PortableArray,
    ];

    /// Creates a FieldType from its wire representation.
    pub fn from_id(id: i32) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.id() == id)
            .ok_or_else(|| HazelcastError::Serialization(format!("unknown field type id: {}", id)))
    }

    /// Returns the wire representation of this field type.
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Returns true for the two nested-portable kinds, which carry a
    /// factory and class id of their own.
    pub fn is_portable(self) -> bool {
        matches!(self, Self::Portable | Self::PortableArray)
    }
}

/// One named, typed slot of a Portable class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    index: i32,
    name: String,
    field_type: FieldType,
    factory_id: i32,
    class_id: i32,
}

impl FieldDefinition {
    /// Creates a field of a primitive, string or array type.
    pub fn new(index: i32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self::nested(index, name, field_type, 0, 0)
    }

    /// Creates a field that refers to another Portable class.
    pub fn nested(
        index: i32,
        name: impl Into<String>,
        field_type: FieldType,
        factory_id: i32,
        class_id: i32,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            field_type,
            factory_id,
            class_id,
        }
    }

    /// Position of the field within its class.
    pub fn index(&self) -> i32 {
        self.index
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Factory id of the nested class, 0 for non-portable fields.
    pub fn factory_id(&self) -> i32 {
        self.factory_id
    }

    /// Class id of the nested class, 0 for non-portable fields.
    pub fn class_id(&self) -> i32 {
        self.class_id
    }

    fn write_to(&self, out: &mut ObjectDataOutput) -> Result<()> {
        out.write_int(self.index)?;
        out.write_string(&self.name)?;
        out.write_int(self.field_type.id())?;
        out.write_int(self.factory_id)?;
        out.write_int(self.class_id)
    }

    fn read_from(input: &mut ObjectDataInput<'_>) -> Result<Self> {
        let index = input.read_int()?;
        let name = input.read_string()?;
        let field_type = FieldType::from_id(input.read_int()?)?;
        let factory_id = input.read_int()?;
        let class_id = input.read_int()?;
        Ok(Self::nested(index, name, field_type, factory_id, class_id))
    }
}

/// Versioned schema of a Portable class, identified by `(class_id, version)`.
///
/// The binary form is produced once, when the definition is built or parsed,
/// and every envelope that carries this definition reuses it.
#[derive(Clone, PartialEq, Eq)]
pub struct ClassDefinition {
    factory_id: i32,
    class_id: i32,
    version: i32,
    fields: Vec<FieldDefinition>,
    field_indices: HashMap<String, usize>,
    binary: Bytes,
}

impl ClassDefinition {
    /// Returns the factory ID.
    pub fn factory_id(&self) -> i32 {
        self.factory_id
    }

    /// Returns the class ID.
    pub fn class_id(&self) -> i32 {
        self.class_id
    }

    /// Returns the schema version.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Returns the number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Returns all field definitions in index order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.field_indices.get(name).map(|&i| &self.fields[i])
    }

    /// Returns true if a field with the given name exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.field_indices.contains_key(name)
    }

    /// The serialized form sent inline with envelopes.
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }

    /// Parses a definition from its serialized form.
    ///
    /// The whole input must be consumed; trailing bytes are rejected.
    pub fn from_binary(binary: &[u8]) -> Result<Self> {
        let mut input = ObjectDataInput::new(binary);
        let factory_id = input.read_int()?;
        let class_id = input.read_int()?;
        let version = input.read_int()?;
        let count = input.read_length()?;

        let mut fields = Vec::with_capacity(count.min(input.remaining()));
        for expected in 0..count {
            let field = FieldDefinition::read_from(&mut input)?;
            if field.index() as usize != expected {
                return Err(HazelcastError::Serialization(format!(
                    "class definition {}: field '{}' has index {}, expected {}",
                    class_id,
                    field.name(),
                    field.index(),
                    expected
                )));
            }
            fields.push(field);
        }

        if input.remaining() != 0 {
            return Err(HazelcastError::Serialization(format!(
                "class definition {}: {} trailing bytes",
                class_id,
                input.remaining()
            )));
        }

        let field_indices = index_fields(&fields)?;
        Ok(Self {
            factory_id,
            class_id,
            version,
            fields,
            field_indices,
            binary: Bytes::copy_from_slice(binary),
        })
    }
}

impl fmt::Debug for ClassDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDefinition")
            .field("factory_id", &self.factory_id)
            .field("class_id", &self.class_id)
            .field("version", &self.version)
            .field("fields", &self.fields)
            .finish()
    }
}

fn index_fields(fields: &[FieldDefinition]) -> Result<HashMap<String, usize>> {
    let mut indices = HashMap::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        if indices.insert(field.name().to_string(), i).is_some() {
            return Err(HazelcastError::Serialization(format!(
                "duplicate field name: {}",
                field.name()
            )));
        }
    }
    Ok(indices)
}

/// Builds a [`ClassDefinition`] field by field.
#[derive(Debug, Clone)]
pub struct ClassDefinitionBuilder {
    factory_id: i32,
    class_id: i32,
    version: i32,
    fields: Vec<FieldDefinition>,
}

impl ClassDefinitionBuilder {
    /// Starts a definition for the given identity.
    pub fn new(factory_id: i32, class_id: i32, version: i32) -> Self {
        Self {
            factory_id,
            class_id,
            version,
            fields: Vec::new(),
        }
    }

    /// Appends a field; its index is its position.
    pub fn add_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let index = self.fields.len() as i32;
        self.fields.push(FieldDefinition::new(index, name, field_type));
        self
    }

    /// Appends a nested portable field.
    pub fn add_portable_field(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        factory_id: i32,
        class_id: i32,
    ) -> Self {
        let index = self.fields.len() as i32;
        self.fields
            .push(FieldDefinition::nested(index, name, field_type, factory_id, class_id));
        self
    }

    pub(crate) fn push(&mut self, name: &str, field_type: FieldType) {
        let index = self.fields.len() as i32;
        self.fields.push(FieldDefinition::new(index, name, field_type));
    }

    /// Finishes the definition and computes its binary form.
    pub fn build(self) -> Result<ClassDefinition> {
        let field_indices = index_fields(&self.fields)?;

        let mut out = ObjectDataOutput::new();
        out.write_int(self.factory_id)?;
        out.write_int(self.class_id)?;
        out.write_int(self.version)?;
        out.write_length(self.fields.len())?;
        for field in &self.fields {
            field.write_to(&mut out)?;
        }

        Ok(ClassDefinition {
            factory_id: self.factory_id,
            class_id: self.class_id,
            version: self.version,
            fields: self.fields,
            field_indices,
            binary: out.freeze(),
        })
    }
}

/// An unresolved class definition known only by identity and bytes.
///
/// Envelopes may carry a proxy when they are assembled from bytes that were
/// never parsed. It must be resolved against a [`SerializationContext`]
/// before the payload is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDefinitionBinaryProxy {
    class_id: i32,
    version: i32,
    binary: Bytes,
}

impl ClassDefinitionBinaryProxy {
    /// Wraps the serialized form of a definition.
    pub fn new(class_id: i32, version: i32, binary: impl Into<Bytes>) -> Self {
        Self {
            class_id,
            version,
            binary: binary.into(),
        }
    }

    /// Returns the class ID.
    pub fn class_id(&self) -> i32 {
        self.class_id
    }

    /// Returns the schema version.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Returns the serialized definition.
    pub fn binary(&self) -> &[u8] {
        &self.binary
    }

    /// Resolves the proxy, registering the parsed definition if the context
    /// does not already know this `(class_id, version)`.
    pub fn to_real(&self, context: &SerializationContext) -> Result<Arc<ClassDefinition>> {
        if let Some(known) = context.lookup(self.class_id, self.version) {
            return Ok(known);
        }
        context.create_class_definition(&self.binary)
    }
}

/// The schema attached to an envelope: either resolved or a binary proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassDefinitionRef {
    /// A parsed, registered definition.
    Resolved(Arc<ClassDefinition>),
    /// Bytes that still need resolving.
    Proxy(ClassDefinitionBinaryProxy),
}

impl ClassDefinitionRef {
    /// Returns the class ID.
    pub fn class_id(&self) -> i32 {
        match self {
            Self::Resolved(cd) => cd.class_id(),
            Self::Proxy(proxy) => proxy.class_id(),
        }
    }

    /// Returns the schema version.
    pub fn version(&self) -> i32 {
        match self {
            Self::Resolved(cd) => cd.version(),
            Self::Proxy(proxy) => proxy.version(),
        }
    }

    /// Returns the serialized definition.
    pub fn binary(&self) -> &[u8] {
        match self {
            Self::Resolved(cd) => cd.binary(),
            Self::Proxy(proxy) => proxy.binary(),
        }
    }

    /// Returns the parsed definition, or `None` for an unresolved proxy.
    pub fn resolved(&self) -> Option<&Arc<ClassDefinition>> {
        match self {
            Self::Resolved(cd) => Some(cd),
            Self::Proxy(_) => None,
        }
    }
}

impl From<Arc<ClassDefinition>> for ClassDefinitionRef {
    fn from(cd: Arc<ClassDefinition>) -> Self {
        Self::Resolved(cd)
    }
}

/// Factory for creating Portable instances during decode.
pub trait PortableFactory: Send + Sync {
    /// Returns the factory ID this factory handles.
    fn factory_id(&self) -> i32;

    /// Creates an empty instance for the given class ID.
    fn create(&self, class_id: i32) -> Option<Box<dyn Portable>>;
}

/// Reads named Portable fields.
pub trait PortableReader {
    /// Returns the schema version being read.
    fn version(&self) -> i32;

    /// Returns true if a field with the given name exists.
    fn has_field(&self, name: &str) -> bool;

    /// Reads a byte field.
    fn read_byte(&mut self, name: &str) -> Result<i8>;

    /// Reads a boolean field.
    fn read_bool(&mut self, name: &str) -> Result<bool>;

    /// Reads a short field.
    fn read_short(&mut self, name: &str) -> Result<i16>;

    /// Reads an int field.
    fn read_int(&mut self, name: &str) -> Result<i32>;

    /// Reads a long field.
    fn read_long(&mut self, name: &str) -> Result<i64>;

    /// Reads a double field.
    fn read_double(&mut self, name: &str) -> Result<f64>;

    /// Reads a string field.
    fn read_string(&mut self, name: &str) -> Result<Option<String>>;

    /// Reads a byte array field.
    fn read_byte_array(&mut self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Returns the unnamed trailing section written through
    /// [`PortableWriter::raw_data_output`].
    fn raw_data_input(&mut self) -> &mut dyn DataInput;

    /// Reads an envelope written by [`PortableWriter::write_raw_data`],
    /// resolving its class definition against the reader's context.
    fn read_raw_data(&mut self) -> Result<Option<Data>>;
}

/// Writes named Portable fields.
pub trait PortableWriter {
    /// Writes a byte field.
    fn write_byte(&mut self, name: &str, value: i8) -> Result<()>;

    /// Writes a boolean field.
    fn write_bool(&mut self, name: &str, value: bool) -> Result<()>;

    /// Writes a short field.
    fn write_short(&mut self, name: &str, value: i16) -> Result<()>;

    /// Writes an int field.
    fn write_int(&mut self, name: &str, value: i32) -> Result<()>;

    /// Writes a long field.
    fn write_long(&mut self, name: &str, value: i64) -> Result<()>;

    /// Writes a double field.
    fn write_double(&mut self, name: &str, value: f64) -> Result<()>;

    /// Writes a string field.
    fn write_string(&mut self, name: &str, value: Option<&str>) -> Result<()>;

    /// Writes a byte array field.
    fn write_byte_array(&mut self, name: &str, value: Option<&[u8]>) -> Result<()>;

    /// Switches to the unnamed trailing section. Named writes after this
    /// call fail.
    fn raw_data_output(&mut self) -> &mut dyn DataOutput;

    /// Appends a nullable envelope to the raw section.
    fn write_raw_data(&mut self, data: Option<&Data>) -> Result<()> {
        let out = self.raw_data_output();
        match data {
            Some(data) => {
                out.write_bool(true)?;
                data.write_data(out)
            }
            None => out.write_bool(false),
        }
    }
}

/// Types serialized with a Portable class definition.
pub trait Portable: Send + Sync {
    /// Returns the factory ID for this type.
    fn factory_id(&self) -> i32;

    /// Returns the class ID for this type.
    fn class_id(&self) -> i32;

    /// Writes this object's fields.
    fn write_portable(&self, writer: &mut dyn PortableWriter) -> Result<()>;

    /// Populates this object from a reader.
    fn read_portable(&mut self, reader: &mut dyn PortableReader) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener_request_definition() -> ClassDefinition {
        ClassDefinitionBuilder::new(-20, 20, 0)
            .add_field("n", FieldType::Utf8)
            .add_field("i", FieldType::Bool)
            .add_field("s", FieldType::Utf8)
            .build()
            .unwrap()
    }

    #[test]
    fn test_field_type_ids() {
        for id in 1..=20 {
            assert_eq!(FieldType::from_id(id).unwrap().id(), id);
        }
        assert!(FieldType::from_id(0).is_err());
        assert!(FieldType::from_id(21).is_err());
        assert!(FieldType::Portable.is_portable());
        assert!(!FieldType::Utf8.is_portable());
    }

    #[test]
    fn test_builder_assigns_indices() {
        let cd = listener_request_definition();
        assert_eq!(cd.field_count(), 3);
        assert_eq!(cd.field("n").unwrap().index(), 0);
        assert_eq!(cd.field("i").unwrap().field_type(), FieldType::Bool);
        assert_eq!(cd.field("s").unwrap().index(), 2);
        assert!(!cd.has_field("x"));
    }

    #[test]
    fn test_builder_rejects_duplicate_names() {
        let result = ClassDefinitionBuilder::new(1, 1, 0)
            .add_field("a", FieldType::Int)
            .add_field("a", FieldType::Long)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_binary_parses_back_to_same_definition() {
        let cd = ClassDefinitionBuilder::new(7, 8, 2)
            .add_field("id", FieldType::Long)
            .add_portable_field("owner", FieldType::Portable, 7, 9)
            .build()
            .unwrap();
        let parsed = ClassDefinition::from_binary(cd.binary()).unwrap();
        assert_eq!(parsed, cd);
        assert_eq!(parsed.field("owner").unwrap().class_id(), 9);
    }

    #[test]
    fn test_from_binary_rejects_truncation_and_trailing_bytes() {
        let cd = listener_request_definition();
        let binary = cd.binary();
        assert!(ClassDefinition::from_binary(&binary[..binary.len() - 1]).is_err());

        let mut padded = binary.to_vec();
        padded.push(0);
        assert!(ClassDefinition::from_binary(&padded).is_err());
    }

    #[test]
    fn test_from_binary_rejects_out_of_order_index() {
        let mut out = ObjectDataOutput::new();
        for v in [1, 2, 0, 1] {
            out.write_int(v).unwrap();
        }
        FieldDefinition::new(3, "x", FieldType::Int)
            .write_to(&mut out)
            .unwrap();
        let err = ClassDefinition::from_binary(out.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("expected 0"));
    }

    #[test]
    fn test_ref_accessors() {
        let cd = Arc::new(listener_request_definition());
        let resolved = ClassDefinitionRef::from(Arc::clone(&cd));
        let proxy = ClassDefinitionRef::Proxy(ClassDefinitionBinaryProxy::new(
            20,
            0,
            cd.binary().to_vec(),
        ));

        assert_eq!(resolved.class_id(), proxy.class_id());
        assert_eq!(resolved.version(), proxy.version());
        assert_eq!(resolved.binary(), proxy.binary());
        assert!(resolved.resolved().is_some());
        assert!(proxy.resolved().is_none());
    }

    #[test]
    fn test_proxy_resolves_against_context() {
        let context = SerializationContext::new(0);
        let cd = listener_request_definition();
        let proxy = ClassDefinitionBinaryProxy::new(20, 0, cd.binary().to_vec());

        let real = proxy.to_real(&context).unwrap();
        assert_eq!(*real, cd);
        assert!(context.lookup(20, 0).is_some());
    }
}
