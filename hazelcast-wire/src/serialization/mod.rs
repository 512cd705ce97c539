//! The envelope format and the serializers that produce it.

pub mod constants;
mod context;
mod data;
mod data_input;
mod data_output;
pub mod portable;
mod service;

pub use context::SerializationContext;
pub use data::{hash_bytes, Data, NO_CLASS_ID, NO_PARTITION_HASH, NO_TYPE_ID};
pub use data_input::{DataInput, ObjectDataInput};
pub use data_output::{ByteCounter, DataOutput, ObjectDataOutput};
pub use portable::{
    ClassDefinition, ClassDefinitionBuilder, ClassDefinitionRef, FieldDefinition, FieldType,
    Portable, PortableFactory, PortableReader, PortableWriter,
};
pub use service::{FromData, SerializationService, ToData};
