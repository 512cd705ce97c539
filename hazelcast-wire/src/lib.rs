//! Wire envelope and Portable serialization for Hazelcast members.
//!
//! [`Data`] is the binary envelope every value travels in. Envelopes that
//! carry a Portable payload also carry the class definition describing it;
//! receivers cache definitions in a shared [`SerializationContext`] so the
//! schema is parsed once per `(class_id, version)`.

#![warn(missing_docs)]

pub mod error;
pub mod partition_aware;
pub mod serialization;

pub use error::{HazelcastError, Result};
pub use partition_aware::PartitionAware;
pub use serialization::{
    Data, DataInput, DataOutput, FromData, ObjectDataInput, ObjectDataOutput, Portable,
    PortableFactory, PortableReader, PortableWriter, SerializationContext, SerializationService,
    ToData,
};
