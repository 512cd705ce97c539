//! The `Data` envelope: a typed, length-prefixed payload with an optional
//! inline class definition and a lazily computed partition hash.
//!
//! Wire layout, every integer a big-endian `i32`:
//!
//! ```text
//! type_id
//! class_id | NO_CLASS_ID
//!   [version, definition_length, definition_bytes...]   only when class_id != NO_CLASS_ID
//! payload_length, payload_bytes...
//! partition_hash
//! ```
//!
//! The definition bytes are written on every encode. The format keeps no
//! record of what a peer already knows, so a receiver that has the
//! definition cached skips the bytes instead of parsing them again.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicI32, Ordering};

use bytes::Bytes;

use super::constants::PORTABLE_TYPE_ID;
use super::portable::{ClassDefinition, ClassDefinitionRef};
use super::{ByteCounter, DataInput, DataOutput, ObjectDataInput, ObjectDataOutput};
use super::SerializationContext;
use crate::error::{HazelcastError, Result};

/// Class id written when an envelope carries no class definition.
pub const NO_CLASS_ID: i32 = -1;

/// Type id of an envelope that was never assigned one.
pub const NO_TYPE_ID: i32 = -1;

/// Partition hash value meaning "not computed yet".
pub const NO_PARTITION_HASH: i32 = -1;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: i32 = 0x0100_0193;

/// FNV-1a over `bytes`, walking from the last byte to the first.
///
/// Each byte is sign-extended before the XOR, matching peers that hash
/// signed bytes. Both the walk direction and the sign extension change the
/// result, so neither may be altered without breaking partition routing
/// across the cluster.
pub fn hash_bytes(bytes: &[u8]) -> i32 {
    let mut hash = FNV_OFFSET_BASIS as i32;
    for &b in bytes.iter().rev() {
        hash = (hash ^ i32::from(b as i8)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// One serialized value in transit.
///
/// Equality and [`Hash`] cover only the type id and the payload bytes; the
/// class definition and partition hash never take part.
pub struct Data {
    type_id: i32,
    class_definition: Option<ClassDefinitionRef>,
    buffer: Option<Bytes>,
    partition_hash: AtomicI32,
}

impl Data {
    /// Creates an envelope without a class definition. An empty payload is
    /// stored as absent.
    pub fn new(type_id: i32, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        Self {
            type_id,
            class_definition: None,
            buffer: (!payload.is_empty()).then_some(payload),
            partition_hash: AtomicI32::new(NO_PARTITION_HASH),
        }
    }

    /// Creates a self-describing envelope.
    pub fn with_class_definition(
        type_id: i32,
        class_definition: impl Into<ClassDefinitionRef>,
        payload: impl Into<Bytes>,
    ) -> Self {
        let mut data = Self::new(type_id, payload);
        data.class_definition = Some(class_definition.into());
        data
    }

    /// Serialization strategy of the payload.
    pub fn type_id(&self) -> i32 {
        self.type_id
    }

    /// The payload, empty when absent.
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_deref().unwrap_or_default()
    }

    /// Payload length in bytes; 0 when absent.
    pub fn size(&self) -> usize {
        self.buffer.as_ref().map_or(0, Bytes::len)
    }

    /// Returns `true` when no payload is held.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_none()
    }

    /// The attached class definition, if any.
    pub fn class_definition(&self) -> Option<&ClassDefinitionRef> {
        self.class_definition.as_ref()
    }

    /// Returns `true` for Portable payloads that carry their definition.
    pub fn is_portable(&self) -> bool {
        self.type_id == PORTABLE_TYPE_ID && self.class_definition.is_some()
    }

    /// Resolves a binary proxy class definition against `context`.
    pub fn post_construct(&mut self, context: &SerializationContext) -> Result<()> {
        if let Some(ClassDefinitionRef::Proxy(proxy)) = &self.class_definition {
            let real = proxy.to_real(context)?;
            tracing::trace!(
                class_id = real.class_id(),
                version = real.version(),
                "resolved class definition proxy"
            );
            self.class_definition = Some(ClassDefinitionRef::Resolved(real));
        }
        Ok(())
    }

    /// The FNV-1a hash of the payload, or `i32::MIN` when it is absent.
    pub fn content_hash(&self) -> i32 {
        match &self.buffer {
            Some(bytes) => hash_bytes(bytes),
            None => i32::MIN,
        }
    }

    /// Returns the routing hash, computing and caching the content hash on
    /// first use.
    ///
    /// Concurrent first calls may each compute the hash; they store the same
    /// value.
    pub fn partition_hash(&self) -> Result<i32> {
        let cached = self.partition_hash.load(Ordering::Relaxed);
        if cached != NO_PARTITION_HASH {
            return Ok(cached);
        }
        let bytes = self.buffer.as_ref().ok_or_else(|| {
            HazelcastError::IllegalState("cannot hash an empty payload".to_string())
        })?;
        let hash = hash_bytes(bytes);
        self.partition_hash.store(hash, Ordering::Relaxed);
        Ok(hash)
    }

    /// Overrides the routing hash, independent of the payload.
    pub fn set_partition_hash(&self, partition_hash: i32) {
        self.partition_hash.store(partition_hash, Ordering::Relaxed);
    }

    /// Maps the routing hash onto one of `partition_count` partitions.
    pub fn partition_id(&self, partition_count: u32) -> Result<u32> {
        if partition_count == 0 {
            return Err(HazelcastError::Configuration(
                "partition count must be positive".to_string(),
            ));
        }
        Ok(self.partition_hash()?.unsigned_abs() % partition_count)
    }

    /// Writes the envelope.
    pub fn write_data<W: DataOutput + ?Sized>(&self, out: &mut W) -> Result<()> {
        out.write_int(self.type_id)?;
        match &self.class_definition {
            Some(cd) => {
                out.write_int(cd.class_id())?;
                out.write_int(cd.version())?;
                let binary = cd.binary();
                out.write_length(binary.len())?;
                out.write_bytes(binary)?;
            }
            None => out.write_int(NO_CLASS_ID)?,
        }
        out.write_length(self.size())?;
        if let Some(bytes) = &self.buffer {
            out.write_bytes(bytes)?;
        }
        out.write_int(self.partition_hash.load(Ordering::Relaxed))
    }

    /// Number of bytes [`write_data`](Self::write_data) produces for the
    /// current field values.
    ///
    /// Computed by running the encoder against a [`ByteCounter`], so the two
    /// cannot drift apart.
    pub fn total_size(&self) -> usize {
        let mut counter = ByteCounter::new();
        // only an unframeable length can fail here; write_data reports it
        let _ = self.write_data(&mut counter);
        counter.count()
    }

    /// Reads an envelope, consulting `context` for the class definition.
    ///
    /// When `(class_id, version)` is already cached the inline definition
    /// bytes are skipped unparsed: peers agree on one definition per
    /// identity. Otherwise the bytes are parsed and registered.
    pub fn read_data<R: DataInput + ?Sized>(
        input: &mut R,
        context: &SerializationContext,
    ) -> Result<Self> {
        let type_id = input.read_int()?;
        let class_id = input.read_int()?;
        let class_definition = if class_id != NO_CLASS_ID {
            let version = input.read_int()?;
            let definition_len = input.read_length()?;
            let cd = match context.lookup(class_id, version) {
                Some(known) => {
                    input.skip_bytes(definition_len)?;
                    known
                }
                None => {
                    let binary = input.read_bytes(definition_len)?;
                    let parsed = ClassDefinition::from_binary(&binary)?;
                    if parsed.class_id() != class_id || parsed.version() != version {
                        return Err(HazelcastError::Serialization(format!(
                            "inline class definition is ({}, {}), header says ({}, {})",
                            parsed.class_id(),
                            parsed.version(),
                            class_id,
                            version
                        )));
                    }
                    context.register(parsed)
                }
            };
            Some(ClassDefinitionRef::Resolved(cd))
        } else {
            None
        };

        let size = input.read_int()?;
        let buffer = if size > 0 {
            Some(Bytes::from(input.read_bytes(size as usize)?))
        } else {
            None
        };
        let partition_hash = input.read_int()?;

        Ok(Self {
            type_id,
            class_definition,
            buffer,
            partition_hash: AtomicI32::new(partition_hash),
        })
    }

    /// Encodes into a buffer pre-sized with [`total_size`](Self::total_size).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = ObjectDataOutput::with_capacity(self.total_size());
        self.write_data(&mut out)?;
        Ok(out.into_bytes())
    }

    /// Decodes a buffer holding exactly one envelope.
    pub fn from_bytes(bytes: &[u8], context: &SerializationContext) -> Result<Self> {
        let mut input = ObjectDataInput::new(bytes);
        let data = Self::read_data(&mut input, context)?;
        if input.remaining() != 0 {
            return Err(HazelcastError::Serialization(format!(
                "{} trailing bytes after envelope",
                input.remaining()
            )));
        }
        Ok(data)
    }
}

impl Default for Data {
    fn default() -> Self {
        Self {
            type_id: NO_TYPE_ID,
            class_definition: None,
            buffer: None,
            partition_hash: AtomicI32::new(NO_PARTITION_HASH),
        }
    }
}

impl Clone for Data {
    fn clone(&self) -> Self {
        Self {
            type_id: self.type_id,
            class_definition: self.class_definition.clone(),
            buffer: self.buffer.clone(),
            partition_hash: AtomicI32::new(self.partition_hash.load(Ordering::Relaxed)),
        }
    }
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let (a, b) = (self.buffer(), other.buffer());
        self.type_id == other.type_id
            && a.len() == b.len()
            && a.iter().rev().zip(b.iter().rev()).all(|(x, y)| x == y)
    }
}

impl Eq for Data {}

impl Hash for Data {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.buffer().hash(state);
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("type_id", &self.type_id)
            .field(
                "class_definition",
                &self.class_definition.as_ref().map(|cd| (cd.class_id(), cd.version())),
            )
            .field("size", &self.size())
            .field("partition_hash", &self.partition_hash.load(Ordering::Relaxed))
            .finish()
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Data{{type={}, partitionHash={}}} size={}",
            self.type_id,
            self.partition_hash.load(Ordering::Relaxed),
            self.size()
        )
    }
}
