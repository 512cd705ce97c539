//! The item event payload pushed to subscribed clients.

use hazelcast_wire::serialization::portable::{PortableFactory, PortableReader, PortableWriter};
use hazelcast_wire::{Data, HazelcastError, Portable, Result};

use super::ItemEventType;

/// Factory id of member-to-client infrastructure payloads.
pub const SPI_PORTABLE_FACTORY_ID: i32 = -1;
/// Class id of [`PortableItemEvent`].
pub const PORTABLE_ITEM_EVENT_CLASS_ID: i32 = 3;

/// Wire form of an item event.
///
/// Fields `e` (event type) and `u` (origin member uuid) are named; the
/// already encoded item follows in the raw section as a nullable envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortableItemEvent {
    item: Option<Data>,
    event_type: ItemEventType,
    member_uuid: String,
}

impl PortableItemEvent {
    /// Creates an event payload.
    pub fn new(
        item: Option<Data>,
        event_type: ItemEventType,
        member_uuid: impl Into<String>,
    ) -> Self {
        Self {
            item,
            event_type,
            member_uuid: member_uuid.into(),
        }
    }

    /// The encoded item, absent when the subscription excludes values.
    pub fn item(&self) -> Option<&Data> {
        self.item.as_ref()
    }

    /// Added or removed.
    pub fn event_type(&self) -> ItemEventType {
        self.event_type
    }

    /// UUID of the member that raised the event.
    pub fn member_uuid(&self) -> &str {
        &self.member_uuid
    }
}

impl Portable for PortableItemEvent {
    fn factory_id(&self) -> i32 {
        SPI_PORTABLE_FACTORY_ID
    }

    fn class_id(&self) -> i32 {
        PORTABLE_ITEM_EVENT_CLASS_ID
    }

    fn write_portable(&self, writer: &mut dyn PortableWriter) -> Result<()> {
        writer.write_int("e", self.event_type.value())?;
        writer.write_string("u", Some(&self.member_uuid))?;
        writer.write_raw_data(self.item.as_ref())
    }

    fn read_portable(&mut self, reader: &mut dyn PortableReader) -> Result<()> {
        let value = reader.read_int("e")?;
        self.event_type = ItemEventType::from_value(value).ok_or_else(|| {
            HazelcastError::Serialization(format!("unknown item event type {}", value))
        })?;
        self.member_uuid = reader.read_string("u")?.unwrap_or_default();
        self.item = reader.read_raw_data()?;
        Ok(())
    }
}

/// Creates infrastructure payloads by class id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpiPortableFactory;

impl PortableFactory for SpiPortableFactory {
    fn factory_id(&self) -> i32 {
        SPI_PORTABLE_FACTORY_ID
    }

    fn create(&self, class_id: i32) -> Option<Box<dyn Portable>> {
        match class_id {
            PORTABLE_ITEM_EVENT_CLASS_ID => Some(Box::new(PortableItemEvent::default())),
            _ => None,
        }
    }
}
