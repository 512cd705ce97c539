//! Item events raised by collections.

use std::fmt;
use std::sync::Arc;

use hazelcast_wire::ToData;
use uuid::Uuid;

/// Type of item event fired by collection listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ItemEventType {
    /// Item was added to the collection.
    #[default]
    Added = 1,
    /// Item was removed from the collection.
    Removed = 2,
}

impl ItemEventType {
    /// Creates an event type from its wire format value.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Added),
            2 => Some(Self::Removed),
            _ => None,
        }
    }

    /// Returns the wire format value for this event type.
    pub fn value(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ItemEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "ADDED"),
            Self::Removed => write!(f, "REMOVED"),
        }
    }
}

/// An item was added to or removed from a named collection.
#[derive(Clone)]
pub struct ItemEvent {
    name: String,
    event_type: ItemEventType,
    item: Option<Arc<dyn ToData>>,
    member_uuid: Uuid,
}

impl ItemEvent {
    /// Creates a new item event.
    pub fn new(
        name: impl Into<String>,
        event_type: ItemEventType,
        item: Option<Arc<dyn ToData>>,
        member_uuid: Uuid,
    ) -> Self {
        Self {
            name: name.into(),
            event_type,
            item,
            member_uuid,
        }
    }

    /// Name of the collection that fired the event.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Added or removed.
    pub fn event_type(&self) -> ItemEventType {
        self.event_type
    }

    /// The changed item, absent when the subscription excludes values.
    pub fn item(&self) -> Option<&Arc<dyn ToData>> {
        self.item.as_ref()
    }

    /// UUID of the member that raised the event.
    pub fn member_uuid(&self) -> Uuid {
        self.member_uuid
    }

    /// A copy of this event without the item.
    pub fn without_item(&self) -> Self {
        Self {
            item: None,
            ..self.clone()
        }
    }
}

impl fmt::Debug for ItemEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemEvent")
            .field("name", &self.name)
            .field("event_type", &self.event_type)
            .field("has_item", &self.item.is_some())
            .field("member_uuid", &self.member_uuid)
            .finish()
    }
}

/// Receives item events of a subscribed collection.
pub trait ItemListener: Send + Sync {
    /// Called when an item is added to the collection.
    fn item_added(&self, event: &ItemEvent);

    /// Called when an item is removed from the collection.
    fn item_removed(&self, event: &ItemEvent);

    /// Routes `event` to the callback matching its type.
    fn on_item_event(&self, event: &ItemEvent) {
        match event.event_type() {
            ItemEventType::Added => self.item_added(event),
            ItemEventType::Removed => self.item_removed(event),
        }
    }
}
