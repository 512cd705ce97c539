//! Item events, listeners and the event service that routes them.

mod filter;
mod item;
mod portable_event;
mod service;

pub use filter::CollectionEventFilter;
pub use item::{ItemEvent, ItemEventType, ItemListener};
pub use portable_event::{
    PortableItemEvent, SpiPortableFactory, PORTABLE_ITEM_EVENT_CLASS_ID, SPI_PORTABLE_FACTORY_ID,
};
pub use service::{DefaultEventService, EventRegistration, EventService};
