//! The event service: listener registrations per collection and in-order
//! delivery of item events.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::{CollectionEventFilter, ItemEvent, ItemListener};

/// Handle returned when a listener is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRegistration {
    id: String,
    service_name: String,
    topic: String,
    filter: CollectionEventFilter,
}

impl EventRegistration {
    /// Opaque registration id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Service the listener was registered with.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Name of the collection listened to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Filter attached to the registration.
    pub fn filter(&self) -> CollectionEventFilter {
        self.filter
    }
}

/// Registers listeners and dispatches item events to them.
///
/// Every method is a single atomic operation on the registration table.
pub trait EventService: Send + Sync {
    /// Registers `listener` for events of `topic` under `service_name`.
    fn register_listener(
        &self,
        service_name: &str,
        topic: &str,
        filter: CollectionEventFilter,
        listener: Arc<dyn ItemListener>,
    ) -> EventRegistration;

    /// Removes a registration. Returns `true` if it existed.
    fn deregister_listener(&self, service_name: &str, topic: &str, registration_id: &str) -> bool;

    /// Current registrations for `topic` under `service_name`.
    fn registrations(&self, service_name: &str, topic: &str) -> Vec<EventRegistration>;

    /// Delivers `event` to every listener of `event.name()`, in registration
    /// order. Returns the number of listeners invoked.
    fn publish_item_event(&self, service_name: &str, event: &ItemEvent) -> usize;
}

struct Registration {
    handle: EventRegistration,
    listener: Arc<dyn ItemListener>,
}

/// In-memory [`EventService`].
#[derive(Default)]
pub struct DefaultEventService {
    registrations: DashMap<(String, String), Vec<Registration>>,
}

impl DefaultEventService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of registrations across all topics.
    pub fn registration_count(&self) -> usize {
        self.registrations.iter().map(|e| e.value().len()).sum()
    }
}

impl fmt::Debug for DefaultEventService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultEventService")
            .field("topics", &self.registrations.len())
            .field("registrations", &self.registration_count())
            .finish()
    }
}

fn key(service_name: &str, topic: &str) -> (String, String) {
    (service_name.to_string(), topic.to_string())
}

impl EventService for DefaultEventService {
    fn register_listener(
        &self,
        service_name: &str,
        topic: &str,
        filter: CollectionEventFilter,
        listener: Arc<dyn ItemListener>,
    ) -> EventRegistration {
        let handle = EventRegistration {
            id: Uuid::new_v4().to_string(),
            service_name: service_name.to_string(),
            topic: topic.to_string(),
            filter,
        };
        self.registrations
            .entry(key(service_name, topic))
            .or_default()
            .push(Registration {
                handle: handle.clone(),
                listener,
            });
        tracing::debug!(
            service = service_name,
            topic,
            registration_id = %handle.id,
            include_value = filter.include_value(),
            "registered item listener"
        );
        handle
    }

    fn deregister_listener(&self, service_name: &str, topic: &str, registration_id: &str) -> bool {
        let key = key(service_name, topic);
        let removed = match self.registrations.get_mut(&key) {
            Some(mut entries) => {
                let before = entries.len();
                entries.retain(|r| r.handle.id != registration_id);
                entries.len() != before
            }
            None => false,
        };
        self.registrations.remove_if(&key, |_, entries| entries.is_empty());
        if removed {
            tracing::debug!(
                service = service_name,
                topic,
                registration_id,
                "deregistered item listener"
            );
        }
        removed
    }

    fn registrations(&self, service_name: &str, topic: &str) -> Vec<EventRegistration> {
        self.registrations
            .get(&key(service_name, topic))
            .map(|entries| entries.iter().map(|r| r.handle.clone()).collect())
            .unwrap_or_default()
    }

    fn publish_item_event(&self, service_name: &str, event: &ItemEvent) -> usize {
        // Snapshot first so listeners may (de)register without deadlocking.
        let targets: Vec<(CollectionEventFilter, Arc<dyn ItemListener>)> = match self
            .registrations
            .get(&key(service_name, event.name()))
        {
            Some(entries) => entries
                .iter()
                .map(|r| (r.handle.filter, Arc::clone(&r.listener)))
                .collect(),
            None => return 0,
        };

        let stripped = event.without_item();
        for (filter, listener) in &targets {
            if filter.include_value() {
                listener.on_item_event(event);
            } else {
                listener.on_item_event(&stripped);
            }
        }
        tracing::trace!(
            service = service_name,
            topic = event.name(),
            event_type = %event.event_type(),
            listeners = targets.len(),
            "published item event"
        );
        targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ItemEventType;
    use hazelcast_wire::ToData;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(ItemEventType, bool)>>,
    }

    impl ItemListener for Recorder {
        fn item_added(&self, event: &ItemEvent) {
            self.seen
                .lock()
                .unwrap()
                .push((event.event_type(), event.item().is_some()));
        }

        fn item_removed(&self, event: &ItemEvent) {
            self.item_added(event);
        }
    }

    fn event(topic: &str, event_type: ItemEventType) -> ItemEvent {
        let item: Arc<dyn ToData> = Arc::new(String::from("item"));
        ItemEvent::new(topic, event_type, Some(item), Uuid::new_v4())
    }

    #[test]
    fn test_register_assigns_unique_ids() {
        let service = DefaultEventService::new();
        let recorder = Arc::new(Recorder::default());
        let a = service.register_listener("svc", "orders", CollectionEventFilter::new(true), recorder.clone());
        let b = service.register_listener("svc", "orders", CollectionEventFilter::new(true), recorder);
        assert_ne!(a.id(), b.id());
        assert!(!a.id().is_empty());
        assert_eq!(a.topic(), "orders");
        assert_eq!(a.service_name(), "svc");
        assert_eq!(service.registrations("svc", "orders").len(), 2);
        assert_eq!(service.registration_count(), 2);
    }

    #[test]
    fn test_publish_in_order_to_matching_topic_only() {
        let service = DefaultEventService::new();
        let recorder = Arc::new(Recorder::default());
        service.register_listener("svc", "orders", CollectionEventFilter::new(true), recorder.clone());

        assert_eq!(service.publish_item_event("svc", &event("orders", ItemEventType::Added)), 1);
        assert_eq!(service.publish_item_event("svc", &event("orders", ItemEventType::Removed)), 1);
        assert_eq!(service.publish_item_event("svc", &event("invoices", ItemEventType::Added)), 0);
        assert_eq!(service.publish_item_event("other", &event("orders", ItemEventType::Added)), 0);

        assert_eq!(
            *recorder.seen.lock().unwrap(),
            vec![(ItemEventType::Added, true), (ItemEventType::Removed, true)]
        );
    }

    #[test]
    fn test_filter_strips_item() {
        let service = DefaultEventService::new();
        let recorder = Arc::new(Recorder::default());
        let registration =
            service.register_listener("svc", "orders", CollectionEventFilter::new(false), recorder.clone());
        assert!(!registration.filter().include_value());
        service.publish_item_event("svc", &event("orders", ItemEventType::Added));
        assert_eq!(*recorder.seen.lock().unwrap(), vec![(ItemEventType::Added, false)]);
    }

    #[test]
    fn test_deregister() {
        let service = DefaultEventService::new();
        let recorder = Arc::new(Recorder::default());
        let registration =
            service.register_listener("svc", "orders", CollectionEventFilter::new(true), recorder.clone());

        assert!(service.deregister_listener("svc", "orders", registration.id()));
        assert!(!service.deregister_listener("svc", "orders", registration.id()));
        assert!(!service.deregister_listener("svc", "missing", "nope"));
        assert_eq!(service.registration_count(), 0);
        assert_eq!(service.publish_item_event("svc", &event("orders", ItemEventType::Added)), 0);
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    struct SelfRemoving {
        service: Arc<DefaultEventService>,
        id: Mutex<Option<String>>,
    }

    impl ItemListener for SelfRemoving {
        fn item_added(&self, _event: &ItemEvent) {
            if let Some(id) = self.id.lock().unwrap().take() {
                self.service.deregister_listener("svc", "orders", &id);
            }
        }

        fn item_removed(&self, _event: &ItemEvent) {}
    }

    #[test]
    fn test_listener_may_deregister_during_publish() {
        let service = Arc::new(DefaultEventService::new());
        let listener = Arc::new(SelfRemoving {
            service: Arc::clone(&service),
            id: Mutex::new(None),
        });
        let registration =
            service.register_listener("svc", "orders", CollectionEventFilter::new(true), listener.clone());
        *listener.id.lock().unwrap() = Some(registration.id().to_string());

        assert_eq!(service.publish_item_event("svc", &event("orders", ItemEventType::Added)), 1);
        assert_eq!(service.registration_count(), 0);
    }
}
