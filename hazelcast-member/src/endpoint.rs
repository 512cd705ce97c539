//! Client connections as seen by the member.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hazelcast_wire::Data;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::event::EventService;
use crate::security::Role;

/// An event pushed to a client, tagged with the call id of the request
/// that subscribed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEvent {
    /// Call id of the originating subscribe request.
    pub call_id: i64,
    /// Encoded event.
    pub payload: Data,
}

/// One live client connection.
pub trait ClientEndpoint: Send + Sync {
    /// Identity of the connected client.
    fn uuid(&self) -> Uuid;

    /// Returns `false` once the connection has gone away.
    fn is_live(&self) -> bool;

    /// Hands `payload` to the connection for delivery. Fire and forget.
    fn send_event(&self, payload: Data, call_id: i64);

    /// Records the registration for `(service_name, topic)`, returning the
    /// one it replaces.
    fn set_listener_registration(
        &self,
        service_name: &str,
        topic: &str,
        registration_id: String,
    ) -> Option<String>;

    /// Runs `register` and records the id it returns for
    /// `(service_name, topic)` as one step per key, returning the new id and
    /// the one it replaces. Concurrent callers on the same key are
    /// serialized, so the id recorded last is the one that stays recorded.
    fn replace_listener_registration(
        &self,
        service_name: &str,
        topic: &str,
        register: &mut dyn FnMut() -> String,
    ) -> (String, Option<String>);

    /// Forgets the registration for `(service_name, topic)` if it is still
    /// `registration_id`. Returns `true` if it was removed.
    fn remove_listener_registration(
        &self,
        service_name: &str,
        topic: &str,
        registration_id: &str,
    ) -> bool;

    /// Roles granted to the authenticated client.
    fn roles(&self) -> &[Role];
}

/// Endpoint backed by an unbounded channel drained by the connection writer.
pub struct DefaultClientEndpoint {
    uuid: Uuid,
    live: AtomicBool,
    events: mpsc::UnboundedSender<ClientEvent>,
    registrations: DashMap<(String, String), String>,
    roles: Vec<Role>,
}

impl DefaultClientEndpoint {
    /// Creates a live endpoint and the receiver its events arrive on.
    pub fn new(uuid: Uuid) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let endpoint = Self {
            uuid,
            live: AtomicBool::new(true),
            events,
            registrations: DashMap::new(),
            roles: Vec::new(),
        };
        (endpoint, receiver)
    }

    /// Assigns the client's roles.
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    /// Marks the connection as gone without touching its registrations.
    pub fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::Release);
    }

    /// The registration recorded for `(service_name, topic)`.
    pub fn listener_registration(&self, service_name: &str, topic: &str) -> Option<String> {
        self.registrations
            .get(&(service_name.to_string(), topic.to_string()))
            .map(|id| id.value().clone())
    }

    /// Number of recorded registrations.
    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    /// Closes the endpoint and removes every registration it recorded from
    /// `event_service`. Returns the number removed.
    pub fn destroy(&self, event_service: &dyn EventService) -> usize {
        self.set_live(false);
        let recorded: Vec<((String, String), String)> = self
            .registrations
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        self.registrations.clear();

        let removed = recorded
            .iter()
            .filter(|((service, topic), id)| event_service.deregister_listener(service, topic, id))
            .count();
        tracing::debug!(client = %self.uuid, removed, "destroyed client endpoint");
        removed
    }
}

impl ClientEndpoint for DefaultClientEndpoint {
    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire) && !self.events.is_closed()
    }

    fn send_event(&self, payload: Data, call_id: i64) {
        if self.events.send(ClientEvent { call_id, payload }).is_err() {
            tracing::trace!(client = %self.uuid, call_id, "dropped event for closed connection");
        }
    }

    fn set_listener_registration(
        &self,
        service_name: &str,
        topic: &str,
        registration_id: String,
    ) -> Option<String> {
        self.registrations
            .insert((service_name.to_string(), topic.to_string()), registration_id)
    }

    fn replace_listener_registration(
        &self,
        service_name: &str,
        topic: &str,
        register: &mut dyn FnMut() -> String,
    ) -> (String, Option<String>) {
        // The entry holds the key's shard lock until it is dropped.
        let entry = self
            .registrations
            .entry((service_name.to_string(), topic.to_string()));
        let registration_id = register();
        let previous = match entry {
            Entry::Occupied(mut occupied) => Some(occupied.insert(registration_id.clone())),
            Entry::Vacant(vacant) => {
                vacant.insert(registration_id.clone());
                None
            }
        };
        (registration_id, previous)
    }

    fn remove_listener_registration(
        &self,
        service_name: &str,
        topic: &str,
        registration_id: &str,
    ) -> bool {
        self.registrations
            .remove_if(&(service_name.to_string(), topic.to_string()), |_, id| {
                id == registration_id
            })
            .is_some()
    }

    fn roles(&self) -> &[Role] {
        &self.roles
    }
}

impl fmt::Debug for DefaultClientEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultClientEndpoint")
            .field("uuid", &self.uuid)
            .field("live", &self.is_live())
            .field("registrations", &self.registrations.len())
            .field("roles", &self.roles.len())
            .finish()
    }
}
