//! The member-side services a client request runs against.

use std::fmt;
use std::sync::Arc;

use hazelcast_wire::{Data, Result, SerializationService, ToData};
use uuid::Uuid;

use crate::config::MemberConfig;
use crate::event::{DefaultEventService, EventService, SpiPortableFactory};
use crate::request::CollectionPortableHook;

/// Services available to client requests.
pub trait ClientEngine: Send + Sync {
    /// The serialization entry point.
    fn serialization_service(&self) -> &SerializationService;

    /// The event service listeners are registered with.
    fn event_service(&self) -> &dyn EventService;

    /// UUID of this member.
    fn local_member_uuid(&self) -> Uuid;

    /// Encodes `value` into an envelope.
    fn to_data(&self, value: &dyn ToData) -> Result<Data> {
        value.to_data(self.serialization_service())
    }
}

/// The standard engine of a member.
pub struct DefaultClientEngine {
    config: MemberConfig,
    serialization: SerializationService,
    events: Arc<dyn EventService>,
    member_uuid: Uuid,
}

impl DefaultClientEngine {
    /// Creates an engine with a fresh event service.
    pub fn new(config: MemberConfig) -> Self {
        Self::with_event_service(config, Arc::new(DefaultEventService::new()))
    }

    /// Creates an engine over an existing event service.
    pub fn with_event_service(config: MemberConfig, events: Arc<dyn EventService>) -> Self {
        let serialization = SerializationService::new(config.portable_version());
        serialization.register_portable_factory(Arc::new(CollectionPortableHook));
        serialization.register_portable_factory(Arc::new(SpiPortableFactory));
        let member_uuid = Uuid::new_v4();
        tracing::info!(
            member = %member_uuid,
            address = %config.member_address(),
            portable_version = config.portable_version(),
            security = config.security_enabled(),
            "client engine started"
        );
        Self {
            config,
            serialization,
            events,
            member_uuid,
        }
    }

    /// The configuration this engine was built from.
    pub fn config(&self) -> &MemberConfig {
        &self.config
    }

    /// Shared handle to the event service.
    pub fn shared_event_service(&self) -> Arc<dyn EventService> {
        Arc::clone(&self.events)
    }
}

impl ClientEngine for DefaultClientEngine {
    fn serialization_service(&self) -> &SerializationService {
        &self.serialization
    }

    fn event_service(&self) -> &dyn EventService {
        self.events.as_ref()
    }

    fn local_member_uuid(&self) -> Uuid {
        self.member_uuid
    }
}

impl fmt::Debug for DefaultClientEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultClientEngine")
            .field("member_uuid", &self.member_uuid)
            .field("config", &self.config)
            .field("serialization", &self.serialization)
            .finish()
    }
}
