//! Shared fixtures: a member with the collection requests registered and a
//! client-side serializer that talks to it only through wire bytes.

#![allow(dead_code)]

use std::sync::Arc;

use hazelcast_member::{
    ClientEngine, ClientEvent, CollectionPortableHook, DefaultClientEndpoint, DefaultClientEngine,
    DefaultEventService, MemberConfig, RequestDispatcher, SecurityContext,
};
use hazelcast_wire::{Data, Portable, SerializationContext, SerializationService};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

pub struct Member {
    pub events: Arc<DefaultEventService>,
    pub engine: Arc<DefaultClientEngine>,
    pub dispatcher: RequestDispatcher,
}

impl Member {
    pub fn new(config: MemberConfig) -> Self {
        let events = Arc::new(DefaultEventService::new());
        let engine = Arc::new(DefaultClientEngine::with_event_service(
            config.clone(),
            events.clone(),
        ));
        let dispatcher = RequestDispatcher::new(
            engine.clone(),
            SecurityContext::new(config.security_enabled()),
        );
        dispatcher.register(Arc::new(CollectionPortableHook));
        Self {
            events,
            engine,
            dispatcher,
        }
    }

    pub fn context(&self) -> Arc<SerializationContext> {
        Arc::clone(self.engine.serialization_service().context())
    }
}

pub struct Client {
    pub serialization: SerializationService,
}

impl Client {
    pub fn new() -> Self {
        Self {
            serialization: SerializationService::new(0),
        }
    }

    /// Encodes a request and passes it through wire bytes into the member's
    /// context, as a connection reader would.
    pub fn send<P: Portable>(&self, member: &Member, request: &P) -> Data {
        let bytes = self
            .serialization
            .portable_to_data(request)
            .unwrap()
            .to_bytes()
            .unwrap();
        Data::from_bytes(&bytes, &member.context()).unwrap()
    }

    /// Reads a member-encoded envelope back on the client side.
    pub fn receive(&self, data: &Data) -> Data {
        let bytes = data.to_bytes().unwrap();
        Data::from_bytes(&bytes, self.serialization.context()).unwrap()
    }
}

pub fn endpoint() -> (Arc<DefaultClientEndpoint>, UnboundedReceiver<ClientEvent>) {
    let (endpoint, events) = DefaultClientEndpoint::new(Uuid::new_v4());
    (Arc::new(endpoint), events)
}
