//! Subscribing a client connection to item events of a collection.

use std::fmt;
use std::sync::Arc;

use hazelcast_wire::serialization::portable::{PortableReader, PortableWriter};
use hazelcast_wire::{Data, Portable, Result};

use super::{
    ClientRequest, RequestContext, COLLECTION_ADD_LISTENER, COLLECTION_PORTABLE_FACTORY_ID,
};
use crate::endpoint::ClientEndpoint;
use crate::engine::ClientEngine;
use crate::event::{CollectionEventFilter, ItemEvent, ItemListener, PortableItemEvent};
use crate::security::{ClusterPermission, Permission};
use crate::service;

/// Registers an item listener on a list or set on behalf of a client.
///
/// The response is the registration id. Events are pushed to the calling
/// endpoint tagged with the call id of this request.
///
/// # One listener per collection and connection
///
/// A connection holds at most one registration per `(service, collection)`.
/// Subscribing again, whether a resend of the same request or a second
/// listener with a new call id, replaces the earlier registration: it is
/// deregistered and its call id receives no further events. Clients that
/// want several listeners on one collection must fan events out locally
/// from the single subscription.
///
/// Concurrent subscribes on one key are serialized by the endpoint. The
/// registration recorded last stays, and every other one is deregistered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionAddListenerRequest {
    name: String,
    include_value: bool,
    service_name: String,
}

impl CollectionAddListenerRequest {
    /// Creates a request for the collection `name` of `service_name`.
    pub fn new(
        name: impl Into<String>,
        include_value: bool,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            include_value,
            service_name: service_name.into(),
        }
    }

    /// Name of the collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether events carry the changed item.
    pub fn include_value(&self) -> bool {
        self.include_value
    }

    /// Registers the listener and returns its registration id.
    pub fn execute(&self, ctx: &RequestContext) -> Result<String> {
        let descriptor = service::resolve(&self.service_name)?;
        let events = ctx.engine.event_service();
        let filter = CollectionEventFilter::new(self.include_value);
        let (registration_id, previous) = ctx.endpoint.replace_listener_registration(
            descriptor.service_name(),
            &self.name,
            &mut || {
                let listener = Arc::new(ClientItemListener::new(
                    Arc::clone(&ctx.endpoint),
                    Arc::clone(&ctx.engine),
                    ctx.call_id,
                ));
                events
                    .register_listener(descriptor.service_name(), &self.name, filter, listener)
                    .id()
                    .to_string()
            },
        );
        if let Some(previous) = previous.filter(|p| *p != registration_id) {
            events.deregister_listener(descriptor.service_name(), &self.name, &previous);
            tracing::debug!(
                client = %ctx.endpoint.uuid(),
                topic = %self.name,
                replaced = %previous,
                "replaced item listener registration"
            );
        }
        Ok(registration_id)
    }
}

impl Portable for CollectionAddListenerRequest {
    fn factory_id(&self) -> i32 {
        COLLECTION_PORTABLE_FACTORY_ID
    }

    fn class_id(&self) -> i32 {
        COLLECTION_ADD_LISTENER
    }

    fn write_portable(&self, writer: &mut dyn PortableWriter) -> Result<()> {
        writer.write_string("n", Some(&self.name))?;
        writer.write_bool("i", self.include_value)?;
        writer.write_string("s", Some(&self.service_name))
    }

    fn read_portable(&mut self, reader: &mut dyn PortableReader) -> Result<()> {
        self.name = reader.read_string("n")?.unwrap_or_default();
        self.include_value = reader.read_bool("i")?;
        self.service_name = reader.read_string("s")?.unwrap_or_default();
        Ok(())
    }
}

impl ClientRequest for CollectionAddListenerRequest {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn required_permission(&self) -> Result<Option<ClusterPermission>> {
        let descriptor = service::resolve(&self.service_name)?;
        Ok(Some(descriptor.permission(&self.name, Permission::Listen)))
    }

    fn is_retryable(&self) -> bool {
        true
    }

    fn process(&self, ctx: &RequestContext) -> Result<Data> {
        let registration_id = self.execute(ctx)?;
        ctx.engine.to_data(&registration_id)
    }
}

/// Forwards item events to one client connection.
pub struct ClientItemListener {
    endpoint: Arc<dyn ClientEndpoint>,
    engine: Arc<dyn ClientEngine>,
    call_id: i64,
}

impl ClientItemListener {
    /// Creates a listener pushing to `endpoint` under `call_id`.
    pub fn new(
        endpoint: Arc<dyn ClientEndpoint>,
        engine: Arc<dyn ClientEngine>,
        call_id: i64,
    ) -> Self {
        Self {
            endpoint,
            engine,
            call_id,
        }
    }

    fn send(&self, event: &ItemEvent) {
        // A gone connection cannot receive pushes; the subscription stays.
        if !self.endpoint.is_live() {
            tracing::trace!(
                client = %self.endpoint.uuid(),
                topic = event.name(),
                "endpoint not live, event dropped"
            );
            return;
        }
        match self.encode(event) {
            Ok(payload) => self.endpoint.send_event(payload, self.call_id),
            Err(err) => tracing::warn!(
                client = %self.endpoint.uuid(),
                topic = event.name(),
                error = %err,
                "failed to encode item event"
            ),
        }
    }

    fn encode(&self, event: &ItemEvent) -> Result<Data> {
        let item = event
            .item()
            .map(|item| self.engine.to_data(item.as_ref()))
            .transpose()?;
        let payload =
            PortableItemEvent::new(item, event.event_type(), event.member_uuid().to_string());
        self.engine.serialization_service().portable_to_data(&payload)
    }
}

impl ItemListener for ClientItemListener {
    fn item_added(&self, event: &ItemEvent) {
        self.send(event);
    }

    fn item_removed(&self, event: &ItemEvent) {
        self.send(event);
    }
}

impl fmt::Debug for ClientItemListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientItemListener")
            .field("client", &self.endpoint.uuid())
            .field("call_id", &self.call_id)
            .finish()
    }
}
