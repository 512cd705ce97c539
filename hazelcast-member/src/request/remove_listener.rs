//! Cancelling an item listener subscription.

use hazelcast_wire::serialization::portable::{PortableReader, PortableWriter};
use hazelcast_wire::{Data, Portable, Result};

use super::{
    ClientRequest, RequestContext, COLLECTION_PORTABLE_FACTORY_ID, COLLECTION_REMOVE_LISTENER,
};
use crate::security::{ClusterPermission, Permission};
use crate::service;

/// Removes a registration created by
/// [`CollectionAddListenerRequest`](super::CollectionAddListenerRequest).
/// The response is `true` when a registration was removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionRemoveListenerRequest {
    name: String,
    registration_id: String,
    service_name: String,
}

impl CollectionRemoveListenerRequest {
    /// Creates a request cancelling `registration_id` on the collection `name`.
    pub fn new(
        name: impl Into<String>,
        registration_id: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            registration_id: registration_id.into(),
            service_name: service_name.into(),
        }
    }

    /// Registration to cancel.
    pub fn registration_id(&self) -> &str {
        &self.registration_id
    }

    /// Deregisters the listener and clears the endpoint's record of it.
    pub fn execute(&self, ctx: &RequestContext) -> Result<bool> {
        let descriptor = service::resolve(&self.service_name)?;
        let removed = ctx.engine.event_service().deregister_listener(
            descriptor.service_name(),
            &self.name,
            &self.registration_id,
        );
        ctx.endpoint.remove_listener_registration(
            descriptor.service_name(),
            &self.name,
            &self.registration_id,
        );
        Ok(removed)
    }
}

impl Portable for CollectionRemoveListenerRequest {
    fn factory_id(&self) -> i32 {
        COLLECTION_PORTABLE_FACTORY_ID
    }

    fn class_id(&self) -> i32 {
        COLLECTION_REMOVE_LISTENER
    }

    fn write_portable(&self, writer: &mut dyn PortableWriter) -> Result<()> {
        writer.write_string("n", Some(&self.name))?;
        writer.write_string("r", Some(&self.registration_id))?;
        writer.write_string("s", Some(&self.service_name))
    }

    fn read_portable(&mut self, reader: &mut dyn PortableReader) -> Result<()> {
        self.name = reader.read_string("n")?.unwrap_or_default();
        self.registration_id = reader.read_string("r")?.unwrap_or_default();
        self.service_name = reader.read_string("s")?.unwrap_or_default();
        Ok(())
    }
}

impl ClientRequest for CollectionRemoveListenerRequest {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    fn required_permission(&self) -> Result<Option<ClusterPermission>> {
        let descriptor = service::resolve(&self.service_name)?;
        Ok(Some(descriptor.permission(&self.name, Permission::Listen)))
    }

    fn process(&self, ctx: &RequestContext) -> Result<Data> {
        let removed = self.execute(ctx)?;
        ctx.engine.to_data(&removed)
    }
}
