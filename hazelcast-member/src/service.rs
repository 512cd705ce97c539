//! Collection-backed services a client may subscribe to.
//!
//! Each service name maps to one row of a closed table. Adding a
//! collection type means adding a row.

use hazelcast_wire::{HazelcastError, Result};

use crate::security::{ClusterPermission, Permission, ResourceType};

/// Service name of the distributed list.
pub const LIST_SERVICE_NAME: &str = "hz:impl:listService";
/// Service name of the distributed set.
pub const SET_SERVICE_NAME: &str = "hz:impl:setService";

/// One collection service family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionServiceDescriptor {
    service_name: &'static str,
    resource_type: ResourceType,
}

impl CollectionServiceDescriptor {
    /// Registered service name.
    pub fn service_name(&self) -> &'static str {
        self.service_name
    }

    /// Resource family permissions are scoped to.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Builds the permission for `action` on the collection `name`.
    pub fn permission(&self, name: &str, action: Permission) -> ClusterPermission {
        ClusterPermission::new(self.resource_type, name, action)
    }
}

static COLLECTION_SERVICES: [CollectionServiceDescriptor; 2] = [
    CollectionServiceDescriptor {
        service_name: LIST_SERVICE_NAME,
        resource_type: ResourceType::List,
    },
    CollectionServiceDescriptor {
        service_name: SET_SERVICE_NAME,
        resource_type: ResourceType::Set,
    },
];

/// Every known collection service.
pub fn collection_services() -> &'static [CollectionServiceDescriptor] {
    &COLLECTION_SERVICES
}

/// Looks up a collection service by name.
///
/// An unknown name is a configuration error; it is never retried.
pub fn resolve(service_name: &str) -> Result<&'static CollectionServiceDescriptor> {
    COLLECTION_SERVICES
        .iter()
        .find(|d| d.service_name == service_name)
        .ok_or_else(|| {
            HazelcastError::Configuration(format!("no service matched: '{}'", service_name))
        })
}
