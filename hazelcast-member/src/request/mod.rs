//! Client requests handled by the member.

mod add_listener;
mod hook;
mod remove_listener;

use std::sync::Arc;

use hazelcast_wire::{Data, Portable, Result};

use crate::endpoint::ClientEndpoint;
use crate::engine::ClientEngine;
use crate::security::ClusterPermission;

pub use add_listener::{ClientItemListener, CollectionAddListenerRequest};
pub use hook::{
    CollectionPortableHook, COLLECTION_ADD_LISTENER, COLLECTION_PORTABLE_FACTORY_ID,
    COLLECTION_REMOVE_LISTENER,
};
pub use remove_listener::CollectionRemoveListenerRequest;

/// Everything a request needs while it executes.
#[derive(Clone)]
pub struct RequestContext {
    /// Correlation id of the call on its connection.
    pub call_id: i64,
    /// The calling connection.
    pub endpoint: Arc<dyn ClientEndpoint>,
    /// Member services.
    pub engine: Arc<dyn ClientEngine>,
}

/// A decoded client request.
pub trait ClientRequest: Portable {
    /// Service the request targets.
    fn service_name(&self) -> &str;

    /// Permission the caller needs, or `None` for unsecured requests.
    ///
    /// Resolution errors, such as an unknown service name, surface here
    /// before anything executes.
    fn required_permission(&self) -> Result<Option<ClusterPermission>>;

    /// Whether the client may resend the request verbatim when it cannot
    /// confirm the response arrived.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Executes the request and returns the encoded response.
    fn process(&self, ctx: &RequestContext) -> Result<Data>;
}

/// Creates empty requests by class id, ready to be read from the wire.
pub trait RequestFactory: Send + Sync {
    /// Factory id shared by the requests this factory creates.
    fn factory_id(&self) -> i32;

    /// Creates an empty request of `class_id`.
    fn create_request(&self, class_id: i32) -> Option<Box<dyn ClientRequest>>;
}
