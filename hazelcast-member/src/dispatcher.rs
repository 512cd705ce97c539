//! Decoding, authorising and running client requests.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use hazelcast_wire::{Data, HazelcastError, Result};

use crate::endpoint::ClientEndpoint;
use crate::engine::ClientEngine;
use crate::request::{ClientRequest, RequestContext, RequestFactory};
use crate::security::SecurityContext;

/// Routes request envelopes to the request types registered by factory id.
///
/// Each call runs decode, permission resolution, the permission check and
/// execution in that order; the first failure is returned to the caller.
pub struct RequestDispatcher {
    engine: Arc<dyn ClientEngine>,
    security: SecurityContext,
    factories: DashMap<i32, Arc<dyn RequestFactory>>,
}

impl RequestDispatcher {
    /// Creates a dispatcher with no request factories.
    pub fn new(engine: Arc<dyn ClientEngine>, security: SecurityContext) -> Self {
        Self {
            engine,
            security,
            factories: DashMap::new(),
        }
    }

    /// Registers a request factory, replacing any with the same factory id.
    pub fn register(&self, factory: Arc<dyn RequestFactory>) {
        self.factories.insert(factory.factory_id(), factory);
    }

    /// Factory ids currently registered.
    pub fn registered_factories(&self) -> Vec<i32> {
        self.factories.iter().map(|e| *e.key()).collect()
    }

    /// Decodes a request envelope.
    pub fn decode(&self, request: &Data) -> Result<Box<dyn ClientRequest>> {
        let serialization = self.engine.serialization_service();
        let class_def = serialization.portable_class_definition(request)?;
        let factory = self
            .factories
            .get(&class_def.factory_id())
            .map(|f| Arc::clone(f.value()))
            .ok_or_else(|| {
                HazelcastError::Protocol(format!(
                    "no request factory for factory_id={}",
                    class_def.factory_id()
                ))
            })?;
        let mut decoded = factory.create_request(class_def.class_id()).ok_or_else(|| {
            HazelcastError::Protocol(format!(
                "factory {} has no request class_id={}",
                class_def.factory_id(),
                class_def.class_id()
            ))
        })?;
        serialization.read_portable_into(request, decoded.as_mut())?;
        Ok(decoded)
    }

    /// Runs one request for `endpoint` and returns the encoded response.
    pub fn dispatch(
        &self,
        endpoint: Arc<dyn ClientEndpoint>,
        call_id: i64,
        request: &Data,
    ) -> Result<Data> {
        let decoded = self.decode(request)?;
        if let Some(permission) = decoded.required_permission()? {
            self.security.check(endpoint.roles(), &permission)?;
        }
        tracing::debug!(
            client = %endpoint.uuid(),
            call_id,
            service = decoded.service_name(),
            class_id = decoded.class_id(),
            "processing client request"
        );
        let ctx = RequestContext {
            call_id,
            endpoint,
            engine: Arc::clone(&self.engine),
        };
        decoded.process(&ctx)
    }
}

impl fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("security", &self.security)
            .field("factories", &self.registered_factories())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemberConfig;
    use crate::endpoint::DefaultClientEndpoint;
    use crate::engine::DefaultClientEngine;
    use crate::event::EventService;
    use crate::request::{
        CollectionAddListenerRequest, CollectionPortableHook, COLLECTION_PORTABLE_FACTORY_ID,
    };
    use crate::security::Role;
    use crate::service::SET_SERVICE_NAME;
    use hazelcast_wire::SerializationService;
    use uuid::Uuid;

    fn dispatcher(security: bool) -> (RequestDispatcher, Arc<DefaultClientEngine>) {
        let engine = Arc::new(DefaultClientEngine::new(MemberConfig::default()));
        let dispatcher = RequestDispatcher::new(engine.clone(), SecurityContext::new(security));
        dispatcher.register(Arc::new(CollectionPortableHook));
        (dispatcher, engine)
    }

    fn encoded(request: &CollectionAddListenerRequest) -> Data {
        let bytes = SerializationService::new(0)
            .portable_to_data(request)
            .unwrap()
            .to_bytes()
            .unwrap();
        Data::from_bytes(&bytes, &hazelcast_wire::SerializationContext::new(0)).unwrap()
    }

    #[test]
    fn test_decode() {
        let (dispatcher, _) = dispatcher(false);
        assert_eq!(dispatcher.registered_factories(), vec![COLLECTION_PORTABLE_FACTORY_ID]);
        let request = CollectionAddListenerRequest::new("orders", true, SET_SERVICE_NAME);
        let decoded = dispatcher.decode(&encoded(&request)).unwrap();
        assert_eq!(decoded.service_name(), SET_SERVICE_NAME);
        assert!(decoded.is_retryable());
    }

    #[test]
    fn test_decode_without_factory() {
        let engine = Arc::new(DefaultClientEngine::new(MemberConfig::default()));
        let dispatcher = RequestDispatcher::new(engine, SecurityContext::new(false));
        let request = CollectionAddListenerRequest::new("orders", true, SET_SERVICE_NAME);
        let err = dispatcher.decode(&encoded(&request)).err().unwrap();
        assert!(err.to_string().contains("no request factory"));
        assert!(matches!(err, HazelcastError::Protocol(_)));
    }

    #[test]
    fn test_decode_rejects_non_portable() {
        let (dispatcher, _) = dispatcher(false);
        assert!(dispatcher.decode(&Data::new(-7, vec![0, 0, 0, 1])).is_err());
    }

    #[test]
    fn test_dispatch_denied_without_role() {
        let (dispatcher, engine) = dispatcher(true);
        let (endpoint, _events) = DefaultClientEndpoint::new(Uuid::new_v4());
        let request = CollectionAddListenerRequest::new("orders", true, SET_SERVICE_NAME);
        let err = dispatcher
            .dispatch(Arc::new(endpoint), 1, &encoded(&request))
            .unwrap_err();
        assert!(matches!(err, HazelcastError::Authorization(_)));
        assert!(engine.event_service().registrations(SET_SERVICE_NAME, "orders").is_empty());
    }

    #[test]
    fn test_dispatch_allowed_with_role() {
        let (dispatcher, engine) = dispatcher(true);
        let (endpoint, _events) = DefaultClientEndpoint::new(Uuid::new_v4());
        let endpoint = Arc::new(endpoint.with_roles([Role::observer("watcher")]));
        let request = CollectionAddListenerRequest::new("orders", true, SET_SERVICE_NAME);
        let response = dispatcher.dispatch(endpoint.clone(), 1, &encoded(&request)).unwrap();
        let id: String = engine.serialization_service().to_object(&response).unwrap();
        assert_eq!(endpoint.listener_registration(SET_SERVICE_NAME, "orders"), Some(id));
    }
}
