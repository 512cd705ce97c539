//! Member-side handling of client collection listener subscriptions.
//!
//! A client subscribes to item events of a list or set with a
//! [`CollectionAddListenerRequest`]. The member registers a listener with
//! its [`EventService`] that encodes each event as a [`PortableItemEvent`]
//! and pushes it to the client's [`ClientEndpoint`], tagged with the call
//! id of the subscribing request.
//!
//! ```ignore
//! let engine = Arc::new(DefaultClientEngine::new(MemberConfig::default()));
//! let dispatcher = RequestDispatcher::new(engine.clone(), SecurityContext::new(false));
//! dispatcher.register(Arc::new(CollectionPortableHook));
//! let response = dispatcher.dispatch(endpoint, call_id, &request)?;
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod engine;
pub mod event;
pub mod logging;
pub mod request;
pub mod security;
pub mod service;

pub use config::{ConfigError, MemberConfig, MemberConfigBuilder};
pub use dispatcher::RequestDispatcher;
pub use endpoint::{ClientEndpoint, ClientEvent, DefaultClientEndpoint};
pub use engine::{ClientEngine, DefaultClientEngine};
pub use event::{
    CollectionEventFilter, DefaultEventService, EventRegistration, EventService, ItemEvent,
    ItemEventType, ItemListener, PortableItemEvent,
};
pub use logging::{init_logging, LogLevel, LoggingConfig};
pub use request::{
    ClientRequest, CollectionAddListenerRequest, CollectionPortableHook,
    CollectionRemoveListenerRequest, RequestContext,
};
pub use security::{ClusterPermission, Permission, ResourceType, Role, SecurityContext};

pub use hazelcast_wire::{HazelcastError, Result};
