use hazelcast_wire::{Portable, PortableFactory};

use super::{
    ClientRequest, CollectionAddListenerRequest, CollectionRemoveListenerRequest, RequestFactory,
};

/// Factory id of collection requests.
pub const COLLECTION_PORTABLE_FACTORY_ID: i32 = -20;
/// Class id of [`CollectionAddListenerRequest`].
pub const COLLECTION_ADD_LISTENER: i32 = 20;
/// Class id of [`CollectionRemoveListenerRequest`].
pub const COLLECTION_REMOVE_LISTENER: i32 = 21;

/// Creates collection requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionPortableHook;

impl RequestFactory for CollectionPortableHook {
    fn factory_id(&self) -> i32 {
        COLLECTION_PORTABLE_FACTORY_ID
    }

    fn create_request(&self, class_id: i32) -> Option<Box<dyn ClientRequest>> {
        match class_id {
            COLLECTION_ADD_LISTENER => Some(Box::new(CollectionAddListenerRequest::default())),
            COLLECTION_REMOVE_LISTENER => {
                Some(Box::new(CollectionRemoveListenerRequest::default()))
            }
            _ => None,
        }
    }
}

impl PortableFactory for CollectionPortableHook {
    fn factory_id(&self) -> i32 {
        COLLECTION_PORTABLE_FACTORY_ID
    }

    fn create(&self, class_id: i32) -> Option<Box<dyn Portable>> {
        match class_id {
            COLLECTION_ADD_LISTENER => Some(Box::new(CollectionAddListenerRequest::default())),
            COLLECTION_REMOVE_LISTENER => {
                Some(Box::new(CollectionRemoveListenerRequest::default()))
            }
            _ => None,
        }
    }
}
