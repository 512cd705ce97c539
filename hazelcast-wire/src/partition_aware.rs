//! Routing by a key other than the value itself.
//!
//! Envelopes are normally routed by a hash of their own payload. A type
//! implementing [`PartitionAware`] supplies the bytes to hash instead, so
//! related values land on the same partition.

use crate::serialization::hash_bytes;

/// Keys that choose their own partition.
pub trait PartitionAware: Send + Sync {
    /// Bytes the partition hash is computed from.
    fn partition_key_bytes(&self) -> Vec<u8>;

    /// Partition hash of [`partition_key_bytes`](Self::partition_key_bytes).
    fn partition_hash(&self) -> i32 {
        hash_bytes(&self.partition_key_bytes())
    }
}

impl PartitionAware for str {
    fn partition_key_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl PartitionAware for String {
    fn partition_key_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ListenerKey {
        collection: String,
        registration: u32,
    }

    impl PartitionAware for ListenerKey {
        fn partition_key_bytes(&self) -> Vec<u8> {
            self.collection.as_bytes().to_vec()
        }
    }

    #[test]
    fn test_same_collection_same_partition() {
        let a = ListenerKey {
            collection: "orders".into(),
            registration: 1,
        };
        let b = ListenerKey {
            collection: "orders".into(),
            registration: 2,
        };
        assert_ne!(a.registration, b.registration);
        assert_eq!(a.partition_hash(), b.partition_hash());
    }

    #[test]
    fn test_hash_matches_payload_hash() {
        assert_eq!("orders".partition_hash(), hash_bytes(b"orders"));
        assert_eq!(String::from("a").partition_hash(), hash_bytes(b"a"));
        assert_ne!("orders".partition_hash(), "invoices".partition_hash());
    }
}
