//! Two peers exchanging self-describing envelopes through bytes only.

use std::sync::Arc;
use std::thread;

use hazelcast_wire::serialization::portable::{PortableReader, PortableWriter};
use hazelcast_wire::{Data, Portable, Result, SerializationContext, SerializationService};

#[derive(Debug, Default, Clone, PartialEq)]
struct Shipment {
    id: i64,
    destination: Option<String>,
    fragile: bool,
}

impl Portable for Shipment {
    fn factory_id(&self) -> i32 {
        7
    }

    fn class_id(&self) -> i32 {
        70
    }

    fn write_portable(&self, writer: &mut dyn PortableWriter) -> Result<()> {
        writer.write_long("id", self.id)?;
        writer.write_string("destination", self.destination.as_deref())?;
        writer.write_bool("fragile", self.fragile)
    }

    fn read_portable(&mut self, reader: &mut dyn PortableReader) -> Result<()> {
        self.id = reader.read_long("id")?;
        self.destination = reader.read_string("destination")?;
        self.fragile = reader.read_bool("fragile")?;
        Ok(())
    }
}

fn shipment(id: i64) -> Shipment {
    Shipment {
        id,
        destination: Some(format!("dock-{}", id)),
        fragile: id % 2 == 0,
    }
}

#[test]
fn test_first_envelope_teaches_the_receiver() {
    let sender = SerializationService::new(0);
    let receiver = SerializationService::new(0);
    assert!(receiver.context().is_empty());

    let bytes = sender.portable_to_data(&shipment(1)).unwrap().to_bytes().unwrap();
    let data = Data::from_bytes(&bytes, receiver.context()).unwrap();

    assert_eq!(receiver.context().len(), 1);
    assert!(receiver.context().lookup(70, 0).is_some());
    assert_eq!(receiver.to_portable::<Shipment>(&data).unwrap(), shipment(1));
}

#[test]
fn test_every_envelope_resends_the_definition() {
    let sender = SerializationService::new(0);
    let first = sender.portable_to_data(&shipment(1)).unwrap();
    let second = sender.portable_to_data(&shipment(3)).unwrap();
    let definition_len = first.class_definition().unwrap().binary().len();

    assert_eq!(first.total_size(), 4 + 12 + definition_len + 4 + first.size() + 4);
    assert_eq!(second.total_size(), 4 + 12 + definition_len + 4 + second.size() + 4);
}

#[test]
fn test_known_schema_ignores_corrupted_definition_bytes() {
    let sender = SerializationService::new(0);
    let receiver = SerializationContext::new(0);

    let data = sender.portable_to_data(&shipment(2)).unwrap();
    let bytes = data.to_bytes().unwrap();
    Data::from_bytes(&bytes, &receiver).unwrap();

    // Definition bytes start after type_id, class_id, version and length.
    let mut corrupted = bytes.clone();
    let definition_len = data.class_definition().unwrap().binary().len();
    for b in &mut corrupted[16..16 + definition_len] {
        *b = 0xff;
    }
    let decoded = Data::from_bytes(&corrupted, &receiver).unwrap();
    assert_eq!(decoded, data);
    assert_eq!(receiver.len(), 1);

    let stranger = SerializationContext::new(0);
    assert!(Data::from_bytes(&corrupted, &stranger).is_err());
    assert!(stranger.is_empty());
}

#[test]
fn test_round_trip_preserves_equality_and_size() {
    let sender = SerializationService::new(0);
    let receiver = SerializationContext::new(0);
    for id in 0..16 {
        let data = sender.portable_to_data(&shipment(id)).unwrap();
        let bytes = data.to_bytes().unwrap();
        assert_eq!(bytes.len(), data.total_size());
        let decoded = Data::from_bytes(&bytes, &receiver).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(decoded.partition_hash().unwrap(), data.partition_hash().unwrap());
    }
}

#[test]
fn test_concurrent_decoders_share_one_definition() {
    let sender = SerializationService::new(0);
    let bytes = Arc::new(sender.portable_to_data(&shipment(5)).unwrap().to_bytes().unwrap());
    let receiver = Arc::new(SerializationContext::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let bytes = Arc::clone(&bytes);
            let receiver = Arc::clone(&receiver);
            thread::spawn(move || Data::from_bytes(&bytes, &receiver).unwrap())
        })
        .collect();
    let decoded: Vec<Data> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(receiver.len(), 1);
    let cached = receiver.lookup(70, 0).unwrap();
    for data in &decoded {
        let attached = data.class_definition().unwrap().resolved().unwrap();
        assert!(Arc::ptr_eq(attached, &cached));
    }
}
