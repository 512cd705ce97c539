#![no_main]

use libfuzzer_sys::fuzz_target;

use hazelcast_wire::serialization::portable::{ClassDefinitionBuilder, FieldType};
use hazelcast_wire::{Data, SerializationContext};

fuzz_target!(|data: &[u8]| {
    let context = SerializationContext::new(0);
    // One known definition so both the skip and the parse path are reached.
    if let Ok(known) = ClassDefinitionBuilder::new(1, 1, 0)
        .add_field("n", FieldType::Utf8)
        .build()
    {
        context.register(known);
    }

    if let Ok(decoded) = Data::from_bytes(data, &context) {
        let _ = decoded.partition_hash();
        let _ = decoded.is_portable();
        let total = decoded.total_size();
        if let Ok(encoded) = decoded.to_bytes() {
            assert_eq!(encoded.len(), total);
            let again = Data::from_bytes(&encoded, &context).expect("re-decode");
            assert_eq!(again, decoded);
        }
    }
});
