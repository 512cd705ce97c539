#![no_main]

use libfuzzer_sys::fuzz_target;

use hazelcast_wire::serialization::portable::{ClassDefinition, DefaultPortableReader};
use hazelcast_wire::SerializationContext;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let split = u16::from_be_bytes([data[0], data[1]]) as usize % data.len();
    let (binary, payload) = data[2..].split_at(split.min(data.len() - 2));

    if let Ok(class_def) = ClassDefinition::from_binary(binary) {
        assert_eq!(class_def.binary(), binary);
        let context = SerializationContext::new(0);
        let registered = context.register(class_def);
        let _ = DefaultPortableReader::from_bytes(&registered, payload, &context);
    }
});
