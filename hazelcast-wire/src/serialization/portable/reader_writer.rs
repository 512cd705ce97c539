//! Field-level readers and writers driven by a [`ClassDefinition`].
//!
//! Payload layout: for every field of the definition, in index order, a
//! presence marker byte followed (when present) by an `i32` length and the
//! field bytes; then an `i32` length and the raw section.

use super::{ClassDefinition, ClassDefinitionBuilder, FieldType, PortableReader, PortableWriter};
use crate::error::{HazelcastError, Result};
use crate::serialization::{
    ByteCounter, Data, DataInput, DataOutput, ObjectDataInput, ObjectDataOutput,
    SerializationContext,
};

const NULL_MARKER: i8 = 0;
const NOT_NULL_MARKER: i8 = 1;

fn raw_section_closed(name: &str) -> HazelcastError {
    HazelcastError::Serialization(format!(
        "cannot write field '{}' after the raw section was opened",
        name
    ))
}

/// Records field names and types to derive a class definition from a
/// Portable's `write_portable`.
#[derive(Debug)]
pub struct ClassDefinitionWriter {
    builder: ClassDefinitionBuilder,
    raw: ByteCounter,
    raw_started: bool,
}

impl ClassDefinitionWriter {
    /// Starts recording a definition for the given identity.
    pub fn new(factory_id: i32, class_id: i32, version: i32) -> Self {
        Self {
            builder: ClassDefinitionBuilder::new(factory_id, class_id, version),
            raw: ByteCounter::new(),
            raw_started: false,
        }
    }

    fn record(&mut self, name: &str, field_type: FieldType) -> Result<()> {
        if self.raw_started {
            return Err(raw_section_closed(name));
        }
        self.builder.push(name, field_type);
        Ok(())
    }

    /// Builds the recorded definition.
    pub fn build(self) -> Result<ClassDefinition> {
        self.builder.build()
    }
}

impl PortableWriter for ClassDefinitionWriter {
    fn write_byte(&mut self, name: &str, _value: i8) -> Result<()> {
        self.record(name, FieldType::Byte)
    }

    fn write_bool(&mut self, name: &str, _value: bool) -> Result<()> {
        self.record(name, FieldType::Bool)
    }

    fn write_short(&mut self, name: &str, _value: i16) -> Result<()> {
        self.record(name, FieldType::Short)
    }

    fn write_int(&mut self, name: &str, _value: i32) -> Result<()> {
        self.record(name, FieldType::Int)
    }

    fn write_long(&mut self, name: &str, _value: i64) -> Result<()> {
        self.record(name, FieldType::Long)
    }

    fn write_double(&mut self, name: &str, _value: f64) -> Result<()> {
        self.record(name, FieldType::Double)
    }

    fn write_string(&mut self, name: &str, _value: Option<&str>) -> Result<()> {
        self.record(name, FieldType::Utf8)
    }

    fn write_byte_array(&mut self, name: &str, _value: Option<&[u8]>) -> Result<()> {
        self.record(name, FieldType::ByteArray)
    }

    fn raw_data_output(&mut self) -> &mut dyn DataOutput {
        self.raw_started = true;
        &mut self.raw
    }
}

/// Writes field values in the order fixed by a class definition.
#[derive(Debug)]
pub struct DefaultPortableWriter<'a> {
    class_def: &'a ClassDefinition,
    fields: Vec<Option<Vec<u8>>>,
    raw: ObjectDataOutput,
    raw_started: bool,
}

impl<'a> DefaultPortableWriter<'a> {
    /// Creates a writer for the given class definition.
    pub fn new(class_def: &'a ClassDefinition) -> Self {
        Self {
            class_def,
            fields: vec![None; class_def.field_count()],
            raw: ObjectDataOutput::new(),
            raw_started: false,
        }
    }

    fn write_field(
        &mut self,
        name: &str,
        expected_type: FieldType,
        value: Option<ObjectDataOutput>,
    ) -> Result<()> {
        if self.raw_started {
            return Err(raw_section_closed(name));
        }
        let field = self
            .class_def
            .field(name)
            .ok_or_else(|| HazelcastError::Serialization(format!("unknown field: {}", name)))?;
        if field.field_type() != expected_type {
            return Err(HazelcastError::Serialization(format!(
                "field '{}' type mismatch: expected {:?}, got {:?}",
                name,
                field.field_type(),
                expected_type
            )));
        }
        self.fields[field.index() as usize] = value.map(ObjectDataOutput::into_bytes);
        Ok(())
    }

    fn primitive(
        &mut self,
        name: &str,
        field_type: FieldType,
        write: impl FnOnce(&mut ObjectDataOutput) -> Result<()>,
    ) -> Result<()> {
        let mut out = ObjectDataOutput::with_capacity(8);
        write(&mut out)?;
        self.write_field(name, field_type, Some(out))
    }

    /// Encodes the written fields and the raw section.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut output = ObjectDataOutput::new();
        for value in &self.fields {
            match value {
                Some(bytes) => {
                    output.write_byte(NOT_NULL_MARKER)?;
                    output.write_length(bytes.len())?;
                    output.write_bytes(bytes)?;
                }
                None => output.write_byte(NULL_MARKER)?,
            }
        }
        output.write_length(self.raw.len())?;
        output.write_bytes(self.raw.as_bytes())?;
        Ok(output.into_bytes())
    }
}

impl PortableWriter for DefaultPortableWriter<'_> {
    fn write_byte(&mut self, name: &str, value: i8) -> Result<()> {
        self.primitive(name, FieldType::Byte, |out| out.write_byte(value))
    }

    fn write_bool(&mut self, name: &str, value: bool) -> Result<()> {
        self.primitive(name, FieldType::Bool, |out| out.write_bool(value))
    }

    fn write_short(&mut self, name: &str, value: i16) -> Result<()> {
        self.primitive(name, FieldType::Short, |out| out.write_short(value))
    }

    fn write_int(&mut self, name: &str, value: i32) -> Result<()> {
        self.primitive(name, FieldType::Int, |out| out.write_int(value))
    }

    fn write_long(&mut self, name: &str, value: i64) -> Result<()> {
        self.primitive(name, FieldType::Long, |out| out.write_long(value))
    }

    fn write_double(&mut self, name: &str, value: f64) -> Result<()> {
        self.primitive(name, FieldType::Double, |out| out.write_double(value))
    }

    fn write_string(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let encoded = match value {
            Some(s) => {
                let mut out = ObjectDataOutput::with_capacity(s.len() + 4);
                out.write_string(s)?;
                Some(out)
            }
            None => None,
        };
        self.write_field(name, FieldType::Utf8, encoded)
    }

    fn write_byte_array(&mut self, name: &str, value: Option<&[u8]>) -> Result<()> {
        let encoded = match value {
            Some(arr) => {
                let mut out = ObjectDataOutput::with_capacity(arr.len());
                out.write_bytes(arr)?;
                Some(out)
            }
            None => None,
        };
        self.write_field(name, FieldType::ByteArray, encoded)
    }

    fn raw_data_output(&mut self) -> &mut dyn DataOutput {
        self.raw_started = true;
        &mut self.raw
    }
}

/// Reads field values laid out by [`DefaultPortableWriter`].
#[derive(Debug)]
pub struct DefaultPortableReader<'a> {
    class_def: &'a ClassDefinition,
    fields: Vec<Option<&'a [u8]>>,
    raw: ObjectDataInput<'a>,
    context: &'a SerializationContext,
}

impl<'a> DefaultPortableReader<'a> {
    /// Splits `payload` into per-field slices according to `class_def`.
    pub fn from_bytes(
        class_def: &'a ClassDefinition,
        payload: &'a [u8],
        context: &'a SerializationContext,
    ) -> Result<Self> {
        let mut input = ObjectDataInput::new(payload);
        let mut fields = Vec::with_capacity(class_def.field_count());
        for field in class_def.fields() {
            match input.read_byte()? {
                NULL_MARKER => fields.push(None),
                NOT_NULL_MARKER => {
                    let len = input.read_length()?;
                    let start = input.position();
                    input.skip_bytes(len)?;
                    fields.push(Some(&payload[start..start + len]));
                }
                other => {
                    return Err(HazelcastError::Serialization(format!(
                        "field '{}': invalid presence marker {}",
                        field.name(),
                        other
                    )))
                }
            }
        }

        let raw_len = input.read_length()?;
        let start = input.position();
        input.skip_bytes(raw_len)?;
        if input.remaining() != 0 {
            return Err(HazelcastError::Serialization(format!(
                "portable payload has {} trailing bytes",
                input.remaining()
            )));
        }

        Ok(Self {
            class_def,
            fields,
            raw: ObjectDataInput::new(&payload[start..start + raw_len]),
            context,
        })
    }

    fn field_input(
        &self,
        name: &str,
        expected_type: FieldType,
    ) -> Result<Option<ObjectDataInput<'a>>> {
        let field = self
            .class_def
            .field(name)
            .ok_or_else(|| HazelcastError::Serialization(format!("unknown field: {}", name)))?;
        if field.field_type() != expected_type {
            return Err(HazelcastError::Serialization(format!(
                "field '{}' type mismatch: expected {:?}, got {:?}",
                name,
                expected_type,
                field.field_type()
            )));
        }
        Ok(self.fields[field.index() as usize].map(ObjectDataInput::new))
    }

    fn required(&self, name: &str, expected_type: FieldType) -> Result<ObjectDataInput<'a>> {
        self.field_input(name, expected_type)?
            .ok_or_else(|| HazelcastError::Serialization(format!("field '{}' is null", name)))
    }
}

impl PortableReader for DefaultPortableReader<'_> {
    fn version(&self) -> i32 {
        self.class_def.version()
    }

    fn has_field(&self, name: &str) -> bool {
        self.class_def.has_field(name)
    }

    fn read_byte(&mut self, name: &str) -> Result<i8> {
        self.required(name, FieldType::Byte)?.read_byte()
    }

    fn read_bool(&mut self, name: &str) -> Result<bool> {
        self.required(name, FieldType::Bool)?.read_bool()
    }

    fn read_short(&mut self, name: &str) -> Result<i16> {
        self.required(name, FieldType::Short)?.read_short()
    }

    fn read_int(&mut self, name: &str) -> Result<i32> {
        self.required(name, FieldType::Int)?.read_int()
    }

    fn read_long(&mut self, name: &str) -> Result<i64> {
        self.required(name, FieldType::Long)?.read_long()
    }

    fn read_double(&mut self, name: &str) -> Result<f64> {
        self.required(name, FieldType::Double)?.read_double()
    }

    fn read_string(&mut self, name: &str) -> Result<Option<String>> {
        self.field_input(name, FieldType::Utf8)?
            .map(|mut input| input.read_string())
            .transpose()
    }

    fn read_byte_array(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        self.field_input(name, FieldType::ByteArray)?
            .map(|mut input| {
                let len = input.remaining();
                input.read_bytes(len)
            })
            .transpose()
    }

    fn raw_data_input(&mut self) -> &mut dyn DataInput {
        &mut self.raw
    }

    fn read_raw_data(&mut self) -> Result<Option<Data>> {
        if !self.raw.read_bool()? {
            return Ok(None);
        }
        Data::read_data(&mut self.raw, self.context).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_definition() -> ClassDefinition {
        ClassDefinitionBuilder::new(1, 2, 0)
            .add_field("id", FieldType::Long)
            .add_field("name", FieldType::Utf8)
            .add_field("flag", FieldType::Bool)
            .add_field("blob", FieldType::ByteArray)
            .build()
            .unwrap()
    }

    #[test]
    fn test_definition_writer_records_fields_in_order() {
        let mut writer = ClassDefinitionWriter::new(1, 2, 0);
        writer.write_long("id", 1).unwrap();
        writer.write_string("name", None).unwrap();
        writer.write_bool("flag", true).unwrap();
        writer.write_byte_array("blob", None).unwrap();
        writer.raw_data_output().write_int(5).unwrap();
        assert_eq!(writer.build().unwrap(), sample_definition());
    }

    #[test]
    fn test_definition_writer_rejects_fields_after_raw() {
        let mut writer = ClassDefinitionWriter::new(1, 2, 0);
        writer.raw_data_output();
        assert!(writer.write_int("late", 1).is_err());
    }

    #[test]
    fn test_write_then_read_fields() {
        let cd = sample_definition();
        let context = SerializationContext::new(0);
        let mut writer = DefaultPortableWriter::new(&cd);
        writer.write_long("id", 99).unwrap();
        writer.write_string("name", Some("orders")).unwrap();
        writer.write_bool("flag", true).unwrap();
        writer.write_byte_array("blob", Some(&[1, 2, 3])).unwrap();
        writer.raw_data_output().write_int(-7).unwrap();
        let bytes = writer.to_bytes().unwrap();

        let mut reader = DefaultPortableReader::from_bytes(&cd, &bytes, &context).unwrap();
        assert_eq!(reader.read_long("id").unwrap(), 99);
        assert_eq!(reader.read_string("name").unwrap().as_deref(), Some("orders"));
        assert!(reader.read_bool("flag").unwrap());
        assert_eq!(reader.read_byte_array("blob").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(reader.raw_data_input().read_int().unwrap(), -7);
    }

    #[test]
    fn test_raw_envelopes() {
        let cd = sample_definition();
        let context = SerializationContext::new(0);
        let item = Data::new(-11, vec![0, 0, 0, 1, b'x']);
        let mut writer = DefaultPortableWriter::new(&cd);
        writer.write_long("id", 1).unwrap();
        writer.write_raw_data(Some(&item)).unwrap();
        writer.write_raw_data(None).unwrap();
        let bytes = writer.to_bytes().unwrap();

        let mut reader = DefaultPortableReader::from_bytes(&cd, &bytes, &context).unwrap();
        assert_eq!(reader.read_raw_data().unwrap(), Some(item));
        assert_eq!(reader.read_raw_data().unwrap(), None);
        assert!(reader.read_raw_data().is_err());
    }

    #[test]
    fn test_null_fields() {
        let cd = sample_definition();
        let context = SerializationContext::new(0);
        let mut writer = DefaultPortableWriter::new(&cd);
        writer.write_string("name", None).unwrap();
        let bytes = writer.to_bytes().unwrap();

        let mut reader = DefaultPortableReader::from_bytes(&cd, &bytes, &context).unwrap();
        assert_eq!(reader.read_string("name").unwrap(), None);
        assert_eq!(reader.read_byte_array("blob").unwrap(), None);
        assert!(reader.read_long("id").is_err());
    }

    #[test]
    fn test_type_mismatch_and_unknown_field() {
        let cd = sample_definition();
        let mut writer = DefaultPortableWriter::new(&cd);
        assert!(writer.write_int("id", 1).is_err());
        assert!(writer.write_long("missing", 1).is_err());
    }

    #[test]
    fn test_reader_rejects_truncated_payload() {
        let cd = sample_definition();
        let context = SerializationContext::new(0);
        let mut writer = DefaultPortableWriter::new(&cd);
        writer.write_long("id", 1).unwrap();
        let bytes = writer.to_bytes().unwrap();
        assert!(DefaultPortableReader::from_bytes(&cd, &bytes[..bytes.len() - 1], &context).is_err());
    }

    #[test]
    fn test_reader_rejects_bad_marker() {
        let cd = ClassDefinitionBuilder::new(1, 3, 0)
            .add_field("x", FieldType::Int)
            .build()
            .unwrap();
        let context = SerializationContext::new(0);
        let bytes = [9u8, 0, 0, 0, 0];
        let err = DefaultPortableReader::from_bytes(&cd, &bytes, &context).unwrap_err();
        assert!(err.to_string().contains("invalid presence marker"));
    }
}
