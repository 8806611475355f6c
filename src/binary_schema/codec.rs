// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! The struct codec interprets a structured type description to decode and encode values of
//! that type.
//!
//! A codec is compiled once from its [`StructuredTypeDescriptor`]. Compiling checks the field
//! references and replaces every `LengthField` and `SwitchField` name with the index of the
//! sibling it refers to, so decoding and encoding never look a field up by name.

use std::{
    borrow::Cow,
    collections::HashMap,
    io::{Cursor, Read, Write},
    sync::Arc,
};

use crate::types::{constants, encoding::*, ExtensionObject, NodeId, StatusCode};

use super::{
    bits::{BitReader, BitWriter},
    error::{DecodingError, EncodingError, Reason, SchemaError},
    model::{
        EnumeratedTypeDescriptor, FieldDescriptor, FieldType, StructuredTypeDescriptor,
        SwitchOperand, TypeRef,
    },
    primitive::PrimitiveKind,
    resolver::{ResolvedType, TypeResolver},
    value::{EnumValue, StructuredValue, Value},
};

/// How many values a field holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Length {
    /// A single value
    Scalar,
    /// A fixed number of values, or of bits for a bit field
    Fixed(u32),
    /// As many values as the earlier field at the index says
    Field(usize),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Switch {
    /// Index of the earlier field holding the switch value
    field: usize,
    operand: SwitchOperand,
    value: i64,
}

#[derive(Debug)]
struct CompiledField {
    field_type: FieldType,
    length: Length,
    switch: Option<Switch>,
    /// Indices of the array fields whose length this field holds
    owners: Vec<usize>,
}

impl CompiledField {
    /// A length field is derived from its owners and never appears in a decoded value.
    fn is_length_field(&self) -> bool {
        !self.owners.is_empty()
    }

    fn is_bits(&self) -> bool {
        matches!(self.field_type, FieldType::Primitive(PrimitiveKind::Bit))
    }

    /// A length counted in bytes is only unsupported where there is a length to count. A
    /// single value ignores the flag.
    fn check_length_in_bytes(&self, descriptor: &FieldDescriptor) -> Result<(), Reason> {
        if descriptor.is_length_in_bytes && self.length != Length::Scalar {
            return Err(Reason::UnsupportedLengthInBytes {
                field: descriptor.name.clone(),
            });
        }
        Ok(())
    }
}

/// What a single element of a field is decoded / encoded as, after resolution.
enum ElementType<'a> {
    Primitive(PrimitiveKind),
    Structured(Arc<StructCodec>),
    Enumerated(&'a TypeRef, Arc<EnumeratedTypeDescriptor>),
}

impl<'a> ElementType<'a> {
    fn resolve(
        field_type: &'a FieldType,
        resolver: &dyn TypeResolver,
    ) -> Result<ElementType<'a>, Reason> {
        match field_type {
            FieldType::Primitive(kind) => Ok(ElementType::Primitive(*kind)),
            FieldType::Delegate(type_ref) => {
                match resolver.resolve(&type_ref.namespace_uri, &type_ref.name)? {
                    ResolvedType::Structured(codec) => Ok(ElementType::Structured(codec)),
                    ResolvedType::Enumerated(enumerated) => {
                        Ok(ElementType::Enumerated(type_ref, enumerated))
                    }
                }
            }
        }
    }
}

/// Decoder and encoder for one structured type.
#[derive(Debug)]
pub struct StructCodec {
    descriptor: StructuredTypeDescriptor,
    fields: Vec<CompiledField>,
}

impl StructCodec {
    /// Compiles the codec for a structured type. Fails if the type refers to fields that do
    /// not exist or cannot be used the way they are referred to.
    pub fn new(descriptor: StructuredTypeDescriptor) -> Result<StructCodec, SchemaError> {
        let type_name = &descriptor.name;
        let mut fields: Vec<CompiledField> = Vec::with_capacity(descriptor.fields.len());
        let mut indices: HashMap<&str, usize> = HashMap::with_capacity(descriptor.fields.len());

        let sibling = |indices: &HashMap<&str, usize>, field: &FieldDescriptor, name: &str| {
            indices
                .get(name)
                .copied()
                .ok_or_else(|| SchemaError::UnknownSibling {
                    type_name: type_name.clone(),
                    field: field.name.clone(),
                    sibling: name.to_string(),
                })
        };

        for (idx, field) in descriptor.fields.iter().enumerate() {
            if indices.contains_key(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    type_name: type_name.clone(),
                    field: field.name.clone(),
                });
            }
            let field_type = FieldType::of(&field.type_ref);
            let is_bits = matches!(field_type, FieldType::Primitive(PrimitiveKind::Bit));

            let length = match (field.length, field.length_field.as_deref()) {
                (Some(_), Some(_)) => {
                    return Err(SchemaError::LengthAndLengthField {
                        type_name: type_name.clone(),
                        field: field.name.clone(),
                    });
                }
                (Some(length), None) => {
                    if is_bits && length as usize > constants::MAX_BIT_FIELD_LENGTH {
                        return Err(SchemaError::BitFieldTooLong {
                            type_name: type_name.clone(),
                            field: field.name.clone(),
                            length,
                            max: constants::MAX_BIT_FIELD_LENGTH,
                        });
                    }
                    Length::Fixed(length)
                }
                (None, Some(length_field)) => {
                    if is_bits {
                        return Err(SchemaError::BitLengthField {
                            type_name: type_name.clone(),
                            field: field.name.clone(),
                        });
                    }
                    let target = sibling(&indices, field, length_field)?;
                    let is_integer = fields[target].length == Length::Scalar
                        && matches!(fields[target].field_type, FieldType::Primitive(kind) if kind.is_integer());
                    if !is_integer {
                        return Err(SchemaError::LengthFieldNotInteger {
                            type_name: type_name.clone(),
                            field: field.name.clone(),
                            length_field: length_field.to_string(),
                        });
                    }
                    Length::Field(target)
                }
                (None, None) => Length::Scalar,
            };

            let switch = match field.switch_field.as_deref() {
                Some(switch_field) => Some(Switch {
                    field: sibling(&indices, field, switch_field)?,
                    operand: field.effective_switch_operand(),
                    value: field.effective_switch_value(),
                }),
                None => None,
            };

            if let Length::Field(target) = length {
                fields[target].owners.push(idx);
            }
            fields.push(CompiledField {
                field_type,
                length,
                switch,
                owners: Vec::new(),
            });
            indices.insert(field.name.as_str(), idx);
        }

        Ok(StructCodec { descriptor, fields })
    }

    /// Name of the structured type
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &StructuredTypeDescriptor {
        &self.descriptor
    }

    /// Decodes a value of the type from the stream. Nested types are resolved through the
    /// resolver.
    ///
    /// The nesting depth is counted from this call, decodes running at the same time on clones
    /// of the options do not add to it.
    pub fn decode<S: Read>(
        &self,
        stream: &mut S,
        resolver: &dyn TypeResolver,
        decoding_options: &DecodingOptions,
    ) -> Result<StructuredValue, DecodingError> {
        let decoding_options = decoding_options.isolated();
        let mut reader = BitReader::new(stream);
        self.decode_fields(&mut reader, resolver, &decoding_options)
            .map_err(|reason| {
                debug!("Cannot decode {}, {}", self.name(), reason);
                DecodingError(reason)
            })
    }

    /// Encodes the value to the stream and returns the number of bytes written. Nothing is
    /// written to the stream unless the whole value encodes.
    pub fn encode<S: Write>(
        &self,
        stream: &mut S,
        value: &StructuredValue,
        resolver: &dyn TypeResolver,
    ) -> Result<usize, EncodingError> {
        let mut buffer = Vec::new();
        let mut writer = BitWriter::new(&mut buffer);
        self.encode_fields(&mut writer, value, resolver)
            .map_err(|reason| {
                debug!("Cannot encode {}, {}", self.name(), reason);
                EncodingError(reason)
            })?;
        writer
            .finish()
            .map_err(|status| EncodingError(Reason::primitive(self.name(), status)))?;
        process_encode_io_result(stream.write_all(&buffer).map(|_| buffer.len()))
            .map_err(|status| EncodingError(Reason::primitive(self.name(), status)))
    }

    /// Decodes the binary body of an extension object as a value of this type.
    pub fn decode_extension_object(
        &self,
        extension_object: &ExtensionObject,
        resolver: &dyn TypeResolver,
        decoding_options: &DecodingOptions,
    ) -> Result<StructuredValue, DecodingError> {
        match extension_object.binary_body() {
            Some(body) => {
                let mut stream = Cursor::new(body);
                self.decode(&mut stream, resolver, decoding_options)
            }
            None => {
                error!(
                    "Extension object {} has no binary body to decode as {}",
                    extension_object.node_id,
                    self.name()
                );
                Err(DecodingError(Reason::primitive(
                    self.name(),
                    StatusCode::BadDataEncodingUnsupported,
                )))
            }
        }
    }

    /// Encodes the value into the binary body of an extension object with the supplied
    /// encoding id.
    pub fn encode_extension_object<N>(
        &self,
        value: &StructuredValue,
        encoding_id: N,
        resolver: &dyn TypeResolver,
    ) -> Result<ExtensionObject, EncodingError>
    where
        N: Into<NodeId>,
    {
        let mut stream = Cursor::new(Vec::new());
        self.encode(&mut stream, value, resolver)?;
        Ok(ExtensionObject::from_bytes(encoding_id, stream.into_inner()))
    }

    /// Evaluates a field's switch against the switch field's value. A switch field that was
    /// itself absent counts as 0.
    fn switched_on(&self, switch: &Switch, switch_value: Option<&Value>) -> Result<bool, Reason> {
        let actual = match switch_value {
            None => 0,
            Some(value) => value.to_i64().ok_or_else(|| {
                Reason::invalid_value(
                    &self.descriptor.fields[switch.field].name,
                    format!("switch value {} is not an integer", value),
                )
            })?,
        };
        Ok(switch.operand.compare(actual, switch.value))
    }

    pub(crate) fn decode_fields(
        &self,
        reader: &mut BitReader,
        resolver: &dyn TypeResolver,
        decoding_options: &DecodingOptions,
    ) -> Result<StructuredValue, Reason> {
        let _depth_lock = decoding_options
            .depth_lock()
            .map_err(|_| Reason::DepthExceeded)?;

        let mut values: Vec<Option<Value>> = vec![None; self.fields.len()];
        for (idx, (descriptor, field)) in self.descriptor.fields.iter().zip(&self.fields).enumerate() {
            let name = descriptor.name.as_str();
            if let Some(switch) = &field.switch {
                if !self.switched_on(switch, values[switch.field].as_ref())? {
                    trace!("{}.{} is switched off", self.name(), name);
                    continue;
                }
            }
            field.check_length_in_bytes(descriptor)?;

            let value = match field.length {
                Length::Fixed(count) if field.is_bits() => {
                    let bits = reader
                        .read_bits(count as usize)
                        .map_err(|status| Reason::primitive(name, status))?;
                    Value::Bits(bits)
                }
                Length::Scalar => {
                    let element = ElementType::resolve(&field.field_type, resolver)?;
                    decode_element(name, &element, reader, resolver, decoding_options)?
                }
                Length::Fixed(count) => {
                    let count = count as usize;
                    if count > decoding_options.max_array_length {
                        error!(
                            "{}.{} fixed array length {} exceeds decoding limit {}",
                            self.name(),
                            name,
                            count,
                            decoding_options.max_array_length
                        );
                        return Err(Reason::LimitExceeded {
                            field: name.to_string(),
                            length: count,
                            limit: decoding_options.max_array_length,
                        });
                    }
                    let element = ElementType::resolve(&field.field_type, resolver)?;
                    let mut elements = Vec::with_capacity(count);
                    for _ in 0..count {
                        elements.push(decode_element(
                            name,
                            &element,
                            reader,
                            resolver,
                            decoding_options,
                        )?);
                    }
                    Value::Array(elements)
                }
                Length::Field(length_field) => {
                    let count = match values[length_field].as_ref() {
                        None => 0,
                        Some(length) => length.as_i128().unwrap_or(0).max(0),
                    };
                    if count > decoding_options.max_array_length as i128 {
                        error!(
                            "{}.{} array length {} exceeds decoding limit {}",
                            self.name(),
                            name,
                            count,
                            decoding_options.max_array_length
                        );
                        return Err(Reason::LimitExceeded {
                            field: name.to_string(),
                            length: usize::try_from(count).unwrap_or(usize::MAX),
                            limit: decoding_options.max_array_length,
                        });
                    }
                    let element = ElementType::resolve(&field.field_type, resolver)?;
                    let mut elements = Vec::with_capacity(count as usize);
                    for _ in 0..count {
                        elements.push(decode_element(
                            name,
                            &element,
                            reader,
                            resolver,
                            decoding_options,
                        )?);
                    }
                    Value::Array(elements)
                }
            };
            values[idx] = Some(value);
        }

        let mut result = StructuredValue::new(self.name());
        for ((descriptor, field), value) in self.descriptor.fields.iter().zip(&self.fields).zip(values) {
            if field.is_length_field() {
                continue;
            }
            if let Some(value) = value {
                result.insert(descriptor.name.as_str(), value);
            }
        }
        Ok(result)
    }

    /// Works out the value of every present length field from the arrays it describes. Arrays
    /// that share a length field must have the same length, absent arrays are not counted.
    fn derive_lengths(
        &self,
        working: &mut [Option<Cow<Value>>],
        present: &[bool],
    ) -> Result<(), Reason> {
        for (idx, (descriptor, field)) in self.descriptor.fields.iter().zip(&self.fields).enumerate() {
            if !field.is_length_field() || !present[idx] {
                continue;
            }
            let mut length: Option<usize> = None;
            for &owner in &field.owners {
                let owner_name = &self.descriptor.fields[owner].name;
                let owner_length = match working[owner].as_deref() {
                    Some(value) if present[owner] => value.array_len().ok_or_else(|| {
                        Reason::invalid_value(owner_name, format!("{} is not an array", value))
                    })?,
                    _ => continue,
                };
                match length {
                    Some(length) if length != owner_length => {
                        return Err(Reason::invalid_value(
                            &descriptor.name,
                            format!(
                                "arrays sharing this length field have lengths {} and {}",
                                length, owner_length
                            ),
                        ));
                    }
                    _ => length = Some(owner_length),
                }
            }
            let length = length.unwrap_or(0);
            if working[idx].is_some() {
                trace!(
                    "{}.{} is derived, the supplied value is replaced by {}",
                    self.name(),
                    descriptor.name,
                    length
                );
            }
            working[idx] = Some(Cow::Owned(Value::Int64(length as i64)));
        }
        Ok(())
    }

    /// Evaluates the switches in wire order. A switched off field is cleared from the working
    /// values, so it counts as absent for the switches and length fields that refer to it.
    fn presence(&self, working: &mut [Option<Cow<Value>>]) -> Result<Vec<bool>, Reason> {
        let mut present = vec![true; self.fields.len()];
        for (idx, (descriptor, field)) in self.descriptor.fields.iter().zip(&self.fields).enumerate() {
            if let Some(switch) = &field.switch {
                if !self.switched_on(switch, working[switch.field].as_deref())? {
                    trace!("{}.{} is switched off", self.name(), descriptor.name);
                    present[idx] = false;
                    working[idx] = None;
                }
            }
        }
        Ok(present)
    }

    /// The members that go on the wire. Switched off members are dropped whatever the value
    /// holds for them, and length fields count only the arrays that are present.
    fn encoding_members<'v>(
        &self,
        value: &'v StructuredValue,
    ) -> Result<(Vec<Option<Cow<'v, Value>>>, Vec<bool>), Reason> {
        let mut working: Vec<Option<Cow<Value>>> = self
            .descriptor
            .fields
            .iter()
            .map(|f| value.get(&f.name).map(Cow::Borrowed))
            .collect();
        // Switches may test a length field, so lengths are derived from the supplied arrays
        // first and again once the switched off arrays are known.
        self.derive_lengths(&mut working, &vec![true; self.fields.len()])?;
        let present = self.presence(&mut working)?;
        self.derive_lengths(&mut working, &present)?;

        for (idx, (descriptor, field)) in self.descriptor.fields.iter().zip(&self.fields).enumerate() {
            if let Some(switch) = &field.switch {
                if self.fields[switch.field].is_length_field()
                    && self.switched_on(switch, working[switch.field].as_deref())? != present[idx]
                {
                    return Err(Reason::invalid_value(
                        &descriptor.name,
                        format!(
                            "switch on '{}' disagrees with the arrays it counts",
                            self.descriptor.fields[switch.field].name
                        ),
                    ));
                }
            }
        }
        Ok((working, present))
    }

    pub(crate) fn encode_fields(
        &self,
        writer: &mut BitWriter,
        value: &StructuredValue,
        resolver: &dyn TypeResolver,
    ) -> Result<(), Reason> {
        let (working, present) = self.encoding_members(value)?;

        for (idx, (descriptor, field)) in self.descriptor.fields.iter().zip(&self.fields).enumerate() {
            let name = descriptor.name.as_str();
            if !present[idx] {
                continue;
            }
            field.check_length_in_bytes(descriptor)?;
            let member = working[idx]
                .as_deref()
                .ok_or_else(|| Reason::invalid_value(name, "missing from the value"))?;

            match field.length {
                Length::Fixed(count) if field.is_bits() => {
                    let bits = bits_value(name, member, count)?;
                    writer
                        .write_bits(bits, count as usize)
                        .map_err(|status| Reason::primitive(name, status))?;
                }
                Length::Scalar => {
                    let element = ElementType::resolve(&field.field_type, resolver)?;
                    encode_element(name, &element, writer, member, resolver)?;
                }
                Length::Fixed(_) | Length::Field(_) => {
                    let elements = member.as_array().ok_or_else(|| {
                        Reason::invalid_value(name, format!("{} is not an array", member))
                    })?;
                    if let Length::Fixed(count) = field.length {
                        if elements.len() != count as usize {
                            return Err(Reason::invalid_value(
                                name,
                                format!(
                                    "array has {} elements, the type requires {}",
                                    elements.len(),
                                    count
                                ),
                            ));
                        }
                    }
                    let element = ElementType::resolve(&field.field_type, resolver)?;
                    for e in elements {
                        encode_element(name, &element, writer, e, resolver)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn decode_element(
    name: &str,
    element: &ElementType,
    reader: &mut BitReader,
    resolver: &dyn TypeResolver,
    decoding_options: &DecodingOptions,
) -> Result<Value, Reason> {
    match element {
        ElementType::Primitive(kind) => kind.decode(name, reader, decoding_options),
        ElementType::Structured(codec) => {
            let mut nested = BitReader::new(reader);
            Ok(Value::Structure(codec.decode_fields(
                &mut nested,
                resolver,
                decoding_options,
            )?))
        }
        ElementType::Enumerated(type_ref, enumerated) => {
            let value = read_i32(reader).map_err(|status| Reason::primitive(name, status))?;
            if enumerated.name_of(value).is_none() {
                trace!("{} is not a declared value of {}", value, enumerated.name);
            }
            Ok(Value::Enumeration(EnumValue {
                type_ref: (*type_ref).clone(),
                value,
            }))
        }
    }
}

fn encode_element(
    name: &str,
    element: &ElementType,
    writer: &mut BitWriter,
    value: &Value,
    resolver: &dyn TypeResolver,
) -> Result<(), Reason> {
    match element {
        ElementType::Primitive(kind) => kind.encode(name, writer, value),
        ElementType::Structured(codec) => {
            let value = value.as_structure().ok_or_else(|| {
                Reason::invalid_value(
                    name,
                    format!("{} is not a structure of type {}", value, codec.name()),
                )
            })?;
            let mut nested = BitWriter::new(writer);
            codec.encode_fields(&mut nested, value, resolver)?;
            nested
                .finish()
                .map(|_| ())
                .map_err(|status| Reason::primitive(name, status))
        }
        ElementType::Enumerated(_, enumerated) => {
            let v = value
                .as_i128()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| {
                    Reason::invalid_value(
                        name,
                        format!("{} is not a value of {}", value, enumerated.name),
                    )
                })?;
            write_i32(writer, v)
                .map(|_| ())
                .map_err(|status| Reason::primitive(name, status))
        }
    }
}

/// The integer value of a bit field, which must fit in `count` bits.
fn bits_value(name: &str, value: &Value, count: u32) -> Result<u64, Reason> {
    let v = value
        .as_i128()
        .ok_or_else(|| Reason::invalid_value(name, format!("{} is not an integer", value)))?;
    if v < 0 || v >= 1i128 << count {
        Err(Reason::invalid_value(
            name,
            format!("{} does not fit in {} bits", v, count),
        ))
    } else {
        Ok(v as u64)
    }
}
