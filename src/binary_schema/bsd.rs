// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2024 Adam Lock

//! Loads OPC UA binary schema documents, `opc:TypeDictionary` XML, into a [`TypeDictionary`].

use std::{fs, path::Path, str::FromStr};

use roxmltree::{Document, Node};

use super::{
    error::SchemaError,
    model::{
        EnumeratedTypeDescriptor, FieldDescriptor, StructuredTypeDescriptor, SwitchOperand,
        TypeRef, BINARY_SCHEMA_NAMESPACE,
    },
    resolver::TypeDictionary,
};

/// Reads and parses the binary schema file at the path.
pub fn load_from_file<P>(path: P) -> Result<TypeDictionary, SchemaError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    debug!("Loading binary schema from {}", path.display());
    let xml = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_xml(&xml)
}

/// Parses a binary schema document.
pub fn parse_xml(xml: &str) -> Result<TypeDictionary, SchemaError> {
    let document = Document::parse(xml)?;
    let root = document.root_element();
    if !is_schema_element(&root, "TypeDictionary") {
        return Err(SchemaError::NotATypeDictionary);
    }
    let target_namespace = required_attribute(&root, "TargetNamespace")?;
    let mut dictionary = TypeDictionary::new(target_namespace);

    for node in root.children().filter(|n| n.is_element()) {
        match (node.tag_name().namespace(), node.tag_name().name()) {
            (Some(BINARY_SCHEMA_NAMESPACE), "StructuredType") => {
                let descriptor = parse_structured_type(&node, target_namespace)?;
                trace!(
                    "Structured type {} has {} fields",
                    descriptor.name,
                    descriptor.fields.len()
                );
                dictionary.add_structured(descriptor)?;
            }
            (Some(BINARY_SCHEMA_NAMESPACE), "EnumeratedType") => {
                let descriptor = parse_enumerated_type(&node)?;
                dictionary.add_enumerated(descriptor);
            }
            (_, name) => {
                debug!(
                    "Skipping <{}> {}",
                    name,
                    node.attribute("Name").unwrap_or_default()
                );
            }
        }
    }

    info!(
        "Loaded {} types for namespace {}",
        dictionary.len(),
        dictionary.namespace_uri()
    );
    Ok(dictionary)
}

fn is_schema_element(node: &Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(BINARY_SCHEMA_NAMESPACE)
        && node.tag_name().name() == name
}

fn required_attribute<'a>(node: &Node<'a, '_>, attribute: &str) -> Result<&'a str, SchemaError> {
    node.attribute(attribute)
        .ok_or_else(|| SchemaError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

/// Parses an optional attribute with `FromStr`
fn parsed_attribute<T>(node: &Node, attribute: &str) -> Result<Option<T>, SchemaError>
where
    T: FromStr,
{
    match node.attribute(attribute) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| SchemaError::InvalidAttribute {
                element: node.tag_name().name().to_string(),
                attribute: attribute.to_string(),
                value: value.to_string(),
            }),
    }
}

/// Resolves a `prefix:Name` type name through the namespace declarations in scope. A name
/// without a prefix is in the default namespace or, failing that, the target namespace.
fn type_ref(node: &Node, type_name: &str, target_namespace: &str) -> Result<TypeRef, SchemaError> {
    match type_name.split_once(':') {
        Some((prefix, name)) => {
            let namespace_uri = node.lookup_namespace_uri(Some(prefix)).ok_or_else(|| {
                SchemaError::UnknownPrefix {
                    type_name: type_name.to_string(),
                }
            })?;
            Ok(TypeRef::new(namespace_uri, name))
        }
        None => {
            let namespace_uri = node
                .lookup_namespace_uri(None)
                .unwrap_or(target_namespace);
            Ok(TypeRef::new(namespace_uri, type_name))
        }
    }
}

fn parse_structured_type(
    node: &Node,
    target_namespace: &str,
) -> Result<StructuredTypeDescriptor, SchemaError> {
    let type_name = required_attribute(node, "Name")?;
    let mut descriptor = StructuredTypeDescriptor::new(type_name);
    for field in node.children().filter(|n| is_schema_element(n, "Field")) {
        descriptor
            .fields
            .push(parse_field(&field, type_name, target_namespace)?);
    }
    Ok(descriptor)
}

fn parse_field(
    node: &Node,
    type_name: &str,
    target_namespace: &str,
) -> Result<FieldDescriptor, SchemaError> {
    let name = required_attribute(node, "Name")?;
    let field_type = type_ref(node, required_attribute(node, "TypeName")?, target_namespace)?;
    let mut field = FieldDescriptor::new(name, field_type);
    field.length = parsed_attribute(node, "Length")?;
    field.length_field = node.attribute("LengthField").map(|v| v.to_string());
    field.switch_field = node.attribute("SwitchField").map(|v| v.to_string());
    field.switch_value = parsed_attribute(node, "SwitchValue")?;
    field.switch_operand = match node.attribute("SwitchOperand") {
        Some(operand) => Some(SwitchOperand::from_str(operand).map_err(|_| {
            SchemaError::UnknownSwitchOperand {
                type_name: type_name.to_string(),
                field: name.to_string(),
                operand: operand.to_string(),
            }
        })?),
        None => None,
    };
    field.is_length_in_bytes = parsed_attribute(node, "IsLengthInBytes")?.unwrap_or(false);
    Ok(field)
}

fn parse_enumerated_type(node: &Node) -> Result<EnumeratedTypeDescriptor, SchemaError> {
    let mut descriptor = EnumeratedTypeDescriptor::new(required_attribute(node, "Name")?);
    if let Some(length_in_bits) = parsed_attribute(node, "LengthInBits")? {
        descriptor.length_in_bits = length_in_bits;
    }
    for value in node
        .children()
        .filter(|n| is_schema_element(n, "EnumeratedValue"))
    {
        let name = required_attribute(&value, "Name")?;
        let v = parsed_attribute(&value, "Value")?.ok_or_else(|| {
            SchemaError::MissingAttribute {
                element: "EnumeratedValue".to_string(),
                attribute: "Value".to_string(),
            }
        })?;
        descriptor = descriptor.value(name, v);
    }
    Ok(descriptor)
}
