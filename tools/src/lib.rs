//! Introspection and debugging tools for the soa columnar codec.
//!
//! This crate provides utilities for inspecting and understanding encoded packets:
//!
//! - Decode packets into JSON or a readable listing
//! - Explain packet size by component
//! - Encode entity state described in JSON, for fixtures and experiments
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use codec::{
    inspect_packet, ColumnarSerializer, DecodeLimits, RecordView, SerializerOptions, Storage,
    Value,
};
use schema::{ScalarType, Schema, TypeDesc};
use serde::{Deserialize, Serialize};

/// Parses and validates a schema from its JSON form.
pub fn parse_schema(json: &str) -> Result<Schema> {
    let schema: Schema = serde_json::from_str(json).context("parse schema json")?;
    schema
        .validate()
        .map_err(|err| anyhow!("schema validation failed: {err}"))?;
    Ok(schema)
}

/// Reads a schema JSON file.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read schema {}", path.display()))?;
    parse_schema(&contents)
}

const fn mode_name(diff: bool) -> &'static str {
    if diff {
        "diff"
    } else {
        "full"
    }
}

/// Per-component share of a packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    pub id: usize,
    pub name: String,
    pub records: usize,
    pub bytes: usize,
    /// Field values carried, summed over records.
    pub fields: usize,
}

/// Size breakdown of a packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub mode: &'static str,
    pub packet_bytes: usize,
    pub records: usize,
    pub entities: usize,
    pub components: Vec<ComponentSummary>,
}

/// Walks `bytes` and summarizes it by component.
pub fn inspect_report(
    bytes: &[u8],
    schema: &Schema,
    diff: bool,
    limits: &DecodeLimits,
) -> Result<InspectReport> {
    let views = inspect_packet(schema, bytes, diff, limits).context("inspect packet")?;
    let mut components: Vec<ComponentSummary> = schema
        .components
        .iter()
        .enumerate()
        .map(|(id, component)| ComponentSummary {
            id,
            name: component.name.clone(),
            records: 0,
            bytes: 0,
            fields: 0,
        })
        .collect();
    let mut entities: Vec<u32> = Vec::with_capacity(views.len());
    for view in &views {
        if let Some(summary) = components.get_mut(view.component) {
            summary.records += 1;
            summary.bytes += view.len;
            summary.fields += view.fields.len();
        }
        entities.push(view.index);
    }
    entities.sort_unstable();
    entities.dedup();
    components.retain(|summary| summary.records > 0);

    Ok(InspectReport {
        mode: mode_name(diff),
        packet_bytes: bytes.len(),
        records: views.len(),
        entities: entities.len(),
        components,
    })
}

/// Renders an inspect report as indented text.
pub fn format_inspect_report(report: &InspectReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "mode: {} packet: {} bytes records: {} entities: {}",
        report.mode, report.packet_bytes, report.records, report.entities
    );
    out.push_str("components:");
    for summary in &report.components {
        let _ = write!(
            out,
            "\n  [{}] {}: {} records, {} fields ({} bytes)",
            summary.id, summary.name, summary.records, summary.fields, summary.bytes
        );
    }
    out
}

/// A decoded record in JSON-friendly form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedRecord {
    pub offset: usize,
    pub index: u32,
    pub component: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Every record of a packet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeOutput {
    pub mode: &'static str,
    pub records: Vec<DecodedRecord>,
}

/// Decodes `bytes` into structured JSON records.
pub fn decode_packet_json(
    bytes: &[u8],
    schema: &Schema,
    diff: bool,
    limits: &DecodeLimits,
) -> Result<DecodeOutput> {
    let views = inspect_packet(schema, bytes, diff, limits).context("decode packet")?;
    Ok(DecodeOutput {
        mode: mode_name(diff),
        records: views.into_iter().map(record_json).collect(),
    })
}

fn record_json(view: RecordView) -> DecodedRecord {
    let fields = view
        .fields
        .iter()
        .map(|(name, value)| (name.clone(), value_to_json(value)))
        .collect();
    DecodedRecord {
        offset: view.offset,
        index: view.index,
        component: view.component_name,
        fields,
    }
}

/// Renders decoded records one per line.
pub fn format_decode_pretty(output: &DecodeOutput) -> String {
    let mut out = String::new();
    let _ = write!(out, "mode: {} records: {}", output.mode, output.records.len());
    for record in &output.records {
        let _ = write!(
            out,
            "\n  @{:<6} entity {} {}",
            record.offset, record.index, record.component
        );
        for (name, value) in &record.fields {
            let _ = write!(out, " {name}={value}");
        }
    }
    out
}

/// Converts a codec value to JSON. Non-finite floats become `null`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::U8(v) => (*v).into(),
        Value::I8(v) => (*v).into(),
        Value::U16(v) => (*v).into(),
        Value::I16(v) => (*v).into(),
        Value::U32(v) | Value::Ref(v) => (*v).into(),
        Value::I32(v) => (*v).into(),
        Value::F32(v) => serde_json::Number::from_f64(f64::from(*v))
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::F64(v) => serde_json::Number::from_f64(*v)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => items.iter().map(value_to_json).collect(),
    }
}

/// Converts JSON to a codec value of type `ty`.
pub fn json_to_value(json: &serde_json::Value, ty: &TypeDesc) -> Result<Value> {
    match ty {
        TypeDesc::ArrayOf(element) => {
            let items = json
                .as_array()
                .ok_or_else(|| anyhow!("expected array, found {json}"))?;
            items
                .iter()
                .map(|item| json_to_value(item, element))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        TypeDesc::Scalar(tag) => scalar_from_json(json, *tag),
    }
}

fn scalar_from_json(json: &serde_json::Value, tag: ScalarType) -> Result<Value> {
    let value = match tag {
        ScalarType::U8 => Value::U8(unsigned(json, tag)?),
        ScalarType::U16 => Value::U16(unsigned(json, tag)?),
        ScalarType::U32 => Value::U32(unsigned(json, tag)?),
        ScalarType::Ref => Value::Ref(unsigned(json, tag)?),
        ScalarType::I8 => Value::I8(signed(json, tag)?),
        ScalarType::I16 => Value::I16(signed(json, tag)?),
        ScalarType::I32 => Value::I32(signed(json, tag)?),
        ScalarType::F32 => Value::F32(float(json, tag)? as f32),
        ScalarType::F64 => Value::F64(float(json, tag)?),
        ScalarType::Str => Value::Str(
            json.as_str()
                .ok_or_else(|| anyhow!("expected str, found {json}"))?
                .to_owned(),
        ),
    };
    Ok(value)
}

fn unsigned<T: TryFrom<u64>>(json: &serde_json::Value, tag: ScalarType) -> Result<T> {
    json.as_u64()
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| anyhow!("expected {tag}, found {json}"))
}

fn signed<T: TryFrom<i64>>(json: &serde_json::Value, tag: ScalarType) -> Result<T> {
    json.as_i64()
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| anyhow!("expected {tag}, found {json}"))
}

fn float(json: &serde_json::Value, tag: ScalarType) -> Result<f64> {
    json.as_f64()
        .ok_or_else(|| anyhow!("expected {tag}, found {json}"))
}

/// State of one entity, keyed by column path (`"Position.x"`, `"Health"`).
///
/// A `null` value clears an array column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityState {
    pub index: u32,
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// Builds storage from `entities` and serializes them in listed order.
///
/// A diff packet here is diffed against neutral values, so neutral cells are
/// omitted.
pub fn encode_entities(
    schema: &Schema,
    entities: &[EntityState],
    diff: bool,
    options: SerializerOptions,
) -> Result<Vec<u8>> {
    let mut storage = Storage::new(schema);
    for entity in entities {
        for (path, json) in &entity.values {
            let column = storage.column_mut(path)?;
            if json.is_null() {
                if column.ty().element().is_none() {
                    bail!("{path}[{}]: null is only valid for arrays", entity.index);
                }
                column.clear(entity.index);
                continue;
            }
            let value = json_to_value(json, column.ty())
                .with_context(|| format!("{path}[{}]", entity.index))?;
            column.set(entity.index, value)?;
        }
    }

    let indices: Vec<u32> = entities.iter().map(|entity| entity.index).collect();
    let mut serializer = ColumnarSerializer::new(schema, options.with_diff(diff))?;
    Ok(serializer.serialize(&storage, &indices)?.to_vec())
}
