//! Filter evaluation against single documents.
//!
//! Operands arriving from query strings are strings; they are cast to the
//! type of the stored value before comparing, the way a schema-aware driver
//! would. A value that cannot be cast is a `StoreError::Cast`.

use std::cmp::Ordering;

use query_core::Filter;
use serde_json::{Number, Value};

use crate::error::{Result, StoreError};
use crate::geo::{central_angle, parse_center_sphere, point_coordinates};
use crate::path::get_path;
use crate::sorting::compare_values;
use crate::Document;

const RANGE_OPS: [&str; 4] = ["$gt", "$gte", "$lt", "$lte"];

/// Reject filters that can never execute, independent of the data.
pub fn validate(filter: &Filter) -> Result<()> {
    for (field, cond) in filter.iter() {
        if field.starts_with('$') {
            return Err(StoreError::UnknownOperator {
                field: field.clone(),
                op: field.clone(),
            });
        }
        let Value::Object(map) = cond else {
            continue;
        };
        let op_count = map.keys().filter(|k| k.starts_with('$')).count();
        if op_count == 0 {
            continue;
        }
        if op_count != map.len() {
            return Err(StoreError::invalid_filter(
                field,
                "operators cannot be mixed with plain keys",
            ));
        }
        for (op, operand) in map {
            match op.as_str() {
                "$eq" => {}
                op if RANGE_OPS.contains(&op) => {
                    if operand.is_object() || operand.is_array() {
                        return Err(StoreError::invalid_filter(
                            field,
                            format!("{op} expects a single value"),
                        ));
                    }
                }
                "$in" => {
                    if operand.is_object() {
                        return Err(StoreError::invalid_filter(field, "$in expects a list"));
                    }
                }
                "$geoWithin" => {
                    let sphere = operand
                        .as_object()
                        .and_then(|m| m.get("$centerSphere"))
                        .and_then(parse_center_sphere);
                    if sphere.is_none() {
                        return Err(StoreError::invalid_filter(
                            field,
                            "$geoWithin expects { $centerSphere: [[lng, lat], radians] }",
                        ));
                    }
                }
                other => {
                    return Err(StoreError::UnknownOperator {
                        field: field.clone(),
                        op: other.to_string(),
                    })
                }
            }
        }
    }
    Ok(())
}

/// True when `doc` satisfies every entry of `filter`.
pub fn matches(doc: &Document, filter: &Filter) -> Result<bool> {
    for (field, cond) in filter.iter() {
        if !matches_field(doc, field, cond)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn is_operator_object(v: &Value) -> bool {
    matches!(v, Value::Object(map) if map.keys().any(|k| k.starts_with('$')))
}

fn matches_field(doc: &Document, field: &str, cond: &Value) -> Result<bool> {
    let stored = get_path(doc, field);
    if !is_operator_object(cond) {
        return equals(field, stored, cond);
    }
    let Value::Object(ops) = cond else {
        return Ok(false);
    };
    for (op, operand) in ops {
        let ok = match op.as_str() {
            "$eq" => equals(field, stored, operand)?,
            "$gt" => compare(field, stored, operand, |o| o == Ordering::Greater)?,
            "$gte" => compare(field, stored, operand, |o| o != Ordering::Less)?,
            "$lt" => compare(field, stored, operand, |o| o == Ordering::Less)?,
            "$lte" => compare(field, stored, operand, |o| o != Ordering::Greater)?,
            "$in" => in_list(field, stored, operand)?,
            "$geoWithin" => geo_within(field, stored, operand)?,
            other => {
                return Err(StoreError::UnknownOperator {
                    field: field.to_string(),
                    op: other.to_string(),
                })
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Cast `query` to the JSON type of `target`.
pub fn cast_like(field: &str, target: &Value, query: &Value) -> Result<Value> {
    Ok(match (target, query) {
        (Value::Number(_), Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| StoreError::cast(field, query, "Number"))?,
        (Value::Number(_), Value::Bool(b)) => Value::from(u8::from(*b)),
        (Value::Bool(_), Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Value::Bool(true),
            "false" | "0" | "no" => Value::Bool(false),
            _ => return Err(StoreError::cast(field, query, "Boolean")),
        },
        (Value::Bool(_), Value::Number(n)) => match n.as_f64() {
            Some(x) if x == 1.0 => Value::Bool(true),
            Some(x) if x == 0.0 => Value::Bool(false),
            _ => return Err(StoreError::cast(field, query, "Boolean")),
        },
        (Value::String(_), Value::Number(_) | Value::Bool(_)) => Value::String(query.to_string()),
        _ => query.clone(),
    })
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn scalar_equals(field: &str, stored: &Value, query: &Value) -> Result<bool> {
    let cast = cast_like(field, stored, query)?;
    Ok(values_equal(stored, &cast))
}

fn equals(field: &str, stored: Option<&Value>, query: &Value) -> Result<bool> {
    match stored {
        None | Some(Value::Null) => Ok(query.is_null()),
        Some(Value::Array(items)) => {
            if query.is_array() && values_equal(&Value::Array(items.clone()), query) {
                return Ok(true);
            }
            for item in items {
                if scalar_equals(field, item, query)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Some(v) => scalar_equals(field, v, query),
    }
}

fn compare(
    field: &str,
    stored: Option<&Value>,
    operand: &Value,
    accept: impl Fn(Ordering) -> bool + Copy,
) -> Result<bool> {
    match stored {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Array(items)) => {
            for item in items {
                if compare(field, Some(item), operand, accept)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Some(v) => {
            let cast = cast_like(field, v, operand)?;
            if std::mem::discriminant(v) != std::mem::discriminant(&cast) {
                return Ok(false);
            }
            Ok(accept(compare_values(Some(v), Some(&cast))))
        }
    }
}

fn in_list(field: &str, stored: Option<&Value>, operand: &Value) -> Result<bool> {
    let candidates: &[Value] = match operand {
        Value::Array(items) => items,
        single => std::slice::from_ref(single),
    };
    for candidate in candidates {
        if equals(field, stored, candidate)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn geo_within(field: &str, stored: Option<&Value>, operand: &Value) -> Result<bool> {
    let (center, radius) = operand
        .as_object()
        .and_then(|m| m.get("$centerSphere"))
        .and_then(parse_center_sphere)
        .ok_or_else(|| StoreError::invalid_filter(field, "malformed $geoWithin"))?;
    Ok(stored
        .and_then(point_coordinates)
        .is_some_and(|p| central_angle(center, p) <= radius))
}
