//! Custom values attached to generated documents.
//!
//! Some formats (`fabric.mod.json`'s `custom` block, NeoForge's `modproperties` and
//! free-form tables) accept arbitrary data. A [`CustomValue`] carries such data from
//! configuration time to serialization time without requiring the configured value
//! to be directly serializable: a *complex* custom value pairs any value with a
//! mapper producing the serializable shape.
//!
//! A value may also carry a [`TypeHint`]. When present, the resolved node is checked
//! against it, so a value declared as "list of tables" cannot silently turn into a
//! scalar. Without a hint the runtime shape of the resolved node is used as-is.
//!
//! ```rust
//! use resource_factory_api::custom::{simple_custom_value_list, CustomValues};
//!
//! let mut custom = CustomValues::default();
//! custom.insert("k", simple_custom_value_list(vec!["a", "b"]));
//!
//! let resolved = custom.resolve().unwrap().unwrap();
//! assert_eq!(resolved["k"], serde_json::json!(["a", "b"]));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{FactoryResult, SerializationError};

/// Describes the expected shape of a resolved custom value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHint {
    Any,
    String,
    Integer,
    Float,
    Boolean,
    /// A record/object with arbitrary fields.
    Table,
    List(Box<TypeHint>),
    /// A string-keyed map with homogeneous values.
    Map(Box<TypeHint>),
}

impl TypeHint {
    pub fn list_of(element: TypeHint) -> Self {
        Self::List(Box::new(element))
    }

    pub fn map_of(value: TypeHint) -> Self {
        Self::Map(Box::new(value))
    }

    /// Check `value` against this hint. On mismatch, returns the runtime shape found.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        let ok = match (self, value) {
            (Self::Any, _) => true,
            (Self::String, Value::String(_)) => true,
            (Self::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Float, Value::Number(_)) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Table, Value::Object(_)) => true,
            (Self::List(element), Value::Array(items)) => {
                for item in items {
                    element.check(item)?;
                }
                true
            }
            (Self::Map(inner), Value::Object(entries)) => {
                for entry in entries.values() {
                    inner.check(entry)?;
                }
                true
            }
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(Self::shape_of(value))
        }
    }

    /// A short description of a node's runtime shape.
    pub fn shape_of(value: &Value) -> String {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_f64() => "float",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "list",
            Value::Object(_) => "table",
        }
        .to_string()
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("boolean"),
            Self::Table => f.write_str("table"),
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Map(value) => write!(f, "map<string, {value}>"),
        }
    }
}

/// Types whose [`TypeHint`] can be inferred statically.
pub trait TypeHinted {
    fn type_hint() -> TypeHint;
}

macro_rules! hinted {
    ($hint:expr => $($ty:ty),+) => {
        $(impl TypeHinted for $ty {
            fn type_hint() -> TypeHint {
                $hint
            }
        })+
    };
}

hinted!(TypeHint::String => String, &str);
hinted!(TypeHint::Boolean => bool);
hinted!(TypeHint::Integer => i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);
hinted!(TypeHint::Float => f32, f64);
hinted!(TypeHint::Any => Value);

impl<T: TypeHinted> TypeHinted for Vec<T> {
    fn type_hint() -> TypeHint {
        TypeHint::list_of(T::type_hint())
    }
}

impl<T: TypeHinted> TypeHinted for BTreeMap<String, T> {
    fn type_hint() -> TypeHint {
        TypeHint::map_of(T::type_hint())
    }
}

impl<T: TypeHinted> TypeHinted for HashMap<String, T> {
    fn type_hint() -> TypeHint {
        TypeHint::map_of(T::type_hint())
    }
}

type Resolver = dyn Fn() -> Result<Value, serde_json::Error> + Send + Sync;

/// A value to embed in a generated document, resolved lazily at generation time.
#[derive(Clone)]
pub struct CustomValue {
    type_hint: Option<TypeHint>,
    complex: bool,
    resolver: Arc<Resolver>,
}

impl CustomValue {
    pub fn type_hint(&self) -> Option<&TypeHint> {
        self.type_hint.as_ref()
    }

    /// Short description used in factory listings, e.g. `simple(list<string>)`.
    pub fn describe(&self) -> String {
        let kind = if self.complex { "complex" } else { "simple" };
        match &self.type_hint {
            Some(hint) => format!("{kind}({hint})"),
            None => kind.to_string(),
        }
    }

    /// Produce the serializable node, applying the mapper for complex values.
    pub fn resolve(&self) -> Result<Value, serde_json::Error> {
        (self.resolver)()
    }

    /// Resolve and check the result against the type hint, if any.
    pub fn resolve_checked(&self, key: &str) -> FactoryResult<Value> {
        let value = self.resolve()?;
        if let Some(hint) = &self.type_hint {
            hint.check(&value)
                .map_err(|found| SerializationError::UnmappableCustomValue {
                    key: key.to_string(),
                    expected: hint.to_string(),
                    found,
                })?;
        }
        Ok(value)
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValue")
            .field("complex", &self.complex)
            .field("type_hint", &self.type_hint)
            .finish()
    }
}

/// Values in a build description are plain data, so they become simple custom values.
impl<'de> Deserialize<'de> for CustomValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(simple_custom_value)
    }
}

/// A simple value that is already serializable.
pub fn simple_custom_value<T>(value: T) -> CustomValue
where
    T: Serialize + Send + Sync + 'static,
{
    typed_simple_custom_value(None, value)
}

/// A simple value with an explicit type hint.
pub fn typed_simple_custom_value<T>(type_hint: Option<TypeHint>, value: T) -> CustomValue
where
    T: Serialize + Send + Sync + 'static,
{
    CustomValue {
        type_hint,
        complex: false,
        resolver: Arc::new(move || serde_json::to_value(&value)),
    }
}

/// A complex value and a mapper extracting its serializable form.
pub fn complex_custom_value<V, S, F>(value: V, mapper: F) -> CustomValue
where
    V: Send + Sync + 'static,
    S: Serialize,
    F: Fn(&V) -> S + Send + Sync + 'static,
{
    typed_complex_custom_value(None, value, mapper)
}

/// A complex value with an explicit type hint for the mapped form.
pub fn typed_complex_custom_value<V, S, F>(
    type_hint: Option<TypeHint>,
    value: V,
    mapper: F,
) -> CustomValue
where
    V: Send + Sync + 'static,
    S: Serialize,
    F: Fn(&V) -> S + Send + Sync + 'static,
{
    CustomValue {
        type_hint,
        complex: true,
        resolver: Arc::new(move || serde_json::to_value(mapper(&value))),
    }
}

/// A list whose element hint is inferred from `V`.
pub fn simple_custom_value_list<V>(values: Vec<V>) -> CustomValue
where
    V: Serialize + TypeHinted + Send + Sync + 'static,
{
    typed_simple_custom_value(Some(Vec::<V>::type_hint()), values)
}

/// A string-keyed map whose value hint is inferred from `V`.
pub fn simple_custom_value_map<V>(values: BTreeMap<String, V>) -> CustomValue
where
    V: Serialize + TypeHinted + Send + Sync + 'static,
{
    typed_simple_custom_value(Some(BTreeMap::<String, V>::type_hint()), values)
}

/// An insertion-ordered map of custom values.
///
/// Inserting an existing key replaces its value in place.
#[derive(Clone, Default)]
pub struct CustomValues {
    entries: Vec<(String, CustomValue)>,
}

impl CustomValues {
    pub fn insert(&mut self, key: impl Into<String>, value: CustomValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CustomValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CustomValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve every entry into a table; `None` when there are no entries.
    pub fn resolve(&self) -> FactoryResult<Option<Map<String, Value>>> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let mut table = Map::new();
        for (key, value) in &self.entries {
            table.insert(key.clone(), value.resolve_checked(key)?);
        }
        Ok(Some(table))
    }
}

impl fmt::Debug for CustomValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<'de> Deserialize<'de> for CustomValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CustomValuesVisitor;

        impl<'de> Visitor<'de> for CustomValuesVisitor {
            type Value = CustomValues;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of custom values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut values = CustomValues::default();
                while let Some((key, value)) = access.next_entry::<String, CustomValue>()? {
                    values.insert(key, value);
                }
                Ok(values)
            }
        }

        deserializer.deserialize_map(CustomValuesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct CustomData {
        name: String,
        number: i32,
    }

    struct Lazy {
        name: &'static str,
        number: i32,
    }

    #[test]
    fn simple_list_infers_hint() {
        let value = simple_custom_value_list(vec!["a", "b"]);
        assert_eq!(
            value.type_hint(),
            Some(&TypeHint::list_of(TypeHint::String))
        );
        assert_eq!(value.resolve_checked("k").unwrap(), json!(["a", "b"]));
        assert_eq!(value.describe(), "simple(list<string>)");
    }

    #[test]
    fn complex_value_applies_mapper() {
        let value = complex_custom_value(Lazy { name: "Steve", number: 123 }, |lazy| CustomData {
            name: lazy.name.to_string(),
            number: lazy.number,
        });
        assert_eq!(
            value.resolve().unwrap(),
            json!({"name": "Steve", "number": 123})
        );
    }

    #[test]
    fn typed_list_of_records() {
        let people = vec![
            CustomData { name: "Steve".into(), number: 123 },
            CustomData { name: "Bob".into(), number: 456 },
        ];
        let value = typed_simple_custom_value(Some(TypeHint::list_of(TypeHint::Table)), people);
        let resolved = value.resolve_checked("person_list").unwrap();
        assert_eq!(resolved[1]["name"], json!("Bob"));
    }

    #[test]
    fn hint_mismatch_is_unmappable() {
        let value = typed_simple_custom_value(Some(TypeHint::list_of(TypeHint::Integer)), vec!["x"]);
        let err = value.resolve_checked("numbers").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("numbers"), "{message}");
        assert!(message.contains("list<integer>"), "{message}");
        assert!(message.contains("string"), "{message}");
    }

    #[test]
    fn custom_values_keep_insertion_order_and_replace_in_place() {
        let mut custom = CustomValues::default();
        custom.insert("z", simple_custom_value(1));
        custom.insert("a", simple_custom_value(2));
        custom.insert("z", simple_custom_value(3));

        let resolved = custom.resolve().unwrap().unwrap();
        let keys: Vec<_> = resolved.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(resolved["z"], json!(3));
    }

    #[test]
    fn empty_custom_values_resolve_to_none() {
        assert!(CustomValues::default().resolve().unwrap().is_none());
    }

    #[test]
    fn deserializes_from_yaml_mapping_in_order() {
        let custom: CustomValues =
            serde_yaml::from_str("test_list: [a, b]\ntest_map:\n  key: value\n").unwrap();
        let resolved = custom.resolve().unwrap().unwrap();
        let keys: Vec<_> = resolved.keys().cloned().collect();
        assert_eq!(keys, vec!["test_list", "test_map"]);
        assert_eq!(resolved["test_map"], json!({"key": "value"}));
    }
}
