//! Typed values carried by data pins.

use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The static type of a data pin's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Any type (for generic pins)
    Any,
    Bool,
    Int,
    Float,
    Str,
    Vec2,
    Color,
    /// One of a fixed set of named options (the options live in the pin's
    /// editor metadata)
    Enum,
    /// Opaque reference to an external object, by integer handle
    Object,
}

impl ValueType {
    /// Check if a value of this type can flow into a pin of `other`'s type.
    pub fn can_connect_to(&self, other: &ValueType) -> bool {
        self == other || *self == ValueType::Any || *other == ValueType::Any
    }

    /// Human-readable name for this type.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Any => "Any",
            ValueType::Bool => "Bool",
            ValueType::Int => "Int",
            ValueType::Float => "Float",
            ValueType::Str => "Str",
            ValueType::Vec2 => "Vec2",
            ValueType::Color => "Color",
            ValueType::Enum => "Enum",
            ValueType::Object => "Object",
        }
    }

    /// Display color for pins and links of this type.
    pub fn color(&self) -> Color32 {
        match self {
            ValueType::Any => Color32::from_rgb(150, 150, 150),
            ValueType::Bool => Color32::from_rgb(255, 100, 255),
            ValueType::Int => Color32::from_rgb(100, 220, 220),
            ValueType::Float => Color32::from_rgb(100, 150, 255),
            ValueType::Str => Color32::from_rgb(100, 255, 100),
            ValueType::Vec2 => Color32::from_rgb(255, 100, 100),
            ValueType::Color => Color32::from_rgb(255, 200, 100),
            ValueType::Enum => Color32::from_rgb(200, 150, 255),
            ValueType::Object => Color32::from_rgb(220, 220, 140),
        }
    }
}

/// A runtime value flowing through the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vec2(#[serde(with = "vec2_serde")] Vec2),
    Color(#[serde(with = "color32_serde")] Color32),
    Enum(String),
    Object(u64),
}

impl Value {
    /// The runtime type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Str(_) => ValueType::Str,
            Value::Vec2(_) => ValueType::Vec2,
            Value::Color(_) => ValueType::Color,
            Value::Enum(_) => ValueType::Enum,
            Value::Object(_) => ValueType::Object,
        }
    }

    /// A sensible zero/empty value for the given type.
    ///
    /// `Any` defaults to a Float zero, matching the most common generic use.
    pub fn default_for(value_type: ValueType) -> Value {
        match value_type {
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Any | ValueType::Float => Value::Float(0.0),
            ValueType::Str => Value::Str(String::new()),
            ValueType::Vec2 => Value::Vec2(Vec2::ZERO),
            ValueType::Color => Value::Color(Color32::WHITE),
            ValueType::Enum => Value::Enum(String::new()),
            ValueType::Object => Value::Object(0),
        }
    }

    /// Numeric view of this value, when it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Boolean view of this value. Ints are truthy when non-zero.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// String view, for `Str` and `Enum` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Converts this value to `target` where a lossless-enough conversion
    /// exists (Int <-> Float). Everything else passes through unchanged;
    /// linked pins of equal types never reach the conversion arms.
    pub fn coerced_to(&self, target: ValueType) -> Value {
        match (self, target) {
            (Value::Int(i), ValueType::Float) => Value::Float(*i as f64),
            (Value::Float(f), ValueType::Int) => Value::Int(*f as i64),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::Vec2(v) => write!(f, "({}, {})", v.x, v.y),
            Value::Color(c) => {
                write!(f, "#{:02X}{:02X}{:02X}{:02X}", c.r(), c.g(), c.b(), c.a())
            }
            Value::Enum(s) => write!(f, "{}", s),
            Value::Object(id) => write!(f, "object#{}", id),
        }
    }
}

// Serde helper modules for egui types
pub(crate) mod vec2_serde {
    use egui::Vec2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(vec: &Vec2, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [vec.x, vec.y].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec2, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Vec2::new(x, y))
    }
}

pub(crate) mod color32_serde {
    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [color.r(), color.g(), color.b(), color.a()].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [r, g, b, a] = <[u8; 4]>::deserialize(deserializer)?;
        Ok(Color32::from_rgba_unmultiplied(r, g, b, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_connects_both_ways() {
        assert!(ValueType::Any.can_connect_to(&ValueType::Float));
        assert!(ValueType::Str.can_connect_to(&ValueType::Any));
        assert!(ValueType::Float.can_connect_to(&ValueType::Float));
        assert!(!ValueType::Float.can_connect_to(&ValueType::Str));
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::Int(3).coerced_to(ValueType::Float), Value::Float(3.0));
        assert_eq!(Value::Float(2.7).coerced_to(ValueType::Int), Value::Int(2));
        // Non-numeric pairs pass through untouched.
        assert_eq!(
            Value::Str("hi".into()).coerced_to(ValueType::Float),
            Value::Str("hi".into())
        );
    }

    #[test]
    fn value_serde_round_trip() {
        let values = vec![
            Value::Bool(true),
            Value::Int(-4),
            Value::Float(1.5),
            Value::Str("text".into()),
            Value::Vec2(Vec2::new(3.0, 4.0)),
            Value::Color(Color32::from_rgb(10, 20, 30)),
            Value::Enum("Celsius".into()),
            Value::Object(7),
        ];
        let json = serde_json::to_string(&values).unwrap();
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(values, back);
    }
}
