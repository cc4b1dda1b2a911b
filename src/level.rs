//! Level documents and the objects they contain
//!
//! Objects are kept as raw JSON maps so that every field the tools do not
//! touch survives a load/save cycle unchanged, including key order and the
//! integer/float form of numbers.

use crate::error::LevelError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// x, y, z
pub type Vec3 = [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A single entry of a level's `objects` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelObject(Map<String, Value>);

impl LevelObject {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `type` discriminator ("box", "slope", ...)
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Packed RGB color, if the object has a numeric `color`
    pub fn color(&self) -> Option<f64> {
        self.0.get("color").and_then(Value::as_f64)
    }

    pub fn position(&self, index: usize) -> Result<Vec3, LevelError> {
        self.vector("position", index)
    }

    pub fn size(&self, index: usize) -> Result<Vec3, LevelError> {
        self.vector("size", index)
    }

    /// Read a 3-component numeric field. `index` is the object's position in
    /// the level and only feeds the error message.
    pub fn vector(&self, field: &'static str, index: usize) -> Result<Vec3, LevelError> {
        let value = self
            .0
            .get(field)
            .ok_or(LevelError::MissingField { index, field })?;

        let invalid = || LevelError::InvalidVector { index, field };
        let arr = value.as_array().ok_or_else(invalid)?;
        if arr.len() != 3 {
            return Err(invalid());
        }

        let mut out = [0.0; 3];
        for (slot, v) in out.iter_mut().zip(arr) {
            *slot = v.as_f64().ok_or_else(invalid)?;
        }
        Ok(out)
    }

    /// Overwrite one component of a vector field, leaving the other two as
    /// they were written.
    pub fn set_component(&mut self, field: &str, axis: Axis, value: f64) {
        if let Some(Value::Array(arr)) = self.0.get_mut(field) {
            if let Some(slot) = arr.get_mut(axis.index()) {
                *slot = Value::from(value);
            }
        }
    }
}

/// A whole level file: `objects` plus any other top-level keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(Map<String, Value>);

impl Level {
    pub fn parse(json: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(json)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(LevelError::NotAnObject.into()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The level's objects. A missing `objects` array is an error.
    pub fn objects(&self) -> Result<Vec<LevelObject>, LevelError> {
        let arr = self
            .0
            .get("objects")
            .and_then(Value::as_array)
            .ok_or(LevelError::MissingLevelField("objects"))?;
        to_objects(arr)
    }

    /// Like [`Level::objects`], but a level without `objects` is empty.
    pub fn objects_or_empty(&self) -> Result<Vec<LevelObject>, LevelError> {
        match self.0.get("objects").and_then(Value::as_array) {
            Some(arr) => to_objects(arr),
            None => Ok(Vec::new()),
        }
    }

    /// Replace `objects`, keeping its place among the top-level keys.
    pub fn set_objects(&mut self, objects: Vec<LevelObject>) {
        let arr = objects.into_iter().map(|o| Value::Object(o.0)).collect();
        self.0.insert("objects".to_string(), Value::Array(arr));
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn to_objects(arr: &[Value]) -> Result<Vec<LevelObject>, LevelError> {
    arr.iter()
        .enumerate()
        .map(|(index, v)| match v {
            Value::Object(map) => Ok(LevelObject(map.clone())),
            _ => Err(LevelError::InvalidObject { index }),
        })
        .collect()
}

/// Read and parse a level file
pub fn load_level(path: &Path) -> Result<Level> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    Level::parse(&content).with_context(|| format!("Parsing {}", path.display()))
}

/// Write a level as indented JSON, creating parent directories as needed
pub fn save_level(level: &Level, path: &Path) -> Result<()> {
    let content = level.to_json_pretty()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content).with_context(|| format!("Writing {}", path.display()))?;
    Ok(())
}
