//! Convert a JSON level into a `levelData.js` module

use crate::config::ConvertConfig;
use crate::error::LevelError;
use crate::level::{load_level, Level};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

pub const DEFAULT_LEVEL_ID: &str = "custom_level";
pub const DEFAULT_LEVEL_NAME: &str = "Custom Level";

/// Keys written as-is; anything else gets quoted
static JS_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex"));

const HEADER: &str = "// Data-driven level definitions (no hard-coded meshes). Add new objects here.
export const levels = [
";

const BUILTIN_LEVELS: &str = "  {
    id: 'platformer',
    name: 'Platform Course',
    startPosition: [0, 2.2, 0],
    ui: ['hud', 'objectives', 'minimap'],
    lights: [ 'BasicLights', { key: 'PointPulse', props: { position: [6, 4, -10], color: 0xffcc88, intensity: 1.2, speed: 3 } } ],
    objects: [
      { type: 'box', position: [0, 0, 0], size: [12, 1, 12], color: 0x2e8b57 },
    ]
  },
  {
    id: 'intro',
    name: 'Intro Level',
    startPosition: [0, 3, 8],
    ui: ['hud', 'minimap'],
    lights: [ 'BasicLights' ],
    enemies: [
      { type: 'walker', position: [5, 3, 8], modelUrl: 'src/assets/low_poly_female/scene.gltf', patrolPoints: [[7,2,-8,0.5], [13,2,-8,0.5]], speed: 2.4, chaseRange: 5 },
      { type: 'runner', position: [10, 3, 6], modelUrl: 'src/assets/low_poly_male/scene.gltf', patrolPoints: [[12,2,6,0.4],[16,2,6,0.4]], speed: 4.0, chaseRange: 6 },
      { type: 'jumper', position: [2, 3, 10], modelUrl: 'src/assets/low_poly_female/scene.gltf', patrolPoints: [[2,1,10,0.6]], jumpInterval: 1.8, jumpStrength: 5.5 },
      { type: 'flyer', position: [8, 6, -2], modelUrl: 'src/assets/futuristic_flying_animated_robot_-_low_poly/scene.gltf', patrolPoints: [[8,6,-2],[12,8,-4],[6,7,2]], speed: 2.5 },
    ],
    objects: [
      // platform objects are generic \"box\" objects: position + size + optional color
      { type: 'box', position: [0, 0, 0], size: [50, 1, 50], color: 0x6b8e23 }, // ground
      { type: 'box', position: [25, 2, 0], size: [1, 5, 50], color: 0x8b4513 },
      { type: 'box', position: [0, 2, 25], size: [50, 5, 1], color: 0x8b4513 },
      { type: 'box', position: [-25, 2, 0], size: [1, 5, 50], color: 0x8b4513 },
      { type: 'box', position: [0, 2, -25], size: [50, 5, 1], color: 0x8b4513 },
      // simple floating platforms to jump on
      { type: 'box', position: [-2, 2, -4], size: [3, 1, 3], color: 0xcd853f },
      { type: 'box', position: [3, 4, -8], size: [5, 1, 5], color: 0xcd853f },
      { type: 'box', position: [10, 6, -10], size: [4, 1, 4], color: 0xcd853f },
      { type: 'box', position: [14, 8, -12], size: [4, 1, 4], color: 0xcd853f }
    ]
  },
";

/// What a conversion kept and dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertStats {
    pub id: String,
    pub objects: usize,
    pub skipped: usize,
    pub enemies: usize,
}

/// Build the `levelData.js` entry for `level`.
///
/// Only `box` and `slope` objects are carried over, reduced to the fields the
/// game reads.
pub fn to_level_data(level: &Level) -> Result<(Map<String, Value>, ConvertStats), LevelError> {
    let field = |key: &str, default: Value| level.get(key).cloned().unwrap_or(default);

    let mut stats = ConvertStats::default();
    let mut objects = Vec::new();

    for (index, obj) in level.objects_or_empty()?.iter().enumerate() {
        let kind = obj
            .kind()
            .ok_or(LevelError::MissingField { index, field: "type" })?;
        let optional: &[&str] = match kind {
            "box" => &["color"],
            "slope" => &["color", "rotation", "slopeDirection"],
            other => {
                tracing::debug!("skipping object {} of type `{}`", index, other);
                stats.skipped += 1;
                continue;
            }
        };

        let mut out = Map::new();
        out.insert("type".to_string(), Value::from(kind));
        for key in ["position", "size"] {
            let value = obj
                .get(key)
                .ok_or(LevelError::MissingField { index, field: key })?;
            out.insert(key.to_string(), value.clone());
        }
        for &key in optional {
            if let Some(value) = obj.get(key) {
                out.insert(key.to_string(), value.clone());
            }
        }
        objects.push(Value::Object(out));
    }

    let mut js_level = Map::new();
    js_level.insert("id".to_string(), field("id", json!(DEFAULT_LEVEL_ID)));
    js_level.insert("name".to_string(), field("name", json!(DEFAULT_LEVEL_NAME)));
    js_level.insert("startPosition".to_string(), field("startPosition", json!([0, 2, 8])));
    js_level.insert("ui".to_string(), field("ui", json!(["hud"])));
    js_level.insert("lights".to_string(), field("lights", json!(["BasicLights"])));
    stats.objects = objects.len();
    js_level.insert("objects".to_string(), Value::Array(objects));

    if let Some(enemies) = level.get("enemies") {
        if !is_empty(enemies) {
            stats.enemies = enemies.as_array().map_or(1, Vec::len);
            js_level.insert("enemies".to_string(), enemies.clone());
        }
    }

    stats.id = match js_level.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => DEFAULT_LEVEL_ID.to_string(),
    };

    Ok((js_level, stats))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(arr) => arr.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Formats JSON values as JavaScript literals
#[derive(Debug, Clone, Copy, Default)]
pub struct JsWriter {
    /// Write integer `color` values as `0xrrggbb`
    pub hex_colors: bool,
}

impl JsWriter {
    pub fn new(hex_colors: bool) -> Self {
        Self { hex_colors }
    }

    /// Format `value` as if it started at column `indent`
    pub fn format(&self, value: &Value, indent: usize) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value, indent, None);
        out
    }

    fn write_value(&self, out: &mut String, value: &Value, indent: usize, key: Option<&str>) {
        let spaces = " ".repeat(indent);
        match value {
            Value::Object(map) if map.is_empty() => out.push_str("{}"),
            Value::Object(map) => {
                out.push_str("{\n");
                for (i, (k, v)) in map.iter().enumerate() {
                    out.push_str(&spaces);
                    out.push_str("  ");
                    out.push_str(&js_key(k));
                    out.push_str(": ");
                    self.write_value(out, v, indent + 2, Some(k));
                    if i + 1 < map.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&spaces);
                out.push('}');
            }
            Value::Array(arr) if arr.is_empty() => out.push_str("[]"),
            Value::Array(arr) if arr.iter().all(Value::is_number) || arr.iter().all(Value::is_string) => {
                let items: Vec<String> = arr.iter().map(|v| self.scalar(v, key)).collect();
                out.push('[');
                out.push_str(&items.join(", "));
                out.push(']');
            }
            Value::Array(arr) => {
                out.push_str("[\n");
                for (i, item) in arr.iter().enumerate() {
                    out.push_str(&spaces);
                    out.push_str("  ");
                    self.write_value(out, item, indent + 2, None);
                    if i + 1 < arr.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                out.push_str(&spaces);
                out.push(']');
            }
            scalar => out.push_str(&self.scalar(scalar, key)),
        }
    }

    fn scalar(&self, value: &Value, key: Option<&str>) -> String {
        match value {
            Value::String(s) => js_string(s),
            Value::Number(n) => match n.as_u64() {
                Some(rgb) if self.hex_colors && key == Some("color") => format!("0x{rgb:06x}"),
                _ => n.to_string(),
            },
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
            nested => self.format(nested, 0),
        }
    }
}

fn js_key(key: &str) -> String {
    if JS_IDENTIFIER.is_match(key) {
        key.to_string()
    } else {
        js_string(key)
    }
}

fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// The complete `levelData.js` source with `js_level` as the last entry
pub fn render_level_data(js_level: &Map<String, Value>, config: &ConvertConfig) -> String {
    let writer = JsWriter::new(config.hex_colors);
    let mut out = String::from(HEADER);
    if config.include_builtin_levels {
        out.push_str(BUILTIN_LEVELS);
    }
    out.push_str("  // Your custom level\n  ");
    out.push_str(&writer.format(&Value::Object(js_level.clone()), 2));
    out.push_str("\n];\n");
    out
}

/// Convert the level at `input` and write the JS module to `output`
pub fn convert_file(input: &Path, output: &Path, config: &ConvertConfig) -> Result<ConvertStats> {
    tracing::info!("Loading {}", input.display());
    let level = load_level(input)?;

    let (js_level, stats) =
        to_level_data(&level).with_context(|| format!("Converting {}", input.display()))?;
    tracing::info!(
        "Converting level with {} objects ({} skipped)",
        stats.objects,
        stats.skipped
    );

    let content = render_level_data(&js_level, config);
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, content).with_context(|| format!("Writing {}", output.display()))?;

    tracing::info!("Saved converted level to {}", output.display());
    tracing::info!("The level will be accessible with id: '{}'", stats.id);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(json: &str) -> Level {
        Level::parse(json).unwrap()
    }

    #[test]
    fn test_defaults_and_box_fields() {
        let lvl = level(
            r#"{"id": "arena", "name": "Arena", "objects": [
                {"type": "box", "position": [0, 0, 0], "size": [10, 1, 10], "color": 7048739, "id": "floor"}
            ]}"#,
        );

        let (js_level, stats) = to_level_data(&lvl).unwrap();
        let text = JsWriter::default().format(&Value::Object(js_level), 2);

        let expected = "{
    id: 'arena',
    name: 'Arena',
    startPosition: [0, 2, 8],
    ui: ['hud'],
    lights: ['BasicLights'],
    objects: [
      {
        type: 'box',
        position: [0, 0, 0],
        size: [10, 1, 10],
        color: 7048739
      }
    ]
  }";
        assert_eq!(text, expected);
        assert_eq!(
            stats,
            ConvertStats { id: "arena".to_string(), objects: 1, skipped: 0, enemies: 0 }
        );
    }

    #[test]
    fn test_slopes_keep_orientation_and_others_are_dropped() {
        let lvl = level(
            r#"{"objects": [
                {"type": "slope", "position": [1, 1, 1], "size": [2, 1, 2], "rotation": [0, 1.57, 0], "slopeDirection": "north", "meshName": "ramp"},
                {"type": "light", "position": [0, 5, 0]},
                {"type": "box", "position": [0, 0, 0], "size": [1, 1, 1]}
            ], "enemies": []}"#,
        );

        let (js_level, stats) = to_level_data(&lvl).unwrap();

        assert_eq!(stats.objects, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.id, DEFAULT_LEVEL_ID);
        assert!(!js_level.contains_key("enemies"));

        let slope = &js_level["objects"][0];
        let keys: Vec<&str> = slope.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["type", "position", "size", "rotation", "slopeDirection"]);
        assert_eq!(js_level["objects"][1], json!({"type": "box", "position": [0, 0, 0], "size": [1, 1, 1]}));
    }

    #[test]
    fn test_missing_geometry_is_reported() {
        let lvl = level(r#"{"objects": [{"type": "box", "size": [1, 1, 1]}]}"#);
        assert_eq!(
            to_level_data(&lvl).unwrap_err(),
            LevelError::MissingField { index: 0, field: "position" }
        );

        let lvl = level(r#"{"objects": [{"position": [0, 0, 0]}]}"#);
        assert_eq!(
            to_level_data(&lvl).unwrap_err(),
            LevelError::MissingField { index: 0, field: "type" }
        );
    }

    #[test]
    fn test_enemies_are_nested_literals() {
        let lvl = level(
            r#"{"id": "e", "objects": [], "enemies": [
                {"type": "walker", "patrolPoints": [[7, 2, -8, 0.5], [13, 2, -8, 0.5]], "speed": 2.4}
            ]}"#,
        );
        let (js_level, stats) = to_level_data(&lvl).unwrap();
        assert_eq!(stats.enemies, 1);

        let text = JsWriter::default().format(&js_level["enemies"], 0);
        let expected = "[
  {
    type: 'walker',
    patrolPoints: [
      [7, 2, -8, 0.5],
      [13, 2, -8, 0.5]
    ],
    speed: 2.4
  }
]";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_scalars_keys_and_colors() {
        let value = json!({
            "color": 9127187,
            "it's": "don't \\ stop",
            "flag": true,
            "mesh": null,
            "mixed": [1, "a"],
            "empty": {},
            "none": []
        });

        let plain = JsWriter::default().format(&value, 0);
        assert!(plain.contains("  color: 9127187,\n"));
        assert!(plain.contains(r"  'it\'s': 'don\'t \\ stop',"));
        assert!(plain.contains("  flag: true,\n"));
        assert!(plain.contains("  mesh: null,\n"));
        assert!(plain.contains("  mixed: [\n    1,\n    'a'\n  ],\n"));
        assert!(plain.contains("  empty: {},\n"));
        assert!(plain.ends_with("  none: []\n}"));

        let hex = JsWriter::new(true).format(&value, 0);
        assert!(hex.contains("  color: 0x8b4513,\n"));
        assert_eq!(JsWriter::new(true).format(&json!({"colors": [1, 2]}), 0), "{\n  colors: [1, 2]\n}");
    }

    #[test]
    fn test_rendered_module_layout() {
        let mut js_level = Map::new();
        js_level.insert("id".to_string(), json!("x"));

        let bare = ConvertConfig { hex_colors: false, include_builtin_levels: false };
        assert_eq!(
            render_level_data(&js_level, &bare),
            format!("{HEADER}  // Your custom level\n  {{\n    id: 'x'\n  }}\n];\n")
        );

        let full = ConvertConfig { hex_colors: false, include_builtin_levels: true };
        let text = render_level_data(&js_level, &full);
        assert!(text.starts_with(HEADER));
        assert!(text.contains("    id: 'platformer',"));
        assert!(text.contains("  },\n  // Your custom level\n  {\n    id: 'x'\n  }\n];\n"));
    }
}
