//! Perimeter wall generation around ground colliders

use crate::config::WallsConfig;
use crate::error::LevelError;
use crate::level::{load_level, save_level, LevelObject, Vec3};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Side of a ground collider a wall is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Back,
    Front,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Back, Side::Front];

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Back => "back",
            Side::Front => "front",
        }
    }
}

/// Round to two decimals
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Position and size of the wall on `side` of a ground box
pub fn wall_geometry(position: Vec3, size: Vec3, side: Side, height: f64, thickness: f64) -> (Vec3, Vec3) {
    let [x, _, z] = position;
    let half_t = thickness / 2.0;
    let y = height / 2.0;

    let (pos, dims) = match side {
        Side::Left => ([x - size[0] / 2.0 - half_t, y, z], [thickness, height, size[2]]),
        Side::Right => ([x + size[0] / 2.0 + half_t, y, z], [thickness, height, size[2]]),
        Side::Back => ([x, y, z - size[2] / 2.0 - half_t], [size[0], height, thickness]),
        Side::Front => ([x, y, z + size[2] / 2.0 + half_t], [size[0], height, thickness]),
    };
    (pos.map(round2), dims.map(round2))
}

/// The four wall colliders around every ground object in `objects`
pub fn generate_walls(objects: &[LevelObject], config: &WallsConfig) -> Result<Vec<LevelObject>, LevelError> {
    let mut walls = Vec::new();

    for (index, obj) in objects.iter().enumerate() {
        let material = obj.get("materialType").and_then(Value::as_str);
        if material != Some(config.ground_material.as_str()) {
            continue;
        }

        let id = match obj.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(LevelError::MissingField { index, field: "id" }),
        };
        let position = obj.position(index)?;
        let size = obj.size(index)?;

        for side in Side::ALL {
            let (pos, dims) = wall_geometry(position, size, side, config.height, config.thickness);

            let mut fields = Map::new();
            fields.insert("id".to_string(), Value::from(format!("wall_{}_{}", id, side.name())));
            fields.insert("type".to_string(), Value::from("box"));
            fields.insert("position".to_string(), Value::from(pos.to_vec()));
            fields.insert("size".to_string(), Value::from(dims.to_vec()));
            fields.insert("materialType".to_string(), Value::from("wall"));
            fields.insert("meshName".to_string(), Value::Null);
            walls.push(LevelObject::new(fields));
        }
    }

    Ok(walls)
}

/// Append generated walls to the level at `input` and write it to `output`.
/// Returns the number of walls added.
pub fn generate_walls_file(input: &Path, output: &Path, config: &WallsConfig) -> Result<usize> {
    tracing::info!("Loading {}", input.display());
    let mut level = load_level(input)?;
    let mut objects = level
        .objects()
        .with_context(|| format!("Reading objects of {}", input.display()))?;

    let walls = generate_walls(&objects, config)
        .with_context(|| format!("Generating walls for {}", input.display()))?;
    tracing::info!(
        "Generated {} wall colliders for {} ground colliders",
        walls.len(),
        walls.len() / Side::ALL.len()
    );

    let added = walls.len();
    objects.extend(walls);
    level.set_objects(objects);
    save_level(&level, output)?;
    tracing::info!("Saved level with walls to {}", output.display());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> LevelObject {
        match value {
            Value::Object(map) => LevelObject::new(map),
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_wall_geometry_per_side() {
        let position = [10.0, 0.0, -4.0];
        let size = [8.0, 1.0, 6.0];

        assert_eq!(
            wall_geometry(position, size, Side::Left, 6.0, 0.5),
            ([5.75, 3.0, -4.0], [0.5, 6.0, 6.0])
        );
        assert_eq!(
            wall_geometry(position, size, Side::Right, 6.0, 0.5),
            ([14.25, 3.0, -4.0], [0.5, 6.0, 6.0])
        );
        assert_eq!(
            wall_geometry(position, size, Side::Back, 6.0, 0.5),
            ([10.0, 3.0, -7.25], [8.0, 6.0, 0.5])
        );
        assert_eq!(
            wall_geometry(position, size, Side::Front, 6.0, 0.5),
            ([10.0, 3.0, -0.75], [8.0, 6.0, 0.5])
        );
    }

    #[test]
    fn test_coordinates_are_rounded() {
        let (pos, _) = wall_geometry([0.333, 0.0, 0.0], [1.0, 1.0, 1.0], Side::Back, 6.0, 0.5);
        assert_eq!(pos, [0.33, 3.0, -0.75]);
    }

    #[test]
    fn test_generate_walls_for_ground_only() {
        let objects = vec![
            object(json!({"id": "g1", "type": "box", "position": [0, 0, 0], "size": [4, 1, 2], "materialType": "ground"})),
            object(json!({"id": "p", "type": "box", "position": [0, 3, 0], "size": [1, 1, 1], "materialType": "platform"})),
        ];

        let walls = generate_walls(&objects, &WallsConfig::default()).unwrap();

        assert_eq!(walls.len(), 4);
        let ids: Vec<&str> = walls.iter().map(|w| w.get("id").unwrap().as_str().unwrap()).collect();
        assert_eq!(ids, vec!["wall_g1_left", "wall_g1_right", "wall_g1_back", "wall_g1_front"]);
        assert_eq!(
            walls[0].fields(),
            object(json!({
                "id": "wall_g1_left",
                "type": "box",
                "position": [-2.25, 3.0, 0.0],
                "size": [0.5, 6.0, 2.0],
                "materialType": "wall",
                "meshName": null
            }))
            .fields()
        );
    }

    #[test]
    fn test_ground_without_id_fails() {
        let objects = vec![object(json!({"type": "box", "position": [0, 0, 0], "size": [4, 1, 2], "materialType": "ground"}))];
        assert_eq!(
            generate_walls(&objects, &WallsConfig::default()).unwrap_err(),
            LevelError::MissingField { index: 0, field: "id" }
        );
    }
}
