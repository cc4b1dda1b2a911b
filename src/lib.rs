//! Level authoring tools
//!
//! Merges adjacent wall boxes, converts JSON levels to `levelData.js` and
//! generates perimeter walls around ground colliders.

pub mod config;
pub mod convert;
pub mod error;
pub mod level;
pub mod merge;
pub mod optimize;
pub mod walls;

pub use config::Config;
pub use convert::{convert_file, render_level_data, to_level_data, JsWriter};
pub use error::LevelError;
pub use level::{load_level, save_level, Axis, Level, LevelObject, Vec3};
pub use merge::{group_walls, is_wall, merge_walls, MergeReport, WallBox, ADJACENCY_TOLERANCE, WALL_COLOR};
pub use optimize::{optimize_dir, optimize_file, BatchSummary};
pub use walls::{generate_walls, generate_walls_file};
