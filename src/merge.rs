//! Wall merging
//!
//! Walls are the brown boxes of a level. Two walls that line up on two axes
//! and touch on the third can be replaced by one box spanning both. Groups
//! are grown greedily from a seed wall, in input order, until no unconsumed
//! wall touches the group any more.

use crate::error::LevelError;
use crate::level::{Axis, LevelObject, Vec3};

/// Color that marks an object as a wall (0x8b4513)
pub const WALL_COLOR: u32 = 9127187;

/// Largest gap between two extents that still counts as touching
pub const ADJACENCY_TOLERANCE: f64 = 0.1;

pub fn is_wall(obj: &LevelObject) -> bool {
    obj.color() == Some(WALL_COLOR as f64)
}

/// Axis a merge grows along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// along X
    Horizontal,
    /// along Z
    Vertical,
}

impl Direction {
    pub fn axis(self) -> Axis {
        match self {
            Direction::Horizontal => Axis::X,
            Direction::Vertical => Axis::Z,
        }
    }

    /// Axes on which both boxes must agree exactly
    fn fixed_axes(self) -> [Axis; 2] {
        match self {
            Direction::Horizontal => [Axis::Y, Axis::Z],
            Direction::Vertical => [Axis::X, Axis::Y],
        }
    }
}

/// Geometry of a wall: center and full extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallBox {
    pub position: Vec3,
    pub size: Vec3,
}

impl WallBox {
    pub fn from_object(obj: &LevelObject, index: usize) -> Result<Self, LevelError> {
        Ok(Self {
            position: obj.position(index)?,
            size: obj.size(index)?,
        })
    }

    /// `(low, high)` edges along `axis`
    pub fn extent(&self, axis: Axis) -> (f64, f64) {
        let i = axis.index();
        let half = self.size[i] / 2.0;
        (self.position[i] - half, self.position[i] + half)
    }
}

/// Whether two extents meet end to end, in either order
pub fn touches(a: (f64, f64), b: (f64, f64)) -> bool {
    (a.1 - b.0).abs() < ADJACENCY_TOLERANCE || (b.1 - a.0).abs() < ADJACENCY_TOLERANCE
}

pub fn can_merge(a: &WallBox, b: &WallBox, direction: Direction) -> bool {
    let aligned = direction.fixed_axes().iter().all(|axis| {
        let i = axis.index();
        a.position[i] == b.position[i] && a.size[i] == b.size[i]
    });
    aligned && touches(a.extent(direction.axis()), b.extent(direction.axis()))
}

/// First direction in which `a` and `b` can merge; horizontal wins.
pub fn merge_direction(a: &WallBox, b: &WallBox) -> Option<Direction> {
    [Direction::Horizontal, Direction::Vertical]
        .into_iter()
        .find(|&d| can_merge(a, b, d))
}

/// Union of `a` and `b` along `direction`. Everything else comes from `a`.
pub fn merge_pair(a: &WallBox, b: &WallBox, direction: Direction) -> WallBox {
    let axis = direction.axis();
    let (a_lo, a_hi) = a.extent(axis);
    let (b_lo, b_hi) = b.extent(axis);
    let lo = a_lo.min(b_lo);
    let hi = a_hi.max(b_hi);

    let mut merged = *a;
    merged.position[axis.index()] = (lo + hi) / 2.0;
    merged.size[axis.index()] = hi - lo;
    merged
}

/// Walls folded into one box, indices into the wall list
#[derive(Debug, Clone, PartialEq)]
pub struct MergeGroup {
    pub seed: usize,
    /// Seed first, then absorbed walls in absorption order
    pub members: Vec<usize>,
    pub geometry: WallBox,
    /// Axes whose position/size were rewritten
    pub grown: [bool; 3],
}

/// Greedy grouping over `walls`, seeded in order.
///
/// Each seed rescans the whole list until a full pass absorbs nothing. A wall
/// that could join two groups ends up in whichever group reaches it first.
pub fn group_walls(walls: &[WallBox]) -> Vec<MergeGroup> {
    let mut consumed = vec![false; walls.len()];
    let mut groups = Vec::new();

    for seed in 0..walls.len() {
        if consumed[seed] {
            continue;
        }
        consumed[seed] = true;

        let mut group = MergeGroup {
            seed,
            members: vec![seed],
            geometry: walls[seed],
            grown: [false; 3],
        };

        let mut merged_any = true;
        while merged_any {
            merged_any = false;
            for (j, candidate) in walls.iter().enumerate() {
                if consumed[j] {
                    continue;
                }
                if let Some(direction) = merge_direction(&group.geometry, candidate) {
                    group.geometry = merge_pair(&group.geometry, candidate, direction);
                    group.grown[direction.axis().index()] = true;
                    group.members.push(j);
                    consumed[j] = true;
                    merged_any = true;
                }
            }
        }

        groups.push(group);
    }

    groups
}

/// Counts reported after a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    pub walls_before: usize,
    pub walls_after: usize,
    pub non_walls: usize,
}

impl MergeReport {
    pub fn reduction(&self) -> usize {
        self.walls_before - self.walls_after
    }
}

/// Merge the walls among `objects`.
///
/// Returns non-walls in their original order followed by one object per
/// merge group. Every wall's geometry is validated before merging starts.
pub fn merge_walls(objects: &[LevelObject]) -> Result<(Vec<LevelObject>, MergeReport), LevelError> {
    let mut walls = Vec::new();
    let mut boxes = Vec::new();
    let mut output = Vec::with_capacity(objects.len());

    for (index, obj) in objects.iter().enumerate() {
        if is_wall(obj) {
            boxes.push(WallBox::from_object(obj, index)?);
            walls.push(obj);
        } else {
            output.push(obj.clone());
        }
    }

    let non_walls = output.len();
    tracing::info!("Found {} walls to potentially merge", walls.len());

    let groups = group_walls(&boxes);
    for group in &groups {
        if group.members.len() > 1 {
            tracing::debug!(
                "wall group seeded at {}: {} walls -> position {:?}, size {:?}",
                group.seed,
                group.members.len(),
                group.geometry.position,
                group.geometry.size
            );
        }
        output.push(group_object(walls[group.seed], group));
    }

    let report = MergeReport {
        walls_before: walls.len(),
        walls_after: groups.len(),
        non_walls,
    };
    Ok((output, report))
}

/// Copy of the seed object with the grown axes rewritten
fn group_object(seed: &LevelObject, group: &MergeGroup) -> LevelObject {
    let mut obj = seed.clone();
    for axis in [Axis::X, Axis::Y, Axis::Z] {
        let i = axis.index();
        if group.grown[i] {
            obj.set_component("position", axis, group.geometry.position[i]);
            obj.set_component("size", axis, group.geometry.size[i]);
        }
    }
    obj
}
