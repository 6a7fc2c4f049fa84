//! Per-case record of visited positions.
//!
//! Points are kept as parallel columns (one per axis plus colour and, in lifetime
//! mode, remaining lifetime) in insertion order. A coordinate index makes the
//! dedup lookup O(1); it always agrees with a front-to-back scan of the columns.

use std::collections::HashMap;
use std::io;

use borsh::{BorshDeserialize, BorshSerialize};
use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::error::{ConfigError, InternalError};
use crate::state::{Dimensions, Point};

/// Presentation label of a recorded point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTag {
    NoTurn,
    Turn,
}

impl ColorTag {
    pub fn from_turn(turned: bool) -> Self {
        if turned {
            ColorTag::Turn
        } else {
            ColorTag::NoTurn
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointRecord {
    pub point: Point,
    pub color: ColorTag,
    pub lifetime: Option<u32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StoreMode {
    /// Revisiting a coordinate does not add a second record.
    pub dedup: bool,
    /// Starting lifetime of a record. `None` keeps records forever.
    pub lifetime: Option<u32>,
}

impl StoreMode {
    pub fn new(dedup: bool, lifetime: Option<u32>) -> Result<Self, ConfigError> {
        if lifetime == Some(0) {
            return Err(ConfigError::ZeroLifetime);
        }
        Ok(Self { dedup, lifetime })
    }
}

/// Per-axis `max - min + 1` over the stored points; 0 for an empty store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Extent {
    pub x: u64,
    pub y: u64,
    pub z: u64,
}

impl Extent {
    /// Number of lattice cells inside the bounding box.
    pub fn cells(&self, dims: Dimensions) -> u128 {
        let plane = u128::from(self.x) * u128::from(self.y);
        match dims {
            Dimensions::Planar => plane,
            Dimensions::Spatial => plane * u128::from(self.z),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PointStore {
    mode: StoreMode,
    xs: Vec<i64>,
    ys: Vec<i64>,
    zs: Vec<i64>,
    colors: Vec<ColorTag>,
    lifetimes: Vec<u32>,
    // only maintained in dedup mode
    index: HashMap<Point, usize>,
}

impl PointStore {
    pub fn new(mode: StoreMode) -> Self {
        Self { mode, ..Default::default() }
    }

    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    /// Records the pen's new position.
    ///
    /// In lifetime mode all stored records age by one step first and expired ones are
    /// evicted. In dedup mode a revisited coordinate refreshes the existing record
    /// (its lifetime goes back to the starting value) instead of adding a new one.
    pub fn record(&mut self, point: Point, color: ColorTag) -> Result<(), InternalError> {
        if self.mode.lifetime.is_some() {
            self.age();
        }
        let existing = if self.mode.dedup { self.index.get(&point).copied() } else { None };
        match (existing, self.mode.lifetime) {
            (Some(i), Some(start)) => {
                if let Some(lifetime) = self.lifetimes.get_mut(i) {
                    *lifetime = start;
                }
            }
            (Some(_), None) => {}
            (None, lifetime) => {
                let i = self.xs.len();
                self.xs.push(point.x);
                self.ys.push(point.y);
                self.zs.push(point.z);
                self.colors.push(color);
                if let Some(start) = lifetime {
                    self.lifetimes.push(start);
                }
                if self.mode.dedup {
                    self.index.entry(point).or_insert(i);
                }
            }
        }
        self.check_invariants()
    }

    fn age(&mut self) {
        let mut expired = false;
        for lifetime in self.lifetimes.iter_mut() {
            *lifetime = lifetime.saturating_sub(1);
            expired |= *lifetime == 0;
        }
        if !expired {
            return;
        }
        let keep: Vec<bool> = self.lifetimes.iter().map(|&l| l > 0).collect();
        retain_mask(&mut self.xs, &keep);
        retain_mask(&mut self.ys, &keep);
        retain_mask(&mut self.zs, &keep);
        retain_mask(&mut self.colors, &keep);
        retain_mask(&mut self.lifetimes, &keep);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        if !self.mode.dedup {
            return;
        }
        for i in 0..self.xs.len() {
            let point = Point::new(self.xs[i], self.ys[i], self.zs[i]);
            // first occurrence wins, as a front-to-back scan would
            self.index.entry(point).or_insert(i);
        }
    }

    pub fn check_invariants(&self) -> Result<(), InternalError> {
        let expected = self.xs.len();
        let expected_lifetimes = if self.mode.lifetime.is_some() { expected } else { 0 };
        for (column, found, want) in [
            ("ys", self.ys.len(), expected),
            ("zs", self.zs.len(), expected),
            ("colors", self.colors.len(), expected),
            ("lifetimes", self.lifetimes.len(), expected_lifetimes),
        ] {
            if found != want {
                return Err(InternalError::ColumnMismatch { column, expected: want, found });
            }
        }
        if let Some((index, &lifetime)) = self.lifetimes.iter().find_position(|&&l| l == 0) {
            return Err(InternalError::ExpiredPoint { index, lifetime });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn bounding_extent(&self) -> Extent {
        Extent { x: span(&self.xs), y: span(&self.ys), z: span(&self.zs) }
    }

    /// Stored records in insertion order.
    pub fn points(&self) -> impl Iterator<Item = PointRecord> + '_ {
        (0..self.len()).map(move |i| PointRecord {
            point: Point::new(self.xs[i], self.ys[i], self.zs[i]),
            color: self.colors[i],
            lifetime: self.lifetimes.get(i).copied(),
        })
    }

    pub fn contains(&self, point: &Point) -> bool {
        if self.mode.dedup {
            return self.index.contains_key(point);
        }
        self.points().any(|r| r.point == *point)
    }

    pub fn xs(&self) -> &[i64] {
        &self.xs
    }

    pub fn ys(&self) -> &[i64] {
        &self.ys
    }

    pub fn zs(&self) -> &[i64] {
        &self.zs
    }

    pub fn colors(&self) -> &[ColorTag] {
        &self.colors
    }

    /// Empty unless lifetime mode is enabled.
    pub fn lifetimes(&self) -> &[u32] {
        &self.lifetimes
    }
}

fn span(column: &[i64]) -> u64 {
    match column.iter().minmax() {
        MinMaxResult::NoElements => 0,
        MinMaxResult::OneElement(_) => 1,
        MinMaxResult::MinMax(lo, hi) => hi.abs_diff(*lo) + 1,
    }
}

fn retain_mask<T>(column: &mut Vec<T>, keep: &[bool]) {
    let mut i = 0;
    column.retain(|_| {
        let kept = keep.get(i).copied().unwrap_or(true);
        i += 1;
        kept
    });
}

// The coordinate index is derived data: it is not persisted and is rebuilt on load.
impl BorshSerialize for PointStore {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&self.mode, writer)?;
        BorshSerialize::serialize(&self.xs, writer)?;
        BorshSerialize::serialize(&self.ys, writer)?;
        BorshSerialize::serialize(&self.zs, writer)?;
        BorshSerialize::serialize(&self.colors, writer)?;
        BorshSerialize::serialize(&self.lifetimes, writer)
    }
}

impl BorshDeserialize for PointStore {
    fn deserialize_reader<R: io::Read>(reader: &mut R) -> io::Result<Self> {
        let mut store = Self {
            mode: StoreMode::deserialize_reader(reader)?,
            xs: Vec::deserialize_reader(reader)?,
            ys: Vec::deserialize_reader(reader)?,
            zs: Vec::deserialize_reader(reader)?,
            colors: Vec::deserialize_reader(reader)?,
            lifetimes: Vec::deserialize_reader(reader)?,
            index: HashMap::new(),
        };
        store.check_invariants().map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        store.rebuild_index();
        Ok(store)
    }
}
