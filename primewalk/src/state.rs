use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::error::InternalError;

/// Whether the depth axis takes part in the walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimensions {
    #[default]
    Planar,
    Spatial,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, BorshSerialize, BorshDeserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0, z: 0 };

    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    pub fn planar(x: i64, y: i64) -> Self {
        Self { x, y, z: 0 }
    }

    /// Moves one step along `heading`. The depth component only applies to spatial walks.
    pub fn advance(&mut self, heading: Heading, dims: Dimensions) {
        self.x += i64::from(heading.dx);
        self.y += i64::from(heading.dy);
        if dims == Dimensions::Spatial {
            self.z += i64::from(heading.dz);
        }
    }
}

/// Unit step applied to the position each iteration.
///
/// `(dx, dy)` is always one of the four cardinal directions; `dz` is an independent
/// depth step in `{-1, 0, 1}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Heading {
    pub dx: i8,
    pub dy: i8,
    pub dz: i8,
}

impl Default for Heading {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl Heading {
    pub const INITIAL: Heading = Heading { dx: 1, dy: 0, dz: 1 };

    pub fn is_canonical(&self) -> bool {
        matches!((self.dx, self.dy), (1, 0) | (0, 1) | (-1, 0) | (0, -1)) && (-1..=1).contains(&self.dz)
    }

    pub fn validate(self) -> Result<Self, InternalError> {
        if self.is_canonical() {
            Ok(self)
        } else {
            Err(InternalError::NonCanonicalHeading { dx: self.dx, dy: self.dy, dz: self.dz })
        }
    }

    /// Quarter turn counter-clockwise in the (x, y) plane: E → N → W → S → E.
    pub fn rotated_ccw(self) -> Result<Self, InternalError> {
        let (dx, dy) = match (self.dx, self.dy) {
            (1, 0) => (0, 1),
            (0, 1) => (-1, 0),
            (-1, 0) => (0, -1),
            (0, -1) => (1, 0),
            _ => return Err(InternalError::NonCanonicalHeading { dx: self.dx, dy: self.dy, dz: self.dz }),
        };
        Ok(Self { dx, dy, dz: self.dz })
    }

    /// Next depth step on the cycle 0 → 1 → -1 → 0.
    pub fn next_depth(self) -> Self {
        let dz = match self.dz {
            0 => 1,
            1 => -1,
            _ => 0,
        };
        Self { dz, ..self }
    }
}

/// Alternating modifier, flipped on every iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    pub fn flip(self) -> Self {
        match self {
            Sign::Plus => Sign::Minus,
            Sign::Minus => Sign::Plus,
        }
    }

    pub fn value(self) -> i64 {
        match self {
            Sign::Plus => 1,
            Sign::Minus => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, BorshSerialize, BorshDeserialize)]
pub struct CaseStats {
    pub primes: u64,
    pub composites: u64,
    pub iterations: u64,
}

/// Mutable walk state of a single case.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CaseState {
    pub position: Point,
    pub heading: Heading,
    pub sign: Sign,
    pub was_prime_previous: bool,
    /// Most recent `n` fed through the turn machine.
    pub last_value: i64,
    pub stats: CaseStats,
}

impl CaseState {
    pub fn new() -> Self {
        Self::default()
    }
}
