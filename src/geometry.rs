//! Pixel-space geometry: axis-aligned rectangles, anchored hitboxes, and the
//! four axis directions used by resource nodes and object facing.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four axis directions, numbered the way rotation steps are:
/// 0 = up (+y), 1 = right (+x), 2 = down (-y), 3 = left (-x).
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn index(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    pub fn from_index(i: i32) -> Self {
        match i.rem_euclid(4) {
            0 => Direction::Up,
            1 => Direction::Right,
            2 => Direction::Down,
            _ => Direction::Left,
        }
    }

    pub fn opposite(self) -> Self {
        Self::from_index(self.index() as i32 + 2)
    }

    pub fn x_sign(self) -> i32 {
        match self {
            Direction::Right => 1,
            Direction::Left => -1,
            _ => 0,
        }
    }

    pub fn y_sign(self) -> i32 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
            _ => 0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle in pixel space.
///
/// A rectangle with zero width or height degrades to point semantics: it
/// intersects exactly the rectangles that contain its corner point. This is
/// what "what is exactly at this pixel" queries rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_point(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains_point(&self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.width && py < self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_point() && other.is_point() {
            return self.x == other.x && self.y == other.y;
        }
        if self.is_point() {
            return other.contains_point(self.x, self.y);
        }
        if other.is_point() {
            return self.contains_point(other.x, other.y);
        }
        !(self.x + self.width <= other.x
            || self.y + self.height <= other.y
            || self.x >= other.x + other.width
            || self.y >= other.y + other.height)
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

// ---------------------------------------------------------------------------
// Hitbox
// ---------------------------------------------------------------------------

/// An axis-aligned collision rectangle offset from an object's anchor point.
///
/// [`Hitbox::NONE`] is the "never collides" sentinel: objects carrying it are
/// skipped by every collision query and are never indexed into boundary lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hitbox {
    pub x_start: i32,
    pub y_start: i32,
    pub width: i32,
    pub height: i32,
}

impl Hitbox {
    pub const NONE: Hitbox = Hitbox::new(0, 0, 0, 0);
    pub const TILE: Hitbox = Hitbox::new(0, 0, 16, 16);
    pub const TILE2X2: Hitbox = Hitbox::new(0, 0, 32, 32);
    pub const DROPPED_ITEM: Hitbox = Hitbox::new(0, 0, 8, 8);
    pub const STANDARD_UNIT: Hitbox = Hitbox::new(3, 0, 16, 16);

    pub const fn new(x_start: i32, y_start: i32, width: i32, height: i32) -> Self {
        Self {
            x_start,
            y_start,
            width,
            height,
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Hitbox::NONE
    }

    /// The world-space rectangle this hitbox covers when anchored at the
    /// given pixel position.
    pub fn at(&self, x_pixel: i32, y_pixel: i32) -> Rect {
        Rect::new(
            x_pixel + self.x_start,
            y_pixel + self.y_start,
            self.width,
            self.height,
        )
    }

    /// Pure 90-degree rotation; `steps` is taken modulo 4. `NONE` stays `NONE`.
    pub fn rotated(&self, steps: u8) -> Hitbox {
        if self.is_none() {
            return Hitbox::NONE;
        }
        match steps % 4 {
            1 => Hitbox::new(self.y_start, -self.x_start, self.height, self.width),
            2 => Hitbox::new(-self.x_start, -self.y_start, self.width, self.height),
            3 => Hitbox::new(
                self.x_start + (self.width - self.height) / 2,
                self.y_start + (self.height - self.width) / 2,
                self.height,
                self.width,
            ),
            _ => *self,
        }
    }
}
