use std::cmp::Ordering;

/// Absolute block coordinate inside a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockCoord {
    pub fn new(
        x: i32,
        y: i32,
        z: i32,
    ) -> Self {
        Self { x, y, z }
    }

    /// Coordinate of the neighbour block in the given direction.
    pub fn offset(
        &self,
        side: Side,
    ) -> Self {
        let (dx, dy, dz) = side.offset();
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }
}

/// One of the six attachment directions of a block face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Side {
    /// Unit offset vector of this direction.
    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Side::Down => (0, -1, 0),
            Side::Up => (0, 1, 0),
            Side::North => (0, 0, -1),
            Side::South => (0, 0, 1),
            Side::West => (-1, 0, 0),
            Side::East => (1, 0, 0),
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Down => Side::Up,
            Side::Up => Side::Down,
            Side::North => Side::South,
            Side::South => Side::North,
            Side::West => Side::East,
            Side::East => Side::West,
        }
    }
}

/// A part position: the block a part sits in plus the face it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartPos {
    pub pos: BlockCoord,
    pub side: Side,
}

impl PartPos {
    pub fn new(
        pos: BlockCoord,
        side: Side,
    ) -> Self {
        Self { pos, side }
    }

    /// The position a part at this face actually points at: the neighbour
    /// block on `side`, seen from its opposite face. Diagnostics timings are
    /// folded under this key so one part accumulates into one slot.
    pub fn target(&self) -> PartPos {
        PartPos {
            pos: self.pos.offset(self.side),
            side: self.side.opposite(),
        }
    }
}

/// A part position carrying an observation priority.
///
/// Identity (equality and hash) is the position alone; two entries with the
/// same position but different priorities collide in every table of the
/// engine. Priority only decides processing order within one channel pass.
#[derive(Debug, Clone, Copy)]
pub struct PrioritizedPartPos {
    pub part_pos: PartPos,
    pub priority: i32,
}

impl PrioritizedPartPos {
    pub fn new(
        part_pos: PartPos,
        priority: i32,
    ) -> Self {
        Self { part_pos, priority }
    }

    /// Processing order within a channel pass: highest priority first,
    /// position order as the stable tie-break.
    pub fn iteration_cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.part_pos.cmp(&other.part_pos))
    }
}

impl PartialEq for PrioritizedPartPos {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.part_pos == other.part_pos
    }
}

impl Eq for PrioritizedPartPos {}

impl std::hash::Hash for PrioritizedPartPos {
    fn hash<H: std::hash::Hasher>(
        &self,
        state: &mut H,
    ) {
        self.part_pos.hash(state);
    }
}
