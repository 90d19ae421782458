use serde::{Deserialize, Serialize};

/// One of the four directional inputs the game understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in no particular bias
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Key name sent to the page for this direction
    pub fn key(&self) -> &'static str {
        match self {
            Direction::Up => "ArrowUp",
            Direction::Down => "ArrowDown",
            Direction::Left => "ArrowLeft",
            Direction::Right => "ArrowRight",
        }
    }

    /// Parse a key name back into a direction
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::Right => write!(f, "Right"),
        }
    }
}

/// Named move order a run starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Up, Left, Right, Down
    #[default]
    UpLeft,
    /// Left, Down, Right, Up
    LeftDown,
    /// Up, Right, Down, Left
    Clockwise,
}

impl Preset {
    /// Every preset, in menu order
    pub fn all() -> &'static [Preset] {
        &[Preset::UpLeft, Preset::LeftDown, Preset::Clockwise]
    }

    /// The fixed permutation this preset names
    pub fn order(&self) -> [Direction; 4] {
        use Direction::*;
        match self {
            Preset::UpLeft => [Up, Left, Right, Down],
            Preset::LeftDown => [Left, Down, Right, Up],
            Preset::Clockwise => [Up, Right, Down, Left],
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Preset::UpLeft => "Up/Left Bias",
            Preset::LeftDown => "Left/Down Bias",
            Preset::Clockwise => "Clockwise",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
