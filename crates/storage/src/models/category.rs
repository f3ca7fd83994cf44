use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Race category, selecting the championship point table paid out by final rank.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RaceCategory {
    #[default]
    Major,
    Cat1,
    Cat2,
    Cat3,
}

impl RaceCategory {
    pub const ALL: [RaceCategory; 4] = [Self::Major, Self::Cat1, Self::Cat2, Self::Cat3];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Cat1 => "cat1",
            Self::Cat2 => "cat2",
            Self::Cat3 => "cat3",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Cat1 => "Catégorie 1",
            Self::Cat2 => "Catégorie 2",
            Self::Cat3 => "Catégorie 3 (Petite)",
        }
    }

    /// Championship points by finishing position, first place at index 0.
    pub fn points(&self) -> &'static [u32] {
        match self {
            Self::Major => &[100, 75, 50, 35, 30, 25, 20, 15, 10, 5],
            Self::Cat1 => &[60, 40, 30, 25, 20, 15, 10, 5, 2, 1],
            Self::Cat2 => &[45, 35, 25, 20, 15, 10, 5, 2, 1, 0],
            Self::Cat3 => &[5, 4, 3, 2, 1, 0, 0, 0, 0, 0],
        }
    }

    /// Points for a 1-based rank. Ranks past the end of the table earn nothing.
    pub fn points_for_rank(&self, rank: usize) -> u32 {
        rank.checked_sub(1)
            .and_then(|idx| self.points().get(idx))
            .copied()
            .unwrap_or(0)
    }

    /// Resolves a stored category id, falling back to `Major` for anything unknown.
    pub fn from_id(id: &str) -> Self {
        id.parse().unwrap_or_default()
    }
}

impl fmt::Display for RaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RaceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown race category: '{}'", s))
    }
}
