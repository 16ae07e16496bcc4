//! Teams and per-team storage

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the two sides. Blue defends x < 0, red defends x > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Blue, Team::Red];

    pub fn opponent(self) -> Team {
        match self {
            Team::Blue => Team::Red,
            Team::Red => Team::Blue,
        }
    }

    /// True when `x` lies in the opponent's half
    pub fn is_offsides_at(self, x: f32) -> bool {
        match self {
            Team::Blue => x > 0.0,
            Team::Red => x < 0.0,
        }
    }

    /// Which side of the midline this team defends (-1 or +1)
    pub fn home_sign(self) -> f32 {
        match self {
            Team::Blue => -1.0,
            Team::Red => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Team::Blue => "Blue",
            Team::Red => "Red",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value held once for each team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerTeam<T> {
    pub blue: T,
    pub red: T,
}

impl<T> PerTeam<T> {
    pub fn new(blue: T, red: T) -> Self {
        Self { blue, red }
    }

    pub fn from_fn(mut f: impl FnMut(Team) -> T) -> Self {
        Self {
            blue: f(Team::Blue),
            red: f(Team::Red),
        }
    }
}

impl<T> Index<Team> for PerTeam<T> {
    type Output = T;

    fn index(&self, team: Team) -> &T {
        match team {
            Team::Blue => &self.blue,
            Team::Red => &self.red,
        }
    }
}

impl<T> IndexMut<Team> for PerTeam<T> {
    fn index_mut(&mut self, team: Team) -> &mut T {
        match team {
            Team::Blue => &mut self.blue,
            Team::Red => &mut self.red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsides_partitions_the_x_axis() {
        for x in [-25.0, -3.5, -0.001, 0.0, 0.001, 3.5, 25.0] {
            let red = Team::Red.is_offsides_at(x);
            let blue = Team::Blue.is_offsides_at(x);
            assert!(!(red && blue), "both offsides at x={x}");
            if x < 0.0 {
                assert!(red && !blue);
            } else if x > 0.0 {
                assert!(blue && !red);
            } else {
                assert!(!red && !blue);
            }
        }
    }

    #[test]
    fn per_team_indexing() {
        let mut counts = PerTeam::new(1, 2);
        counts[Team::Red] += 5;
        assert_eq!(counts[Team::Blue], 1);
        assert_eq!(counts[Team::Red], 7);
        assert_eq!(Team::Blue.opponent(), Team::Red);
    }
}
