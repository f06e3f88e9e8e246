//! Label state for the three-button bottom bar.
//!
//! Exactly one label is highlighted at a time; its text spells the direction
//! out while the other two collapse to their glyph.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Which way the object should face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Front,
    Right,
}

impl Direction {
    /// Bar order, left to right.
    pub const ALL: [Direction; 3] = [Direction::Left, Direction::Front, Direction::Right];

    #[inline]
    fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Front => 1,
            Direction::Right => 2,
        }
    }

    fn active_text(self) -> &'static str {
        match self {
            Direction::Left => "< Left",
            Direction::Front => "· Front ·",
            Direction::Right => "Right >",
        }
    }

    fn idle_text(self) -> &'static str {
        match self {
            Direction::Left => "<",
            Direction::Front => "·",
            Direction::Right => ">",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Front => "front",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "front" => Ok(Direction::Front),
            "right" => Ok(Direction::Right),
            _ => Err(CoreError::UnknownDirection(s.to_string())),
        }
    }
}

/// 8-bit RGBA color for label text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8([255, 255, 255, 255]);
    pub const GREY: Rgba8 = Rgba8([100, 100, 100, 255]);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Label {
    pub direction: Direction,
    pub text: &'static str,
    pub color: Rgba8,
    pub active: bool,
}

impl Label {
    fn new(direction: Direction, active: bool) -> Self {
        Self {
            direction,
            text: if active {
                direction.active_text()
            } else {
                direction.idle_text()
            },
            color: if active { Rgba8::WHITE } else { Rgba8::GREY },
            active,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BottomBarLabels {
    labels: [Label; 3],
    active: Direction,
}

impl BottomBarLabels {
    /// Front starts highlighted, matching the preselected front button.
    pub fn new() -> Self {
        let mut bar = Self {
            labels: Direction::ALL.map(|d| Label::new(d, false)),
            active: Direction::Front,
        };
        bar.select(Direction::Front);
        bar
    }

    /// Highlight `direction` and dim the other two.
    pub fn select(&mut self, direction: Direction) {
        for d in Direction::ALL {
            self.labels[d.index()] = Label::new(d, d == direction);
        }
        self.active = direction;
    }

    #[inline]
    pub fn label(&self, direction: Direction) -> &Label {
        &self.labels[direction.index()]
    }

    #[inline]
    pub fn active(&self) -> Direction {
        self.active
    }

    /// Labels in bar order (Left, Front, Right).
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }
}

impl Default for BottomBarLabels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_is_active_initially() {
        let bar = BottomBarLabels::new();
        assert_eq!(bar.active(), Direction::Front);
        assert_eq!(bar.label(Direction::Front).text, "· Front ·");
        assert_eq!(bar.label(Direction::Left).text, "<");
        assert_eq!(bar.label(Direction::Right).text, ">");
    }

    #[test]
    fn exactly_one_label_active_after_each_select() {
        let mut bar = BottomBarLabels::new();
        for d in Direction::ALL {
            bar.select(d);
            let active: Vec<_> = bar.iter().filter(|l| l.active).collect();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].direction, d);
            assert_eq!(active[0].color, Rgba8::WHITE);
            assert!(
                active[0].text.to_lowercase().contains(&d.to_string()),
                "{} does not name {d}",
                active[0].text
            );
        }
    }

    #[test]
    fn inactive_labels_are_grey_glyphs() {
        let mut bar = BottomBarLabels::new();
        bar.select(Direction::Right);
        let left = bar.label(Direction::Left);
        let front = bar.label(Direction::Front);
        assert_eq!((left.text, left.color), ("<", Rgba8::GREY));
        assert_eq!((front.text, front.color), ("·", Rgba8::GREY));
        assert_eq!(bar.label(Direction::Right).text, "Right >");
    }

    #[test]
    fn iter_follows_bar_order() {
        let bar = BottomBarLabels::new();
        let order: Vec<_> = bar.iter().map(|l| l.direction).collect();
        assert_eq!(order, Direction::ALL);
    }

    #[test]
    fn parses_directions_case_insensitively() {
        assert_eq!("LEFT".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("Front".parse::<Direction>(), Ok(Direction::Front));
        assert_eq!("right".parse::<Direction>(), Ok(Direction::Right));
        assert!("back".parse::<Direction>().is_err());
    }
}
