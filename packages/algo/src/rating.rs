//! Rating taxonomy
//!
//! Four ordinal recall ratings with fixed labels, presentation colours and
//! SuperMemo qualities. On the wire a rating is the integer 0-3; on the keyboard
//! it is `1`-`4`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Answers faster than this are rated `Easy`
pub const EASY_RESPONSE_MS: i64 = 2000;

/// Answers faster than this (and not `Easy`) are rated `Good`
pub const GOOD_RESPONSE_MS: i64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingError {
    #[error("rating value out of range: {0} (expected 0-3)")]
    OutOfRange(u8),
    #[error("unknown rating: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Rating {
    Again = 0,
    Hard = 1,
    Good = 2,
    Easy = 3,
}

/// 评分的展示颜色 (仅用于 UI，无行为含义)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingColor {
    Red,
    Orange,
    Green,
    Blue,
}

impl RatingColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn from_u8(value: u8) -> Result<Self, RatingError> {
        match value {
            0 => Ok(Self::Again),
            1 => Ok(Self::Hard),
            2 => Ok(Self::Good),
            3 => Ok(Self::Easy),
            other => Err(RatingError::OutOfRange(other)),
        }
    }

    /// Keyboard shortcuts `1`..`4` map to Again..Easy.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(Self::Again),
            '2' => Some(Self::Hard),
            '3' => Some(Self::Good),
            '4' => Some(Self::Easy),
            _ => None,
        }
    }

    /// Derive a rating from a quiz answer and its response time.
    pub fn from_answer(is_correct: bool, response_time_ms: i64) -> Self {
        if !is_correct {
            return Self::Again;
        }
        if response_time_ms < EASY_RESPONSE_MS {
            Self::Easy
        } else if response_time_ms < GOOD_RESPONSE_MS {
            Self::Good
        } else {
            Self::Hard
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn key(self) -> char {
        match self {
            Self::Again => '1',
            Self::Hard => '2',
            Self::Good => '3',
            Self::Easy => '4',
        }
    }

    /// SuperMemo quality on the 0-5 scale.
    pub fn quality(self) -> u8 {
        match self {
            Self::Again => 0,
            Self::Hard => 3,
            Self::Good => 4,
            Self::Easy => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Again => "Again",
            Self::Hard => "Hard",
            Self::Good => "Good",
            Self::Easy => "Easy",
        }
    }

    pub fn color(self) -> RatingColor {
        match self {
            Self::Again => RatingColor::Red,
            Self::Hard => RatingColor::Orange,
            Self::Good => RatingColor::Green,
            Self::Easy => RatingColor::Blue,
        }
    }

    pub fn is_failure(self) -> bool {
        self == Self::Again
    }
}

/// 标签查询
pub fn label_of(rating: Rating) -> &'static str {
    rating.label()
}

/// 颜色查询
pub fn color_of(rating: Rating) -> RatingColor {
    rating.color()
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.value()
    }
}

impl FromStr for Rating {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "again" => Ok(Self::Again),
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            other => match other.parse::<u8>() {
                Ok(value) => Self::from_u8(value),
                Err(_) => Err(RatingError::Unknown(trimmed.to_string())),
            },
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_table() {
        let qualities: Vec<u8> = Rating::ALL.iter().map(|r| r.quality()).collect();
        assert_eq!(qualities, vec![0, 3, 4, 5]);
    }

    #[test]
    fn test_labels_and_colors() {
        assert_eq!(label_of(Rating::Again), "Again");
        assert_eq!(label_of(Rating::Easy), "Easy");
        assert_eq!(color_of(Rating::Again), RatingColor::Red);
        assert_eq!(color_of(Rating::Good).as_str(), "green");
    }

    #[test]
    fn test_wire_value_roundtrip() {
        for rating in Rating::ALL {
            assert_eq!(Rating::from_u8(rating.value()), Ok(rating));
        }
        assert_eq!(Rating::from_u8(4), Err(RatingError::OutOfRange(4)));
    }

    #[test]
    fn test_keyboard_shortcuts() {
        assert_eq!(Rating::from_key('1'), Some(Rating::Again));
        assert_eq!(Rating::from_key('4'), Some(Rating::Easy));
        assert_eq!(Rating::from_key('5'), None);
        assert_eq!(Rating::Good.key(), '3');
    }

    #[test]
    fn test_parse_names_and_numbers() {
        assert_eq!("good".parse::<Rating>(), Ok(Rating::Good));
        assert_eq!(" Hard ".parse::<Rating>(), Ok(Rating::Hard));
        assert_eq!("0".parse::<Rating>(), Ok(Rating::Again));
        assert!(matches!("9".parse::<Rating>(), Err(RatingError::OutOfRange(9))));
        assert!(matches!("meh".parse::<Rating>(), Err(RatingError::Unknown(_))));
    }

    #[test]
    fn test_serde_uses_integers() {
        assert_eq!(serde_json::to_string(&Rating::Easy).unwrap(), "3");
        let rating: Rating = serde_json::from_str("1").unwrap();
        assert_eq!(rating, Rating::Hard);
        assert!(serde_json::from_str::<Rating>("7").is_err());
    }

    #[test]
    fn test_from_answer() {
        assert_eq!(Rating::from_answer(false, 500), Rating::Again);
        assert_eq!(Rating::from_answer(true, 1500), Rating::Easy);
        assert_eq!(Rating::from_answer(true, 3000), Rating::Good);
        assert_eq!(Rating::from_answer(true, 8000), Rating::Hard);
    }
}
