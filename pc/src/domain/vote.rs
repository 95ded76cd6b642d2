//! Vote and the estimation scale

use serde::{Deserialize, Serialize};

use crate::rejection::Rejection;

/// A card on the estimation scale (1, 2, 3, 5, 8, 13, 21)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub enum VoteValue {
    One,
    Two,
    Three,
    Five,
    Eight,
    Thirteen,
    TwentyOne,
}

impl VoteValue {
    /// The full scale in ascending order
    pub const SCALE: [VoteValue; 7] = [
        VoteValue::One,
        VoteValue::Two,
        VoteValue::Three,
        VoteValue::Five,
        VoteValue::Eight,
        VoteValue::Thirteen,
        VoteValue::TwentyOne,
    ];

    /// Numeric points for this card
    pub fn points(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Five => 5,
            Self::Eight => 8,
            Self::Thirteen => 13,
            Self::TwentyOne => 21,
        }
    }

    /// Look up the card for a number of points
    pub fn from_points(points: i64) -> Result<Self, Rejection> {
        Self::SCALE
            .iter()
            .copied()
            .find(|v| i64::from(v.points()) == points)
            .ok_or_else(|| Rejection::InvalidVoteValue(points.to_string()))
    }
}

impl TryFrom<i64> for VoteValue {
    type Error = Rejection;

    fn try_from(points: i64) -> Result<Self, Self::Error> {
        Self::from_points(points)
    }
}

impl From<VoteValue> for u32 {
    fn from(value: VoteValue) -> Self {
        value.points()
    }
}

impl std::str::FromStr for VoteValue {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Rejection::EmptyInput("vote value"));
        }
        let points: i64 = trimmed
            .parse()
            .map_err(|_| Rejection::InvalidVoteValue(trimmed.to_string()))?;
        Self::from_points(points)
    }
}

impl std::fmt::Display for VoteValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.points())
    }
}

/// A cast vote. The record only exists once a participant has voted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Who cast it
    pub user_id: String,

    /// The card played
    pub value: VoteValue,
}

impl Vote {
    pub fn new(user_id: impl Into<String>, value: VoteValue) -> Self {
        Self {
            user_id: user_id.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_ascending() {
        let points: Vec<u32> = VoteValue::SCALE.iter().map(|v| v.points()).collect();
        assert_eq!(points, vec![1, 2, 3, 5, 8, 13, 21]);
    }

    #[test]
    fn test_from_points_rejects_off_scale() {
        assert_eq!(VoteValue::from_points(13).unwrap(), VoteValue::Thirteen);
        assert_eq!(VoteValue::from_points(4), Err(Rejection::InvalidVoteValue("4".to_string())));
        assert_eq!(VoteValue::from_points(0), Err(Rejection::InvalidVoteValue("0".to_string())));
        assert_eq!(VoteValue::from_points(-5), Err(Rejection::InvalidVoteValue("-5".to_string())));
    }

    #[test]
    fn test_parse_vote_value() {
        assert_eq!(" 8 ".parse::<VoteValue>().unwrap(), VoteValue::Eight);
        assert_eq!("".parse::<VoteValue>(), Err(Rejection::EmptyInput("vote value")));
        assert_eq!("7".parse::<VoteValue>(), Err(Rejection::InvalidVoteValue("7".to_string())));
        assert_eq!("abc".parse::<VoteValue>(), Err(Rejection::InvalidVoteValue("abc".to_string())));
    }

    #[test]
    fn test_serde_as_number() {
        let vote = Vote::new("u1", VoteValue::Five);
        let json = serde_json::to_string(&vote).unwrap();
        assert_eq!(json, r#"{"user_id":"u1","value":5}"#);
        let bad: Result<Vote, _> = serde_json::from_str(r#"{"user_id":"u1","value":4}"#);
        assert!(bad.is_err());
    }
}
