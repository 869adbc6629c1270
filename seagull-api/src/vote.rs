use bolero::generator::{bolero_generator, TypeGenerator};
use crate::{Error, PostId};

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub enum VoteValue {
    Up,
    Down,
}

impl TryFrom<i64> for VoteValue {
    type Error = Error;

    fn try_from(v: i64) -> Result<VoteValue, Error> {
        match v {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            _ => Err(Error::Invalid(String::from("Invalid vote value."))),
        }
    }
}

impl From<VoteValue> for i64 {
    fn from(v: VoteValue) -> i64 {
        v.delta()
    }
}

impl VoteValue {
    pub fn delta(self) -> i64 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
        }
    }

    /// Clicking the vote one already cast withdraws it, clicking the other one switches
    ///
    /// Returns the vote the user holds afterwards along with what happened.
    pub fn resolve(
        existing: Option<VoteValue>,
        clicked: VoteValue,
    ) -> (Option<VoteValue>, VoteOutcome) {
        match existing {
            None => (Some(clicked), VoteOutcome::Recorded),
            Some(v) if v == clicked => (None, VoteOutcome::Removed),
            Some(_) => (Some(clicked), VoteOutcome::Changed),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum VoteOutcome {
    Recorded,
    Changed,
    Removed,
}

impl VoteOutcome {
    /// Change to a post's total after `clicked` produced this outcome
    pub fn total_delta(self, clicked: VoteValue) -> i64 {
        match self {
            VoteOutcome::Recorded => clicked.delta(),
            VoteOutcome::Changed => 2 * clicked.delta(),
            VoteOutcome::Removed => -clicked.delta(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewVote {
    pub post: PostId,
    pub value: VoteValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values() {
        assert_eq!(serde_json::to_string(&VoteValue::Up).unwrap(), "1");
        assert_eq!(serde_json::to_string(&VoteValue::Down).unwrap(), "-1");
        assert_eq!(serde_json::from_str::<VoteValue>("-1").unwrap(), VoteValue::Down);
        assert!(serde_json::from_str::<VoteValue>("2").is_err());
        assert!(serde_json::from_str::<VoteValue>("0").is_err());
    }

    #[test]
    fn toggling() {
        use VoteValue::*;
        assert_eq!(
            VoteValue::resolve(None, Up),
            (Some(Up), VoteOutcome::Recorded)
        );
        assert_eq!(VoteValue::resolve(Some(Up), Up), (None, VoteOutcome::Removed));
        assert_eq!(
            VoteValue::resolve(Some(Up), Down),
            (Some(Down), VoteOutcome::Changed)
        );
        assert_eq!(VoteOutcome::Changed.total_delta(Down), -2);
        assert_eq!(VoteOutcome::Removed.total_delta(Down), 1);
    }

    #[test]
    fn resolve_keeps_totals_consistent() {
        bolero::check!()
            .with_type::<Vec<VoteValue>>()
            .cloned()
            .for_each(|clicks| {
                let mut mine = None;
                let mut total = 0;
                for c in clicks {
                    let (now, outcome) = VoteValue::resolve(mine, c);
                    total += outcome.total_delta(c);
                    mine = now;
                    assert_eq!(total, mine.map(VoteValue::delta).unwrap_or(0));
                }
            });
    }
}
