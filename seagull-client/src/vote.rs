use crate::api::{VoteOutcome, VoteValue};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PostVotes {
    /// Upvotes minus downvotes
    pub total: i64,

    /// The current viewer's vote, if known
    pub mine: Option<VoteValue>,
}

impl PostVotes {
    pub fn new(total: i64) -> PostVotes {
        PostVotes { total, mine: None }
    }

    /// The tally once the backend answered `outcome` to a click on `clicked`
    pub fn after(self, outcome: VoteOutcome, clicked: VoteValue) -> PostVotes {
        PostVotes {
            total: self.total + outcome.total_delta(clicked),
            mine: match outcome {
                VoteOutcome::Removed => None,
                VoteOutcome::Recorded | VoteOutcome::Changed => Some(clicked),
            },
        }
    }
}
