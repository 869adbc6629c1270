use chrono::Utc;

pub type Time = chrono::DateTime<Utc>;

mod action;
pub use action::Action;

mod auth;
pub use auth::Viewer;

mod backend;
pub use backend::Backend;

mod comment;
pub use comment::{Comment, CommentId, EditComment, NewComment};

mod error;
pub use error::Error;

mod post;
pub use post::{Post, PostId};

mod user;
pub use user::UserId;

mod vote;
pub use vote::{NewVote, VoteOutcome, VoteValue};

pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::Invalid(format!(
            "null byte in string is not allowed: {s:?}"
        )));
    }
    Ok(())
}
