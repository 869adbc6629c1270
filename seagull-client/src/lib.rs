mod comment;
pub use comment::{CommentNode, Walk};

mod error;
pub use error::Error;

mod forest;
pub use forest::CommentForest;

mod thread;
pub use thread::Thread;

mod vote;
pub use vote::PostVotes;

mod fuzz;

pub mod api {
    pub use seagull_api::*;
}
