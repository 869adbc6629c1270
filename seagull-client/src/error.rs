use crate::api::{self, CommentId, PostId};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("comment {0:?} is already in the thread")]
    DuplicateNode(CommentId),

    #[error("comment {comment:?} belongs to post {got:?}, not to post {expected:?}")]
    PostMismatch {
        comment: CommentId,
        expected: PostId,
        got: PostId,
    },

    #[error(transparent)]
    Api(#[from] api::Error),
}
