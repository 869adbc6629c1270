use crate::{Comment, CommentId};

/// A change to a thread that the backend has already accepted
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Action {
    NewComment(Comment),
    EditComment {
        comment_id: CommentId,
        content: String,
    },
    DeleteComment(CommentId),
}
