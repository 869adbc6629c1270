use async_trait::async_trait;

use crate::{
    Comment, CommentId, EditComment, Error, NewComment, NewVote, Post, PostId, VoteOutcome,
};

/// The forum REST backend, as seen by one signed-in viewer
#[async_trait]
pub trait Backend {
    async fn fetch_post(&mut self, post: PostId) -> Result<Post, Error>;

    /// Returns the created comment, with its backend-assigned id
    async fn submit_comment(&mut self, c: NewComment) -> Result<Comment, Error>;

    async fn edit_comment(&mut self, id: CommentId, e: EditComment) -> Result<(), Error>;

    async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error>;

    async fn cast_vote(&mut self, v: NewVote) -> Result<VoteOutcome, Error>;
}
