use crate::{
    api::{
        self, Action, Backend, CommentId, EditComment, NewComment, NewVote, PostId, Viewer,
        VoteOutcome, VoteValue,
    },
    CommentForest, CommentNode, Error, PostVotes,
};

/// The comment panel of one post, as seen by one viewer
///
/// Every change goes to the backend first, and is applied to the forest only once the
/// backend accepted it. A failed call leaves the forest as it was.
#[derive(Clone, Debug)]
pub struct Thread {
    viewer: Viewer,
    forest: CommentForest,
    votes: PostVotes,
}

impl Thread {
    pub async fn open<B: Backend>(
        backend: &mut B,
        post: PostId,
        viewer: Viewer,
    ) -> Result<Thread, Error> {
        let p = backend.fetch_post(post).await?;
        let forest = CommentForest::from_api(p.id, p.comments)?;
        tracing::debug!(post = ?p.id, num_comments = forest.len(), "opened thread");
        Ok(Thread {
            viewer,
            forest,
            votes: PostVotes::new(p.total_votes),
        })
    }

    /// The current snapshot, which stays valid whatever happens to the thread afterwards
    pub fn forest(&self) -> &CommentForest {
        &self.forest
    }

    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    pub fn votes(&self) -> PostVotes {
        self.votes
    }

    /// Whether the edit and delete buttons should be offered for comment `id`
    pub fn can_modify(&self, id: CommentId) -> bool {
        self.forest
            .find(id)
            .map_or(false, |c| self.viewer.can_modify(c.author_id))
    }

    /// Posts a reply to `parent`, or a top-level comment, and returns its new id
    pub async fn reply<B: Backend>(
        &mut self,
        backend: &mut B,
        parent: Option<CommentId>,
        content: String,
    ) -> Result<CommentId, Error> {
        let created = backend
            .submit_comment(NewComment {
                post: self.forest.post_id(),
                content,
                parent,
            })
            .await?;
        let id = created.id;
        self.forest = self
            .forest
            .insert_reply(parent, CommentNode::from(created))?;
        Ok(id)
    }

    pub async fn edit<B: Backend>(
        &mut self,
        backend: &mut B,
        id: CommentId,
        content: String,
    ) -> Result<(), Error> {
        self.check_can_modify(id)?;
        backend
            .edit_comment(
                id,
                EditComment {
                    content: content.clone(),
                },
            )
            .await?;
        self.forest = self.forest.update_content(id, &content);
        Ok(())
    }

    pub async fn delete<B: Backend>(&mut self, backend: &mut B, id: CommentId) -> Result<(), Error> {
        self.check_can_modify(id)?;
        backend.delete_comment(id).await?;
        self.forest = self.forest.remove_subtree(id);
        Ok(())
    }

    pub async fn vote<B: Backend>(
        &mut self,
        backend: &mut B,
        value: VoteValue,
    ) -> Result<VoteOutcome, Error> {
        let outcome = backend
            .cast_vote(NewVote {
                post: self.forest.post_id(),
                value,
            })
            .await?;
        self.votes = self.votes.after(outcome, value);
        Ok(outcome)
    }

    /// Applies a change another viewer made, as relayed by the backend
    ///
    /// Changes to other posts and comments already known are ignored.
    pub fn apply_remote(&mut self, action: &Action) -> Result<(), Error> {
        if let Action::NewComment(c) = action {
            if c.post != self.forest.post_id() || self.forest.contains(c.id) {
                tracing::trace!(comment = ?c.id, "ignoring already-known or foreign comment");
                return Ok(());
            }
        }
        self.forest = self.forest.apply(action)?;
        Ok(())
    }

    /// Comments missing from the local forest are refused before reaching the backend
    fn check_can_modify(&self, id: CommentId) -> Result<(), Error> {
        match self.forest.find(id) {
            None => Err(Error::Api(api::Error::NotFound)),
            Some(c) if !self.viewer.can_modify(c.author_id) => {
                Err(Error::Api(api::Error::PermissionDenied))
            }
            Some(_) => Ok(()),
        }
    }
}
