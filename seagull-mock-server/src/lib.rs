use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use seagull_api::{
    Action, Backend, Comment, CommentId, EditComment, Error, NewComment, NewVote, Post, PostId,
    Time, UserId, Viewer, VoteOutcome, VoteValue,
};
use tokio::sync::mpsc;

/// In-memory stand-in for the forum backend
///
/// Comments are stored flat with a link to their parent, and nested on the way out.
pub struct MockServer {
    posts: BTreeMap<PostId, DbPost>,
    comments: BTreeMap<CommentId, DbComment>,
    votes: HashMap<(UserId, PostId), VoteValue>,
    feeds: Vec<mpsc::UnboundedSender<Action>>,
    next_id: i64,
    now: Time,
}

#[derive(Debug)]
struct DbPost {
    author: UserId,
    title: String,
    content: String,
    created_at: Time,
}

#[derive(Debug)]
struct DbComment {
    user: UserId,
    post: PostId,
    parent: Option<CommentId>,
    content: String,
    created_at: Time,
    updated_at: Time,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            posts: BTreeMap::new(),
            comments: BTreeMap::new(),
            votes: HashMap::new(),
            feeds: Vec::new(),
            next_id: 1,
            now: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    /// Ticks by one second at each call, so that dates are deterministic
    fn now(&mut self) -> Time {
        self.now = self.now + Duration::seconds(1);
        self.now
    }

    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn create_post(&mut self, author: UserId, title: &str, content: &str) -> PostId {
        let id = PostId(self.next_id());
        let created_at = self.now();
        self.posts.insert(
            id,
            DbPost {
                author,
                title: title.to_string(),
                content: content.to_string(),
                created_at,
            },
        );
        id
    }

    /// Return the current number of comments, across all posts
    pub fn test_num_comments(&self) -> usize {
        self.comments.len()
    }

    /// Connects as `viewer`
    pub fn backend(&mut self, viewer: Viewer) -> MockBackend<'_> {
        MockBackend {
            server: self,
            viewer,
        }
    }

    /// Every change accepted from now on will be sent there
    pub fn action_feed(&mut self) -> mpsc::UnboundedReceiver<Action> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.feeds.push(sender);
        receiver
    }

    fn relay_action(&mut self, a: Action) {
        self.feeds.retain_mut(|f| matches!(f.send(a.clone()), Ok(())));
    }

    fn comment(&self, id: CommentId) -> Result<&DbComment, Error> {
        self.comments.get(&id).ok_or(Error::NotFound)
    }

    fn render_comment(&self, id: CommentId) -> Option<Comment> {
        let c = self.comments.get(&id)?;
        Some(Comment {
            id,
            user: c.user,
            post: c.post,
            parent: c.parent,
            content: c.content.clone(),
            created_at: c.created_at,
            updated_at: Some(c.updated_at),
            replies: self
                .comments
                .iter()
                .filter(|(_, r)| r.parent == Some(id))
                .filter_map(|(rid, _)| self.render_comment(*rid))
                .collect(),
        })
    }

    fn total_votes(&self, post: PostId) -> i64 {
        self.votes
            .iter()
            .filter(|((_, p), _)| *p == post)
            .map(|(_, v)| v.delta())
            .sum()
    }

    pub fn fetch_post(&self, _viewer: &Viewer, id: PostId) -> Result<Post, Error> {
        let p = self.posts.get(&id).ok_or(Error::NotFound)?;
        Ok(Post {
            id,
            author: p.author,
            author_name: None,
            title: p.title.clone(),
            content: p.content.clone(),
            created_at: p.created_at,
            updated_at: None,
            total_votes: self.total_votes(id),
            // like the real backend, list all comments, replies included
            comments: self
                .comments
                .iter()
                .filter(|(_, c)| c.post == id)
                .filter_map(|(cid, _)| self.render_comment(*cid))
                .collect(),
        })
    }

    pub fn submit_comment(&mut self, viewer: &Viewer, c: NewComment) -> Result<Comment, Error> {
        c.validate()?;
        if c.content.trim().is_empty() {
            return Err(Error::Invalid(String::from(
                "content: This field may not be blank.",
            )));
        }
        if !self.posts.contains_key(&c.post) {
            return Err(Error::NotFound);
        }
        if let Some(parent) = c.parent {
            let p = self.comments.get(&parent).ok_or_else(|| {
                Error::Invalid(format!(
                    "parent: Invalid pk \"{}\" - object does not exist.",
                    parent.0
                ))
            })?;
            if p.post != c.post {
                return Err(Error::Invalid(String::from(
                    "The parent comment must belong to the same post.",
                )));
            }
        }
        let id = CommentId(self.next_id());
        let now = self.now();
        self.comments.insert(
            id,
            DbComment {
                user: viewer.id,
                post: c.post,
                parent: c.parent,
                content: c.content,
                created_at: now,
                updated_at: now,
            },
        );
        let created = self
            .render_comment(id)
            .expect("comment was just inserted");
        tracing::debug!(comment = ?id, post = ?created.post, "created comment");
        self.relay_action(Action::NewComment(created.clone()));
        Ok(created)
    }

    pub fn edit_comment(
        &mut self,
        viewer: &Viewer,
        id: CommentId,
        e: EditComment,
    ) -> Result<(), Error> {
        e.validate()?;
        if !viewer.can_modify(self.comment(id)?.user) {
            return Err(Error::PermissionDenied);
        }
        let now = self.now();
        let c = self.comments.get_mut(&id).ok_or(Error::NotFound)?;
        c.content = e.content.clone();
        c.updated_at = now;
        self.relay_action(Action::EditComment {
            comment_id: id,
            content: e.content,
        });
        Ok(())
    }

    /// Deleting a comment deletes all its replies too
    pub fn delete_comment(&mut self, viewer: &Viewer, id: CommentId) -> Result<(), Error> {
        if !viewer.can_modify(self.comment(id)?.user) {
            return Err(Error::PermissionDenied);
        }
        let mut doomed = vec![id];
        while let Some(d) = doomed.pop() {
            self.comments.remove(&d);
            doomed.extend(
                self.comments
                    .iter()
                    .filter(|(_, c)| c.parent == Some(d))
                    .map(|(cid, _)| *cid),
            );
        }
        self.relay_action(Action::DeleteComment(id));
        Ok(())
    }

    pub fn cast_vote(&mut self, viewer: &Viewer, v: NewVote) -> Result<VoteOutcome, Error> {
        if !self.posts.contains_key(&v.post) {
            return Err(Error::NotFound);
        }
        let key = (viewer.id, v.post);
        let (now, outcome) = VoteValue::resolve(self.votes.get(&key).copied(), v.value);
        match now {
            Some(value) => self.votes.insert(key, value),
            None => self.votes.remove(&key),
        };
        Ok(outcome)
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

/// A connection to a [`MockServer`] as one viewer
pub struct MockBackend<'a> {
    server: &'a mut MockServer,
    viewer: Viewer,
}

#[async_trait]
impl Backend for MockBackend<'_> {
    async fn fetch_post(&mut self, post: PostId) -> Result<Post, Error> {
        self.server.fetch_post(&self.viewer, post)
    }

    async fn submit_comment(&mut self, c: NewComment) -> Result<Comment, Error> {
        self.server.submit_comment(&self.viewer, c)
    }

    async fn edit_comment(&mut self, id: CommentId, e: EditComment) -> Result<(), Error> {
        self.server.edit_comment(&self.viewer, id, e)
    }

    async fn delete_comment(&mut self, id: CommentId) -> Result<(), Error> {
        self.server.delete_comment(&self.viewer, id)
    }

    async fn cast_vote(&mut self, v: NewVote) -> Result<VoteOutcome, Error> {
        self.server.cast_vote(&self.viewer, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    fn new_comment(post: PostId, parent: Option<CommentId>, content: &str) -> NewComment {
        NewComment {
            post,
            content: content.to_string(),
            parent,
        }
    }

    #[test]
    fn post_lists_every_comment_with_nested_replies() {
        let mut s = MockServer::new();
        let alice = Viewer::user(ALICE);
        let post = s.create_post(ALICE, "t", "c");
        let top = s.submit_comment(&alice, new_comment(post, None, "top")).unwrap();
        let reply = s
            .submit_comment(&alice, new_comment(post, Some(top.id), "reply"))
            .unwrap();
        assert_eq!(reply.parent, Some(top.id));
        assert!(reply.replies.is_empty());

        let p = s.fetch_post(&alice, post).unwrap();
        assert_eq!(p.comments.len(), 2);
        assert_eq!(p.comments[0].replies[0].id, reply.id);
        assert_eq!(p.comments[1].id, reply.id);
    }

    #[test]
    fn validation() {
        let mut s = MockServer::new();
        let alice = Viewer::user(ALICE);
        let post = s.create_post(ALICE, "t", "c");
        let other = s.create_post(ALICE, "t2", "c2");
        let top = s.submit_comment(&alice, new_comment(post, None, "top")).unwrap();

        assert_eq!(
            s.submit_comment(&alice, new_comment(post, None, "")),
            Err(Error::Invalid(String::from(
                "content: This field may not be blank."
            )))
        );
        assert_eq!(
            s.submit_comment(&alice, new_comment(PostId(1000), None, "x")),
            Err(Error::NotFound)
        );
        assert_eq!(
            s.submit_comment(&alice, new_comment(other, Some(top.id), "x")),
            Err(Error::Invalid(String::from(
                "The parent comment must belong to the same post."
            )))
        );
        assert!(matches!(
            s.submit_comment(&alice, new_comment(post, Some(CommentId(1000)), "x")),
            Err(Error::Invalid(_))
        ));
        assert_eq!(s.test_num_comments(), 1);
    }

    #[test]
    fn permissions_and_cascade() {
        let mut s = MockServer::new();
        let alice = Viewer::user(ALICE);
        let bob = Viewer::user(BOB);
        let post = s.create_post(ALICE, "t", "c");
        let top = s.submit_comment(&alice, new_comment(post, None, "top")).unwrap();
        let reply = s
            .submit_comment(&bob, new_comment(post, Some(top.id), "reply"))
            .unwrap();
        s.submit_comment(&alice, new_comment(post, Some(reply.id), "deeper"))
            .unwrap();

        let edit = EditComment {
            content: String::from("hijacked"),
        };
        assert_eq!(
            s.edit_comment(&bob, top.id, edit.clone()),
            Err(Error::PermissionDenied)
        );
        assert_eq!(s.delete_comment(&bob, top.id), Err(Error::PermissionDenied));
        assert_eq!(
            s.edit_comment(&alice, CommentId(1000), edit),
            Err(Error::NotFound)
        );

        s.delete_comment(&Viewer::superuser(BOB), top.id).unwrap();
        assert_eq!(s.test_num_comments(), 0);
    }

    #[test]
    fn feed_relays_accepted_changes() {
        let mut s = MockServer::new();
        let alice = Viewer::user(ALICE);
        let post = s.create_post(ALICE, "t", "c");
        let mut feed = s.action_feed();

        let top = s.submit_comment(&alice, new_comment(post, None, "top")).unwrap();
        assert!(s.submit_comment(&alice, new_comment(post, None, " ")).is_err());
        s.delete_comment(&alice, top.id).unwrap();

        assert_eq!(feed.try_recv().unwrap(), Action::NewComment(top.clone()));
        assert_eq!(feed.try_recv().unwrap(), Action::DeleteComment(top.id));
        assert!(feed.try_recv().is_err());
    }

    #[test]
    fn votes() {
        let mut s = MockServer::new();
        let post = s.create_post(ALICE, "t", "c");
        let vote = |value| NewVote { post, value };
        let alice = Viewer::user(ALICE);
        let bob = Viewer::user(BOB);

        assert_eq!(s.cast_vote(&alice, vote(VoteValue::Up)), Ok(VoteOutcome::Recorded));
        assert_eq!(s.cast_vote(&bob, vote(VoteValue::Up)), Ok(VoteOutcome::Recorded));
        assert_eq!(s.fetch_post(&alice, post).unwrap().total_votes, 2);
        assert_eq!(s.cast_vote(&bob, vote(VoteValue::Down)), Ok(VoteOutcome::Changed));
        assert_eq!(s.fetch_post(&alice, post).unwrap().total_votes, 0);
        assert_eq!(s.cast_vote(&alice, vote(VoteValue::Up)), Ok(VoteOutcome::Removed));
        assert_eq!(s.fetch_post(&alice, post).unwrap().total_votes, -1);
        assert_eq!(
            s.cast_vote(&alice, NewVote { post: PostId(1000), value: VoteValue::Up }),
            Err(Error::NotFound)
        );
    }
}
