use crate::api::{self, CommentId, PostId, Time, UserId};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub id: CommentId,
    pub content: String,
    pub author_id: UserId,
    pub post_id: PostId,

    /// Only used for display
    pub created_at: Time,

    /// Replies, in the order they were posted
    pub children: im::Vector<CommentNode>,
}

impl CommentNode {
    pub fn new(
        id: CommentId,
        post_id: PostId,
        author_id: UserId,
        created_at: Time,
        content: String,
    ) -> CommentNode {
        CommentNode {
            id,
            content,
            author_id,
            post_id,
            created_at,
            children: im::Vector::new(),
        }
    }

    pub fn find_in<'a>(
        comments: &'a im::Vector<CommentNode>,
        id: CommentId,
    ) -> Option<&'a CommentNode> {
        Walk::new(comments.iter())
            .map(|(_, c)| c)
            .find(|c| c.id == id)
    }

    /// This node and all of its descendants, depth-first
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(std::iter::once(self))
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        self.walk().count()
    }

    /// Backend representation of this subtree, `parent` being this node's parent
    ///
    /// `updated_at` is not tracked client-side and comes out as `None`. Recurses once per
    /// nesting level, like the conversion from `api::Comment`.
    pub fn to_api(&self, parent: Option<CommentId>) -> api::Comment {
        api::Comment {
            id: self.id,
            user: self.author_id,
            post: self.post_id,
            parent,
            content: self.content.clone(),
            created_at: self.created_at,
            updated_at: None,
            replies: self
                .children
                .iter()
                .map(|c| c.to_api(Some(self.id)))
                .collect(),
        }
    }
}

impl From<api::Comment> for CommentNode {
    fn from(c: api::Comment) -> CommentNode {
        CommentNode {
            id: c.id,
            content: c.content,
            author_id: c.user,
            post_id: c.post,
            created_at: c.created_at,
            children: c.replies.into_iter().map(CommentNode::from).collect(),
        }
    }
}

/// Depth-first pre-order traversal, yielding each node with its depth
///
/// Uses an explicit stack, so arbitrarily deep threads do not grow the call stack.
pub struct Walk<'a> {
    stack: Vec<(usize, &'a CommentNode)>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new<I>(roots: I) -> Walk<'a>
    where
        I: DoubleEndedIterator<Item = &'a CommentNode>,
    {
        Walk {
            stack: roots.rev().map(|n| (0, n)).collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a CommentNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|c| (depth + 1, c)));
        Some((depth, node))
    }
}
