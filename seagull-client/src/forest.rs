use std::collections::HashSet;

use crate::{
    api::{self, Action, CommentId, PostId},
    CommentNode, Error, Walk,
};

/// The comments of one post, as an ordered list of top-level comments with their replies
///
/// A forest is never mutated: every change returns a new forest, which shares all the
/// untouched subtrees with the previous one. Holders of an older forest keep seeing it
/// unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentForest {
    post_id: PostId,
    roots: im::Vector<CommentNode>,
}

impl CommentForest {
    pub fn new(post_id: PostId) -> CommentForest {
        CommentForest {
            post_id,
            roots: im::Vector::new(),
        }
    }

    /// Builds the forest out of the comments the backend lists for a post
    ///
    /// The backend lists every comment of the post, replies included, each with its own
    /// replies nested, in no particular order (newest first by default). Replies already
    /// present under their parent are skipped. A reply whose parent is nowhere in the payload
    /// is shown as a top-level comment.
    pub fn from_api(post_id: PostId, comments: Vec<api::Comment>) -> Result<CommentForest, Error> {
        let mut known = HashSet::new();
        let mut stack = comments.iter().collect::<Vec<_>>();
        while let Some(c) = stack.pop() {
            known.insert(c.id);
            stack.extend(c.replies.iter());
        }

        let mut forest = CommentForest::new(post_id);
        let mut pending = Vec::new();
        for c in comments {
            let parent = c.parent;
            match parent {
                None => forest = forest.insert_reply(None, CommentNode::from(c))?,
                Some(p) if known.contains(&p) => pending.push(c),
                Some(p) => {
                    tracing::warn!(
                        comment = ?c.id,
                        parent = ?p,
                        "reply parent is not in the thread, showing it at top level"
                    );
                    let node = forest.without_known(CommentNode::from(c));
                    if let Some(node) = node {
                        forest = forest.insert_reply(None, node)?;
                    }
                }
            }
        }

        // place replies once their parent is in, whatever order they came in
        loop {
            while !pending.is_empty() {
                let before = pending.len();
                let mut waiting = Vec::with_capacity(before);
                for c in pending {
                    let parent = c.parent.filter(|p| forest.contains(*p));
                    match parent {
                        Some(_) => {
                            if let Some(node) = forest.without_known(CommentNode::from(c)) {
                                forest = forest.insert_reply(parent, node)?;
                            }
                        }
                        None if forest.contains(c.id) => (),
                        None => waiting.push(c),
                    }
                }
                pending = waiting;
                if pending.len() == before {
                    break;
                }
            }
            if pending.is_empty() {
                break;
            }

            // only parent loops are left, break one of them
            let c = pending.remove(0);
            tracing::warn!(
                comment = ?c.id,
                parent = ?c.parent,
                "reply parent could not be placed, showing it at top level"
            );
            if let Some(node) = forest.without_known(CommentNode::from(c)) {
                forest = forest.insert_reply(None, node)?;
            }
        }
        Ok(forest)
    }

    /// Drops the parts of `node`'s subtree that are already in the forest, `None` if `node`
    /// itself is
    fn without_known(&self, node: CommentNode) -> Option<CommentNode> {
        let present = self.iter().map(|c| c.id).collect::<HashSet<_>>();
        if present.contains(&node.id) {
            return None;
        }
        if !node.walk().any(|(_, c)| present.contains(&c.id)) {
            return Some(node);
        }
        Some(prune(node, &present))
    }

    /// Backend representation of the top-level comments, replies nested
    pub fn to_api(&self) -> Vec<api::Comment> {
        self.roots.iter().map(|c| c.to_api(None)).collect()
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn roots(&self) -> &im::Vector<CommentNode> {
        &self.roots
    }

    pub fn find(&self, id: CommentId) -> Option<&CommentNode> {
        CommentNode::find_in(&self.roots, id)
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.find(id).is_some()
    }

    /// Total number of comments, replies included
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// All comments, depth-first
    pub fn iter(&self) -> impl Iterator<Item = &CommentNode> {
        self.walk().map(|(_, c)| c)
    }

    /// All comments, depth-first, along with their nesting depth (0 for top-level)
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self.roots.iter())
    }

    /// Adds `node` as the last reply of `parent`, or as the last top-level comment
    ///
    /// If `parent` is not in the forest, the forest is returned unchanged.
    pub fn insert_reply(
        &self,
        parent: Option<CommentId>,
        node: CommentNode,
    ) -> Result<CommentForest, Error> {
        self.check_insertable(&node)?;
        let parent = match parent {
            None => {
                let mut roots = self.roots.clone();
                roots.push_back(node);
                return Ok(self.with_roots(roots));
            }
            Some(parent) => parent,
        };
        let edited = edit_in(&self.roots, parent, &|p| {
            let mut p = p.clone();
            p.children.push_back(node.clone());
            Some(p)
        });
        match edited {
            Some(roots) => Ok(self.with_roots(roots)),
            None => {
                tracing::debug!(?parent, comment = ?node.id, "reply parent not found, ignoring");
                Ok(self.clone())
            }
        }
    }

    /// Replaces the content of comment `id`, leaving the forest unchanged if it is missing
    pub fn update_content(&self, id: CommentId, content: &str) -> CommentForest {
        let edited = edit_in(&self.roots, id, &|c| {
            Some(CommentNode {
                content: content.to_string(),
                ..c.clone()
            })
        });
        match edited {
            Some(roots) => self.with_roots(roots),
            None => {
                tracing::debug!(comment = ?id, "edited comment not found, ignoring");
                self.clone()
            }
        }
    }

    /// Removes comment `id` along with all its replies, leaving the forest unchanged if it
    /// is missing
    pub fn remove_subtree(&self, id: CommentId) -> CommentForest {
        match edit_in(&self.roots, id, &|_| None) {
            Some(roots) => self.with_roots(roots),
            None => {
                tracing::debug!(comment = ?id, "deleted comment not found, ignoring");
                self.clone()
            }
        }
    }

    pub fn apply(&self, action: &Action) -> Result<CommentForest, Error> {
        match action {
            Action::NewComment(c) => self.insert_reply(c.parent, CommentNode::from(c.clone())),
            Action::EditComment {
                comment_id,
                content,
            } => Ok(self.update_content(*comment_id, content)),
            Action::DeleteComment(id) => Ok(self.remove_subtree(*id)),
        }
    }

    fn with_roots(&self, roots: im::Vector<CommentNode>) -> CommentForest {
        CommentForest {
            post_id: self.post_id,
            roots,
        }
    }

    fn check_insertable(&self, node: &CommentNode) -> Result<(), Error> {
        let mut seen = self.iter().map(|c| c.id).collect::<HashSet<_>>();
        for (_, c) in node.walk() {
            if c.post_id != self.post_id {
                return Err(Error::PostMismatch {
                    comment: c.id,
                    expected: self.post_id,
                    got: c.post_id,
                });
            }
            if !seen.insert(c.id) {
                return Err(Error::DuplicateNode(c.id));
            }
        }
        Ok(())
    }
}

fn prune(node: CommentNode, present: &HashSet<CommentId>) -> CommentNode {
    CommentNode {
        children: node
            .children
            .iter()
            .filter(|c| !present.contains(&c.id))
            .map(|c| prune(c.clone(), present))
            .collect(),
        ..node
    }
}

/// Indices leading to the first node with id `target`, depth-first
fn path_to(nodes: &im::Vector<CommentNode>, target: CommentId) -> Option<Vec<usize>> {
    let mut path = vec![0];
    let mut levels = vec![nodes];
    loop {
        let depth = path.len() - 1;
        let level = levels[depth];
        match level.get(path[depth]) {
            Some(node) if node.id == target => return Some(path),
            Some(node) => {
                levels.push(&node.children);
                path.push(0);
            }
            None => {
                path.pop();
                levels.pop();
                *path.last_mut()? += 1;
            }
        }
    }
}

/// Finds the first node with id `target` depth-first, and replaces it with `edit`'s result,
/// or removes it if `edit` returns `None`
///
/// Ancestors of the edited node are rebuilt, everything else is shared with `nodes`.
/// Returns `None` if `target` is not there.
fn edit_in(
    nodes: &im::Vector<CommentNode>,
    target: CommentId,
    edit: &dyn Fn(&CommentNode) -> Option<CommentNode>,
) -> Option<im::Vector<CommentNode>> {
    let path = path_to(nodes, target)?;
    let (&last, ancestors) = path.split_last()?;
    let mut levels = Vec::with_capacity(ancestors.len());
    let mut level = nodes;
    for &i in ancestors {
        levels.push(level);
        level = &level[i].children;
    }

    let mut res = level.clone();
    match edit(&level[last]) {
        Some(new) => {
            res.set(last, new);
        }
        None => {
            res.remove(last);
        }
    }
    for (level, &i) in levels.into_iter().zip(ancestors.iter()).rev() {
        let mut up = level.clone();
        up.set(
            i,
            CommentNode {
                children: res,
                ..level[i].clone()
            },
        );
        res = up;
    }
    Some(res)
}
