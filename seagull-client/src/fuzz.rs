#![cfg(test)]

//! Checks random sequences of changes against a flat list of comments with parent links,
//! which is how the backend stores them

use bolero::generator::{bolero_generator, TypeGenerator};
use chrono::TimeZone;

use std::collections::HashMap;

use crate::{
    api::{self, CommentId, PostId, UserId},
    CommentForest, CommentNode,
};

const POST: PostId = PostId(1);

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    Reply {
        // ids are drawn from a small range so that most ops hit an existing comment
        parent: Option<u8>,
        #[generator(bolero::generator::gen_with::<String>().len(0..20usize))]
        content: String,
    },
    Edit {
        target: u8,
        #[generator(bolero::generator::gen_with::<String>().len(0..20usize))]
        content: String,
    },
    Delete {
        target: u8,
    },
}

#[derive(Clone, Debug)]
struct FlatComment {
    id: CommentId,
    parent: Option<CommentId>,
    content: String,
}

#[derive(Default)]
struct Model {
    // in creation order
    comments: Vec<FlatComment>,
}

impl Model {
    fn contains(&self, id: CommentId) -> bool {
        self.comments.iter().any(|c| c.id == id)
    }

    fn delete(&mut self, id: CommentId) {
        let mut doomed = vec![id];
        while let Some(d) = doomed.pop() {
            doomed.extend(
                self.comments
                    .iter()
                    .filter(|c| c.parent == Some(d))
                    .map(|c| c.id),
            );
            self.comments.retain(|c| c.id != d);
        }
    }

    fn build(&self, parent: Option<CommentId>) -> im::Vector<CommentNode> {
        self.comments
            .iter()
            .filter(|c| c.parent == parent)
            .map(|c| CommentNode {
                children: self.build(Some(c.id)),
                ..node(c.id, &c.content)
            })
            .collect()
    }
}

fn node(id: CommentId, content: &str) -> CommentNode {
    CommentNode::new(
        id,
        POST,
        UserId(id.0 % 3),
        chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        content.to_string(),
    )
}

#[test]
fn forest_matches_flat_model() {
    bolero::check!()
        .with_generator(bolero::generator::gen_with::<Vec<FuzzOp>>().len(1..60usize))
        .cloned()
        .for_each(|ops| {
            let mut forest = CommentForest::new(POST);
            let mut model = Model::default();
            let mut next_id = 0;
            for op in ops {
                let before = forest.clone();
                match op {
                    FuzzOp::Reply { parent, content } => {
                        next_id += 1;
                        let id = CommentId(next_id);
                        let parent = parent.map(|p| CommentId(p.into()));
                        forest = forest
                            .insert_reply(parent, node(id, &content))
                            .expect("fresh ids are never duplicates");
                        match parent {
                            Some(p) if !model.contains(p) => assert_eq!(forest, before),
                            _ => model.comments.push(FlatComment {
                                id,
                                parent,
                                content,
                            }),
                        }
                    }
                    FuzzOp::Edit { target, content } => {
                        let target = CommentId(target.into());
                        forest = forest.update_content(target, &content);
                        match model.comments.iter_mut().find(|c| c.id == target) {
                            Some(c) => c.content = content,
                            None => assert_eq!(forest, before),
                        }
                    }
                    FuzzOp::Delete { target } => {
                        let target = CommentId(target.into());
                        let removed = before.find(target).map_or(0, |c| c.subtree_len());
                        forest = forest.remove_subtree(target);
                        model.delete(target);
                        assert_eq!(forest.len(), before.len() - removed);
                        assert_eq!(forest.remove_subtree(target), forest);
                    }
                }
                assert_eq!(forest.roots(), &model.build(None));
                assert_eq!(forest.len(), model.comments.len());
            }
        });
}

#[test]
fn payload_order_does_not_matter() {
    // each entry picks a parent among the earlier comments, then a sort key to shuffle with
    bolero::check!()
        .with_generator(bolero::generator::gen_with::<Vec<(u8, u16)>>().len(0..60usize))
        .cloned()
        .for_each(|entries| {
            let mut expected = HashMap::new();
            let mut payload = Vec::with_capacity(entries.len());
            for (i, &(pick, key)) in entries.iter().enumerate() {
                let id = CommentId(i as i64 + 1);
                let parent = match (i, pick % 4) {
                    (0, _) | (_, 0) => None,
                    _ => Some(CommentId((usize::from(pick) % i) as i64 + 1)),
                };
                expected.insert(id, parent);
                payload.push((
                    key,
                    api::Comment {
                        id,
                        user: UserId(1),
                        post: POST,
                        parent,
                        content: format!("c{}", id.0),
                        created_at: chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                        updated_at: None,
                        replies: Vec::new(),
                    },
                ));
            }
            payload.sort_by_key(|(key, _)| *key);
            let payload = payload.into_iter().map(|(_, c)| c).collect();

            let forest = CommentForest::from_api(POST, payload).expect("ids are all distinct");
            assert_eq!(forest.len(), expected.len());
            let mut path: Vec<CommentId> = Vec::new();
            for (depth, c) in forest.walk() {
                path.truncate(depth);
                assert_eq!(expected[&c.id], path.last().copied(), "parent of {:?}", c.id);
                path.push(c.id);
            }
        });
}
