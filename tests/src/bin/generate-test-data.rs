//! Prints a random thread, in the format `seagull-ctl` reads

use chrono::{Duration, Utc};
use rand::{seq::SliceRandom, Rng};
use seagull_client::{
    api::{CommentId, PostId, UserId},
    CommentForest, CommentNode,
};

const POST_ID: i64 = 1;
const NUM_USERS: i64 = 5;
const NUM_COMMENTS: i64 = 80;

// probability for a comment to be top-level rather than a reply
const TOP_LEVEL_RATIO: f64 = 0.3;
const COMMENT_MAX_WORDS: usize = 40;

fn main() {
    let mut rng = rand::thread_rng();
    let mut forest = CommentForest::new(PostId(POST_ID));
    let mut ids = Vec::new();
    let mut date = Utc::now() - Duration::days(30);
    for id in 1..=NUM_COMMENTS {
        date = date + Duration::minutes(rng.gen_range(1..600));
        let parent = match rng.gen_bool(TOP_LEVEL_RATIO) {
            true => None,
            false => ids.choose(&mut rng).copied(),
        };
        let node = CommentNode::new(
            CommentId(id),
            PostId(POST_ID),
            UserId(rng.gen_range(1..=NUM_USERS)),
            date,
            lipsum::lipsum_words(rng.gen_range(1..COMMENT_MAX_WORDS)),
        );
        forest = forest
            .insert_reply(parent, node)
            .expect("generated ids are unique");
        ids.push(CommentId(id));
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&forest.to_api()).expect("serializing thread")
    );
}
