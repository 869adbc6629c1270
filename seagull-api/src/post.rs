use bolero::generator::{bolero_generator, TypeGenerator};
use crate::{comment::null_as_empty, Comment, Time, UserId};

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct PostId(pub i64);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Post {
    pub id: PostId,
    pub author: UserId,
    #[serde(default)]
    pub author_name: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: Time,
    #[serde(default)]
    pub updated_at: Option<Time>,
    #[serde(default)]
    pub total_votes: i64,

    /// All the comments of this post, replies included, each with its own replies nested
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comments: Vec<Comment>,
}
