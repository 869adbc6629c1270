use bolero::generator::{bolero_generator, TypeGenerator};
use serde::Deserialize;

use crate::{Error, PostId, Time, UserId};

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
pub struct CommentId(pub i64);

/// A comment as the backend delivers it
///
/// `replies` is optional on the wire: freshly created comments come without it, and
/// some endpoints send `null`. Both are read as an empty list.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub user: UserId,
    pub post: PostId,
    #[serde(default)]
    pub parent: Option<CommentId>,
    pub content: String,
    pub created_at: Time,
    #[serde(default)]
    pub updated_at: Option<Time>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub replies: Vec<Comment>,
}

pub(crate) fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub post: PostId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentId>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.content)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EditComment {
    pub content: String,
}

impl EditComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_null_replies_are_empty() {
        let fresh: Comment = serde_json::from_str(
            r#"{"id": 3, "user": 1, "post": 7, "parent": 2, "content": "hi",
                "created_at": "2024-02-01T10:00:00.123456Z"}"#,
        )
        .unwrap();
        assert!(fresh.replies.is_empty());
        assert_eq!(fresh.parent, Some(CommentId(2)));
        assert_eq!(fresh.updated_at, None);

        let null: Comment = serde_json::from_str(
            r#"{"id": 3, "user": 1, "post": 7, "parent": null, "content": "hi",
                "created_at": "2024-02-01T10:00:00Z", "replies": null}"#,
        )
        .unwrap();
        assert!(null.replies.is_empty());
        assert_eq!(null.parent, None);
    }

    #[test]
    fn nested_replies() {
        let c: Comment = serde_json::from_str(
            r#"{"id": 1, "user": 1, "post": 7, "parent": null, "content": "top",
                "created_at": "2024-02-01T10:00:00Z",
                "updated_at": "2024-02-01T10:05:00Z",
                "replies": [
                    {"id": 2, "user": 2, "post": 7, "parent": 1, "content": "reply",
                     "created_at": "2024-02-01T10:01:00Z", "replies": []}
                ]}"#,
        )
        .unwrap();
        assert_eq!(c.replies.len(), 1);
        assert_eq!(c.replies[0].id, CommentId(2));
        assert_eq!(c.replies[0].user, UserId(2));
        assert!(c.updated_at.is_some());
    }

    #[test]
    fn new_comment_omits_missing_parent() {
        let body = serde_json::to_value(NewComment {
            post: PostId(7),
            content: String::from("hello"),
            parent: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"post": 7, "content": "hello"}));
    }

    #[test]
    fn null_bytes_are_rejected() {
        let edit = EditComment {
            content: String::from("a\0b"),
        };
        assert!(matches!(edit.validate(), Err(Error::Invalid(_))));
    }
}
