use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::post::{NewPost, PostChanges};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Raw value: anything that is not a positive integer means page 1.
    pub page: Option<String>,
}

// ======================= POSTS =======================

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub text: String,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CreatePostRequest {
    pub fn into_new_post(self, author_id: uuid::Uuid) -> NewPost {
        NewPost {
            author_id,
            text: self.text,
            group_id: self.group_id,
            image: self.image,
        }
    }
}

/// Absent fields are left unchanged; an explicit `null` clears `group_id`
/// or `image`.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub group_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<UpdatePostRequest> for PostChanges {
    fn from(req: UpdatePostRequest) -> Self {
        PostChanges {
            text: req.text,
            group_id: req.group_id,
            image: req.image,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

// ======================= FOLLOWS =======================

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowResponse {
    pub author: String,
    pub following: bool,
    /// False when the request was a no-op.
    pub changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_tells_absent_from_null() {
        let req: UpdatePostRequest =
            serde_json::from_str(r#"{"text": "new", "group_id": null}"#).unwrap();
        let changes: PostChanges = req.into();
        assert_eq!(changes.text.as_deref(), Some("new"));
        assert_eq!(changes.group_id, Some(None));
        assert_eq!(changes.image, None);

        let req: UpdatePostRequest = serde_json::from_str(r#"{"group_id": 3}"#).unwrap();
        assert_eq!(req.group_id, Some(Some(3)));
        assert_eq!(req.text, None);
    }
}
