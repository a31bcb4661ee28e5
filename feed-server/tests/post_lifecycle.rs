mod common;

use chrono::Duration;
use common::Fixture;
use feed_server::domain::error::DomainError;
use feed_server::domain::post::{NewPost, PostChanges};

#[tokio::test]
async fn new_post_is_stored_with_group_and_image() {
    let fx = Fixture::new();
    let author = fx.user("TestUser").await;
    let group = fx.group("test-slug").await;

    let post = fx
        .state
        .posts
        .create_post(
            NewPost::new(author.id, "second post to check it lands in the store")
                .in_group(group.id)
                .with_image("posts/small.gif"),
        )
        .await
        .unwrap();

    let stored = fx.state.posts.get_post(post.id).await.unwrap();
    assert_eq!(stored, post);
    assert_eq!(stored.group_id, Some(group.id));
    assert_eq!(stored.image.as_deref(), Some("posts/small.gif"));
}

#[tokio::test]
async fn blank_text_and_unknown_group_are_rejected() {
    let fx = Fixture::new();
    let author = fx.user("writer").await;

    let err = fx
        .state
        .posts
        .create_post(NewPost::new(author.id, "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    let err = fx
        .state
        .posts
        .create_post(NewPost::new(author.id, "a post for a missing group").in_group(404))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::GroupNotFound(_)));
}

#[tokio::test]
async fn only_the_author_edits_and_timestamp_is_kept() {
    let fx = Fixture::new();
    let author = fx.user("author").await;
    let stranger = fx.user("stranger").await;
    let post = fx.post(&author, "original text of the post").await;
    fx.clock.advance(Duration::minutes(5));

    let err = fx
        .state
        .posts
        .edit_post(
            stranger.id,
            post.id,
            PostChanges {
                text: Some("hijacked".into()),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    let edited = fx
        .state
        .posts
        .edit_post(
            author.id,
            post.id,
            PostChanges {
                text: Some("edited text from the form".into()),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.text, "edited text from the form");
    assert_eq!(edited.created_at, post.created_at);
}

#[tokio::test]
async fn only_the_author_deletes() {
    let fx = Fixture::new();
    let author = fx.user("author").await;
    let stranger = fx.user("stranger").await;
    let post = fx.post(&author, "a post that will be deleted").await;

    let err = fx
        .state
        .posts
        .delete_post(stranger.id, post.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden));

    fx.state.posts.delete_post(author.id, post.id).await.unwrap();
    let err = fx.state.posts.get_post(post.id).await.unwrap_err();
    assert!(matches!(err, DomainError::PostNotFound(id) if id == post.id));
}

#[tokio::test]
async fn comments_are_listed_oldest_first() {
    let fx = Fixture::new();
    let author = fx.user("author").await;
    let reader = fx.user("reader").await;
    let post = fx.post(&author, "a post worth commenting on").await;

    let first = fx
        .state
        .posts
        .add_comment(reader.id, post.id, "first!")
        .await
        .unwrap();
    fx.clock.advance(Duration::seconds(1));
    let second = fx
        .state
        .posts
        .add_comment(author.id, post.id, "  thanks  ")
        .await
        .unwrap();
    assert_eq!(second.text, "thanks");

    let detail = fx.state.posts.post_detail(post.id).await.unwrap();
    assert_eq!(detail.post, post);
    assert_eq!(detail.group, None);
    let ids: Vec<i64> = detail.comments.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn comment_validation() {
    let fx = Fixture::new();
    let author = fx.user("author").await;
    let post = fx.post(&author, "a post worth commenting on").await;

    let err = fx
        .state
        .posts
        .add_comment(author.id, post.id, "")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    let err = fx
        .state
        .posts
        .add_comment(author.id, 9999, "on a missing post")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PostNotFound(9999)));

    let ghost = uuid::Uuid::new_v4();
    let err = fx
        .state
        .posts
        .add_comment(ghost, post.id, "from nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound(id) if id == ghost));
}

#[tokio::test]
async fn edit_can_move_a_post_out_of_its_group() {
    let fx = Fixture::new();
    let author = fx.user("author").await;
    let group = fx.group("rust").await;
    let post = fx.group_post(&author, &group, "grouped post text").await;

    let edited = fx
        .state
        .posts
        .edit_post(
            author.id,
            post.id,
            PostChanges {
                image: Some(Some("posts/cover.png".into())),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.group_id, Some(group.id));
    assert_eq!(edited.image.as_deref(), Some("posts/cover.png"));

    let edited = fx
        .state
        .posts
        .edit_post(
            author.id,
            post.id,
            PostChanges {
                group_id: Some(None),
                image: Some(None),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.group_id, None);
    assert_eq!(edited.image, None);
    assert_eq!(edited.text, "grouped post text");

    let err = fx
        .state
        .posts
        .edit_post(
            author.id,
            post.id,
            PostChanges {
                group_id: Some(Some(404)),
                ..PostChanges::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::GroupNotFound(_)));
}
