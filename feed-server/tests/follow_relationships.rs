mod common;

use common::Fixture;
use feed_server::domain::error::DomainError;
use futures_util::future::join_all;

#[tokio::test]
async fn subscribe_is_idempotent() {
    let fx = Fixture::new();
    let reader = fx.user("follow_test_user").await;
    let author = fx.user("TestUser").await;

    assert!(fx.state.follows.subscribe(reader.id, author.id).await.unwrap());
    assert!(!fx.state.follows.subscribe(reader.id, author.id).await.unwrap());

    let edges = fx.store.follows().await;
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].user_id, reader.id);
    assert_eq!(edges[0].author_id, author.id);
    assert!(fx.state.follows.is_following(reader.id, author.id).await.unwrap());
    // edges are directed
    assert!(!fx.state.follows.is_following(author.id, reader.id).await.unwrap());
}

#[tokio::test]
async fn unsubscribe_without_edge_changes_nothing() {
    let fx = Fixture::new();
    let reader = fx.user("reader").await;
    let author = fx.user("author").await;
    let other = fx.user("other").await;
    fx.state.follows.subscribe(reader.id, other.id).await.unwrap();
    let before = fx.store.follows().await;

    assert!(!fx.state.follows.unsubscribe(reader.id, author.id).await.unwrap());

    assert_eq!(fx.store.follows().await, before);
}

#[tokio::test]
async fn follow_then_unfollow_round_trip() {
    let fx = Fixture::new();
    let reader = fx.user("follow_test_user").await;
    let author = fx.user("TestUser").await;

    assert!(fx.state.follows.follow_username(reader.id, "TestUser").await.unwrap());
    assert_eq!(fx.store.follows().await.len(), 1);

    assert!(fx.state.follows.unfollow_username(reader.id, "TestUser").await.unwrap());
    assert!(fx.store.follows().await.is_empty());
    assert!(!fx.state.follows.unfollow_username(reader.id, "TestUser").await.unwrap());

    // following again after an unfollow creates a fresh edge
    assert!(fx.state.follows.subscribe(reader.id, author.id).await.unwrap());
}

#[tokio::test]
async fn self_follow_is_rejected() {
    let fx = Fixture::new();
    let narcissus = fx.user("narcissus").await;

    let err = fx
        .state
        .follows
        .subscribe(narcissus.id, narcissus.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SelfFollowRejected));

    let err = fx
        .state
        .follows
        .follow_username(narcissus.id, "narcissus")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SelfFollowRejected));
    assert!(fx.store.follows().await.is_empty());
}

#[tokio::test]
async fn unknown_username_is_not_found() {
    let fx = Fixture::new();
    let reader = fx.user("reader").await;

    let err = fx
        .state
        .follows
        .follow_username(reader.id, "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AuthorNotFound(_)));

    let err = fx
        .state
        .follows
        .unfollow_username(reader.id, "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AuthorNotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_subscribes_leave_a_single_edge() {
    let fx = Fixture::new();
    let reader = fx.user("reader").await;
    let author = fx.user("author").await;

    let (reader_id, author_id) = (reader.id, author.id);

    let tasks = (0..16).map(|_| {
        let follows = fx.state.follows.clone();
        tokio::spawn(async move { follows.subscribe(reader_id, author_id).await })
    });
    let results: Vec<bool> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|inserted| **inserted).count(), 1);
    assert_eq!(fx.store.follows().await.len(), 1);
}

#[tokio::test]
async fn no_sequence_of_operations_duplicates_an_edge() {
    let fx = Fixture::new();
    let a = fx.user("a").await;
    let b = fx.user("b").await;
    let c = fx.user("c").await;

    let ops = [
        (a.id, b.id, true),
        (a.id, b.id, true),
        (a.id, c.id, true),
        (a.id, b.id, false),
        (a.id, b.id, true),
        (b.id, a.id, true),
        (a.id, b.id, true),
    ];
    for (follower, author, subscribe) in ops {
        if subscribe {
            fx.state.follows.subscribe(follower, author).await.unwrap();
        } else {
            fx.state.follows.unsubscribe(follower, author).await.unwrap();
        }
    }

    let edges = fx.store.follows().await;
    let mut pairs: Vec<_> = edges.iter().map(|f| (f.user_id, f.author_id)).collect();
    let total = pairs.len();
    pairs.sort();
    pairs.dedup();
    assert_eq!(pairs.len(), total);
    assert_eq!(total, 3);
}

#[tokio::test]
async fn edges_need_existing_users_on_both_ends() {
    let fx = Fixture::new();
    let reader = fx.user("reader").await;
    let ghost = uuid::Uuid::new_v4();

    let err = fx
        .state
        .follows
        .subscribe(reader.id, ghost)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AuthorNotFound(_)));
    assert!(err.is_not_found());

    let err = fx
        .state
        .follows
        .subscribe(ghost, reader.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound(id) if id == ghost));

    assert!(fx.store.follows().await.is_empty());
}
