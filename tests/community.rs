mod common;

use common::{create_user, store};
use recipe_social_store::{
    CommunityStore, Lines, NewComment, NewGroup, NewPost, NewRecipe, Repository, StoreError,
};

fn pancakes() -> NewRecipe {
    NewRecipe {
        title: "Pancakes".into(),
        summary: "Sunday breakfast".into(),
        ingredients: Lines::from("flour\nmilk\neggs"),
        instructions: Lines::from(vec!["Whisk".to_string(), "Fry".to_string()]),
        image_url: Some("https://img.example/pancakes.png".into()),
    }
}

fn bakers() -> NewGroup {
    NewGroup {
        name: "Bakers".into(),
        description: Some("Bread and pastry".into()),
        image_url: None,
    }
}

async fn post_in(store: &CommunityStore, user_id: i32, group_id: i32, title: &str) -> i32 {
    store
        .posts()
        .create(NewPost {
            title: title.into(),
            description: "see photos".into(),
            user_id,
            group_id,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn recipe_lines_are_normalized_to_lists() {
    let store = store().await;
    let recipe = store.recipes().create(pancakes()).await.unwrap();

    let loaded = store.recipes().get(recipe.id).await.unwrap();
    let view = store.recipes().serialize(&loaded);
    assert_eq!(view, loaded.view());
    assert_eq!(view.ingredients, ["flour", "milk", "eggs"]);
    assert_eq!(view.instructions, ["Whisk", "Fry"]);
    assert_eq!(view.image_url.as_deref(), Some("https://img.example/pancakes.png"));

    // Stored as given
    assert!(loaded.ingredients.is_string());
    assert!(loaded.instructions.is_array());

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["ingredients"], serde_json::json!(["flour", "milk", "eggs"]));
}

#[tokio::test]
async fn recipes_need_title_summary_and_lines() {
    let store = store().await;

    let mut untitled = pancakes();
    untitled.title = " ".into();
    let err = store.recipes().create(untitled).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)), "{err:?}");

    let mut empty = pancakes();
    empty.ingredients = Lines::from(Vec::<String>::new());
    let err = store.recipes().create(empty).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)), "{err:?}");

    assert!(store.recipes().all().await.unwrap().is_empty());
}

#[tokio::test]
async fn bookmarks_link_users_and_recipes() {
    let store = store().await;
    let alice = create_user(&store, "alice").await;
    let bob = create_user(&store, "bob").await;
    let pancakes = store.recipes().create(pancakes()).await.unwrap();
    let mut waffles = self::pancakes();
    waffles.title = "Waffles".into();
    let waffles = store.recipes().create(waffles).await.unwrap();

    let saved = store.saved_recipes();
    saved.save(alice.id, waffles.id).await.unwrap();
    saved.save(alice.id, pancakes.id).await.unwrap();
    saved.save(bob.id, pancakes.id).await.unwrap();

    let titles: Vec<_> = saved
        .recipes_for_user(alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, ["Waffles", "Pancakes"]);

    let savers: Vec<_> = store
        .recipes()
        .saved_by(pancakes.id)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(savers, ["alice", "bob"]);

    let err = saved.save(alice.id, pancakes.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");

    assert!(saved.unsave(alice.id, waffles.id).await.unwrap());
    assert!(!saved.unsave(alice.id, waffles.id).await.unwrap());
    assert_eq!(saved.recipes_for_user(alice.id).await.unwrap().len(), 1);

    let profile = store.users().profile(&alice).await.unwrap();
    assert_eq!(profile.saved_recipes.len(), 1);
    assert_eq!(profile.saved_recipes[0].ingredients, ["flour", "milk", "eggs"]);
}

#[tokio::test]
async fn bookmarking_a_missing_recipe_fails() {
    let store = store().await;
    let alice = create_user(&store, "alice").await;

    let err = store.saved_recipes().save(alice.id, 99).await.unwrap_err();
    assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");
}

#[tokio::test]
async fn group_names_are_unique() {
    let store = store().await;
    let group = store.groups().create(bakers()).await.unwrap();

    let err = store.groups().create(bakers()).await.unwrap_err();
    assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");

    let found = store.groups().find_by_name("Bakers").await.unwrap();
    assert_eq!(found.map(|g| g.id), Some(group.id));
    assert!(store.groups().find_by_name("Brewers").await.unwrap().is_none());

    let err = store
        .groups()
        .create(NewGroup {
            name: String::new(),
            description: None,
            image_url: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)), "{err:?}");
}

#[tokio::test]
async fn memberships() {
    let store = store().await;
    let alice = create_user(&store, "alice").await;
    let bob = create_user(&store, "bob").await;
    let bakers = store.groups().create(bakers()).await.unwrap();
    let brewers = store
        .groups()
        .create(NewGroup {
            name: "Brewers".into(),
            description: None,
            image_url: None,
        })
        .await
        .unwrap();

    let memberships = store.memberships();
    memberships.join(bob.id, bakers.id).await.unwrap();
    memberships.join(alice.id, bakers.id).await.unwrap();
    let brewing = memberships.join(alice.id, brewers.id).await.unwrap();

    let members: Vec<_> = memberships
        .members_of(bakers.id)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(members, ["bob", "alice"]);

    let groups: Vec<_> = memberships
        .groups_for(alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(groups, ["Bakers", "Brewers"]);

    let err = memberships.join(alice.id, bakers.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");

    assert!(memberships.leave(bob.id, bakers.id).await.unwrap());
    assert!(!memberships.leave(bob.id, bakers.id).await.unwrap());

    memberships.delete(brewing.id).await.unwrap();
    assert_eq!(memberships.groups_for(alice.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn posts_and_comments() {
    let store = store().await;
    let alice = create_user(&store, "alice").await;
    let bob = create_user(&store, "bob").await;
    let group = store.groups().create(bakers()).await.unwrap();

    let first = post_in(&store, alice.id, group.id, "Sourdough").await;
    let second = post_in(&store, bob.id, group.id, "Croissants").await;

    let in_group: Vec<_> = store
        .posts()
        .posts_in_group(group.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(in_group, [first, second]);
    assert_eq!(store.posts().posts_by_author(alice.id).await.unwrap().len(), 1);

    let comments = store.comments();
    comments
        .create(NewComment {
            content: "Looks great".into(),
            user_id: bob.id,
            post_id: first,
        })
        .await
        .unwrap();
    comments
        .create(NewComment {
            content: "Thanks!".into(),
            user_id: alice.id,
            post_id: first,
        })
        .await
        .unwrap();

    let thread: Vec<_> = comments
        .comments_on_post(first)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.content)
        .collect();
    assert_eq!(thread, ["Looks great", "Thanks!"]);
    assert_eq!(comments.comments_by_author(bob.id).await.unwrap().len(), 1);

    let err = comments
        .create(NewComment {
            content: "  ".into(),
            user_id: bob.id,
            post_id: first,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)), "{err:?}");

    // Deleting a post takes its comments along
    store.posts().delete(first).await.unwrap();
    assert!(comments.comments_on_post(first).await.unwrap().is_empty());
}

#[tokio::test]
async fn posts_must_reference_an_existing_group() {
    let store = store().await;
    let alice = create_user(&store, "alice").await;

    let err = store
        .posts()
        .create(NewPost {
            title: "Lost".into(),
            description: "no group".into(),
            user_id: alice.id,
            group_id: 404,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Integrity(_)), "{err:?}");
}

#[tokio::test]
async fn deleting_a_user_removes_their_dependents() {
    let store = store().await;
    let alice = create_user(&store, "alice").await;
    let bob = create_user(&store, "bob").await;
    let group = store.groups().create(bakers()).await.unwrap();
    let recipe = store.recipes().create(pancakes()).await.unwrap();

    store.memberships().join(alice.id, group.id).await.unwrap();
    store.saved_recipes().save(alice.id, recipe.id).await.unwrap();
    let post = post_in(&store, alice.id, group.id, "Sourdough").await;
    let bobs_post = post_in(&store, bob.id, group.id, "Rye").await;
    store
        .comments()
        .create(NewComment {
            content: "mine".into(),
            user_id: alice.id,
            post_id: bobs_post,
        })
        .await
        .unwrap();

    store.users().delete(alice.id).await.unwrap();

    let err = store.users().get(alice.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "{err:?}");
    let err = store.posts().get(post).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "{err:?}");
    assert!(store.comments().comments_on_post(bobs_post).await.unwrap().is_empty());
    assert!(store.memberships().members_of(group.id).await.unwrap().is_empty());
    assert!(store.recipes().saved_by(recipe.id).await.unwrap().is_empty());

    // Independent rows stay
    assert!(store.recipes().get(recipe.id).await.is_ok());
    assert!(store.groups().get(group.id).await.is_ok());
    assert!(store.posts().get(bobs_post).await.is_ok());
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let store = store().await;

    let err = store.recipes().get(1).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "recipe", id: 1 }), "{err:?}");

    let err = store.groups().delete(7).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "group", id: 7 }), "{err:?}");

    let err = store.comments().delete(3).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "{err:?}");
}
