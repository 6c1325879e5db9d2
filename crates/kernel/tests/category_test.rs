#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Category tree tests: hierarchy queries, re-parenting, and deletion.

use diario_kernel::models::{Category, Post, UpdateCategory};
use diario_kernel::{Datastore, Error};
use diario_test_utils::{fixed_store, init_tracing, test_category, test_post};
use uuid::Uuid;

const DAY: i64 = 86_400;
const NOW: i64 = 1_700_000_000;

fn titles(categories: &[Category]) -> Vec<&str> {
    categories.iter().map(|c| c.title.as_str()).collect()
}

fn sorted_post_ids(posts: &[Post]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    out.sort_unstable();
    out
}

/// Root > (Middle > Leaf, Side); a second tree Other stands alone.
struct Forest {
    store: Datastore,
    root: Category,
    middle: Category,
    leaf: Category,
    side: Category,
    other: Category,
}

fn forest() -> Forest {
    init_tracing();
    let store = fixed_store(NOW);
    let root = test_category(&store, "Root", "root", None).unwrap();
    let middle = test_category(&store, "Middle", "middle", Some(root.id)).unwrap();
    let leaf = test_category(&store, "Leaf", "leaf", Some(middle.id)).unwrap();
    let side = test_category(&store, "Side", "side", Some(root.id)).unwrap();
    let other = test_category(&store, "Other", "other", None).unwrap();
    Forest {
        store,
        root,
        middle,
        leaf,
        side,
        other,
    }
}

// -------------------------------------------------------------------------
// Hierarchy queries
// -------------------------------------------------------------------------

#[test]
fn descendants_are_transitive() {
    let f = forest();
    assert_eq!(
        titles(&f.root.descendant_categories(&f.store, true)),
        vec!["Root", "Middle", "Leaf", "Side"]
    );
    assert_eq!(
        titles(&f.root.descendant_categories(&f.store, false)),
        vec!["Middle", "Leaf", "Side"]
    );
    assert_eq!(
        titles(&f.leaf.descendant_categories(&f.store, true)),
        vec!["Leaf"]
    );
    assert!(f.leaf.descendant_categories(&f.store, false).is_empty());
}

#[test]
fn ancestors_run_root_to_node() {
    let f = forest();
    assert_eq!(
        titles(&f.leaf.ancestor_categories(&f.store, true)),
        vec!["Root", "Middle", "Leaf"]
    );
    assert_eq!(
        titles(&f.leaf.ancestor_categories(&f.store, false)),
        vec!["Root", "Middle"]
    );
    assert!(f.other.ancestor_categories(&f.store, false).is_empty());
}

#[test]
fn list_orders_siblings_by_title() {
    let store = fixed_store(NOW);
    let root = test_category(&store, "Root", "root", None).unwrap();
    // Inserted out of title order on purpose.
    test_category(&store, "Zebra", "zebra", Some(root.id)).unwrap();
    test_category(&store, "Alpha", "alpha", Some(root.id)).unwrap();
    test_category(&store, "Mango", "mango", Some(root.id)).unwrap();

    assert_eq!(
        titles(&Category::list(&store)),
        vec!["Root", "Alpha", "Mango", "Zebra"]
    );
}

#[test]
fn rename_does_not_resort_siblings() {
    let store = fixed_store(NOW);
    let root = test_category(&store, "Root", "root", None).unwrap();
    let alpha = test_category(&store, "Alpha", "alpha", Some(root.id)).unwrap();
    test_category(&store, "Mango", "mango", Some(root.id)).unwrap();

    Category::update(
        &store,
        alpha.id,
        UpdateCategory {
            title: Some("Zulu".to_string()),
            description: None,
        },
    )
    .unwrap()
    .unwrap();

    // The renamed category stays where it was inserted.
    assert_eq!(
        titles(&Category::list(&store)),
        vec!["Root", "Zulu", "Mango"]
    );
    // New siblings sort against the new title.
    test_category(&store, "Sierra", "sierra", Some(root.id)).unwrap();
    assert_eq!(
        titles(&Category::list(&store)),
        vec!["Root", "Zulu", "Mango", "Sierra"]
    );
}

#[test]
fn find_by_slug() {
    let f = forest();
    assert_eq!(
        Category::find_by_slug(&f.store, "middle").map(|c| c.id),
        Some(f.middle.id)
    );
    assert!(Category::find_by_slug(&f.store, "missing").is_none());
}

// -------------------------------------------------------------------------
// Post aggregation
// -------------------------------------------------------------------------

#[test]
fn posts_cover_the_whole_subtree_without_duplicates() {
    let f = forest();
    let in_leaf = test_post("In Leaf", "in-leaf")
        .in_category(f.leaf.id)
        .published_at(NOW - DAY)
        .create(&f.store)
        .unwrap();
    // Tagged with two categories of the same subtree; must appear once.
    let in_both = test_post("In Both", "in-both")
        .in_category(f.middle.id)
        .in_category(f.side.id)
        .published_at(NOW - 2 * DAY)
        .create(&f.store)
        .unwrap();
    let elsewhere = test_post("Elsewhere", "elsewhere")
        .in_category(f.other.id)
        .published_at(NOW - DAY)
        .create(&f.store)
        .unwrap();

    assert_eq!(
        sorted_post_ids(&f.root.posts(&f.store, false)),
        sorted_post_ids(&[in_leaf.clone(), in_both.clone()])
    );
    assert_eq!(
        sorted_post_ids(&f.middle.posts(&f.store, false)),
        sorted_post_ids(&[in_leaf, in_both])
    );
    assert_eq!(
        sorted_post_ids(&f.other.posts(&f.store, false)),
        vec![elsewhere.id]
    );
}

#[test]
fn published_only_boundary_is_inclusive() {
    let f = forest();
    let at_now = test_post("At Now", "at-now")
        .in_category(f.root.id)
        .published_at(NOW)
        .create(&f.store)
        .unwrap();
    test_post("Later", "later")
        .in_category(f.root.id)
        .published_at(NOW + 1)
        .create(&f.store)
        .unwrap();
    test_post("Draft", "draft")
        .in_category(f.root.id)
        .create(&f.store)
        .unwrap();

    // `<=` for category listings, unlike the strict query service filter.
    assert_eq!(
        sorted_post_ids(&f.root.posts(&f.store, true)),
        vec![at_now.id]
    );
    assert_eq!(f.root.posts(&f.store, false).len(), 3);
}

// -------------------------------------------------------------------------
// Re-parenting
// -------------------------------------------------------------------------

#[test]
fn set_parent_moves_the_whole_subtree() {
    let f = forest();
    // Move Middle (with Leaf) under Other.
    let moved = Category::set_parent(&f.store, f.middle.id, Some(f.other.id)).unwrap();
    assert_eq!(moved.parent_id, Some(f.other.id));

    let other = Category::find_by_id(&f.store, f.other.id).unwrap();
    assert_eq!(
        titles(&other.descendant_categories(&f.store, true)),
        vec!["Other", "Middle", "Leaf"]
    );
    assert_eq!(
        titles(&f.root.descendant_categories(&f.store, true)),
        vec!["Root", "Side"]
    );
    // Leaf's ancestor path follows the move.
    let leaf = Category::find_by_id(&f.store, f.leaf.id).unwrap();
    assert_eq!(
        titles(&leaf.ancestor_categories(&f.store, false)),
        vec!["Other", "Middle"]
    );
}

#[test]
fn set_parent_to_root_detaches_the_subtree() {
    let f = forest();
    let moved = Category::set_parent(&f.store, f.middle.id, None).unwrap();
    assert!(moved.parent_id.is_none());
    assert_eq!(
        titles(&moved.descendant_categories(&f.store, true)),
        vec!["Middle", "Leaf"]
    );
    assert_eq!(
        titles(&f.root.descendant_categories(&f.store, true)),
        vec!["Root", "Side"]
    );
}

#[test]
fn set_parent_rejects_cycles_and_leaves_the_tree_unchanged() {
    let f = forest();
    let before = titles(&Category::list(&f.store)).join(",");

    let err = Category::set_parent(&f.store, f.root.id, Some(f.leaf.id)).unwrap_err();
    assert!(matches!(err, Error::InvalidParent(_)));
    let err = Category::set_parent(&f.store, f.root.id, Some(f.root.id)).unwrap_err();
    assert!(matches!(err, Error::InvalidParent(_)));

    assert_eq!(titles(&Category::list(&f.store)).join(","), before);
}

#[test]
fn set_parent_rejects_missing_categories() {
    let f = forest();
    let err = Category::set_parent(&f.store, Uuid::now_v7(), None).unwrap_err();
    assert_eq!(err, Error::NotFound("category"));
    let err = Category::set_parent(&f.store, f.leaf.id, Some(Uuid::now_v7())).unwrap_err();
    assert_eq!(err, Error::NotFound("category"));
}

// -------------------------------------------------------------------------
// Deletion
// -------------------------------------------------------------------------

#[test]
fn delete_removes_the_subtree_and_detaches_posts() {
    let f = forest();
    let tagged = test_post("Tagged", "tagged")
        .in_category(f.leaf.id)
        .in_category(f.other.id)
        .published_at(NOW - DAY)
        .create(&f.store)
        .unwrap();

    assert!(Category::delete(&f.store, f.middle.id).unwrap());
    assert!(Category::find_by_id(&f.store, f.middle.id).is_none());
    assert!(Category::find_by_id(&f.store, f.leaf.id).is_none());
    // Siblings and other trees survive.
    assert!(Category::find_by_id(&f.store, f.side.id).is_some());
    assert!(Category::find_by_id(&f.store, f.other.id).is_some());

    // The post lives on, minus the removed category.
    let post = Post::find_by_id(&f.store, tagged.id).unwrap();
    assert!(!post.categories.contains(&f.leaf.id));
    assert!(post.categories.contains(&f.other.id));

    assert!(!Category::delete(&f.store, f.middle.id).unwrap());
}
