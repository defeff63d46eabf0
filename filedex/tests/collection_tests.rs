#[path = "testutils/mod.rs"]
mod testutils;

use testutils::TestFixture;

use filedex::{AttrValue, Collection, FileRecord, QueryError, Resource};

fn names(resources: &[&FileRecord]) -> Vec<String> {
    resources
        .iter()
        .map(|r| match r.attribute("name") {
            Some(AttrValue::Str(name)) => name,
            other => panic!("unexpected name attribute: {:?}", other),
        })
        .collect()
}

#[test]
fn a_seed_constraint_filters_the_catalog() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    let mut collection =
        Collection::new(catalog, Some("name endswith txt")).expect("collection");
    assert_eq!(collection.len(catalog).expect("len"), 3);

    let mut sorted = names(&collection.resources(catalog).expect("resources"));
    sorted.sort();
    assert_eq!(sorted, vec!["a.txt", "b.txt", "c.txt"]);
}

#[test]
fn and_intersects_within_a_grouping() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    let mut collection =
        Collection::new(catalog, Some("name endswith txt")).expect("collection");
    collection.and(catalog, "name startswith a").expect("and");
    assert_eq!(collection.len(catalog).expect("len"), 1);
    assert_eq!(
        names(&collection.resources(catalog).expect("resources")),
        vec!["a.txt"]
    );
}

#[test]
fn groupings_union_and_not_subtracts() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    // (startswith a) OR (universe NOT endswith txt)
    let mut collection =
        Collection::new(catalog, Some("name startswith a")).expect("collection");
    collection.or(catalog, None).expect("or");
    collection.not(catalog, "name endswith txt").expect("not");

    // a.txt, plus the two directories (tree and sub).
    assert_eq!(collection.len(catalog).expect("len"), 3);
    let mut sorted = names(&collection.resources(catalog).expect("resources"));
    sorted.sort();
    assert_eq!(sorted, vec!["a.txt", "sub", "tree"]);
}

#[test]
fn dnf_law_holds_for_two_groupings() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    // (endswith txt AND startswith a) OR (contains b NOT contains txt)
    let mut collection =
        Collection::new(catalog, Some("name endswith txt")).expect("collection");
    collection.and(catalog, "name startswith a").expect("and");
    collection.or(catalog, Some("name contains b")).expect("or");
    collection.not(catalog, "name contains txt").expect("not");

    // First grouping: a.txt. Second: {b.txt, sub} minus {a,b,c}.txt = sub.
    let mut sorted = names(&collection.resources(catalog).expect("resources"));
    sorted.sort();
    assert_eq!(sorted, vec!["a.txt", "sub"]);
}

#[test]
fn enumeration_and_path_constraints_compose() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    let mut dirs = Collection::new(catalog, Some("kind is dir")).expect("collection");
    assert_eq!(dirs.len(catalog).expect("len"), 2);

    let constraint = format!("path below {} 0:2", fixture.rooted(""));
    let mut top = Collection::new(catalog, Some(&constraint)).expect("collection");
    // The root plus its immediate children.
    assert_eq!(top.len(catalog).expect("len"), 4);

    let mut both = Collection::new(catalog, Some("kind is dir")).expect("collection");
    both.and(catalog, &constraint).expect("and");
    let mut sorted = names(&both.resources(catalog).expect("resources"));
    sorted.sort();
    assert_eq!(sorted, vec!["sub", "tree"]);
}

#[test]
fn limit_caps_length_and_iteration() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    let mut collection = Collection::new(catalog, None).expect("collection");
    assert_eq!(collection.len(catalog).expect("len"), 5);
    assert_eq!(collection.matched(catalog).expect("matched"), 5);

    collection.set_limit(2).expect("limit");
    assert_eq!(collection.len(catalog).expect("len"), 2);
    assert_eq!(collection.resources(catalog).expect("resources").len(), 2);
    assert_eq!(collection.matched(catalog).expect("matched"), 5);

    collection.clear_limit();
    assert_eq!(collection.len(catalog).expect("len"), 5);
}

#[test]
fn limits_must_be_positive_integers() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    let mut collection = Collection::new(catalog, None).expect("collection");
    assert!(matches!(
        collection.set_limit(0),
        Err(QueryError::BadLimit(_))
    ));
    assert!(matches!(
        collection.set_limit_str("three"),
        Err(QueryError::BadLimit(_))
    ));
    assert!(matches!(
        collection.set_limit_str("0"),
        Err(QueryError::BadLimit(_))
    ));
    collection.set_limit_str("3").expect("limit");
    assert_eq!(collection.limit(), Some(3));
}

#[test]
fn sorting_follows_the_index_key_order() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    let mut collection = Collection::new(catalog, None).expect("collection");
    collection.set_sort(catalog, "name").expect("sort");
    assert_eq!(
        names(&collection.resources(catalog).expect("resources")),
        vec!["a.txt", "b.txt", "c.txt", "sub", "tree"]
    );

    collection.set_limit(2).expect("limit");
    assert_eq!(
        names(&collection.resources(catalog).expect("resources")),
        vec!["a.txt", "b.txt"]
    );
}

#[test]
fn sort_requires_an_installed_sortable_index() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    let mut collection = Collection::new(catalog, None).expect("collection");
    assert!(matches!(
        collection.set_sort(catalog, "nosuch"),
        Err(QueryError::BadSort(_))
    ));
}

#[test]
fn unknown_indices_and_searches_are_bad_queries() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    assert!(matches!(
        Collection::new(catalog, Some("nosuch is x")),
        Err(QueryError::BadQuery(_))
    ));
    assert!(matches!(
        Collection::new(catalog, Some("name nosearch x")),
        Err(QueryError::BadQuery(_))
    ));

    let mut collection = Collection::new(catalog, None).expect("collection");
    assert!(matches!(
        collection.and(catalog, "kind startswith d"),
        Err(QueryError::BadQuery(_))
    ));
    // A failed constraint leaves the collection in its prior state.
    assert_eq!(collection.len(catalog).expect("len"), 5);
}

#[test]
fn a_failed_search_argument_surfaces_at_refresh() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    // Validation accepts the search name; the malformed argument is only
    // seen when the index runs it.
    let mut collection = Collection::new(catalog, Some("name in a.txt")).expect("collection");
    assert!(matches!(
        collection.refresh(catalog),
        Err(QueryError::Index(_))
    ));
}

#[test]
fn shell_style_normalization_helpers() {
    let mut fixture = TestFixture::with_tree();
    fixture.crawl();
    let catalog = fixture.catalog();

    let mut collection = Collection::new(catalog, None).expect("collection");
    assert!(collection.last_grouping_is_match_all());
    assert!(collection.retract_universe_grouping());
    collection
        .or(catalog, Some("name endswith txt"))
        .expect("or");
    assert!(!collection.last_grouping_is_match_all());
    assert!(!collection.retract_universe_grouping());
    assert_eq!(collection.len(catalog).expect("len"), 3);
}
