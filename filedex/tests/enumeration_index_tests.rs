use filedex::{AttrValue, EnumerationIndex, Index, IndexError, Rid};

fn kinds(default: Option<&str>) -> EnumerationIndex {
    EnumerationIndex::new(["file", "dir", "link"], default).expect("enumeration index")
}

fn learn(index: &mut EnumerationIndex, rid: Rid, value: &str) {
    index
        .learn(rid, &AttrValue::Str(value.to_string()))
        .expect("learn");
}

fn rids(index: &EnumerationIndex, search: &str, arg: &str) -> Vec<Rid> {
    index
        .search(search, arg)
        .expect("search")
        .into_iter()
        .collect()
}

#[test]
fn is_returns_rids_learned_with_a_value() {
    let mut index = kinds(None);
    learn(&mut index, 1, "file");
    learn(&mut index, 2, "dir");
    learn(&mut index, 3, "file");

    assert_eq!(rids(&index, "is", "file"), vec![1, 3]);
    assert_eq!(rids(&index, "is", "dir"), vec![2]);
    assert!(rids(&index, "is", "link").is_empty());
}

#[test]
fn unset_takes_the_default() {
    let mut index = kinds(Some("file"));
    index.learn(5, &AttrValue::Unset).expect("learn default");
    assert_eq!(rids(&index, "is", "file"), vec![5]);
}

#[test]
fn unset_without_default_is_rejected() {
    let mut index = kinds(None);
    assert!(matches!(
        index.learn(5, &AttrValue::Unset),
        Err(IndexError::BadValue(_))
    ));
}

#[test]
fn values_outside_the_list_are_rejected() {
    let mut index = kinds(None);
    assert!(matches!(
        index.learn(1, &AttrValue::Str("socket".to_string())),
        Err(IndexError::BadValue(_))
    ));
    assert!(matches!(
        index.learn(1, &AttrValue::Int(3)),
        Err(IndexError::BadValue(_))
    ));
}

#[test]
fn default_must_be_in_the_allowed_list() {
    assert!(matches!(
        EnumerationIndex::new(["file", "dir"], Some("socket")),
        Err(IndexError::BadValue(_))
    ));
}

#[test]
fn in_accepts_bare_and_bracketed_lists() {
    let mut index = kinds(None);
    learn(&mut index, 1, "file");
    learn(&mut index, 2, "dir");
    learn(&mut index, 3, "link");

    assert_eq!(rids(&index, "in", "file, dir"), vec![1, 2]);
    assert_eq!(rids(&index, "in", "[file, link]"), vec![1, 3]);
    assert_eq!(rids(&index, "in", "('file', 'dir')"), vec![1, 2]);
    assert_eq!(rids(&index, "in", "[\"dir\", \"link\"]"), vec![2, 3]);
}

#[test]
fn in_requires_a_comma() {
    let index = kinds(None);
    assert!(matches!(
        index.search("in", "file"),
        Err(IndexError::BadArg(_))
    ));
    assert!(matches!(
        index.search("in", "[file]"),
        Err(IndexError::BadArg(_))
    ));
}

#[test]
fn forget_prunes_value_entries() {
    let empty = kinds(None);
    let mut index = kinds(None);
    learn(&mut index, 1, "file");
    index.forget(1).expect("forget");
    assert_eq!(index, empty);
    assert!(matches!(index.forget(1), Err(IndexError::UnknownRid(1))));
}

#[test]
fn substring_searches_are_not_offered() {
    let index = kinds(None);
    assert!(matches!(
        index.search("startswith", "f"),
        Err(IndexError::UnknownSearch { .. })
    ));
}
