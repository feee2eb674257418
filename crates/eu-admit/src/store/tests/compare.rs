use super::common::*;
use crate::matching::FilterState;
use crate::store::StoreError;

#[test]
fn compare_selection_is_capped() {
    let mut store = store();
    for university in ["tum", "uva", "kth", "uc3m"] {
        assert!(store.toggle_compare(&id(university), true).expect("known id"));
    }

    assert!(!store.toggle_compare(&id("bocconi"), true).expect("known id"));
    assert_eq!(store.compare_ids().len(), 4);

    assert!(store.toggle_compare(&id("uva"), true).expect("already selected"));
    assert_eq!(store.compare_ids().len(), 4);

    assert!(!store.toggle_compare(&id("uva"), false).expect("known id"));
    assert!(store.toggle_compare(&id("bocconi"), true).expect("room again"));

    let names: Vec<&str> = store
        .compared()
        .iter()
        .map(|university| university.id.as_str())
        .collect();
    assert_eq!(names, vec!["tum", "kth", "uc3m", "bocconi"]);

    store.clear_compare();
    assert!(store.compare_ids().is_empty());
}

#[test]
fn compare_rejects_unknown_university() {
    let mut store = store();
    let err = store
        .toggle_compare(&id("atlantis"), true)
        .expect_err("unknown id");
    assert!(matches!(err, StoreError::UnknownUniversity(_)));
}

#[test]
fn search_matches_program_names() {
    let store = store();
    let filter = FilterState::for_catalog(store.catalog());
    let all = store.search("", &filter);
    assert_eq!(all.len(), store.catalog().len());

    let delft = store.search("DELFT", &filter);
    assert_eq!(delft.len(), 1);
    assert_eq!(delft[0].id.as_str(), "tudelft");
}
