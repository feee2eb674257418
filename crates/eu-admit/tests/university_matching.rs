//! End-to-end matching scenarios over catalogs loaded through the public loaders.
//!
//! Both engines are exercised only through `eu_admit`'s public API so the CSV/JSON boundary
//! normalization, filtering, and scoring are validated together.

mod common {
    use eu_admit::catalog::Catalog;

    pub(super) const HEADER: &str =
        "id,name,city,country,ranking,tuition_min,tuition_max,fields,languages,programs,deadlines\n";

    /// The two-university catalog used by the worked examples.
    pub(super) fn pair() -> Catalog {
        let csv = format!(
            "{HEADER}A,Alpha Technical University,Berlin,DE,10,0,5000,CS,English,BSc Informatics|BSc,Main|2026-03-01\n\
B,Beta Law School,Paris,FR,50,8000,12000,Law,French,LLB Law|LLB,\n"
        );
        Catalog::from_csv_reader(csv.as_bytes()).expect("catalog loads")
    }
}

use std::collections::BTreeSet;

use common::*;
use eu_admit::catalog::{Catalog, University};
use eu_admit::matching::{
    filter_and_sort, score_and_rank, FilterState, RankOptions, SortKey, TuitionWindow,
};
use eu_admit::profile::Preferences;

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn ids<'a>(universities: impl IntoIterator<Item = &'a University>) -> Vec<&'a str> {
    universities
        .into_iter()
        .map(|university| university.id.as_str())
        .collect()
}

#[test]
fn country_filter_keeps_only_selected_country() {
    let catalog = pair();
    let filter = FilterState {
        countries: set(&["DE"]),
        tuition: TuitionWindow::new(0, 20_000),
        ..FilterState::default()
    };

    let results = filter_and_sort(catalog.universities(), "", &filter);
    assert_eq!(ids(results), vec!["A"]);
}

#[test]
fn wizard_weights_rank_the_worked_example() {
    let catalog = pair();
    let preferences = Preferences {
        countries: set(&["DE"]),
        fields: set(&["CS"]),
        languages: set(&["English"]),
        budget_min: Some(0),
        budget_max: Some(6000),
    };

    let ranked = score_and_rank(
        catalog.universities(),
        &preferences,
        &RankOptions::wizard(&[]),
    );

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].university.id.as_str(), "A");
    assert!((ranked[0].score - 9.95).abs() < 1e-9);
    assert_eq!(ranked[1].university.id.as_str(), "B");
    assert!((ranked[1].score - 0.75).abs() < 1e-9);
}

#[test]
fn inverted_tuition_window_is_swapped() {
    let catalog = pair();
    let filter = FilterState {
        tuition: TuitionWindow::new(10_000, 8000),
        ..FilterState::default()
    };

    let results = filter_and_sort(catalog.universities(), "", &filter);
    assert_eq!(ids(results), vec!["B"]);
}

#[test]
fn program_names_are_searchable() {
    let catalog = pair();
    let filter = FilterState::for_catalog(&catalog);

    assert_eq!(
        ids(filter_and_sort(catalog.universities(), "informatics", &filter)),
        vec!["A"]
    );
    assert_eq!(
        ids(filter_and_sort(catalog.universities(), "   ", &filter)),
        vec!["A", "B"]
    );
}

#[test]
fn builtin_catalog_default_filter_returns_everything_by_ranking() {
    let catalog = Catalog::builtin().expect("builtin catalog");
    let filter = FilterState::for_catalog(&catalog);

    let results = filter_and_sort(catalog.universities(), "", &filter);
    assert_eq!(results.len(), catalog.len());

    let rankings: Vec<u32> = results.iter().filter_map(|u| u.ranking).collect();
    assert!(rankings.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(results.last().map(|u| u.id.as_str()), Some("charles"));
}

#[test]
fn deadline_sort_puts_open_ended_universities_last() {
    let catalog = Catalog::builtin().expect("builtin catalog");
    let filter = FilterState {
        sort: SortKey::DeadlineAsc,
        ..FilterState::for_catalog(&catalog)
    };

    let results = filter_and_sort(catalog.universities(), "", &filter);
    assert_eq!(results.first().map(|u| u.id.as_str()), Some("bocconi"));
    assert_eq!(results.last().map(|u| u.id.as_str()), Some("uni-wien"));
}

#[test]
fn legacy_language_field_is_normalized_at_load() {
    let catalog = Catalog::builtin().expect("builtin catalog");
    let filter = FilterState {
        languages: set(&["German"]),
        ..FilterState::for_catalog(&catalog)
    };

    let results = filter_and_sort(catalog.universities(), "", &filter);
    assert!(ids(results).contains(&"lmu"));
}
