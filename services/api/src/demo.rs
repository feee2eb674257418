use crate::infra::{load_catalog, parse_date, today};
use chrono::NaiveDate;
use clap::Args;
use eu_admit::applications::{ApplicationStatus, DashboardSummary};
use eu_admit::catalog::{University, UniversityId};
use eu_admit::config::AppConfig;
use eu_admit::error::AppError;
use eu_admit::matching::{
    score_and_rank, FilterState, Page, RankOptions, ScoredUniversity, SortKey, TuitionWindow,
};
use eu_admit::profile::{Academics, GpaScale, Preferences, TestScores};
use eu_admit::store::AppStore;
use eu_admit::wizard::{Wizard, SHORTLIST_MAX, SHORTLIST_MIN};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct SearchArgs {
    /// Matches university and program names, case-insensitively
    pub(crate) term: Option<String>,
    /// Restrict to a country code (repeatable)
    #[arg(long)]
    pub(crate) country: Vec<String>,
    /// Restrict to universities offering a field (repeatable)
    #[arg(long)]
    pub(crate) field: Vec<String>,
    /// Restrict to a teaching language (repeatable)
    #[arg(long)]
    pub(crate) language: Vec<String>,
    /// Lower tuition bound in EUR
    #[arg(long)]
    pub(crate) tuition_min: Option<u32>,
    /// Upper tuition bound in EUR
    #[arg(long)]
    pub(crate) tuition_max: Option<u32>,
    /// ranking-asc, ranking-desc, tuition-asc, tuition-desc or deadline-asc
    #[arg(long, value_parser = parse_sort)]
    pub(crate) sort: Option<SortKey>,
    /// Result page (1-based)
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RecommendArgs {
    /// Preferred country code (repeatable)
    #[arg(long)]
    pub(crate) country: Vec<String>,
    /// Preferred field of study (repeatable)
    #[arg(long)]
    pub(crate) field: Vec<String>,
    /// Preferred teaching language (repeatable)
    #[arg(long)]
    pub(crate) language: Vec<String>,
    /// Minimum yearly budget in EUR
    #[arg(long)]
    pub(crate) budget_min: Option<u32>,
    /// Maximum yearly budget in EUR
    #[arg(long)]
    pub(crate) budget_max: Option<u32>,
    /// Use the onboarding wizard weights instead of the recommendation strip weights
    #[arg(long)]
    pub(crate) wizard: bool,
    /// University ids to keep in the list even when they fall outside the top results
    #[arg(long)]
    pub(crate) shortlist: Vec<String>,
    /// Number of results before shortlisted additions
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Print the score breakdown for each result
    #[arg(long)]
    pub(crate) explain: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date for the dashboard (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// How many recommendations to shortlist (clamped to the allowed shortlist size)
    #[arg(long, default_value_t = SHORTLIST_MIN)]
    pub(crate) shortlist_size: usize,
}

fn parse_sort(raw: &str) -> Result<SortKey, String> {
    SortKey::parse(raw).ok_or_else(|| format!("unknown sort key '{raw}'"))
}

fn to_set(values: Vec<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn configured_store() -> Result<AppStore, AppError> {
    let config = AppConfig::load()?;
    let catalog = Arc::new(load_catalog(&config.catalog)?);
    Ok(AppStore::in_memory(catalog).with_limits(config.matching))
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let store = configured_store()?;
    let SearchArgs {
        term,
        country,
        field,
        language,
        tuition_min,
        tuition_max,
        sort,
        page,
    } = args;

    let mut filter = FilterState::for_catalog(store.catalog());
    filter.countries = to_set(country);
    filter.fields = to_set(field);
    filter.languages = to_set(language);
    filter.tuition = TuitionWindow::new(
        tuition_min.unwrap_or(filter.tuition.min),
        tuition_max.unwrap_or(filter.tuition.max),
    );
    filter.sort = sort.unwrap_or_default();

    let term = term.unwrap_or_default();
    let results = store.search(&term, &filter);
    let page = Page::slice(&results, page, store.limits().page_size);

    println!(
        "{} universities match (sorted by {}), page {}/{}",
        page.total_items,
        filter.sort.label(),
        page.page,
        page.total_pages
    );
    for university in &page.items {
        println!("- {}", describe(university));
    }
    Ok(())
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let store = configured_store()?;
    let preferences = Preferences {
        countries: to_set(args.country),
        fields: to_set(args.field),
        languages: to_set(args.language),
        budget_min: args.budget_min,
        budget_max: args.budget_max,
    };
    let shortlist: Vec<UniversityId> = args.shortlist.iter().map(UniversityId::new).collect();

    let options = if args.wizard {
        RankOptions::wizard(&shortlist).with_limit(store.limits().wizard_limit)
    } else {
        RankOptions::strip(!preferences.is_empty()).with_limit(store.limits().strip_limit)
    };
    let options = match args.limit {
        Some(limit) => options.with_limit(limit),
        None => options,
    };

    if options.cold_start {
        println!("No preferences given; showing the best-ranked universities.");
    }
    let ranked = score_and_rank(store.catalog().universities(), &preferences, &options);
    print_ranked(&ranked, args.explain);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today: reporting_date,
        shortlist_size,
    } = args;
    let reporting_date = reporting_date.unwrap_or_else(today);
    let shortlist_size = shortlist_size.clamp(SHORTLIST_MIN, SHORTLIST_MAX);

    let mut store = configured_store()?;
    println!("EU Admit demo ({} universities)", store.catalog().len());

    println!("\nRecommendation strip before onboarding");
    print_ranked(&store.recommendations(), false);

    let mut wizard = Wizard::resume(&store);
    wizard.set_academics(Academics {
        gpa: Some(3.7),
        scale: GpaScale::FourPoint,
        tests: TestScores {
            ielts: Some(7.5),
            toefl: Some(104),
            sat: Some(1420),
        },
    });
    wizard.set_preferences(Preferences {
        countries: to_set(vec!["NL".to_string(), "DE".to_string()]),
        fields: to_set(vec![
            "Computer Science".to_string(),
            "Engineering".to_string(),
        ]),
        languages: to_set(vec!["English".to_string()]),
        budget_min: Some(0),
        budget_max: Some(12_000),
    });

    println!("\nOnboarding wizard");
    println!("- step: {}", wizard.step());
    println!("- step: {}", wizard.next()?);
    println!("- step: {}", wizard.next()?);

    let picks: Vec<UniversityId> = wizard
        .recommendations(store.catalog())
        .iter()
        .take(shortlist_size)
        .map(|scored| scored.university.id.clone())
        .collect();
    for id in &picks {
        wizard.set_shortlisted(id, true);
    }
    println!("- shortlisted {} universities", wizard.shortlist().len());
    println!("- step: {}", wizard.next()?);

    let created = wizard.confirm(&mut store)?;
    println!("- onboarding complete, {} applications opened", created.len());

    println!("\nRecommendation strip after onboarding");
    print_ranked(&store.recommendations(), true);

    if let Some(first) = created.first() {
        store.set_status(first, ApplicationStatus::Submitted)?;
    }

    println!("\nDashboard as of {reporting_date}");
    print_dashboard(&store.dashboard(reporting_date));
    Ok(())
}

fn describe(university: &University) -> String {
    let ranking = university
        .ranking
        .map(|rank| format!("#{rank}"))
        .unwrap_or_else(|| "unranked".to_string());
    let deadline = university
        .earliest_deadline()
        .map(|date| date.to_string())
        .unwrap_or_else(|| "no deadline".to_string());
    format!(
        "{} [{}] {} ({}, {}) | tuition EUR {}-{} | {}",
        university.name,
        university.id,
        ranking,
        university.city,
        university.country,
        university.tuition.min,
        university.tuition.max,
        deadline
    )
}

fn print_ranked(ranked: &[ScoredUniversity<'_>], explain: bool) {
    for (position, scored) in ranked.iter().enumerate() {
        println!(
            "{:>2}. {:>5.2}  {}",
            position + 1,
            scored.score,
            describe(scored.university)
        );
        if explain {
            for component in &scored.components {
                println!(
                    "       +{:.2} {:?}: {}",
                    component.points, component.criterion, component.notes
                );
            }
        }
    }
}

fn print_dashboard(summary: &DashboardSummary) {
    let counts = ApplicationStatus::ordered()
        .iter()
        .map(|status| format!("{} {}", summary.counts.get(*status), status.label()))
        .collect::<Vec<_>>()
        .join(" | ");
    println!("{counts}");

    for card in &summary.applications {
        println!(
            "- {} [{}] {}/{} tasks ({}%)",
            card.university_name,
            card.status_label,
            card.completed_tasks,
            card.total_tasks,
            card.progress_percent
        );
    }

    if !summary.events.is_empty() {
        println!("Upcoming");
        for event in &summary.events {
            println!(
                "  {} {:<6} {}",
                event.date,
                event.severity.label(),
                event.label
            );
        }
    }
}
