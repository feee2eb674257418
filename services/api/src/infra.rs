use chrono::{Local, NaiveDate};
use eu_admit::catalog::Catalog;
use eu_admit::config::{AppConfig, CatalogConfig, StorageConfig};
use eu_admit::error::AppError;
use eu_admit::store::{AppStore, FileStorage, MemoryStorage, StateStorage};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The one app store shared by every request handler.
pub(crate) type SharedStore = Arc<RwLock<AppStore>>;

pub(crate) fn load_catalog(config: &CatalogConfig) -> Result<Catalog, AppError> {
    match &config.seed_path {
        Some(path) => Ok(Catalog::from_path(path)?),
        None => {
            let catalog = Catalog::builtin()?;
            tracing::info!(universities = catalog.len(), "builtin catalog loaded");
            Ok(catalog)
        }
    }
}

pub(crate) fn state_storage(config: &StorageConfig) -> Arc<dyn StateStorage> {
    match &config.data_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "persisting state to disk");
            Arc::new(FileStorage::new(dir))
        }
        None => Arc::new(MemoryStorage::new()),
    }
}

pub(crate) fn build_store(config: &AppConfig) -> Result<AppStore, AppError> {
    let catalog = Arc::new(load_catalog(&config.catalog)?);
    let storage = state_storage(&config.storage);
    Ok(AppStore::new(catalog, storage).with_limits(config.matching))
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_reports_input() {
        assert_eq!(
            parse_date(" 2026-01-15 "),
            Ok(NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date"))
        );
        let err = parse_date("15/01/2026").expect_err("wrong format");
        assert!(err.contains("15/01/2026"));
    }

    #[test]
    fn missing_catalog_file_is_an_error() {
        let config = CatalogConfig {
            seed_path: Some("/nonexistent/universities.json".into()),
        };
        assert!(matches!(load_catalog(&config), Err(AppError::Catalog(_))));
    }

    #[test]
    fn unset_seed_path_uses_builtin_catalog() {
        let catalog = load_catalog(&CatalogConfig::default()).expect("builtin catalog");
        assert_eq!(catalog.len(), 12);
        assert!(catalog.get(&eu_admit::catalog::UniversityId::new("kth")).is_some());
    }
}
