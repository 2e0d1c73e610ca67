//! Query-string plumbing shared by the list endpoints.

use chrono::Utc;
use serde::de::DeserializeOwned;

use medobs_domain::date_filter::{DateFilter, DateRange};
use medobs_domain::pagination::PageRequest;
use medobs_domain::search::search_terms;

use crate::error::MedobsError;

/// Parse the raw query string into `T`. An absent query yields `T::default()`.
pub fn parse<T: DeserializeOwned + Default>(raw: Option<String>) -> Result<T, MedobsError> {
    match raw {
        Some(raw) if !raw.is_empty() => {
            serde_qs::from_str(&raw).map_err(|_| MedobsError::MissingData)
        }
        _ => Ok(T::default()),
    }
}

pub fn page_request(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let default = PageRequest::default();
    PageRequest {
        per_page: per_page.unwrap_or(default.per_page),
        page: page.unwrap_or(default.page),
    }
    .clamped()
}

pub fn terms(q: Option<&str>) -> Vec<String> {
    q.map(search_terms).unwrap_or_default()
}

/// Resolve a `today` / `past-7-days` / `this-month` / `this-year` filter.
pub fn date_range(value: Option<&str>) -> Result<Option<DateRange>, MedobsError> {
    value
        .map(|v| {
            DateFilter::from_kebab_case(v)
                .map(|filter| filter.range(Utc::now()))
                .ok_or_else(|| MedobsError::InvalidChoice(format!("unknown date filter: {v}")))
        })
        .transpose()
}

/// Resolve `sort-by`, falling back to the default ordering on unknown values.
pub fn sort_by<S: Default>(value: Option<&str>, parse: impl Fn(&str) -> Option<S>) -> S {
    value.and_then(parse).unwrap_or_default()
}
