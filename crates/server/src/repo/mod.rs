pub mod activity;
pub mod case;
pub mod client;
pub mod dashboard;
pub mod document;
pub mod hearing;
pub mod notification;
pub mod payment;
pub mod schedule;
pub mod user;

/// `%term%` pattern for ILIKE filters; blank terms disable the filter.
pub(crate) fn like_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", t.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}
