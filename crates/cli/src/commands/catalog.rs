//! Catalog browsing and search.

use bodega_storefront::catalog::CategoryFilter;
use bodega_storefront::notice::Notice;
use bodega_storefront::state::AppState;

use super::Output;
use crate::render;

/// Products, optionally narrowed to one category.
pub fn browse<A, S>(state: &AppState<A, S>, category: Option<&str>) -> Output {
    let filter: CategoryFilter = category.and_then(|c| c.parse().ok()).unwrap_or_default();
    let products = state.catalog().filter_by_category(&filter);
    Output::text(render::products(&products))
}

pub fn categories<A, S>(state: &AppState<A, S>) -> Output {
    Output::text(render::categories(&state.catalog().categories()))
}

pub fn search<A, S>(state: &AppState<A, S>, term: &str) -> Output {
    let results = state.catalog().search(term, None);
    if results.is_empty() {
        return Output::notice(Notice::info(format!("No products match \"{}\"", term.trim())));
    }
    Output::text(render::products(&results))
}

/// Search-as-you-type suggestions, names only.
pub fn suggest<A, S>(state: &AppState<A, S>, term: &str) -> Output {
    let suggestions = state.catalog().suggest(term);
    if suggestions.is_empty() {
        return Output::default();
    }
    Output::text(
        suggestions
            .iter()
            .map(|p| format!("{:>5}  {}", p.id.to_string(), p.name))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
