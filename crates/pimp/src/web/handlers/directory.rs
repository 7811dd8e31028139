//! Directory and search handlers

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};

use super::{non_blank, page_number};
use crate::domain::{Category, CATEGORIES};
use crate::error::{Error, Result};
use crate::storage::{BusinessQuery, BusinessSort};
use crate::web::layout::Layout;
use crate::web::session::{build_url, Visitor};
use crate::web::state::AppState;
use crate::web::views::directory::{
    DirectoryParams, DirectoryTemplate, SearchParams, SearchTemplate,
};
use crate::web::views::{BusinessCard, FilterLink, Pager, SelectOption};
use crate::validation::checkbox;

/// Minimum-rating choices on the search page.
const RATING_FILTERS: [(&str, &str); 4] = [
    ("", "Any rating"),
    ("3", "3 stars and up"),
    ("4", "4 stars and up"),
    ("4.5", "4.5 stars and up"),
];

/// Handler for the directory page.
pub async fn directory(
    State(state): State<AppState>,
    visitor: Visitor,
    Query(params): Query<DirectoryParams>,
) -> Result<Response> {
    let category = match non_blank(params.category.as_deref()) {
        Some(slug) => Some(Category::find(&slug).ok_or_else(|| Error::not_found("category", &slug))?),
        None => None,
    };
    let letter = non_blank(params.letter.as_deref())
        .and_then(|l| l.chars().next())
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase());
    let sort = BusinessSort::parse_or(params.sort.as_deref(), BusinessSort::Name);

    let query = BusinessQuery {
        category: category.map(|c| c.slug.to_string()),
        letter,
        sort,
        page: page_number(params.page.as_deref()),
        ..BusinessQuery::new(state.config().site.per_page)
    };
    let (results, initials) = {
        let storage = state.storage()?;
        (storage.search_businesses(&query)?, storage.name_initials()?)
    };

    let category_slug = category.map_or("", |c| c.slug);
    let letter_param = letter.map(String::from).unwrap_or_default();
    let sort_param = sort.as_str();

    let mut category_links = vec![FilterLink {
        label: "All".to_string(),
        href: build_url("/directory", &[("letter", &letter_param), ("sort", sort_param)]),
        active: category.is_none(),
    }];
    category_links.extend(CATEGORIES.iter().map(|c| FilterLink {
        label: c.name.to_string(),
        href: build_url(
            "/directory",
            &[("category", c.slug), ("letter", &letter_param), ("sort", sort_param)],
        ),
        active: c.slug == category_slug,
    }));

    let mut letter_links = vec![FilterLink {
        label: "All".to_string(),
        href: build_url("/directory", &[("category", category_slug), ("sort", sort_param)]),
        active: letter.is_none(),
    }];
    letter_links.extend(initials.into_iter().map(|initial| {
        let value = initial.to_string();
        FilterLink {
            href: build_url(
                "/directory",
                &[("category", category_slug), ("letter", &value), ("sort", sort_param)],
            ),
            active: Some(initial) == letter,
            label: value,
        }
    }));

    let heading = match (category, letter) {
        (Some(c), Some(l)) => format!("{}: {l}", c.name),
        (Some(c), None) => c.name.to_string(),
        (None, Some(l)) => format!("Businesses starting with {l}"),
        (None, None) => "Business directory".to_string(),
    };
    let pager = Pager::new(
        &results.pagination,
        "/directory",
        &[("category", category_slug), ("letter", &letter_param), ("sort", sort_param)],
    );

    Ok(DirectoryTemplate {
        layout: Layout::new(
            state.config(),
            &visitor,
            &heading,
            "Browse every business listed in the directory by category or name.",
        ),
        heading,
        category_links,
        letter_links,
        sort_options: SelectOption::list(
            BusinessSort::OPTIONS
                .iter()
                .filter(|(s, _)| *s != BusinessSort::Relevance)
                .map(|(s, label)| (s.as_str(), *label)),
            sort_param,
        ),
        category: category_slug.to_string(),
        letter: letter_param,
        cards: results.items.iter().map(BusinessCard::from).collect(),
        pager,
    }
    .into_response())
}

/// Handler for the search page. An empty query lists everything.
pub async fn search(
    State(state): State<AppState>,
    visitor: Visitor,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let text = non_blank(params.q.as_deref());
    let location = non_blank(params.location.as_deref());
    let category = non_blank(params.category.as_deref())
        .and_then(|slug| Category::find(&slug))
        .map(|c| c.slug);
    let min_rating = params
        .min_rating
        .as_deref()
        .and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite() && *r > 0.0);
    let accredited = checkbox(params.accredited.as_deref());
    let sort = BusinessSort::parse_or(params.sort.as_deref(), BusinessSort::Relevance);

    let query = BusinessQuery {
        text: text.clone(),
        location: location.clone(),
        category: category.map(str::to_string),
        min_rating,
        accredited_only: accredited,
        sort,
        page: page_number(params.page.as_deref()),
        ..BusinessQuery::new(state.config().site.per_page)
    };
    let results = state.storage()?.search_businesses(&query)?;

    let q = text.unwrap_or_default();
    let location = location.unwrap_or_default();
    let rating_param = min_rating.map(|r| r.to_string()).unwrap_or_default();
    let accredited_param = if accredited { "on" } else { "" };

    let heading = match (q.is_empty(), location.is_empty()) {
        (true, true) => "All businesses".to_string(),
        (false, true) => format!("Results for \"{q}\""),
        (true, false) => format!("Businesses in {location}"),
        (false, false) => format!("Results for \"{q}\" in {location}"),
    };
    let pager = Pager::new(
        &results.pagination,
        "/search",
        &[
            ("q", &q),
            ("location", &location),
            ("category", category.unwrap_or("")),
            ("min_rating", &rating_param),
            ("accredited", accredited_param),
            ("sort", sort.as_str()),
        ],
    );

    Ok(SearchTemplate {
        layout: Layout::new(
            state.config(),
            &visitor,
            "Search",
            "Search businesses by name, service, location, category and rating.",
        ),
        heading,
        category_options: SelectOption::list(
            CATEGORIES.iter().map(|c| (c.slug, c.name)),
            category.unwrap_or(""),
        ),
        rating_options: SelectOption::list(RATING_FILTERS, &rating_param),
        sort_options: SelectOption::list(
            BusinessSort::OPTIONS.iter().map(|(s, label)| (s.as_str(), *label)),
            sort.as_str(),
        ),
        q,
        location,
        accredited,
        cards: results.items.iter().map(BusinessCard::from).collect(),
        pager,
    }
    .into_response())
}
