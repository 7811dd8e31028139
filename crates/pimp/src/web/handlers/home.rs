//! Home page handler

use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::error::Result;
use crate::web::layout::Layout;
use crate::web::session::Visitor;
use crate::web::state::AppState;
use crate::web::views::directory::{CategoryTile, HomeTemplate};
use crate::web::views::{BusinessCard, ReviewView};

/// Featured listings on the home page.
const FEATURED: usize = 6;

/// Recent reviews on the home page.
const RECENT: usize = 4;

/// Handler for the landing page.
pub async fn home(State(state): State<AppState>, visitor: Visitor) -> Result<Response> {
    let (categories, featured, recent, stats) = {
        let storage = state.storage()?;
        (
            storage.category_counts()?,
            storage.featured_businesses(FEATURED)?,
            storage.recent_reviews(RECENT)?,
            storage.stats()?,
        )
    };

    let site = &state.config().site;
    Ok(HomeTemplate {
        layout: Layout::new(
            state.config(),
            &visitor,
            "",
            format!("{} {}", site.name, site.tagline),
        ),
        tagline: site.tagline.clone(),
        categories: categories
            .into_iter()
            .map(|(category, count)| CategoryTile {
                slug: category.slug,
                name: category.name,
                icon: category.icon,
                count,
            })
            .collect(),
        featured: featured.iter().map(BusinessCard::from).collect(),
        recent: recent.iter().map(ReviewView::from).collect(),
        stats,
    }
    .into_response())
}
