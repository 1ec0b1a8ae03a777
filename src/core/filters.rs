use std::collections::HashSet;

use crate::models::Listing;

/// Location filter value that disables location filtering
pub const ALL_LOCATIONS: &str = "all";

/// Pick the starting set for ranking.
///
/// Stage 1 of the ranking pipeline. Saved-only wins over the location filter;
/// a missing saved-id set selects nothing.
pub fn select_base_set<'a>(
    listings: &'a [Listing],
    location_filter: Option<&str>,
    saved_ids: Option<&HashSet<String>>,
    saved_only: bool,
) -> Vec<&'a Listing> {
    if saved_only {
        return match saved_ids {
            Some(ids) => listings.iter().filter(|l| ids.contains(&l.id)).collect(),
            None => Vec::new(),
        };
    }

    match location_filter {
        Some(location) if location != ALL_LOCATIONS => listings
            .iter()
            .filter(|l| l.location == location)
            .collect(),
        _ => listings.iter().collect(),
    }
}

/// Case-insensitive substring match over title, description, location and
/// property type.
///
/// Stage 2 of the ranking pipeline. `query_lower` must already be lowercased;
/// an empty query matches everything.
#[inline]
pub fn matches_search_query(listing: &Listing, query_lower: &str) -> bool {
    if query_lower.is_empty() {
        return true;
    }

    [
        &listing.title,
        &listing.description,
        &listing.location,
        &listing.property_type,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(query_lower))
}
