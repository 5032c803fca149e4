//! Row ordering shared by the in-memory repository.

use domains::{OrderBy, OrderField, Post, SortDirection};
use std::cmp::Ordering;

/// Default feed order when a specification sets none: newest first.
pub fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Lexicographic comparison over `order`, ties broken by ascending id so
/// that rank positions are total.
pub fn by_terms(order: &[OrderBy], a: &Post, b: &Post) -> Ordering {
    order
        .iter()
        .fold(Ordering::Equal, |acc, term| {
            acc.then_with(|| {
                let natural = match term.field {
                    OrderField::EstimatedLikes => a.estimate_likes.cmp(&b.estimate_likes),
                    OrderField::CreatedAt => a.created_at.cmp(&b.created_at),
                };
                match term.direction {
                    SortDirection::Asc => natural,
                    SortDirection::Desc => natural.reverse(),
                }
            })
        })
        .then_with(|| a.id.cmp(&b.id))
}
