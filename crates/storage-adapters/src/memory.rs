//! # In-memory post repository
//!
//! Interprets a [`RetrievalSpecification`] over posts held in process
//! memory. Cursor ids are resolved against every stored post and compared
//! by sort values, the same way the Postgres adapter compares against the
//! anchor row. An id that does not exist at all yields an empty page.

use crate::ordering::{by_terms, newest_first};
use crate::seed::SeedData;
use crate::PageBounds;
use async_trait::async_trait;
use dashmap::DashMap;
use domains::{
    BlockingVisibility, DomainResult, OrderBy, PaginationCursor, Post, PostId, PostRepository,
    RetrievalSpecification, UserId,
};
use std::cmp::Ordering;
use std::collections::HashSet;
use tokio::sync::RwLock;

pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
    /// blocker -> users they blocked
    blocks: DashMap<UserId, HashSet<UserId>>,
    bounds: PageBounds,
}

impl InMemoryPostRepository {
    pub fn new(bounds: PageBounds) -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
            blocks: DashMap::new(),
            bounds,
        }
    }

    pub fn with_seed(bounds: PageBounds, seed: SeedData) -> Self {
        let repo = Self::new(bounds);
        for entry in seed.blocks {
            repo.block(entry.blocker_id, entry.blocked_id);
        }
        Self {
            posts: RwLock::new(seed.posts),
            ..repo
        }
    }

    pub async fn insert(&self, post: Post) {
        self.posts.write().await.push(post);
    }

    pub fn block(&self, blocker: UserId, blocked: UserId) {
        self.blocks.entry(blocker).or_default().insert(blocked);
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }

    fn has_blocked(&self, blocker: &UserId, blocked: &UserId) -> bool {
        self.blocks
            .get(blocker)
            .is_some_and(|set| set.contains(blocked))
    }

    fn visible(&self, spec: &RetrievalSpecification, post: &Post) -> bool {
        if spec.filter.exclude_reposts && post.repost_id.is_some() {
            return false;
        }
        if let Some(bound) = spec.filter.created_after {
            if post.created_at < bound {
                return false;
            }
        }
        match spec.visibility.blocking {
            BlockingVisibility::Bypassed => true,
            BlockingVisibility::Enforced => {
                let me = &spec.visibility.requester_id;
                let author = &post.created_by_id;
                !self.has_blocked(me, author) && !self.has_blocked(author, me)
            }
        }
    }
}

fn compare(ordering: Option<&[OrderBy]>, a: &Post, b: &Post) -> Ordering {
    match ordering {
        Some(order) => by_terms(order, a, b),
        None => newest_first(a, b),
    }
}

/// Looks an id up among all stored posts, not only the visible ones.
fn find<'a>(all: &'a [Post], id: &PostId) -> Option<&'a Post> {
    all.iter().find(|post| &post.id == id)
}

/// Slices the ordered, visible `rows` according to `cursor`, returning at
/// most `limit` entries. Cursor ids are placed by their own sort values, so
/// an anchor that is filtered out (aged past the window, a repost, a
/// blocked author) still positions the page.
fn page<'a>(
    all: &[Post],
    rows: Vec<&'a Post>,
    ordering: Option<&[OrderBy]>,
    cursor: Option<&PaginationCursor>,
    limit: usize,
) -> Vec<&'a Post> {
    match cursor {
        None => rows.into_iter().take(limit).collect(),
        Some(PaginationCursor::Anchor { id, skip }) => {
            let Some(anchor) = find(all, id) else {
                return Vec::new();
            };
            // Strictly-after already steps past the anchor itself.
            rows.into_iter()
                .filter(|post| compare(ordering, post, anchor) == Ordering::Greater)
                .skip(skip.saturating_sub(1) as usize)
                .take(limit)
                .collect()
        }
        Some(PaginationCursor::Edge {
            after_id,
            before_id,
        }) => {
            let after = match after_id {
                Some(id) => match find(all, id) {
                    Some(post) => Some(post),
                    None => return Vec::new(),
                },
                None => None,
            };
            let before = match before_id {
                Some(id) => match find(all, id) {
                    Some(post) => Some(post),
                    None => return Vec::new(),
                },
                None => None,
            };
            let window: Vec<&Post> = rows
                .into_iter()
                .filter(|post| match after {
                    Some(edge) => newest_first(post, edge) == Ordering::Greater,
                    None => true,
                })
                .filter(|post| match before {
                    Some(edge) => newest_first(post, edge) == Ordering::Less,
                    None => true,
                })
                .collect();
            // Paging backwards keeps the entries closest to the boundary.
            if after.is_none() && window.len() > limit {
                window[window.len() - limit..].to_vec()
            } else {
                window.into_iter().take(limit).collect()
            }
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn fetch_posts(&self, spec: RetrievalSpecification) -> DomainResult<Vec<Post>> {
        let posts = self.posts.read().await;
        let ordering = spec.ordering.as_deref();
        let mut rows: Vec<&Post> = posts.iter().filter(|post| self.visible(&spec, post)).collect();
        rows.sort_by(|a, b| compare(ordering, a, b));

        let limit = self.bounds.resolve(spec.limit) as usize;
        let result: Vec<Post> = page(&posts, rows, ordering, spec.cursor.as_ref(), limit)
            .into_iter()
            .cloned()
            .collect();
        tracing::trace!(returned = result.len(), limit, "in-memory page resolved");
        Ok(result)
    }
}
