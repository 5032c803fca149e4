//! # Postgres post repository
//!
//! Translates a [`RetrievalSpecification`] into a single SQL statement.
//! Expected schema is in `migrations/`.
//!
//! Cursor anchors are resolved with a sub-select on the anchor row; when the
//! anchor does not exist the comparison is NULL and the page is empty.

use crate::PageBounds;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    BlockingVisibility, DomainError, DomainResult, OrderBy, OrderField, PaginationCursor, Post,
    PostId, PostRepository, RetrievalSpecification, SortDirection, UserId,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};

const SELECT_POSTS: &str =
    "SELECT p.id, p.created_by_id, p.content, p.repost_id, p.estimate_likes, p.created_at FROM posts p WHERE TRUE";

#[derive(Debug, FromRow)]
struct PostRow {
    id: String,
    created_by_id: String,
    content: String,
    repost_id: Option<String>,
    estimate_likes: i64,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: PostId(row.id),
            created_by_id: UserId(row.created_by_id),
            content: row.content,
            repost_id: row.repost_id.map(PostId),
            estimate_likes: row.estimate_likes,
            created_at: row.created_at,
        }
    }
}

pub struct PgPostRepository {
    pool: PgPool,
    bounds: PageBounds,
}

impl PgPostRepository {
    pub fn new(pool: PgPool, bounds: PageBounds) -> Self {
        Self { pool, bounds }
    }

    pub async fn connect(database_url: &str, bounds: PageBounds) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool, bounds))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn column(field: OrderField) -> &'static str {
    match field {
        OrderField::EstimatedLikes => "estimate_likes",
        OrderField::CreatedAt => "created_at",
    }
}

/// Ordering terms with the id tie-breaker appended.
fn ranked_terms(order: &[OrderBy]) -> Vec<(&'static str, SortDirection)> {
    order
        .iter()
        .map(|term| (column(term.field), term.direction))
        .chain(std::iter::once(("id", SortDirection::Asc)))
        .collect()
}

/// Pushes "p sorts strictly after anchor a" for lexicographic `terms`.
fn push_strictly_after(qb: &mut QueryBuilder<'_, Postgres>, terms: &[(&'static str, SortDirection)]) {
    qb.push("(");
    for (i, (col, direction)) in terms.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push("(");
        for (prev, _) in &terms[..i] {
            qb.push(format!("p.{prev} = a.{prev} AND "));
        }
        let op = match direction {
            SortDirection::Asc => ">",
            SortDirection::Desc => "<",
        };
        qb.push(format!("p.{col} {op} a.{col})"));
    }
    qb.push(")");
}

/// Builds the page query. Returns the builder and whether the rows come back
/// reversed (backward edge paging) and must be flipped.
fn build_query(spec: &RetrievalSpecification, limit: u32) -> (QueryBuilder<'_, Postgres>, bool) {
    let mut qb = QueryBuilder::new(SELECT_POSTS);

    if spec.filter.exclude_reposts {
        qb.push(" AND p.repost_id IS NULL");
    }
    if let Some(bound) = spec.filter.created_after {
        qb.push(" AND p.created_at >= ").push_bind(bound);
    }
    if spec.visibility.blocking == BlockingVisibility::Enforced {
        let me = spec.visibility.requester_id.as_str();
        qb.push(" AND NOT EXISTS (SELECT 1 FROM user_blocks b WHERE (b.blocker_id = ")
            .push_bind(me)
            .push(" AND b.blocked_id = p.created_by_id) OR (b.blocker_id = p.created_by_id AND b.blocked_id = ")
            .push_bind(me)
            .push("))");
    }

    let mut reversed = false;
    match (&spec.cursor, spec.ordering.as_deref()) {
        (Some(PaginationCursor::Anchor { id, skip }), order) => {
            let terms = ranked_terms(order.unwrap_or(&[]));
            qb.push(" AND EXISTS (SELECT 1 FROM posts a WHERE a.id = ")
                .push_bind(id.as_str())
                .push(" AND ");
            push_strictly_after(&mut qb, &terms);
            qb.push(")");
            push_order(&mut qb, &terms);
            qb.push(" LIMIT ").push_bind(i64::from(limit));
            // Strictly-after already skips the anchor itself.
            qb.push(" OFFSET ").push_bind(i64::from(skip.saturating_sub(1)));
            return (qb, reversed);
        }
        (
            Some(PaginationCursor::Edge {
                after_id,
                before_id,
            }),
            _,
        ) => {
            if let Some(after) = after_id {
                qb.push(" AND (p.created_at, p.id) < (SELECT created_at, id FROM posts WHERE id = ")
                    .push_bind(after.as_str())
                    .push(")");
            }
            if let Some(before) = before_id {
                qb.push(" AND (p.created_at, p.id) > (SELECT created_at, id FROM posts WHERE id = ")
                    .push_bind(before.as_str())
                    .push(")");
                reversed = after_id.is_none();
            }
        }
        (None, _) => {}
    }

    match spec.ordering.as_deref() {
        Some(order) => push_order(&mut qb, &ranked_terms(order)),
        None if reversed => {
            qb.push(" ORDER BY p.created_at ASC, p.id ASC");
        }
        None => {
            qb.push(" ORDER BY p.created_at DESC, p.id DESC");
        }
    }
    qb.push(" LIMIT ").push_bind(i64::from(limit));
    (qb, reversed)
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, terms: &[(&'static str, SortDirection)]) {
    let clause = terms
        .iter()
        .map(|(col, direction)| {
            let dir = match direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            format!("p.{col} {dir}")
        })
        .collect::<Vec<_>>()
        .join(", ");
    qb.push(format!(" ORDER BY {clause}"));
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn fetch_posts(&self, spec: RetrievalSpecification) -> DomainResult<Vec<Post>> {
        let limit = self.bounds.resolve(spec.limit);
        let (mut qb, reversed) = build_query(&spec, limit);
        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| DomainError::Retrieval(err.to_string()))?;

        let mut posts: Vec<Post> = rows.into_iter().map(Post::from).collect();
        if reversed {
            posts.reverse();
        }
        Ok(posts)
    }
}
