//! # Discovery Service
//!
//! Orchestrates one discovery request: admin capability, parsing, sort and
//! cursor resolution, composition, then a single call to the retrieval port.
//! The returned page is passed back verbatim. No re-sorting or re-filtering
//! happens here.

use crate::query_composer;
use crate::request_parser::parse_request;
use domains::{
    AdminPolicy, Clock, DiscoveryQuery, DomainResult, Post, PostRepository, Requester,
    RetrievalSpecification,
};
use std::sync::Arc;

/// Stateless across requests; share it behind an `Arc`.
pub struct DiscoveryService {
    posts: Arc<dyn PostRepository>,
    admin_policy: Arc<dyn AdminPolicy>,
    clock: Arc<dyn Clock>,
}

impl DiscoveryService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        admin_policy: Arc<dyn AdminPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            admin_policy,
            clock,
        }
    }

    /// Builds the retrieval specification without touching the repository.
    pub fn specification_for(
        &self,
        requester: &Requester,
        query: &DiscoveryQuery,
    ) -> RetrievalSpecification {
        let is_admin = self.admin_policy.is_admin(requester.badges);
        let request = parse_request(query);
        // `skip` is parsed for completeness but only the anchor cursor skips.
        tracing::trace!(skip = request.skip, sort = request.sort.label(), "parsed discovery request");
        query_composer::compose(requester, is_admin, request, self.clock.now())
    }

    /// Retrieval failures are returned unchanged; there is no retry or
    /// fallback page.
    #[tracing::instrument(skip(self, requester, query), fields(requester = %requester.id))]
    pub async fn discover(
        &self,
        requester: &Requester,
        query: &DiscoveryQuery,
    ) -> DomainResult<Vec<Post>> {
        let spec = self.specification_for(requester, query);
        tracing::debug!(?spec, "composed retrieval specification");

        match self.posts.fetch_posts(spec).await {
            Ok(posts) => {
                tracing::debug!(count = posts.len(), "discovery page fetched");
                Ok(posts)
            }
            Err(err) => {
                tracing::error!(error = %err, "discovery retrieval failed");
                Err(err)
            }
        }
    }
}
