//! Badge-based admin capability.

use domains::{AdminPolicy, Badges};

/// Founders and admins bypass blocking.
#[derive(Debug, Clone, Copy, Default)]
pub struct BadgeAdminPolicy;

impl AdminPolicy for BadgeAdminPolicy {
    fn is_admin(&self, badges: Badges) -> bool {
        badges.contains(Badges::FOUNDER) || badges.contains(Badges::ADMIN)
    }
}
