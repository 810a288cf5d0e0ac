//! Assigned-user counting over group memberships.
//!
//! A group's direct user members count once each. Nested groups are expanded
//! while the nesting level is below `max_depth`; with the default depth of 1
//! only the direct users of a nested group are counted and groups found inside
//! it are not expanded further.
//!
//! Counting is per membership entry: a user reachable through two paths is
//! counted twice.

use std::collections::VecDeque;

use crate::error::FetchError;
use crate::models::{GroupMember, MemberType};
use crate::services::source::{resources, GraphSource};
use crate::services::status_fetcher::decode_items;

/// Default nested group expansion depth.
pub const DEFAULT_NESTED_GROUP_DEPTH: u32 = 1;

/// Resolves how many users a group assignment reaches.
pub struct MembershipResolver<'a, S: GraphSource + ?Sized> {
    source: &'a S,
    max_depth: u32,
}

impl<'a, S: GraphSource + ?Sized> MembershipResolver<'a, S> {
    pub fn new(source: &'a S, max_depth: u32) -> Self {
        Self { source, max_depth }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Counts user entries in `group_id` and its nested groups.
    ///
    /// The first failed member listing, at any level, aborts the count.
    pub async fn resolve_assigned_user_count(&self, group_id: &str) -> Result<u64, FetchError> {
        let mut pending: VecDeque<(String, u32)> = VecDeque::new();
        pending.push_back((group_id.to_string(), 0));

        let mut users = 0u64;
        while let Some((current, level)) = pending.pop_front() {
            for member in self.members(&current).await? {
                match member.member_type() {
                    MemberType::User => users += 1,
                    MemberType::Group if level < self.max_depth => {
                        pending.push_back((member.id, level + 1));
                    }
                    MemberType::Group => {
                        tracing::trace!(
                            group_id = %member.id,
                            level = level + 1,
                            "Nested group beyond expansion depth skipped"
                        );
                    }
                    MemberType::Other => {}
                }
            }
        }

        tracing::debug!(group_id = %group_id, users = users, "Resolved assigned users");
        Ok(users)
    }

    async fn members(&self, group_id: &str) -> Result<Vec<GroupMember>, FetchError> {
        let resource = resources::group_members(group_id);
        let items = self.source.fetch(&resource).await?;
        decode_items(&resource, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::source::InMemoryGraphSource;
    use serde_json::{json, Value};

    fn user(id: &str) -> Value {
        json!({"@odata.type": "#microsoft.graph.user", "id": id})
    }

    fn group(id: &str) -> Value {
        json!({"@odata.type": "#microsoft.graph.group", "id": id})
    }

    /// G = { U1, H }, H = { U2, K }, K = { U3 }
    fn nested_source() -> InMemoryGraphSource {
        InMemoryGraphSource::new()
            .with_collection("groups/G/members", vec![user("U1"), group("H")])
            .with_collection("groups/H/members", vec![user("U2"), group("K")])
            .with_collection("groups/K/members", vec![user("U3")])
    }

    #[tokio::test]
    async fn test_default_depth_expands_one_level() {
        let source = nested_source();
        let resolver = MembershipResolver::new(&source, DEFAULT_NESTED_GROUP_DEPTH);

        let count = resolver.resolve_assigned_user_count("G").await.unwrap();
        assert_eq!(count, 2);
        assert!(!source.was_requested("groups/K/members"));
    }

    #[tokio::test]
    async fn test_deeper_expansion_when_configured() {
        let source = nested_source();
        let resolver = MembershipResolver::new(&source, 2);

        let count = resolver.resolve_assigned_user_count("G").await.unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_depth_one_without_nested_groups() {
        let source = InMemoryGraphSource::new().with_collection(
            "groups/G/members",
            vec![user("U1"), user("U2"), user("U3")],
        );
        let resolver = MembershipResolver::new(&source, 1);

        assert_eq!(resolver.resolve_assigned_user_count("G").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_other_member_types_ignored() {
        let source = InMemoryGraphSource::new().with_collection(
            "groups/G/members",
            vec![
                user("U1"),
                json!({"@odata.type": "#microsoft.graph.device", "id": "D1"}),
                json!({"@odata.type": "#microsoft.graph.servicePrincipal", "id": "S1"}),
            ],
        );
        let resolver = MembershipResolver::new(&source, 1);

        assert_eq!(resolver.resolve_assigned_user_count("G").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_user_in_two_paths_counted_twice() {
        let source = InMemoryGraphSource::new()
            .with_collection("groups/G/members", vec![user("U1"), group("H")])
            .with_collection("groups/H/members", vec![user("U1")]);
        let resolver = MembershipResolver::new(&source, 1);

        assert_eq!(resolver.resolve_assigned_user_count("G").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_group() {
        let source = InMemoryGraphSource::new();
        let resolver = MembershipResolver::new(&source, 1);

        assert_eq!(resolver.resolve_assigned_user_count("G").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_top_level_failure_propagates() {
        let source = InMemoryGraphSource::new().with_failure("groups/G/members", 404, "not found");
        let resolver = MembershipResolver::new(&source, 1);

        let err = resolver.resolve_assigned_user_count("G").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_nested_failure_propagates() {
        let source = InMemoryGraphSource::new()
            .with_collection("groups/G/members", vec![user("U1"), group("H")])
            .with_failure("groups/H/members", 503, "busy");
        let resolver = MembershipResolver::new(&source, 1);

        let err = resolver.resolve_assigned_user_count("G").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.resource(), Some("groups/H/members"));
    }
}
