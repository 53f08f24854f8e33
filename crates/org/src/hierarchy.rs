//! Reporting graph over users.

use std::collections::{HashMap, HashSet};

use wholesale_auth::Principal;
use wholesale_core::UserId;

use crate::User;

/// In-memory adjacency view of the `reports_to` graph.
///
/// Built from a snapshot of the user table. Every traversal carries a visited
/// set, so an accidental cycle in `reports_to` terminates instead of looping.
#[derive(Debug, Clone, Default)]
pub struct OrgHierarchy {
    users: HashMap<UserId, User>,
    /// Direct reports per manager, ordered by full name.
    reports: HashMap<UserId, Vec<UserId>>,
}

impl OrgHierarchy {
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let users: HashMap<UserId, User> = users.into_iter().map(|u| (u.id, u)).collect();

        let mut reports: HashMap<UserId, Vec<UserId>> = HashMap::new();
        for user in users.values() {
            if let Some(manager) = user.reports_to {
                reports.entry(manager).or_default().push(user.id);
            }
        }
        for ids in reports.values_mut() {
            ids.sort_by(|a, b| {
                let (ua, ub) = (&users[a], &users[b]);
                ua.full_name.cmp(&ub.full_name).then(ua.id.cmp(&ub.id))
            });
        }

        Self { users, reports }
    }

    pub fn get(&self, user_id: UserId) -> Option<&User> {
        self.users.get(&user_id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Users whose `reports_to` is `user_id`, ordered by full name.
    pub fn direct_reports(&self, user_id: UserId) -> Vec<&User> {
        self.reports
            .get(&user_id)
            .map(|ids| ids.iter().filter_map(|id| self.users.get(id)).collect())
            .unwrap_or_default()
    }

    /// Transitive closure of users reporting (directly or indirectly) to `user_id`.
    ///
    /// Breadth-first: start with `{user_id}`, expand the frontier by direct
    /// reports, union into the result, stop when a frontier adds nothing new.
    /// Excludes `user_id` itself and contains no duplicates.
    pub fn subordinates_of(&self, user_id: UserId) -> Vec<UserId> {
        let mut visited: HashSet<UserId> = HashSet::from([user_id]);
        let mut result = Vec::new();
        let mut frontier = vec![user_id];

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for id in &frontier {
                for report in self.reports.get(id).into_iter().flatten() {
                    if visited.insert(*report) {
                        result.push(*report);
                        next.push(*report);
                    }
                }
            }
            frontier = next;
        }

        result
    }

    /// `user_id` together with its subordinate closure.
    pub fn team_of(&self, user_id: UserId) -> HashSet<UserId> {
        let mut team: HashSet<UserId> = self.subordinates_of(user_id).into_iter().collect();
        team.insert(user_id);
        team
    }

    /// Chain from `user_id` upward through `reports_to`, stopping before
    /// `stop_at` (or at the root). Starts with `user_id` itself unless it is
    /// `stop_at`.
    pub fn path_to_root(&self, user_id: UserId, stop_at: UserId) -> Vec<&User> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(user_id);

        while let Some(id) = current {
            if id == stop_at || !seen.insert(id) {
                break;
            }
            match self.users.get(&id) {
                Some(user) => {
                    chain.push(user);
                    current = user.reports_to;
                }
                None => break,
            }
        }

        chain
    }

    /// Breadcrumb trail for navigating from `viewer` down to `user_id`, root-first.
    pub fn breadcrumbs(&self, user_id: UserId, viewer: UserId) -> Vec<&User> {
        let mut chain = self.path_to_root(user_id, viewer);
        chain.reverse();
        chain
    }

    /// Whether `user_id` sits somewhere below `ancestor`.
    pub fn is_subordinate(&self, ancestor: UserId, user_id: UserId) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.users.get(&user_id).and_then(|u| u.reports_to);

        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.users.get(&id).and_then(|u| u.reports_to);
        }

        false
    }

    /// Role-bounded visibility: self, own subtree, or anything for the owner.
    pub fn can_view(&self, principal: &Principal, user_id: UserId) -> bool {
        principal.is_owner()
            || principal.user_id == user_id
            || self.is_subordinate(principal.user_id, user_id)
    }

    pub fn manager_of(&self, user_id: UserId) -> Option<&User> {
        self.users
            .get(&user_id)
            .and_then(|u| u.reports_to)
            .and_then(|m| self.users.get(&m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use wholesale_auth::Role;

    fn user(name: &str, role: Role, reports_to: Option<UserId>) -> User {
        User {
            id: UserId::new(),
            full_name: name.to_string(),
            username: name.to_lowercase(),
            role,
            reports_to,
            created_at: Utc::now(),
        }
    }

    /// owner → manager A → supervisor B → sales C, plus a peer manager D.
    fn chain() -> (OrgHierarchy, [UserId; 5]) {
        let owner = user("Owner", Role::Owner, None);
        let a = user("Anwar", Role::Manager, Some(owner.id));
        let b = user("Bilkis", Role::Supervisor, Some(a.id));
        let c = user("Chandan", Role::Sales, Some(b.id));
        let d = user("Dipu", Role::Manager, Some(owner.id));
        let ids = [owner.id, a.id, b.id, c.id, d.id];
        (OrgHierarchy::from_users([owner, a, b, c, d]), ids)
    }

    #[test]
    fn closure_reaches_every_depth() {
        let (org, [owner, a, b, c, d]) = chain();

        let all: HashSet<_> = org.subordinates_of(owner).into_iter().collect();
        assert_eq!(all, HashSet::from([a, b, c, d]));

        let under_a: HashSet<_> = org.subordinates_of(a).into_iter().collect();
        assert_eq!(under_a, HashSet::from([b, c]));
        assert!(org.subordinates_of(c).is_empty());
    }

    #[test]
    fn direct_reports_are_sorted_by_name() {
        let (org, [owner, a, _, _, d]) = chain();
        let names: Vec<_> = org.direct_reports(owner).iter().map(|u| u.id).collect();
        assert_eq!(names, vec![a, d]);
    }

    #[test]
    fn path_to_root_stops_before_viewer() {
        let (org, [_, a, b, c, _]) = chain();

        let path: Vec<_> = org.path_to_root(c, a).iter().map(|u| u.id).collect();
        assert_eq!(path, vec![c, b]);

        let crumbs: Vec<_> = org.breadcrumbs(c, a).iter().map(|u| u.id).collect();
        assert_eq!(crumbs, vec![b, c]);

        assert!(org.path_to_root(a, a).is_empty());
    }

    #[test]
    fn visibility_is_bounded_to_the_subtree() {
        let (org, [owner, a, b, c, d]) = chain();
        let manager_a = Principal::new(a, Role::Manager, BTreeSet::new());

        assert!(org.can_view(&manager_a, a));
        assert!(org.can_view(&manager_a, c));
        assert!(!org.can_view(&manager_a, d));
        assert!(!org.can_view(&manager_a, owner));

        let owner_p = Principal::new(owner, Role::Owner, BTreeSet::new());
        assert!(org.can_view(&owner_p, b));
    }

    #[test]
    fn cyclic_reporting_chain_terminates() {
        let mut x = user("X", Role::Manager, None);
        let mut y = user("Y", Role::Supervisor, None);
        x.reports_to = Some(y.id);
        y.reports_to = Some(x.id);
        let (xid, yid) = (x.id, y.id);
        let org = OrgHierarchy::from_users([x, y]);

        assert_eq!(org.subordinates_of(xid), vec![yid]);
        assert_eq!(org.path_to_root(xid, UserId::new()).len(), 2);
        assert!(org.is_subordinate(xid, yid));
        assert!(!org.is_subordinate(UserId::new(), yid));
    }

    proptest! {
        /// Random forests: node i reports to some earlier node (or nobody).
        #[test]
        fn closure_matches_brute_force_descendants(
            parents in proptest::collection::vec(proptest::option::of(0usize..1000), 1..40)
        ) {
            let mut users: Vec<User> = Vec::new();
            for (i, parent) in parents.iter().enumerate() {
                let reports_to = match parent {
                    Some(p) if i > 0 => Some(users[p % i].id),
                    _ => None,
                };
                users.push(user(&format!("u{i}"), Role::Sales, reports_to));
            }
            let org = OrgHierarchy::from_users(users.clone());

            for root in &users {
                let closure = org.subordinates_of(root.id);
                let unique: HashSet<_> = closure.iter().copied().collect();
                prop_assert_eq!(unique.len(), closure.len());

                let expected: HashSet<_> = users
                    .iter()
                    .filter(|u| org.is_subordinate(root.id, u.id))
                    .map(|u| u.id)
                    .collect();
                prop_assert_eq!(unique, expected);
            }
        }
    }
}
