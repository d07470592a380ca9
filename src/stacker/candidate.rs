use uuid::Uuid;

/// A prospective stack accumulated under one grouping key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateStack {
    /// Member ids in first-seen order, without duplicates
    pub members: Vec<Uuid>,
    pub parent: Option<Uuid>,
    /// Earlier parents replaced by a later parent-pattern match
    pub displaced_parents: Vec<Uuid>,
}

impl CandidateStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a member unless it is already present
    pub fn add_member(&mut self, id: Uuid) -> bool {
        if self.members.contains(&id) {
            return false;
        }
        self.members.push(id);
        true
    }

    /// Sets the parent; returns the parent it replaced, if any
    ///
    /// Re-setting the same id is not a replacement.
    pub fn set_parent(&mut self, id: Uuid) -> Option<Uuid> {
        match self.parent.replace(id) {
            Some(previous) if previous != id => {
                self.displaced_parents.push(previous);
                Some(previous)
            }
            _ => None,
        }
    }

    pub fn is_stackable(&self) -> bool {
        self.parent.is_some() && !self.members.is_empty()
    }

    /// Ids for a create-stack request: parent first, then members other than the parent
    ///
    /// Empty when there is no parent.
    pub fn ordered_ids(&self) -> Vec<Uuid> {
        let Some(parent) = self.parent else {
            return Vec::new();
        };

        let mut ids = Vec::with_capacity(self.members.len() + 1);
        ids.push(parent);
        for id in &self.members {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    /// Members without the parent, for the legacy bulk-update request
    pub fn children(&self) -> Vec<Uuid> {
        self.members
            .iter()
            .copied()
            .filter(|id| Some(*id) != self.parent)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_are_deduplicated() {
        let id = Uuid::new_v4();
        let mut candidate = CandidateStack::new();
        assert!(candidate.add_member(id));
        assert!(!candidate.add_member(id));
        assert_eq!(candidate.members, vec![id]);
    }

    #[test]
    fn test_stackable_requires_parent_and_member() {
        let mut candidate = CandidateStack::new();
        assert!(!candidate.is_stackable());

        candidate.add_member(Uuid::new_v4());
        assert!(!candidate.is_stackable());

        let mut parent_only = CandidateStack::new();
        parent_only.set_parent(Uuid::new_v4());
        assert!(!parent_only.is_stackable());

        candidate.set_parent(Uuid::new_v4());
        assert!(candidate.is_stackable());
    }

    #[test]
    fn test_last_parent_wins_and_is_recorded() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut candidate = CandidateStack::new();

        assert_eq!(candidate.set_parent(first), None);
        assert_eq!(candidate.set_parent(second), Some(first));
        assert_eq!(candidate.parent, Some(second));
        assert_eq!(candidate.displaced_parents, vec![first]);
        assert!(!candidate.members.contains(&first));
    }

    #[test]
    fn test_same_parent_twice_is_not_a_conflict() {
        let id = Uuid::new_v4();
        let mut candidate = CandidateStack::new();
        candidate.set_parent(id);
        assert_eq!(candidate.set_parent(id), None);
        assert!(candidate.displaced_parents.is_empty());
    }

    #[test]
    fn test_ordered_ids_puts_parent_first_once() {
        let parent = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let candidate = CandidateStack {
            members: vec![a, parent, b],
            parent: Some(parent),
            displaced_parents: Vec::new(),
        };

        assert_eq!(candidate.ordered_ids(), vec![parent, a, b]);
        assert_eq!(candidate.children(), vec![a, b]);
    }

    #[test]
    fn test_ordered_ids_without_parent_is_empty() {
        let mut candidate = CandidateStack::new();
        candidate.add_member(Uuid::new_v4());
        assert!(candidate.ordered_ids().is_empty());
    }
}
