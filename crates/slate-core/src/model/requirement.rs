use serde::{Deserialize, Serialize};

use crate::outcome::{Outcome, Rejection};

/// Color used for tags that name no known group.
pub const FALLBACK_COLOR: &str = "#6b7280";

/// A user-defined requirement bucket (a "major") used for credit tallies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementGroup {
    pub id: String,
    pub name: String,
    pub color: String,
    pub display_order: u32,
}

impl RequirementGroup {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
        display_order: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            display_order,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[must_use]
pub fn default_groups() -> Vec<RequirementGroup> {
    vec![
        RequirementGroup::new("DSCT", "Data Science & Technology", "#2563eb", 1),
        RequirementGroup::new("COSC", "Computer Science", "#16a34a", 2),
        RequirementGroup::new("CCC", "Common Core Courses", "#9333ea", 3),
    ]
}

/// Ordered list of requirement groups. Persisted as a whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requirements {
    groups: Vec<RequirementGroup>,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            groups: default_groups(),
        }
    }
}

impl Requirements {
    /// Build from a loaded list: sorted by `display_order`, defaults when
    /// empty.
    #[must_use]
    pub fn from_loaded(mut groups: Vec<RequirementGroup>) -> Self {
        if groups.is_empty() {
            return Self::default();
        }
        groups.sort_by_key(|g| g.display_order);
        Self { groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[RequirementGroup] {
        &self.groups
    }

    #[must_use]
    pub fn into_groups(self) -> Vec<RequirementGroup> {
        self.groups
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RequirementGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    #[must_use]
    pub fn color_of(&self, id: &str) -> &str {
        self.get(id).map_or(FALLBACK_COLOR, |g| g.color.as_str())
    }

    #[must_use]
    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map_or(id, |g| g.name.as_str())
    }

    /// Append a group after the current last one.
    pub fn add(&mut self, id: &str, name: &str, color: &str) -> Outcome {
        let id = id.trim();
        let name = name.trim();
        if id.is_empty() || name.is_empty() {
            return Outcome::Unchanged(Rejection::EmptyName);
        }
        if self.get(id).is_some() {
            return Outcome::Unchanged(Rejection::DuplicateGroup);
        }
        let next = self.groups.iter().map(|g| g.display_order).max().unwrap_or(0) + 1;
        self.groups.push(RequirementGroup::new(id, name, color.trim(), next));
        Outcome::applied(1)
    }

    pub fn update(&mut self, id: &str, patch: &GroupPatch) -> Outcome {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Outcome::Unchanged(Rejection::EmptyName);
        }
        let Some(group) = self.groups.iter_mut().find(|g| g.id == id) else {
            return Outcome::Unchanged(Rejection::UnknownGroup);
        };
        let before = group.clone();
        if let Some(name) = &patch.name {
            group.name = name.trim().to_string();
        }
        if let Some(color) = &patch.color {
            group.color = color.trim().to_string();
        }
        if *group == before {
            Outcome::Unchanged(Rejection::NoOp)
        } else {
            Outcome::applied(1)
        }
    }

    /// Remove a group. Courses keep the tag; it renders with the fallback
    /// color and name.
    pub fn remove(&mut self, id: &str) -> Outcome {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        if self.groups.len() == before {
            return Outcome::Unchanged(Rejection::UnknownGroup);
        }
        Outcome::applied(1)
    }

    /// Move the group at `from` to `to` and renumber `display_order` to
    /// `1..=n`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Outcome {
        let len = self.groups.len();
        if from >= len || to >= len {
            return Outcome::Unchanged(Rejection::IndexOutOfBounds);
        }
        if from == to {
            return Outcome::Unchanged(Rejection::NoOp);
        }
        let moved = self.groups.remove(from);
        self.groups.insert(to, moved);
        self.renumber();
        Outcome::applied(from.abs_diff(to) + 1)
    }

    fn renumber(&mut self) {
        for (order, group) in (1u32..).zip(self.groups.iter_mut()) {
            group.display_order = order;
        }
    }
}
