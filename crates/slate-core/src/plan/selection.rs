use std::collections::BTreeSet;

use crate::model::CourseId;

/// Courses marked for a bulk action. Independent of placement and never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<CourseId>);

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership. Returns whether the course is now selected.
    pub fn toggle(&mut self, id: impl Into<CourseId>) -> bool {
        let id = id.into();
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn add(&mut self, id: impl Into<CourseId>) -> bool {
        self.0.insert(id.into())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.0.remove(id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Replace the selection with exactly `ids`.
    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<CourseId>,
    {
        self.0 = ids.into_iter().map(Into::into).collect();
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CourseId> {
        self.0.iter()
    }
}

impl<T: Into<CourseId>> FromIterator<T> for Selection {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
