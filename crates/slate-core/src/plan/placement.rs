//! Per-semester ordered sequences.
//!
//! Positions are clamped to `[0, len]`; pass `usize::MAX` to append. Bulk
//! variants skip courses that would break the placement invariant and
//! report how many were applied.

use crate::model::{Course, CourseId};

use super::{Outcome, Plan, Rejection, Selection};

impl Plan {
    /// Splice `course` into `semester` at `position`.
    pub fn insert_at(&mut self, semester: &str, course: &str, position: usize) -> Outcome {
        let Some(index) = self.semester_index(semester) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        let Some(course_id) = self.course(course).map(|c| c.id.clone()) else {
            return Outcome::Unchanged(Rejection::UnknownCourse);
        };
        if self.is_placed(course) {
            return Outcome::Unchanged(Rejection::AlreadyPlaced);
        }
        let target = &mut self.semesters[index].courses;
        let position = position.min(target.len());
        target.insert(position, course_id);
        Outcome::applied(1)
    }

    pub fn append(&mut self, semester: &str, course: &str) -> Outcome {
        self.insert_at(semester, course, usize::MAX)
    }

    /// Remove `course` from `semester`. The pool is untouched.
    pub fn remove_from(&mut self, semester: &str, course: &str) -> Outcome {
        let Some(target) = self.semester_mut(semester) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        let Some(position) = target.position(course) else {
            return Outcome::Unchanged(Rejection::NotInSource);
        };
        target.courses.remove(position);
        Outcome::applied(1)
    }

    /// Move the element at `from` so it ends up at index `to`.
    pub fn reorder(&mut self, semester: &str, from: usize, to: usize) -> Outcome {
        let Some(target) = self.semester_mut(semester) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        let len = target.courses.len();
        if from >= len || to >= len {
            return Outcome::Unchanged(Rejection::IndexOutOfBounds);
        }
        if from == to {
            return Outcome::Unchanged(Rejection::NoOp);
        }
        let moved = target.courses.remove(from);
        target.courses.insert(to, moved);
        Outcome::applied(1)
    }

    /// Remove from `from` and insert into `to` at `position`, or do nothing.
    pub fn move_between(&mut self, from: &str, to: &str, course: &str, position: usize) -> Outcome {
        if from == to {
            return Outcome::Unchanged(Rejection::SameSemester);
        }
        let (Some(src), Some(dst)) = (self.semester_index(from), self.semester_index(to)) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        let Some(source_pos) = self.semesters[src].position(course) else {
            return Outcome::Unchanged(Rejection::NotInSource);
        };
        if self.semesters[dst].contains(course) {
            return Outcome::Unchanged(Rejection::AlreadyPlaced);
        }
        let moved = self.semesters[src].courses.remove(source_pos);
        let target = &mut self.semesters[dst].courses;
        let position = position.min(target.len());
        target.insert(position, moved);
        Outcome::applied(1)
    }

    /// Insert every selected, unplaced pool course at `position`, in pool
    /// order.
    pub fn insert_selected_at(
        &mut self,
        semester: &str,
        selection: &Selection,
        position: usize,
    ) -> Outcome {
        let Some(index) = self.semester_index(semester) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        let placed = self.placed_ids();
        let incoming: Vec<CourseId> = self
            .courses
            .iter()
            .filter(|c| selection.contains(c.id.as_str()) && !placed.contains(&c.id))
            .map(|c| c.id.clone())
            .collect();
        if incoming.is_empty() {
            return Outcome::Unchanged(Rejection::NothingSelected);
        }
        let count = incoming.len();
        let target = &mut self.semesters[index].courses;
        let position = position.min(target.len());
        target.splice(position..position, incoming);
        Outcome::applied(count)
    }

    pub fn append_selected(&mut self, semester: &str, selection: &Selection) -> Outcome {
        self.insert_selected_at(semester, selection, usize::MAX)
    }

    /// Move the selected courses of `from` into `to` at `position`, keeping
    /// their source order.
    pub fn move_selected_between(
        &mut self,
        from: &str,
        to: &str,
        selection: &Selection,
        position: usize,
    ) -> Outcome {
        if from == to {
            return Outcome::Unchanged(Rejection::SameSemester);
        }
        let (Some(src), Some(dst)) = (self.semester_index(from), self.semester_index(to)) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        let target_has = |id: &CourseId| self.semesters[dst].contains(id.as_str());
        let moving: Vec<CourseId> = self.semesters[src]
            .courses
            .iter()
            .filter(|id| selection.contains(id.as_str()) && !target_has(id))
            .cloned()
            .collect();
        if moving.is_empty() {
            return Outcome::Unchanged(Rejection::NothingSelected);
        }
        let count = moving.len();
        self.semesters[src]
            .courses
            .retain(|id| !moving.contains(id));
        let target = &mut self.semesters[dst].courses;
        let position = position.min(target.len());
        target.splice(position..position, moving);
        Outcome::applied(count)
    }

    /// Remove every selected course from `semester`.
    pub fn remove_selected_from(&mut self, semester: &str, selection: &Selection) -> Outcome {
        let Some(target) = self.semester_mut(semester) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        let before = target.courses.len();
        target.courses.retain(|id| !selection.contains(id.as_str()));
        Outcome::counted(before - target.courses.len(), Rejection::NothingSelected)
    }

    /// Lift the selected courses of `semester` out and reinsert them as a
    /// block at `drop`, an index into the sequence before lifting.
    pub fn reorder_selected(&mut self, semester: &str, selection: &Selection, drop: usize) -> Outcome {
        let Some(target) = self.semester_mut(semester) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        let drop = drop.min(target.courses.len());
        let lifted_before = target.courses[..drop]
            .iter()
            .filter(|id| selection.contains(id.as_str()))
            .count();
        let (lifted, mut rest): (Vec<CourseId>, Vec<CourseId>) = target
            .courses
            .iter()
            .cloned()
            .partition(|id| selection.contains(id.as_str()));
        if lifted.is_empty() {
            return Outcome::Unchanged(Rejection::NothingSelected);
        }
        let count = lifted.len();
        let position = (drop - lifted_before).min(rest.len());
        rest.splice(position..position, lifted);
        if rest == target.courses {
            return Outcome::Unchanged(Rejection::NoOp);
        }
        target.courses = rest;
        Outcome::applied(count)
    }

    /// Add `course` to the pool if its id is new, then place it. Nothing
    /// changes if the placement is rejected.
    pub fn insert_new_at(&mut self, semester: &str, course: Course, position: usize) -> Outcome {
        if self.semester_index(semester).is_none() {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        }
        let id = course.id.clone();
        if self.course(id.as_str()).is_none() {
            self.courses.push(course);
        }
        self.insert_at(semester, id.as_str(), position)
    }
}
