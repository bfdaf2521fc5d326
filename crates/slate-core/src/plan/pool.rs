use crate::model::{Course, CoursePatch};

use super::{Outcome, Plan, Rejection, Selection};

impl Plan {
    /// Append a course to the pool. The pool trusts its caller on field
    /// validity; ids must be new.
    pub fn add_course(&mut self, course: Course) -> Outcome {
        if self.course(course.id.as_str()).is_some() {
            return Outcome::Unchanged(Rejection::DuplicateCourse);
        }
        self.courses.push(course);
        Outcome::applied(1)
    }

    /// Merge `patch` into the course. Identity never changes.
    pub fn update_course(&mut self, id: &str, patch: &CoursePatch) -> Outcome {
        let Some(index) = self.course_index(id) else {
            return Outcome::Unchanged(Rejection::UnknownCourse);
        };
        if patch.apply_to(&mut self.courses[index]) {
            Outcome::applied(1)
        } else {
            Outcome::Unchanged(Rejection::NoOp)
        }
    }

    /// Delete a course from the pool and from every semester.
    pub fn remove_course(&mut self, id: &str) -> Outcome {
        let Some(index) = self.course_index(id) else {
            return Outcome::Unchanged(Rejection::UnknownCourse);
        };
        self.courses.remove(index);
        for semester in &mut self.semesters {
            semester.courses.retain(|c| c.as_str() != id);
        }
        Outcome::applied(1)
    }

    pub fn toggle_completion(&mut self, id: &str) -> Outcome {
        let Some(index) = self.course_index(id) else {
            return Outcome::Unchanged(Rejection::UnknownCourse);
        };
        let course = &mut self.courses[index];
        course.completed = !course.completed;
        Outcome::applied(1)
    }

    /// Set the completion flag of every selected course.
    pub fn set_selected_completion(&mut self, selection: &Selection, completed: bool) -> Outcome {
        let mut changed = 0;
        for course in &mut self.courses {
            if selection.contains(course.id.as_str()) && course.completed != completed {
                course.completed = completed;
                changed += 1;
            }
        }
        Outcome::counted(changed, Rejection::NothingSelected)
    }

    /// Cascade-remove every selected course.
    pub fn remove_selected(&mut self, selection: &Selection) -> Outcome {
        let before = self.courses.len();
        self.courses.retain(|c| !selection.contains(c.id.as_str()));
        let removed = before - self.courses.len();
        if removed == 0 {
            return Outcome::Unchanged(Rejection::NothingSelected);
        }
        for semester in &mut self.semesters {
            semester.courses.retain(|c| !selection.contains(c.as_str()));
        }
        Outcome::applied(removed)
    }
}
