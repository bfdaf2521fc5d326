use crate::model::semester::{MANDATORY_SEMESTERS, is_mandatory};
use crate::model::{Semester, SemesterId, SemesterKind};

use super::{Outcome, Plan, Rejection};

impl Plan {
    /// Insert an empty program semester for every missing mandatory
    /// (kind, year) pair, then sort. Returns how many were created.
    pub fn ensure_mandatory(&mut self) -> usize {
        let mut created = 0;
        for (kind, year) in MANDATORY_SEMESTERS {
            if self.find_term(kind, year).is_none() {
                let id = self.unused_term_id(kind, year);
                self.semesters.push(Semester::new(id, kind, year));
                created += 1;
            }
        }
        self.sort();
        created
    }

    /// The deterministic id for a program term, or a fresh one when that id
    /// is not program-owned or another semester already holds it.
    fn unused_term_id(&self, kind: SemesterKind, year: i32) -> SemesterId {
        let id = SemesterId::mandatory(kind, year);
        if is_mandatory(kind, year) && self.semester(id.as_str()).is_none() {
            id
        } else {
            SemesterId::fresh(kind, year)
        }
    }

    /// Stable sort by academic year, then kind rank.
    pub fn sort(&mut self) {
        self.semesters.sort_by_key(Semester::sort_key);
    }

    #[must_use]
    pub fn find_term(&self, kind: SemesterKind, year: i32) -> Option<&Semester> {
        self.semesters
            .iter()
            .find(|s| s.kind == kind && s.year == year)
    }

    pub fn add_semester(&mut self, kind: SemesterKind, year: i32) -> Outcome {
        if self.find_term(kind, year).is_some() {
            return Outcome::Unchanged(Rejection::DuplicateSemester);
        }
        let id = self.unused_term_id(kind, year);
        self.semesters.push(Semester::new(id, kind, year));
        self.sort();
        Outcome::applied(1)
    }

    /// Delete a non-mandatory semester. Its courses stay in the pool,
    /// unplaced.
    pub fn remove_semester(&mut self, id: &str) -> Outcome {
        let Some(index) = self.semester_index(id) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        if self.semesters[index].is_mandatory() {
            return Outcome::Unchanged(Rejection::MandatorySemester);
        }
        self.semesters.remove(index);
        Outcome::applied(1)
    }

    /// Rename a semester. The name is trimmed; blank names are rejected.
    pub fn rename_semester(&mut self, id: &str, name: &str) -> Outcome {
        let name = name.trim();
        if name.is_empty() {
            return Outcome::Unchanged(Rejection::EmptyName);
        }
        let Some(semester) = self.semester_mut(id) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        if semester.name == name {
            return Outcome::Unchanged(Rejection::NoOp);
        }
        semester.name = name.to_string();
        Outcome::applied(1)
    }

    /// Empty a semester's sequence. Courses stay in the pool.
    pub fn clear_semester(&mut self, id: &str) -> Outcome {
        let Some(semester) = self.semester_mut(id) else {
            return Outcome::Unchanged(Rejection::UnknownSemester);
        };
        let removed = semester.courses.len();
        semester.courses.clear();
        Outcome::counted(removed, Rejection::NoOp)
    }
}
