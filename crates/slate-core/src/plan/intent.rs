//! Mutation intents and drop-request resolution.
//!
//! Every user action reaches the plan as an [`Intent`]. Drag-and-drop
//! arrives as a [`DropRequest`], a descriptor of what was dragged and where
//! it landed, resolved against the current plan at drop time.

use crate::model::{Course, CourseId, CoursePatch, SemesterId, SemesterKind};

use super::{Outcome, Plan, Rejection, Selection};

/// Where a dragged course came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropSource {
    Pool,
    Semester(SemesterId),
}

/// Where a dragged course landed. `position` is an index into the target
/// sequence as it looked before the drag; `None` means the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub semester: SemesterId,
    pub position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropRequest {
    pub source: DropSource,
    pub course: CourseId,
    /// Multi-select mode was active when the drag started.
    pub multi_select: bool,
    pub target: DropTarget,
}

impl DropRequest {
    /// Turn the drop into a concrete intent against the current plan.
    ///
    /// The selected set is moved only when multi-select is on and the dragged
    /// course is itself selected; otherwise the drop moves the one course.
    ///
    /// # Errors
    ///
    /// Returns the rejection when the drop can have no effect.
    pub fn resolve(&self, plan: &Plan, selection: &Selection) -> Result<Intent, Rejection> {
        let bulk = self.multi_select && selection.contains(self.course.as_str());
        let target = self.target.semester.clone();
        let position = self.target.position;

        match &self.source {
            DropSource::Semester(source) if *source == target => {
                let Some(drop) = position else {
                    return Err(Rejection::NoOp);
                };
                if bulk {
                    return Ok(Intent::ReorderSelected {
                        semester: target,
                        drop,
                    });
                }
                let semester = plan
                    .semester(target.as_str())
                    .ok_or(Rejection::UnknownSemester)?;
                let from = semester
                    .position(self.course.as_str())
                    .ok_or(Rejection::NotInSource)?;
                let drop = drop.min(semester.len());
                if drop == from || drop == from + 1 {
                    return Err(Rejection::NoOp);
                }
                let to = if drop > from { drop - 1 } else { drop };
                Ok(Intent::Reorder {
                    semester: target,
                    from,
                    to,
                })
            }
            DropSource::Semester(source) => {
                if bulk {
                    Ok(Intent::MoveSelected {
                        from: source.clone(),
                        to: target,
                        position,
                    })
                } else {
                    Ok(Intent::MoveBetween {
                        from: source.clone(),
                        to: target,
                        course: self.course.clone(),
                        position,
                    })
                }
            }
            DropSource::Pool => {
                if bulk {
                    Ok(Intent::InsertSelected {
                        semester: target,
                        position,
                    })
                } else {
                    Ok(Intent::InsertAt {
                        semester: target,
                        course: self.course.clone(),
                        position,
                    })
                }
            }
        }
    }
}

/// One user action. Positions of `None` mean "at the end".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddSemester { kind: SemesterKind, year: i32 },
    RemoveSemester { semester: SemesterId },
    RenameSemester { semester: SemesterId, name: String },
    ClearSemester { semester: SemesterId },

    InsertAt { semester: SemesterId, course: CourseId, position: Option<usize> },
    RemoveFrom { semester: SemesterId, course: CourseId },
    Reorder { semester: SemesterId, from: usize, to: usize },
    MoveBetween { from: SemesterId, to: SemesterId, course: CourseId, position: Option<usize> },
    InsertNew { semester: SemesterId, course: Course, position: Option<usize> },

    InsertSelected { semester: SemesterId, position: Option<usize> },
    MoveSelected { from: SemesterId, to: SemesterId, position: Option<usize> },
    RemoveSelectedFrom { semester: SemesterId },
    ReorderSelected { semester: SemesterId, drop: usize },

    AddCourse(Course),
    UpdateCourse { course: CourseId, patch: CoursePatch },
    RemoveCourse { course: CourseId },
    ToggleCompletion { course: CourseId },
    SetSelectedCompletion { completed: bool },
    RemoveSelected,

    Drop(DropRequest),
}

impl Intent {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddSemester { .. } => "add_semester",
            Self::RemoveSemester { .. } => "remove_semester",
            Self::RenameSemester { .. } => "rename_semester",
            Self::ClearSemester { .. } => "clear_semester",
            Self::InsertAt { .. } => "insert_at",
            Self::RemoveFrom { .. } => "remove_from",
            Self::Reorder { .. } => "reorder",
            Self::MoveBetween { .. } => "move_between",
            Self::InsertNew { .. } => "insert_new",
            Self::InsertSelected { .. } => "insert_selected",
            Self::MoveSelected { .. } => "move_selected",
            Self::RemoveSelectedFrom { .. } => "remove_selected_from",
            Self::ReorderSelected { .. } => "reorder_selected",
            Self::AddCourse(_) => "add_course",
            Self::UpdateCourse { .. } => "update_course",
            Self::RemoveCourse { .. } => "remove_course",
            Self::ToggleCompletion { .. } => "toggle_completion",
            Self::SetSelectedCompletion { .. } => "set_selected_completion",
            Self::RemoveSelected => "remove_selected",
            Self::Drop(_) => "drop",
        }
    }

    /// Bulk actions after which the selection is cleared. Setting completion
    /// on the selection leaves it in place.
    #[must_use]
    pub const fn consumes_selection(&self) -> bool {
        matches!(
            self,
            Self::InsertSelected { .. }
                | Self::MoveSelected { .. }
                | Self::RemoveSelectedFrom { .. }
                | Self::ReorderSelected { .. }
                | Self::RemoveSelected
        )
    }
}

const fn at(position: Option<usize>) -> usize {
    match position {
        Some(p) => p,
        None => usize::MAX,
    }
}

impl Plan {
    /// Apply one intent. Drop requests are resolved first.
    pub fn apply(&mut self, intent: &Intent, selection: &Selection) -> Outcome {
        match intent {
            Intent::AddSemester { kind, year } => self.add_semester(*kind, *year),
            Intent::RemoveSemester { semester } => self.remove_semester(semester.as_str()),
            Intent::RenameSemester { semester, name } => {
                self.rename_semester(semester.as_str(), name)
            }
            Intent::ClearSemester { semester } => self.clear_semester(semester.as_str()),
            Intent::InsertAt {
                semester,
                course,
                position,
            } => self.insert_at(semester.as_str(), course.as_str(), at(*position)),
            Intent::RemoveFrom { semester, course } => {
                self.remove_from(semester.as_str(), course.as_str())
            }
            Intent::Reorder { semester, from, to } => self.reorder(semester.as_str(), *from, *to),
            Intent::MoveBetween {
                from,
                to,
                course,
                position,
            } => self.move_between(from.as_str(), to.as_str(), course.as_str(), at(*position)),
            Intent::InsertNew {
                semester,
                course,
                position,
            } => self.insert_new_at(semester.as_str(), course.clone(), at(*position)),
            Intent::InsertSelected { semester, position } => {
                self.insert_selected_at(semester.as_str(), selection, at(*position))
            }
            Intent::MoveSelected { from, to, position } => {
                self.move_selected_between(from.as_str(), to.as_str(), selection, at(*position))
            }
            Intent::RemoveSelectedFrom { semester } => {
                self.remove_selected_from(semester.as_str(), selection)
            }
            Intent::ReorderSelected { semester, drop } => {
                self.reorder_selected(semester.as_str(), selection, *drop)
            }
            Intent::AddCourse(course) => self.add_course(course.clone()),
            Intent::UpdateCourse { course, patch } => self.update_course(course.as_str(), patch),
            Intent::RemoveCourse { course } => self.remove_course(course.as_str()),
            Intent::ToggleCompletion { course } => self.toggle_completion(course.as_str()),
            Intent::SetSelectedCompletion { completed } => {
                self.set_selected_completion(selection, *completed)
            }
            Intent::RemoveSelected => self.remove_selected(selection),
            Intent::Drop(request) => match request.resolve(self, selection) {
                Ok(resolved) => self.apply(&resolved, selection),
                Err(reason) => Outcome::Unchanged(reason),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::fixtures::{seq, small_plan};

    fn drop_in(source: DropSource, course: &str, target: &str, position: Option<usize>) -> DropRequest {
        DropRequest {
            source,
            course: course.into(),
            multi_select: false,
            target: DropTarget {
                semester: target.into(),
                position,
            },
        }
    }

    fn same(course: &str, position: Option<usize>) -> DropRequest {
        drop_in(DropSource::Semester("s1".into()), course, "s1", position)
    }

    #[test]
    fn dropping_on_own_slot_or_next_is_noop() {
        let plan = small_plan();
        let selection = Selection::new();
        assert_eq!(same("b", Some(1)).resolve(&plan, &selection), Err(Rejection::NoOp));
        assert_eq!(same("b", Some(2)).resolve(&plan, &selection), Err(Rejection::NoOp));
        assert_eq!(same("b", None).resolve(&plan, &selection), Err(Rejection::NoOp));
    }

    #[test]
    fn dragging_down_decrements_target() {
        let mut plan = small_plan();
        let selection = Selection::new();
        let intent = Intent::Drop(same("a", Some(3)));
        assert!(plan.apply(&intent, &selection).is_applied());
        assert_eq!(seq(&plan, "s1"), vec!["b", "c", "a"]);
    }

    #[test]
    fn dragging_up_keeps_target() {
        let mut plan = small_plan();
        let selection = Selection::new();
        let intent = Intent::Drop(same("c", Some(0)));
        assert!(plan.apply(&intent, &selection).is_applied());
        assert_eq!(seq(&plan, "s1"), vec!["c", "a", "b"]);
    }

    #[test]
    fn cross_semester_drop_moves() {
        let mut plan = small_plan();
        let selection = Selection::new();
        let intent = Intent::Drop(drop_in(DropSource::Semester("s1".into()), "b", "s2", None));
        assert!(plan.apply(&intent, &selection).is_applied());
        assert_eq!(seq(&plan, "s2"), vec!["d", "b"]);
    }

    #[test]
    fn pool_drop_inserts() {
        let mut plan = small_plan();
        let selection = Selection::new();
        let intent = Intent::Drop(drop_in(DropSource::Pool, "e", "s2", Some(0)));
        assert!(plan.apply(&intent, &selection).is_applied());
        assert_eq!(seq(&plan, "s2"), vec!["e", "d"]);
    }

    #[test]
    fn multi_select_with_selected_course_goes_bulk() {
        let plan = small_plan();
        let selection: Selection = ["e", "f"].into_iter().collect();
        let mut request = drop_in(DropSource::Pool, "e", "s2", Some(1));
        request.multi_select = true;
        assert_eq!(
            request.resolve(&plan, &selection),
            Ok(Intent::InsertSelected {
                semester: "s2".into(),
                position: Some(1)
            })
        );
    }

    #[test]
    fn multi_select_with_unselected_course_falls_back_to_single() {
        let plan = small_plan();
        let selection: Selection = ["f"].into_iter().collect();
        let mut request = drop_in(DropSource::Pool, "e", "s2", None);
        request.multi_select = true;
        assert_eq!(
            request.resolve(&plan, &selection),
            Ok(Intent::InsertAt {
                semester: "s2".into(),
                course: "e".into(),
                position: None
            })
        );
    }

    #[test]
    fn stale_drop_is_resolved_against_current_state() {
        let mut plan = small_plan();
        let selection = Selection::new();
        let request = drop_in(DropSource::Semester("s1".into()), "a", "s2", Some(0));
        assert!(plan.remove_from("s1", "a").is_applied());
        assert_eq!(
            plan.apply(&Intent::Drop(request), &selection),
            Outcome::Unchanged(Rejection::NotInSource)
        );
    }

    #[test]
    fn only_bulk_placement_intents_consume_selection() {
        assert!(Intent::RemoveSelected.consumes_selection());
        assert!(!Intent::SetSelectedCompletion { completed: true }.consumes_selection());
        assert!(
            !Intent::ToggleCompletion {
                course: "a".into()
            }
            .consumes_selection()
        );
    }
}
