//! Derived credit totals. Recomputed on every read; never stored.

use serde::Serialize;
use std::collections::HashSet;

use crate::model::{Course, Requirements, Semester};

use super::Plan;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CreditTally {
    pub completed: u32,
    pub total: u32,
}

impl CreditTally {
    fn add(&mut self, course: &Course) {
        self.total = self.total.saturating_add(course.credits);
        if course.completed {
            self.completed = self.completed.saturating_add(course.credits);
        }
    }

    fn from_courses<'a>(courses: impl IntoIterator<Item = &'a Course>) -> Self {
        let mut tally = Self::default();
        for course in courses {
            tally.add(course);
        }
        tally
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTally {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(flatten)]
    pub credits: CreditTally,
}

/// Overall credits plus one tally per requirement group, in group order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub credits: CreditTally,
    pub groups: Vec<GroupTally>,
}

impl Totals {
    fn over(courses: &[&Course], requirements: &Requirements) -> Self {
        let credits = CreditTally::from_courses(courses.iter().copied());
        let groups = requirements
            .groups()
            .iter()
            .map(|group| GroupTally {
                id: group.id.clone(),
                name: group.name.clone(),
                color: group.color.clone(),
                credits: CreditTally::from_courses(
                    courses.iter().copied().filter(|c| c.counts_toward(&group.id)),
                ),
            })
            .collect();
        Self { credits, groups }
    }

    #[must_use]
    pub fn group(&self, id: &str) -> Option<CreditTally> {
        self.groups.iter().find(|g| g.id == id).map(|g| g.credits)
    }
}

/// Every distinct course in the pool or in a semester, each counted once.
fn counted_courses(plan: &Plan) -> Vec<&Course> {
    let mut seen = HashSet::new();
    plan.courses()
        .iter()
        .chain(plan.semesters().iter().flat_map(|s| plan.semester_courses(s)))
        .filter(|c| seen.insert(c.id.as_str()))
        .collect()
}

/// Credit totals for the whole plan.
#[must_use]
pub fn plan_totals(plan: &Plan, requirements: &Requirements) -> Totals {
    Totals::over(&counted_courses(plan), requirements)
}

/// Credit totals for one requirement group over the whole plan.
#[must_use]
pub fn group_totals(plan: &Plan, group_id: &str) -> CreditTally {
    CreditTally::from_courses(
        counted_courses(plan)
            .into_iter()
            .filter(|c| c.counts_toward(group_id)),
    )
}

/// Credit totals restricted to one semester's courses.
#[must_use]
pub fn semester_totals(plan: &Plan, semester: &Semester, requirements: &Requirements) -> Totals {
    let courses: Vec<&Course> = plan.semester_courses(semester).collect();
    Totals::over(&courses, requirements)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GraduationProgress {
    pub completed: u32,
    pub total: u32,
    pub target: u32,
    pub percent: f64,
}

/// Completed credits as a percentage of `max(total, target)`.
#[must_use]
pub fn graduation_progress(plan: &Plan, target: u32) -> GraduationProgress {
    let CreditTally { completed, total } = CreditTally::from_courses(counted_courses(plan));
    let denominator = total.max(target);
    let percent = if total == 0 || denominator == 0 {
        0.0
    } else {
        f64::from(completed) / f64::from(denominator) * 100.0
    };
    GraduationProgress {
        completed,
        total,
        target,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RequirementGroup, SemesterKind};

    fn two_course_pool() -> Plan {
        let one = Course::new("1", "ONE", "One", 3)
            .completed(true)
            .with_requirements(["A"]);
        let two = Course::new("2", "TWO", "Two", 4).with_requirements(["A", "B"]);
        Plan::from_parts(vec![one, two], Vec::new())
    }

    fn groups_ab() -> Requirements {
        Requirements::from_loaded(vec![
            RequirementGroup::new("A", "Group A", "#000000", 1),
            RequirementGroup::new("B", "Group B", "#ffffff", 2),
        ])
    }

    #[test]
    fn unvalidated_credit_weights_saturate_instead_of_overflowing() {
        let heavy = Course::new("h", "HVY", "Heavy", u32::MAX).completed(true);
        let light = Course::new("l", "LGT", "Light", 3).completed(true);
        let plan = Plan::from_parts(vec![heavy, light], Vec::new());
        let totals = plan_totals(&plan, &Requirements::default());
        assert_eq!(totals.credits.total, u32::MAX);
        assert_eq!(totals.credits.completed, u32::MAX);
    }

    #[test]
    fn pool_only_totals() {
        let plan = two_course_pool();
        let totals = plan_totals(&plan, &groups_ab());
        assert_eq!(totals.credits, CreditTally { completed: 3, total: 7 });
        assert_eq!(totals.group("A"), Some(CreditTally { completed: 3, total: 7 }));
        assert_eq!(totals.group("B"), Some(CreditTally { completed: 0, total: 4 }));
        assert_eq!(group_totals(&plan, "B"), CreditTally { completed: 0, total: 4 });
    }

    #[test]
    fn placed_course_is_counted_once() {
        let mut plan = two_course_pool();
        assert!(plan.add_semester(SemesterKind::Summer, 2025).is_applied());
        let id = plan
            .find_term(SemesterKind::Summer, 2025)
            .map(|s| s.id.clone())
            .expect("semester added");
        assert!(plan.append(id.as_str(), "2").is_applied());

        let totals = plan_totals(&plan, &groups_ab());
        assert_eq!(totals.credits.total, 7);

        let semester = plan.semester(id.as_str()).expect("semester present");
        let per = semester_totals(&plan, semester, &groups_ab());
        assert_eq!(per.credits, CreditTally { completed: 0, total: 4 });
        assert_eq!(per.group("A"), Some(CreditTally { completed: 0, total: 4 }));
    }

    #[test]
    fn graduation_progress_uses_target_floor() {
        let plan = two_course_pool();
        let progress = graduation_progress(&plan, 120);
        assert!((progress.percent - 2.5).abs() < 1e-9);

        let progress = graduation_progress(&plan, 0);
        assert!((progress.percent - 300.0 / 7.0).abs() < 1e-9);

        let empty = graduation_progress(&Plan::default(), 120);
        assert!(empty.percent.abs() < f64::EPSILON);
    }
}
