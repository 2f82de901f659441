use crate::dataset::AttendanceStore;
use crate::marking::MarkSheet;
use crate::models::{AttendanceStatus, ClassStats};
use crate::session::{Actor, Role};
use crate::stats::Aggregator;

/// Narrows a requested class to what the actor may see, falling back to the
/// actor's default class for scoped roles.
pub fn scoped_class(actor: &Actor, requested: Option<String>) -> anyhow::Result<Option<String>> {
    match requested {
        Some(class_id) => {
            if !actor.can_view_class(&class_id) {
                tracing::debug!(actor = %actor.id, %class_id, "class outside session scope");
                anyhow::bail!("{} cannot view class {}", actor.name, class_id);
            }
            Ok(Some(class_id))
        }
        None => Ok(actor.default_class().map(str::to_string)),
    }
}

pub fn ensure_department_visible(actor: &Actor, department: Option<&str>) -> anyhow::Result<()> {
    if let (Some(department), Some(own)) = (department, actor.department.as_deref()) {
        if actor.role != Role::Admin && department != own {
            anyhow::bail!("{} cannot view the {} department", actor.name, department);
        }
    }
    Ok(())
}

pub fn ensure_student_visible(
    actor: &Actor,
    store: &AttendanceStore,
    student_id: &str,
) -> anyhow::Result<()> {
    // Unknown ids fall through so the view can report them.
    if store.student(student_id).is_some() && !actor.can_view_student(store, student_id) {
        anyhow::bail!("{} cannot view student {}", actor.name, student_id);
    }
    Ok(())
}

pub fn ensure_admin(actor: &Actor) -> anyhow::Result<()> {
    anyhow::ensure!(
        actor.role == Role::Admin,
        "this view is only available to admins"
    );
    Ok(())
}

/// Marking, reports and exports belong to teachers and admins.
pub fn ensure_staff(actor: &Actor) -> anyhow::Result<()> {
    anyhow::ensure!(
        matches!(actor.role, Role::Admin | Role::Teacher),
        "this view is only available to teachers and admins"
    );
    Ok(())
}

/// Builds today's sheet for the actor's class and applies the requested edits
/// on top of the statuses already recorded.
pub fn build_mark_sheet(
    aggregator: &Aggregator<'_>,
    actor: &Actor,
    requested_class: Option<String>,
    absent: &[String],
    late: &[String],
) -> anyhow::Result<MarkSheet> {
    ensure_staff(actor)?;
    let class_id = scoped_class(actor, requested_class)?;
    let mut sheet = MarkSheet::for_class(aggregator, class_id.as_deref());

    let marks = [(absent, AttendanceStatus::Absent), (late, AttendanceStatus::Late)];
    for (ids, status) in marks {
        for id in ids {
            if !sheet.set(id, status) {
                anyhow::bail!("{id} is not on the sheet for this class");
            }
        }
    }
    Ok(sheet)
}

pub fn visible_class_stats(aggregator: &Aggregator<'_>, actor: &Actor) -> Vec<ClassStats> {
    aggregator.class_stats(actor.visible_classes(aggregator.store()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::clock::FixedClock;
    use crate::models::AttendanceFilter;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()
    }

    fn store() -> AttendanceStore {
        AttendanceStore::seeded(4, today())
    }

    #[test]
    fn teacher_cannot_reach_another_department_class() {
        let store = store();
        let teacher = Actor::demo(Role::Teacher, &store);

        let error = scoped_class(&teacher, Some("EL-A".to_string())).unwrap_err();
        assert!(error.to_string().contains("cannot view class EL-A"));
        assert_eq!(
            scoped_class(&teacher, Some("CO-B".to_string())).unwrap(),
            Some("CO-B".to_string())
        );
        assert!(ensure_department_visible(&teacher, Some("Electronics")).is_err());
        assert!(ensure_department_visible(&teacher, Some("Computer Science")).is_ok());
    }

    #[test]
    fn scoped_roles_fall_back_to_their_default_class() {
        let store = store();
        let teacher = Actor::demo(Role::Teacher, &store);
        let student = Actor::demo(Role::Student, &store);
        let admin = Actor::demo(Role::Admin, &store);

        assert_eq!(scoped_class(&teacher, None).unwrap(), Some("CO-A".to_string()));
        assert_eq!(scoped_class(&student, None).unwrap(), Some("CO-A".to_string()));
        assert_eq!(scoped_class(&admin, None).unwrap(), None);
        assert_eq!(
            scoped_class(&admin, Some("XX-Z".to_string())).unwrap(),
            Some("XX-Z".to_string())
        );
    }

    #[test]
    fn student_visibility_and_admin_views() {
        let store = store();
        let student = Actor::demo(Role::Student, &store);
        let admin = Actor::demo(Role::Admin, &store);

        assert!(ensure_student_visible(&student, &store, "STU001").is_ok());
        assert!(ensure_student_visible(&student, &store, "STU002").is_err());
        assert!(ensure_student_visible(&student, &store, "STU999").is_ok());
        assert!(ensure_admin(&admin).is_ok());
        assert!(ensure_admin(&student).is_err());
    }

    #[test]
    fn mark_sheet_keeps_todays_recorded_statuses() {
        let store = store();
        let aggregator = Aggregator::new(&store, &FixedClock(today()));
        let teacher = Actor::demo(Role::Teacher, &store);
        let expected = aggregator.today_attendance(Some("CO-A"));

        let sheet = build_mark_sheet(&aggregator, &teacher, None, &[], &[]).unwrap();
        assert_eq!(sheet.entries().len(), expected.len());
        for entry in expected.iter() {
            assert_eq!(sheet.status_of(&entry.student.id), Some(entry.status));
        }

        let recorded = aggregator
            .attendance_stats(&AttendanceFilter::default().class("CO-A").on(today()));
        let summary = sheet.summary();
        assert_eq!(
            (summary.present, summary.absent, summary.late),
            (recorded.present, recorded.absent, recorded.late)
        );
    }

    #[test]
    fn mark_edits_apply_on_top_of_prefilled_sheet() {
        let store = store();
        let aggregator = Aggregator::new(&store, &FixedClock(today()));
        let admin = Actor::demo(Role::Admin, &store);
        let before = aggregator.today_attendance(Some("CO-A"));

        let sheet = build_mark_sheet(
            &aggregator,
            &admin,
            Some("CO-A".to_string()),
            &["STU011".to_string()],
            &[],
        )
        .unwrap();
        assert_eq!(sheet.status_of("STU011"), Some(AttendanceStatus::Absent));
        for entry in before.iter().filter(|entry| entry.student.id != "STU011") {
            assert_eq!(sheet.status_of(&entry.student.id), Some(entry.status));
        }

        let stray = build_mark_sheet(
            &aggregator,
            &admin,
            Some("CO-A".to_string()),
            &[],
            &["STU002".to_string()],
        );
        assert!(stray.is_err());
    }

    #[test]
    fn students_cannot_mark_attendance() {
        let store = store();
        let aggregator = Aggregator::new(&store, &FixedClock(today()));
        let student = Actor::demo(Role::Student, &store);

        assert!(build_mark_sheet(&aggregator, &student, None, &[], &[]).is_err());
        assert!(ensure_staff(&student).is_err());
        assert!(ensure_staff(&Actor::demo(Role::Teacher, &store)).is_ok());
    }

    #[test]
    fn class_listing_follows_session_scope() {
        let store = store();
        let aggregator = Aggregator::new(&store, &FixedClock(today()));

        let teacher = Actor::demo(Role::Teacher, &store);
        let ids: Vec<String> = visible_class_stats(&aggregator, &teacher)
            .into_iter()
            .map(|entry| entry.class_info.id)
            .collect();
        assert_eq!(ids, vec!["CO-A", "CO-B"]);

        let admin = Actor::demo(Role::Admin, &store);
        assert_eq!(visible_class_stats(&aggregator, &admin).len(), store.classes().len());
    }
}
