use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{
    class_id, department_code, AttendanceRecord, AttendanceStatus, ClassInfo, Student, Teacher,
};

pub const DEPARTMENTS: [&str; 5] = [
    "Computer Science",
    "Electronics",
    "Mechanical",
    "Civil",
    "Information Technology",
];

pub const SECTIONS: [&str; 2] = ["A", "B"];

/// Trailing calendar days covered by the generated log, today included.
pub const WINDOW_DAYS: i64 = 30;

const STUDENT_COUNT: usize = 40;

const FIRST_NAMES: [&str; 20] = [
    "Aarav", "Priya", "Rohan", "Sneha", "Vikram", "Ananya", "Arjun", "Kavya", "Rahul", "Meera",
    "Siddharth", "Ishita", "Aditya", "Nisha", "Karan", "Tanvi", "Dev", "Riya", "Nikhil", "Pooja",
];

const LAST_NAMES: [&str; 20] = [
    "Sharma", "Patel", "Kumar", "Singh", "Gupta", "Reddy", "Joshi", "Mehta", "Nair", "Verma",
    "Iyer", "Desai", "Rao", "Chopra", "Bhat", "Malhotra", "Srinivasan", "Kapoor", "Menon",
    "Agarwal",
];

// (name, email, subject), one per department in DEPARTMENTS order.
const FACULTY: [(&str, &str, &str); 5] = [
    ("Prof. Anita Sharma", "anita.sharma@college.edu", "Data Structures"),
    ("Dr. Suresh Iyer", "suresh.iyer@college.edu", "Digital Circuits"),
    ("Prof. Manoj Verma", "manoj.verma@college.edu", "Thermodynamics"),
    ("Dr. Lakshmi Nair", "lakshmi.nair@college.edu", "Structural Analysis"),
    ("Prof. Farhan Qureshi", "farhan.qureshi@college.edu", "Database Systems"),
];

const STATUS_WEIGHTS: [(AttendanceStatus, f64); 3] = [
    (AttendanceStatus::Present, 0.75),
    (AttendanceStatus::Absent, 0.15),
    (AttendanceStatus::Late, 0.10),
];

/// Owned, read-only attendance dataset for one session.
#[derive(Debug, Clone, Default)]
pub struct AttendanceStore {
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    classes: Vec<ClassInfo>,
    records: Vec<AttendanceRecord>,
}

impl AttendanceStore {
    pub fn seeded(seed: u64, today: NaiveDate) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::generate(&mut rng, today)
    }

    pub fn generate<R: Rng>(rng: &mut R, today: NaiveDate) -> Self {
        let teachers = build_teachers();
        let classes = build_classes();
        let students = build_students(&classes, today);
        let records = build_records(rng, &students, &classes, today);

        tracing::info!(
            students = students.len(),
            teachers = teachers.len(),
            classes = classes.len(),
            records = records.len(),
            %today,
            "generated attendance log"
        );

        Self::from_parts(students, teachers, classes, records)
    }

    /// Assembles a store from prepared entities. Class student counts are
    /// recomputed from `students`.
    pub fn from_parts(
        students: Vec<Student>,
        teachers: Vec<Teacher>,
        mut classes: Vec<ClassInfo>,
        records: Vec<AttendanceRecord>,
    ) -> Self {
        for class in classes.iter_mut() {
            class.student_count = students
                .iter()
                .filter(|student| student.class_id() == class.id)
                .count();
        }

        Self {
            students,
            teachers,
            classes,
            records,
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn classes(&self) -> &[ClassInfo] {
        &self.classes
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.id == id)
    }

    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|teacher| teacher.id == id)
    }

    pub fn class(&self, id: &str) -> Option<&ClassInfo> {
        self.classes.iter().find(|class| class.id == id)
    }

    /// Departments in class order, followed by any only students mention.
    pub fn departments(&self) -> Vec<&str> {
        let mut departments: Vec<&str> = Vec::new();
        let named = self
            .classes
            .iter()
            .map(|class| class.department.as_str())
            .chain(self.students.iter().map(|student| student.department.as_str()));

        for department in named {
            if !departments.contains(&department) {
                departments.push(department);
            }
        }
        departments
    }

    pub fn students_in_class<'a>(
        &'a self,
        class_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Student> + 'a {
        self.students
            .iter()
            .filter(move |student| class_id.map_or(true, |id| student.class_id() == id))
    }

    pub fn records_for_student<'a>(
        &'a self,
        student_id: &'a str,
    ) -> impl Iterator<Item = &'a AttendanceRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.student_id == student_id)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn draw_status<R: Rng>(rng: &mut R) -> AttendanceStatus {
    let roll: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (status, weight) in STATUS_WEIGHTS {
        cumulative += weight;
        if roll < cumulative {
            return status;
        }
    }
    AttendanceStatus::Late
}

fn semester_for(department_index: usize, section_index: usize) -> u8 {
    ((department_index * SECTIONS.len() + section_index) % 8) as u8 + 1
}

fn teacher_id(department_index: usize) -> String {
    format!("TCH{:03}", department_index + 1)
}

fn build_teachers() -> Vec<Teacher> {
    DEPARTMENTS
        .iter()
        .zip(FACULTY.iter())
        .enumerate()
        .map(|(index, (department, (name, email, subject)))| Teacher {
            id: teacher_id(index),
            name: name.to_string(),
            email: email.to_string(),
            phone: format!("+91 99001 {:05}", 20001 + index),
            department: department.to_string(),
            subject: subject.to_string(),
            assigned_classes: SECTIONS
                .iter()
                .map(|section| class_id(department, section))
                .collect(),
        })
        .collect()
}

fn build_classes() -> Vec<ClassInfo> {
    let mut classes = Vec::with_capacity(DEPARTMENTS.len() * SECTIONS.len());
    for (department_index, department) in DEPARTMENTS.iter().enumerate() {
        for (section_index, section) in SECTIONS.iter().enumerate() {
            classes.push(ClassInfo {
                id: class_id(department, section),
                name: format!("{department} - Section {section}"),
                department: department.to_string(),
                section: section.to_string(),
                semester: semester_for(department_index, section_index),
                student_count: 0,
                teacher_id: teacher_id(department_index),
            });
        }
    }
    classes
}

fn build_students(classes: &[ClassInfo], today: NaiveDate) -> Vec<Student> {
    (0..STUDENT_COUNT)
        .map(|index| {
            let department = DEPARTMENTS[index % DEPARTMENTS.len()];
            let section = SECTIONS[(index / DEPARTMENTS.len()) % SECTIONS.len()];
            let first = FIRST_NAMES[index % FIRST_NAMES.len()];
            let last = LAST_NAMES[(index + (index / LAST_NAMES.len()) * 3) % LAST_NAMES.len()];
            let semester = classes
                .iter()
                .find(|class| class.department == department && class.section == section)
                .map_or(1, |class| class.semester);
            let enrolled_on = today - Duration::days(182 * i64::from(semester - 1) + 30);

            Student {
                id: format!("STU{:03}", index + 1),
                name: format!("{first} {last}"),
                roll_number: format!("{}{}", department_code(department), 2024001 + index),
                email: format!(
                    "{}.{}@college.edu",
                    first.to_lowercase(),
                    last.to_lowercase()
                ),
                phone: format!("+91 98765 {:05}", 10001 + index),
                department: department.to_string(),
                section: section.to_string(),
                semester,
                enrolled_on,
            }
        })
        .collect()
}

fn build_records<R: Rng>(
    rng: &mut R,
    students: &[Student],
    classes: &[ClassInfo],
    today: NaiveDate,
) -> Vec<AttendanceRecord> {
    let mut records = Vec::new();

    for offset in 0..WINDOW_DAYS {
        let date = today - Duration::days(offset);
        if is_weekend(date) {
            continue;
        }

        for student in students {
            let class_id = student.class_id();
            let marked_by = classes
                .iter()
                .find(|class| class.id == class_id)
                .map(|class| class.teacher_id.clone())
                .unwrap_or_default();

            records.push(AttendanceRecord {
                student_id: student.id.clone(),
                date,
                status: draw_status(rng),
                class_id,
                marked_by,
            });
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn today() -> NaiveDate {
        // A Wednesday.
        NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()
    }

    #[test]
    fn same_seed_produces_same_log() {
        let first = AttendanceStore::seeded(42, today());
        let second = AttendanceStore::seeded(42, today());
        assert_eq!(first.records(), second.records());
        assert_eq!(first.students(), second.students());
    }

    #[test]
    fn records_reference_existing_students_and_derived_classes() {
        let store = AttendanceStore::seeded(7, today());
        for record in store.records() {
            let student = store.student(&record.student_id).expect("unknown student");
            assert_eq!(record.class_id, class_id(&student.department, &student.section));
            let class = store.class(&record.class_id).expect("unknown class");
            assert_eq!(record.marked_by, class.teacher_id);
        }
    }

    #[test]
    fn one_record_per_student_per_weekday() {
        let store = AttendanceStore::seeded(7, today());
        let mut seen = HashSet::new();
        for record in store.records() {
            assert!(!is_weekend(record.date));
            assert!(record.date <= today());
            assert!(record.date > today() - Duration::days(WINDOW_DAYS));
            assert!(seen.insert((record.student_id.clone(), record.date)));
        }

        let weekdays = (0..WINDOW_DAYS)
            .map(|offset| today() - Duration::days(offset))
            .filter(|date| !is_weekend(*date))
            .count();
        assert_eq!(store.records().len(), weekdays * store.students().len());
    }

    #[test]
    fn class_counts_are_derived_from_students() {
        let store = AttendanceStore::seeded(1, today());
        assert_eq!(store.classes().len(), DEPARTMENTS.len() * SECTIONS.len());
        let total: usize = store.classes().iter().map(|class| class.student_count).sum();
        assert_eq!(total, store.students().len());
        for class in store.classes() {
            let enrolled = store.students_in_class(Some(class.id.as_str())).count();
            assert_eq!(class.student_count, enrolled);
        }
    }

    #[test]
    fn teachers_are_assigned_their_department_classes() {
        let store = AttendanceStore::seeded(1, today());
        let teacher = store.teacher("TCH001").unwrap();
        assert_eq!(teacher.department, "Computer Science");
        assert_eq!(teacher.assigned_classes, vec!["CO-A", "CO-B"]);
    }

    #[test]
    fn status_mix_roughly_follows_weights() {
        let mut rng = StdRng::seed_from_u64(99);
        let draws = 20_000;
        let present = (0..draws)
            .filter(|_| draw_status(&mut rng) == AttendanceStatus::Present)
            .count();
        let share = present as f64 / draws as f64;
        assert!((share - 0.75).abs() < 0.02, "present share was {share}");
    }

    #[test]
    fn departments_are_listed_once_in_order() {
        let store = AttendanceStore::seeded(1, today());
        assert_eq!(store.departments(), DEPARTMENTS.to_vec());
    }
}
