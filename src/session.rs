use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::dataset::AttendanceStore;
use crate::models::ClassInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Teacher => f.write_str("teacher"),
            Role::Student => f.write_str("student"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// The signed-in user a view is rendered for. Queries never consult this;
/// callers narrow their class arguments with it first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    pub assigned_classes: Vec<String>,
}

impl Actor {
    /// Fixed demo account for `role`, filled in from the generated roster.
    pub fn demo(role: Role, store: &AttendanceStore) -> Self {
        match role {
            Role::Admin => Actor {
                id: "ADM001".to_string(),
                name: "Dr. Rajesh Kumar".to_string(),
                email: "admin@college.edu".to_string(),
                role,
                department: None,
                assigned_classes: Vec::new(),
            },
            Role::Teacher => match store.teacher("TCH001") {
                Some(teacher) => Actor {
                    id: teacher.id.clone(),
                    name: teacher.name.clone(),
                    email: teacher.email.clone(),
                    role,
                    department: Some(teacher.department.clone()),
                    assigned_classes: teacher.assigned_classes.clone(),
                },
                None => Actor {
                    id: "TCH001".to_string(),
                    name: "Prof. Anita Sharma".to_string(),
                    email: "teacher@college.edu".to_string(),
                    role,
                    department: None,
                    assigned_classes: Vec::new(),
                },
            },
            Role::Student => match store.student("STU001") {
                Some(student) => Actor {
                    id: student.id.clone(),
                    name: student.name.clone(),
                    email: student.email.clone(),
                    role,
                    department: Some(student.department.clone()),
                    assigned_classes: vec![student.class_id()],
                },
                None => Actor {
                    id: "STU001".to_string(),
                    name: "Aarav Sharma".to_string(),
                    email: "student@college.edu".to_string(),
                    role,
                    department: None,
                    assigned_classes: Vec::new(),
                },
            },
        }
    }

    pub fn can_view_class(&self, class_id: &str) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Teacher | Role::Student => {
                self.assigned_classes.iter().any(|assigned| assigned == class_id)
            }
        }
    }

    pub fn can_view_student(&self, store: &AttendanceStore, student_id: &str) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Student => self.id == student_id,
            Role::Teacher => store
                .student(student_id)
                .map_or(false, |student| self.can_view_class(&student.class_id())),
        }
    }

    pub fn visible_classes<'a>(&self, store: &'a AttendanceStore) -> Vec<&'a ClassInfo> {
        store
            .classes()
            .iter()
            .filter(|class| self.can_view_class(&class.id))
            .collect()
    }

    /// Class a view should default to when the caller did not pick one.
    pub fn default_class(&self) -> Option<&str> {
        match self.role {
            Role::Admin => None,
            Role::Teacher | Role::Student => self.assigned_classes.first().map(String::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn store() -> AttendanceStore {
        AttendanceStore::seeded(8, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap())
    }

    #[test]
    fn admin_sees_every_class() {
        let store = store();
        let admin = Actor::demo(Role::Admin, &store);
        assert_eq!(admin.visible_classes(&store).len(), store.classes().len());
        assert!(admin.can_view_class("XX-Z"));
        assert_eq!(admin.default_class(), None);
    }

    #[test]
    fn teacher_is_limited_to_assigned_classes() {
        let store = store();
        let teacher = Actor::demo(Role::Teacher, &store);
        let visible: Vec<&str> = teacher
            .visible_classes(&store)
            .iter()
            .map(|class| class.id.as_str())
            .collect();
        assert_eq!(visible, vec!["CO-A", "CO-B"]);
        assert!(!teacher.can_view_class("EL-A"));
        assert_eq!(teacher.default_class(), Some("CO-A"));
        assert!(teacher.can_view_student(&store, "STU001"));
        assert!(!teacher.can_view_student(&store, "STU002"));
    }

    #[test]
    fn student_only_sees_self() {
        let store = store();
        let student = Actor::demo(Role::Student, &store);
        assert!(student.can_view_student(&store, "STU001"));
        assert!(!student.can_view_student(&store, "STU006"));
        assert_eq!(student.assigned_classes, vec!["CO-A"]);
    }

    #[test]
    fn roles_parse_from_cli_words() {
        assert_eq!("Teacher".parse::<Role>(), Ok(Role::Teacher));
        assert!("dean".parse::<Role>().is_err());
    }
}
