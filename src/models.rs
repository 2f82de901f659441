use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }

    /// Whether this status counts toward a student's own attendance percent.
    pub fn is_attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "late" => Ok(AttendanceStatus::Late),
            other => Err(format!("unknown attendance status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub section: String,
    pub semester: u8,
    pub enrolled_on: NaiveDate,
}

impl Student {
    pub fn class_id(&self) -> String {
        class_id(&self.department, &self.section)
    }

    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub subject: String,
    pub assigned_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassInfo {
    pub id: String,
    pub name: String,
    pub department: String,
    pub section: String,
    pub semester: u8,
    pub student_count: usize,
    pub teacher_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub class_id: String,
    pub marked_by: String,
}

/// Upper-cased first two letters of a department name.
pub fn department_code(department: &str) -> String {
    department.chars().take(2).collect::<String>().to_uppercase()
}

pub fn class_id(department: &str, section: &str) -> String {
    format!("{}-{}", department_code(department), section)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub class_id: Option<String>,
    pub department: Option<String>,
    pub date: Option<NaiveDate>,
}

impl AttendanceFilter {
    pub fn class(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        if let Some(class_id) = &self.class_id {
            if &record.class_id != class_id {
                return false;
            }
        }
        if let Some(department) = &self.department {
            let prefix = format!("{}-", department_code(department));
            if !record.class_id.starts_with(&prefix) {
                return false;
            }
        }
        if let Some(date) = self.date {
            if record.date != date {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub present_percent: u32,
    pub absent_percent: u32,
    pub late_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayBucket {
    pub day: &'static str,
    pub date: NaiveDate,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub week: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub attendance: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayEntry {
    #[serde(flatten)]
    pub student: Student,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Critical,
    Warning,
}

impl RiskLevel {
    pub fn for_percent(percent: u32) -> Self {
        if percent < 50 {
            RiskLevel::Critical
        } else {
            RiskLevel::Warning
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Critical => f.write_str("Critical"),
            RiskLevel::Warning => f.write_str("Warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowAttendance {
    #[serde(flatten)]
    pub student: Student,
    pub percent: u32,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentStats {
    pub department: String,
    pub students: usize,
    #[serde(flatten)]
    pub stats: AttendanceStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassStats {
    #[serde(rename = "class")]
    pub class_info: ClassInfo,
    #[serde(flatten)]
    pub stats: AttendanceStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentSummary {
    pub student: Student,
    pub percent: u32,
    #[serde(flatten)]
    pub stats: AttendanceStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(class_id: &str, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord {
            student_id: "STU001".to_string(),
            date,
            status: AttendanceStatus::Present,
            class_id: class_id.to_string(),
            marked_by: "TCH001".to_string(),
        }
    }

    #[test]
    fn class_id_uses_first_two_letters_of_department() {
        assert_eq!(class_id("Computer Science", "A"), "CO-A");
        assert_eq!(class_id("electronics", "B"), "EL-B");
        assert_eq!(class_id("X", "C"), "X-C");
    }

    #[test]
    fn department_filter_matches_class_prefix() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let filter = AttendanceFilter::default().department("Civil");
        assert!(filter.matches(&record("CI-A", date)));
        assert!(!filter.matches(&record("CO-A", date)));
    }

    #[test]
    fn filters_apply_conjunctively() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let other = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        let filter = AttendanceFilter::default().class("CO-A").on(date);
        assert!(filter.matches(&record("CO-A", date)));
        assert!(!filter.matches(&record("CO-A", other)));
        assert!(!filter.matches(&record("CO-B", date)));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("LATE".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Late));
        assert!("excused".parse::<AttendanceStatus>().is_err());
    }

    #[test]
    fn risk_level_splits_at_fifty() {
        assert_eq!(RiskLevel::for_percent(49), RiskLevel::Critical);
        assert_eq!(RiskLevel::for_percent(50), RiskLevel::Warning);
    }
}
