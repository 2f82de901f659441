use serde::Serialize;

use crate::models::AttendanceStatus;
use crate::stats::Aggregator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkEntry {
    pub student_id: String,
    pub name: String,
    pub roll_number: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarkSummary {
    pub present: usize,
    pub absent: usize,
    pub late: usize,
}

/// Unsaved attendance for one class and day. Edits stay on the sheet; the
/// attendance log it was filled from is never touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkSheet {
    pub class_id: Option<String>,
    entries: Vec<MarkEntry>,
}

impl MarkSheet {
    pub fn for_class(aggregator: &Aggregator<'_>, class_id: Option<&str>) -> Self {
        let entries = aggregator
            .today_attendance(class_id)
            .into_iter()
            .map(|entry| MarkEntry {
                student_id: entry.student.id,
                name: entry.student.name,
                roll_number: entry.student.roll_number,
                status: entry.status,
            })
            .collect();

        Self {
            class_id: class_id.map(str::to_string),
            entries,
        }
    }

    pub fn entries(&self) -> &[MarkEntry] {
        &self.entries
    }

    /// Returns false when the student is not on this sheet.
    pub fn set(&mut self, student_id: &str, status: AttendanceStatus) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.student_id == student_id)
        {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        }
    }

    pub fn status_of(&self, student_id: &str) -> Option<AttendanceStatus> {
        self.entries
            .iter()
            .find(|entry| entry.student_id == student_id)
            .map(|entry| entry.status)
    }

    pub fn summary(&self) -> MarkSummary {
        let mut summary = MarkSummary::default();
        for entry in self.entries.iter() {
            match entry.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::Late => summary.late += 1,
            }
        }
        summary
    }
}
