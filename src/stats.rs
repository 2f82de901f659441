use chrono::{Datelike, Duration, NaiveDate};

use crate::clock::Clock;
use crate::dataset::AttendanceStore;
use crate::models::{
    AttendanceFilter, AttendanceRecord, AttendanceStats, AttendanceStatus, ClassInfo, ClassStats,
    DepartmentStats, LowAttendance, RiskLevel, StudentSummary, TodayEntry, TrendPoint,
    WeekdayBucket,
};

pub const DEFAULT_LOW_THRESHOLD: u32 = 75;

const WEEKDAYS: [&str; 5] = ["Mon", "Tue", "Wed", "Thu", "Fri"];
const TREND_WEEKS: i64 = 4;

/// `round(count / total * 100)` with halves rounded up; 0 when `total` is 0.
pub fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count * 200 + total) / (total * 2)) as u32
}

pub fn tally<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> AttendanceStats {
    let mut stats = AttendanceStats::default();
    for record in records {
        stats.total += 1;
        match record.status {
            AttendanceStatus::Present => stats.present += 1,
            AttendanceStatus::Absent => stats.absent += 1,
            AttendanceStatus::Late => stats.late += 1,
        }
    }
    stats.present_percent = percent(stats.present, stats.total);
    stats.absent_percent = percent(stats.absent, stats.total);
    stats.late_percent = percent(stats.late, stats.total);
    stats
}

/// Read-only queries over an [`AttendanceStore`] as of one calendar day.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    store: &'a AttendanceStore,
    today: NaiveDate,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a AttendanceStore, clock: &dyn Clock) -> Self {
        Self {
            store,
            today: clock.today(),
        }
    }

    pub fn store(&self) -> &'a AttendanceStore {
        self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn attendance_stats(&self, filter: &AttendanceFilter) -> AttendanceStats {
        tally(
            self.store
                .records()
                .iter()
                .filter(|record| filter.matches(record)),
        )
    }

    /// Share of a student's days marked present or late.
    pub fn student_attendance_percent(&self, student_id: &str) -> u32 {
        let mut total = 0;
        let mut attended = 0;
        for record in self.store.records_for_student(student_id) {
            total += 1;
            if record.status.is_attended() {
                attended += 1;
            }
        }
        percent(attended, total)
    }

    pub fn student_summary(&self, student_id: &str) -> Option<StudentSummary> {
        let student = self.store.student(student_id)?;
        Some(StudentSummary {
            student: student.clone(),
            percent: self.student_attendance_percent(student_id),
            stats: tally(self.store.records_for_student(student_id)),
        })
    }

    /// A student's records, newest first.
    pub fn student_history(
        &self,
        student_id: &str,
        status: Option<AttendanceStatus>,
    ) -> Vec<&'a AttendanceRecord> {
        let mut history: Vec<&'a AttendanceRecord> = self
            .store
            .records()
            .iter()
            .filter(|record| record.student_id == student_id)
            .filter(|record| status.map_or(true, |wanted| record.status == wanted))
            .collect();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history
    }

    pub fn week_start(&self) -> NaiveDate {
        let from_sunday = self.today.weekday().num_days_from_sunday();
        let back = if from_sunday == 0 { 6 } else { from_sunday - 1 };
        self.today - Duration::days(i64::from(back))
    }

    pub fn weekly_data(&self, class_id: Option<&str>) -> Vec<WeekdayBucket> {
        let monday = self.week_start();
        WEEKDAYS
            .into_iter()
            .enumerate()
            .map(|(index, day)| {
                let date = monday + Duration::days(index as i64);
                let mut filter = AttendanceFilter::default().on(date);
                filter.class_id = class_id.map(str::to_string);
                let stats = self.attendance_stats(&filter);
                WeekdayBucket {
                    day,
                    date,
                    present: stats.present,
                    absent: stats.absent,
                    late: stats.late,
                }
            })
            .collect()
    }

    /// Present share for each of the last four 7-day windows, oldest first.
    pub fn monthly_trend(&self) -> Vec<TrendPoint> {
        (0..TREND_WEEKS)
            .map(|index| {
                let weeks_back = TREND_WEEKS - 1 - index;
                let end = self.today - Duration::days(weeks_back * 7);
                let start = end - Duration::days(6);
                let stats = tally(
                    self.store
                        .records()
                        .iter()
                        .filter(|record| record.date >= start && record.date <= end),
                );
                TrendPoint {
                    week: format!("Week {}", index + 1),
                    start,
                    end,
                    attendance: percent(stats.present, stats.total),
                }
            })
            .collect()
    }

    /// Today's status per student; students with no record yet read as present.
    pub fn today_attendance(&self, class_id: Option<&str>) -> Vec<TodayEntry> {
        self.store
            .students_in_class(class_id)
            .map(|student| {
                let status = self
                    .store
                    .records()
                    .iter()
                    .find(|record| record.student_id == student.id && record.date == self.today)
                    .map_or(AttendanceStatus::Present, |record| record.status);
                TodayEntry {
                    student: student.clone(),
                    status,
                }
            })
            .collect()
    }

    pub fn low_attendance_students(&self, threshold: u32) -> Vec<LowAttendance> {
        self.low_attendance_in(None, threshold)
    }

    pub fn low_attendance_in(&self, class_id: Option<&str>, threshold: u32) -> Vec<LowAttendance> {
        let mut flagged: Vec<LowAttendance> = self
            .store
            .students_in_class(class_id)
            .filter_map(|student| {
                let percent = self.student_attendance_percent(&student.id);
                (percent < threshold).then(|| LowAttendance {
                    student: student.clone(),
                    percent,
                    risk: RiskLevel::for_percent(percent),
                })
            })
            .collect();
        flagged.sort_by_key(|entry| entry.percent);
        flagged
    }

    pub fn department_stats(&self) -> Vec<DepartmentStats> {
        self.store
            .departments()
            .into_iter()
            .map(|department| DepartmentStats {
                department: department.to_string(),
                students: self
                    .store
                    .students()
                    .iter()
                    .filter(|student| student.department == department)
                    .count(),
                stats: self.attendance_stats(&AttendanceFilter::default().department(department)),
            })
            .collect()
    }

    pub fn class_stats<'c, I>(&self, classes: I) -> Vec<ClassStats>
    where
        I: IntoIterator<Item = &'c ClassInfo>,
    {
        classes
            .into_iter()
            .map(|class_info| ClassStats {
                class_info: class_info.clone(),
                stats: self.attendance_stats(&AttendanceFilter::default().class(&class_info.id)),
            })
            .collect()
    }
}
