use std::fmt::Write;

use crate::models::AttendanceFilter;
use crate::stats::Aggregator;

pub fn build_report(aggregator: &Aggregator<'_>, class_id: Option<&str>, threshold: u32) -> String {
    let store = aggregator.store();
    let mut filter = AttendanceFilter::default();
    filter.class_id = class_id.map(str::to_string);
    let overall = aggregator.attendance_stats(&filter);
    let today = aggregator.attendance_stats(&filter.clone().on(aggregator.today()));

    let mut output = String::new();
    let scope_label = class_id
        .map(|id| {
            store
                .class(id)
                .map_or_else(|| id.to_string(), |class| format!("{} ({})", class.name, class.id))
        })
        .unwrap_or_else(|| "all classes".to_string());

    let _ = writeln!(output, "# Attendance Report");
    let _ = writeln!(
        output,
        "Generated for {} as of {}",
        scope_label,
        aggregator.today()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");

    if overall.total == 0 {
        let _ = writeln!(output, "No attendance recorded for this scope.");
    } else {
        let _ = writeln!(
            output,
            "- {} records: {} present ({}%), {} absent ({}%), {} late ({}%)",
            overall.total,
            overall.present,
            overall.present_percent,
            overall.absent,
            overall.absent_percent,
            overall.late,
            overall.late_percent
        );
        let _ = writeln!(
            output,
            "- Today: {} present, {} absent, {} late",
            today.present, today.absent, today.late
        );
    }

    if class_id.is_none() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Departments");
        let _ = writeln!(output, "| Department | Students | Present % | Absent % | Late % |");
        let _ = writeln!(output, "|---|---|---|---|---|");
        for department in aggregator.department_stats() {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                department.department,
                department.students,
                department.stats.present_percent,
                department.stats.absent_percent,
                department.stats.late_percent
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## This Week");
    for bucket in aggregator.weekly_data(class_id) {
        let _ = writeln!(
            output,
            "- {} {}: {} present, {} absent, {} late",
            bucket.day, bucket.date, bucket.present, bucket.absent, bucket.late
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Trend");
    for point in aggregator.monthly_trend() {
        let _ = writeln!(
            output,
            "- {} ({} to {}): {}% present",
            point.week, point.start, point.end, point.attendance
        );
    }

    let low = aggregator.low_attendance_in(class_id, threshold);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Students Below {}%", threshold);

    if low.is_empty() {
        let _ = writeln!(output, "No students below threshold.");
    } else {
        for entry in low.iter() {
            let _ = writeln!(
                output,
                "- {} ({}, {}) {}% [{}]",
                entry.student.name,
                entry.student.roll_number,
                entry.student.class_id(),
                entry.percent,
                entry.risk
            );
        }
    }

    output
}
