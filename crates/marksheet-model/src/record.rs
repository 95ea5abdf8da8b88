use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::semester::SemesterKey;

/// One subject row of a semester result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Subject code as printed by the portal (e.g., "BCS301").
    pub code: String,
    /// Full subject name, upper-cased and whitespace-normalized.
    pub name: String,
    /// Short code resolved from the semester's subject map, or the full name
    /// when no title matched.
    pub short_code: String,
    pub internal: String,
    pub external: String,
    /// Total marks as printed. Only a non-negative integer counts toward the
    /// aggregate.
    pub total: String,
    /// Pass/fail indicator (e.g., "P", "F", "A").
    pub result: String,
}

impl SubjectRecord {
    /// The numeric total, or `None` if the printed total is empty or not a
    /// non-negative integer.
    pub fn total_marks(&self) -> Option<u32> {
        self.total.trim().parse::<u32>().ok()
    }

    pub fn passed(&self) -> bool {
        self.result.trim().eq_ignore_ascii_case("P")
    }
}

/// A normalized semester result for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub usn: String,
    pub student_name: String,
    pub subjects: Vec<SubjectRecord>,
    /// Sum of the numeric subject totals. Wider than a single subject's
    /// total so page input cannot overflow it.
    pub total: u64,
    /// Number of subjects contributing to `total`.
    pub counted: usize,
    /// `total / (counted * 100) * 100`, rounded to two places; 0 when nothing counted.
    pub percentage: f64,
}

impl ResultRecord {
    /// Build a record and compute its aggregate from the subject rows.
    ///
    /// Subjects whose total is not numeric are kept in `subjects` but left out
    /// of both the sum and the count.
    pub fn new(usn: String, student_name: String, subjects: Vec<SubjectRecord>) -> Self {
        let (total, counted) = subjects
            .iter()
            .filter_map(SubjectRecord::total_marks)
            .fold((0u64, 0usize), |(sum, n), marks| {
                (sum.saturating_add(u64::from(marks)), n + 1)
            });

        Self {
            usn,
            student_name,
            subjects,
            total,
            counted,
            percentage: percentage(total, counted),
        }
    }

    /// Look up the first subject with the given short code.
    pub fn subject(&self, short_code: &str) -> Option<&SubjectRecord> {
        self.subjects.iter().find(|s| s.short_code == short_code)
    }

    /// Spreadsheet-style row: USN, name, one total per short code of the
    /// semester map (declared order, blank when missing), total, percentage.
    ///
    /// When several rows share a short code, the last one wins, matching how
    /// the manual lookup tool filled its sheet.
    pub fn marks_row(&self, semester: SemesterKey) -> Vec<String> {
        let mut row = vec![self.usn.clone(), self.student_name.clone()];
        for short in semester.short_codes() {
            let marks = self
                .subjects
                .iter()
                .rev()
                .find(|s| s.short_code == short)
                .map(|s| s.total.clone())
                .unwrap_or_default();
            row.push(marks);
        }
        row.push(self.total.to_string());
        // Debug keeps the decimal point on whole numbers: "80.0", not "80"
        row.push(format!("{:?}", self.percentage));
        row
    }

    /// Header matching [`ResultRecord::marks_row`].
    pub fn marks_header(semester: SemesterKey) -> Vec<String> {
        let mut header = vec!["USN".to_string(), "Student Name".to_string()];
        header.extend(semester.short_codes().into_iter().map(str::to_string));
        header.push("TOTAL".to_string());
        header.push("PERCENTAGE".to_string());
        header
    }
}

fn percentage(total: u64, counted: usize) -> f64 {
    if counted == 0 {
        return 0.0;
    }
    let raw = total as f64 / (counted as f64 * 100.0) * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Results of one submission: one entry per semester, `None` where no result
/// was requested or none could be extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub usn: String,
    pub fetched_at: String,
    pub semesters: BTreeMap<SemesterKey, Option<ResultRecord>>,
}

impl CombinedResult {
    /// Assemble from per-semester outcomes, filling any semester not present
    /// in `entries` with `None`.
    pub fn new(
        usn: &str,
        entries: impl IntoIterator<Item = (SemesterKey, Option<ResultRecord>)>,
    ) -> Self {
        let mut semesters: BTreeMap<SemesterKey, Option<ResultRecord>> =
            SemesterKey::ALL.into_iter().map(|k| (k, None)).collect();
        semesters.extend(entries);

        Self {
            usn: usn.to_string(),
            fetched_at: chrono::Utc::now().to_rfc3339(),
            semesters,
        }
    }

    pub fn get(&self, semester: SemesterKey) -> Option<&ResultRecord> {
        self.semesters.get(&semester).and_then(Option::as_ref)
    }

    /// Semesters that produced a result, in semester order.
    pub fn found(&self) -> impl Iterator<Item = (SemesterKey, &ResultRecord)> {
        self.semesters
            .iter()
            .filter_map(|(k, r)| r.as_ref().map(|r| (*k, r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(short: &str, total: &str) -> SubjectRecord {
        SubjectRecord {
            code: format!("X{short}"),
            name: short.to_string(),
            short_code: short.to_string(),
            internal: String::new(),
            external: String::new(),
            total: total.to_string(),
            result: "P".to_string(),
        }
    }

    #[test]
    fn test_aggregate_three_subjects() {
        let record = ResultRecord::new(
            "1AB23CS001".into(),
            "JANE DOE".into(),
            vec![subject("A", "80"), subject("B", "90"), subject("C", "70")],
        );
        assert_eq!(record.total, 240);
        assert_eq!(record.counted, 3);
        assert_eq!(record.percentage, 80.0);
    }

    #[test]
    fn test_aggregate_empty() {
        let record = ResultRecord::new("U".into(), "N".into(), Vec::new());
        assert_eq!(record.total, 0);
        assert_eq!(record.counted, 0);
        assert_eq!(record.percentage, 0.0);
    }

    #[test]
    fn test_non_numeric_total_excluded() {
        let record = ResultRecord::new(
            "U".into(),
            "N".into(),
            vec![subject("A", "85"), subject("B", "AB"), subject("C", ""), subject("D", "-5")],
        );
        assert_eq!(record.subjects.len(), 4);
        assert_eq!(record.total, 85);
        assert_eq!(record.counted, 1);
        assert_eq!(record.percentage, 85.0);
    }

    #[test]
    fn test_large_totals_do_not_overflow() {
        let record = ResultRecord::new(
            "U".into(),
            "N".into(),
            vec![subject("A", "4294967295"), subject("B", "1")],
        );
        assert_eq!(record.total, 4_294_967_296);
        assert_eq!(record.counted, 2);
        assert_eq!(record.percentage, 2_147_483_648.0);
    }

    #[test]
    fn test_percentage_rounds_to_two_places() {
        let record = ResultRecord::new(
            "U".into(),
            "N".into(),
            vec![subject("A", "67"), subject("B", "70"), subject("C", "71")],
        );
        // 208 / 300 = 69.333...
        assert_eq!(record.percentage, 69.33);
    }

    #[test]
    fn test_marks_row_follows_map_order() {
        let record = ResultRecord::new(
            "1AB23CS001".into(),
            "JANE DOE".into(),
            vec![subject("OS", "85"), subject("M3", "72")],
        );
        let row = record.marks_row(SemesterKey::Sem3);
        let header = ResultRecord::marks_header(SemesterKey::Sem3);
        assert_eq!(row.len(), header.len());
        assert_eq!(row[0], "1AB23CS001");
        assert_eq!(row[2], "72"); // M3
        assert_eq!(row[3], ""); // DDCO
        assert_eq!(row[4], "85"); // OS
        assert_eq!(row[row.len() - 2], "157");
        assert_eq!(row[row.len() - 1], "78.5");
    }

    #[test]
    fn test_marks_row_keeps_decimal_point() {
        let record = ResultRecord::new(
            "1AB23CS001".into(),
            "JANE DOE".into(),
            vec![subject("OS", "80"), subject("M3", "80")],
        );
        let row = record.marks_row(SemesterKey::Sem3);
        assert_eq!(row[row.len() - 2], "160");
        assert_eq!(row[row.len() - 1], "80.0");
    }

    #[test]
    fn test_combined_result_has_every_semester() {
        let record = ResultRecord::new("U".into(), "N".into(), Vec::new());
        let combined = CombinedResult::new("U", [(SemesterKey::Sem2, Some(record))]);
        assert_eq!(combined.semesters.len(), 5);
        assert!(combined.get(SemesterKey::Sem1).is_none());
        assert!(combined.get(SemesterKey::Sem2).is_some());
        let found: Vec<SemesterKey> = combined.found().map(|(k, _)| k).collect();
        assert_eq!(found, vec![SemesterKey::Sem2]);
    }
}
