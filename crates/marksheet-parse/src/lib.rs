use marksheet_model::{ResultRecord, SemesterKey, SubjectRecord};
use scraper::{ElementRef, Html, Selector};

pub mod normalize;
pub mod subjects;
pub mod token;

pub use token::extract_token;

/// Text present on every genuine result page and absent from the portal's
/// CAPTCHA-failure, token-mismatch, and unknown-USN pages.
pub const RESULT_MARKER: &str = "University Seat Number";

const USN_LABEL: &str = "University Seat Number";
const NAME_LABEL: &str = "Student Name";
const HEADER_FIRST_CELL: &str = "Subject Code";
const SUBJECT_ROW_CELLS: usize = 7;

/// Extract a normalized result record from a portal result page.
///
/// Returns `None` unless the page carries [`RESULT_MARKER`]. A genuine page
/// with no subject rows still yields a record, with no subjects and a zero
/// percentage.
pub fn extract(html: &str, semester: SemesterKey) -> Option<ResultRecord> {
    let document = Html::parse_document(html);

    let page_text: String = document.root_element().text().collect();
    if !page_text.contains(RESULT_MARKER) {
        tracing::debug!(semester = %semester, bytes = html.len(), "No result marker, treating page as rejection");
        return None;
    }

    let (usn, student_name) = extract_identity(&document);
    let subjects = extract_subjects(&document, semester);

    tracing::debug!(
        semester = %semester,
        usn = %usn,
        subjects = subjects.len(),
        "Extracted result page"
    );

    Some(ResultRecord::new(usn, student_name, subjects))
}

/// Scan label/value table rows for the seat number and student name.
/// The first occurrence of each label wins.
fn extract_identity(document: &Html) -> (String, String) {
    let tr_sel = Selector::parse("tr").expect("valid selector");
    let td_sel = Selector::parse("td").expect("valid selector");

    let mut usn: Option<String> = None;
    let mut name: Option<String> = None;

    for tr in document.select(&tr_sel) {
        let tds: Vec<ElementRef> = tr.select(&td_sel).collect();
        if tds.len() < 2 {
            continue;
        }

        let label = cell_text(tds[0]);
        let value = normalize::trim_label_value(&cell_text(tds[1]));

        if usn.is_none() && label.contains(USN_LABEL) {
            usn = Some(value);
        } else if name.is_none() && label.contains(NAME_LABEL) {
            name = Some(value);
        }

        if usn.is_some() && name.is_some() {
            break;
        }
    }

    (usn.unwrap_or_default(), name.unwrap_or_default())
}

/// Read the seven-cell subject rows of the marks table.
///
/// Cell layout: code, name, internal, external, total, result, announced date.
fn extract_subjects(document: &Html, semester: SemesterKey) -> Vec<SubjectRecord> {
    let row_sel = Selector::parse("div.divTableRow").expect("valid selector");
    let cell_sel = Selector::parse("div.divTableCell").expect("valid selector");
    let map = semester.subject_map();

    let mut subjects = Vec::new();

    for (index, row) in document.select(&row_sel).enumerate() {
        let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();

        if cells.len() != SUBJECT_ROW_CELLS {
            tracing::trace!(row = index, cols = cells.len(), "Skipping row without seven cells");
            continue;
        }
        if cells[0] == HEADER_FIRST_CELL {
            continue;
        }

        let name = normalize::normalize_subject_name(&cells[1]);
        let short_code = subjects::resolve_short_code(&name, map);

        subjects.push(SubjectRecord {
            code: cells[0].clone(),
            name,
            short_code,
            internal: cells[2].clone(),
            external: cells[3].clone(),
            total: cells[4].clone(),
            result: cells[5].clone(),
        });
    }

    subjects
}

fn cell_text(cell: ElementRef) -> String {
    normalize::clean_cell(&cell.text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject_row(cells: [&str; 7]) -> String {
        let inner: String = cells
            .iter()
            .map(|c| format!(r#"<div class="divTableCell">{c}</div>"#))
            .collect();
        format!(r#"<div class="divTableRow">{inner}</div>"#)
    }

    fn result_page(rows: &[[&str; 7]]) -> String {
        let body: String = rows.iter().map(|r| subject_row(*r)).collect();
        format!(
            r#"
        <html><body>
        <table>
          <tr><td><b>University Seat Number </b></td><td><b> : 1AB23CS001</b></td></tr>
          <tr><td><b>Student Name</b></td><td><b> : JANE DOE </b></td></tr>
          <tr><td><b>Student Name</b></td><td><b> : SOMEONE ELSE</b></td></tr>
        </table>
        <div class="divTable"><div class="divTableBody">
          {header}
          {body}
        </div></div>
        </body></html>
        "#,
            header = subject_row([
                "Subject Code",
                "Subject Name",
                "Internal Marks",
                "External Marks",
                "Total",
                "Result",
                "Announced / Updated on",
            ]),
        )
    }

    #[test]
    fn test_rejects_page_without_marker() {
        let html = r#"<html><body><script>alert('Invalid captcha code !!!');</script>
            <form><input name="lns"></form></body></html>"#;
        assert!(extract(html, SemesterKey::Sem3).is_none());
    }

    #[test]
    fn test_extract_operating_systems_row() {
        let html = result_page(&[["CS301", "OPERATING SYSTEMS", "30", "55", "85", "P", "—"]]);
        let record = extract(&html, SemesterKey::Sem3).unwrap();

        assert_eq!(record.usn, "1AB23CS001");
        assert_eq!(record.student_name, "JANE DOE");
        assert_eq!(record.subjects.len(), 1);

        let os = &record.subjects[0];
        assert_eq!(os.code, "CS301");
        assert_eq!(os.short_code, "OS");
        assert_eq!(os.internal, "30");
        assert_eq!(os.external, "55");
        assert_eq!(os.total, "85");
        assert_eq!(os.result, "P");
        assert_eq!(record.total, 85);
        assert_eq!(record.percentage, 85.0);
    }

    #[test]
    fn test_aggregate_over_rows() {
        let html = result_page(&[
            ["BCS301", "Mathematics for Computer Science", "40", "40", "80", "P", "2025-02-01"],
            ["BCS302", "Digital Design &amp; Computer Organization", "45", "45", "90", "P", "2025-02-01"],
            ["BCS303", "Operating Systems", "35", "35", "70", "P", "2025-02-01"],
        ]);
        let record = extract(&html, SemesterKey::Sem3).unwrap();

        let codes: Vec<&str> = record.subjects.iter().map(|s| s.short_code.as_str()).collect();
        assert_eq!(codes, vec!["M3", "DDCO", "OS"]);
        assert_eq!(record.total, 240);
        assert_eq!(record.counted, 3);
        assert_eq!(record.percentage, 80.0);
    }

    #[test]
    fn test_valid_page_without_subject_rows() {
        let html = result_page(&[]);
        let record = extract(&html, SemesterKey::Sem1).unwrap();
        assert_eq!(record.usn, "1AB23CS001");
        assert!(record.subjects.is_empty());
        assert_eq!(record.total, 0);
        assert_eq!(record.percentage, 0.0);
    }

    #[test]
    fn test_duplicate_short_codes_preserved() {
        let html = result_page(&[
            ["BNSK359", "NATIONAL SERVICE SCHEME", "50", "0", "50", "P", "-"],
            ["BNSK459", "NATIONAL SERVICE SCHEME (NSS) - II", "48", "0", "48", "P", "-"],
        ]);
        let record = extract(&html, SemesterKey::Sem3).unwrap();
        assert_eq!(record.subjects.len(), 2);
        assert!(record.subjects.iter().all(|s| s.short_code == "NSS"));
        assert_ne!(record.subjects[0].name, record.subjects[1].name);
        assert_eq!(record.total, 98);
    }

    #[test]
    fn test_non_numeric_total_kept_but_not_counted() {
        let html = result_page(&[
            ["BCS303", "OPERATING SYSTEMS", "30", "55", "85", "P", "-"],
            ["BCS304", "DATA STRUCTURES AND APPLICATIONS", "20", "AB", "AB", "A", "-"],
        ]);
        let record = extract(&html, SemesterKey::Sem3).unwrap();
        assert_eq!(record.subjects.len(), 2);
        assert_eq!(record.subjects[1].short_code, "DSA");
        assert_eq!(record.counted, 1);
        assert_eq!(record.total, 85);
    }

    #[test]
    fn test_rows_with_other_cell_counts_ignored() {
        let html = result_page(&[["BCS303", "OPERATING SYSTEMS", "30", "55", "85", "P", "-"]])
            .replace(
                "</div></div>\n        </body>",
                r#"<div class="divTableRow"><div class="divTableCell">NOTE</div><div class="divTableCell">Provisional</div></div></div></div>
        </body>"#,
            );
        let record = extract(&html, SemesterKey::Sem3).unwrap();
        assert_eq!(record.subjects.len(), 1);
    }

    #[test]
    fn test_unmapped_subject_uses_full_name() {
        let html = result_page(&[["BXX999", "Open Elective  Basket", "40", "40", "80", "P", "-"]]);
        let record = extract(&html, SemesterKey::Sem5).unwrap();
        assert_eq!(record.subjects[0].short_code, "OPEN ELECTIVE BASKET");
    }

    #[test]
    fn test_record_serializes() {
        let html = result_page(&[["CS301", "OPERATING SYSTEMS", "30", "55", "85", "P", "-"]]);
        let record = extract(&html, SemesterKey::Sem3).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["subjects"][0]["short_code"], "OS");
        assert_eq!(json["percentage"], 85.0);
    }
}
