use crate::captcha::CaptchaImage;
use anyhow::{bail, Context, Result};
use marksheet_model::{is_plain_usn, CombinedResult, ResultRecord, SemesterKey};
use std::fs;
use std::path::{Path, PathBuf};

/// Write a semester's CAPTCHA image as `captcha_{semester}.{ext}`.
///
/// Creates the directory if it doesn't exist and overwrites any earlier
/// image for the same semester.
pub fn write_captcha(output_dir: &str, semester: SemesterKey, image: &CaptchaImage) -> Result<PathBuf> {
    let dir = Path::new(output_dir);
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(format!("captcha_{semester}.{}", image.extension()));
    fs::write(&path, &image.bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = image.bytes.len(), "Wrote CAPTCHA image");

    Ok(path)
}

/// Write the combined result as pretty JSON, named after the USN.
pub fn write_combined(output_dir: &str, result: &CombinedResult) -> Result<PathBuf> {
    let path = result_path(output_dir, &result.usn, "result.json")?;
    let json = serde_json::to_string_pretty(result)?;
    fs::write(&path, &json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        semesters = result.found().count(),
        "Wrote combined result"
    );

    Ok(path)
}

/// Write the marks sheet as tab-separated text: for every semester with a
/// result, its header line followed by the student's row.
pub fn write_marks(output_dir: &str, result: &CombinedResult) -> Result<PathBuf> {
    let path = result_path(output_dir, &result.usn, "marks.tsv")?;
    fs::write(&path, marks_sheet(result)).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote marks sheet");

    Ok(path)
}

fn marks_sheet(result: &CombinedResult) -> String {
    let mut sheet = String::new();
    for (semester, record) in result.found() {
        let mut header = vec!["SEMESTER".to_string()];
        header.extend(ResultRecord::marks_header(semester));
        let mut row = vec![semester.as_str().to_string()];
        row.extend(record.marks_row(semester));

        sheet.push_str(&header.join("\t"));
        sheet.push('\n');
        sheet.push_str(&row.join("\t"));
        sheet.push('\n');
    }
    sheet
}

/// `{output_dir}/{usn}.{suffix}`, refusing any USN that could name a path
/// outside the output directory.
fn result_path(output_dir: &str, usn: &str, suffix: &str) -> Result<PathBuf> {
    if !is_plain_usn(usn) {
        bail!("USN '{usn}' must contain only letters and digits");
    }
    let dir = Path::new(output_dir);
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir.join(format!("{usn}.{suffix}")))
}
