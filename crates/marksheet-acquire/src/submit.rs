use futures::future::join_all;
use marksheet_model::{CombinedResult, ResultRecord, SemesterKey, VisitorId};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::PortalError;
use crate::portal::PortalSession;
use crate::session::SessionRegistry;

/// CAPTCHA text typed by the visitor, per semester.
pub type CaptchaAnswers = BTreeMap<SemesterKey, String>;

/// Collect CAPTCHA answers from submitted form fields named `captcha1` through
/// `captcha5`. Other fields are ignored.
pub fn answers_from_form<'a>(
    fields: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> CaptchaAnswers {
    fields
        .into_iter()
        .filter_map(|(name, value)| {
            let numeral = name.strip_prefix("captcha")?;
            let semester = numeral.parse::<SemesterKey>().ok()?;
            Some((semester, value.to_string()))
        })
        .collect()
}

/// Look up a USN in every semester the visitor answered a CAPTCHA for.
///
/// Semesters without an answer are skipped with no request. Each semester
/// runs independently: a transport failure or rejection page in one leaves
/// only that entry empty. Afterwards the visitor's sessions are retired,
/// whatever the outcome, so the call works once per visitor; later calls fail
/// with [`PortalError::SessionExpired`]. Dropping the future before it
/// completes retires the visitor too.
pub async fn submit(
    registry: &SessionRegistry,
    visitor: &VisitorId,
    usn: &str,
    answers: &CaptchaAnswers,
) -> Result<CombinedResult, PortalError> {
    let sessions = registry.begin_submission(visitor)?;
    let claim = Claim { registry, visitor };
    let usn = usn.trim();

    tracing::info!(visitor = %visitor, usn = %usn, answered = answers.len(), "Submitting lookup");

    let attempts = SemesterKey::ALL.into_iter().map(|semester| {
        let session = sessions.get(semester).cloned();
        let captcha = answers
            .get(&semester)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty());
        async move {
            let record = match (session, captcha) {
                (Some(session), Some(captcha)) => lookup(session, usn, captcha).await,
                _ => None,
            };
            (semester, record)
        }
    });
    let entries = join_all(attempts).await;

    drop(claim);

    let combined = CombinedResult::new(usn, entries);
    tracing::info!(
        visitor = %visitor,
        found = combined.found().count(),
        "Submission complete"
    );
    Ok(combined)
}

/// Retires the claimed visitor when dropped, so an abandoned submission does
/// not leave its sessions claimed forever.
struct Claim<'a> {
    registry: &'a SessionRegistry,
    visitor: &'a VisitorId,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.registry.retire(self.visitor);
    }
}

async fn lookup(session: Arc<PortalSession>, usn: &str, captcha: &str) -> Option<ResultRecord> {
    let semester = session.semester();
    match session.submit(usn, captcha).await {
        Ok(html) => {
            let record = marksheet_parse::extract(&html, semester);
            if record.is_none() {
                tracing::info!(semester = %semester, "Portal returned no result");
            }
            record
        }
        Err(e) => {
            tracing::warn!(semester = %semester, error = %e, "Result request failed");
            None
        }
    }
}
