use futures::future::join_all;
use marksheet_model::{SemesterKey, VisitorId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::portal::PortalSession;

/// One portal session per semester, owned by a single visitor.
#[derive(Debug, Clone)]
pub struct VisitorSessionSet {
    sessions: BTreeMap<SemesterKey, Arc<PortalSession>>,
}

impl VisitorSessionSet {
    pub fn get(&self, semester: SemesterKey) -> Option<&Arc<PortalSession>> {
        self.sessions.get(&semester)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SemesterKey, &Arc<PortalSession>)> {
        self.sessions.iter().map(|(k, s)| (*k, s))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[derive(Debug)]
struct VisitorEntry {
    sessions: VisitorSessionSet,
    submitting: bool,
}

#[derive(Debug, Default)]
struct Visitors {
    live: HashMap<VisitorId, VisitorEntry>,
    /// Ids whose visit has ended. They never get sessions again.
    retired: HashSet<VisitorId>,
}

/// Process-wide map from visitor to that visitor's semester sessions.
///
/// Lives in memory only. Every mutation happens under one lock, and no lock
/// is held across network I/O, so visitors never wait on each other's portal
/// requests. A retired id stays retired for the life of the registry.
#[derive(Debug)]
pub struct SessionRegistry {
    config: PortalConfig,
    visitors: Mutex<Visitors>,
}

impl SessionRegistry {
    pub fn new(config: PortalConfig) -> Self {
        Self {
            config,
            visitors: Mutex::new(Visitors::default()),
        }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    fn visitors(&self) -> MutexGuard<'_, Visitors> {
        self.visitors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mint a visitor id and open its sessions.
    pub async fn start_visit(&self) -> Result<VisitorId, PortalError> {
        let visitor = VisitorId::mint();
        self.ensure(&visitor).await?;
        tracing::info!(visitor = %visitor, "Started visit");
        Ok(visitor)
    }

    /// Return the visitor's sessions, opening all five if it has none.
    ///
    /// Existing sessions are returned unchanged. If two callers race to open
    /// the same visitor, the first to store its set wins and the other's
    /// sessions are dropped. A retired visitor fails with
    /// [`PortalError::SessionExpired`], even if it is retired while its
    /// sessions are being opened.
    pub async fn ensure(&self, visitor: &VisitorId) -> Result<VisitorSessionSet, PortalError> {
        {
            let visitors = self.visitors();
            if visitors.retired.contains(visitor) {
                return Err(PortalError::SessionExpired);
            }
            if let Some(entry) = visitors.live.get(visitor) {
                return Ok(entry.sessions.clone());
            }
        }

        let opened = join_all(
            SemesterKey::ALL
                .into_iter()
                .map(|semester| PortalSession::open(&self.config, semester)),
        )
        .await;

        let mut sessions = BTreeMap::new();
        for session in opened {
            let session = session?;
            sessions.insert(session.semester(), Arc::new(session));
        }

        let mut visitors = self.visitors();
        if visitors.retired.contains(visitor) {
            return Err(PortalError::SessionExpired);
        }
        let entry = visitors.live.entry(*visitor).or_insert_with(|| {
            tracing::debug!(visitor = %visitor, "Opened semester sessions");
            VisitorEntry {
                sessions: VisitorSessionSet { sessions },
                submitting: false,
            }
        });
        Ok(entry.sessions.clone())
    }

    /// The visitor's current sessions.
    pub fn sessions(&self, visitor: &VisitorId) -> Result<VisitorSessionSet, PortalError> {
        self.visitors()
            .live
            .get(visitor)
            .map(|entry| entry.sessions.clone())
            .ok_or(PortalError::SessionExpired)
    }

    /// The visitor's current session for one semester.
    pub fn session(
        &self,
        visitor: &VisitorId,
        semester: SemesterKey,
    ) -> Result<Arc<PortalSession>, PortalError> {
        self.visitors()
            .live
            .get(visitor)
            .and_then(|entry| entry.sessions.get(semester).cloned())
            .ok_or(PortalError::SessionExpired)
    }

    /// Replace one semester's session with a freshly opened one, leaving the
    /// visitor's other sessions untouched.
    ///
    /// Fails with [`PortalError::SessionExpired`] if the visitor is unknown,
    /// including when it is retired while the new session is being opened.
    pub async fn refresh(
        &self,
        visitor: &VisitorId,
        semester: SemesterKey,
    ) -> Result<Arc<PortalSession>, PortalError> {
        if !self.contains(visitor) {
            return Err(PortalError::SessionExpired);
        }

        let fresh = Arc::new(PortalSession::open(&self.config, semester).await?);

        let mut visitors = self.visitors();
        let entry = visitors.live.get_mut(visitor).ok_or(PortalError::SessionExpired)?;
        entry.sessions.sessions.insert(semester, fresh.clone());
        tracing::debug!(visitor = %visitor, semester = %semester, "Refreshed semester session");

        Ok(fresh)
    }

    /// Drop all of the visitor's sessions and end the visit. Returns whether
    /// anything was removed.
    pub fn retire(&self, visitor: &VisitorId) -> bool {
        let mut visitors = self.visitors();
        visitors.retired.insert(*visitor);
        let removed = visitors.live.remove(visitor).is_some();
        if removed {
            tracing::debug!(visitor = %visitor, "Retired visitor sessions");
        }
        removed
    }

    /// Claim the visitor's sessions for its one submission.
    ///
    /// A second claim, concurrent or after retirement, fails with
    /// [`PortalError::SessionExpired`].
    pub(crate) fn begin_submission(
        &self,
        visitor: &VisitorId,
    ) -> Result<VisitorSessionSet, PortalError> {
        let mut visitors = self.visitors();
        match visitors.live.get_mut(visitor) {
            Some(entry) if !entry.submitting => {
                entry.submitting = true;
                Ok(entry.sessions.clone())
            }
            _ => Err(PortalError::SessionExpired),
        }
    }

    pub fn contains(&self, visitor: &VisitorId) -> bool {
        self.visitors().live.contains_key(visitor)
    }

    /// Number of visitors with live sessions.
    pub fn active_visitors(&self) -> usize {
        self.visitors().live.len()
    }
}
