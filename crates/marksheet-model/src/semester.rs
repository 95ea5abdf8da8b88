use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the five semester sub-sites of the result portal.
///
/// Each key is statically bound to a portal slug (the path segment of its
/// index and result pages) and to the subject map of that semester's
/// curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemesterKey {
    Sem1,
    Sem2,
    Sem3,
    Sem4,
    Sem5,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown semester: {0:?}")]
pub struct UnknownSemester(pub String);

/// An ordered list of `(full title, short code)` pairs.
///
/// Resolution walks the list in declared order and the first title found in a
/// subject name wins, so a broader title listed early shadows a more specific
/// one listed later.
pub type SubjectMap = &'static [(&'static str, &'static str)];

const SEM1_SUBJECTS: SubjectMap = &[
    ("MATHEMATICS FOR CSE STREAM-I", "MATHS"),
    ("PHYSICS FOR CSE STREAM", "PHY"),
    ("PRINCIPLES OF PROGRAMMING USING C", "C"),
    ("COMMUNICATIVE ENGLISH", "ENG"),
    ("INDIAN CONSTITUTION", "IC"),
    ("INNOVATION AND DESIGN THINKING", "IDT"),
    ("INTRODUCTION TO CIVIL ENGINEERING", "CIVIL"),
    ("RENEWABLE ENERGY SOURCES", "RES"),
];

const SEM2_SUBJECTS: SubjectMap = &[
    ("MATHEMATICS-II FOR CSE STREAM", "MATHS2"),
    ("APPLIED CHEMISTRY FOR CSE STREAM", "CHEM"),
    ("COMPUTER-AIDED ENGINEERING DRAWING", "CAED"),
    ("PROFESSIONAL WRITING SKILLS IN ENGLISH", "PWSE"),
    ("SAMSKRUTIKA KANNADA", "SK"),
    ("SCIENTIFIC FOUNDATIONS OF HEALTH", "SFH"),
    ("INTRODUCTION TO PYTHON PROGRAMMING", "PY"),
    ("INTRODUCTION TO ELECTRONICS COMMUNICATION", "ELC"),
];

const SEM3_SUBJECTS: SubjectMap = &[
    ("MATHEMATICS FOR COMPUTER SCIENCE", "M3"),
    ("DIGITAL DESIGN & COMPUTER ORGANIZATION", "DDCO"),
    ("OPERATING SYSTEMS", "OS"),
    ("DATA STRUCTURES AND APPLICATIONS", "DSA"),
    ("DATA STRUCTURES LAB", "DSL"),
    ("SOCIAL CONNECT AND RESPONSIBILITY", "SCR"),
    ("NATIONAL SERVICE SCHEME", "NSS"),
    ("DATA ANALYTICS WITH EXCEL", "DAE"),
    ("OBJECT ORIENTED PROGRAMMING WITH JAVA", "OOPJ"),
];

const SEM4_SUBJECTS: SubjectMap = &[
    ("ANALYSIS & DESIGN OF ALGORITHMS", "ADA"),
    ("ARTIFICIAL INTELLIGENCE", "AI"),
    ("DATABASE MANAGEMENT SYSTEMS", "DBMS"),
    ("ANALYSIS & DESIGN OF ALGORITHMS LAB", "ADAL"),
    ("BIOLOGY FOR COMPUTER ENGINEERS", "BIO"),
    ("UNIVERSAL HUMAN VALUES COURSE", "UHV"),
    ("NATIONAL SERVICE SCHEME", "NSS"),
    ("DISCRETE MATHEMATICAL STRUCTURES", "DMS"),
    ("TECHNICAL WRITING USING LATEX LAB", "TWL"),
];

const SEM5_SUBJECTS: SubjectMap = &[
    ("SOFTWARE ENGINEERING AND PROJECT MANAGEMENT", "SEPM"),
    ("COMPUTER NETWORKS", "CN"),
    ("THEORY OF COMPUTATION", "TOC"),
    ("DATA VISUALIZATION LAB", "DVL"),
    ("MINI PROJECT", "MINI"),
    ("RESEARCH METHODOLOGY AND IPR", "RMIPR"),
    ("ENVIRONMENTAL STUDIES AND E-WASTE MANAGEMENT", "EVS"),
    ("NATIONAL SERVICE SCHEME", "NSS"),
    ("UNIX SYSTEM PROGRAMMING", "UNIX"),
];

impl SemesterKey {
    pub const ALL: [SemesterKey; 5] = [
        SemesterKey::Sem1,
        SemesterKey::Sem2,
        SemesterKey::Sem3,
        SemesterKey::Sem4,
        SemesterKey::Sem5,
    ];

    /// The semester numeral, "1" through "5".
    pub fn numeral(self) -> &'static str {
        match self {
            SemesterKey::Sem1 => "1",
            SemesterKey::Sem2 => "2",
            SemesterKey::Sem3 => "3",
            SemesterKey::Sem4 => "4",
            SemesterKey::Sem5 => "5",
        }
    }

    /// Stable identifier used in URLs and form fields (e.g., "sem3").
    pub fn as_str(self) -> &'static str {
        match self {
            SemesterKey::Sem1 => "sem1",
            SemesterKey::Sem2 => "sem2",
            SemesterKey::Sem3 => "sem3",
            SemesterKey::Sem4 => "sem4",
            SemesterKey::Sem5 => "sem5",
        }
    }

    /// Path segment of this semester's sub-site on the portal.
    pub fn portal_slug(self) -> &'static str {
        match self {
            SemesterKey::Sem1 => "DJcbcs24",
            SemesterKey::Sem2 => "JJEcbcs24",
            SemesterKey::Sem3 => "DJcbcs25",
            SemesterKey::Sem4 => "JJEcbcs25",
            SemesterKey::Sem5 => "D25J26Ecbcs",
        }
    }

    pub fn subject_map(self) -> SubjectMap {
        match self {
            SemesterKey::Sem1 => SEM1_SUBJECTS,
            SemesterKey::Sem2 => SEM2_SUBJECTS,
            SemesterKey::Sem3 => SEM3_SUBJECTS,
            SemesterKey::Sem4 => SEM4_SUBJECTS,
            SemesterKey::Sem5 => SEM5_SUBJECTS,
        }
    }

    /// Short codes of the subject map, in declared order, duplicates included.
    pub fn short_codes(self) -> Vec<&'static str> {
        self.subject_map().iter().map(|(_, short)| *short).collect()
    }
}

impl fmt::Display for SemesterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemesterKey {
    type Err = UnknownSemester;

    /// Accepts either the identifier ("sem3") or the bare numeral ("3").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lowered = trimmed.to_ascii_lowercase();
        let numeral = lowered.strip_prefix("sem").unwrap_or(lowered.as_str());
        SemesterKey::ALL
            .into_iter()
            .find(|k| k.numeral() == numeral)
            .ok_or_else(|| UnknownSemester(trimmed.to_string()))
    }
}
