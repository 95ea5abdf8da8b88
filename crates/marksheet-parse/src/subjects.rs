use marksheet_model::SubjectMap;

/// Resolve the short code for a normalized subject name.
///
/// Walks `map` in declared order and returns the code of the first full title
/// contained in `name`. Falls back to `name` itself when nothing matches.
pub fn resolve_short_code(name: &str, map: SubjectMap) -> String {
    map.iter()
        .find(|(full, _)| name.contains(*full))
        .map(|(_, short)| (*short).to_string())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use marksheet_model::SemesterKey;

    #[test]
    fn test_resolve_exact_title() {
        let map = SemesterKey::Sem3.subject_map();
        assert_eq!(resolve_short_code("OPERATING SYSTEMS", map), "OS");
    }

    #[test]
    fn test_resolve_title_inside_longer_name() {
        let map = SemesterKey::Sem3.subject_map();
        assert_eq!(
            resolve_short_code("OBJECT ORIENTED PROGRAMMING WITH JAVA (INTEGRATED)", map),
            "OOPJ"
        );
    }

    #[test]
    fn test_first_declared_title_wins() {
        // The broader algorithms title is declared before the lab title.
        let map = SemesterKey::Sem4.subject_map();
        assert_eq!(
            resolve_short_code("ANALYSIS & DESIGN OF ALGORITHMS LAB", map),
            "ADA"
        );
    }

    #[test]
    fn test_unmatched_falls_back_to_name() {
        let map = SemesterKey::Sem3.subject_map();
        assert_eq!(
            resolve_short_code("QUANTUM BASKET WEAVING", map),
            "QUANTUM BASKET WEAVING"
        );
    }

    #[test]
    fn test_custom_ordered_map() {
        const MAP: SubjectMap = &[("DATA", "D"), ("DATA STRUCTURES", "DS")];
        assert_eq!(resolve_short_code("DATA STRUCTURES", MAP), "D");
    }
}
