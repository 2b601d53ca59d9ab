//! Attendance aggregation for a single group.
//!
//! Dates are opaque strings bucketed by exact match; two spellings of the
//! same calendar day land in different buckets. Absentee counts are taken
//! against the group's current membership, not the membership as of the
//! historical date.

use std::collections::{BTreeMap, HashSet};

use crate::models::{AttendanceFact, StudentGroup};

#[derive(Debug, Clone, Default)]
pub struct GroupedAttendance {
    /// The group's facts in retrieval order.
    pub facts: Vec<AttendanceFact>,
    /// Date bucket -> facts recorded on that date, retrieval order within
    /// each bucket.
    pub by_date: BTreeMap<String, Vec<AttendanceFact>>,
}

impl GroupedAttendance {
    /// Number of distinct dates on which anyone attended.
    pub fn session_count(&self) -> usize {
        self.by_date.len()
    }

    /// Distinct student ids present on `date`, first-seen order.
    pub fn attended_ids(&self, date: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        if let Some(bucket) = self.by_date.get(date) {
            for fact in bucket {
                if seen.insert(fact.student_id.as_str()) {
                    ids.push(fact.student_id.as_str());
                }
            }
        }
        ids
    }

    /// Current members with no presence fact on `date`.
    pub fn unattended_ids<'a>(&self, date: &str, members: &'a [String]) -> Vec<&'a str> {
        let attended: HashSet<&str> = self.attended_ids(date).into_iter().collect();
        members
            .iter()
            .map(String::as_str)
            .filter(|id| !attended.contains(id))
            .collect()
    }

    pub fn unattended_count(&self, date: &str, members: &[String]) -> usize {
        self.unattended_ids(date, members).len()
    }
}

/// Collect the facts for `group_id` and bucket them by date. An unknown
/// group yields empty output, not an error.
pub fn grouped_attendance(facts: &[AttendanceFact], group_id: &str) -> GroupedAttendance {
    let mut grouped = GroupedAttendance::default();

    for fact in facts.iter().filter(|f| f.group_id == group_id) {
        grouped.facts.push(fact.clone());
        grouped
            .by_date
            .entry(fact.date.clone())
            .or_default()
            .push(fact.clone());
    }

    grouped
}

/// Student ids linked to `group_id`, deduplicated, first-seen order.
/// Duplicate membership edges are tolerated.
pub fn member_ids(links: &[StudentGroup], group_id: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for link in links.iter().filter(|l| l.group_id == group_id) {
        if seen.insert(link.student_id.as_str()) {
            ids.push(link.student_id.clone());
        }
    }

    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(group: &str, student: &str, date: &str) -> AttendanceFact {
        AttendanceFact {
            group_id: group.to_string(),
            student_id: student.to_string(),
            date: date.to_string(),
        }
    }

    fn link(group: &str, student: &str) -> StudentGroup {
        StudentGroup {
            group_id: group.to_string(),
            student_id: student.to_string(),
        }
    }

    #[test]
    fn buckets_cover_every_group_fact() {
        let facts = vec![
            fact("g1", "s1", "2024-01-01"),
            fact("g1", "s2", "2024-01-01"),
            fact("g1", "s1", "2024-01-08"),
            fact("g2", "s3", "2024-01-01"),
        ];

        let grouped = grouped_attendance(&facts, "g1");
        let bucketed: usize = grouped.by_date.values().map(Vec::len).sum();
        assert_eq!(bucketed, grouped.facts.len());
        assert_eq!(grouped.facts.len(), 3);
        assert_eq!(grouped.session_count(), 2);
    }

    #[test]
    fn unknown_group_is_empty_not_an_error() {
        let facts = vec![fact("g1", "s1", "2024-01-01")];
        let grouped = grouped_attendance(&facts, "nope");
        assert!(grouped.facts.is_empty());
        assert!(grouped.by_date.is_empty());
        assert_eq!(grouped.session_count(), 0);
    }

    #[test]
    fn date_strings_are_exact_match_keys() {
        // "2024-1-1" and "2024-01-01" fragment into separate buckets.
        let facts = vec![fact("g1", "s1", "2024-01-01"), fact("g1", "s2", "2024-1-1")];
        let grouped = grouped_attendance(&facts, "g1");
        assert_eq!(grouped.session_count(), 2);
    }

    #[test]
    fn unattended_counts_members_without_a_fact() {
        let facts = vec![
            fact("g1", "s1", "2024-01-01"),
            fact("g1", "s2", "2024-01-01"),
            fact("g1", "s1", "2024-01-08"),
        ];
        let members = vec!["s1".to_string(), "s2".to_string(), "s3".to_string()];

        let grouped = grouped_attendance(&facts, "g1");
        assert_eq!(grouped.unattended_count("2024-01-01", &members), 1);
        assert_eq!(grouped.unattended_ids("2024-01-08", &members), vec!["s2", "s3"]);
        // A date with no session counts every member absent.
        assert_eq!(grouped.unattended_count("2024-01-15", &members), 3);
    }

    #[test]
    fn duplicate_facts_do_not_inflate_attendee_sets() {
        let facts = vec![fact("g1", "s1", "2024-01-01"), fact("g1", "s1", "2024-01-01")];
        let members = vec!["s1".to_string(), "s2".to_string()];
        let grouped = grouped_attendance(&facts, "g1");
        assert_eq!(grouped.attended_ids("2024-01-01"), vec!["s1"]);
        assert_eq!(grouped.unattended_count("2024-01-01", &members), 1);
    }

    #[test]
    fn member_ids_deduplicates_edges() {
        let links = vec![link("g1", "s1"), link("g1", "s2"), link("g1", "s1"), link("g2", "s3")];
        assert_eq!(member_ids(&links, "g1"), vec!["s1", "s2"]);
    }
}
