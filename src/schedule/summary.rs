use crate::schedule::month::MonthParseResult;
use serde::Serialize;
use std::collections::BTreeSet;

/// Natural keys found in a month scan, as a persistence layer would
/// deduplicate them, plus the recovered error report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleSummary {
    pub courses: Vec<String>,
    pub groups: Vec<String>,
    pub lecturers: Vec<String>,
    pub rooms: Vec<String>,
    pub sessions: usize,
    pub located_days: usize,
    pub missing_days: usize,
    pub errors: Vec<String>,
}

impl From<&MonthParseResult> for ScheduleSummary {
    fn from(result: &MonthParseResult) -> Self {
        let mut courses = BTreeSet::new();
        let mut groups = BTreeSet::new();
        let mut lecturers = BTreeSet::new();
        let mut rooms = BTreeSet::new();
        let mut sessions = 0;
        for session in result.sessions() {
            sessions += 1;
            courses.insert(session.name.to_owned());
            groups.extend(session.groups.iter().cloned());
            lecturers.extend(session.lecturers.iter().map(|lecturer| lecturer.name.to_owned()));
            rooms.extend(session.rooms.iter().cloned());
        }
        let located_days = result.located_days();
        ScheduleSummary {
            courses: courses.into_iter().collect(),
            groups: groups.into_iter().collect(),
            lecturers: lecturers.into_iter().collect(),
            rooms: rooms.into_iter().collect(),
            sessions,
            located_days,
            missing_days: result.schedule_days.len() - located_days,
            errors: result.errors(),
        }
    }
}
