//! Tag search form state
//!
//! Holds the tag ID input and the three result labels. Submitting goes
//! through [`TraceLookup`] so the form can be exercised without a window.

use crate::notice::{Notice, NoticeMessage};
use crate::service::TraceLookup;
use crate::types::WorkTrace;

/// Text shown in the name / machine / date result labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceLabels {
    pub name: String,
    pub machine: String,
    pub date: String,
}

impl From<&WorkTrace> for TraceLabels {
    fn from(trace: &WorkTrace) -> Self {
        Self {
            name: trace.name.clone(),
            machine: trace.machine.clone(),
            date: trace.date.clone(),
        }
    }
}

/// The search form
#[derive(Debug, Default)]
pub struct SearchForm {
    /// Tag ID text input
    pub tag_id: String,
    /// Result labels, kept until the next successful search
    pub labels: TraceLabels,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a search for the current input
    ///
    /// Returns the notice to show, if any. Blank input is rejected before
    /// any lookup; a miss leaves the labels as they were.
    pub fn submit(&mut self, lookup: &dyn TraceLookup) -> Option<Notice> {
        let tag_id = self.tag_id.trim();
        if tag_id.is_empty() {
            return Some(Notice::warning(NoticeMessage::EmptyTagId));
        }

        match lookup.lookup_latest_trace(tag_id) {
            Some(trace) => {
                self.labels = TraceLabels::from(&trace);
                None
            }
            None => Some(Notice::info(NoticeMessage::NoData)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockTraceLookup;

    fn trace(machine: &str) -> WorkTrace {
        WorkTrace {
            id: "T001".to_string(),
            name: "Kim".to_string(),
            machine: machine.to_string(),
            date: "2024-05-02 08-30-00.500".to_string(),
        }
    }

    #[test]
    fn test_empty_input_warns_without_lookup() {
        let mut lookup = MockTraceLookup::new();
        lookup.expect_lookup_latest_trace().times(0);

        let mut form = SearchForm::new();
        assert_eq!(
            form.submit(&lookup),
            Some(Notice::warning(NoticeMessage::EmptyTagId))
        );

        form.tag_id = "   ".to_string();
        assert_eq!(
            form.submit(&lookup),
            Some(Notice::warning(NoticeMessage::EmptyTagId))
        );
    }

    #[test]
    fn test_hit_populates_labels() {
        let mut lookup = MockTraceLookup::new();
        lookup
            .expect_lookup_latest_trace()
            .times(1)
            .returning(|id| {
                assert_eq!(id, "T001");
                Some(trace("M1"))
            });

        let mut form = SearchForm::new();
        form.tag_id = " T001 ".to_string();
        assert_eq!(form.submit(&lookup), None);
        assert_eq!(
            form.labels,
            TraceLabels {
                name: "Kim".to_string(),
                machine: "M1".to_string(),
                date: "2024-05-02 08-30-00.500".to_string(),
            }
        );
    }

    #[test]
    fn test_miss_keeps_previous_labels() {
        let mut lookup = MockTraceLookup::new();
        let mut calls = 0;
        lookup
            .expect_lookup_latest_trace()
            .times(2)
            .returning(move |_| {
                calls += 1;
                if calls == 1 {
                    Some(trace("M1"))
                } else {
                    None
                }
            });

        let mut form = SearchForm::new();
        form.tag_id = "T001".to_string();
        form.submit(&lookup);
        let before = form.labels.clone();

        form.tag_id = "T002".to_string();
        assert_eq!(
            form.submit(&lookup),
            Some(Notice::info(NoticeMessage::NoData))
        );
        assert_eq!(form.labels, before);
    }
}
