//! Test data builders for creating test objects

use serde_json::Number;
use tagtrace_rs::types::{ScanEvent, WorkInfo};

/// Builder for registered tag holders
pub struct WorkInfoBuilder {
    id: String,
    name: String,
    height: Number,
    weight: Number,
}

impl WorkInfoBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "Kim".to_string(),
            height: Number::from(170),
            weight: Number::from(65),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn height(mut self, height: impl Into<Number>) -> Self {
        self.height = height.into();
        self
    }

    pub fn weight(mut self, weight: impl Into<Number>) -> Self {
        self.weight = weight.into();
        self
    }

    pub fn build(self) -> WorkInfo {
        WorkInfo {
            id: self.id,
            name: self.name,
            height: self.height,
            weight: self.weight,
        }
    }
}

/// The JSON line a tag reader sends for a scan, newline included
pub fn scan_line(id: &str, machine: &str) -> String {
    let event = ScanEvent::new(id, machine);
    format!("{}\n", serde_json::to_string(&event).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_info_builder() {
        let info = WorkInfoBuilder::new("T9").name("Lee").height(181).build();

        assert_eq!(info.id, "T9");
        assert_eq!(info.name, "Lee");
        assert_eq!(info.height, Number::from(181));
        assert_eq!(info.weight, Number::from(65));
    }
}
