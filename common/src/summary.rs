//! 検査結果の集計（合否サマリー）

use crate::types::{Answer, InspectionDocument, SectionKey};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Passed,
    Failed,
    Incomplete,
    NotMeasured,
}

impl fmt::Display for SectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SectionStatus::Passed => "Passed",
            SectionStatus::Failed => "Failed",
            SectionStatus::Incomplete => "Incomplete",
            SectionStatus::NotMeasured => "Not Measured",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionSummary {
    pub visual: SectionStatus,
    pub electrical: SectionStatus,
    pub functional: SectionStatus,
}

impl InspectionSummary {
    pub fn status(&self, key: SectionKey) -> SectionStatus {
        match key {
            SectionKey::Visual => self.visual,
            SectionKey::Electrical => self.electrical,
            SectionKey::Functional => self.functional,
        }
    }

    pub fn overall_passed(&self) -> bool {
        SectionKey::ALL
            .iter()
            .all(|key| self.status(*key) == SectionStatus::Passed)
    }
}

/// yes/no 区分の判定
///
/// 1つでも no → Failed、全て yes → Passed、それ以外 → Incomplete
fn yes_no_status(doc: &InspectionDocument, key: SectionKey) -> SectionStatus {
    let Some(section) = doc.tests.section(key) else {
        return SectionStatus::Incomplete;
    };

    if section.items.iter().any(|i| i.user_response == Answer::No) {
        SectionStatus::Failed
    } else if !section.items.is_empty()
        && section.items.iter().all(|i| i.user_response == Answer::Yes)
    {
        SectionStatus::Passed
    } else {
        SectionStatus::Incomplete
    }
}

pub fn summarize(doc: &InspectionDocument, measured: bool) -> InspectionSummary {
    let electrical = match doc.tests.section(SectionKey::Electrical) {
        None => SectionStatus::Incomplete,
        Some(_) if measured => SectionStatus::Passed,
        Some(_) => SectionStatus::NotMeasured,
    };

    InspectionSummary {
        visual: yes_no_status(doc, SectionKey::Visual),
        electrical,
        functional: yes_no_status(doc, SectionKey::Functional),
    }
}
