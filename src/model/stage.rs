use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageLabel {
    Alzheimers,
    Mci,
    Normal,
    Uncertain,
}

impl StageLabel {
    pub fn label(self) -> &'static str {
        match self {
            StageLabel::Alzheimers => "Alzheimer's",
            StageLabel::Mci => "MCI (Mild Cognitive Impairment)",
            StageLabel::Normal => "Normal Cognition",
            StageLabel::Uncertain => "Uncertain - Requires further evaluation",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            StageLabel::Alzheimers => "alzheimers",
            StageLabel::Mci => "mci",
            StageLabel::Normal => "normal",
            StageLabel::Uncertain => "uncertain",
        }
    }
}

impl fmt::Display for StageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for StageLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
