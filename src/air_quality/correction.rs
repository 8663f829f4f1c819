use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Linear adjustment applied to low-cost sensor PM2.5 before conversion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CorrectionModel {
    None,
    /// University of Utah AQ&U fit.
    AqAndU,
    /// Lane Regional Air Protection Agency fit.
    Lrapa,
}

impl Default for CorrectionModel {
    fn default() -> Self {
        CorrectionModel::None
    }
}

impl CorrectionModel {
    pub fn apply(&self, concentration: f32) -> f32 {
        let c = f64::from(concentration);
        let corrected = match self {
            CorrectionModel::None => return concentration,
            CorrectionModel::AqAndU => 0.778 * c + 2.65,
            CorrectionModel::Lrapa => 0.5 * c - 0.66,
        };
        corrected as f32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionModel::None => "none",
            CorrectionModel::AqAndU => "aqandu",
            CorrectionModel::Lrapa => "lrapa",
        }
    }
}

impl fmt::Display for CorrectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrectionModel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(CorrectionModel::None),
            "aqandu" | "aq&u" | "a" => Ok(CorrectionModel::AqAndU),
            "lrapa" | "b" => Ok(CorrectionModel::Lrapa),
            other => Err(format!("unknown correction model '{other}'")),
        }
    }
}
