use serde::{Deserialize, Serialize};

use super::Coordinate;

/// One outdoor sensor's PM2.5 value at the time of the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub concentration: f32,
    pub coordinate: Coordinate,
}

impl Reading {
    pub fn new(concentration: f32, coordinate: Coordinate) -> Self {
        Self {
            concentration,
            coordinate,
        }
    }
}
