use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A fraction constrained to [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct UnitFraction(f32);

impl UnitFraction {
    const MIN: f32 = 0.0;
    const MAX: f32 = 1.0;

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(Self::MIN);
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for UnitFraction {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl From<f32> for UnitFraction {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<UnitFraction> for f32 {
    fn from(value: UnitFraction) -> Self {
        value.0
    }
}

/// A generation attempt budget constrained to [1, 10_000]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct AttemptBudget(u32);

impl AttemptBudget {
    const MIN: u32 = 1;
    const MAX: u32 = 10_000;

    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for AttemptBudget {
    fn default() -> Self {
        Self::new(50)
    }
}

impl From<u32> for AttemptBudget {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<AttemptBudget> for u32 {
    fn from(value: AttemptBudget) -> Self {
        value.0
    }
}
