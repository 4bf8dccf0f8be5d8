//! `TimeUnit` — a named integer multiple of iterations.

/// A declared time unit.  `unit` is either `"iteration"` or the name of
/// another declared time unit; the effective period multiplies down the
/// chain.  Recursion and the reserved name `iteration` are rejected by the
/// validator.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeUnit {
    pub name: String,
    pub unit: String,
    /// Raw period, as parsed.
    pub period_str: String,
    /// Resolved period (`>= 1`), set by the validator.
    pub period: i32,
}

impl TimeUnit {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        period: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            period_str: period.into(),
            period: 0,
        }
    }
}
