//! Numeric search bounds entered by the user.
//!
//! Inputs arrive as raw text. An empty string clears the bound; anything
//! else must parse to a finite, non-negative number or it is refused and
//! the previous bound is kept.

use lone_star_ledger_models::SchoolFilters;

use crate::ValidationRejection;

/// Holder for the current [`SchoolFilters`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    current: SchoolFilters,
}

impl FilterCriteria {
    /// Creates criteria with no bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum per-pupil spending from raw input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationRejection`] if the input is not a non-negative
    /// number. The previous bound is kept.
    pub fn set_min_spend(&mut self, raw: &str) -> Result<(), ValidationRejection> {
        self.current.min_spend = parse_bound("min_spend", raw, self.current.min_spend)?;
        Ok(())
    }

    /// Sets the maximum total debt from raw input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationRejection`] if the input is not a non-negative
    /// number. The previous bound is kept.
    pub fn set_max_debt(&mut self, raw: &str) -> Result<(), ValidationRejection> {
        self.current.max_debt = parse_bound("max_debt", raw, self.current.max_debt)?;
        Ok(())
    }

    /// Snapshot of the current bounds.
    #[must_use]
    pub const fn current(&self) -> SchoolFilters {
        self.current
    }
}

fn parse_bound(
    field: &str,
    raw: &str,
    previous: Option<f64>,
) -> Result<Option<f64>, ValidationRejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let rejection = match trimmed.parse::<f64>() {
        Ok(value) if !value.is_finite() => ValidationRejection::NonFinite {
            input: raw.to_string(),
        },
        Ok(value) if value < 0.0 => ValidationRejection::Negative { value },
        // -0.0 parses fine; store it as plain zero
        Ok(value) => return Ok(Some(value.abs())),
        Err(_) => ValidationRejection::NotANumber {
            input: raw.to_string(),
        },
    };

    log::debug!("Rejected {field} input, keeping {previous:?}: {rejection}");
    Err(rejection)
}
