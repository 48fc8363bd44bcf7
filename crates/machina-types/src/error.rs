// ─────────────────────────────────────────────────────────────────────
// Machina — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MachinaError {
    /// Invalid or out-of-domain input. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// NaN/Inf detected in a recursive solver state.
    #[error("Numerical instability at step {step} in {quantity}: {context}")]
    NumericalInstability {
        step: usize,
        quantity: String,
        context: String,
    },

    /// Iterative solver exhausted its iteration budget.
    #[error("Convergence failure after {iterations} iterations (residual {residual:.3e}): {context}")]
    ConvergenceFailure {
        iterations: usize,
        residual: f64,
        context: String,
    },

    /// Divergence detected in the coupled fluid-structure loop.
    #[error("Structural instability at coupling iteration {iteration}: {message}")]
    StructuralInstability { iteration: usize, message: String },

    /// Requested material/constraint key is absent from the catalog.
    #[error("Catalog key not found: {0}")]
    CatalogKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MachinaError {
    /// True for failures a caller may retry with relaxed solver settings.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MachinaError::ConvergenceFailure { .. } | MachinaError::StructuralInstability { .. }
        )
    }
}

pub type MachinaResult<T> = Result<T, MachinaError>;

/// Fail with `NumericalInstability` if `value` is NaN or infinite.
pub fn ensure_finite(value: f64, step: usize, quantity: &str, context: &str) -> MachinaResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MachinaError::NumericalInstability {
            step,
            quantity: quantity.to_string(),
            context: context.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite_passes_through() {
        assert_eq!(ensure_finite(1.5, 0, "lift", "").unwrap(), 1.5);
    }

    #[test]
    fn test_ensure_finite_reports_step() {
        let err = ensure_finite(f64::NAN, 17, "wake_x1", "V=10").unwrap_err();
        match err {
            MachinaError::NumericalInstability { step, quantity, .. } => {
                assert_eq!(step, 17);
                assert_eq!(quantity, "wake_x1");
            }
            other => panic!("Expected NumericalInstability, got {other:?}"),
        }
    }

    #[test]
    fn test_retryable_classification() {
        let conv = MachinaError::ConvergenceFailure {
            iterations: 200,
            residual: 1e-2,
            context: String::new(),
        };
        assert!(conv.is_retryable());
        assert!(!MachinaError::CatalogKey("x".into()).is_retryable());
        assert!(!MachinaError::Configuration("x".into()).is_retryable());
    }
}
