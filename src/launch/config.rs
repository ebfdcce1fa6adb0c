//! Configuration for block contractions.

/// Configuration options for block contraction execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractConfig {
    /// Schedule entries whose merged coefficient does not exceed this value in
    /// magnitude are dropped. `0.0` drops exact cancellations only.
    pub zero_threshold: f64,
    /// Whether an overwriting `perform` installs the derived result symmetry
    /// on the output tensor. When disabled, the output keeps its own symmetry,
    /// which must be a subgroup of the derived one.
    pub install_result_symmetry: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            zero_threshold: 0.0,
            install_result_symmetry: true,
        }
    }
}

impl ContractConfig {
    /// Creates a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pruning threshold for merged coefficients.
    pub fn with_zero_threshold(mut self, threshold: f64) -> Self {
        self.zero_threshold = if threshold < 0.0 { -threshold } else { threshold };
        self
    }

    /// Enables or disables installing the derived symmetry on the output.
    pub fn with_result_symmetry(mut self, enabled: bool) -> Self {
        self.install_result_symmetry = enabled;
        self
    }

    /// Creates a config that also prunes entries cancelled up to rounding.
    pub fn fast() -> Self {
        Self {
            zero_threshold: 1e-12,
            install_result_symmetry: true,
        }
    }

    /// Creates a config that only prunes exact cancellations.
    pub fn exact() -> Self {
        Self::default()
    }
}
