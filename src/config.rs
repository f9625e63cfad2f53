/*
 * This modules contains the `EvalConfig` struct, which implements the default trait, and its
 * builder. The config can be passed to the `evaluate_predictions_conf` function to simplify its
 * arguments.
*/
use crate::metrics::DivByZeroStrat;
use std::fmt::Display;
use triplet_parsing::DEFAULT_DELIMITER;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
/// Config struct used to simplify the inputs of parameters to the main functions of `aste_eval`.
/// It implements the default trait.
pub struct EvalConfig {
    /// Character separating two triplets in the raw output of the model. The default is `|`.
    pub(crate) delimiter: char,
    /// This parameter describe what to do when we encounter a division by zero when computing
    /// precision, recall and f-score. The most common solution is to replace the results by 0.
    pub(crate) zero_division: DivByZeroStrat,
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn zero_division(&self) -> DivByZeroStrat {
        self.zero_division
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            zero_division: DivByZeroStrat::ReplaceBy0,
        }
    }
}

impl From<(char, DivByZeroStrat)> for EvalConfig {
    fn from(value: (char, DivByZeroStrat)) -> Self {
        Self {
            delimiter: value.0,
            zero_division: value.1,
        }
    }
}

impl From<EvalConfig> for (char, DivByZeroStrat) {
    fn from(value: EvalConfig) -> Self {
        (value.delimiter, value.zero_division)
    }
}

impl From<EvalConfigBuilder> for EvalConfig {
    fn from(value: EvalConfigBuilder) -> Self {
        Self {
            delimiter: value.delimiter,
            zero_division: value.zero_division,
        }
    }
}

impl Display for EvalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Triplet delimiter: {:?}\n Strategy when encountering a division by zero: {:?}",
            self.delimiter, self.zero_division
        )
    }
}

/// This builder can be used to build and customize an `EvalConfig` stucture.
#[derive(Clone, Copy, Debug)]
pub struct EvalConfigBuilder {
    delimiter: char,
    zero_division: DivByZeroStrat,
}

impl Default for EvalConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalConfigBuilder {
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
    pub fn division_by_zero(mut self, division_by_zero: DivByZeroStrat) -> Self {
        self.zero_division = division_by_zero;
        self
    }
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            zero_division: DivByZeroStrat::ReplaceBy0,
        }
    }
    pub fn build(self) -> EvalConfig {
        EvalConfig::from(self)
    }
}
