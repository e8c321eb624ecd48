// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// What to do with a prospective quantum whose outputs already exist.
///
/// - `Skip`: if *every* output exists, drop the quantum silently; the work
///   has already been done (default behaviour).
/// - `Fail`: any pre-existing output aborts the build.
///
/// Partially existing outputs abort the build under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingOutputs {
    Skip,
    Fail,
}

impl ExistingOutputs {
    pub fn from_skip_existing(skip: bool) -> Self {
        if skip {
            ExistingOutputs::Skip
        } else {
            ExistingOutputs::Fail
        }
    }

    pub fn skips(self) -> bool {
        self == ExistingOutputs::Skip
    }
}

impl Default for ExistingOutputs {
    fn default() -> Self {
        ExistingOutputs::Skip
    }
}

impl FromStr for ExistingOutputs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(ExistingOutputs::Skip),
            "fail" => Ok(ExistingOutputs::Fail),
            other => Err(format!(
                "invalid existing_outputs: {other} (expected \"skip\" or \"fail\")"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policy_names() {
        assert_eq!("skip".parse::<ExistingOutputs>(), Ok(ExistingOutputs::Skip));
        assert_eq!(" FAIL ".parse::<ExistingOutputs>(), Ok(ExistingOutputs::Fail));
        assert!("overwrite".parse::<ExistingOutputs>().is_err());
    }

    #[test]
    fn bool_conversion() {
        assert!(ExistingOutputs::from_skip_existing(true).skips());
        assert!(!ExistingOutputs::from_skip_existing(false).skips());
    }
}
