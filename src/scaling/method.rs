use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// The four interchangeable scaling transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalingMethod {
    BellCurve,
    LinearNormalization,
    MinMaxNormalization,
    Percentile,
}

impl ScalingMethod {
    /// Parse a method from its CLI/config spelling.
    /// Accepts the short spellings used on the command line.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "bell-curve" | "bell" => Ok(ScalingMethod::BellCurve),
            "linear" | "linear-normalization" => Ok(ScalingMethod::LinearNormalization),
            "min-max" | "min-max-normalization" => Ok(ScalingMethod::MinMaxNormalization),
            "percentile" => Ok(ScalingMethod::Percentile),
            other => bail!(
                "Unknown scaling method '{}'. Valid methods: bell-curve, linear, min-max, percentile",
                other
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalingMethod::BellCurve => "bell-curve",
            ScalingMethod::LinearNormalization => "linear",
            ScalingMethod::MinMaxNormalization => "min-max",
            ScalingMethod::Percentile => "percentile",
        }
    }
}

impl std::fmt::Display for ScalingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_spellings() {
        assert_eq!(
            ScalingMethod::parse("bell-curve").unwrap(),
            ScalingMethod::BellCurve
        );
        assert_eq!(
            ScalingMethod::parse("linear").unwrap(),
            ScalingMethod::LinearNormalization
        );
        assert_eq!(
            ScalingMethod::parse("min-max").unwrap(),
            ScalingMethod::MinMaxNormalization
        );
        assert_eq!(
            ScalingMethod::parse("percentile").unwrap(),
            ScalingMethod::Percentile
        );
    }

    #[test]
    fn test_parse_long_spellings() {
        assert_eq!(
            ScalingMethod::parse("linear-normalization").unwrap(),
            ScalingMethod::LinearNormalization
        );
        assert_eq!(
            ScalingMethod::parse("min-max-normalization").unwrap(),
            ScalingMethod::MinMaxNormalization
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(
            ScalingMethod::parse("  bell  ").unwrap(),
            ScalingMethod::BellCurve
        );
    }

    #[test]
    fn test_parse_unknown_method_errors() {
        let err = ScalingMethod::parse("quadratic").unwrap_err();
        assert!(err.to_string().contains("quadratic"));
        assert!(err.to_string().contains("bell-curve"));
    }

    #[test]
    fn test_serde_kebab_case() {
        let json = serde_json::to_string(&ScalingMethod::BellCurve).unwrap();
        assert_eq!(json, "\"bell-curve\"");
        let parsed: ScalingMethod = serde_json::from_str("\"min-max-normalization\"").unwrap();
        assert_eq!(parsed, ScalingMethod::MinMaxNormalization);
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(ScalingMethod::Percentile.to_string(), "percentile");
    }
}
