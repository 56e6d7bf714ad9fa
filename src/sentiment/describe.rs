use std::fmt;

/// Label the pipeline uses for positive text.
pub const POSITIVE_LABEL: &str = "POSITIVE";
/// Label the pipeline uses for negative text.
pub const NEGATIVE_LABEL: &str = "NEGATIVE";
/// Confidence strictly above this yields the plain description.
pub const CONFIDENCE_THRESHOLD: f64 = 0.75;

/// Human-readable reading of a (label, confidence) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentDescription {
    Positive,
    SomewhatPositive,
    Negative,
    SomewhatNegative,
    Neutral,
}

impl SentimentDescription {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentDescription::Positive => "positive",
            SentimentDescription::SomewhatPositive => "somewhat positive",
            SentimentDescription::Negative => "negative",
            SentimentDescription::SomewhatNegative => "somewhat negative",
            SentimentDescription::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes a pipeline result using the default threshold of 0.75.
pub fn describe(label: &str, confidence: f64) -> SentimentDescription {
    describe_with_threshold(label, confidence, CONFIDENCE_THRESHOLD)
}

/// Describes a pipeline result.
///
/// `label` is compared case-sensitively against [`POSITIVE_LABEL`] and
/// [`NEGATIVE_LABEL`]; anything else reads as neutral. `confidence` is not
/// range-checked.
pub fn describe_with_threshold(label: &str, confidence: f64, threshold: f64) -> SentimentDescription {
    let strong = confidence > threshold;
    match label {
        POSITIVE_LABEL if strong => SentimentDescription::Positive,
        POSITIVE_LABEL => SentimentDescription::SomewhatPositive,
        NEGATIVE_LABEL if strong => SentimentDescription::Negative,
        NEGATIVE_LABEL => SentimentDescription::SomewhatNegative,
        _ => SentimentDescription::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive_on_the_high_side() {
        assert_eq!(describe("POSITIVE", 0.75), SentimentDescription::SomewhatPositive);
        assert_eq!(describe("POSITIVE", 0.7501), SentimentDescription::Positive);
        assert_eq!(describe("NEGATIVE", 0.75), SentimentDescription::SomewhatNegative);
        assert_eq!(describe("NEGATIVE", 0.7501), SentimentDescription::Negative);
    }

    #[test]
    fn somewhat_variant_iff_confidence_at_or_below_threshold() {
        for step in 0..=100 {
            let c = step as f64 / 100.0;
            let weak = c <= 0.75;
            assert_eq!(
                describe("POSITIVE", c) == SentimentDescription::SomewhatPositive,
                weak,
                "POSITIVE at {c}"
            );
            assert_eq!(
                describe("NEGATIVE", c) == SentimentDescription::SomewhatNegative,
                weak,
                "NEGATIVE at {c}"
            );
        }
    }

    #[test]
    fn unrecognised_labels_are_neutral() {
        for label in ["NEUTRAL", "positive", "Negative", "", "LABEL_0"] {
            for c in [0.0, 0.5, 0.75, 0.99, 1.0] {
                assert_eq!(describe(label, c), SentimentDescription::Neutral, "{label} at {c}");
            }
        }
    }

    #[test]
    fn out_of_range_confidence_is_accepted() {
        assert_eq!(describe("POSITIVE", 1.5), SentimentDescription::Positive);
        assert_eq!(describe("NEGATIVE", -0.2), SentimentDescription::SomewhatNegative);
    }

    #[test]
    fn custom_threshold() {
        assert_eq!(
            describe_with_threshold("POSITIVE", 0.8, 0.9),
            SentimentDescription::SomewhatPositive
        );
        assert_eq!(describe_with_threshold("POSITIVE", 0.8, 0.5), SentimentDescription::Positive);
    }

    #[test]
    fn renders_the_five_strings() {
        let rendered: Vec<String> = [
            SentimentDescription::Positive,
            SentimentDescription::SomewhatPositive,
            SentimentDescription::Negative,
            SentimentDescription::SomewhatNegative,
            SentimentDescription::Neutral,
        ]
        .iter()
        .map(|d| d.to_string())
        .collect();
        assert_eq!(
            rendered,
            ["positive", "somewhat positive", "negative", "somewhat negative", "neutral"]
        );
    }
}
