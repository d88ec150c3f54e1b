use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of classifying one series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Invest,
    Avoid,
    Neutral,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Invest => write!(f, "Invest"),
            Verdict::Avoid => write!(f, "Avoid"),
            Verdict::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Band rules, listed in the order they are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Closing under the lower band while falling: the slide may continue
    BelowLowerTrendingDown,
    /// Closing over the upper band while rising: momentum continuation
    AboveUpperTrendingUp,
    /// Hugging the upper band but turning down: likely pullback
    NearUpperTrendingDown,
    /// Hugging the lower band but turning up: rebound setup
    NearLowerTrendingUp,
}

impl Rule {
    pub const ORDERED: [Rule; 4] = [
        Rule::BelowLowerTrendingDown,
        Rule::AboveUpperTrendingUp,
        Rule::NearUpperTrendingDown,
        Rule::NearLowerTrendingUp,
    ];

    pub fn verdict(&self) -> Verdict {
        match self {
            Rule::BelowLowerTrendingDown | Rule::NearUpperTrendingDown => Verdict::Avoid,
            Rule::AboveUpperTrendingUp | Rule::NearLowerTrendingUp => Verdict::Invest,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Rule::BelowLowerTrendingDown => "below lower band and trending down",
            Rule::AboveUpperTrendingUp => "above upper band and trending up",
            Rule::NearUpperTrendingDown => "near upper band and trending down",
            Rule::NearLowerTrendingUp => "near lower band and trending up",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Best symbol found so far, scored by average band width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    pub band_width: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_verdicts() {
        assert_eq!(Rule::BelowLowerTrendingDown.verdict(), Verdict::Avoid);
        assert_eq!(Rule::AboveUpperTrendingUp.verdict(), Verdict::Invest);
        assert_eq!(Rule::NearUpperTrendingDown.verdict(), Verdict::Avoid);
        assert_eq!(Rule::NearLowerTrendingUp.verdict(), Verdict::Invest);
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(Rule::ORDERED[0], Rule::BelowLowerTrendingDown);
        assert_eq!(Rule::ORDERED[3], Rule::NearLowerTrendingUp);
    }

    #[test]
    fn test_display() {
        assert_eq!(Verdict::Invest.to_string(), "Invest");
        assert_eq!(Rule::NearLowerTrendingUp.to_string(), "near lower band and trending up");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Rule::AboveUpperTrendingUp).unwrap();
        assert_eq!(json, "\"above_upper_trending_up\"");
    }
}
