//! Score → ordinal label step function.

use crate::domain::RiskLabel;

/// Lower bounds of Low, Moderate, High and Severe. A score equal to a cut
/// point falls into the higher bin.
pub const CUT_POINTS: [f64; 4] = [30.0, 45.0, 65.0, 85.0];

/// Map a continuous risk score to its label.
///
/// Total over all `f64`; NaN fails every comparison and maps to `NoRisk`.
pub fn bin(score: f64) -> RiskLabel {
    let level = CUT_POINTS.iter().take_while(|&&cut| score >= cut).count();
    RiskLabel::ALL[level]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_the_higher_bin() {
        let cases = [
            (29.999, 0),
            (30.0, 1),
            (44.999, 1),
            (45.0, 2),
            (64.999, 2),
            (65.0, 3),
            (84.999, 3),
            (85.0, 4),
        ];
        for (score, level) in cases {
            assert_eq!(bin(score).level(), level, "score {score}");
        }
    }

    #[test]
    fn extremes_are_covered() {
        assert_eq!(bin(f64::NEG_INFINITY), RiskLabel::NoRisk);
        assert_eq!(bin(-1e9), RiskLabel::NoRisk);
        assert_eq!(bin(1e9), RiskLabel::Severe);
        assert_eq!(bin(f64::INFINITY), RiskLabel::Severe);
        assert_eq!(bin(f64::NAN), RiskLabel::NoRisk);
    }

    #[test]
    fn binning_is_monotonic() {
        let mut prev = bin(-50.0);
        let mut s = -50.0;
        while s <= 150.0 {
            let cur = bin(s);
            assert!(cur >= prev, "bin({s}) = {cur:?} < {prev:?}");
            prev = cur;
            s += 0.125;
        }
    }
}
