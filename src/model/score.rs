use serde::{Deserialize, Serialize};

/// Result of a single hole relative to its par, collapsed to the buckets the
/// scoring distribution reports.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub enum ScoreBucket {
    EagleOrBetter,
    Birdie,
    Par,
    Bogey,
    DoubleBogey,
    TripleBogeyOrWorse,
}

impl ScoreBucket {
    pub const ALL: [ScoreBucket; 6] = [
        ScoreBucket::EagleOrBetter,
        ScoreBucket::Birdie,
        ScoreBucket::Par,
        ScoreBucket::Bogey,
        ScoreBucket::DoubleBogey,
        ScoreBucket::TripleBogeyOrWorse,
    ];

    #[must_use]
    pub fn from_to_par(delta: i32) -> Self {
        match delta {
            i32::MIN..=-2 => ScoreBucket::EagleOrBetter,
            -1 => ScoreBucket::Birdie,
            0 => ScoreBucket::Par,
            1 => ScoreBucket::Bogey,
            2 => ScoreBucket::DoubleBogey,
            _ => ScoreBucket::TripleBogeyOrWorse,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ScoreBucket::EagleOrBetter => "Eagle or better",
            ScoreBucket::Birdie => "Birdie",
            ScoreBucket::Par => "Par",
            ScoreBucket::Bogey => "Bogey",
            ScoreBucket::DoubleBogey => "Double bogey",
            ScoreBucket::TripleBogeyOrWorse => "Triple bogey or worse",
        }
    }

    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            ScoreBucket::EagleOrBetter => "eagle",
            ScoreBucket::Birdie => "birdie",
            ScoreBucket::Par => "par",
            ScoreBucket::Bogey => "bogey",
            ScoreBucket::DoubleBogey => "double-bogey",
            ScoreBucket::TripleBogeyOrWorse => "triple-bogey",
        }
    }
}

impl From<i32> for ScoreBucket {
    fn from(value: i32) -> Self {
        Self::from_to_par(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_follow_fixed_thresholds() {
        assert_eq!(ScoreBucket::from_to_par(-4), ScoreBucket::EagleOrBetter);
        assert_eq!(ScoreBucket::from_to_par(-2), ScoreBucket::EagleOrBetter);
        assert_eq!(ScoreBucket::from_to_par(-1), ScoreBucket::Birdie);
        assert_eq!(ScoreBucket::from_to_par(0), ScoreBucket::Par);
        assert_eq!(ScoreBucket::from_to_par(1), ScoreBucket::Bogey);
        assert_eq!(ScoreBucket::from_to_par(2), ScoreBucket::DoubleBogey);
        assert_eq!(ScoreBucket::from_to_par(3), ScoreBucket::TripleBogeyOrWorse);
        assert_eq!(ScoreBucket::from(9), ScoreBucket::TripleBogeyOrWorse);
    }
}
