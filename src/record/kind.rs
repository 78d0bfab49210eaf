//! Kinds of per-base measurements.

use std::str::FromStr;

/// An error related to selecting a measurement [`Kind`].
#[derive(Debug, Eq, PartialEq)]
pub enum ParseKindError {
    /// No kind was selected.
    NoneSelected,

    /// More than one kind was selected.
    MultipleSelected(Vec<Kind>),

    /// The kind name was not recognized.
    Invalid(String),
}

impl std::fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseKindError::NoneSelected => write!(
                f,
                "no measurement kind selected: use one of `dwell`, `current`, or `stdev`"
            ),
            ParseKindError::MultipleSelected(kinds) => {
                let names = kinds
                    .iter()
                    .map(|kind| format!("`{kind}`"))
                    .collect::<Vec<_>>()
                    .join(" and ");
                write!(f, "cannot select {names} at the same time")
            }
            ParseKindError::Invalid(s) => write!(f, "invalid measurement kind: {s}"),
        }
    }
}

impl std::error::Error for ParseKindError {}

/// A kind of per-base measurement stored in the events table.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// The dwell time (number of raw samples) of each base.
    Dwell,

    /// The normalized mean current of each base.
    Current,

    /// The normalized standard deviation of the current of each base.
    Stdev,
}

impl Kind {
    /// All kinds, in flag order.
    pub const ALL: [Kind; 3] = [Kind::Dwell, Kind::Current, Kind::Stdev];

    /// Selects exactly one kind from a set of mutually exclusive flags.
    ///
    /// # Examples
    ///
    /// ```
    /// use eventarray::record::Kind;
    ///
    /// assert_eq!(Kind::from_flags(false, true, false), Ok(Kind::Current));
    /// assert!(Kind::from_flags(false, false, false).is_err());
    /// assert!(Kind::from_flags(true, true, false).is_err());
    /// ```
    pub fn from_flags(dwell: bool, current: bool, stdev: bool) -> Result<Self, ParseKindError> {
        let selected = Self::ALL
            .into_iter()
            .zip([dwell, current, stdev])
            .filter_map(|(kind, set)| set.then_some(kind))
            .collect::<Vec<_>>();

        match selected.len() {
            0 => Err(ParseKindError::NoneSelected),
            1 => Ok(selected[0]),
            _ => Err(ParseKindError::MultipleSelected(selected)),
        }
    }

    /// Gets the name of the events table column holding this kind.
    pub fn column(&self) -> &'static str {
        match self {
            Kind::Dwell => "length",
            Kind::Current => "norm_mean",
            Kind::Stdev => "norm_stdev",
        }
    }
}

impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dwell" => Ok(Kind::Dwell),
            "current" => Ok(Kind::Current),
            "stdev" => Ok(Kind::Stdev),
            _ => Err(ParseKindError::Invalid(s.to_string())),
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Dwell => write!(f, "dwell"),
            Kind::Current => write!(f, "current"),
            Kind::Stdev => write!(f, "stdev"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns() {
        assert_eq!(Kind::Dwell.column(), "length");
        assert_eq!(Kind::Current.column(), "norm_mean");
        assert_eq!(Kind::Stdev.column(), "norm_stdev");
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(Kind::from_flags(true, false, false), Ok(Kind::Dwell));
        assert_eq!(Kind::from_flags(false, false, true), Ok(Kind::Stdev));

        let err = Kind::from_flags(false, false, false).unwrap_err();
        assert_eq!(err, ParseKindError::NoneSelected);

        let err = Kind::from_flags(false, true, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot select `current` and `stdev` at the same time"
        );
    }

    #[test]
    fn test_from_str() -> Result<(), Box<dyn std::error::Error>> {
        for kind in Kind::ALL {
            assert_eq!(kind.to_string().parse::<Kind>()?, kind);
        }

        let err = "length".parse::<Kind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid measurement kind: length");
        Ok(())
    }
}
