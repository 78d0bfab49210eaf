//! The strand to which a read was mapped.

use std::str::FromStr;

/// An error related to the parsing of a strand.
#[derive(Debug)]
pub struct ParseStrandError(String);

impl std::fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse strand error: {} is not a valid strand", self.0)
    }
}

impl std::error::Error for ParseStrandError {}

/// The strand of an alignment.
///
/// Reads stored in a container record the strand of the reference to which
/// they were mapped as a single character (`+` or `-`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Strand {
    /// The positive strand (`+`).
    #[default]
    Positive,
    /// The negative strand (`-`).
    Negative,
}

impl FromStr for Strand {
    type Err = ParseStrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Positive),
            "-" => Ok(Self::Negative),
            c => Err(ParseStrandError(c.to_string())),
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Positive => write!(f, "+"),
            Strand::Negative => write!(f, "-"),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_strand_from_str() -> Result<(), Box<dyn std::error::Error>> {
        let strand: Strand = "+".parse()?;
        assert_eq!(strand, Strand::Positive);

        let strand: Strand = "-".parse()?;
        assert_eq!(strand, Strand::Negative);

        let err = "?".parse::<Strand>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse strand error: ? is not a valid strand"
        );

        Ok(())
    }

    #[test]
    fn test_strand_display() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(Strand::Positive.to_string(), "+");
        assert_eq!(Strand::Negative.to_string(), "-");
        Ok(())
    }

    #[test]
    fn test_default_strand_is_positive() {
        assert_eq!(Strand::default(), Strand::Positive);
    }
}
