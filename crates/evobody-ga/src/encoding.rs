//! Gene encodings
//!
//! Both encodings share one representation: an individual is a `Vec<f64>`.
//! Binary genes hold `0.0` or `1.0`; real genes hold any finite value.

use serde::{Deserialize, Serialize};

/// A single gene value
pub type Gene = f64;

/// An ordered, fixed-length gene vector
pub type Individual = Vec<Gene>;

/// How genes are interpreted, which selects the mutation operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Each gene is 0 or 1; mutation flips one bit. Engines reject
    /// populations holding any other value.
    #[default]
    Binary,
    /// Each gene is a real number; mutation scales one gene by ±deviation
    Real,
}

impl Encoding {
    /// Get the display name for this encoding
    pub fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Real => "real",
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binary" | "bit" | "0" => Ok(Self::Binary),
            "real" | "float" | "1" => Ok(Self::Real),
            _ => Err(format!("Unknown encoding '{}'", s)),
        }
    }
}

/// Flip a binary gene: zero becomes one, anything else becomes zero
pub fn flip_bit(gene: Gene) -> Gene {
    if gene != 0.0 { 0.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_parse() {
        assert_eq!("binary".parse::<Encoding>(), Ok(Encoding::Binary));
        assert_eq!("REAL".parse::<Encoding>(), Ok(Encoding::Real));
        assert_eq!("1".parse::<Encoding>(), Ok(Encoding::Real));
        assert!("ternary".parse::<Encoding>().is_err());
    }

    #[test]
    fn test_encoding_default_is_binary() {
        assert_eq!(Encoding::default(), Encoding::Binary);
    }

    #[test]
    fn test_flip_bit() {
        assert_eq!(flip_bit(0.0), 1.0);
        assert_eq!(flip_bit(1.0), 0.0);
    }
}
