//! Corpus languages.
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Languages for which corpora are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lang {
    De,
    En,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::De => "de",
            Lang::En => "en",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Lang {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "de" => Ok(Lang::De),
            "en" => Ok(Lang::En),
            other => Err(Error::Config(format!(
                "unsupported corpus language '{}' (expected 'de' or 'en')",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Lang;

    #[test]
    fn parse() {
        assert_eq!("de".parse::<Lang>().unwrap(), Lang::De);
        assert_eq!("en".parse::<Lang>().unwrap().to_string(), "en");
        assert!("fr".parse::<Lang>().is_err());
    }
}
