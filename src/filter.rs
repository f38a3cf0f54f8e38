use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Review ordering requested from the site's sort dropdown
///
/// Named orders map onto the site's option keys; anything else is passed
/// through as a raw option key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortOrder {
    /// Keep whatever ordering the page shows
    #[default]
    Default,
    Newest,
    Oldest,
    HighestScore,
    LowestScore,
    /// Site option key used verbatim
    Key(String),
}

impl SortOrder {
    /// Option key substituted into the schema's sort option selector, `None`
    /// for the default ordering
    pub fn option_key(&self) -> Option<&str> {
        match self {
            SortOrder::Default => None,
            SortOrder::Newest => Some("NEWEST_FIRST"),
            SortOrder::Oldest => Some("OLDEST_FIRST"),
            SortOrder::HighestScore => Some("SCORE_DESC"),
            SortOrder::LowestScore => Some("SCORE_ASC"),
            SortOrder::Key(key) => Some(key),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, SortOrder::Default)
    }
}

impl FromStr for SortOrder {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.to_lowercase().as_str() {
            "" | "default" => SortOrder::Default,
            "newest" => SortOrder::Newest,
            "oldest" => SortOrder::Oldest,
            "highest" | "highest_score" => SortOrder::HighestScore,
            "lowest" | "lowest_score" => SortOrder::LowestScore,
            _ => SortOrder::Key(trimmed.to_string()),
        })
    }
}

impl From<String> for SortOrder {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(order) => order,
            Err(never) => match never {},
        }
    }
}

impl From<SortOrder> for String {
    fn from(value: SortOrder) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Default => f.write_str("default"),
            SortOrder::Newest => f.write_str("newest"),
            SortOrder::Oldest => f.write_str("oldest"),
            SortOrder::HighestScore => f.write_str("highest"),
            SortOrder::LowestScore => f.write_str("lowest"),
            SortOrder::Key(key) => f.write_str(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_orders() {
        assert_eq!("default".parse::<SortOrder>().unwrap(), SortOrder::Default);
        assert_eq!("".parse::<SortOrder>().unwrap(), SortOrder::Default);
        assert_eq!("Newest".parse::<SortOrder>().unwrap(), SortOrder::Newest);
        assert_eq!(SortOrder::HighestScore.option_key(), Some("SCORE_DESC"));
        assert_eq!(SortOrder::Default.option_key(), None);
    }

    #[test]
    fn test_raw_key_passthrough() {
        let order: SortOrder = "f_recent_desc".parse().unwrap();
        assert_eq!(order, SortOrder::Key("f_recent_desc".to_string()));
        assert_eq!(order.option_key(), Some("f_recent_desc"));
        assert!(!order.is_default());
    }

    #[test]
    fn test_deserialize_from_string() {
        let order: SortOrder = serde_json::from_str("\"oldest\"").unwrap();
        assert_eq!(order, SortOrder::Oldest);
        assert_eq!(serde_json::to_string(&order).unwrap(), "\"oldest\"");
    }
}
