//! Staging fields populated from a note.

use serde::{Deserialize, Serialize};

/// Value reported for any field the note does not mention.
pub const NOT_REPORTED: &str = "Not Reported";

/// One axis of the TNM classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TnmCategory {
    /// Primary tumor
    T,
    /// Regional lymph nodes
    N,
    /// Distant metastasis
    M,
}

impl TnmCategory {
    /// Categories in matching order.
    pub const ALL: [TnmCategory; 3] = [TnmCategory::T, TnmCategory::N, TnmCategory::M];

    pub fn as_str(&self) -> &'static str {
        match self {
            TnmCategory::T => "T",
            TnmCategory::N => "N",
            TnmCategory::M => "M",
        }
    }
}

/// TNM codes found in a note, one per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TnmStaging {
    #[serde(rename = "T")]
    pub t: String,
    #[serde(rename = "N")]
    pub n: String,
    #[serde(rename = "M")]
    pub m: String,
}

impl Default for TnmStaging {
    fn default() -> Self {
        Self {
            t: NOT_REPORTED.to_string(),
            n: NOT_REPORTED.to_string(),
            m: NOT_REPORTED.to_string(),
        }
    }
}

impl TnmStaging {
    pub fn get(&self, category: TnmCategory) -> &str {
        match category {
            TnmCategory::T => &self.t,
            TnmCategory::N => &self.n,
            TnmCategory::M => &self.m,
        }
    }

    pub fn set(&mut self, category: TnmCategory, code: impl Into<String>) {
        let slot = match category {
            TnmCategory::T => &mut self.t,
            TnmCategory::N => &mut self.n,
            TnmCategory::M => &mut self.m,
        };
        *slot = code.into();
    }

    /// True if any category was found.
    pub fn is_reported(&self) -> bool {
        TnmCategory::ALL.iter().any(|c| self.get(*c) != NOT_REPORTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_reported() {
        let tnm = TnmStaging::default();
        for category in TnmCategory::ALL {
            assert_eq!(tnm.get(category), NOT_REPORTED);
        }
        assert!(!tnm.is_reported());
    }

    #[test]
    fn test_set_overwrites_single_category() {
        let mut tnm = TnmStaging::default();
        tnm.set(TnmCategory::N, "N1");
        tnm.set(TnmCategory::N, "N2");
        assert_eq!(tnm.n, "N2");
        assert_eq!(tnm.t, NOT_REPORTED);
        assert!(tnm.is_reported());
    }

    #[test]
    fn test_serializes_with_axis_keys() {
        let mut tnm = TnmStaging::default();
        tnm.set(TnmCategory::T, "T2a");
        let json = serde_json::to_value(&tnm).unwrap();
        assert_eq!(json["T"], "T2a");
        assert_eq!(json["M"], NOT_REPORTED);
    }
}
