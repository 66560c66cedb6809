//! Non-zero limits backed by nutype

use nutype::nutype;

use crate::constants::source::MAX_CANDIDATES;

/// Upper bound on how many candidates one run measures
///
/// Applied to the head of the parsed list, so list order decides who is
/// measured when the list is longer than the limit.
#[nutype(
    validate(greater = 0),
    derive(
        Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFrom, Into, Display,
        Serialize, Deserialize,
    )
)]
pub struct MaxCandidates(usize);

impl Default for MaxCandidates {
    fn default() -> Self {
        Self::try_new(MAX_CANDIDATES).expect("default candidate limit is non-zero")
    }
}

impl MaxCandidates {
    #[inline]
    pub fn get(&self) -> usize {
        self.into_inner()
    }
}

impl std::str::FromStr for MaxCandidates {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid candidate limit: {s}"))?;
        Self::try_new(value).map_err(|e| e.to_string())
    }
}
