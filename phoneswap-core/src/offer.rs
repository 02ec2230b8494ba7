//! Purchase-offer negotiation rules
//!
//! The rules that do not need storage access live here: candidate-set
//! validation at offer creation, and the seller's selection rule at
//! acceptance. Arbiter capability checks need the auth-status store and
//! are applied by the server on top of these.

use crate::types::UserId;
use crate::{Error, Result};

/// Minimum number of candidate arbiters a buyer must propose
pub const MIN_CANDIDATES: usize = 3;

/// Maximum number of candidate arbiter slots on an offer
pub const MAX_CANDIDATES: usize = 6;

/// Number of arbiters the seller must select at acceptance
pub const SELECTED_ARBITERS: usize = 3;

/// Validate a buyer's candidate arbiter set at offer creation.
///
/// 3 to 6 ids, all distinct, and neither party to the trade may sit on
/// its own arbiter panel.
pub fn validate_candidates(buyer: UserId, seller: UserId, candidates: &[UserId]) -> Result<()> {
    if candidates.len() < MIN_CANDIDATES || candidates.len() > MAX_CANDIDATES {
        return Err(Error::CandidateCount(candidates.len()));
    }

    for (i, candidate) in candidates.iter().enumerate() {
        if *candidate == buyer {
            return Err(Error::CandidateIsBuyer);
        }
        if *candidate == seller {
            return Err(Error::CandidateIsSeller);
        }
        if candidates[..i].contains(candidate) {
            return Err(Error::DuplicateCandidate(*candidate));
        }
    }

    Ok(())
}

/// Validate the seller's arbiter selection at acceptance.
///
/// Exactly 3 distinct ids, every one drawn from the buyer's original
/// candidate set.
pub fn validate_selection(candidates: &[UserId], selection: &[UserId]) -> Result<()> {
    if selection.len() != SELECTED_ARBITERS {
        return Err(Error::SelectionCount(selection.len()));
    }

    for (i, selected) in selection.iter().enumerate() {
        if selection[..i].contains(selected) {
            return Err(Error::DuplicateSelection(*selected));
        }
        if !candidates.contains(selected) {
            return Err(Error::NotInCandidateSet(*selected));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUYER: UserId = UserId(10);
    const SELLER: UserId = UserId(20);

    fn ids(raw: &[u64]) -> Vec<UserId> {
        raw.iter().copied().map(UserId).collect()
    }

    #[test]
    fn test_candidate_set_bounds() {
        assert!(matches!(
            validate_candidates(BUYER, SELLER, &ids(&[1, 2])),
            Err(Error::CandidateCount(2))
        ));
        assert!(matches!(
            validate_candidates(BUYER, SELLER, &ids(&[1, 2, 3, 4, 5, 6, 7])),
            Err(Error::CandidateCount(7))
        ));
        assert!(validate_candidates(BUYER, SELLER, &ids(&[1, 2, 3])).is_ok());
        assert!(validate_candidates(BUYER, SELLER, &ids(&[1, 2, 3, 4, 5, 6])).is_ok());
    }

    #[test]
    fn test_parties_excluded_from_panel() {
        assert!(matches!(
            validate_candidates(BUYER, SELLER, &ids(&[1, 10, 3])),
            Err(Error::CandidateIsBuyer)
        ));
        assert!(matches!(
            validate_candidates(BUYER, SELLER, &ids(&[1, 2, 20])),
            Err(Error::CandidateIsSeller)
        ));
    }

    #[test]
    fn test_duplicate_candidates_rejected() {
        assert!(matches!(
            validate_candidates(BUYER, SELLER, &ids(&[1, 2, 1])),
            Err(Error::DuplicateCandidate(UserId(1)))
        ));
    }

    #[test]
    fn test_selection_must_be_three() {
        let candidates = ids(&[1, 2, 3, 4]);
        assert!(matches!(
            validate_selection(&candidates, &ids(&[1, 2])),
            Err(Error::SelectionCount(2))
        ));
        assert!(matches!(
            validate_selection(&candidates, &ids(&[1, 2, 3, 4])),
            Err(Error::SelectionCount(4))
        ));
        assert!(validate_selection(&candidates, &ids(&[1, 2, 4])).is_ok());
    }

    #[test]
    fn test_selection_must_be_subset() {
        let candidates = ids(&[1, 2, 3, 4]);
        assert!(matches!(
            validate_selection(&candidates, &ids(&[1, 2, 9])),
            Err(Error::NotInCandidateSet(UserId(9)))
        ));
    }

    #[test]
    fn test_selection_duplicates_rejected() {
        let candidates = ids(&[1, 2, 3, 4]);
        assert!(matches!(
            validate_selection(&candidates, &ids(&[1, 2, 2])),
            Err(Error::DuplicateSelection(UserId(2)))
        ));
    }
}
