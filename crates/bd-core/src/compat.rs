//! Transfusion compatibility table
//!
//! Fixed recipient-to-donor mapping; defined once, never derived.

use crate::BloodType;
use BloodType::*;

/// Donor types a recipient of the given blood type can safely receive from.
///
/// The returned slice is closed and exhaustive; unknown types cannot reach
/// here because [`BloodType`] parsing rejects them upstream.
pub fn compatible_donor_types(recipient: BloodType) -> &'static [BloodType] {
    match recipient {
        APositive => &[APositive, ANegative, OPositive, ONegative],
        ANegative => &[ANegative, ONegative],
        BPositive => &[BPositive, BNegative, OPositive, ONegative],
        BNegative => &[BNegative, ONegative],
        AbPositive => &[
            APositive, ANegative, BPositive, BNegative, AbPositive, AbNegative, OPositive,
            ONegative,
        ],
        AbNegative => &[ANegative, BNegative, AbNegative, ONegative],
        OPositive => &[OPositive, ONegative],
        ONegative => &[ONegative],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_nonempty_set() {
        for bt in BloodType::ALL {
            assert!(!compatible_donor_types(bt).is_empty());
        }
    }

    #[test]
    fn test_universal_recipient() {
        assert_eq!(compatible_donor_types(AbPositive).len(), 8);
    }

    #[test]
    fn test_o_negative_only_accepts_itself() {
        assert_eq!(compatible_donor_types(ONegative), &[ONegative]);
    }

    #[test]
    fn test_o_negative_donates_to_all() {
        for bt in BloodType::ALL {
            assert!(compatible_donor_types(bt).contains(&ONegative));
        }
    }

    #[test]
    fn test_positive_recipients_accept_matching_negative() {
        assert!(compatible_donor_types(APositive).contains(&ANegative));
        assert!(compatible_donor_types(BPositive).contains(&BNegative));
    }
}
