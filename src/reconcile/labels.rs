use super::ReconcileError;
use crate::datamodel::{SITE_LABEL, TOTAL_ENTITY};
use std::collections::HashSet;

/// Checks that device labels are unique and do not collide with the site
/// series, which is written under [`SITE_LABEL`] and keyed [`TOTAL_ENTITY`]
/// by producers.
pub fn check_device_labels<'a, I>(labels: I) -> Result<(), ReconcileError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for label in labels {
        if label == SITE_LABEL || label == TOTAL_ENTITY {
            return Err(ReconcileError::ReservedLabel {
                label: label.to_string(),
            });
        }
        if !seen.insert(label) {
            return Err(ReconcileError::DuplicateLabel {
                label: label.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_labels_pass() {
        assert_eq!(check_device_labels(["inv1", "inv2", "inv3"]), Ok(()));
        assert_eq!(check_device_labels(std::iter::empty()), Ok(()));
    }

    #[test]
    fn test_duplicate_label() {
        assert_eq!(
            check_device_labels(["inv1", "inv2", "inv1"]),
            Err(ReconcileError::DuplicateLabel {
                label: "inv1".to_string()
            })
        );
    }

    #[test]
    fn test_reserved_labels() {
        for reserved in [SITE_LABEL, TOTAL_ENTITY] {
            assert_eq!(
                check_device_labels(["inv1", reserved]),
                Err(ReconcileError::ReservedLabel {
                    label: reserved.to_string()
                })
            );
        }
        // Only exact matches are reserved
        assert_eq!(check_device_labels(["site2", "subtotal"]), Ok(()));
    }
}
