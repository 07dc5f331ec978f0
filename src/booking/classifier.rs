//! # Banner Classification
//!
//! When no confirmation arrives the site usually explains itself with a
//! free-text banner. Patterns are tested case-insensitively in precedence
//! order: already booked first, then waitlisted; anything else is
//! unclassified and leaves the ledger alone.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::banners;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerClassification {
    AlreadyBooked,
    Waitlisted,
    Unclassified,
}

#[derive(Debug, Clone)]
pub struct BannerClassifier {
    already_booked: Regex,
    waitlisted: Regex,
}

impl BannerClassifier {
    pub fn with_patterns(already_booked: &str, waitlisted: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            already_booked: Regex::new(already_booked)?,
            waitlisted: Regex::new(waitlisted)?,
        })
    }

    /// `None` (no banner element at all) is unclassified
    pub fn classify(&self, banner: Option<&str>) -> BannerClassification {
        let Some(text) = banner.map(str::trim).filter(|t| !t.is_empty()) else {
            return BannerClassification::Unclassified;
        };

        if self.already_booked.is_match(text) {
            BannerClassification::AlreadyBooked
        } else if self.waitlisted.is_match(text) {
            BannerClassification::Waitlisted
        } else {
            BannerClassification::Unclassified
        }
    }
}

impl Default for BannerClassifier {
    fn default() -> Self {
        Self::with_patterns(banners::ALREADY_BOOKED, banners::WAITLISTED)
            .expect("built-in banner patterns are valid regexes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_in_class() {
        let classifier = BannerClassifier::default();
        assert_eq!(
            classifier.classify(Some("You are ALREADY IN CLASS at this time.")),
            BannerClassification::AlreadyBooked
        );
        assert_eq!(
            classifier.classify(Some("You are already registered for another session at this time")),
            BannerClassification::AlreadyBooked
        );
    }

    #[test]
    fn test_waitlist_banners() {
        let classifier = BannerClassifier::default();
        assert_eq!(
            classifier.classify(Some("You are already in the waitlist for this class")),
            BannerClassification::Waitlisted
        );
        assert_eq!(
            classifier.classify(Some("You have already booked this spot")),
            BannerClassification::Waitlisted
        );
    }

    #[test]
    fn test_class_rule_takes_precedence() {
        let classifier = BannerClassifier::default();
        assert_eq!(
            classifier.classify(Some(
                "You are already in the waitlist. You are also already in class."
            )),
            BannerClassification::AlreadyBooked
        );
    }

    #[test]
    fn test_missing_or_unknown_banner() {
        let classifier = BannerClassifier::default();
        assert_eq!(classifier.classify(None), BannerClassification::Unclassified);
        assert_eq!(classifier.classify(Some("   ")), BannerClassification::Unclassified);
        assert_eq!(
            classifier.classify(Some("Something went wrong, please try again")),
            BannerClassification::Unclassified
        );
    }

    #[test]
    fn test_custom_patterns() {
        let classifier = BannerClassifier::with_patterns("(?i)déjà inscrit", "(?i)liste d'attente").unwrap();
        assert_eq!(
            classifier.classify(Some("Vous êtes déjà inscrit")),
            BannerClassification::AlreadyBooked
        );
        assert!(BannerClassifier::with_patterns("(", "x").is_err());
    }
}
