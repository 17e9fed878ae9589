use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Consultation package tiers. Pricing is in currency minor units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PackageTier {
    Basic,
    Premium,
    Advanced,
}

impl PackageTier {
    /// Resolves a client-supplied package name through the case-insensitive
    /// synonym table. Marketing names like "Premium Consultation" map to the
    /// bare tier.
    pub fn resolve(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "basic" | "basic consultation" | "basic video consultation" => {
                Some(PackageTier::Basic)
            }
            "premium" | "premium consultation" | "premium video consultation" => {
                Some(PackageTier::Premium)
            }
            "advanced" | "advanced consultation" | "advanced video consultation" => {
                Some(PackageTier::Advanced)
            }
            _ => None,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(PackageTier::Basic),
            "premium" => Some(PackageTier::Premium),
            "advanced" => Some(PackageTier::Advanced),
            _ => None,
        }
    }

    pub fn amount_minor(&self) -> i32 {
        match self {
            PackageTier::Basic => 50_000,
            PackageTier::Premium => 80_000,
            PackageTier::Advanced => 120_000,
        }
    }

    pub fn duration_minutes(&self) -> i32 {
        match self {
            PackageTier::Basic => 30,
            PackageTier::Premium => 45,
            PackageTier::Advanced => 60,
        }
    }
}

impl Display for PackageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tier = match self {
            PackageTier::Basic => "basic",
            PackageTier::Premium => "premium",
            PackageTier::Advanced => "advanced",
        };
        write!(f, "{}", tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_marketing_names_case_insensitively() {
        assert_eq!(
            PackageTier::resolve("Premium Consultation"),
            Some(PackageTier::Premium)
        );
        assert_eq!(PackageTier::resolve("advanced"), Some(PackageTier::Advanced));
        assert_eq!(PackageTier::resolve("BASIC"), Some(PackageTier::Basic));
    }

    #[test]
    fn rejects_unknown_package_names() {
        assert_eq!(PackageTier::resolve("gold"), None);
        assert_eq!(PackageTier::resolve(""), None);
    }

    #[test]
    fn tiers_carry_duration_and_amount() {
        assert_eq!(PackageTier::Basic.duration_minutes(), 30);
        assert_eq!(PackageTier::Premium.duration_minutes(), 45);
        assert_eq!(PackageTier::Advanced.duration_minutes(), 60);
        assert!(PackageTier::Basic.amount_minor() < PackageTier::Advanced.amount_minor());
    }
}
