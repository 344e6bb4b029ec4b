//! Raw model output to user-facing guidance.
//!
//! Bands include their lower bound and are contiguous, so every finite score
//! falls in exactly one tier.

/// Rounds to two decimals, the precision every response reports.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Probability in `[0, 1]` as a percentage with two decimals.
pub fn percent(probability: f64) -> f64 {
    round2(probability * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationTier {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HydrationReading {
    pub tier: HydrationTier,
    pub interpretation: &'static str,
    pub recommendation: &'static str,
}

pub fn hydration(score: f64) -> HydrationReading {
    if score < 4.0 {
        HydrationReading {
            tier: HydrationTier::Low,
            interpretation: "Low hydration - Your skin needs intensive moisturizing products",
            recommendation: "Look for products with Hyaluronic Acid, Glycerin, and Ceramides",
        }
    } else if score < 7.0 {
        HydrationReading {
            tier: HydrationTier::Moderate,
            interpretation: "Moderate hydration - Your skin has balanced moisture levels",
            recommendation: "Maintain with lightweight moisturizers and hydrating serums",
        }
    } else {
        HydrationReading {
            tier: HydrationTier::High,
            interpretation: "High hydration - Your skin is well-moisturized",
            recommendation: "Use oil-control products and lighter formulations",
        }
    }
}

pub fn skin_type_recommendation(skin_type: &str) -> Option<&'static str> {
    let advice = match skin_type {
        "Oily" => "Use oil-free, mattifying products with Salicylic Acid and Niacinamide",
        "Dry" => "Focus on rich moisturizers with Hyaluronic Acid, Ceramides, and Squalane",
        "Combination" => "Use targeted treatments - lightweight for T-zone, richer for dry areas",
        "Sensitive" => "Choose fragrance-free, hypoallergenic products with soothing ingredients",
        "Normal" => "Maintain balance with gentle cleansers and lightweight moisturizers",
        _ => return None,
    };
    Some(advice)
}

pub fn product_recommendation(would_recommend: bool) -> &'static str {
    if would_recommend {
        "Recommended"
    } else {
        "Not Recommended"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllergenReading {
    pub risk_level: &'static str,
    pub warning: &'static str,
    pub advice: &'static str,
}

pub fn allergen(has_risk: bool) -> AllergenReading {
    if has_risk {
        AllergenReading {
            risk_level: "High Risk",
            warning: "⚠️ This product may cause allergic reactions based on your sensitivity level",
            advice: "Patch test recommended",
        }
    } else {
        AllergenReading {
            risk_level: "Low Risk",
            warning: "✓ This product is likely safe for your skin type",
            advice: "Product appears safe for your skin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuitabilityReading {
    pub verdict: &'static str,
    pub explanation: &'static str,
    pub expected_satisfaction: &'static str,
}

pub fn suitability(is_suitable: bool) -> SuitabilityReading {
    if is_suitable {
        SuitabilityReading {
            verdict: "✓ Suitable Product",
            explanation: "This product matches your skin profile and is likely to give good results",
            expected_satisfaction: "High (7+/10)",
        }
    } else {
        SuitabilityReading {
            verdict: "✗ Not Suitable",
            explanation: "This product may not be ideal for your skin type and conditions",
            expected_satisfaction: "Low (<7/10)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatisfactionRating {
    Excellent,
    Good,
    Average,
    Poor,
}

impl SatisfactionRating {
    pub fn label(self) -> &'static str {
        match self {
            SatisfactionRating::Excellent => "🌟 Excellent Match",
            SatisfactionRating::Good => "✓ Good Match",
            SatisfactionRating::Average => "○ Average Match",
            SatisfactionRating::Poor => "✗ Poor Match",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SatisfactionReading {
    pub rating: SatisfactionRating,
    pub interpretation: String,
    pub recommendation: &'static str,
}

pub fn satisfaction(score: f64) -> SatisfactionReading {
    let rating = if score >= 8.0 {
        SatisfactionRating::Excellent
    } else if score >= 7.0 {
        SatisfactionRating::Good
    } else if score >= 5.0 {
        SatisfactionRating::Average
    } else {
        SatisfactionRating::Poor
    };
    let recommendation = match rating {
        SatisfactionRating::Excellent | SatisfactionRating::Good => "Highly recommended",
        SatisfactionRating::Average => "Consider alternatives",
        SatisfactionRating::Poor => "Not recommended",
    };
    SatisfactionReading {
        rating,
        interpretation: format!("Expected satisfaction: {score:.1}/10"),
        recommendation,
    }
}
