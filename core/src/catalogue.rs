use serde::Serialize;
use serde_json::Value;

use crate::recommend::{Candidate, PlanKey};
use crate::risk::RiskLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationSlice {
    pub label: &'static str,
    pub value: &'static str,
}

/// A subscription tier as sold on the plans page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanTier {
    /// Backend billing code
    pub id: &'static str,
    pub slug: &'static str,
    pub name: &'static str,
    pub label: &'static str,
    /// Price in whole rupees
    pub price: u32,
    pub tag: &'static str,
    pub features: &'static [&'static str],
    pub allocation: &'static [AllocationSlice],
}

pub static PLAN_TIERS: [PlanTier; 3] = [
    PlanTier {
        id: "standard",
        slug: "safety",
        name: "Safety plan",
        label: "Low risk · Capital protection",
        price: 1000,
        tag: "Best for conservative investors",
        features: &[
            "Access to low-volatility, capital-protection model portfolios",
            "Suggested buckets tuned for emergency fund & steady income",
            "Guidance on plugging protection gaps (insurance, buffer)",
        ],
        allocation: &[
            AllocationSlice { label: "Equity", value: "20%" },
            AllocationSlice { label: "Debt & fixed income", value: "60%" },
            AllocationSlice { label: "Gold / alternatives", value: "20%" },
        ],
    },
    PlanTier {
        id: "pro",
        slug: "balanced",
        name: "Balanced plan",
        label: "Moderate risk · Steady growth",
        price: 3000,
        tag: "Recommended for most investors",
        features: &[
            "Core diversified portfolio across equity, debt and gold",
            "Model buckets aligned with your goals and time horizon",
            "Ongoing allocation view so you know when to rebalance",
        ],
        allocation: &[
            AllocationSlice { label: "Equity", value: "50%" },
            AllocationSlice { label: "Debt & fixed income", value: "40%" },
            AllocationSlice { label: "Gold / alternatives", value: "10%" },
        ],
    },
    PlanTier {
        id: "max",
        slug: "growth",
        name: "Growth plan",
        label: "Higher risk · Higher potential",
        price: 5000,
        tag: "For aggressive, long-term investors",
        features: &[
            "High-growth, equity-oriented model portfolios",
            "Buckets tilted towards long-term themes and sectors",
            "Clear risk view so you know how much downside to expect",
        ],
        allocation: &[
            AllocationSlice { label: "Equity", value: "75%" },
            AllocationSlice { label: "Debt & fixed income", value: "20%" },
            AllocationSlice { label: "Gold / alternatives", value: "5%" },
        ],
    },
];

pub fn plan_tiers() -> &'static [PlanTier] {
    &PLAN_TIERS
}

pub fn tier_by_id(id: &str) -> Option<&'static PlanTier> {
    PLAN_TIERS.iter().find(|tier| tier.id == id)
}

/// Checkout mapping: anything above Balanced is sold the growth tier.
pub fn tier_for_risk_label(label: RiskLabel) -> &'static PlanTier {
    match label {
        RiskLabel::Conservative => &PLAN_TIERS[0],
        RiskLabel::Balanced => &PLAN_TIERS[1],
        RiskLabel::Aggressive | RiskLabel::Outlier => &PLAN_TIERS[2],
    }
}

pub fn tier_for_plan_key(key: PlanKey) -> Option<&'static PlanTier> {
    PLAN_TIERS.iter().find(|tier| tier.slug == key.as_str())
}

impl Candidate for PlanTier {
    fn id(&self) -> Option<String> {
        Some(self.id.to_string())
    }

    fn ids(&self) -> Vec<String> {
        vec![self.id.to_string(), self.slug.to_string()]
    }

    fn name(&self) -> Option<String> {
        Some(self.name.to_string())
    }

    fn risk_band(&self) -> Option<String> {
        None
    }

    fn is_flagged_recommended(&self) -> bool {
        false
    }

    fn allocation(&self) -> Option<Value> {
        serde_json::to_value(self.allocation).ok()
    }
}
