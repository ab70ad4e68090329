use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Value, json};
use wealthpath_core::buckets::normalize_buckets;
use wealthpath_core::catalogue::{PlanTier, plan_tiers, tier_for_plan_key, tier_for_risk_label};
use wealthpath_core::error::{ErrorBody, codes};
use wealthpath_core::recommend::{
    Candidate, MatchContext, SelectionReport, candidates_from_payload,
    recommended_id_from_payload, resolve, resolve_plan_key,
};
use wealthpath_core::risk::RiskLabel;

use crate::util::{EXIT_CLIENT, exit_error, get_json, print_error, print_json, read_json_from_file};

#[derive(Subcommand)]
pub enum RecommendCommands {
    /// Collapse a risk label or band into a canonical plan key
    PlanKey {
        /// Risk label or band (e.g. "Balanced", "low")
        #[arg(long)]
        label: String,
    },
    /// Resolve the recommended candidate from a saved listing payload
    Resolve {
        /// Which resolution chain to run
        #[arg(long, value_enum)]
        context: ContextArg,
        /// Listing JSON: an array, or an object with "plans"/"buckets" (use '-' for stdin)
        #[arg(long)]
        payload_file: String,
        /// Risk label or band hint
        #[arg(long, default_value = "")]
        risk: String,
        /// Recommended id override (defaults to the one carried in the payload)
        #[arg(long)]
        recommended_id: Option<String>,
    },
    /// Fetch the listing from the API and resolve the recommended candidate
    Fetch {
        /// Which listing to fetch: plan (/plans/my) or bucket (/buckets)
        #[arg(long, value_enum)]
        context: ContextArg,
        /// Risk label or band hint (plan context defaults to the plan's own band)
        #[arg(long)]
        risk: Option<String>,
    },
    /// Show the plan-tier catalogue, optionally with the tier for a risk label
    Tiers {
        /// Risk label (Conservative, Balanced, Aggressive, Outlier)
        #[arg(long)]
        label: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ContextArg {
    Plan,
    Bucket,
}

impl ContextArg {
    fn as_context(self) -> MatchContext {
        match self {
            ContextArg::Plan => MatchContext::Plan,
            ContextArg::Bucket => MatchContext::Bucket,
        }
    }
}

#[derive(Serialize)]
struct TierListing<'a> {
    tiers: &'a [PlanTier],
    #[serde(skip_serializing_if = "Option::is_none")]
    recommended: Option<TierChoice>,
}

#[derive(Serialize)]
struct TierChoice {
    risk_label: RiskLabel,
    /// Checkout mapping by label
    checkout_tier: &'static str,
    /// Tier reached through the plan key, if the label has one
    #[serde(skip_serializing_if = "Option::is_none")]
    plan_key_tier: Option<&'static str>,
}

pub async fn run(api_url: &str, token: Option<&str>, command: RecommendCommands) -> i32 {
    match command {
        RecommendCommands::PlanKey { label } => plan_key(&label),
        RecommendCommands::Resolve {
            context,
            payload_file,
            risk,
            recommended_id,
        } => {
            let payload: Value = read_json_from_file(&payload_file).unwrap_or_else(|e| {
                exit_error(&e, Some("Provide the JSON returned by the listing endpoint."))
            });
            resolve_payload(
                context.as_context(),
                &payload,
                &risk,
                recommended_id.as_deref(),
            )
        }
        RecommendCommands::Fetch { context, risk } => {
            fetch(api_url, token, context.as_context(), risk.as_deref()).await
        }
        RecommendCommands::Tiers { label } => tiers(label.as_deref()),
    }
}

fn plan_key(label: &str) -> i32 {
    let key = resolve_plan_key(label);
    print_json(&json!({
        "label": label,
        "key": key.map(|k| k.as_str()).unwrap_or(""),
    }))
}

/// Resolve against a listing payload. Buckets are normalized first so that
/// placeholder ids line up with what the bucket list shows.
fn resolve_payload(
    context: MatchContext,
    payload: &Value,
    risk: &str,
    recommended_id: Option<&str>,
) -> i32 {
    let carried = recommended_id_from_payload(payload, context);
    let recommended_id = recommended_id.or(carried.as_deref());

    let report = match context {
        MatchContext::Plan => {
            let candidates = candidates_from_payload(payload, context);
            report_for(&candidates, context, risk, recommended_id)
        }
        MatchContext::Bucket => {
            let candidates = normalize_buckets(payload);
            report_for(&candidates, context, risk, recommended_id)
        }
    };

    match report {
        Some(report) => print_json(&report),
        None => {
            tracing::info!(context = context.as_str(), "no candidates available");
            print_json(&json!({
                "context": context.as_str(),
                "recommendation": null,
            }))
        }
    }
}

fn report_for<C: Candidate + Serialize>(
    candidates: &[C],
    context: MatchContext,
    risk: &str,
    recommended_id: Option<&str>,
) -> Option<SelectionReport> {
    resolve(candidates, context, risk, recommended_id)
        .map(|resolution| SelectionReport::from_resolution(context, &resolution))
}

/// Risk hint carried by a generated plan: final band first, then the quiz label.
fn plan_risk_hint(plan: &Value) -> Option<String> {
    let risk = plan.get("risk")?;
    ["finalBand", "quizLabel"]
        .iter()
        .find_map(|field| risk.get(field)?.as_str().map(str::to_string))
}

async fn fetch(api_url: &str, token: Option<&str>, context: MatchContext, risk: Option<&str>) -> i32 {
    let path = match context {
        MatchContext::Plan => "/plans/my",
        MatchContext::Bucket => "/buckets",
    };
    let body = match get_json(api_url, path, token).await {
        Ok(body) => body,
        Err((code, err)) => {
            print_error(&err);
            return code;
        }
    };

    let payload = match context {
        MatchContext::Plan => body.get("plan").cloned().unwrap_or(body),
        MatchContext::Bucket => body,
    };
    let risk = match (risk, context) {
        (Some(r), _) => r.to_string(),
        (None, MatchContext::Plan) => plan_risk_hint(&payload).unwrap_or_default(),
        (None, MatchContext::Bucket) => String::new(),
    };
    tracing::info!(context = context.as_str(), risk = risk.as_str(), "resolving fetched listing");

    resolve_payload(context, &payload, &risk, None)
}

fn tiers(label: Option<&str>) -> i32 {
    let recommended = match label {
        None => None,
        Some(raw) => {
            let Some(risk_label) = RiskLabel::parse(raw) else {
                let err = ErrorBody::new(codes::INVALID_INPUT, format!("Unknown risk label '{raw}'"))
                    .with_docs_hint("Use Conservative, Balanced, Aggressive or Outlier.");
                print_error(&err);
                return EXIT_CLIENT;
            };
            Some(TierChoice {
                risk_label,
                checkout_tier: tier_for_risk_label(risk_label).id,
                plan_key_tier: resolve_plan_key(risk_label.as_str())
                    .and_then(tier_for_plan_key)
                    .map(|tier| tier.id),
            })
        }
    };

    print_json(&TierListing {
        tiers: plan_tiers(),
        recommended,
    })
}
