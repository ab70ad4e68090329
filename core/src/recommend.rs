use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Canonical plan keys that risk labels and bands collapse into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PlanKey {
    Safety,
    Balanced,
    Growth,
}

impl PlanKey {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanKey::Safety => "safety",
            PlanKey::Balanced => "balanced",
            PlanKey::Growth => "growth",
        }
    }

    /// Exact canonical name, after normalization.
    pub fn parse(value: &str) -> Option<Self> {
        match normalize(value).as_str() {
            "safety" => Some(PlanKey::Safety),
            "balanced" => Some(PlanKey::Balanced),
            "growth" => Some(PlanKey::Growth),
            _ => None,
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        PLAN_KEY_ALIASES
            .iter()
            .find(|(key, _)| *key == self)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }
}

/// Substrings treated as equivalent to each canonical key, in lookup order.
pub const PLAN_KEY_ALIASES: [(PlanKey, &[&str]); 3] = [
    (PlanKey::Safety, &["safety", "low", "conservative"]),
    (PlanKey::Balanced, &["balanced", "moderate"]),
    (PlanKey::Growth, &["growth", "high", "aggressive"]),
];

const ID_FIELDS: [&str; 4] = ["id", "bucketId", "key", "slug"];
const NAME_FIELDS: [&str; 2] = ["name", "title"];
const RISK_BAND_FIELDS: [&str; 2] = ["riskBand", "risk_band"];
const RECOMMENDED_FLAG_FIELDS: [&str; 4] = [
    "isRecommended",
    "recommended",
    "is_recommended",
    "recommendedBucket",
];
const ALLOCATION_FIELDS: [&str; 3] = ["allocation", "weights", "weight"];

pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Read-only view over a plan or bucket, whatever shape the source gave it.
/// Absent fields are `None`/`false` and simply never match.
pub trait Candidate {
    fn id(&self) -> Option<String>;

    fn name(&self) -> Option<String>;

    fn risk_band(&self) -> Option<String>;

    fn is_flagged_recommended(&self) -> bool;

    /// Every identifier the candidate answers to. Recommended-id lookups
    /// match any of them, not only the display id.
    fn ids(&self) -> Vec<String> {
        self.id().into_iter().collect()
    }

    fn allocation(&self) -> Option<Value> {
        None
    }
}

fn all_texts(value: &Value, fields: &[&str]) -> Vec<String> {
    fields
        .iter()
        .filter_map(|field| match value.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

fn first_text(value: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match value.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

impl Candidate for Value {
    fn id(&self) -> Option<String> {
        first_text(self, &ID_FIELDS)
    }

    fn ids(&self) -> Vec<String> {
        all_texts(self, &ID_FIELDS)
    }

    fn name(&self) -> Option<String> {
        first_text(self, &NAME_FIELDS)
    }

    fn risk_band(&self) -> Option<String> {
        RISK_BAND_FIELDS
            .iter()
            .find_map(|field| self.get(field)?.as_str().map(str::to_string))
    }

    fn is_flagged_recommended(&self) -> bool {
        RECOMMENDED_FLAG_FIELDS
            .iter()
            .any(|field| self.get(field).and_then(Value::as_bool) == Some(true))
    }

    fn allocation(&self) -> Option<Value> {
        ALLOCATION_FIELDS
            .iter()
            .find_map(|field| self.get(field).filter(|v| !v.is_null()).cloned())
    }
}

/// Which resolution chain to run. Only plans use fuzzy key/alias matching;
/// buckets rely on explicit flags, ids and exact risk bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchContext {
    Plan,
    Bucket,
}

impl MatchContext {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchContext::Plan => "plan",
            MatchContext::Bucket => "bucket",
        }
    }

    fn list_field(self) -> &'static str {
        match self {
            MatchContext::Plan => "plans",
            MatchContext::Bucket => "buckets",
        }
    }

    fn recommended_id_fields(self) -> [&'static str; 2] {
        match self {
            MatchContext::Plan => ["recommendedPlanId", "recommended_plan_id"],
            MatchContext::Bucket => ["recommendedBucketId", "recommended_bucket_id"],
        }
    }
}

/// The fallback-chain step that produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResolveRule {
    ExplicitFlag,
    RecommendedId,
    RiskBand,
    KeyAlias,
    FirstCandidate,
}

impl ResolveRule {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolveRule::ExplicitFlag => "explicit_flag",
            ResolveRule::RecommendedId => "recommended_id",
            ResolveRule::RiskBand => "risk_band",
            ResolveRule::KeyAlias => "key_alias",
            ResolveRule::FirstCandidate => "first_candidate",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a, C> {
    pub candidate: &'a C,
    /// Position in the original candidate list
    pub index: usize,
    pub rule: ResolveRule,
}

/// Collapse a risk label or band into a canonical plan key.
/// `None` means no strong preference (e.g. "Outlier").
pub fn resolve_plan_key(label: &str) -> Option<PlanKey> {
    let normalized = normalize(label);
    PLAN_KEY_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| normalized.contains(alias)))
        .map(|(key, _)| *key)
}

fn key_aliases(key: &str) -> Vec<String> {
    match PlanKey::parse(key) {
        Some(plan_key) => plan_key.aliases().iter().map(|a| a.to_string()).collect(),
        None => vec![normalize(key)],
    }
}

/// True when any alias of `key` is a substring of the candidate's normalized id
/// or name. The empty key never matches.
pub fn candidate_matches_key<C: Candidate + ?Sized>(candidate: &C, key: &str) -> bool {
    if normalize(key).is_empty() {
        return false;
    }
    let id = candidate.id().map(|v| normalize(&v)).unwrap_or_default();
    let name = candidate.name().map(|v| normalize(&v)).unwrap_or_default();

    key_aliases(key)
        .iter()
        .any(|alias| id.contains(alias.as_str()) || name.contains(alias.as_str()))
}

/// Pick the recommended candidate. First success wins:
/// explicit flag, caller-supplied id, exact risk band, (plans only) key alias,
/// then the first candidate. An empty list yields `None`.
pub fn resolve<'a, C: Candidate>(
    candidates: &'a [C],
    context: MatchContext,
    risk_hint: &str,
    recommended_id: Option<&str>,
) -> Option<Resolution<'a, C>> {
    let found = find_by_rule(candidates, context, risk_hint, recommended_id);
    match &found {
        Some(resolution) => tracing::debug!(
            context = context.as_str(),
            rule = resolution.rule.as_str(),
            index = resolution.index,
            "resolved recommended candidate"
        ),
        None => tracing::debug!(context = context.as_str(), "no candidates to recommend"),
    }
    found
}

fn find_by_rule<'a, C: Candidate>(
    candidates: &'a [C],
    context: MatchContext,
    risk_hint: &str,
    recommended_id: Option<&str>,
) -> Option<Resolution<'a, C>> {
    let pick = |rule: ResolveRule, matches: &dyn Fn(&C) -> bool| {
        candidates
            .iter()
            .enumerate()
            .find(|(_, c)| matches(*c))
            .map(|(index, candidate)| Resolution {
                candidate,
                index,
                rule,
            })
    };

    if let Some(found) = pick(ResolveRule::ExplicitFlag, &|c: &C| c.is_flagged_recommended()) {
        return Some(found);
    }

    if let Some(wanted) = recommended_id.filter(|id| !id.is_empty()) {
        if let Some(found) = pick(ResolveRule::RecommendedId, &|c: &C| {
            c.ids().iter().any(|id| id == wanted)
        }) {
            return Some(found);
        }
    }

    if !risk_hint.is_empty() {
        if let Some(found) = pick(ResolveRule::RiskBand, &|c: &C| {
            c.risk_band().as_deref() == Some(risk_hint)
        }) {
            return Some(found);
        }
    }

    // TODO: confirm with product whether buckets should also take the alias path.
    if context == MatchContext::Plan {
        if let Some(key) = resolve_plan_key(risk_hint) {
            if let Some(found) = pick(ResolveRule::KeyAlias, &|c: &C| {
                candidate_matches_key(c, key.as_str())
            }) {
                return Some(found);
            }
        }
    }

    candidates.first().map(|candidate| Resolution {
        candidate,
        index: 0,
        rule: ResolveRule::FirstCandidate,
    })
}

pub fn resolve_plan<'a, C: Candidate>(
    candidates: &'a [C],
    risk_hint: &str,
    recommended_id: Option<&str>,
) -> Option<&'a C> {
    resolve(candidates, MatchContext::Plan, risk_hint, recommended_id).map(|r| r.candidate)
}

pub fn resolve_bucket<'a, C: Candidate>(
    candidates: &'a [C],
    risk_hint: &str,
    recommended_id: Option<&str>,
) -> Option<&'a C> {
    resolve(candidates, MatchContext::Bucket, risk_hint, recommended_id).map(|r| r.candidate)
}

/// Candidate list from a listing payload: a bare array, or an object carrying
/// `plans` / `buckets`. Anything else is an empty list.
pub fn candidates_from_payload(payload: &Value, context: MatchContext) -> Vec<Value> {
    let list = match payload {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get(context.list_field()).and_then(Value::as_array),
        _ => None,
    };
    list.map(|items| items.iter().filter(|v| v.is_object()).cloned().collect())
        .unwrap_or_default()
}

/// Server-side recommended id carried alongside the list, if any.
pub fn recommended_id_from_payload(payload: &Value, context: MatchContext) -> Option<String> {
    first_text(payload, &context.recommended_id_fields())
}

/// Serializable snapshot of the fields the resolver looks at.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_band: Option<String>,
    pub recommended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Value>,
}

impl CandidateSummary {
    pub fn of<C: Candidate + ?Sized>(candidate: &C) -> Self {
        Self {
            id: candidate.id(),
            name: candidate.name(),
            risk_band: candidate.risk_band(),
            recommended: candidate.is_flagged_recommended(),
            allocation: candidate.allocation(),
        }
    }
}

/// Resolver output as emitted to callers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SelectionReport {
    pub context: MatchContext,
    pub rule: ResolveRule,
    pub index: usize,
    pub summary: CandidateSummary,
    pub candidate: Value,
}

impl SelectionReport {
    pub fn from_resolution<C: Candidate + Serialize>(
        context: MatchContext,
        resolution: &Resolution<'_, C>,
    ) -> Self {
        Self {
            context,
            rule: resolution.rule,
            index: resolution.index,
            summary: CandidateSummary::of(resolution.candidate),
            candidate: serde_json::to_value(resolution.candidate).unwrap_or(Value::Null),
        }
    }
}
