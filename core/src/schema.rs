use utoipa::OpenApi;

/// JSON shapes the core hands to UI callers.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "WealthPath recommendation core",
        version = "0.1.0",
        description = "Risk quiz results and recommended plan/bucket selections."
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::risk::RiskLabel,
        crate::risk::RiskQuizResult,
        crate::recommend::PlanKey,
        crate::recommend::MatchContext,
        crate::recommend::ResolveRule,
        crate::recommend::CandidateSummary,
        crate::recommend::SelectionReport,
    ))
)]
pub struct CoreSchemas;

pub fn schema_json() -> Result<String, serde_json::Error> {
    CoreSchemas::openapi().to_pretty_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_emitted_shapes() {
        let doc: serde_json::Value = serde_json::from_str(&schema_json().unwrap()).unwrap();
        let schemas = &doc["components"]["schemas"];
        for name in ["RiskQuizResult", "RiskLabel", "SelectionReport", "ErrorBody"] {
            assert!(schemas.get(name).is_some(), "missing {name}");
        }
        assert!(schemas["RiskQuizResult"]["properties"].get("totalScore").is_some());
    }
}
