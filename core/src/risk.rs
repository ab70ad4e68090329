use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::CoreError;
use crate::questions::Question;

pub const CONSERVATIVE_MAX_SCORE: i64 = 10;
pub const BALANCED_MAX_SCORE: i64 = 20;
pub const AGGRESSIVE_MAX_SCORE: i64 = 60;

/// Coarse risk classification derived from the quiz total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RiskLabel {
    Conservative,
    Balanced,
    Aggressive,
    Outlier,
}

impl RiskLabel {
    /// Breakpoints are inclusive upper bounds, checked in ascending order.
    pub fn from_score(total_score: i64) -> Self {
        if total_score <= CONSERVATIVE_MAX_SCORE {
            RiskLabel::Conservative
        } else if total_score <= BALANCED_MAX_SCORE {
            RiskLabel::Balanced
        } else if total_score <= AGGRESSIVE_MAX_SCORE {
            RiskLabel::Aggressive
        } else {
            RiskLabel::Outlier
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLabel::Conservative => "Conservative",
            RiskLabel::Balanced => "Balanced",
            RiskLabel::Aggressive => "Aggressive",
            RiskLabel::Outlier => "Outlier",
        }
    }

    /// Case-insensitive label name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "conservative" => Some(RiskLabel::Conservative),
            "balanced" => Some(RiskLabel::Balanced),
            "aggressive" => Some(RiskLabel::Aggressive),
            "outlier" => Some(RiskLabel::Outlier),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw answer as stored by the quiz UI: radio values arrive as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAnswer {
    Number(i64),
    Text(String),
    Null(()),
    Other(serde_json::Value),
}

/// Chosen option value per question name. Unanswered questions are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerSet(BTreeMap<String, i64>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: impl Into<String>, value: i64) {
        self.0.insert(question.into(), value);
    }

    pub fn get(&self, question: &str) -> Option<i64> {
        self.0.get(question).copied()
    }

    pub fn contains(&self, question: &str) -> bool {
        self.0.contains_key(question)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for AnswerSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = BTreeMap::<String, RawAnswer>::deserialize(deserializer)?;
        AnswerSet::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

impl AnswerSet {
    fn from_raw(raw: BTreeMap<String, RawAnswer>) -> Result<Self, CoreError> {
        let mut answers = AnswerSet::new();
        for (question, value) in raw {
            match value {
                RawAnswer::Number(v) => answers.insert(question, v),
                RawAnswer::Text(text) => {
                    let trimmed = text.trim();
                    // Blank radio state means the question was never answered.
                    if trimmed.is_empty() {
                        continue;
                    }
                    let v = trimmed
                        .parse::<i64>()
                        .map_err(|_| CoreError::InvalidAnswerValue {
                            question: question.clone(),
                            received: text.clone(),
                        })?;
                    answers.insert(question, v);
                }
                RawAnswer::Null(()) => {}
                RawAnswer::Other(value) => {
                    return Err(CoreError::InvalidAnswerValue {
                        question,
                        received: value.to_string(),
                    });
                }
            }
        }
        Ok(answers)
    }
}

impl FromIterator<(String, i64)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of one quiz submission. Always recomputed in full, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskQuizResult {
    /// Sum of the chosen option values; unanswered questions count 0
    pub total_score: i64,
    pub risk_label: RiskLabel,
    /// 1-based question position (as string) -> 1-based option position, or null
    pub answers: BTreeMap<String, Option<i64>>,
}

/// Whether the quiz is submitted from first-time onboarding or from profile editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    Onboarding,
    Edit,
}

/// Score an answer set against the bank. Total over any input.
pub fn score(answers: &AnswerSet, questions: &[Question]) -> RiskQuizResult {
    let mut total_score = 0i64;
    let mut positions = BTreeMap::new();

    for (idx, question) in questions.iter().enumerate() {
        let selected = answers.get(&question.name);
        total_score = total_score.saturating_add(selected.unwrap_or(0));

        let position = selected
            .and_then(|value| question.position_of(value))
            .and_then(|pos| i64::try_from(pos).ok());
        positions.insert((idx + 1).to_string(), position);
    }

    let risk_label = RiskLabel::from_score(total_score);
    tracing::debug!(total_score, risk_label = risk_label.as_str(), "scored risk quiz");

    RiskQuizResult {
        total_score,
        risk_label,
        answers: positions,
    }
}

/// Names of unanswered questions, in bank order.
pub fn missing_answers<'q>(answers: &AnswerSet, questions: &'q [Question]) -> Vec<&'q str> {
    questions
        .iter()
        .filter(|q| !answers.contains(&q.name))
        .map(|q| q.name.as_str())
        .collect()
}

/// Completeness gate for first-time onboarding.
pub fn validate_complete(answers: &AnswerSet, questions: &[Question]) -> bool {
    missing_answers(answers, questions).is_empty()
}

/// Rebuild the working answer set from a persisted result.
/// Missing, zero, negative or out-of-range positions leave the question unanswered.
pub fn reconstruct_answers(result: &RiskQuizResult, questions: &[Question]) -> AnswerSet {
    let mut answers = AnswerSet::new();
    for (idx, question) in questions.iter().enumerate() {
        let Some(Some(position)) = result.answers.get(&(idx + 1).to_string()) else {
            continue;
        };
        if let Some(option) = question.option_at(*position) {
            answers.insert(question.name.clone(), option.value());
        }
    }
    answers
}

/// Submit the quiz. Onboarding requires every question; editing fills gaps from
/// the prior result and never blocks.
pub fn submit(
    answers: &AnswerSet,
    questions: &[Question],
    mode: SubmissionMode,
    prior: Option<&RiskQuizResult>,
) -> Result<RiskQuizResult, CoreError> {
    match mode {
        SubmissionMode::Onboarding => {
            let missing = missing_answers(answers, questions);
            if !missing.is_empty() {
                return Err(CoreError::IncompleteQuiz {
                    missing: missing.into_iter().map(str::to_string).collect(),
                });
            }
            Ok(score(answers, questions))
        }
        SubmissionMode::Edit => {
            let Some(prior) = prior else {
                return Ok(score(answers, questions));
            };
            let mut merged = reconstruct_answers(prior, questions);
            for (question, value) in &answers.0 {
                merged.insert(question.clone(), *value);
            }
            Ok(score(&merged, questions))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::questions::{QuestionOption, risk_question_bank};

    fn answer_all(pick: impl Fn(&Question) -> i64) -> AnswerSet {
        risk_question_bank()
            .iter()
            .map(|q| (q.name.clone(), pick(q)))
            .collect()
    }

    fn min_value(q: &Question) -> i64 {
        q.options.iter().map(QuestionOption::value).min().unwrap()
    }

    fn max_value(q: &Question) -> i64 {
        q.options.iter().map(QuestionOption::value).max().unwrap()
    }

    /// Single open-ended question, so any total can be hit exactly.
    fn one_question_bank(values: &[i64]) -> Vec<Question> {
        vec![Question {
            text: "How much?".to_string(),
            name: "amount".to_string(),
            options: values
                .iter()
                .map(|v| QuestionOption(format!("{v}"), *v))
                .collect(),
        }]
    }

    #[test]
    fn breakpoints_are_inclusive_upper_bounds() {
        assert_eq!(RiskLabel::from_score(0), RiskLabel::Conservative);
        assert_eq!(RiskLabel::from_score(10), RiskLabel::Conservative);
        assert_eq!(RiskLabel::from_score(11), RiskLabel::Balanced);
        assert_eq!(RiskLabel::from_score(20), RiskLabel::Balanced);
        assert_eq!(RiskLabel::from_score(21), RiskLabel::Aggressive);
        assert_eq!(RiskLabel::from_score(60), RiskLabel::Aggressive);
        assert_eq!(RiskLabel::from_score(61), RiskLabel::Outlier);
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(RiskLabel::parse(" balanced "), Some(RiskLabel::Balanced));
        assert_eq!(RiskLabel::parse("OUTLIER"), Some(RiskLabel::Outlier));
        assert_eq!(RiskLabel::parse("moderate"), None);
        assert_eq!(RiskLabel::Aggressive.to_string(), "Aggressive");
    }

    #[test]
    fn score_labels_boundary_totals() {
        let bank = one_question_bank(&[10, 11, 20, 21, 60, 61]);
        let cases = [
            (10, RiskLabel::Conservative),
            (11, RiskLabel::Balanced),
            (20, RiskLabel::Balanced),
            (21, RiskLabel::Aggressive),
            (60, RiskLabel::Aggressive),
            (61, RiskLabel::Outlier),
        ];
        for (value, label) in cases {
            let answers: AnswerSet = [("amount".to_string(), value)].into_iter().collect();
            let result = score(&answers, &bank);
            assert_eq!(result.total_score, value);
            assert_eq!(result.risk_label, label, "total {value}");
        }
    }

    #[test]
    fn minimum_answers_are_conservative() {
        let result = score(&answer_all(min_value), risk_question_bank());
        assert_eq!(result.risk_label, RiskLabel::Conservative);
        assert_eq!(result.total_score, 5);
        assert_eq!(result.answers.len(), 12);
        assert!(result.answers.values().all(Option::is_some));
    }

    #[test]
    fn maximum_answers_are_aggressive() {
        let result = score(&answer_all(max_value), risk_question_bank());
        assert_eq!(result.total_score, 45);
        assert_eq!(result.risk_label, RiskLabel::Aggressive);
    }

    #[test]
    fn total_is_sum_of_selected_values_with_missing_as_zero() {
        let mut answers = AnswerSet::new();
        answers.insert("q2", 6);
        answers.insert("q8", 5);
        answers.insert("q10", 4);

        let result = score(&answers, risk_question_bank());
        assert_eq!(result.total_score, 15);
        assert_eq!(result.risk_label, RiskLabel::Balanced);
        assert_eq!(result.answers.len(), 12);
        assert_eq!(result.answers["2"], Some(4));
        assert_eq!(result.answers["8"], Some(6));
        assert_eq!(result.answers["10"], Some(4));
        assert_eq!(result.answers["1"], None);
        assert_eq!(result.answers["12"], None);
    }

    #[test]
    fn unmatched_value_still_scores_but_has_no_position() {
        let mut answers = AnswerSet::new();
        answers.insert("q1", 2);

        let result = score(&answers, risk_question_bank());
        assert_eq!(result.total_score, 2);
        assert_eq!(result.answers["1"], None);
    }

    #[test]
    fn duplicate_values_resolve_to_first_option() {
        let mut answers = AnswerSet::new();
        answers.insert("q1", 3);

        let result = score(&answers, risk_question_bank());
        assert_eq!(result.answers["1"], Some(3));
    }

    #[test]
    fn empty_answers_score_zero_with_all_positions_null() {
        let result = score(&AnswerSet::new(), risk_question_bank());
        assert_eq!(result.total_score, 0);
        assert_eq!(result.risk_label, RiskLabel::Conservative);
        assert_eq!(result.answers.len(), 12);
        assert!(result.answers.values().all(Option::is_none));
    }

    #[test]
    fn completeness_gate_reports_missing_in_bank_order() {
        let bank = risk_question_bank();
        let mut answers = answer_all(min_value);
        assert!(validate_complete(&answers, bank));

        answers.0.remove("q9");
        answers.0.remove("q3");
        assert!(!validate_complete(&answers, bank));
        assert_eq!(missing_answers(&answers, bank), vec!["q3", "q9"]);
    }

    #[test]
    fn zero_value_answer_counts_as_answered() {
        let bank = risk_question_bank();
        let answers = answer_all(|_| 0);
        assert!(validate_complete(&answers, bank));
    }

    #[test]
    fn reconstruct_inverts_score() {
        let bank = risk_question_bank();
        let answers = answer_all(max_value);
        let first = score(&answers, bank);

        let restored = reconstruct_answers(&first, bank);
        assert_eq!(restored, answers);
        assert_eq!(score(&restored, bank), first);
    }

    #[test]
    fn round_trip_is_stable_for_partial_and_duplicate_answers() {
        let bank = risk_question_bank();
        let mut answers = AnswerSet::new();
        answers.insert("q1", 3);
        answers.insert("q4", 0);
        answers.insert("q7", 2);
        answers.insert("q12", 3);

        let first = score(&answers, bank);
        let second = score(&reconstruct_answers(&first, bank), bank);
        assert_eq!(first, second);
    }

    #[test]
    fn reconstruct_skips_null_zero_and_out_of_range_positions() {
        let bank = risk_question_bank();
        let result: RiskQuizResult = serde_json::from_value(json!({
            "totalScore": 9,
            "riskLabel": "Conservative",
            "answers": {
                "1": null,
                "2": 0,
                "3": 9,
                "4": -2,
                "5": 4,
                "6": 1
            }
        }))
        .unwrap();

        let restored = reconstruct_answers(&result, bank);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get("q5"), Some(4));
        assert_eq!(restored.get("q6"), Some(1));
        assert!(!restored.contains("q3"));
    }

    #[test]
    fn answer_set_accepts_numeric_strings_and_blanks() {
        let answers: AnswerSet = serde_json::from_value(json!({
            "q1": "3",
            "q2": 4,
            "q3": "",
            "q4": null
        }))
        .unwrap();

        assert_eq!(answers.get("q1"), Some(3));
        assert_eq!(answers.get("q2"), Some(4));
        assert!(!answers.contains("q3"));
        assert!(!answers.contains("q4"));
    }

    #[test]
    fn answer_set_rejects_non_numeric_strings() {
        let err = serde_json::from_value::<AnswerSet>(json!({"q1": "lots"})).unwrap_err();
        assert!(err.to_string().contains("q1"));
    }

    #[test]
    fn answer_set_rejects_floats_and_out_of_range_numbers() {
        let err = serde_json::from_str::<AnswerSet>(r#"{"q1": 3.0}"#).unwrap_err();
        assert!(err.to_string().contains("answer for 'q1' is not an integer: 3.0"));

        let err =
            serde_json::from_str::<AnswerSet>(r#"{"q2": 18446744073709551615}"#).unwrap_err();
        assert!(err.to_string().contains("answer for 'q2' is not an integer"));

        let err = serde_json::from_value::<AnswerSet>(json!({"q3": true})).unwrap_err();
        assert!(err.to_string().contains("'q3'"));
    }

    #[test]
    fn huge_answer_values_saturate_instead_of_overflowing() {
        let mut answers = AnswerSet::new();
        answers.insert("q1", i64::MAX);
        answers.insert("q2", 6);

        let result = score(&answers, risk_question_bank());
        assert_eq!(result.total_score, i64::MAX);
        assert_eq!(result.risk_label, RiskLabel::Outlier);
        assert_eq!(result.answers["1"], None);
        assert_eq!(result.answers["2"], Some(4));
    }

    #[test]
    fn result_serializes_in_persisted_shape() {
        let mut answers = AnswerSet::new();
        answers.insert("q2", 2);
        let result = score(&answers, risk_question_bank());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["totalScore"], json!(2));
        assert_eq!(value["riskLabel"], json!("Conservative"));
        assert_eq!(value["answers"]["2"], json!(2));
        assert_eq!(value["answers"]["1"], json!(null));
    }

    #[test]
    fn onboarding_submission_requires_every_answer() {
        let bank = risk_question_bank();
        let mut answers = answer_all(min_value);
        answers.0.remove("q11");

        let err = submit(&answers, bank, SubmissionMode::Onboarding, None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::IncompleteQuiz { ref missing } if missing == &vec!["q11".to_string()]
        ));
    }

    #[test]
    fn edit_submission_fills_gaps_from_prior_result() {
        let bank = risk_question_bank();
        let prior = score(&answer_all(max_value), bank);

        let mut changed = AnswerSet::new();
        changed.insert("q2", 0);

        let result = submit(&changed, bank, SubmissionMode::Edit, Some(&prior)).unwrap();
        assert_eq!(result.total_score, prior.total_score - 6);
        assert_eq!(result.answers["2"], Some(1));
        assert_eq!(result.answers["8"], prior.answers["8"]);
    }

    #[test]
    fn edit_submission_without_prior_scores_what_is_there() {
        let bank = risk_question_bank();
        let mut answers = AnswerSet::new();
        answers.insert("q6", 4);

        let result = submit(&answers, bank, SubmissionMode::Edit, None).unwrap();
        assert_eq!(result.total_score, 4);
    }
}
