use std::collections::HashSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One selectable answer: `[label, value]` on the wire.
/// Lower values are more conservative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption(pub String, pub i64);

impl QuestionOption {
    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> i64 {
        self.1
    }
}

/// A risk questionnaire question. Position in the bank and option order are
/// both significant: persisted results store 1-based positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub name: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// 1-based position of the first option carrying `value`.
    pub fn position_of(&self, value: i64) -> Option<usize> {
        self.options
            .iter()
            .position(|opt| opt.value() == value)
            .map(|idx| idx + 1)
    }

    /// Option at a 1-based position.
    pub fn option_at(&self, position: i64) -> Option<&QuestionOption> {
        if position < 1 {
            return None;
        }
        self.options.get(usize::try_from(position - 1).ok()?)
    }
}

type QuestionSpec = (&'static str, &'static str, &'static [(&'static str, i64)]);

const RISK_QUESTION_SPECS: [QuestionSpec; 12] = [
    (
        "q1",
        "Your present job or business is:",
        &[
            ("Less secure", 0),
            ("Relatively secure", 1),
            ("Secure", 3),
            ("Doesn’t matter as you can easily find a good new job / career", 3),
            ("Doesn’t matter as you already have enough wealth", 4),
        ],
    ),
    (
        "q2",
        "The number of years you have until retirement is:",
        &[
            ("Less than 5 years / Retired / Not applicable", 0),
            ("About 5 - 15 years", 2),
            ("About 15 - 25 years", 4),
            ("More than 25 years", 6),
        ],
    ),
    (
        "q3",
        "If your current source of income were to stop today, for how long will your present savings support you?",
        &[
            ("Less than 3 months", 0),
            ("3 - 6 months", 1),
            ("6 months to 1 year", 2),
            ("More than 1 year", 3),
        ],
    ),
    (
        "q4",
        "You have to financially support:",
        &[
            ("Only myself", 3),
            ("Two people including myself", 2),
            ("3 - 4 people other than myself", 1),
            ("More than 4 people other than myself", 0),
        ],
    ),
    (
        "q5",
        "Your current annual family savings percentage is (income less expenses) are:",
        &[
            ("0-20%", 1),
            ("20-30%", 2),
            ("30-40%", 3),
            ("Above 50%", 4),
        ],
    ),
    (
        "q6",
        "Which of these objectives is the most important to you from an investment perspective?",
        &[
            ("Preserving wealth", 1),
            ("Generating regular income to meet current requirements", 2),
            ("Balance current income and long-term growth", 3),
            ("Long-term growth", 4),
        ],
    ),
    (
        "q7",
        "Which of the following best describes your understanding of the investment market?",
        &[
            (
                "An experienced investor, constantly keeps up to date with the investment market.",
                3,
            ),
            (
                "Awareness of the financial market is limited to information passed on by broker or financial planner.",
                2,
            ),
            (
                "Little awareness of the investment market. However, want to build my knowledge and understanding",
                1,
            ),
        ],
    ),
    (
        "q8",
        "Which is the riskiest option you have invested in?",
        &[
            ("Savings Account, Fixed Deposit", 0),
            ("Bonds or Debt Mutual Funds", 1),
            ("Equity Mutual Funds", 2),
            ("Real Estate Funds / Commodity linked Products", 3),
            ("Equity Shares / Structured Products", 4),
            ("Crypto / Private Equity / Venture Capital Funds", 5),
        ],
    ),
    (
        "q9",
        "Your preferred strategy for managing investment risk is:",
        &[
            (
                "Do not want to reduce it as investment risk leads to higher returns over the long-term.",
                3,
            ),
            (
                "To have a diversified investment portfolio across a range of asset classes to minimise risk.",
                2,
            ),
            ("To invest mainly in Principal stable investments.", 1),
        ],
    ),
    (
        "q10",
        "How would you react to a 20% loss in investment during a volatile market?",
        &[
            (
                "Sell all of my investments. (The preservation of capital is extremely important to me)",
                1,
            ),
            (
                "Sell some of the investment. (I would transfer some funds into more secure investments)",
                2,
            ),
            (
                "Do nothing with the investment. (This was a calculated risk, and I will leave the investments in place)",
                3,
            ),
            (
                "Buy more. (I am a long-term investor and consider this sudden market correction as an opportunity)",
                4,
            ),
        ],
    ),
    (
        "q11",
        "Willingness to experience short-term losses/volatility:",
        &[
            (
                "Very comfortable. I understand higher returns may come with risk or fluctuation in the short term",
                3,
            ),
            ("Somewhat comfortable, assuming there is a limit to the volatility", 2),
            ("Little uncomfortable seeing my investments fluctuate", 1),
            ("Prefer minimal volatility investments", 0),
        ],
    ),
    (
        "q12",
        "How would you describe yourself as a risk-taker?",
        &[
            ("Willing to take risks for higher return", 3),
            ("Can take calculated risks", 2),
            ("Low risk taking capability", 1),
            ("Zero risk taking capability", 0),
        ],
    ),
];

static RISK_QUESTION_BANK: LazyLock<Vec<Question>> = LazyLock::new(|| {
    RISK_QUESTION_SPECS
        .iter()
        .map(|(name, text, options)| Question {
            text: text.to_string(),
            name: name.to_string(),
            options: options
                .iter()
                .map(|(label, value)| QuestionOption(label.to_string(), *value))
                .collect(),
        })
        .collect()
});

/// The fixed 12-question risk bank, in display order.
pub fn risk_question_bank() -> &'static [Question] {
    &RISK_QUESTION_BANK
}

/// Reject banks that cannot be scored unambiguously: blank or duplicate names,
/// or questions without options.
pub fn validate_question_bank(questions: &[Question]) -> Result<(), CoreError> {
    if questions.is_empty() {
        return Err(CoreError::InvalidQuestionBank(
            "bank has no questions".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for (idx, question) in questions.iter().enumerate() {
        let name = question.name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidQuestionBank(format!(
                "question {} has an empty name",
                idx + 1
            )));
        }
        if !seen.insert(name) {
            return Err(CoreError::InvalidQuestionBank(format!(
                "duplicate question name '{name}'"
            )));
        }
        if question.options.is_empty() {
            return Err(CoreError::InvalidQuestionBank(format!(
                "question '{name}' has no options"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_has_twelve_named_questions_in_order() {
        let bank = risk_question_bank();
        assert_eq!(bank.len(), 12);
        for (idx, question) in bank.iter().enumerate() {
            assert_eq!(question.name, format!("q{}", idx + 1));
        }
        assert!(validate_question_bank(bank).is_ok());
    }

    #[test]
    fn minimum_answers_sum_to_conservative_range() {
        let min_total: i64 = risk_question_bank()
            .iter()
            .map(|q| q.options.iter().map(QuestionOption::value).min().unwrap())
            .sum();
        assert_eq!(min_total, 5);
    }

    #[test]
    fn position_of_takes_first_duplicate() {
        let q1 = &risk_question_bank()[0];
        assert_eq!(q1.position_of(3), Some(3));
        assert_eq!(q1.position_of(4), Some(5));
        assert_eq!(q1.position_of(2), None);
    }

    #[test]
    fn option_at_rejects_out_of_range_positions() {
        let q2 = &risk_question_bank()[1];
        assert_eq!(q2.option_at(4).map(QuestionOption::value), Some(6));
        assert!(q2.option_at(0).is_none());
        assert!(q2.option_at(-1).is_none());
        assert!(q2.option_at(5).is_none());
    }

    #[test]
    fn options_deserialize_from_label_value_pairs() {
        let raw = serde_json::json!({
            "text": "Pick one",
            "name": "x1",
            "options": [["Low", 0], ["High", 5]]
        });
        let question: Question = serde_json::from_value(raw).unwrap();
        assert_eq!(question.options[1], QuestionOption("High".to_string(), 5));
    }

    #[test]
    fn validate_rejects_duplicate_and_empty_names() {
        let mut bank = risk_question_bank().to_vec();
        bank[3].name = "q1".to_string();
        assert!(matches!(
            validate_question_bank(&bank),
            Err(CoreError::InvalidQuestionBank(msg)) if msg.contains("duplicate")
        ));

        bank[3].name = "  ".to_string();
        assert!(validate_question_bank(&bank).is_err());
        assert!(validate_question_bank(&[]).is_err());
    }

    #[test]
    fn validate_rejects_question_without_options() {
        let mut bank = risk_question_bank().to_vec();
        bank[5].options.clear();
        assert!(validate_question_bank(&bank).is_err());
    }
}
