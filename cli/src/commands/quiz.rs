use clap::Subcommand;
use serde::Serialize;
use wealthpath_core::error::ErrorBody;
use wealthpath_core::questions::Question;
use wealthpath_core::risk::{
    AnswerSet, RiskQuizResult, SubmissionMode, missing_answers, reconstruct_answers, submit,
};

use crate::util::{EXIT_CLIENT, exit_error, print_error, print_json, read_json_from_file};

#[derive(Subcommand)]
pub enum QuizCommands {
    /// Score an answer set (question name -> option value)
    Score {
        /// Answers JSON, e.g. {"q1": 3, "q2": "4"} (use '-' for stdin)
        #[arg(long)]
        answers_file: String,
        /// Editing an existing profile: skip the completeness gate
        #[arg(long)]
        edit: bool,
        /// Previously saved result used to fill unanswered questions (edit only)
        #[arg(long, requires = "edit")]
        prior_file: Option<String>,
    },
    /// Report which questions are still unanswered
    Check {
        /// Answers JSON (use '-' for stdin)
        #[arg(long)]
        answers_file: String,
    },
    /// Rebuild the answer set from a saved result
    Restore {
        /// Saved risk quiz result JSON (use '-' for stdin)
        #[arg(long)]
        result_file: String,
    },
}

#[derive(Serialize)]
struct CompletenessReport<'a> {
    complete: bool,
    answered: usize,
    total: usize,
    missing: Vec<&'a str>,
}

pub fn run(questions: &[Question], command: QuizCommands) -> i32 {
    match command {
        QuizCommands::Score {
            answers_file,
            edit,
            prior_file,
        } => score(questions, &answers_file, edit, prior_file.as_deref()),
        QuizCommands::Check { answers_file } => check(questions, &answers_file),
        QuizCommands::Restore { result_file } => restore(questions, &result_file),
    }
}

fn load_answers(path: &str) -> AnswerSet {
    read_json_from_file(path).unwrap_or_else(|e| {
        exit_error(
            &e,
            Some("Answers are a JSON object mapping question names to option values."),
        )
    })
}

fn load_result(path: &str) -> RiskQuizResult {
    read_json_from_file(path).unwrap_or_else(|e| {
        exit_error(
            &e,
            Some("Expected a saved result: {\"totalScore\", \"riskLabel\", \"answers\"}."),
        )
    })
}

fn score(questions: &[Question], answers_file: &str, edit: bool, prior_file: Option<&str>) -> i32 {
    let answers = load_answers(answers_file);
    let prior = prior_file.map(load_result);
    let mode = if edit {
        SubmissionMode::Edit
    } else {
        SubmissionMode::Onboarding
    };

    match submit(&answers, questions, mode, prior.as_ref()) {
        Ok(result) => {
            tracing::info!(
                total_score = result.total_score,
                risk_label = result.risk_label.as_str(),
                "risk quiz scored"
            );
            print_json(&result)
        }
        Err(err) => {
            print_error(&ErrorBody::from(&err));
            EXIT_CLIENT
        }
    }
}

fn check(questions: &[Question], answers_file: &str) -> i32 {
    let answers = load_answers(answers_file);
    let missing = missing_answers(&answers, questions);
    let report = CompletenessReport {
        complete: missing.is_empty(),
        answered: questions.len() - missing.len(),
        total: questions.len(),
        missing,
    };

    let code = print_json(&report);
    if report.complete { code } else { EXIT_CLIENT }
}

fn restore(questions: &[Question], result_file: &str) -> i32 {
    let result = load_result(result_file);
    print_json(&reconstruct_answers(&result, questions))
}
