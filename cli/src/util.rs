use std::io::Read;

use serde::Serialize;
use serde_json::json;
use wealthpath_core::error::{ErrorBody, codes};
use wealthpath_core::questions::{Question, risk_question_bank, validate_question_bank};

/// Exit codes: 0=success, 1=domain or client error (4xx), 2=server error (5xx),
/// 3=connection error, 4=usage error
pub const EXIT_OK: i32 = 0;
pub const EXIT_CLIENT: i32 = 1;
pub const EXIT_SERVER: i32 = 2;
pub const EXIT_CONNECTION: i32 = 3;
pub const EXIT_USAGE: i32 = 4;

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

pub fn print_error(body: &ErrorBody) {
    let formatted = serde_json::to_string_pretty(body)
        .unwrap_or_else(|_| json!({"error": body.error, "message": body.message}).to_string());
    eprintln!("{formatted}");
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut body = ErrorBody::new("cli_error", message);
    if let Some(hint) = docs_hint {
        body = body.with_docs_hint(hint);
    }
    print_error(&body);
    std::process::exit(EXIT_USAGE);
}

/// Print a value as pretty JSON on stdout and return the matching exit code.
pub fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(formatted) => {
            println!("{formatted}");
            EXIT_OK
        }
        Err(e) => {
            print_error(&ErrorBody::new(
                codes::INVALID_INPUT,
                format!("Failed to serialize output: {e}"),
            ));
            EXIT_USAGE
        }
    }
}

/// Read raw text from a file path or stdin (when path is "-").
pub fn read_text(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read file '{path}': {e}"))
    }
}

/// Read and decode JSON from a file path or stdin (when path is "-").
pub fn read_json_from_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let raw = read_text(path)?;
    serde_json::from_str(&raw).map_err(|e| format!("Invalid JSON in '{path}': {e}"))
}

/// The built-in bank, or a validated override file.
pub fn load_questions(path: Option<&str>) -> Result<Vec<Question>, String> {
    let Some(path) = path else {
        return Ok(risk_question_bank().to_vec());
    };
    let questions: Vec<Question> = read_json_from_file(path)?;
    validate_question_bank(&questions).map_err(|e| e.to_string())?;
    tracing::info!(path, count = questions.len(), "loaded question bank override");
    Ok(questions)
}

/// Map an HTTP status to the CLI exit code.
pub fn exit_code_for_status(status: u16) -> i32 {
    match status {
        200..=299 => EXIT_OK,
        400..=499 => EXIT_CLIENT,
        _ => EXIT_SERVER,
    }
}

/// Authenticated GET returning status and JSON body.
/// Errors carry the exit code to use.
pub async fn get_json(
    api_url: &str,
    path: &str,
    token: Option<&str>,
) -> Result<serde_json::Value, (i32, ErrorBody)> {
    let url = reqwest::Url::parse(&format!("{api_url}{path}")).map_err(|e| {
        (
            EXIT_USAGE,
            ErrorBody::new(
                codes::INVALID_INPUT,
                format!("Invalid URL: {api_url}{path}: {e}"),
            ),
        )
    })?;

    let mut req = client().get(url);
    if let Some(t) = token {
        req = req.header("Authorization", format!("Bearer {t}"));
    }

    let resp = req.send().await.map_err(|e| {
        (
            EXIT_CONNECTION,
            ErrorBody::new(codes::CONNECTION_ERROR, format!("{e}"))
                .with_docs_hint("Is the API server running? Check WEALTHPATH_API_URL."),
        )
    })?;

    let status = resp.status().as_u16();
    let body: serde_json::Value = resp
        .json()
        .await
        .unwrap_or(json!({"error": "non-json response"}));

    let exit_code = exit_code_for_status(status);
    if exit_code != EXIT_OK {
        tracing::warn!(status, path, "listing request failed");
        let mut err = ErrorBody::new(codes::API_ERROR, api_error_message(status, &body));
        err.received = Some(body);
        return Err((exit_code, err));
    }
    Ok(body)
}

/// The backend reports failures as `{"detail": ...}`.
fn api_error_message(status: u16, body: &serde_json::Value) -> String {
    match body.get("detail").and_then(|d| d.as_str()) {
        Some(detail) => format!("API {status}: {detail}"),
        None => format!("API {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_exit_codes() {
        assert_eq!(exit_code_for_status(200), EXIT_OK);
        assert_eq!(exit_code_for_status(204), EXIT_OK);
        assert_eq!(exit_code_for_status(404), EXIT_CLIENT);
        assert_eq!(exit_code_for_status(503), EXIT_SERVER);
    }

    #[test]
    fn api_error_message_uses_detail_when_present() {
        assert_eq!(
            api_error_message(404, &json!({"detail": "Your plan is not available yet."})),
            "API 404: Your plan is not available yet."
        );
        assert_eq!(api_error_message(500, &json!({"error": "boom"})), "API 500");
    }

    #[test]
    fn default_question_bank_needs_no_file() {
        let questions = load_questions(None).unwrap();
        assert_eq!(questions.len(), 12);
    }

    #[test]
    fn missing_override_file_is_reported() {
        let err = load_questions(Some("/nonexistent/wealthpath/questions.json")).unwrap_err();
        assert!(err.contains("Failed to read file"));
    }
}
