use libmapmark_core::MapError;
use libmapmark_sync::SyncNotice;
use serde::Serialize;
use crate::cli::Cli;

/// JSON response envelope
#[derive(Serialize)]
pub struct JsonResponse<T: Serialize> {
    pub schema_version: u32,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

#[derive(Serialize)]
pub struct JsonError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

/// Output a successful result (JSON mode only; human text goes through `print_human`)
pub fn output_success<T: Serialize>(cli: &Cli, data: T) {
    if cli.json {
        let response = JsonResponse {
            schema_version: 1,
            ok: true,
            data: Some(data),
            error: None,
        };
        print_json(&response, false);
    }
}

/// Output an error
pub fn output_error(cli: &Cli, err: &MapError) {
    if cli.json {
        let suggestions = err.suggestions();
        let details = if suggestions.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::json!({ "suggestions": suggestions })
        };

        let response: JsonResponse<()> = JsonResponse {
            schema_version: 1,
            ok: false,
            data: None,
            error: Some(JsonError {
                code: err.error_code().to_string(),
                message: err.to_string(),
                details,
            }),
        };
        print_json(&response, true);
    } else {
        eprintln!("error: {}", err);
        let suggestions = err.suggestions();
        if !suggestions.is_empty() {
            eprintln!();
            eprintln!("Suggestions:");
            for suggestion in suggestions {
                eprintln!("  - {}", suggestion);
            }
        }
    }
}

/// Print human-readable output (ignored in quiet mode)
pub fn print_human(cli: &Cli, msg: &str) {
    if !cli.json && !cli.quiet {
        println!("{}", msg);
    }
}

/// Warn about failed round trips on stderr. Successful ones are silent.
pub fn report_notices(cli: &Cli, notices: &[SyncNotice]) {
    if cli.json || cli.quiet {
        return;
    }
    for notice in notices.iter().filter(|n| n.is_failure()) {
        eprintln!("warning: {}", notice.message());
    }
}

fn print_json<T: Serialize>(value: &T, to_stderr: bool) {
    match serde_json::to_string_pretty(value) {
        Ok(s) if to_stderr => eprintln!("{}", s),
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("error: failed to encode output: {}", e),
    }
}
