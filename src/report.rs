//! Console summary and JSON export of a finished run.
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::domain::RunConfig;
use crate::error::AppResult;
use crate::metrics::RunResult;

const MILLIS_PER_SECOND: f64 = 1000.0;

#[must_use]
pub fn summary_lines(result: &RunResult) -> Vec<String> {
    let mut lines = vec![
        format!("Test Duration: {:.2}s", result.total_time),
        format!("Total Requests: {}", result.total_requests),
        format!("Successful Requests: {}", result.successful_requests),
        format!("Failed Requests: {}", result.failed_requests),
        format!("Error Rate: {:.2}%", result.error_rate),
        format!("Requests/Second: {:.2}", result.requests_per_second),
        "Response Time Statistics:".to_owned(),
        format!("  Average: {}", millis(result.avg_response_time)),
        format!("  Minimum: {}", millis(result.min_response_time)),
        format!("  Maximum: {}", millis(result.max_response_time)),
        format!("  50th Percentile: {}", millis(result.p50_response_time)),
        format!("  95th Percentile: {}", millis(result.p95_response_time)),
        format!("  99th Percentile: {}", millis(result.p99_response_time)),
    ];
    if !result.errors.is_empty() {
        lines.push("Error Breakdown:".to_owned());
        for (label, count) in &result.errors {
            lines.push(format!("  {}: {}", label, count));
        }
    }
    lines
}

pub fn print_summary(result: &RunResult) {
    for line in summary_lines(result) {
        println!("{}", line);
    }
}

fn millis(seconds: f64) -> String {
    format!("{:.2}ms", seconds * MILLIS_PER_SECOND)
}

/// Writes the result, the effective configuration and a UTC timestamp as
/// pretty JSON.
///
/// # Errors
///
/// Returns an error when serialization or the file write fails.
pub async fn write_json(result: &RunResult, config: &RunConfig, path: &str) -> AppResult<()> {
    let payload = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "result": result,
        "config": config,
    });
    let json = serde_json::to_vec_pretty(&payload)?;

    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&json).await?;
    writer.flush().await?;
    Ok(())
}
