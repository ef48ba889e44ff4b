use anyhow::Context;
use assetry_processing::VariantReport;
use serde::Serialize;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// One-line summary of a variant report, e.g. `2 stored, 1 failed (w200)`.
pub fn variant_summary(report: &VariantReport) -> String {
    let mut summary = format!("{} stored, {} failed", report.stored.len(), report.failed.len());
    if !report.failed.is_empty() {
        let labels: Vec<&str> = report.failed.iter().map(|f| f.label.as_str()).collect();
        summary.push_str(&format!(" ({})", labels.join(", ")));
    }
    if report.pending > 0 {
        summary.push_str(&format!(", {} pending", report.pending));
    }
    summary
}
