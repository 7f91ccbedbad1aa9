//! `orchestra run`: resolve the plan input, execute one plan, print the
//! aggregated report and every agent's transcript.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use orchestra_types::error::InputError;
use orchestra_types::message::Payload;
use orchestra_types::plan::{PlanReport, PlanRequest};

use crate::state::{AppState, Overrides};

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// JSON file with `region` and `product` keys.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Target region (e.g. LATAM).
    #[arg(long)]
    pub region: Option<String>,

    /// High-level product or solution description.
    #[arg(long)]
    pub product: Option<String>,

    /// Fail an exchange when a reply takes longer than this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Seed for the mock insight data.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            reply_timeout_secs: self.timeout_secs,
            data_seed: self.seed,
        }
    }
}

/// Work out what to plan for.
///
/// Priority:
/// 1. `--region` and `--product`, when both are given
/// 2. `--file`
/// 3. interactive prompts via `ask`
pub async fn resolve_request(
    args: &RunArgs,
    mut ask: impl FnMut(&str) -> Result<String>,
) -> Result<PlanRequest> {
    if let (Some(region), Some(product)) = (&args.region, &args.product) {
        return Ok(PlanRequest::new(region, product)?);
    }

    if let Some(path) = &args.file {
        return Ok(read_request_file(path).await?);
    }

    let region = ask("Enter the target region")?;
    let product = ask("Enter the high-level product/solution description")?;
    Ok(PlanRequest::new(region, product)?)
}

async fn read_request_file(path: &Path) -> Result<PlanRequest, InputError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| InputError::Unreadable {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
    PlanRequest::from_json(&content)
}

fn prompt(label: &str) -> Result<String> {
    Ok(Input::<String>::new().with_prompt(label).interact_text()?)
}

/// Run one plan and print its report.
pub async fn run_plan(state: &AppState, args: RunArgs, json: bool, quiet: bool) -> Result<()> {
    let request = resolve_request(&args, prompt).await?;
    let mesh = state.mesh(args.overrides());

    let spinner = (!json && !quiet).then(|| {
        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(spinner_style);
        }
        spinner.set_message(format!("Coordinating agents for '{}'...", request.product()));
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner
    });

    let outcome = mesh.run(&request).await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let report = outcome.with_context(|| {
        format!(
            "plan for '{}' in {} did not complete",
            request.product(),
            request.region()
        )
    })?;

    let transcripts = mesh.transcripts();

    if json {
        let transcripts: Vec<Value> = transcripts
            .iter()
            .map(|(agent, lines)| serde_json::json!({ "agent": agent, "lines": lines }))
            .collect();
        let output = if quiet {
            serde_json::to_value(&report)?
        } else {
            serde_json::json!({ "plan": report, "transcripts": transcripts })
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_report(&report);
    if !quiet {
        print_transcripts(&transcripts);
        println!(
            "  {}",
            style(format!(
                "{} messages exchanged · config {}",
                mesh.messages_sent(),
                state.config_path.display()
            ))
            .dim()
        );
        println!();
    }

    Ok(())
}

fn print_report(report: &PlanReport) {
    println!();
    println!(
        "  {} Plan for {} in {}",
        style("✓").green().bold(),
        style(&report.product).cyan().bold(),
        style(&report.region).cyan()
    );

    for (section, payload) in report.sections() {
        println!();
        println!("  {}", style(section).bold());
        print_payload(payload);
    }
    println!();
}

fn print_payload(payload: &Payload) {
    for (key, value) in payload {
        println!("    {:<18} {}", style(key).dim(), display_value(value));
    }
}

/// Strings unquoted, lists of strings comma-joined, anything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn print_transcripts(transcripts: &[(String, Vec<String>)]) {
    println!("  {}", style("Agent transcripts").bold().underlined());
    for (agent, lines) in transcripts {
        println!();
        println!("  {}", style(agent).yellow());
        if lines.is_empty() {
            println!("    {}", style("(nothing recorded)").dim());
        }
        for line in lines {
            println!("    {line}");
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_prompt(_: &str) -> Result<String> {
        anyhow::bail!("prompt should not be shown")
    }

    fn scripted(answers: &'static [&'static str]) -> impl FnMut(&str) -> Result<String> {
        let mut answers = answers.iter();
        move |_| Ok(answers.next().map(|a| a.to_string()).unwrap_or_default())
    }

    fn input_error(err: &anyhow::Error) -> Option<&InputError> {
        err.downcast_ref::<InputError>()
    }

    #[tokio::test]
    async fn flags_win_over_file() {
        let args = RunArgs {
            region: Some(" LATAM ".into()),
            product: Some("EcoWidget".into()),
            file: Some(PathBuf::from("/does/not/exist.json")),
            ..RunArgs::default()
        };
        let request = resolve_request(&args, no_prompt).await.unwrap();
        assert_eq!(request.region(), "LATAM");
        assert_eq!(request.product(), "EcoWidget");
    }

    #[tokio::test]
    async fn file_used_when_flags_incomplete() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("input.json");
        tokio::fs::write(&path, r#"{"region": " EU ", "product": " Smart Bin "}"#)
            .await
            .unwrap();

        let args = RunArgs {
            region: Some("ignored".into()),
            file: Some(path),
            ..RunArgs::default()
        };
        let request = resolve_request(&args, no_prompt).await.unwrap();
        assert_eq!(request.region(), "EU");
        assert_eq!(request.product(), "Smart Bin");
    }

    #[tokio::test]
    async fn unreadable_file_is_an_input_error() {
        let args = RunArgs {
            file: Some(PathBuf::from("/does/not/exist.json")),
            ..RunArgs::default()
        };
        let err = resolve_request(&args, no_prompt).await.unwrap_err();
        assert!(matches!(input_error(&err), Some(InputError::Unreadable { .. })));
    }

    #[tokio::test]
    async fn file_with_empty_product_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("input.json");
        tokio::fs::write(&path, json!({"region": "APAC"}).to_string())
            .await
            .unwrap();

        let args = RunArgs {
            file: Some(path),
            ..RunArgs::default()
        };
        let err = resolve_request(&args, no_prompt).await.unwrap_err();
        assert!(matches!(input_error(&err), Some(InputError::MissingProduct)));
    }

    #[tokio::test]
    async fn prompts_when_nothing_given() {
        let request = resolve_request(&RunArgs::default(), scripted(&["APAC", "Refill Kit"]))
            .await
            .unwrap();
        assert_eq!(request.region(), "APAC");
        assert_eq!(request.product(), "Refill Kit");
    }

    #[tokio::test]
    async fn empty_prompt_answer_is_rejected() {
        let err = resolve_request(&RunArgs::default(), scripted(&["  ", "Refill Kit"]))
            .await
            .unwrap_err();
        assert!(matches!(input_error(&err), Some(InputError::MissingRegion)));
    }

    #[test]
    fn display_value_formats() {
        assert_eq!(display_value(&json!("LATAM")), "LATAM");
        assert_eq!(display_value(&json!(["GRI", "SASB"])), "GRI, SASB");
        assert_eq!(display_value(&json!(1.1)), "1.1");
        assert_eq!(display_value(&json!([["Month 1", "x"]])), r#"[["Month 1","x"]]"#);
    }
}
