use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use hook_synth::logging::{self, LogConfig};
use hook_synth::{
    GenerateRequest, GenerateResponse, JsonlSampleStore, SynthesisConfig, SynthesisError,
    SynthesisOrchestrator,
};

/// Synthesize a TypeScript webhook handler from captured deliveries.
#[derive(Debug, Parser)]
#[command(name = "hook-synth", version)]
struct Command {
    /// JSON-lines capture export, one record per line.
    #[arg(short, long)]
    store: PathBuf,
    /// Read the selection from a `{"webhooksIds": [...]}` request file instead of IDS.
    #[arg(short, long)]
    request: Option<PathBuf>,
    /// Dot separated path of the event-kind field.
    #[arg(long)]
    discriminant: Option<String>,
    #[arg(long)]
    literal_threshold: Option<usize>,
    #[arg(long)]
    max_depth: Option<usize>,
    /// Field whose string values are kept as literal unions. Repeatable.
    #[arg(long)]
    literal_field: Vec<String>,
    /// Print the full response as JSON instead of bare TypeScript.
    #[arg(long)]
    json: bool,
    #[arg(short, long)]
    debug: bool,
    /// Capture ids to synthesize from, in selection order.
    ids: Vec<String>,
}

impl Command {
    fn config(&self) -> Result<SynthesisConfig> {
        let mut config = SynthesisConfig::from_env().context("reading HOOK_SYNTH_* settings")?;
        if let Some(path) = &self.discriminant {
            config = config.with_discriminant_path(path.clone());
        }
        if let Some(threshold) = self.literal_threshold {
            config = config.with_literal_threshold(threshold);
        }
        if let Some(depth) = self.max_depth {
            config = config.with_max_depth(depth);
        }
        for field in &self.literal_field {
            config = config.with_literal_field(field.clone());
        }
        config.validate()?;
        Ok(config)
    }

    fn request(&self) -> Result<GenerateRequest> {
        match &self.request {
            Some(path) => {
                if !self.ids.is_empty() {
                    bail!("pass either --request or capture ids, not both");
                }
                read_request(path)
            }
            None => Ok(GenerateRequest {
                webhooks_ids: self.ids.clone(),
            }),
        }
    }
}

fn read_request(path: &Path) -> Result<GenerateRequest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading request file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing request file {}", path.display()))
}

async fn run(command: &Command) -> Result<Option<GenerateResponse>> {
    let config = command.config()?;
    let request = command.request()?;
    let store = JsonlSampleStore::open(&command.store)?;
    tracing::debug!(records = store.len(), path = %store.path().display(), "capture store loaded");

    let orchestrator = SynthesisOrchestrator::new(store, config);
    match orchestrator.generate(&request).await {
        Ok(response) => Ok(Some(response)),
        Err(SynthesisError::NoValidSamples { selected, warnings }) => {
            for warning in &warnings {
                eprintln!("warning: {warning}");
            }
            eprintln!("error: none of the {selected} selected samples could be used");
            Ok(None)
        }
        Err(error) => Err(error.into()),
    }
}

fn emit(command: &Command, response: &GenerateResponse) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if command.json {
        serde_json::to_writer_pretty(&mut stdout, response)?;
        writeln!(stdout)?;
    } else {
        for warning in &response.warnings {
            eprintln!("warning: {warning}");
        }
        stdout.write_all(response.code.as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let command = Command::parse();
    logging::init(&LogConfig::new().debug(command.debug));

    match run(&command).await {
        Ok(Some(response)) => match emit(&command, &response) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::FAILURE
            }
        },
        Ok(None) => ExitCode::from(2),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn parse(args: &[&str]) -> Command {
        Command::try_parse_from(std::iter::once("hook-synth").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    fn capture_line(id: &str, body: &str) -> String {
        serde_json::json!({
            "id": id,
            "method": "POST",
            "pathname": "/stripe/webhooks/abc",
            "ip": "10.0.0.1",
            "statusCode": 200,
            "contentType": "application/json",
            "headers": {},
            "body": body,
            "createdAt": "2026-02-14T00:00:00Z",
        })
        .to_string()
    }

    #[test]
    fn flags_override_configuration() {
        let command = parse(&[
            "--store",
            "captures.jsonl",
            "--discriminant",
            "event.kind",
            "--max-depth",
            "3",
            "--literal-field",
            "status",
            "--literal-field",
            "currency",
            "wh-1",
            "wh-2",
        ]);

        let config = command.config().expect("config should build");
        assert_eq!(config.discriminant_path, "event.kind");
        assert_eq!(config.max_depth, 3);
        assert!(config.literal_fields.ends_with(&["status".to_string(), "currency".to_string()]));
        assert_eq!(
            command.request().expect("request").webhooks_ids,
            vec!["wh-1", "wh-2"]
        );
    }

    #[test]
    fn depth_too_shallow_for_discriminant_is_rejected() {
        let command = parse(&[
            "--store",
            "captures.jsonl",
            "--discriminant",
            "data.object.type",
            "--max-depth",
            "2",
        ]);
        let error = command.config().expect_err("depth must reach the discriminant");
        assert!(error.to_string().contains("would cut off discriminant path"));
    }

    #[test]
    fn request_file_and_ids_are_exclusive() {
        let command = parse(&["--store", "s.jsonl", "--request", "r.json", "wh-1"]);
        assert!(command.request().is_err());
    }

    #[tokio::test]
    async fn run_renders_handler_from_capture_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store_path = dir.path().join("captures.jsonl");
        let request_path = dir.path().join("request.json");
        let mut file = File::create(&store_path).expect("capture file");
        writeln!(file, "{}", capture_line("wh-1", r#"{"type":"payout.paid","amount":100}"#))
            .expect("write");
        writeln!(file, "{}", capture_line("wh-2", "{not json")).expect("write");
        fs::write(&request_path, r#"{"webhooksIds":["wh-1","wh-2"]}"#).expect("request file");

        let command = parse(&[
            "--store",
            store_path.to_str().expect("utf-8 path"),
            "--request",
            request_path.to_str().expect("utf-8 path"),
        ]);
        let response = run(&command)
            .await
            .expect("run should succeed")
            .expect("response expected");

        assert!(response.code.contains("export interface PayoutPaidEvent {"));
        assert_eq!(response.warnings.len(), 1);
        assert_eq!(response.warnings[0].sample_id, "wh-2");
    }

    #[tokio::test]
    async fn run_reports_unusable_selection_without_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store_path = dir.path().join("captures.jsonl");
        fs::write(&store_path, capture_line("wh-1", "{not json")).expect("capture file");

        let command = parse(&["--store", store_path.to_str().expect("utf-8 path"), "wh-1"]);
        assert!(run(&command).await.expect("run should not error").is_none());
    }

    #[tokio::test]
    async fn run_rejects_empty_selection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store_path = dir.path().join("captures.jsonl");
        fs::write(&store_path, "").expect("capture file");

        let command = parse(&["--store", store_path.to_str().expect("utf-8 path")]);
        let error = run(&command).await.expect_err("empty selection must fail");
        assert!(matches!(
            error.downcast_ref::<SynthesisError>(),
            Some(SynthesisError::EmptySelection)
        ));
    }
}
