//! Doctor command - verify system requirements and configuration.

use crate::capability::{CapabilityResolver, ProviderName};
use crate::cli::Output;
use crate::config::{AppContext, Settings};
use crate::http::truncate_chars;
use console::style;
use std::process::Command;
use std::sync::Arc;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(ctx: Arc<AppContext>) -> anyhow::Result<()> {
    let settings = ctx.snapshot();

    Output::header("Tubecast Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    let tools = vec![
        check_tool("yt-dlp", true, install_hint_ytdlp()),
        check_tool(
            &settings.tts.edge_command,
            false,
            "Install with: pip install edge-tts (needed for free narration)",
        ),
    ];
    print_section("External Tools", &tools);
    checks.extend(tools);

    let providers = check_providers(CapabilityResolver::new(ctx.clone()));
    print_section("Providers", &providers);
    checks.extend(providers);

    let dirs = check_directories(&settings);
    print_section("Directories", &dirs);
    checks.extend(dirs);

    let config = vec![check_config_file(ctx.config_path().map(|p| p.to_path_buf()))];
    print_section("Configuration", &config);
    checks.extend(config);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Tubecast.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Tubecast is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available. Missing optional tools are warnings.
fn check_tool(name: &str, required: bool, hint: &str) -> CheckResult {
    let missing = |message: &str| {
        if required {
            CheckResult::error(name, message, hint)
        } else {
            CheckResult::warning(name, message, hint)
        }
    };

    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout.lines().next().unwrap_or("installed").trim();
            CheckResult::ok(name, truncate_chars(version, 50))
        }
        Ok(_) => missing("installed but not working"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => missing("not found"),
        Err(e) => missing(&format!("error: {}", e)),
    }
}

/// Summarization and speech-to-text configuration.
fn check_providers(resolver: CapabilityResolver) -> Vec<CheckResult> {
    let mut results = Vec::new();

    if resolver.has_ai() {
        let enabled: Vec<&str> = resolver
            .summarizer_capabilities()
            .iter()
            .filter(|c| c.enabled && c.name != ProviderName::Local)
            .map(|c| c.name.as_str())
            .collect();
        results.push(CheckResult::ok("Summarizer", &enabled.join(", ")));
    } else {
        results.push(CheckResult::warning(
            "Summarizer",
            "no AI provider configured, posts use simple extraction",
            "Set one with: tubecast config set gemini.api_key <key>",
        ));
    }

    if resolver.has_speech_to_text() {
        results.push(CheckResult::ok("Speech-to-text", "Groq Whisper"));
    } else {
        results.push(CheckResult::warning(
            "Speech-to-text",
            "not configured, videos without captions fall back to their description",
            "Set with: tubecast config set groq.api_key <key>",
        ));
    }

    results
}

/// Check output directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    [("Data directory", settings.data_dir()), ("Output directory", settings.output_dir())]
        .into_iter()
        .map(|(name, dir)| {
            if dir.exists() {
                CheckResult::ok(name, &dir.display().to_string())
            } else {
                CheckResult::warning(
                    name,
                    &format!("{} (will be created)", dir.display()),
                    "Directory will be created on first use",
                )
            }
        })
        .collect()
}

/// Check if config file exists.
fn check_config_file(path: Option<std::path::PathBuf>) -> CheckResult {
    let config_path = path.unwrap_or_else(Settings::default_config_path);
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: tubecast config set <key> <value>",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}
