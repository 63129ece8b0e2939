//! CLI command handling
//!
//! Dispatches CLI commands and formats console output.

use std::path::Path;

use colored::Colorize;

use crate::browser::{BrowserKind, BrowserSession, WebDriverFactory};
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::engine::{FormEngine, TestOutcome, Verdict};
use crate::inspect::{inspect, PageInventory};
use crate::report::RunReport;
use crate::runner::{open_session, RunObserver, Runner};
use crate::suite::{CaseDefaults, TestSuite};

/// Dispatch a CLI command
///
/// Returns `false` when a suite ran but some results were unexpected or some
/// cases were never run.
pub async fn dispatch(command: Commands, config: Config) -> Result<bool> {
    match command {
        Commands::Run {
            suite,
            browser,
            url,
            headless,
            output,
        } => run_suite(&suite, browser, url, headless, output.as_deref(), config).await,

        Commands::Inspect {
            url,
            browser,
            headless,
            json,
        } => {
            let browser = browser.unwrap_or(config.defaults.browser);
            let factory = WebDriverFactory::new(config.webdriver, headless || config.defaults.headless);
            let timings = config.timings.to_timings();

            let session = open_session(&factory, browser).await?;
            let inventory = inspect(&session, &url, &timings).await;
            if let Err(e) = session.quit().await {
                tracing::warn!(error = %e, "Failed to close browser session");
            }
            let inventory = inventory?;

            if json {
                println!("{}", serde_json::to_string_pretty(&inventory)?);
            } else {
                print_inventory(&inventory);
            }
            Ok(true)
        }

        Commands::Template { path } => {
            let yaml = TestSuite::template().to_yaml()?;
            match path {
                Some(path) => {
                    std::fs::write(&path, yaml)?;
                    println!("Template written to {}", path.display());
                }
                None => print!("{yaml}"),
            }
            Ok(true)
        }
    }
}

async fn run_suite(
    path: &Path,
    browser: Option<BrowserKind>,
    url: Option<String>,
    headless: bool,
    output: Option<&Path>,
    config: Config,
) -> Result<bool> {
    let suite = TestSuite::load(path)?;
    let name = suite
        .name
        .clone()
        .unwrap_or_else(|| path.display().to_string());

    let defaults = CaseDefaults {
        target_url: url.or(config.defaults.target_url.clone()),
        browser: Some(config.defaults.browser),
        force_browser: browser,
    };
    let cases = suite.into_cases(&defaults);

    println!("\n{} {}", "Running Suite:".blue().bold(), name.white().bold());
    println!("  {} test case(s)", cases.len().to_string().dimmed());

    let factory = WebDriverFactory::new(config.webdriver, headless || config.defaults.headless);
    let runner = Runner::new(factory, FormEngine::new(config.timings.to_timings()))
        .with_default_url(defaults.target_url)
        .with_observer(Console);

    let report = runner.run(&cases).await;
    print_summary(&report);

    if let Some(output) = output {
        report.write_json(output)?;
        println!("Report written to {}", output.display());
    }

    Ok(report.unexpected().next().is_none() && report.skipped() == 0)
}

/// Prints progress lines as the run advances
struct Console;

impl RunObserver for Console {
    fn group_started(&self, browser: BrowserKind, cases: usize) {
        println!(
            "\n{} {} {}",
            "Browser:".cyan(),
            browser.to_string().white().bold(),
            format!("({} cases)", cases).dimmed()
        );
    }

    fn case_finished(&self, outcome: &TestOutcome) {
        let mark = match &outcome.verdict {
            Verdict::Success => "✓".green(),
            Verdict::Failed => "✗".red(),
            Verdict::Error(_) => "!".yellow(),
        };
        let verdict = match outcome.matches_expectation() {
            Some(false) => format!("{} (expected {})", outcome.verdict, outcome.expected_result)
                .red()
                .to_string(),
            _ => outcome.verdict.to_string(),
        };
        println!("  {} {} {}", mark, outcome.id.white().bold(), verdict);
        if !outcome.description.is_empty() {
            println!("      {}", outcome.description.dimmed());
        }
    }

    fn group_abandoned(&self, browser: BrowserKind, reason: &Error, skipped: usize) {
        println!(
            "  {} {} group abandoned, {} case(s) not run: {}",
            "✗".red().bold(),
            browser,
            skipped,
            reason
        );
    }
}

fn print_summary(report: &RunReport) {
    println!("\n{}", "Summary:".cyan());
    for group in &report.groups {
        let line = format!(
            "  {:<8} {}/{} passed ({})",
            group.browser.to_string(),
            group.passed,
            group.total,
            group.pass_rate_label()
        );
        if group.abandoned.is_some() {
            println!("{} {}", line, "abandoned".red());
        } else {
            println!("{}", line);
        }
    }

    let unexpected = report.unexpected().count();
    if unexpected == 0 && report.skipped() == 0 {
        println!("\n{} {}\n", "✓".green().bold(), "All results as expected".green().bold());
    } else {
        println!(
            "\n{} {}\n",
            "✗".red().bold(),
            format!("{} unexpected, {} not run", unexpected, report.skipped())
                .red()
                .bold()
        );
    }
}

fn print_inventory(inventory: &PageInventory) {
    println!("\n{} {}", "Page:".blue().bold(), inventory.url.white().bold());

    println!("\n{}", "Inputs:".cyan());
    if inventory.inputs.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for input in &inventory.inputs {
        let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<10} name={} id={} label={}",
            input.kind,
            field(&input.name),
            field(&input.id),
            field(&input.label).dimmed()
        );
    }

    println!("\n{}", "Cascade picks:".cyan());
    for pick in &inventory.picks {
        match (&pick.strategy, pick.rank) {
            (Some(strategy), Some(rank)) => println!(
                "  {} {:<10} {} {}",
                "✓".green(),
                format!("{:?}", pick.role).to_lowercase(),
                strategy,
                format!("(strategy #{})", rank + 1).dimmed()
            ),
            _ => println!(
                "  {} {:<10} {}",
                "✗".red(),
                format!("{:?}", pick.role).to_lowercase(),
                "no match".red()
            ),
        }
    }
    println!();
}
