//! CLI command implementations for orgdash.
//!
//! Provides subcommand handlers for:
//! - `orgdash login | logout | whoami`: session lifecycle
//! - `orgdash overview | population-health | engagement`: aggregate views
//! - `orgdash employees | reports --page N`: paginated lists
//! - `orgdash probe`: endpoint connectivity checks
//! - `orgdash activity --days N`: summary of the local request log
//! - `orgdash config show|init|set|reset`: configuration management

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use serde::Serialize;

use crate::analytics::reporter::{self, Activity};
use crate::api::ApiClient;
use crate::config::{self, DashConfig, schema::Environment};
use crate::pipeline::employees::{EmployeeRow, EmployeesView};
use crate::pipeline::engagement::{EngagementModel, EngagementView};
use crate::pipeline::overview::{OverviewModel, OverviewView};
use crate::pipeline::population_health::{PopulationHealthModel, PopulationHealthView};
use crate::pipeline::reports::{Page, ReportRow, ReportsView};
use crate::pipeline::{DashboardView, ErrorKind, FetchError, Segment, ViewLoader, ViewState};
use crate::probe::{self, CheckResult};
use crate::session::{SessionError, SessionManager};
use crate::storage::{FileStore, TokenStore};

/// Shown instead of raw failure text outside development.
const GENERIC_FAILURE: &str = "An internal error occurred. Contact support.";

/// Output format for view commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Marker error: the failure was already printed, only the exit code is left.
#[derive(Debug)]
pub struct Reported;

impl std::fmt::Display for Reported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("command failed")
    }
}

impl std::error::Error for Reported {}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Everything a command needs: resolved config and an initialized session.
pub struct Context {
    pub config: DashConfig,
    pub session: SessionManager,
    /// `--details` was passed.
    pub force_details: bool,
}

impl Context {
    /// Open the token store, build the gateway client and rehydrate the
    /// session from disk.
    pub fn open(config: DashConfig, force_details: bool) -> Result<Self> {
        let storage_path = config
            .storage
            .resolved_path()
            .context("could not determine storage path (no home directory?)")?;
        let tokens = TokenStore::new(Arc::new(FileStore::new(storage_path)));
        let client = ApiClient::from_config(&config, tokens.clone());

        let mut session = SessionManager::new(client, tokens);
        session.initialize();

        Ok(Self {
            config,
            session,
            force_details,
        })
    }

    pub fn client(&self) -> &ApiClient {
        self.session.client()
    }

    /// Raw failure text is shown in development or on request.
    pub fn show_details(&self) -> bool {
        self.force_details || self.config.general.environment == Environment::Development
    }

    /// `--format` if given, else the configured default.
    pub fn format(&self, flag: Option<&str>) -> OutputFormat {
        OutputFormat::from_str_opt(flag.or(Some(self.config.general.format.as_str())))
    }
}

// ---------------------------------------------------------------------------
// orgdash login | logout | whoami
// ---------------------------------------------------------------------------

/// Log in. The password is read from stdin when not given.
pub fn run_login(ctx: &mut Context, email: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ")?,
    };
    if password.is_empty() {
        bail!("password must not be empty");
    }

    let details = ctx.show_details();
    match ctx.session.login(email, &password) {
        Ok(session) => {
            println!(
                "{} Logged in as {} ({})",
                "✓".green().bold(),
                session.user.display_name().bold(),
                session.organization.name,
            );
            Ok(())
        }
        Err(SessionError::Login(err)) => {
            print_login_error(&err, details);
            Err(Reported.into())
        }
        Err(other) => Err(other.into()),
    }
}

fn print_login_error(err: &FetchError, details: bool) {
    eprintln!("{} {}", "✗".red().bold(), err.message.red());
    if err.kind == ErrorKind::Network {
        eprintln!("  {}", "Is the backend running? Try `orgdash probe`.".dimmed());
    }
    if details && err.detail != err.message {
        eprintln!("  {} {}", "Details:".dimmed(), err.detail.dimmed());
    }
}

pub fn run_logout(ctx: &mut Context) -> Result<()> {
    let outcome = ctx.session.logout()?;
    if let Some(warning) = outcome.warning {
        eprintln!(
            "{} backend logout failed: {}",
            "warning:".yellow().bold(),
            warning
        );
    }
    println!("{} Logged out", "✓".green().bold());
    Ok(())
}

pub fn run_whoami(ctx: &Context, format: OutputFormat) -> Result<()> {
    let Some(session) = ctx.session.snapshot() else {
        println!("{}", "Not logged in. Run `orgdash login <email>`.".yellow());
        return Ok(());
    };

    if format == OutputFormat::Json {
        let value = serde_json::json!({
            "user": session.user,
            "organization": session.organization,
            "role": session.role,
            "permissions": session.permissions,
            "can_write": session.can_write(),
            "can_export": session.can_export(),
            "can_manage_employees": session.can_manage_employees(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Current Session".bold().cyan());
    println!("{}", "=".repeat(40));
    println!("  {} {}", "User:        ".bold(), session.user.display_name());
    println!("  {} {}", "Email:       ".bold(), session.user.email);
    println!(
        "  {} {} ({})",
        "Organization:".bold(),
        session.organization.name,
        session.organization.code
    );
    println!(
        "  {} {}",
        "Role:        ".bold(),
        session.role.as_deref().unwrap_or("-")
    );
    println!(
        "  {} write {} · export {} · manage employees {}",
        "Access:      ".bold(),
        yes_no(session.can_write()),
        yes_no(session.can_export()),
        yes_no(session.can_manage_employees()),
    );
    if !session.permissions.is_empty() {
        let list: Vec<&str> = session.permissions.iter().map(String::as_str).collect();
        println!("  {} {}", "Permissions: ".bold(), list.join(", "));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// View commands
// ---------------------------------------------------------------------------

pub fn run_overview(ctx: &Context, format: OutputFormat) -> Result<()> {
    run_view(ctx, OverviewView, format, print_overview)
}

pub fn run_population_health(ctx: &Context, format: OutputFormat) -> Result<()> {
    run_view(ctx, PopulationHealthView, format, print_population_health)
}

pub fn run_engagement(ctx: &Context, format: OutputFormat) -> Result<()> {
    run_view(ctx, EngagementView, format, print_engagement)
}

pub fn run_employees(ctx: &Context, page: u32, format: OutputFormat) -> Result<()> {
    run_view(ctx, EmployeesView { page }, format, print_employees)
}

pub fn run_reports(ctx: &Context, page: u32, format: OutputFormat) -> Result<()> {
    run_view(ctx, ReportsView { page }, format, print_reports)
}

/// Load one view and print it, or print its classified failure.
fn run_view<V>(ctx: &Context, view: V, format: OutputFormat, print: fn(&V::Model)) -> Result<()>
where
    V: DashboardView,
    V::Model: Serialize,
{
    let mut loader = ViewLoader::new(view);

    // Views are protected: without a session there is nothing to send.
    if !ctx.session.is_authenticated() {
        loader.finish(Err(FetchError::new(
            ErrorKind::Auth,
            format!("You need to login to view {}", V::SUBJECT),
            "no stored session",
        )));
    } else {
        loader.load(ctx.client());
    }

    match loader.state() {
        ViewState::Ready(model) => {
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(model)?),
                OutputFormat::Table => print(model),
            }
            Ok(())
        }
        ViewState::Failed(err) => {
            print_fetch_error(err, ctx.show_details());
            Err(Reported.into())
        }
        ViewState::Idle | ViewState::Loading => bail!("{} did not finish loading", V::SUBJECT),
    }
}

fn print_fetch_error(err: &FetchError, show_details: bool) {
    for line in error_lines(err, show_details) {
        eprintln!("{line}");
    }
}

/// Lines of the error panel, uncoloured.
fn error_lines(err: &FetchError, show_details: bool) -> Vec<String> {
    let mut lines = vec![format!("✗ {}", err.kind.title())];
    match err.kind {
        ErrorKind::Auth => {
            lines.push(format!("  {}", err.message));
            lines.push("  Run `orgdash login <email>` to sign in.".to_string());
        }
        ErrorKind::Server | ErrorKind::Network => {
            if show_details {
                lines.push(format!("  {}", err.message));
                if err.detail != err.message {
                    lines.push(format!("  Details: {}", err.detail));
                }
            } else {
                lines.push(format!("  {GENERIC_FAILURE}"));
            }
            lines.push("  Re-run the command to retry.".to_string());
        }
    }
    lines
}

fn print_overview(model: &OverviewModel) {
    println!("{}", "Dashboard Overview".bold().cyan());
    println!("{}", "=".repeat(50));
    println!(
        "  {} {}",
        "Total employees:   ".bold(),
        format_number(model.total_employees)
    );
    println!(
        "  {} {}  {}",
        "Active / inactive: ".bold(),
        format_number(model.active_users),
        format!("/ {}", format_number(model.inactive_users)).dimmed()
    );
    println!("  {} {:.1}%", "Engagement rate:   ".bold(), model.engagement_rate);
    println!(
        "  {} {:.1}%",
        "Participation rate:".bold(),
        model.program_participation_rate
    );
    println!();

    print_segments("Risk Distribution", &model.risk_distribution.segments());
    match &model.outcome_indicators {
        Some(outcomes) => print_segments("Health Outcomes", &outcomes.segments()),
        None => {
            println!("{}", "Health Outcomes".bold().cyan());
            println!("  {}", "No outcome data".dimmed());
        }
    }
}

fn print_population_health(model: &PopulationHealthModel) {
    println!("{}", "Population Health".bold().cyan());
    println!("{}", "=".repeat(50));
    println!(
        "  {} {}",
        "Total enrolled:".bold(),
        format_number(model.total_enrolled)
    );
    println!();

    for (title, segments) in [
        ("BMI Distribution", &model.bmi_distribution),
        ("Blood Pressure Risk", &model.blood_pressure_risk),
        ("Diabetes Risk", &model.diabetes_risk),
    ] {
        match segments {
            Some(segments) => print_segments(title, segments),
            None => {
                println!("{}", title.bold().cyan());
                println!("  {}", "No data".dimmed());
                println!();
            }
        }
    }
    println!(
        "  {}",
        "All figures are aggregated; no individual data is shown.".dimmed()
    );
}

fn print_engagement(model: &EngagementModel) {
    println!("{}", "Engagement".bold().cyan());
    println!("{}", "=".repeat(50));
    println!(
        "  {} {}",
        "Weekly active users: ".bold(),
        format_number(model.weekly_active_users)
    );
    println!(
        "  {} {}",
        "Monthly active users:".bold(),
        format_number(model.monthly_active_users)
    );
    println!();

    let appointments = &model.appointments;
    println!("{}", "Appointments".bold().cyan());
    println!(
        "  Booked: {}  Completed: {}  Completion: {}  No-show: {:.1}%",
        format_number(appointments.total_booked),
        format_number(appointments.completed),
        appointments.completion_label().green(),
        appointments.no_show_rate,
    );
    println!();

    println!("{}", "Inactivity".bold().cyan());
    for flag in &model.inactivity {
        println!(
            "  {:<10} {:>6}  {} {:.1}%",
            format!("{} days", flag.days),
            format_number(flag.count),
            bar(flag.share_pct, 20),
            flag.share_pct,
        );
    }
    println!();

    if !model.login_trends.is_empty() {
        println!("{}", "Login Trends".bold().cyan());
        let peak = model.login_trends.iter().map(|p| p.logins).max().unwrap_or(0);
        for point in &model.login_trends {
            println!(
                "  {:<12} {:>6}  {}",
                point.date,
                format_number(point.logins),
                bar(crate::pipeline::percent(point.logins, peak), 30),
            );
        }
    }
}

fn print_employees(page: &Page<EmployeeRow>) {
    println!("{}", "Employees".bold().cyan());
    println!("{}", "=".repeat(86));
    if page.rows.is_empty() {
        println!("  {}", "No employees on this page.".yellow());
        return;
    }
    println!(
        "  {:<8} {:<22} {:<12} {:<12} {:<8} Programs",
        "ID", "Name", "Enrollment", "Engagement", "Risk"
    );
    println!("  {}", "-".repeat(84));
    for (i, row) in page.rows.iter().enumerate() {
        let line = format!(
            "  {:<8} {:<22} {:<12} {:<12} {:<8} {}",
            truncate(&row.employee_id, 8),
            truncate(&row.full_name, 22),
            truncate(&row.enrollment_status, 12),
            truncate(&row.engagement_status, 12),
            truncate(&row.risk_category, 8),
            truncate(&row.programs_label(), 30),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
    print_page_footer(page);
}

fn print_reports(page: &Page<ReportRow>) {
    println!("{}", "Reports".bold().cyan());
    println!("{}", "=".repeat(80));
    if page.rows.is_empty() {
        println!("  {}", "No reports generated yet.".yellow());
        return;
    }
    println!(
        "  {:<8} {:<24} {:<6} {:<11} {:<17} Download",
        "ID", "Type", "Format", "Status", "Generated"
    );
    println!("  {}", "-".repeat(78));
    for row in &page.rows {
        let generated = row
            .generated_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let status = match row.status.as_str() {
            "COMPLETED" => row.status.as_str().green(),
            "FAILED" => row.status.as_str().red(),
            other => other.yellow(),
        };
        println!(
            "  {:<8} {:<24} {:<6} {:<11} {:<17} {}",
            truncate(&row.id, 8),
            truncate(&row.report_type, 24),
            row.format,
            status,
            generated,
            if row.is_downloadable() {
                row.download_url.as_deref().unwrap_or("")
            } else {
                "-"
            },
        );
    }
    print_page_footer(page);
}

fn print_page_footer<T>(page: &Page<T>) {
    println!();
    let mut footer = format!("Page {} of {}", page.page, page.total_pages);
    if let Some(total) = page.total {
        footer.push_str(&format!(" · {} total", format_number(total)));
    }
    if page.has_next() {
        footer.push_str(&format!(" · next: --page {}", page.page + 1));
    }
    println!("  {}", footer.dimmed());
}

fn print_segments(title: &str, segments: &[Segment]) {
    println!("{}", title.bold().cyan());
    let total: u64 = segments.iter().map(|s| s.count).sum();
    for segment in segments {
        let share = segment
            .percentage
            .unwrap_or_else(|| crate::pipeline::percent(segment.count, total));
        println!(
            "  {:<12} {:>6}  {} {:.1}%",
            segment.label,
            format_number(segment.count),
            bar(share, 20),
            share,
        );
    }
    println!();
}

// ---------------------------------------------------------------------------
// orgdash probe
// ---------------------------------------------------------------------------

pub fn run_probe(ctx: &Context, format: OutputFormat) -> Result<()> {
    let results = probe::run(ctx.client());

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("{}", "Backend Connectivity Probe".bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {} {}", "API base:".bold(), ctx.client().base_url());
    println!(
        "  {} {}",
        "Token:   ".bold(),
        if ctx.session.is_authenticated() {
            "present"
        } else {
            "none (protected endpoints will answer 401)"
        }
    );
    println!();
    for result in &results {
        print_probe_item(result);
    }

    let passed = results.iter().filter(|r| r.success).count();
    println!();
    println!("  {passed}/{} checks passed", results.len());
    Ok(())
}

fn print_probe_item(result: &CheckResult) {
    let mark = if result.success {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    let status = result
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "---".to_string());
    println!(
        "  {} {:<28} {:<5} {:>4} {:>6}ms  {}",
        mark,
        result.name,
        result.method,
        status,
        result.duration_ms,
        result.url.dimmed()
    );
    if let Some(error) = &result.error {
        println!("      {}", error.red());
    } else if let Some(summary) = &result.summary {
        println!("      {}", truncate(summary, 70).dimmed());
    }
}

// ---------------------------------------------------------------------------
// orgdash activity
// ---------------------------------------------------------------------------

pub fn run_activity(config: &DashConfig, format: OutputFormat, days: Option<u32>) -> Result<()> {
    let Some(path) = config.logging.active_path() else {
        println!(
            "{}",
            "Request logging is disabled (logging.enabled = false).".yellow()
        );
        return Ok(());
    };

    let activity = reporter::compute_activity(&path, days);
    if activity.total_requests == 0 {
        println!(
            "{}",
            "No requests logged yet. Run a view command to see activity.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_activity_json(&activity)?,
        OutputFormat::Table => print_activity_table(&activity),
    }
    Ok(())
}

fn print_activity_table(activity: &Activity) {
    println!("{}", "Request Activity".bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {} {}", "Total requests:".bold(), activity.total_requests);

    let dist = &activity.outcomes;
    println!(
        "  OK: {} ({:.0}%)  Failed: {} ({:.0}%)  Server: {} ({:.0}%)  Network: {} ({:.0}%)",
        dist.ok,
        dist.pct(dist.ok),
        dist.failed,
        dist.pct(dist.failed),
        dist.server,
        dist.pct(dist.server),
        dist.network,
        dist.pct(dist.network),
    );
    println!();

    println!(
        "  {:<36} {:>6} {:>9} {:>8} {:>6}",
        "Endpoint", "Calls", "Failures", "Avg ms", "Last"
    );
    println!("  {}", "-".repeat(68));
    for stat in activity.endpoints.iter().take(20) {
        let last = stat
            .last_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "---".to_string());
        let line = format!(
            "  {:<36} {:>6} {:>8.0}% {:>8} {:>6}",
            truncate(&stat.endpoint, 36),
            stat.count,
            stat.failure_pct(),
            stat.avg_duration_ms,
            last,
        );
        if stat.failures > 0 {
            println!("{}", line.yellow());
        } else {
            println!("{line}");
        }
    }
}

fn print_activity_json(activity: &Activity) -> Result<()> {
    let value = serde_json::json!({
        "total_requests": activity.total_requests,
        "outcomes": {
            "ok": activity.outcomes.ok,
            "failed": activity.outcomes.failed,
            "server": activity.outcomes.server,
            "network": activity.outcomes.network,
        },
        "endpoints": activity.endpoints.iter().map(|e| serde_json::json!({
            "endpoint": e.endpoint,
            "count": e.count,
            "failures": e.failures,
            "avg_duration_ms": e.avg_duration_ms,
            "last_status": e.last_status,
        })).collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// orgdash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective orgdash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.orgdash/config.toml", global_exists);
    print_source(".orgdash.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "ORGDASH_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.orgdash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to point orgdash at your backend.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Read one line from stdin after printing `label` to stderr.
fn prompt(label: &str) -> Result<String> {
    eprint!("{label}");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Format a number with comma separators for readability.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Horizontal bar for a percentage, `width` cells at 100%.
fn bar(pct: f64, width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn yes_no(flag: bool) -> colored::ColoredString {
    if flag { "yes".green() } else { "no".dimmed() }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
        assert_eq!(truncate("Zoë Ångström", 4), "Zoë…");
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.0, 4), "░░░░");
        assert_eq!(bar(50.0, 4), "██░░");
        assert_eq!(bar(300.0, 4), "████");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Table);
    }

    #[test]
    fn auth_errors_point_to_login() {
        let err = FetchError::new(ErrorKind::Auth, "You need to login to view reports", "401");
        let lines = error_lines(&err, false);
        assert_eq!(lines[0], "✗ Authentication Required");
        assert!(lines.iter().any(|l| l.contains("orgdash login")));
        assert!(!lines.iter().any(|l| l.contains("retry")));
    }

    #[test]
    fn production_hides_raw_detail() {
        let err = FetchError::new(
            ErrorKind::Server,
            "Call to undefined method Org::stats()",
            "server error (HTTP 500): Call to undefined method Org::stats()",
        );

        let hidden = error_lines(&err, false);
        assert!(hidden.iter().any(|l| l.contains(GENERIC_FAILURE)));
        assert!(!hidden.iter().any(|l| l.contains("undefined method")));

        let shown = error_lines(&err, true);
        assert!(shown.iter().any(|l| l.contains("Details: server error")));
        assert!(shown.last().is_some_and(|l| l.contains("retry")));
    }
}
