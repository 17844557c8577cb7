use crate::interfaces::{RunStep, StepStatus, SuspectScore};
use chrono::Local;
use colored::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

/// Diagnostics subscriber for the binaries; `RUST_LOG` overrides the
/// default `warn` level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .try_init();
}

static FILE_LOGGING: AtomicBool = AtomicBool::new(false);

const PROGRESS_FRAMES: [&str; 7] = [
    "▰▱▱▱▱▱▱",
    "▰▰▱▱▱▱▱",
    "▰▰▰▱▱▱▱",
    "▰▰▰▰▱▱▱",
    "▰▰▰▰▰▱▱",
    "▰▰▰▰▰▰▱",
    "▰▰▰▰▰▰▰",
];

pub struct Logger;

impl Logger {
    /// File output is off until a binary turns it on.
    pub fn set_file_logging(enabled: bool) {
        FILE_LOGGING.store(enabled, Ordering::Relaxed);
    }

    fn get_logs_dir() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("logs")
    }

    fn get_log_file_name() -> PathBuf {
        let date = Local::now().format("%Y-%m-%d").to_string();
        Self::get_logs_dir().join(format!("bundle-finder-{}.log", date))
    }

    fn write_to_file(message: &str) {
        if !FILE_LOGGING.load(Ordering::Relaxed) {
            return;
        }
        let _ = (|| -> std::io::Result<()> {
            fs::create_dir_all(Self::get_logs_dir())?;
            let entry = format!("[{}] {}\n", Local::now().to_rfc3339(), message);
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(Self::get_log_file_name())?;
            file.write_all(entry.as_bytes())
        })();
    }

    pub fn format_address(address: &str) -> String {
        if address.len() >= 10 {
            format!("{}...{}", &address[..6], &address[address.len() - 4..])
        } else {
            address.to_string()
        }
    }

    pub fn header(title: &str) {
        println!("\n{}", "━".repeat(70).cyan());
        println!("{}", format!("  {}", title).cyan().bold());
        println!("{}\n", "━".repeat(70).cyan());
        Self::write_to_file(&format!("HEADER: {}", title));
    }

    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
        Self::write_to_file(&format!("INFO: {}", message));
    }

    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
        Self::write_to_file(&format!("SUCCESS: {}", message));
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
        Self::write_to_file(&format!("WARNING: {}", message));
    }

    pub fn error(message: &str) {
        println!("{} {}", "✗".red(), message);
        Self::write_to_file(&format!("ERROR: {}", message));
    }

    pub fn separator() {
        println!("{}", "─".repeat(70).bright_black());
    }

    pub fn clear_line() {
        print!("\r{}\r", " ".repeat(100));
        let _ = std::io::stdout().flush();
    }

    pub fn startup(targets: &[String], chain_id: &str, token_limit: usize, history_limit: usize) {
        println!("\n{}", "━".repeat(70).cyan());
        println!("{}", "  🕵  BUNDLE FINDER - sock-puppet detection".cyan().bold());
        println!("{}", "━".repeat(70).cyan());
        println!("{}", format!("   Chain:          {}", chain_id).bright_black());
        println!("{}", format!("   Tokens/target:  {}", token_limit).bright_black());
        println!("{}", format!("   History window: {}", history_limit).bright_black());
        println!("{}", "\n📊 Targets:".cyan());
        for (index, address) in targets.iter().enumerate() {
            println!("{}", format!("   {}. {}", index + 1, address).bright_black());
        }
        println!();
        Self::write_to_file(&format!(
            "STARTUP: chain={} targets={} tokens={} history={}",
            chain_id,
            targets.len(),
            token_limit,
            history_limit
        ));
    }

    pub fn target(index: usize, total: usize, address: &str) {
        println!(
            "\n{} {}",
            format!("[{}/{}]", index, total).yellow().bold(),
            format!("Analyzing target: {}", address).white().bold()
        );
        println!("{}", "═".repeat(60).bright_black());
        Self::write_to_file(&format!("TARGET: {}", address));
    }

    /// Single overwritten line while tokens are being scanned.
    pub fn progress(index: usize, total: usize, symbol: &str) {
        let frame = PROGRESS_FRAMES[index % PROGRESS_FRAMES.len()];
        print!(
            "\r    {} {} {}...",
            frame.cyan(),
            format!("[{}/{}]", index, total).bright_black(),
            symbol
        );
        let _ = std::io::stdout().flush();
    }

    pub fn step(step: &RunStep) {
        let (icon, name) = match step.status {
            StepStatus::Ok => ("[✓]".green(), step.name.green()),
            StepStatus::Running => ("[~]".cyan(), step.name.cyan()),
            StepStatus::Failed => ("[X]".red(), step.name.red()),
            StepStatus::Empty | StepStatus::Disabled => ("[ ]".yellow(), step.name.yellow()),
        };
        println!("{} {} {}", icon, name, step.message.bright_black());
        Self::write_to_file(&format!("STEP: {} [{:?}] {}", step.name, step.status, step.message));
    }

    pub fn top_suspects(suspects: &[SuspectScore], top_n: usize, threshold: f64) {
        println!("\n{}", format!("🏆 TOP {} SUSPECTS for this target:", top_n).magenta().bold());
        println!("{:<8} | {:<6} | {:<45}", "Score", "Count", "Suspect Address");
        println!("{}", "-".repeat(65));
        for suspect in suspects.iter().take(top_n) {
            let line = format!(
                "{:<8} | {:<6} | {:<45}",
                format!("{:.2}", suspect.score),
                suspect.count,
                suspect.suspect_address
            );
            if suspect.is_bundle(threshold) {
                println!("{}", line.red().bold());
            } else {
                println!("{}", line.bright_black());
            }
            Self::write_to_file(&format!(
                "SUSPECT: {} score={:.4} count={}/{}",
                suspect.suspect_address, suspect.score, suspect.count, suspect.total_analyzed
            ));
        }
    }

    pub fn verdict(bundle_count: usize, threshold: f64) {
        if bundle_count > 0 {
            let message = format!(
                "⚠ WARNING: {} SUSPECT(S) IDENTIFIED (Score ≥ {})",
                bundle_count, threshold
            );
            println!("\n{}", message.red().bold());
            Self::write_to_file(&format!("VERDICT: {}", message));
        } else {
            let message = format!("✓ SYSTEM CLEAN: No Bundle Detected (All scores < {})", threshold);
            println!("\n{}", message.green().bold());
            Self::write_to_file(&format!("VERDICT: {}", message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_can_run_twice() {
        init_tracing();
        init_tracing();
    }

    #[test]
    fn format_address_shortens_long_values() {
        assert_eq!(
            Logger::format_address("0x8d73a36d78e2ae4a437053c9ce3be70d483ab74d"),
            "0x8d73...b74d"
        );
        assert_eq!(Logger::format_address("short"), "short");
    }
}
