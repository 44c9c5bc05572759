//! Terminal presentation
//!
//! Line-oriented rendering with crossterm styling. The core never calls
//! into this module; the session loop feeds it text and success/failure
//! signals.

use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};

/// ASCII banner shown once at startup
pub const BANNER: &str = r#"
╔═══════════════════════════════════════════════════════════╗
║   TERMINAL TROUBLESHOOTER                                 ║
║   One server. Many outages. You and a shell.              ║
╚═══════════════════════════════════════════════════════════╝
"#;

pub fn banner() {
    println!("{}", BANNER.cyan());
    let started = chrono::Local::now().format("%H:%M");
    println!("{}", format!("Shift started at {}. Good luck, sysadmin.", started).dim());
}

/// Level header with narrative text.
pub fn scenario(number: usize, title: &str, description: &str) {
    println!();
    println!("{}", format!("── Level {}: {} ──", number, title).magenta().bold());
    println!("{}", description);
}

pub fn task(text: &str) {
    println!("{} {}", "TASK".yellow().bold(), text);
}

/// Raw simulated command output, dimmed to read like a terminal-in-a-terminal.
pub fn output_block(text: &str) {
    if !text.is_empty() {
        println!("{}", text.to_string().dim());
    }
}

pub fn success(message: &str) {
    println!("{} {}", "✔".green().bold(), message.to_string().green());
}

pub fn error(message: &str) {
    println!("{} {}", "✘".red().bold(), message);
}

pub fn hint(text: &str) {
    println!("{} {}", "HINT".blue().bold(), text);
}

pub fn xp(total: u32, awarded: u32) {
    println!("{}", format!("+{} XP (total {})", awarded, total).yellow());
}

pub fn level_complete() {
    println!("{}", "Level complete!".green().bold());
}

pub fn game_complete(total_xp: u32) {
    println!();
    println!("{}", "Congratulations! Every outage resolved.".green().bold());
    println!("{}", format!("Final XP: {}", total_xp).yellow().bold());
    println!("{}", "Thanks for playing Terminal Troubleshooter!".dim());
}

/// Print the prompt and read one line. `None` means EOF (player hung up).
pub fn prompt() -> io::Result<Option<String>> {
    print!("{}", "sysadmin@server".green().bold());
    print!("{}", ":".white());
    print!("{}", "~".blue().bold());
    print!("$ ");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end().to_string()))
}
