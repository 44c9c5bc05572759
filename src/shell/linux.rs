//! Plain Linux utility handlers
//!
//! Each handler validates its arguments, queries or mutates the
//! environment, and formats output the way the real tool would. Mutating
//! handlers go through the environment's apply operations, so later
//! queries see the change.

use super::CommandResult;
use crate::sim::{fs, SimEnv};

/// Split args into flags (tokens starting with `-`) and operands.
fn split_args(args: &[String]) -> (Vec<&str>, Vec<&str>) {
    let mut flags = Vec::new();
    let mut operands = Vec::new();
    for a in args {
        if a.starts_with('-') {
            flags.push(a.as_str());
        } else {
            operands.push(a.as_str());
        }
    }
    (flags, operands)
}

/// Human-readable size the way `du -h`/`ls -lh` print it.
fn human_size(bytes: u64) -> String {
    const G: u64 = 1 << 30;
    const M: u64 = 1 << 20;
    const K: u64 = 1 << 10;
    if bytes >= G {
        format!("{:.1}G", bytes as f64 / G as f64)
    } else if bytes >= M {
        format!("{:.1}M", bytes as f64 / M as f64)
    } else if bytes >= K {
        format!("{:.1}K", bytes as f64 / K as f64)
    } else {
        format!("{}B", bytes)
    }
}

pub fn ls(env: &SimEnv, args: &[String]) -> CommandResult {
    let (flags, operands) = split_args(args);
    let long = flags.iter().any(|f| f.contains('l'));
    let path = operands.first().copied().unwrap_or("/");

    let Some(node) = env.fs.node_at(path) else {
        return CommandResult::not_found(
            format!("ls: cannot access '{}': No such file or directory", path),
            path,
        );
    };

    if !node.is_dir() {
        // `ls <file>` just echoes the path
        let line = if long {
            format!("{} {:>10} {}", node.mode_string(), node.size(), path)
        } else {
            path.to_string()
        };
        return CommandResult::ok(line);
    }

    let entries = env.fs.list_dir(path).unwrap_or_default();
    let lines: Vec<String> = if long {
        let width = entries
            .iter()
            .map(|(_, n)| n.size().to_string().len())
            .max()
            .unwrap_or(1);
        entries
            .iter()
            .map(|(name, n)| format!("{} {:>w$} {}", n.mode_string(), n.size(), name, w = width))
            .collect()
    } else {
        entries.iter().map(|(name, _)| name.to_string()).collect()
    };
    CommandResult::ok(lines.join("\n"))
}

pub fn cd(env: &SimEnv, args: &[String]) -> CommandResult {
    let Some(path) = args.first() else {
        return CommandResult::ok_with("", "changed to home directory");
    };
    match env.fs.node_at(path) {
        None => CommandResult::not_found(
            format!("cd: {}: No such file or directory", path),
            path,
        ),
        Some(node) if !node.is_dir() => {
            CommandResult::wrong_state(format!("cd: {}: Not a directory", path), path)
        }
        Some(_) => CommandResult::ok_with("", format!("changed directory to {}", fs::normalize(path))),
    }
}

pub fn cat(env: &SimEnv, args: &[String]) -> CommandResult {
    let (_, operands) = split_args(args);
    let Some(path) = operands.first() else {
        return CommandResult::usage("cat: missing operand");
    };
    match env.fs.node_at(path) {
        None => CommandResult::not_found(
            format!("cat: {}: No such file or directory", path),
            path,
        ),
        Some(node) if node.is_dir() => {
            CommandResult::wrong_state(format!("cat: {}: Is a directory", path), path)
        }
        Some(_) => CommandResult::ok(env.fs.read_file(path).unwrap_or_default()),
    }
}

pub fn grep(env: &SimEnv, args: &[String]) -> CommandResult {
    let (_, operands) = split_args(args);
    if operands.len() < 2 {
        return CommandResult::usage("Usage: grep PATTERN FILE");
    }
    let (pattern, path) = (operands[0], operands[1]);
    let Some(content) = env.fs.read_file(path) else {
        return CommandResult::not_found(
            format!("grep: {}: No such file or directory", path),
            path,
        );
    };
    let matching: Vec<&str> = content.lines().filter(|l| l.contains(pattern)).collect();
    CommandResult::ok(matching.join("\n"))
}

pub fn ps(env: &SimEnv, _args: &[String]) -> CommandResult {
    let mut lines =
        vec!["USER       PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND".to_string()];
    for (pid, proc) in env.processes() {
        lines.push(format!(
            "root    {:>6} {:>4.1} {:>4.1} {:>6} {:>5} ?        {}    10:00   0:00 {}",
            pid,
            proc.cpu,
            proc.mem,
            100_000,
            5_000,
            proc.state.stat_char(),
            proc.command
        ));
    }
    CommandResult::ok(lines.join("\n"))
}

pub fn kill(env: &mut SimEnv, args: &[String]) -> CommandResult {
    let (_, operands) = split_args(args);
    let Some(pid_str) = operands.first() else {
        return CommandResult::usage("kill: usage: kill [-s signal | -p] [-a] pid ...");
    };
    let Ok(pid) = pid_str.parse::<u32>() else {
        return CommandResult::usage(format!(
            "kill: {}: arguments must be process or job IDs",
            pid_str
        ));
    };
    match env.process(pid) {
        None => CommandResult::not_found(
            format!("kill: ({}) - No such process", pid),
            &pid.to_string(),
        ),
        Some(p) if p.state == crate::sim::ProcState::Killed => CommandResult::wrong_state(
            format!("kill: ({}) - No such process", pid),
            &format!("process {} already killed", pid),
        ),
        Some(_) => {
            env.set_process_state(pid, crate::sim::ProcState::Killed);
            CommandResult::ok_with("", format!("process {} killed", pid))
        }
    }
}

pub fn du(env: &SimEnv, args: &[String]) -> CommandResult {
    let (_, operands) = split_args(args);
    let raw_path = operands.last().copied().unwrap_or("/");

    // `du -sh /dir/*` lists each entry of /dir with its size
    if let Some(parent) = raw_path.strip_suffix("/*") {
        let parent = if parent.is_empty() { "/" } else { parent };
        let Some(entries) = env.fs.list_dir(parent) else {
            return CommandResult::not_found(
                format!("du: cannot access '{}': No such file or directory", raw_path),
                parent,
            );
        };
        let lines: Vec<String> = entries
            .iter()
            .map(|(name, node)| {
                format!("{:<7} {}/{}", human_size(node.size()), fs::normalize(parent).trim_end_matches('/'), name)
            })
            .collect();
        return CommandResult::ok(lines.join("\n"));
    }

    match env.fs.node_at(raw_path) {
        None => CommandResult::not_found(
            format!("du: cannot access '{}': No such file or directory", raw_path),
            raw_path,
        ),
        Some(node) => CommandResult::ok(format!(
            "{:<7} {}",
            human_size(node.size()),
            fs::normalize(raw_path)
        )),
    }
}

pub fn df(env: &SimEnv, _args: &[String]) -> CommandResult {
    // Gauge-driven: the root filesystem reflects the disk usage metric,
    // so freeing space via a level's state change shows up here.
    let disk = env.metric("disk_usage_pct").unwrap_or(0);
    let mem = env.metric("mem_usage_pct").unwrap_or(0);
    let total_g = 40u32;
    let used_g = total_g * disk / 100;
    let avail_g = total_g - used_g;

    let lines = vec![
        "Filesystem      Size  Used Avail Use% Mounted on".to_string(),
        format!(
            "/dev/sda1        {}G   {}G   {}G  {}% /",
            total_g, used_g, avail_g, disk
        ),
        format!("tmpfs           4.0G  {:.1}G  {:.1}G  {}% /dev/shm", 4.0 * mem as f64 / 100.0, 4.0 - 4.0 * mem as f64 / 100.0, mem),
    ];
    CommandResult::ok(lines.join("\n"))
}

pub fn rm(env: &mut SimEnv, args: &[String]) -> CommandResult {
    let (flags, operands) = split_args(args);
    let recursive = flags.iter().any(|f| f.contains('r') || f.contains('R'));
    let Some(path) = operands.last() else {
        return CommandResult::usage("rm: missing operand");
    };

    match env.fs.node_at(path) {
        None => CommandResult::not_found(
            format!("rm: cannot remove '{}': No such file or directory", path),
            path,
        ),
        Some(node) if node.is_dir() && !recursive => CommandResult::wrong_state(
            format!("rm: cannot remove '{}': Is a directory", path),
            path,
        ),
        Some(_) => {
            env.fs.remove(path);
            CommandResult::ok_with("", format!("removed '{}'", path))
        }
    }
}

pub fn mkdir(env: &mut SimEnv, args: &[String]) -> CommandResult {
    let (_, operands) = split_args(args);
    let Some(path) = operands.first() else {
        return CommandResult::usage("mkdir: missing operand");
    };
    if env.fs.node_at(path).is_some() {
        return CommandResult::wrong_state(
            format!("mkdir: cannot create directory '{}': File exists", path),
            path,
        );
    }
    if env.fs.mkdir(path) {
        CommandResult::ok_with("", format!("created directory '{}'", path))
    } else {
        CommandResult::not_found(
            format!("mkdir: cannot create directory '{}': No such file or directory", path),
            path,
        )
    }
}

pub fn find(env: &SimEnv, args: &[String]) -> CommandResult {
    // Only the `find <path> -name <pattern>` form is simulated.
    if args.len() < 3 || args[1] != "-name" {
        return CommandResult::usage("find: unsupported syntax. Try 'find <path> -name <filename>'");
    }
    let (start, pattern) = (&args[0], &args[2]);
    match env.fs.find_names(start, pattern) {
        None => CommandResult::not_found(
            format!("find: '{}': No such file or directory", start),
            start,
        ),
        Some(found) if found.is_empty() => CommandResult::ok_with("", "no matching files"),
        Some(found) => CommandResult::ok(found.join("\n")),
    }
}

/// Parse `-nN`, `-n N` and a trailing path; shared by head and tail.
fn line_count_args<'a>(tool: &str, args: &'a [String]) -> Result<(usize, &'a str), CommandResult> {
    let mut count = 10usize;
    let mut path_index = 0;

    if let Some(first) = args.first() {
        if first == "-n" {
            let Some(n) = args.get(1).and_then(|a| a.parse().ok()) else {
                return Err(CommandResult::usage(format!(
                    "{}: invalid number of lines: '{}'",
                    tool,
                    args.get(1).map(String::as_str).unwrap_or("")
                )));
            };
            count = n;
            path_index = 2;
        } else if let Some(rest) = first.strip_prefix("-n") {
            let Ok(n) = rest.parse() else {
                return Err(CommandResult::usage(format!(
                    "{}: invalid number of lines: '{}'",
                    tool, rest
                )));
            };
            count = n;
            path_index = 1;
        }
    }

    match args.get(path_index) {
        Some(path) => Ok((count, path)),
        None => Err(CommandResult::usage(format!("{}: missing operand", tool))),
    }
}

pub fn head(env: &SimEnv, args: &[String]) -> CommandResult {
    let (count, path) = match line_count_args("head", args) {
        Ok(parsed) => parsed,
        Err(result) => return result,
    };
    let Some(content) = env.fs.read_file(path) else {
        return CommandResult::not_found(
            format!("head: cannot open '{}' for reading: No such file or directory", path),
            path,
        );
    };
    let lines: Vec<&str> = content.lines().take(count).collect();
    CommandResult::ok(lines.join("\n"))
}

pub fn tail(env: &SimEnv, args: &[String]) -> CommandResult {
    let (count, path) = match line_count_args("tail", args) {
        Ok(parsed) => parsed,
        Err(result) => return result,
    };
    let Some(content) = env.fs.read_file(path) else {
        return CommandResult::not_found(
            format!("tail: cannot open '{}' for reading: No such file or directory", path),
            path,
        );
    };
    let all: Vec<&str> = content.lines().collect();
    let start = all.len().saturating_sub(count);
    CommandResult::ok(all[start..].join("\n"))
}

pub fn chmod(env: &mut SimEnv, args: &[String]) -> CommandResult {
    let (_, operands) = split_args(args);
    if operands.len() < 2 {
        return CommandResult::usage("chmod: missing operand");
    }
    let (mode_str, path) = (operands[0], operands[1]);
    let Ok(mode) = u32::from_str_radix(mode_str, 8) else {
        return CommandResult::usage(format!("chmod: invalid mode: '{}'", mode_str));
    };
    if env.fs.set_mode(path, mode) {
        CommandResult::ok_with("", format!("mode of '{}' changed to {}", path, mode_str))
    } else {
        CommandResult::not_found(
            format!("chmod: cannot access '{}': No such file or directory", path),
            path,
        )
    }
}

pub fn mv(env: &mut SimEnv, args: &[String]) -> CommandResult {
    let (_, operands) = split_args(args);
    if operands.is_empty() {
        return CommandResult::usage("mv: missing file operand");
    }
    if operands.len() < 2 {
        return CommandResult::usage(format!(
            "mv: missing destination file operand after '{}'",
            operands[0]
        ));
    }
    let (from, to) = (operands[0], operands[1]);
    if env.fs.node_at(from).is_none() {
        return CommandResult::not_found(
            format!("mv: cannot stat '{}': No such file or directory", from),
            from,
        );
    }
    if env.fs.rename(from, to) {
        CommandResult::ok_with("", format!("moved '{}' to '{}'", from, to))
    } else {
        CommandResult::not_found(
            format!("mv: cannot move '{}' to '{}': No such file or directory", from, to),
            to,
        )
    }
}

pub fn cp(env: &mut SimEnv, args: &[String]) -> CommandResult {
    let (_, operands) = split_args(args);
    if operands.is_empty() {
        return CommandResult::usage("cp: missing file operand");
    }
    if operands.len() < 2 {
        return CommandResult::usage(format!(
            "cp: missing destination file operand after '{}'",
            operands[0]
        ));
    }
    let (from, to) = (operands[0], operands[1]);
    if env.fs.node_at(from).is_none() {
        return CommandResult::not_found(
            format!("cp: cannot stat '{}': No such file or directory", from),
            from,
        );
    }
    if env.fs.copy(from, to) {
        CommandResult::ok_with("", format!("copied '{}' to '{}'", from, to))
    } else {
        CommandResult::not_found(
            format!("cp: cannot create '{}': No such file or directory", to),
            to,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::Interpreter;
    use crate::sim::SimEnv;

    fn run(env: &mut SimEnv, line: &str) -> CommandResult {
        Interpreter::new().execute(env, line, None)
    }

    #[test]
    fn ls_lists_directory_entries_sorted() {
        let mut env = SimEnv::baseline();
        let result = run(&mut env, "ls /var/log");
        assert!(result.success);
        assert_eq!(result.output, "auth.log\nkern.log\nsyslog");
    }

    #[test]
    fn ls_after_rm_no_longer_lists_the_entry() {
        let mut env = SimEnv::baseline();
        assert!(run(&mut env, "rm /var/log/syslog").success);
        let listing = run(&mut env, "ls /var/log");
        assert!(!listing.output.contains("syslog"));
    }

    #[test]
    fn rm_on_directory_without_recursive_is_wrong_state() {
        let mut env = SimEnv::baseline();
        let result = run(&mut env, "rm /var/log");
        assert!(!result.success);
        assert_eq!(result.message, "wrong state: /var/log");
        // -r makes it legal
        assert!(run(&mut env, "rm -r /var/log").success);
    }

    #[test]
    fn cat_and_grep_read_file_content() {
        let mut env = SimEnv::baseline();
        let cat = run(&mut env, "cat /var/log/syslog");
        assert!(cat.success);
        assert!(cat.output.contains("No space left on device"));

        let grep = run(&mut env, "grep 'No space' /var/log/syslog");
        assert!(grep.success);
        assert_eq!(
            grep.output,
            "May 22 10:05:11 server apache2[1234]: No space left on device"
        );
    }

    #[test]
    fn cat_missing_file_is_not_found() {
        let mut env = SimEnv::baseline();
        let result = run(&mut env, "cat /var/log/nope");
        assert!(!result.success);
        assert_eq!(result.output, "cat: /var/log/nope: No such file or directory");
        assert_eq!(result.message, "target not found: /var/log/nope");
    }

    #[test]
    fn ps_lists_every_process_with_header() {
        let mut env = SimEnv::baseline();
        let result = run(&mut env, "ps aux");
        assert!(result.success);
        let lines: Vec<&str> = result.output.lines().collect();
        assert!(lines[0].starts_with("USER"));
        assert_eq!(lines.len(), 5); // header + 4 baseline processes
        assert!(result.output.contains("/usr/sbin/apache2 -k start"));
    }

    #[test]
    fn kill_transitions_and_rejects_double_kill() {
        let mut env = SimEnv::baseline();
        assert!(run(&mut env, "kill -9 5678").success);
        let again = run(&mut env, "kill 5678");
        assert!(!again.success);
        assert!(again.message.starts_with("wrong state:"));
    }

    #[test]
    fn du_sums_real_simulated_sizes() {
        let mut env = SimEnv::baseline();
        let total = run(&mut env, "du -sh /var/log");
        assert!(total.output.starts_with("1.4G"));

        let glob = run(&mut env, "du -sh /var/log/*");
        assert!(glob.output.contains("/var/log/syslog"));
        assert!(glob.output.contains("8.0K"));

        // deleting the hog changes what du reports
        run(&mut env, "rm /var/log/syslog");
        let after = run(&mut env, "du -sh /var/log");
        assert!(after.output.starts_with("12.0K"));
    }

    #[test]
    fn df_reflects_the_disk_gauge() {
        let mut env = SimEnv::baseline();
        let before = run(&mut env, "df -h");
        assert!(before.output.contains("95% /"));

        env.set_metric("disk_usage_pct", 40);
        let after = run(&mut env, "df -h");
        assert!(after.output.contains("40% /"));
        assert!(!after.output.contains("95% /"));
    }

    #[test]
    fn mkdir_then_ls_shows_the_directory() {
        let mut env = SimEnv::baseline();
        assert!(run(&mut env, "mkdir /var/log/archive").success);
        assert!(run(&mut env, "ls /var/log").output.contains("archive"));
        let dup = run(&mut env, "mkdir /var/log/archive");
        assert!(!dup.success);
        assert!(dup.output.contains("File exists"));
    }

    #[test]
    fn find_by_name() {
        let mut env = SimEnv::baseline();
        let result = run(&mut env, "find / -name syslog");
        assert_eq!(result.output, "/var/log/syslog");
        let none = run(&mut env, "find /etc -name syslog");
        assert!(none.success);
        assert!(none.output.is_empty());
    }

    #[test]
    fn head_and_tail_slice_lines() {
        let mut env = SimEnv::baseline();
        let head = run(&mut env, "head -n2 /var/log/syslog");
        assert_eq!(head.output.lines().count(), 2);
        assert!(head.output.starts_with("May 22 10:00:01"));

        let tail = run(&mut env, "tail -n 1 /var/log/syslog");
        assert_eq!(tail.output.lines().count(), 1);
        assert!(tail.output.contains("CRON"));
    }

    #[test]
    fn chmod_updates_mode_bits() {
        let mut env = SimEnv::baseline();
        assert!(run(&mut env, "chmod 600 /etc/passwd").success);
        let listing = run(&mut env, "ls -l /etc");
        assert!(listing.output.contains("-rw-------"));
        let bad = run(&mut env, "chmod 9zz /etc/passwd");
        assert!(!bad.success);
        assert_eq!(bad.message, "invalid arguments");
    }

    #[test]
    fn mv_and_cp_between_directories() {
        let mut env = SimEnv::baseline();
        assert!(run(&mut env, "cp /etc/passwd /tmp/passwd.bak").success);
        assert!(run(&mut env, "cat /tmp/passwd.bak").success);
        assert!(run(&mut env, "cat /etc/passwd").success);

        assert!(run(&mut env, "mv /tmp/passwd.bak /home/guest/passwd.bak").success);
        assert!(!run(&mut env, "cat /tmp/passwd.bak").success);
        assert!(run(&mut env, "cat /home/guest/passwd.bak").success);
    }
}
