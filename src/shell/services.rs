//! systemctl handlers
//!
//! Units map onto the simulated process table by name: any process can
//! be treated as a service. `.service` suffixes are accepted and
//! stripped.

use super::CommandResult;
use crate::sim::{ProcState, SimEnv};

pub fn systemctl(env: &mut SimEnv, args: &[String]) -> CommandResult {
    if args.len() < 2 {
        return CommandResult::usage("systemctl: missing verb or unit");
    }
    let verb = args[0].to_lowercase();
    let unit = args[1].trim_end_matches(".service").to_lowercase();

    let Some((pid, proc)) = env.process_by_name(&unit) else {
        return CommandResult::not_found(
            format!("Unit {}.service could not be found.", unit),
            &unit,
        );
    };
    let state = proc.state;
    let command = proc.command.clone();

    match verb.as_str() {
        "status" => CommandResult::ok(render_status(&unit, pid, state, &command)),
        "start" => match state {
            ProcState::Running => CommandResult::wrong_state(
                format!("{}.service is already active.", unit),
                &format!("{} already running", unit),
            ),
            _ => {
                env.set_process_state(pid, ProcState::Running);
                CommandResult::ok_with("", format!("{}.service started", unit))
            }
        },
        "stop" => match state {
            ProcState::Running => {
                env.set_process_state(pid, ProcState::Stopped);
                CommandResult::ok_with("", format!("{}.service stopped", unit))
            }
            _ => CommandResult::wrong_state(
                format!("{}.service is not running.", unit),
                &format!("{} not running", unit),
            ),
        },
        "restart" => {
            // restart is legal from any state and always lands on running
            env.set_process_state(pid, ProcState::Running);
            CommandResult::ok_with("", format!("{}.service restarted", unit))
        }
        _ => CommandResult::usage(format!("Unknown command verb '{}'.", verb)),
    }
}

/// A `systemctl status` block close enough to the real thing to read logs by.
fn render_status(unit: &str, pid: u32, state: ProcState, command: &str) -> String {
    match state {
        ProcState::Running => format!(
            "● {unit}.service - {unit}\n     \
             Loaded: loaded (/lib/systemd/system/{unit}.service; enabled; vendor preset: enabled)\n     \
             Active: active (running) since Thu 2024-05-23 10:00:00 UTC; 10min ago\n   \
             Main PID: {pid} ({unit})\n      \
             Tasks: 6 (limit: 4579)\n     \
             CGroup: /system.slice/{unit}.service\n             \
             └─{pid} {command}"
        ),
        ProcState::Stopped | ProcState::Killed => format!(
            "● {unit}.service - {unit}\n     \
             Loaded: loaded (/lib/systemd/system/{unit}.service; enabled; vendor preset: enabled)\n     \
             Active: inactive (dead) since Thu 2024-05-23 10:05:13 UTC; 5min ago\n    \
             Process: {pid} ExecStart={command} (code=exited, status=1/FAILURE)\n   \
             Main PID: {pid} (code=exited, status=1/FAILURE)\n      \
             Tasks: 0 (limit: 4579)"
        ),
    }
}
