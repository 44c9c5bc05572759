//! docker subcommand handlers
//!
//! Containers resolve by exact name or id prefix, like the real CLI.
//! `docker ps` hides exited containers unless `-a` is given.

use super::CommandResult;
use crate::sim::{Container, ContainerStatus, SimEnv};
use serde_json::json;

pub fn docker(env: &mut SimEnv, args: &[String]) -> CommandResult {
    let Some(sub) = args.first() else {
        return CommandResult::usage("docker: missing command\nSee 'docker --help'");
    };
    let rest = &args[1..];

    match sub.to_lowercase().as_str() {
        "ps" => ps(env, rest),
        "start" => set_status(env, rest, "start", ContainerStatus::Running),
        "stop" => set_status(env, rest, "stop", ContainerStatus::Exited),
        "restart" => restart(env, rest),
        "logs" => logs(env, rest),
        "inspect" => inspect(env, rest),
        other => CommandResult {
            output: format!(
                "docker: '{}' is not a docker command.\nSee 'docker --help'",
                other
            ),
            success: false,
            message: format!("unknown command: docker {}", other),
        },
    }
}

/// Truncated COMMAND column, derived from the image.
fn entrypoint(container: &Container) -> String {
    let base = container.image.split(':').next().unwrap_or("sh");
    format!("\"{}…\"", base)
}

fn ps(env: &SimEnv, args: &[String]) -> CommandResult {
    let all = args.iter().any(|a| a == "-a" || a == "--all");
    let mut lines = vec![
        "CONTAINER ID   IMAGE          COMMAND      CREATED      STATUS                      PORTS            NAMES"
            .to_string(),
    ];
    for (id, c) in env.containers() {
        if !all && c.status != ContainerStatus::Running {
            continue;
        }
        lines.push(format!(
            "{:<14} {:<14} {:<12} 2 days ago   {:<27} {:<16} {}",
            &id[..12.min(id.len())],
            c.image,
            entrypoint(c),
            c.status.to_string(),
            c.ports,
            c.name
        ));
    }
    CommandResult::ok(lines.join("\n"))
}

fn set_status(
    env: &mut SimEnv,
    args: &[String],
    verb: &str,
    target: ContainerStatus,
) -> CommandResult {
    let Some(name) = args.first() else {
        return CommandResult::usage(format!("\"docker {}\" requires at least 1 argument.", verb));
    };
    let Some((_, container)) = env.container(name) else {
        return CommandResult::not_found(format!("Error: No such container: {}", name), name);
    };
    if container.status == target {
        let detail = match target {
            ContainerStatus::Running => format!("container {} already running", name),
            _ => format!("container {} not running", name),
        };
        return CommandResult::wrong_state(
            format!("Error response from daemon: container {} is already in that state", name),
            &detail,
        );
    }
    env.set_container_status(name, target);
    let past = if verb == "stop" { "stopped" } else { "started" };
    // docker echoes the argument back on success
    CommandResult::ok_with(name.clone(), format!("container {} {}", name, past))
}

fn restart(env: &mut SimEnv, args: &[String]) -> CommandResult {
    let Some(name) = args.first() else {
        return CommandResult::usage("\"docker restart\" requires at least 1 argument.");
    };
    let Some((_, container)) = env.container(name) else {
        return CommandResult::not_found(format!("Error: No such container: {}", name), name);
    };
    // restarting something that is not running is a wrong-state error;
    // an exited container comes back with `docker start`
    if container.status != ContainerStatus::Running {
        return CommandResult::wrong_state(
            format!("Error response from daemon: container {} is not running", name),
            &format!("container {} not running", name),
        );
    }
    env.set_container_status(name, ContainerStatus::Running);
    CommandResult::ok_with(name.clone(), format!("container {} restarted", name))
}

fn logs(env: &SimEnv, args: &[String]) -> CommandResult {
    let Some(name) = args.first() else {
        return CommandResult::usage("\"docker logs\" requires exactly 1 argument.");
    };
    match env.container(name) {
        Some((_, c)) => CommandResult::ok(c.logs.join("\n")),
        None => CommandResult::not_found(format!("Error: No such container: {}", name), name),
    }
}

fn inspect(env: &SimEnv, args: &[String]) -> CommandResult {
    let Some(name) = args.first() else {
        return CommandResult::usage("\"docker inspect\" requires at least 1 argument.");
    };
    let Some((id, c)) = env.container(name) else {
        return CommandResult::not_found(format!("Error: No such object: {}", name), name);
    };
    let doc = json!([{
        "Id": id,
        "Name": format!("/{}", c.name),
        "Image": c.image,
        "State": {
            "Status": match c.status {
                ContainerStatus::Running => "running",
                ContainerStatus::Exited => "exited",
                ContainerStatus::Restarting => "restarting",
            },
            "Running": c.status == ContainerStatus::Running,
        },
        "Ports": c.ports,
    }]);
    // keys serialize in sorted order, so inspect output is replay-stable
    match serde_json::to_string_pretty(&doc) {
        Ok(text) => CommandResult::ok(text),
        Err(_) => CommandResult::ok(""),
    }
}
