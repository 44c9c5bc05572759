//! kubectl subcommand handlers

use super::CommandResult;
use crate::sim::{PodPhase, SimEnv};

pub fn kubectl(env: &mut SimEnv, args: &[String]) -> CommandResult {
    let Some(sub) = args.first() else {
        return CommandResult::usage("kubectl: missing command\nSee 'kubectl --help'");
    };
    let rest = &args[1..];

    match sub.to_lowercase().as_str() {
        "get" => get(env, rest),
        "describe" => describe(env, rest),
        "logs" => logs(env, rest),
        "delete" => delete(env, rest),
        "scale" => scale(env, rest),
        other => CommandResult {
            output: format!(
                "kubectl: '{}' is not a kubectl command.\nSee 'kubectl --help'",
                other
            ),
            success: false,
            message: format!("unknown command: kubectl {}", other),
        },
    }
}

fn get(env: &SimEnv, args: &[String]) -> CommandResult {
    let Some(resource) = args.first() else {
        return CommandResult::usage("kubectl get: missing resource type");
    };
    match resource.to_lowercase().as_str() {
        "pods" | "pod" | "po" => {
            let mut lines =
                vec!["NAME                             READY   STATUS             RESTARTS   AGE".to_string()];
            for (name, pod) in env.pods() {
                let ready = if pod.phase == PodPhase::Running { "1/1" } else { "0/1" };
                lines.push(format!(
                    "{:<32} {:<7} {:<18} {:<10} 2h",
                    name, ready, pod.phase, pod.restarts
                ));
            }
            CommandResult::ok(lines.join("\n"))
        }
        "deployments" | "deployment" | "deploy" => {
            let mut lines = vec!["NAME        READY   UP-TO-DATE   AVAILABLE   AGE".to_string()];
            for (name, d) in env.deployments() {
                // ready replicas = pods of this deployment actually Running
                let ready = env
                    .pods()
                    .filter(|(_, p)| p.deployment == *name && p.phase == PodPhase::Running)
                    .count();
                lines.push(format!(
                    "{:<11} {}/{}     {:<12} {:<11} 2d",
                    name, ready, d.replicas, d.replicas, ready
                ));
            }
            CommandResult::ok(lines.join("\n"))
        }
        other => CommandResult::usage(format!(
            "error: the server doesn't have a resource type \"{}\"",
            other
        )),
    }
}

fn describe(env: &SimEnv, args: &[String]) -> CommandResult {
    if args.len() < 2 {
        return CommandResult::usage("kubectl describe: missing resource type or name");
    }
    let resource = args[0].to_lowercase();
    let name = &args[1];
    if resource != "pod" && resource != "pods" {
        return CommandResult::usage(format!(
            "error: the server doesn't have a resource type \"{}\"",
            resource
        ));
    }

    let Some(pod) = env.pod(name) else {
        return CommandResult::not_found(
            format!("Error from server (NotFound): pods \"{}\" not found", name),
            name,
        );
    };

    let events = match pod.phase {
        PodPhase::Pending => {
            "  Type     Reason            Age    From               Message\n  \
             ----     ------            ----   ----               -------\n  \
             Warning  FailedScheduling  5m     default-scheduler  0/1 nodes are available: 1 Insufficient cpu."
        }
        PodPhase::CrashLoopBackOff | PodPhase::Failed => {
            "  Type     Reason            Age    From               Message\n  \
             ----     ------            ----   ----               -------\n  \
             Warning  BackOff           2m     kubelet            Back-off restarting failed container"
        }
        PodPhase::Running => {
            "  Type     Reason            Age    From               Message\n  \
             ----     ------            ----   ----               -------\n  \
             Normal   Pulled            2m     kubelet            Container image already present on machine"
        }
    };

    CommandResult::ok(format!(
        "Name:         {}\nNamespace:    {}\nStatus:       {}\nControlled By:  Deployment/{}\nEvents:\n{}",
        name, pod.namespace, pod.phase, pod.deployment, events
    ))
}

fn logs(env: &SimEnv, args: &[String]) -> CommandResult {
    let Some(name) = args.first() else {
        return CommandResult::usage("kubectl logs: missing pod name");
    };
    match env.pod(name) {
        Some(pod) => CommandResult::ok(pod.logs.join("\n")),
        None => CommandResult::not_found(
            format!("Error from server (NotFound): pods \"{}\" not found", name),
            name,
        ),
    }
}

fn delete(env: &mut SimEnv, args: &[String]) -> CommandResult {
    if args.len() < 2 {
        return CommandResult::usage("kubectl delete: missing resource type or name");
    }
    let resource = args[0].to_lowercase();
    let name = &args[1];
    if resource != "pod" && resource != "pods" {
        return CommandResult::usage(format!(
            "error: the server doesn't have a resource type \"{}\"",
            resource
        ));
    }
    if env.delete_pod(name) {
        CommandResult::ok_with(
            format!("pod \"{}\" deleted", name),
            format!("pod {} deleted", name),
        )
    } else {
        CommandResult::not_found(
            format!("Error from server (NotFound): pods \"{}\" not found", name),
            name,
        )
    }
}

fn scale(env: &mut SimEnv, args: &[String]) -> CommandResult {
    // kubectl scale deployment <name> --replicas=<count>
    let usage = "Usage: kubectl scale deployment <name> --replicas=<count>";
    if args.len() < 3 || args[0].to_lowercase() != "deployment" {
        return CommandResult::usage(usage);
    }
    let name = &args[1];
    let Some(count) = args[2].strip_prefix("--replicas=") else {
        return CommandResult::usage(usage);
    };
    let Ok(replicas) = count.parse::<u32>() else {
        return CommandResult::usage(format!("error: invalid replicas count: '{}'", count));
    };
    if env.scale_deployment(name, replicas) {
        CommandResult::ok_with(
            format!("deployment.apps/{} scaled", name),
            format!("deployment {} scaled to {} replicas", name, replicas),
        )
    } else {
        CommandResult::not_found(
            format!(
                "Error from server (NotFound): deployments.apps \"{}\" not found",
                name
            ),
            name,
        )
    }
}
