//! The built-in campaign
//!
//! Four outages against the baseline world: a dead web server, a full
//! disk, a downed container, and a pod the scheduler won't place.

use super::{CommandPattern, Level, Step, StepReward};
use crate::shell::OutputOverrides;
use crate::sim::{ContainerStatus, PodPhase, ProcState, StateChange};

/// Forced `ps aux` output for level one: the narrative wants the player
/// to see apache alive-but-wedged, not the generic process dump.
const PS_AUX_LEVEL_ONE: &str = "USER       PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND\n\
root         1  0.0  0.1 106708  6908 ?        Ss   May20   0:01 /sbin/init\n\
sysadmin  1234  0.5  2.0 200000 150000 ?       S    10:30   0:05 /usr/sbin/apache2 -k start\n\
root      5678  0.0  0.1  25000  1200 ?        S    May20   0:00 /usr/bin/python3 /opt/monitoring/monitor.py";

pub fn levels() -> Vec<Level> {
    vec![
        web_server_down(),
        disk_space_full(),
        container_down(),
        pending_pod(),
    ]
}

fn web_server_down() -> Level {
    let mut diagnose_overrides = OutputOverrides::new();
    diagnose_overrides.insert("ps aux".to_string(), PS_AUX_LEVEL_ONE.to_string());

    Level {
        id: "level_01_web_server_down".into(),
        title: "Urgent: Web Server Down!".into(),
        description: "The corporate website is completely unreachable. Customers are furious! \
                      Identify the web server process, then bring the service back up."
            .into(),
        steps: vec![
            Step {
                task: "Find the Apache process (PID 1234). `ps aux` shows every process; \
                       `systemctl status apache2` works too."
                    .into(),
                expected: vec![
                    CommandPattern::new("ps aux"),
                    CommandPattern::new("systemctl status apache2"),
                ],
                on_success: StepReward {
                    message: "There it is — apache2, PID 1234, and it's not serving anything."
                        .into(),
                    xp: 25,
                    state_changes: vec![],
                },
                hint_on_fail: "Use 'ps aux' to see all running processes.".into(),
                output_overrides: diagnose_overrides,
            },
            Step {
                task: "Restart the apache2 service.".into(),
                expected: vec![
                    CommandPattern::new("systemctl restart apache2"),
                    CommandPattern::new("sudo systemctl restart apache2"),
                ],
                on_success: StepReward {
                    message: "You restarted Apache! The website is back online.".into(),
                    xp: 50,
                    state_changes: vec![StateChange::ProcessState {
                        pid: 1234,
                        state: ProcState::Running,
                    }],
                },
                hint_on_fail: "To restart a service: 'systemctl restart <service_name>'.".into(),
                output_overrides: OutputOverrides::new(),
            },
        ],
    }
}

fn disk_space_full() -> Level {
    Level {
        id: "level_02_disk_space_full".into(),
        title: "Disk Space Crisis!".into(),
        description: "Alert! The root filesystem is at 95% and /var/log is to blame. Services \
                      are failing because nothing can write. Find the largest log file and \
                      delete it — carefully."
            .into(),
        steps: vec![
            Step {
                task: "Measure the damage: check disk usage overall or under /var/log.".into(),
                expected: vec![
                    CommandPattern::new("df -h"),
                    CommandPattern::new("du -sh /var/log"),
                    CommandPattern::new("du -sh /var/log/*"),
                ],
                on_success: StepReward {
                    message: "1.4G of syslog. That's your culprit.".into(),
                    xp: 25,
                    state_changes: vec![],
                },
                hint_on_fail: "'df -h' shows filesystem usage; 'du -sh <dir>' sizes a directory."
                    .into(),
                output_overrides: OutputOverrides::new(),
            },
            Step {
                task: "Delete the runaway log file.".into(),
                expected: vec![
                    CommandPattern::new("rm /var/log/syslog"),
                    CommandPattern::new("sudo rm /var/log/syslog"),
                ],
                on_success: StepReward {
                    message: "Disk space cleared! The log service is functioning normally again."
                        .into(),
                    xp: 75,
                    state_changes: vec![
                        StateChange::DeletePath {
                            path: "/var/log/syslog".into(),
                        },
                        StateChange::SetMetric {
                            name: "disk_usage_pct".into(),
                            value: 40,
                        },
                    ],
                },
                hint_on_fail: "'rm <path>' deletes a file. The hog is /var/log/syslog.".into(),
                output_overrides: OutputOverrides::new(),
            },
        ],
    }
}

fn container_down() -> Level {
    Level {
        id: "level_03_container_down".into(),
        title: "Production Container Down".into(),
        description: "The production web app runs in Docker, and monitoring says it's gone. \
                      A plain 'docker ps' looks suspiciously empty of it."
            .into(),
        steps: vec![
            Step {
                task: "List all containers, including the ones that exited.".into(),
                expected: vec![CommandPattern::new("docker ps -a")],
                on_success: StepReward {
                    message: "web_app_prod exited two hours ago with status 1.".into(),
                    xp: 25,
                    state_changes: vec![],
                },
                hint_on_fail: "'docker ps' only shows running containers. There's a flag for the rest."
                    .into(),
                output_overrides: OutputOverrides::new(),
            },
            Step {
                task: "Check its logs, then start the container again.".into(),
                expected: vec![
                    CommandPattern::new("docker start web_app_prod"),
                    CommandPattern::new("docker start a1b2c3d4e5f6"),
                ],
                on_success: StepReward {
                    message: "web_app_prod is up and serving traffic again.".into(),
                    xp: 50,
                    state_changes: vec![
                        StateChange::ContainerStatus {
                            id: "a1b2c3d4e5f6".into(),
                            status: ContainerStatus::Running,
                        },
                        StateChange::AppendContainerLog {
                            id: "a1b2c3d4e5f6".into(),
                            line: "[2024-05-23 12:00:00] NGINX: Worker process started.".into(),
                        },
                    ],
                },
                hint_on_fail: "'docker logs <name>' explains the exit; 'docker start <name>' brings it back."
                    .into(),
                output_overrides: OutputOverrides::new(),
            },
        ],
    }
}

fn pending_pod() -> Level {
    Level {
        id: "level_04_pending_pod".into(),
        title: "The Pod That Wouldn't Schedule".into(),
        description: "The backend deployment has a pod stuck in Pending and the API is \
                      throwing 502s. Figure out why the scheduler won't place it, then fix \
                      the deployment."
            .into(),
        steps: vec![
            Step {
                task: "Survey the cluster's pods.".into(),
                expected: vec![CommandPattern::new("kubectl get pods")],
                on_success: StepReward {
                    message: "backend-efgh-67890 is Pending while everything else runs.".into(),
                    xp: 25,
                    state_changes: vec![],
                },
                hint_on_fail: "'kubectl get pods' lists pods and their phases.".into(),
                output_overrides: OutputOverrides::new(),
            },
            Step {
                task: "Describe the stuck pod to see the scheduler's events.".into(),
                expected: vec![CommandPattern::new("kubectl describe pod backend-efgh-67890")],
                on_success: StepReward {
                    message: "FailedScheduling: insufficient CPU. The deployment needs room."
                        .into(),
                    xp: 25,
                    state_changes: vec![],
                },
                hint_on_fail: "'kubectl describe pod <name>' shows the event log at the bottom."
                    .into(),
                output_overrides: OutputOverrides::new(),
            },
            Step {
                task: "Scale the backend deployment to 2 replicas.".into(),
                expected: vec![CommandPattern::new(
                    "kubectl scale deployment backend --replicas=2",
                )],
                on_success: StepReward {
                    message: "Scaled. The scheduler places the pod and the API recovers.".into(),
                    xp: 75,
                    state_changes: vec![
                        StateChange::ScaleDeployment {
                            name: "backend".into(),
                            replicas: 2,
                        },
                        StateChange::PodPhase {
                            name: "backend-efgh-67890".into(),
                            phase: PodPhase::Running,
                        },
                        StateChange::AppendPodLog {
                            name: "backend-efgh-67890".into(),
                            line: "backend listening on :8080".into(),
                        },
                    ],
                },
                hint_on_fail: "'kubectl scale deployment <name> --replicas=<count>'.".into(),
                output_overrides: OutputOverrides::new(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::pattern::best_match;

    #[test]
    fn every_catalog_level_validates() {
        let set = crate::game::LevelSet::new(levels()).unwrap();
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn sudo_variants_are_accepted_where_declared() {
        let level = web_server_down();
        let expected = &level.steps[1].expected;
        assert!(best_match(expected, "sudo systemctl restart apache2").is_some());
        assert!(best_match(expected, "systemctl restart apache2").is_some());
        assert!(best_match(expected, "systemctl restart nginx").is_none());
    }

    #[test]
    fn level_one_forces_the_narrative_ps_output() {
        let level = web_server_down();
        let forced = level.steps[0].output_overrides.get("ps aux").unwrap();
        assert!(forced.contains("sysadmin  1234"));
    }
}
