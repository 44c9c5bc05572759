//! The default simulated server
//!
//! Every session starts from the same troubled machine: apache down,
//! `/var/log` nearly full, one container exited, one pod stuck Pending.
//! The level catalog is written against exactly this world.

use super::{Container, ContainerStatus, FsNode, Pod, PodPhase, ProcState, Process, SimEnv};

const SYSLOG: &str = "May 22 10:00:01 server systemd[1]: Started Session 1 of user sysadmin.\n\
May 22 10:05:05 server apache2[1234]: AH00558: apache2: Could not reliably determine the server's fully qualified domain name\n\
May 22 10:05:10 server apache2[1234]: (98)Address already in use: AH00072: make_sock: could not bind to address 0.0.0.0:80\n\
May 22 10:05:11 server apache2[1234]: No space left on device\n\
May 22 10:05:12 server systemd[1]: apache2.service: Control process exited, code=exited status=1\n\
May 22 10:05:13 server systemd[1]: apache2.service: Failed with result 'exit-code'.\n\
May 22 10:05:15 server CRON[12345]: (root) CMD (command -v dracut > /dev/null && dracut -c /etc/dracut.conf --force --kver 5.15.0-78-generic)";

const PASSWD: &str = "root:x:0:0:root:/root:/bin/bash\n\
sysadmin:x:1000:1000:sysadmin:/home/sysadmin:/bin/bash";

/// Build the baseline world.
pub fn build() -> SimEnv {
    let mut env = SimEnv::empty();

    build_filesystem(&mut env);
    build_processes(&mut env);
    build_containers(&mut env);
    build_kubernetes(&mut env);

    env.set_metric("disk_usage_pct", 95);
    env.set_metric("mem_usage_pct", 62);

    env
}

fn build_filesystem(env: &mut SimEnv) {
    let fs = &mut env.fs;
    for dir in [
        "/bin",
        "/etc",
        "/etc/apache2",
        "/etc/nginx",
        "/etc/my_app_conf",
        "/home",
        "/home/sysadmin",
        "/home/sysadmin/reports",
        "/home/sysadmin/documents",
        "/home/guest",
        "/var",
        "/var/log",
        "/var/www",
        "/var/www/html",
        "/tmp",
    ] {
        fs.mkdir(dir);
    }

    fs.insert("/etc/apache2/apache2.conf", FsNode::file("ServerRoot \"/etc/apache2\"\nListen 80"));
    fs.insert("/etc/nginx/nginx.conf", FsNode::file("worker_processes auto;"));
    fs.insert("/etc/my_app_conf/app.conf", FsNode::file("mode=production"));
    fs.insert("/etc/passwd", FsNode::file(PASSWD));
    fs.insert(
        "/home/sysadmin/documents/important_doc.txt",
        FsNode::file("Sensitive data here."),
    );
    fs.insert(
        "/var/www/html/index.html",
        FsNode::file("<html><body><h1>It works!</h1></body></html>"),
    );

    // The disk hog. Size is declared, content is just the interesting lines.
    fs.insert("/var/log/syslog", FsNode::file_sized(SYSLOG, 1_503_238_553));
    fs.insert(
        "/var/log/auth.log",
        FsNode::file_sized("May 22 09:58:44 server sshd[880]: Accepted publickey for sysadmin", 8_192),
    );
    fs.insert(
        "/var/log/kern.log",
        FsNode::file_sized("May 22 09:00:00 server kernel: [    0.000000] Linux version 5.15.0-78-generic", 4_096),
    );
}

fn build_processes(env: &mut SimEnv) {
    env.add_process(
        1,
        Process {
            name: "systemd".into(),
            state: ProcState::Running,
            command: "/sbin/init".into(),
            cpu: 0.0,
            mem: 0.1,
        },
    );
    env.add_process(
        1234,
        Process {
            name: "apache2".into(),
            state: ProcState::Stopped,
            command: "/usr/sbin/apache2 -k start".into(),
            cpu: 0.0,
            mem: 2.0,
        },
    );
    env.add_process(
        5678,
        Process {
            name: "monitor.py".into(),
            state: ProcState::Running,
            command: "/usr/bin/python3 /opt/monitoring/monitor.py".into(),
            cpu: 0.3,
            mem: 0.4,
        },
    );
    env.add_process(
        9000,
        Process {
            name: "nginx".into(),
            state: ProcState::Running,
            command: "/usr/sbin/nginx -g \"daemon on;\"".into(),
            cpu: 0.1,
            mem: 0.8,
        },
    );
}

fn build_containers(env: &mut SimEnv) {
    env.add_container(
        "a1b2c3d4e5f6",
        Container {
            name: "web_app_prod".into(),
            image: "nginx:latest".into(),
            status: ContainerStatus::Exited,
            ports: "80->80/tcp".into(),
            logs: vec![
                "[2024-05-23 10:00:00] NGINX: Worker process started.".into(),
                "[2024-05-23 10:00:01] NGINX: Exiting due to configuration error.".into(),
            ],
        },
    );
    env.add_container(
        "b2c3d4e5f6a7",
        Container {
            name: "db_service".into(),
            image: "postgres:13".into(),
            status: ContainerStatus::Running,
            ports: "5432->5432/tcp".into(),
            logs: vec![
                "[2024-05-23 10:00:00] DB_SERVICE: Starting up...".into(),
                "[2024-05-23 10:00:05] DB_SERVICE: Connection successful.".into(),
            ],
        },
    );
}

fn build_kubernetes(env: &mut SimEnv) {
    env.add_pod(
        "frontend-abcd-12345",
        Pod {
            namespace: "default".into(),
            phase: PodPhase::Running,
            deployment: "frontend".into(),
            restarts: 0,
            logs: vec!["frontend listening on :3000".into()],
        },
    );
    env.add_pod(
        "backend-efgh-67890",
        Pod {
            namespace: "default".into(),
            phase: PodPhase::Pending,
            deployment: "backend".into(),
            restarts: 0,
            logs: vec![],
        },
    );
    env.add_pod(
        "nginx-app-xyz-54321",
        Pod {
            namespace: "devops-tools".into(),
            phase: PodPhase::Running,
            deployment: "nginx-app".into(),
            restarts: 0,
            logs: vec!["nginx ready".into()],
        },
    );

    env.add_deployment("frontend", 1);
    env.add_deployment("backend", 1);
    env.add_deployment("nginx-app", 2);
}
