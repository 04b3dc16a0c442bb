// ABOUTME: Linux host administration actions, run over SSH.
// ABOUTME: System info, files, processes, services, networking, users, packages and logs.

use super::{Action, BuildFn, Group, TargetKind, sudo};
use crate::command::CommandLine;

fn action(id: &'static str, title: &'static str, params: &'static [&'static str], build: BuildFn) -> Action {
    Action::new(Group::Linux, TargetKind::Remote, id, title, params, build)
}

fn systemctl(verb: &str, unit: &str) -> CommandLine {
    sudo("systemctl").args([verb, unit])
}

pub(super) fn actions() -> Vec<Action> {
    vec![
        // System information
        action("linux.hostname", "Get hostname", &[], |_| {
            Ok(CommandLine::program("hostname"))
        }),
        action("linux.kernel", "Get kernel version (uname -a)", &[], |_| {
            Ok(CommandLine::program("uname").arg("-a"))
        }),
        action("linux.disk-usage", "Check disk usage (df -h)", &[], |_| {
            Ok(CommandLine::program("df").arg("-h"))
        }),
        action("linux.memory", "Check memory usage (free -h)", &[], |_| {
            Ok(CommandLine::program("free").arg("-h"))
        }),
        action("linux.uptime", "Get system uptime", &[], |_| {
            Ok(CommandLine::program("uptime"))
        }),
        action("linux.os-release", "Get OS release info", &[], |_| {
            Ok(CommandLine::program("cat").arg("/etc/os-release"))
        }),
        action("linux.cpu-info", "List CPU information (lscpu)", &[], |_| {
            Ok(CommandLine::program("lscpu"))
        }),
        action("linux.block-devices", "List block devices (lsblk)", &[], |_| {
            Ok(CommandLine::program("lsblk"))
        }),
        // File system
        action("linux.list-directory", "List directory contents (ls -l)", &["path"], |p| {
            Ok(CommandLine::program("ls").args(["-l", p.get("path")?]))
        }),
        action("linux.mkdir", "Create directory", &["path"], |p| {
            Ok(sudo("mkdir").args(["-p", p.get("path")?]))
        }),
        action("linux.view-file", "View file content (cat)", &["path"], |p| {
            Ok(sudo("cat").arg(p.get("path")?))
        }),
        action("linux.chmod", "Change permissions (chmod)", &["mode", "path"], |p| {
            Ok(sudo("chmod").args([p.get("mode")?, p.get("path")?]))
        }),
        action("linux.chown", "Change ownership (chown)", &["owner", "path"], |p| {
            Ok(sudo("chown").args([p.get("owner")?, p.get("path")?]))
        }),
        action("linux.find", "Find files by name", &["path", "name"], |p| {
            Ok(sudo("find").args([p.get("path")?, "-name", p.get("name")?]))
        }),
        // Processes and services
        action("linux.processes", "List all processes (ps aux)", &[], |_| {
            Ok(CommandLine::program("ps").arg("aux"))
        }),
        action("linux.top", "View top processes", &[], |_| {
            Ok(CommandLine::shell("top -bn1 | head -n 10"))
        }),
        action("linux.kill", "Kill process (kill -9)", &["pid"], |p| {
            Ok(sudo("kill").args(["-9".to_string(), p.get_number("pid")?.to_string()]))
        }),
        action("linux.service-status", "Check service status", &["service"], |p| {
            Ok(systemctl("status", p.get("service")?))
        }),
        action("linux.service-start", "Start service", &["service"], |p| {
            Ok(systemctl("start", p.get("service")?))
        }),
        action("linux.service-stop", "Stop service", &["service"], |p| {
            Ok(systemctl("stop", p.get("service")?))
        }),
        action("linux.service-restart", "Restart service", &["service"], |p| {
            Ok(systemctl("restart", p.get("service")?))
        }),
        action("linux.service-enable", "Enable service", &["service"], |p| {
            Ok(systemctl("enable", p.get("service")?))
        }),
        action("linux.service-disable", "Disable service", &["service"], |p| {
            Ok(systemctl("disable", p.get("service")?))
        }),
        // Network
        action("linux.ip-addresses", "Show IP addresses (ip a)", &[], |_| {
            Ok(CommandLine::program("ip").arg("a"))
        }),
        action("linux.ping", "Ping host (4 packets)", &["target"], |p| {
            Ok(CommandLine::program("ping").args(["-c", "4", p.get("target")?]))
        }),
        action("linux.open-ports", "List open ports (ss -tuln)", &[], |_| {
            Ok(CommandLine::program("ss").arg("-tuln"))
        }),
        action("linux.connections", "Show listening sockets with processes (ss -tunlp)", &[], |_| {
            Ok(sudo("ss").arg("-tunlp"))
        }),
        action("linux.fetch-url", "Fetch URL content (curl)", &["url"], |p| {
            Ok(CommandLine::program("curl").args(["-s", p.get("url")?]))
        }),
        action("linux.dns-lookup", "DNS lookup (dig)", &["host"], |p| {
            Ok(CommandLine::program("dig").arg(p.get("host")?))
        }),
        // Users
        action("linux.whoami", "Current user", &[], |_| {
            Ok(CommandLine::program("whoami"))
        }),
        action("linux.id", "User and group IDs", &[], |_| {
            Ok(CommandLine::program("id"))
        }),
        action("linux.sudo-check", "Check sudo access", &[], |_| {
            Ok(sudo("whoami"))
        }),
        action("linux.user-add", "Create user with home directory", &["user"], |p| {
            Ok(sudo("useradd").args(["-m", p.get("user")?]))
        }),
        action("linux.user-delete", "Delete user and home directory", &["user"], |p| {
            Ok(sudo("userdel").args(["-r", p.get("user")?]))
        }),
        // Packages
        action("linux.packages", "List installed packages", &[], |_| {
            Ok(CommandLine::shell("dnf list installed | head -n 20"))
        }),
        action("linux.package-install", "Install package (dnf)", &["package"], |p| {
            Ok(sudo("dnf").args(["install", "-y", p.get("package")?]))
        }),
        action("linux.package-remove", "Remove package (dnf)", &["package"], |p| {
            Ok(sudo("dnf").args(["remove", "-y", p.get("package")?]))
        }),
        action("linux.package-search", "Search packages (dnf)", &["term"], |p| {
            Ok(CommandLine::program("dnf").args(["search", p.get("term")?]))
        }),
        action("linux.check-updates", "Check for available updates", &[], |_| {
            Ok(CommandLine::program("dnf").arg("check-update"))
        }),
        // Logs
        action("linux.tail-log", "Last lines of a log file", &["path", "lines"], |p| {
            let lines = p.get_number("lines")?.to_string();
            Ok(sudo("tail").args(["-n".to_string(), lines, p.get("path")?.to_string()]))
        }),
        action("linux.journal", "Recent journal entries", &[], |_| {
            Ok(sudo("journalctl").args(["-n", "20", "--no-pager"]))
        }),
    ]
}
