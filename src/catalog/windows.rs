// ABOUTME: Windows administration actions run on the local machine.
// ABOUTME: System information, services, scheduled tasks and networking.

use super::{Action, BuildFn, Group, TargetKind};
use crate::command::CommandLine;

fn action(id: &'static str, title: &'static str, params: &'static [&'static str], build: BuildFn) -> Action {
    Action::new(Group::Windows, TargetKind::Local, id, title, params, build)
}

pub(super) fn actions() -> Vec<Action> {
    vec![
        action("windows.systeminfo", "System information", &[], |_| {
            Ok(CommandLine::program("systeminfo"))
        }),
        action("windows.ipconfig", "IP configuration", &[], |_| {
            Ok(CommandLine::program("ipconfig").arg("/all"))
        }),
        action("windows.tasklist", "Running processes", &[], |_| {
            Ok(CommandLine::program("tasklist"))
        }),
        action("windows.kill", "Terminate process by PID", &["pid"], |p| {
            Ok(CommandLine::program("taskkill").args([
                "/PID".to_string(),
                p.get_number("pid")?.to_string(),
                "/F".to_string(),
            ]))
        }),
        action("windows.services", "Query all services", &[], |_| {
            Ok(CommandLine::program("sc").args(["query", "state=", "all"]))
        }),
        action("windows.service-start", "Start service", &["service"], |p| {
            Ok(CommandLine::program("net").args(["start", p.get("service")?]))
        }),
        action("windows.service-stop", "Stop service", &["service"], |p| {
            Ok(CommandLine::program("net").args(["stop", p.get("service")?]))
        }),
        action("windows.scheduled-tasks", "List scheduled tasks", &[], |_| {
            Ok(CommandLine::program("schtasks").args(["/query", "/fo", "list", "/v"]))
        }),
        action("windows.task-disable", "Disable scheduled task", &["task"], |p| {
            Ok(CommandLine::program("schtasks").args(["/change", "/tn", p.get("task")?, "/disable"]))
        }),
        action("windows.task-enable", "Enable scheduled task", &["task"], |p| {
            Ok(CommandLine::program("schtasks").args(["/change", "/tn", p.get("task")?, "/enable"]))
        }),
        action("windows.wlan-profiles", "Saved Wi-Fi profiles", &[], |_| {
            Ok(CommandLine::program("netsh").args(["wlan", "show", "profile"]))
        }),
        action("windows.netstat", "Active connections", &[], |_| {
            Ok(CommandLine::program("netstat").arg("-ano"))
        }),
    ]
}
