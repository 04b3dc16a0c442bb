// ABOUTME: Docker engine actions on a remote host, run over SSH with sudo.
// ABOUTME: Containers, images, networks, volumes and system maintenance.

use super::{Action, BuildFn, Group, TargetKind, sudo};
use crate::command::CommandLine;

fn action(id: &'static str, title: &'static str, params: &'static [&'static str], build: BuildFn) -> Action {
    Action::new(Group::Docker, TargetKind::Remote, id, title, params, build)
}

fn docker<'a>(args: impl IntoIterator<Item = &'a str>) -> CommandLine {
    sudo("docker").args(args)
}

pub(super) fn actions() -> Vec<Action> {
    vec![
        // Containers
        action("docker.ps", "List running containers", &[], |_| Ok(docker(["ps"]))),
        action("docker.ps-all", "List all containers", &[], |_| {
            Ok(docker(["ps", "-a"]))
        }),
        action("docker.start", "Start container", &["container"], |p| {
            Ok(docker(["start", p.get("container")?]))
        }),
        action("docker.stop", "Stop container", &["container"], |p| {
            Ok(docker(["stop", p.get("container")?]))
        }),
        action("docker.restart", "Restart container", &["container"], |p| {
            Ok(docker(["restart", p.get("container")?]))
        }),
        action("docker.rm", "Remove container", &["container"], |p| {
            Ok(docker(["rm", p.get("container")?]))
        }),
        action("docker.logs", "Container logs (last 100 lines)", &["container"], |p| {
            Ok(docker(["logs", "--tail", "100", p.get("container")?]))
        }),
        action("docker.inspect", "Inspect container, image, network or volume", &["object"], |p| {
            Ok(docker(["inspect", p.get("object")?]))
        }),
        action("docker.stats", "Container resource usage snapshot", &["container"], |p| {
            Ok(docker(["stats", "--no-stream", p.get("container")?]))
        }),
        // Images
        action("docker.images", "List images", &[], |_| Ok(docker(["images"]))),
        action("docker.pull", "Pull image", &["image"], |p| {
            Ok(docker(["pull", p.get("image")?]))
        }),
        action("docker.rmi", "Remove image", &["image"], |p| {
            Ok(docker(["rmi", p.get("image")?]))
        }),
        action("docker.tag", "Tag image", &["source", "target"], |p| {
            Ok(docker(["tag", p.get("source")?, p.get("target")?]))
        }),
        // Networks and volumes
        action("docker.networks", "List networks", &[], |_| {
            Ok(docker(["network", "ls"]))
        }),
        action("docker.network-create", "Create network", &["network"], |p| {
            Ok(docker(["network", "create", p.get("network")?]))
        }),
        action("docker.network-rm", "Remove network", &["network"], |p| {
            Ok(docker(["network", "rm", p.get("network")?]))
        }),
        action("docker.volumes", "List volumes", &[], |_| {
            Ok(docker(["volume", "ls"]))
        }),
        action("docker.volume-create", "Create volume", &["volume"], |p| {
            Ok(docker(["volume", "create", p.get("volume")?]))
        }),
        action("docker.volume-rm", "Remove volume", &["volume"], |p| {
            Ok(docker(["volume", "rm", p.get("volume")?]))
        }),
        // System
        action("docker.info", "Engine information", &[], |_| Ok(docker(["info"]))),
        action("docker.version", "Engine version", &[], |_| Ok(docker(["version"]))),
        action("docker.disk-usage", "Disk usage (system df)", &[], |_| {
            Ok(docker(["system", "df"]))
        }),
        action("docker.prune", "Remove unused data (system prune -f)", &[], |_| {
            Ok(docker(["system", "prune", "-f"]))
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::{Params, TargetKind, find};

    #[test]
    fn docker_actions_run_remotely_with_sudo() {
        let action = find("docker.logs").unwrap();
        assert_eq!(action.target, TargetKind::Remote);
        let cmd = action
            .build(&Params::new().with("container", "web"))
            .unwrap();
        assert_eq!(cmd.to_remote_string(), "sudo -n docker logs --tail 100 web");
    }
}
