// ABOUTME: Kubernetes actions run through the local kubectl binary.
// ABOUTME: Cluster overview, workloads, services, configuration and node maintenance.

use super::{Action, BuildFn, Group, Params, Result, TargetKind};
use crate::command::CommandLine;

fn action(id: &'static str, title: &'static str, params: &'static [&'static str], build: BuildFn) -> Action {
    Action::new(Group::Kubernetes, TargetKind::Local, id, title, params, build)
}

fn kubectl<'a>(args: impl IntoIterator<Item = &'a str>) -> CommandLine {
    CommandLine::program("kubectl").args(args)
}

/// `kubectl get <kind> -o wide`, scoped by the optional `namespace` param.
fn get_wide(p: &Params, kind: &str) -> Result<CommandLine> {
    let cmd = kubectl(["get", kind, "-o", "wide"]);
    Ok(match p.get_opt("namespace")? {
        Some(ns) => cmd.args(["--namespace", ns]),
        None => cmd,
    })
}

pub(super) fn actions() -> Vec<Action> {
    vec![
        // Cluster
        action("kubernetes.nodes", "Get nodes", &[], |_| {
            Ok(kubectl(["get", "nodes", "-o", "wide"]))
        }),
        action("kubernetes.describe-node", "Describe node", &["node"], |p| {
            Ok(kubectl(["describe", "node", p.get("node")?]))
        }),
        action("kubernetes.cluster-info", "Cluster info", &[], |_| {
            Ok(kubectl(["cluster-info"]))
        }),
        action("kubernetes.version", "Client and server version", &[], |_| {
            Ok(kubectl(["version"]))
        }),
        action("kubernetes.namespaces", "List namespaces", &[], |_| {
            Ok(kubectl(["get", "namespaces"]))
        }),
        action("kubernetes.create-namespace", "Create namespace", &["namespace"], |p| {
            Ok(kubectl(["create", "namespace", p.get("namespace")?]))
        }),
        action("kubernetes.current-context", "Current context", &[], |_| {
            Ok(kubectl(["config", "current-context"]))
        }),
        action("kubernetes.contexts", "List contexts", &[], |_| {
            Ok(kubectl(["config", "get-contexts"]))
        }),
        action("kubernetes.api-resources", "List API resources", &[], |_| {
            Ok(kubectl(["api-resources"]))
        }),
        action("kubernetes.top-nodes", "Node resource usage", &[], |_| {
            Ok(kubectl(["top", "nodes"]))
        }),
        // Nodes
        action("kubernetes.cordon", "Cordon node", &["node"], |p| {
            Ok(kubectl(["cordon", p.get("node")?]))
        }),
        action("kubernetes.uncordon", "Uncordon node", &["node"], |p| {
            Ok(kubectl(["uncordon", p.get("node")?]))
        }),
        action("kubernetes.drain", "Drain node", &["node"], |p| {
            Ok(kubectl([
                "drain",
                p.get("node")?,
                "--ignore-daemonsets",
                "--delete-emptydir-data",
                "--force",
            ]))
        }),
        // Workloads (optional namespace=)
        action("kubernetes.pods", "Get pods", &[], |p| get_wide(p, "pods")),
        action("kubernetes.describe-pod", "Describe pod", &["pod"], |p| {
            Ok(kubectl(["describe", "pod", p.get("pod")?]))
        }),
        action("kubernetes.logs", "Pod logs", &["pod"], |p| {
            Ok(kubectl(["logs", p.get("pod")?]))
        }),
        action("kubernetes.delete-pod", "Delete pod", &["pod"], |p| {
            Ok(kubectl(["delete", "pod", p.get("pod")?]))
        }),
        action("kubernetes.deployments", "Get deployments", &[], |p| {
            get_wide(p, "deployments")
        }),
        action("kubernetes.describe-deployment", "Describe deployment", &["deployment"], |p| {
            Ok(kubectl(["describe", "deployment", p.get("deployment")?]))
        }),
        action("kubernetes.scale", "Scale deployment", &["deployment", "replicas"], |p| {
            let replicas = format!("--replicas={}", p.get_number("replicas")?);
            Ok(kubectl(["scale", "deployment", p.get("deployment")?, replicas.as_str()]))
        }),
        action("kubernetes.rollout-undo", "Roll back deployment", &["deployment"], |p| {
            let target = format!("deployment/{}", p.get("deployment")?);
            Ok(kubectl(["rollout", "undo", target.as_str()]))
        }),
        action("kubernetes.delete-deployment", "Delete deployment", &["deployment"], |p| {
            Ok(kubectl(["delete", "deployment", p.get("deployment")?]))
        }),
        action("kubernetes.statefulsets", "Get statefulsets", &[], |p| {
            get_wide(p, "statefulsets")
        }),
        action("kubernetes.daemonsets", "Get daemonsets", &[], |p| {
            get_wide(p, "daemonsets")
        }),
        // Services and networking
        action("kubernetes.services", "Get services", &[], |p| get_wide(p, "services")),
        action("kubernetes.describe-service", "Describe service", &["service"], |p| {
            Ok(kubectl(["describe", "service", p.get("service")?]))
        }),
        action("kubernetes.ingress", "Get ingresses", &[], |p| get_wide(p, "ingress")),
        action("kubernetes.endpoints", "Get endpoints", &[], |p| {
            get_wide(p, "endpoints")
        }),
        // Configuration and storage
        action("kubernetes.configmaps", "Get configmaps", &[], |p| {
            get_wide(p, "configmaps")
        }),
        action("kubernetes.secrets", "List secrets", &[], |_| {
            Ok(kubectl(["get", "secrets"]))
        }),
        action("kubernetes.pv", "Get persistent volumes", &[], |_| {
            Ok(kubectl(["get", "pv", "-o", "wide"]))
        }),
        action("kubernetes.pvc", "Get persistent volume claims", &[], |p| {
            get_wide(p, "pvc")
        }),
        action("kubernetes.apply", "Apply manifest file", &["file"], |p| {
            Ok(kubectl(["apply", "-f", p.get("file")?]))
        }),
        action("kubernetes.delete-manifest", "Delete resources from manifest file", &["file"], |p| {
            Ok(kubectl(["delete", "-f", p.get("file")?]))
        }),
    ]
}
