//! End-to-end tests for join and leave against in-memory collaborators.
//!
//! The fake runtime records every primitive call so each test can assert
//! both the launch request and what was done to existing containers.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use peerboot_bootstrap::launch::{Bootstrap, JoinOptions};
use peerboot_common::config::BootstrapConfig;
use peerboot_common::error::{PeerbootError, Result};
use peerboot_common::types::{
    Address, AdvertiseMode, ContainerId, ContainerState, LaunchRequest, MountSpec,
};
use peerboot_runtime::backend::ContainerRuntime;
use peerboot_runtime::host::{DefaultRouteResolver, ExternalIpResolver};
use peerboot_runtime::lifecycle::LeaveOutcome;

#[derive(Default)]
struct FakeRuntime {
    containers: Mutex<HashMap<String, ContainerState>>,
    calls: Mutex<Vec<String>>,
    launched: Mutex<Vec<LaunchRequest>>,
}

impl FakeRuntime {
    fn with_router(ip: &str) -> Self {
        let runtime = Self::default();
        runtime.put(
            "weave",
            ContainerState::Running {
                image: "weaveworks/weave:latest".into(),
                ip: Some(ip.into()),
            },
        );
        runtime
    }

    fn put(&self, name: &str, state: ContainerState) {
        let _ = self.containers.lock().unwrap().insert(name.into(), state);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn launched(&self) -> Vec<LaunchRequest> {
        self.launched.lock().unwrap().clone()
    }
}

impl ContainerRuntime for FakeRuntime {
    fn inspect(&self, name: &str) -> Result<ContainerState> {
        self.calls.lock().unwrap().push(format!("inspect {name}"));
        Ok(self
            .containers
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or(ContainerState::Absent))
    }

    fn run(&self, request: &LaunchRequest) -> Result<ContainerId> {
        self.calls.lock().unwrap().push(format!("run {}", request.name));
        self.launched.lock().unwrap().push(request.clone());
        self.put(
            &request.name,
            ContainerState::Running {
                image: request.image.clone(),
                ip: None,
            },
        );
        Ok(ContainerId::new("4f2a9c1d"))
    }

    fn stop(&self, name: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("stop {name}"));
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("remove {name}"));
        match self.containers.lock().unwrap().remove(name) {
            Some(_) => Ok(()),
            None => Err(PeerbootError::Runtime {
                operation: "remove",
                message: format!("No such container: {name}"),
            }),
        }
    }
}

struct Lookups {
    external: Option<&'static str>,
    route: Option<&'static str>,
}

impl ExternalIpResolver for Lookups {
    fn external_ip(&self) -> Result<String> {
        self.external
            .map(ToString::to_string)
            .ok_or_else(|| PeerbootError::ExternalIpLookupFailed {
                reason: "no answer".into(),
            })
    }
}

impl DefaultRouteResolver for Lookups {
    fn default_route_ip(&self) -> Result<String> {
        self.route
            .map(ToString::to_string)
            .ok_or_else(|| PeerbootError::DefaultRouteLookupFailed {
                reason: "no route".into(),
            })
    }
}

const OFFLINE: Lookups = Lookups {
    external: None,
    route: None,
};

fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
    args.windows(2).any(|w| w[0] == flag && w[1] == value)
}

#[test]
fn join_explicit_advertise_etcd_endpoint() {
    let runtime = FakeRuntime::with_router("172.17.0.2");
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    let id = bootstrap
        .join(JoinOptions {
            advertise: AdvertiseMode::Explicit("10.0.0.5:6783".into()),
            endpoint: "etcd://cluster/path".into(),
            ..JoinOptions::default()
        })
        .expect("join should succeed");
    assert_eq!(id.as_str(), "4f2a9c1d");

    let launched = runtime.launched();
    assert_eq!(launched.len(), 1);
    let request = &launched[0];
    let args = request.discovery_args();
    assert!(has_pair(&args, "-local", "10.0.0.5:6783"));
    assert!(has_pair(&args, "-weave", "http://172.17.0.2:6784"));
    assert_eq!(args.last().map(String::as_str), Some("etcd://cluster/path"));
    assert!(request.mount.is_none());
    assert_eq!(request.name, "weavediscovery");
    assert_eq!(request.image, "weaveworks/discovery:latest");
}

#[test]
fn join_file_endpoint_mounts_host_file() {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let file = dir.path().join("peers.json");
    std::fs::write(&file, b"[\"10.0.0.9\"]").expect("failed to write");

    let runtime = FakeRuntime::with_router("172.17.0.2");
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    let _ = bootstrap
        .join(JoinOptions {
            endpoint: format!("file://{}", file.display()),
            ..JoinOptions::default()
        })
        .expect("join should succeed");

    let request = &runtime.launched()[0];
    assert_eq!(
        request.mount,
        Some(MountSpec {
            host_path: file,
            container_path: "/tmp/peers.json".into(),
        })
    );
    assert_eq!(request.endpoint.to_string(), "file:///tmp/peers.json");
    assert!(request.advertise.is_none());
}

#[test]
fn join_missing_file_endpoint_launches_nothing() {
    let runtime = FakeRuntime::with_router("172.17.0.2");
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    let result = bootstrap.join(JoinOptions {
        endpoint: "file:///nonexistent/peerboot/peers.json".into(),
        ..JoinOptions::default()
    });
    assert!(matches!(result, Err(PeerbootError::FileNotFound { .. })));
    assert!(runtime.launched().is_empty());
}

#[test]
fn join_explicit_beats_external_and_skips_lookup() {
    let runtime = FakeRuntime::with_router("172.17.0.2");
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    let request = bootstrap
        .plan(JoinOptions {
            advertise: AdvertiseMode::from_flags(Some("1.2.3.4".into()), true, false),
            endpoint: "consul://c/p".into(),
            ..JoinOptions::default()
        })
        .expect("explicit address must win without any lookup");
    assert_eq!(request.advertise, Some(Address::new("1.2.3.4", None)));
}

#[test]
fn join_advertise_external_uses_router_peer_port() {
    let runtime = FakeRuntime::with_router("172.17.0.2");
    let config = BootstrapConfig::default();
    let lookups = Lookups {
        external: Some("203.0.113.7"),
        route: None,
    };
    let bootstrap = Bootstrap::new(&runtime, &lookups, &lookups, &config);

    let request = bootstrap
        .plan(JoinOptions {
            advertise: AdvertiseMode::External,
            discovered_port: Some("7000".into()),
            endpoint: "etcd://cluster/path".into(),
            ..JoinOptions::default()
        })
        .expect("plan");
    let args = request.discovery_args();
    assert!(has_pair(&args, "-local", "203.0.113.7:6783"));
    assert!(has_pair(&args, "-discovered-port", "7000"));
}

#[test]
fn join_advertise_router_remote_and_local() {
    let runtime = FakeRuntime::with_router("172.17.0.2");
    let config = BootstrapConfig::default();
    let lookups = Lookups {
        external: None,
        route: Some("192.168.1.20"),
    };
    let bootstrap = Bootstrap::new(&runtime, &lookups, &lookups, &config);

    let remote = bootstrap
        .plan(JoinOptions {
            advertise: AdvertiseMode::RouterRelative,
            router: Some("weave-1.example.com".into()),
            endpoint: "etcd://cluster/path".into(),
            ..JoinOptions::default()
        })
        .expect("plan");
    assert_eq!(
        remote.advertise.map(|a| a.to_string()),
        Some("weave-1.example.com:6783".into())
    );
    assert_eq!(remote.router_url, "http://weave-1.example.com:6784");

    let local = bootstrap
        .plan(JoinOptions {
            advertise: AdvertiseMode::RouterRelative,
            endpoint: "etcd://cluster/path".into(),
            ..JoinOptions::default()
        })
        .expect("plan");
    assert_eq!(
        local.advertise.map(|a| a.to_string()),
        Some("192.168.1.20:6783".into())
    );
}

#[test]
fn join_external_lookup_failure_is_fatal() {
    let runtime = FakeRuntime::with_router("172.17.0.2");
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    let result = bootstrap.join(JoinOptions {
        advertise: AdvertiseMode::External,
        endpoint: "etcd://cluster/path".into(),
        ..JoinOptions::default()
    });
    assert!(matches!(result, Err(PeerbootError::ExternalIpLookupFailed { .. })));
    assert!(runtime.launched().is_empty());
}

#[test]
fn join_router_without_ip_is_fatal() {
    let runtime = FakeRuntime::default();
    runtime.put(
        "weave",
        ContainerState::Running {
            image: "weaveworks/weave:latest".into(),
            ip: None,
        },
    );
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    let result = bootstrap.join(JoinOptions {
        endpoint: "etcd://cluster/path".into(),
        ..JoinOptions::default()
    });
    assert!(matches!(result, Err(PeerbootError::NoRouterIp { .. })));
}

#[test]
fn join_twice_is_rejected() {
    let runtime = FakeRuntime::with_router("172.17.0.2");
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);
    let options = JoinOptions {
        endpoint: "etcd://cluster/path".into(),
        ..JoinOptions::default()
    };

    let _ = bootstrap.join(options.clone()).expect("first join");
    let second = bootstrap.join(options);
    assert!(matches!(second, Err(PeerbootError::AlreadyRunning { .. })));
    assert_eq!(runtime.launched().len(), 1);
}

#[test]
fn join_replaces_stale_discovery_container() {
    let runtime = FakeRuntime::with_router("172.17.0.2");
    runtime.put(
        "weavediscovery",
        ContainerState::Stopped {
            image: "weaveworks/discovery:0.9".into(),
        },
    );
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    let _ = bootstrap
        .join(JoinOptions {
            endpoint: "etcd://cluster/path".into(),
            ..JoinOptions::default()
        })
        .expect("stale container should be replaced");
    let calls = runtime.calls();
    let remove = calls.iter().position(|c| c == "remove weavediscovery");
    let run = calls.iter().position(|c| c == "run weavediscovery");
    assert!(remove.is_some() && remove < run);
}

#[test]
fn join_leaves_foreign_container_untouched() {
    let runtime = FakeRuntime::with_router("172.17.0.2");
    runtime.put(
        "weavediscovery",
        ContainerState::Running {
            image: "nginx:1.25".into(),
            ip: None,
        },
    );
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    let result = bootstrap.join(JoinOptions {
        endpoint: "etcd://cluster/path".into(),
        ..JoinOptions::default()
    });
    assert!(matches!(result, Err(PeerbootError::NameCollision { .. })));
    assert!(!runtime.calls().iter().any(|c| c.starts_with("remove") || c.starts_with("stop")));
}

#[test]
fn leave_absent_container_is_not_fatal() {
    let runtime = FakeRuntime::default();
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    assert_eq!(bootstrap.leave(), LeaveOutcome::NotPresent);
    assert_eq!(
        runtime.calls(),
        vec!["inspect weavediscovery", "remove weavediscovery"]
    );
}

#[test]
fn leave_after_join_stops_and_removes() {
    let runtime = FakeRuntime::with_router("172.17.0.2");
    let config = BootstrapConfig::default();
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    let _ = bootstrap
        .join(JoinOptions {
            endpoint: "etcd://cluster/path".into(),
            ..JoinOptions::default()
        })
        .expect("join");
    assert_eq!(bootstrap.leave(), LeaveOutcome::Stopped);
    let calls = runtime.calls();
    assert!(calls.ends_with(&[
        "inspect weavediscovery".to_string(),
        "stop weavediscovery".to_string(),
        "remove weavediscovery".to_string(),
    ]));
}

#[test]
fn custom_names_and_image_flow_into_request() {
    let runtime = FakeRuntime::default();
    runtime.put(
        "router-a",
        ContainerState::Running {
            image: "weaveworks/weave:2.8.1".into(),
            ip: Some("10.32.0.1".into()),
        },
    );
    let config = BootstrapConfig {
        image_repo: "registry:5000/discovery".into(),
        image_version: "1.4".into(),
        discovery_container: "disco-a".into(),
        router_container: "router-a".into(),
        extra_runtime_args: Vec::new(),
    };
    let bootstrap = Bootstrap::new(&runtime, &OFFLINE, &OFFLINE, &config);

    let _ = bootstrap
        .join(JoinOptions {
            endpoint: "etcd://cluster/path".into(),
            ..JoinOptions::default()
        })
        .expect("join");
    let request = &runtime.launched()[0];
    assert_eq!(request.name, "disco-a");
    assert_eq!(request.image, "registry:5000/discovery:1.4");
    assert_eq!(request.router_url, "http://10.32.0.1:6784");
}
