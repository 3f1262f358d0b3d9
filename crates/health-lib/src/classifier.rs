//! Pod health classification
//!
//! Maps a [`PodSnapshot`] to a [`PodVerdict`]. The status is decided first,
//! by precedence:
//!
//! 1. a true `Ready` condition gives `Ready`, whatever the phase;
//! 2. otherwise any container reporting not ready gives `NotReady`;
//! 3. otherwise the raw phase is re-exposed as the status.
//!
//! Diagnostics and the container list are then filled in from the phase,
//! independently of the status chosen above.

use crate::models::{ContainerReadiness, PodPhase, PodSnapshot, PodStatus, PodVerdict};

/// Classify a pod snapshot. Pure and total: every snapshot yields a verdict.
pub fn classify(snapshot: &PodSnapshot) -> PodVerdict {
    let mut verdict = PodVerdict {
        name: snapshot.name.clone(),
        namespace: snapshot.namespace.clone(),
        status: status_of(snapshot),
        reason: None,
        message: None,
        containers: Vec::new(),
    };

    match snapshot.phase {
        PodPhase::Failed => {
            verdict.reason = snapshot.failure_reason.clone();
            verdict.message = snapshot.failure_message.clone();
        }
        PodPhase::Running => {
            verdict.containers = snapshot
                .container_statuses
                .iter()
                .map(|c| ContainerReadiness {
                    name: c.name.clone(),
                    ready: c.ready,
                })
                .collect();
        }
        PodPhase::Pending => {
            // Only the first container is inspected for the waiting diagnostic.
            if let Some(first) = snapshot.container_statuses.first() {
                if !first.ready {
                    verdict.reason = first.waiting_reason.clone();
                    verdict.message = first.waiting_message.clone();
                }
            }
        }
        PodPhase::Succeeded | PodPhase::Unknown => {}
    }

    verdict
}

fn status_of(snapshot: &PodSnapshot) -> PodStatus {
    if snapshot.ready_condition == Some(true) {
        return PodStatus::Ready;
    }
    if snapshot.container_statuses.iter().any(|c| !c.ready) {
        return PodStatus::NotReady;
    }
    snapshot.phase.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContainerSnapshot;

    const ALL_PHASES: [PodPhase; 5] = [
        PodPhase::Pending,
        PodPhase::Running,
        PodPhase::Succeeded,
        PodPhase::Failed,
        PodPhase::Unknown,
    ];

    fn pod(phase: PodPhase) -> PodSnapshot {
        PodSnapshot::new("web-0", "default", phase)
    }

    #[test]
    fn test_ready_condition_wins_over_phase_and_containers() {
        for phase in ALL_PHASES {
            let snapshot = pod(phase)
                .with_ready_condition(true)
                .with_container(ContainerSnapshot::new("app", false));

            assert_eq!(classify(&snapshot).status, PodStatus::Ready, "{phase:?}");
        }
    }

    #[test]
    fn test_unready_container_gives_not_ready() {
        for ready_condition in [None, Some(false)] {
            for phase in ALL_PHASES {
                let mut snapshot = pod(phase)
                    .with_container(ContainerSnapshot::new("app", true))
                    .with_container(ContainerSnapshot::new("sidecar", false));
                snapshot.ready_condition = ready_condition;

                assert_eq!(classify(&snapshot).status, PodStatus::NotReady);
            }
        }
    }

    #[test]
    fn test_falls_back_to_phase() {
        for phase in ALL_PHASES {
            let snapshot = pod(phase).with_ready_condition(false);
            assert_eq!(classify(&snapshot).status, PodStatus::from(phase));
        }

        let all_ready = pod(PodPhase::Succeeded).with_container(ContainerSnapshot::new("app", true));
        assert_eq!(classify(&all_ready).status, PodStatus::Succeeded);
    }

    #[test]
    fn test_running_mirrors_containers_in_order() {
        let snapshot = pod(PodPhase::Running)
            .with_container(ContainerSnapshot::new("app", true))
            .with_container(ContainerSnapshot::new("sidecar", false).waiting("CrashLoopBackOff", "back-off"));

        let verdict = classify(&snapshot);

        assert_eq!(verdict.status, PodStatus::NotReady);
        assert_eq!(
            verdict.containers,
            vec![
                ContainerReadiness { name: "app".to_string(), ready: true },
                ContainerReadiness { name: "sidecar".to_string(), ready: false },
            ]
        );
        // waiting details are not surfaced for running pods
        assert_eq!(verdict.reason, None);
        assert_eq!(verdict.message, None);
    }

    #[test]
    fn test_ready_running_pod_still_lists_containers() {
        let snapshot = pod(PodPhase::Running)
            .with_ready_condition(true)
            .with_container(ContainerSnapshot::new("app", true));

        let verdict = classify(&snapshot);

        assert_eq!(verdict.status, PodStatus::Ready);
        assert_eq!(verdict.containers.len(), 1);
    }

    #[test]
    fn test_running_without_containers() {
        let verdict = classify(&pod(PodPhase::Running));

        assert_eq!(verdict.status, PodStatus::Running);
        assert!(verdict.containers.is_empty());
    }

    #[test]
    fn test_pending_uses_first_container_waiting_state() {
        let snapshot = pod(PodPhase::Pending)
            .with_container(ContainerSnapshot::new("init", false).waiting("ContainerCreating", ""));

        let verdict = classify(&snapshot);

        assert_eq!(verdict.reason.as_deref(), Some("ContainerCreating"));
        assert_eq!(verdict.message.as_deref(), Some(""));
        assert!(verdict.containers.is_empty());
    }

    #[test]
    fn test_pending_ignores_later_containers() {
        let snapshot = pod(PodPhase::Pending)
            .with_container(ContainerSnapshot::new("first", true))
            .with_container(ContainerSnapshot::new("second", false).waiting("ImagePullBackOff", "pull failed"));

        let verdict = classify(&snapshot);

        assert_eq!(verdict.status, PodStatus::NotReady);
        assert_eq!(verdict.reason, None);
        assert_eq!(verdict.message, None);
    }

    #[test]
    fn test_pending_without_waiting_state() {
        let snapshot = pod(PodPhase::Pending).with_container(ContainerSnapshot::new("app", false));

        let verdict = classify(&snapshot);

        assert_eq!(verdict.reason, None);
        assert_eq!(verdict.message, None);
    }

    #[test]
    fn test_pending_without_containers() {
        let verdict = classify(&pod(PodPhase::Pending));

        assert_eq!(verdict.status, PodStatus::Pending);
        assert_eq!(verdict.reason, None);
    }

    #[test]
    fn test_failed_copies_failure_details() {
        let snapshot = pod(PodPhase::Failed).with_failure("Evicted", "node pressure");

        let verdict = classify(&snapshot);

        assert_eq!(verdict.status, PodStatus::Failed);
        assert_eq!(verdict.reason.as_deref(), Some("Evicted"));
        assert_eq!(verdict.message.as_deref(), Some("node pressure"));
        assert!(verdict.containers.is_empty());
    }

    #[test]
    fn test_failed_keeps_empty_strings() {
        let verdict = classify(&pod(PodPhase::Failed).with_failure("", ""));

        assert_eq!(verdict.reason.as_deref(), Some(""));
        assert_eq!(verdict.message.as_deref(), Some(""));
    }

    #[test]
    fn test_other_phases_have_no_diagnostics() {
        for phase in [PodPhase::Succeeded, PodPhase::Unknown] {
            let snapshot = pod(phase)
                .with_failure("Ignored", "ignored")
                .with_container(ContainerSnapshot::new("app", false).waiting("Ignored", "ignored"));

            let verdict = classify(&snapshot);

            assert_eq!(verdict.reason, None);
            assert_eq!(verdict.message, None);
            assert!(verdict.containers.is_empty());
        }
    }

    #[test]
    fn test_copies_identity() {
        let verdict = classify(&PodSnapshot::new("api-7d9f", "payments", PodPhase::Unknown));

        assert_eq!(verdict.name, "api-7d9f");
        assert_eq!(verdict.namespace, "payments");
    }

    #[test]
    fn test_classify_is_idempotent() {
        let snapshot = pod(PodPhase::Running)
            .with_container(ContainerSnapshot::new("app", true))
            .with_container(ContainerSnapshot::new("sidecar", false));

        assert_eq!(classify(&snapshot), classify(&snapshot));
    }
}
