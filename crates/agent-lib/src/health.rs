//! Component health tracking for liveness and readiness probes

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Component names tracked by the agent
pub mod components {
    pub const SAMPLER: &str = "sampler";
    pub const DETECTOR: &str = "detector";
    pub const NOTIFIER: &str = "notifier";
}

/// Health of a single component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn with_status(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::with_status(ComponentStatus::Healthy, None)
    }
}

/// Aggregate health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Registry tracking component health and overall readiness
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with initial healthy status
    pub async fn register(&self, name: &str) {
        self.components
            .write()
            .await
            .insert(name.to_string(), ComponentHealth::healthy());
    }

    pub async fn set_healthy(&self, name: &str) {
        self.components
            .write()
            .await
            .insert(name.to_string(), ComponentHealth::healthy());
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.components.write().await.insert(
            name.to_string(),
            ComponentHealth::with_status(ComponentStatus::Degraded, Some(message.into())),
        );
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.components.write().await.insert(
            name.to_string(),
            ComponentHealth::with_status(ComponentStatus::Unhealthy, Some(message.into())),
        );
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();

        let mut status = ComponentStatus::Healthy;
        for health in components.values() {
            match health.status {
                ComponentStatus::Unhealthy => {
                    status = ComponentStatus::Unhealthy;
                    break;
                }
                ComponentStatus::Degraded => status = ComponentStatus::Degraded,
                ComponentStatus::Healthy => {}
            }
        }

        HealthResponse { status, components }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        if !*self.ready.read().await {
            return ReadinessResponse {
                ready: false,
                reason: Some("Agent not yet initialized".to_string()),
            };
        }

        let health = self.health().await;
        if health.status == ComponentStatus::Unhealthy {
            return ReadinessResponse {
                ready: false,
                reason: Some("Critical component unhealthy".to_string()),
            };
        }

        ReadinessResponse {
            ready: true,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_registry_is_healthy_but_not_ready() {
        let registry = HealthRegistry::new();

        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
        assert!(!registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_degraded_component_degrades_aggregate() {
        let registry = HealthRegistry::new();
        registry.register(components::SAMPLER).await;
        registry.register(components::DETECTOR).await;

        registry
            .set_degraded(components::SAMPLER, "slow backend")
            .await;

        assert_eq!(registry.health().await.status, ComponentStatus::Degraded);
    }

    #[tokio::test]
    async fn test_unhealthy_component_blocks_readiness() {
        let registry = HealthRegistry::new();
        registry.register(components::NOTIFIER).await;
        registry.set_ready(true).await;

        assert!(registry.readiness().await.ready);

        registry
            .set_unhealthy(components::NOTIFIER, "webhook unreachable")
            .await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());
    }

    #[tokio::test]
    async fn test_recovery_restores_health() {
        let registry = HealthRegistry::new();
        registry.register(components::SAMPLER).await;
        registry
            .set_unhealthy(components::SAMPLER, "query timeout")
            .await;
        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);

        registry.set_healthy(components::SAMPLER).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
    }
}
