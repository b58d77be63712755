use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::ProbeStatus;

/// 已持久化的探测记录
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PingResult {
    pub id: i64,
    pub container_id: String,
    pub container_name: String,
    pub ping_duration: f64,
    #[sqlx(try_from = "String")]
    pub status: ProbeStatus,
    pub ip_address: Option<String>,
    pub service: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// 探测代理提交的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatePingResultRequest {
    pub container_id: String,
    #[serde(default)]
    pub container_name: String,
    pub ping_duration: f64,
    pub status: ProbeStatus,
    pub ip_address: Option<String>,
    pub service: Option<String>,
}

impl CreatePingResultRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.container_id.trim().is_empty() {
            return Err("container_id 不能为空".to_string());
        }
        if !self.ping_duration.is_finite() || self.ping_duration < 0.0 {
            return Err("ping_duration 必须为非负数".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProbeOutcome, Target};
    use std::time::Duration;

    #[test]
    fn test_outcome_round_trip_through_collector() {
        let target = Target::new("abc123def456", Some("/web"))
            .with_ip_address(Some("172.18.0.3".to_string()));
        let outcome = ProbeOutcome::new(
            &target,
            "web".to_string(),
            Some("api"),
            Duration::from_secs_f64(0.0421),
            ProbeStatus::Up,
        );

        let body = serde_json::to_string(&outcome).unwrap();
        let request: CreatePingResultRequest = serde_json::from_str(&body).unwrap();

        assert_eq!(request.container_id, outcome.target_id);
        assert_eq!(request.container_name, outcome.display_name);
        assert_eq!(request.ping_duration, outcome.duration_seconds);
        assert_eq!(request.status, ProbeStatus::Up);
        assert_eq!(request.ip_address.as_deref(), Some("172.18.0.3"));
        assert_eq!(request.service.as_deref(), Some("api"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_without_optional_fields() {
        let request: CreatePingResultRequest = serde_json::from_str(
            r#"{"container_id":"abc123def456","container_name":"web","ping_duration":1.0,"status":"DOWN"}"#,
        )
        .unwrap();
        assert_eq!(request.status, ProbeStatus::Down);
        assert!(request.service.is_none());
        assert!(request.ip_address.is_none());
    }

    #[test]
    fn test_request_validation() {
        let mut request = CreatePingResultRequest {
            container_id: "abc123def456".to_string(),
            container_name: "web".to_string(),
            ping_duration: -1.0,
            status: ProbeStatus::Up,
            ip_address: None,
            service: None,
        };
        assert!(request.validate().is_err());

        request.ping_duration = 0.5;
        assert!(request.validate().is_ok());

        request.container_id = " ".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result: Result<CreatePingResultRequest, _> = serde_json::from_str(
            r#"{"container_id":"abc","ping_duration":1.0,"status":"MAYBE"}"#,
        );
        assert!(result.is_err());
    }
}
