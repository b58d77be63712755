use crate::{
    database::Database,
    error::AppResult,
    models::{CreatePingResultRequest, PingResult, ProbeStatus},
};

const COLUMNS: &str =
    "id, container_id, container_name, ping_duration, status, ip_address, service, timestamp";

/// 探测记录仓库
#[derive(Clone)]
pub struct PingResultRepository {
    db: Database,
}

impl PingResultRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 追加一条探测记录，时间戳由数据库生成
    pub async fn create(&self, request: &CreatePingResultRequest) -> AppResult<PingResult> {
        let sql = format!(
            r#"
            INSERT INTO ping_results (container_id, container_name, ping_duration, status, ip_address, service)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COLUMNS
        );

        let result = sqlx::query_as::<_, PingResult>(&sql)
            .bind(&request.container_id)
            .bind(&request.container_name)
            .bind(request.ping_duration)
            .bind(request.status)
            .bind(&request.ip_address)
            .bind(&request.service)
            .fetch_one(self.db.pool())
            .await?;

        Ok(result)
    }

    /// 按时间倒序列出探测记录
    pub async fn list(&self, limit: Option<i64>) -> AppResult<Vec<PingResult>> {
        let sql = format!(
            "SELECT {} FROM ping_results ORDER BY timestamp DESC, id DESC LIMIT $1",
            COLUMNS
        );

        let results = sqlx::query_as::<_, PingResult>(&sql)
            .bind(limit)
            .fetch_all(self.db.pool())
            .await?;

        Ok(results)
    }

    /// 每个容器名称最近一次 UP 记录
    pub async fn latest_up_per_container(&self) -> AppResult<Vec<PingResult>> {
        let sql = format!(
            r#"
            SELECT {} FROM (
                SELECT DISTINCT ON (container_name) {}
                FROM ping_results
                WHERE status = $1
                ORDER BY container_name, timestamp DESC, id DESC
            ) latest
            ORDER BY timestamp DESC
            "#,
            COLUMNS, COLUMNS
        );

        let results = sqlx::query_as::<_, PingResult>(&sql)
            .bind(ProbeStatus::Up)
            .fetch_all(self.db.pool())
            .await?;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use uuid::Uuid;

    /// 需要 TEST_DATABASE_URL 指向可写的 PostgreSQL，未设置时跳过
    async fn repository() -> Option<PingResultRepository> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("未设置 TEST_DATABASE_URL，跳过数据库测试");
            return None;
        };
        let db = Database::new(&DatabaseConfig {
            url,
            max_connections: 2,
            acquire_timeout_secs: 5,
        })
        .await
        .unwrap();
        db.ensure_schema().await.unwrap();
        Some(PingResultRepository::new(db))
    }

    fn request(name: &str, status: ProbeStatus) -> CreatePingResultRequest {
        CreatePingResultRequest {
            container_id: "abc123def456".to_string(),
            container_name: name.to_string(),
            ping_duration: 0.01,
            status,
            ip_address: None,
            service: Some("api".to_string()),
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let Some(repo) = repository().await else {
            return;
        };
        let name = format!("web-{}", Uuid::new_v4().simple());

        let mut created = Vec::new();
        for status in [ProbeStatus::Up, ProbeStatus::Down, ProbeStatus::Up] {
            created.push(repo.create(&request(&name, status)).await.unwrap().id);
        }

        let listed: Vec<i64> = repo
            .list(None)
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.container_name == name)
            .map(|r| r.id)
            .collect();
        created.reverse();
        assert_eq!(listed, created);

        assert_eq!(repo.list(Some(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_latest_up_per_container() {
        let Some(repo) = repository().await else {
            return;
        };
        let web = format!("web-{}", Uuid::new_v4().simple());
        let db = format!("db-{}", Uuid::new_v4().simple());

        repo.create(&request(&web, ProbeStatus::Up)).await.unwrap();
        let latest_up = repo.create(&request(&web, ProbeStatus::Up)).await.unwrap();
        repo.create(&request(&web, ProbeStatus::Down)).await.unwrap();
        repo.create(&request(&db, ProbeStatus::Down)).await.unwrap();

        let rows: Vec<PingResult> = repo
            .latest_up_per_container()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.container_name == web || r.container_name == db)
            .collect();

        // 只有 UP 记录参与，且每个名称只保留最新一条
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, latest_up.id);
        assert_eq!(rows[0].status, ProbeStatus::Up);
    }
}
