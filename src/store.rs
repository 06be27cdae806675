use anyhow::Context;
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;

use crate::models::GradingRecord;

const FEISHU_BASE_URL: &str = "https://open.feishu.cn/open-apis";

/// Table field names, in the fixed projection order used for query results.
pub const FIELD_NAME: &str = "姓名";
pub const FIELD_TITLE: &str = "标题";
pub const FIELD_STUDENT: &str = "你的作答";
pub const FIELD_KEY: &str = "标准答案";
pub const FIELD_STATUS: &str = "是否错误";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub app_id: String,
    pub app_secret: String,
    pub app_token: String,
    pub table_id: String,
}

impl StoreConfig {
    /// Missing variables stay empty rather than failing here; the first
    /// network call surfaces the store's own auth error instead.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).unwrap_or_default();
        Self {
            base_url: FEISHU_BASE_URL.to_string(),
            app_id: var("FEISHU_APP_ID"),
            app_secret: var("FEISHU_APP_SECRET"),
            app_token: var("FEISHU_APP_TOKEN"),
            table_id: var("FEISHU_TABLE_ID"),
        }
    }
}

/// Outcome of one filter-expression attempt against the table.
enum FilterOutcome {
    Rows(Vec<GradingRecord>),
    Empty,
    Failed(String),
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    tenant_access_token: String,
}

#[derive(serde::Deserialize)]
struct CreateResponse {
    code: i64,
    #[serde(default)]
    msg: String,
}

#[derive(serde::Deserialize)]
struct ListResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<ListData>,
}

#[derive(serde::Deserialize, Default)]
struct ListData {
    #[serde(default)]
    items: Vec<RecordItem>,
}

#[derive(serde::Deserialize)]
struct RecordItem {
    #[serde(default)]
    fields: Map<String, Value>,
}

pub struct StoreClient {
    http: reqwest::Client,
    config: StoreConfig,
    token: OnceCell<String>,
}

impl StoreClient {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token: OnceCell::new(),
        }
    }

    /// Tenant access token, exchanged once per client and cached. No manual
    /// refresh: a session outliving the token's validity fails on its next
    /// call like any other store error.
    async fn access_token(&self) -> anyhow::Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                let body = json!({
                    "app_id": self.config.app_id,
                    "app_secret": self.config.app_secret,
                });
                let response = self
                    .http
                    .post(format!(
                        "{}/auth/v3/tenant_access_token/internal",
                        self.config.base_url
                    ))
                    .json(&body)
                    .send()
                    .await
                    .context("token request failed")?;
                let parsed: TokenResponse =
                    response.json().await.context("malformed token response")?;
                if parsed.code != 0 {
                    anyhow::bail!("获取访问令牌失败: {}", parsed.msg);
                }
                Ok(parsed.tenant_access_token)
            })
            .await?;
        Ok(token)
    }

    fn records_url(&self) -> String {
        format!(
            "{}/bitable/v1/apps/{}/tables/{}/records",
            self.config.base_url, self.config.app_token, self.config.table_id
        )
    }

    /// Write one finished grading record as a table row. Single attempt; a
    /// store rejection or transport error is returned as-is, and retrying
    /// the submission creates a second row.
    pub async fn submit(&self, record: &GradingRecord) -> anyhow::Result<()> {
        let token = self.access_token().await?;
        let body = json!({
            "fields": {
                FIELD_NAME: record.name,
                FIELD_TITLE: record.title,
                FIELD_STUDENT: record.student_block,
                FIELD_KEY: record.key_block,
                FIELD_STATUS: record.status_block,
            }
        });
        let response = self
            .http
            .post(self.records_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("record creation request failed")?;
        let parsed: CreateResponse = response.json().await.context("malformed store response")?;
        if parsed.code != 0 {
            anyhow::bail!("同步失败: {}", parsed.msg);
        }
        Ok(())
    }

    /// Filter expressions for one normalized name, in priority order: the
    /// "current value" projection first (the stored field may be a formula
    /// column), then the raw field, then substring containment.
    fn filter_patterns(target: &str) -> [String; 3] {
        [
            format!("CurrentValue.[{FIELD_NAME}]=\"{target}\""),
            format!("[{FIELD_NAME}]=\"{target}\""),
            format!("CONTAINS([{FIELD_NAME}],\"{target}\")"),
        ]
    }

    async fn list_with_filter(&self, filter: &str) -> FilterOutcome {
        match self.try_list(filter).await {
            Ok(outcome) => outcome,
            Err(error) => FilterOutcome::Failed(error.to_string()),
        }
    }

    async fn try_list(&self, filter: &str) -> anyhow::Result<FilterOutcome> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(self.records_url())
            .bearer_auth(token)
            .query(&[("filter", filter)])
            .send()
            .await
            .context("record listing request failed")?;
        let parsed: ListResponse = response.json().await.context("malformed store response")?;
        if parsed.code != 0 {
            return Ok(FilterOutcome::Failed(parsed.msg));
        }
        let items = parsed.data.unwrap_or_default().items;
        if items.is_empty() {
            return Ok(FilterOutcome::Empty);
        }
        let rows = items
            .iter()
            .map(|item| normalize_row(&item.fields))
            .collect();
        Ok(FilterOutcome::Rows(rows))
    }

    /// Look up stored rows for each requested name. Per name the filter
    /// patterns run in order until one yields rows; a failed attempt records
    /// its reason and the chain continues. Results concatenate in request
    /// order without de-duplication. The last failure reason surfaces only
    /// when the whole result set comes back empty.
    pub async fn query(&self, names: &[String]) -> anyhow::Result<Vec<GradingRecord>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_rows = Vec::new();
        let mut last_error: Option<String> = None;

        for name in names {
            let target = name.trim().to_uppercase();
            for filter in Self::filter_patterns(&target) {
                match self.list_with_filter(&filter).await {
                    FilterOutcome::Rows(rows) => {
                        all_rows.extend(rows);
                        break;
                    }
                    FilterOutcome::Empty => {}
                    FilterOutcome::Failed(reason) => {
                        last_error = Some(reason);
                    }
                }
            }
        }

        if all_rows.is_empty() {
            if let Some(reason) = last_error {
                anyhow::bail!("查询失败: {reason}");
            }
        }
        Ok(all_rows)
    }
}

/// Bitable text cells arrive either as plain strings or as arrays of
/// `{"text": ...}` segments; both flatten to the joined text.
fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(segments) => segments
            .iter()
            .map(|segment| match segment {
                Value::String(text) => text.as_str(),
                Value::Object(object) => object.get("text").and_then(Value::as_str).unwrap_or(""),
                _ => "",
            })
            .collect(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Project one raw row onto the fixed field order; missing fields become
/// empty strings.
fn normalize_row(fields: &Map<String, Value>) -> GradingRecord {
    let text = |field: &str| fields.get(field).map(field_text).unwrap_or_default();
    GradingRecord {
        name: text(FIELD_NAME),
        title: text(FIELD_TITLE),
        student_block: text(FIELD_STUDENT),
        key_block: text(FIELD_KEY),
        status_block: text(FIELD_STATUS),
    }
}
