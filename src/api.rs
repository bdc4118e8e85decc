use crate::envelope::{
    self, ClientResult, CloneOutcome, CreateOutcome, RepositoryStatus,
    RepositorySummary,
};
use crate::format::encode_uri_component;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

#[async_trait]
pub trait RepositoryApi: Send + Sync {
    async fn clone_repository(&self, repo_url: &str, local_path: &str) -> ClientResult<CloneOutcome>;
    async fn create_repository(&self, repo_name: &str, repo_path: &str) -> ClientResult<CreateOutcome>;
    async fn list_repositories(&self) -> ClientResult<Vec<RepositorySummary>>;
    async fn repository_status(&self, path: &str) -> ClientResult<RepositoryStatus>;
}

pub fn repository_url(path: &str) -> String {
    format!("/repository/{}", encode_uri_component(path))
}

pub struct HttpApi {
    base: String,
    http: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).with_context(|| format!("invalid server url {base_url}"))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("minigit-ui/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            base: parsed.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post_form(&self, path: &str, form: multipart::Form) -> ClientResult<Value> {
        let url = self.endpoint(path);
        debug!(%url, "POST");
        // The envelope carries the outcome; HTTP status codes are not inspected.
        let body: Value = self.http.post(url).multipart(form).send().await?.json().await?;
        Ok(body)
    }

    async fn get_json(&self, path: &str) -> ClientResult<Value> {
        let url = self.endpoint(path);
        debug!(%url, "GET");
        let body: Value = self.http.get(url).send().await?.json().await?;
        Ok(body)
    }
}

#[async_trait]
impl RepositoryApi for HttpApi {
    async fn clone_repository(&self, repo_url: &str, local_path: &str) -> ClientResult<CloneOutcome> {
        let form = multipart::Form::new()
            .text("repo_url", repo_url.to_string())
            .text("local_path", local_path.to_string());
        envelope::open(self.post_form("/clone", form).await?)
    }

    async fn create_repository(&self, repo_name: &str, repo_path: &str) -> ClientResult<CreateOutcome> {
        let form = multipart::Form::new()
            .text("repo_name", repo_name.to_string())
            .text("repo_path", repo_path.to_string());
        envelope::open(self.post_form("/create-repo", form).await?)
    }

    async fn list_repositories(&self) -> ClientResult<Vec<RepositorySummary>> {
        envelope::open_data(self.get_json("/api/repositories").await?)
    }

    async fn repository_status(&self, path: &str) -> ClientResult<RepositoryStatus> {
        let endpoint = format!("/api/repository/{}/status", encode_uri_component(path));
        envelope::open_data(self.get_json(&endpoint).await?)
    }
}
