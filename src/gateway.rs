use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{Idea, User};

const IDEAS_PER_PAGE: u32 = 1000;
const FILTER_DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the innovation platform's external API. Pagination and the
/// platform's success-flag envelope live here; the aggregation engine only
/// ever sees fully accumulated record sets.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct UserPage {
    #[serde(default)]
    sucesso: bool,
    #[serde(default)]
    mensagem: Option<String>,
    #[serde(default)]
    resultado: Vec<User>,
    #[serde(default = "first_page", rename = "numeroTotalPaginas")]
    total_pages: u32,
    #[serde(default = "first_page", rename = "paginaAtual")]
    current_page: u32,
}

#[derive(Deserialize)]
struct IdeaPage {
    #[serde(default)]
    resultado: Vec<Idea>,
    #[serde(default = "first_page", rename = "numeroPaginas")]
    total_pages: u32,
    #[serde(default = "first_page", rename = "paginaAtual")]
    current_page: u32,
}

fn first_page() -> u32 {
    1
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Fetches the flat roster of a department's active users. The platform
    /// resolves sub-departments server-side. Pages are accumulated until the
    /// reported total; any failed page fails the whole call. A department
    /// with no active members yields an empty roster, not an error.
    pub async fn fetch_department_users(&self, department_id: i64) -> anyhow::Result<Vec<User>> {
        let url = format!("{}/webapi/api/apiExterna/Usuarios", self.base_url);
        let filters = serde_json::json!({ "DepartamentoId": department_id, "Ativo": 1 });
        let filters = serde_json::to_string(&filters)?;

        let mut users = Vec::new();
        let mut page: u32 = 1;
        loop {
            println!("Fetching user page {page} for department {department_id}...");
            let page_str = page.to_string();
            let body: UserPage = self
                .http
                .get(&url)
                .query(&[
                    ("token", self.token.as_str()),
                    ("filtros", filters.as_str()),
                    ("pagina", page_str.as_str()),
                ])
                .send()
                .await
                .context("user request failed")?
                .error_for_status()
                .context("user request returned an error status")?
                .json()
                .await
                .context("malformed user page payload")?;

            if !body.sucesso {
                bail!(
                    "platform rejected user query: {}",
                    body.mensagem.unwrap_or_else(|| "no message".to_string())
                );
            }

            users.extend(body.resultado);
            if body.current_page >= body.total_pages {
                break;
            }
            page = body.current_page + 1;
        }

        println!("Retrieved {} users for department {department_id}.", users.len());
        Ok(users)
    }

    /// Fetches every idea whose creation date falls in `[start, end]`,
    /// accumulating pages until the reported total.
    pub async fn fetch_ideas_by_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Idea>> {
        // Bases already pointing at the webapi prefix keep the short path.
        let url = if self.base_url.contains("webapi") {
            format!("{}/v2/GetIdeias", self.base_url)
        } else {
            format!("{}/webapi/api/ApiExterna/v2/GetIdeias", self.base_url)
        };

        let mut ideas = Vec::new();
        let mut page: u32 = 1;
        loop {
            // Pagination rides inside the filter object on this endpoint.
            let filters = serde_json::json!({
                "DataCriacaoInicio": start.format(FILTER_DATE_FMT).to_string(),
                "DataCriacaoTermino": end.format(FILTER_DATE_FMT).to_string(),
                "itensPorPagina": IDEAS_PER_PAGE,
                "pagina": page,
            });
            let filters = serde_json::to_string(&filters)?;

            let body: IdeaPage = self
                .http
                .get(&url)
                .query(&[
                    ("token", self.token.as_str()),
                    ("filtros", filters.as_str()),
                ])
                .send()
                .await
                .context("idea request failed")?
                .error_for_status()
                .context("idea request returned an error status")?
                .json()
                .await
                .context("malformed idea page payload")?;

            println!(
                "Idea page {}/{} fetched ({} items).",
                body.current_page,
                body.total_pages,
                body.resultado.len()
            );

            ideas.extend(body.resultado);
            if body.current_page >= body.total_pages {
                break;
            }
            page = body.current_page + 1;
        }

        println!("Retrieved {} ideas in total.", ideas.len());
        Ok(ideas)
    }
}
