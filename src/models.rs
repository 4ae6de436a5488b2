use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Timestamps below this year are sentinel values from the platform
/// (uninitialized .NET dates arrive as year 0001).
const MIN_VALID_YEAR: i32 = 1900;

pub fn valid_timestamp(ts: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    ts.filter(|t| t.year() >= MIN_VALID_YEAR)
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentInfo {
    #[serde(alias = "Id")]
    pub id: i64,
    #[serde(alias = "Nome")]
    pub name: String,
    #[serde(default, alias = "GestorId")]
    pub manager_id: Option<String>,
    #[serde(alias = "Ativa")]
    pub is_active: bool,
}

/// A roster member as returned by the platform's user endpoint. The
/// gateway resolves sub-departments server-side, so a fetched roster is
/// already flat.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Name")]
    pub full_name: String,
    /// External-system login; doubles as the public-facing "matricula".
    #[serde(alias = "UserName")]
    pub username: String,
    #[serde(default, alias = "Email")]
    pub email: Option<String>,
    #[serde(default, alias = "Cargo")]
    pub job_title: Option<String>,
    #[serde(alias = "Departamento")]
    pub department: DepartmentInfo,
    #[serde(alias = "CriadoEm")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "Ativo")]
    pub is_active: bool,
}

/// One lifecycle stage of an idea. Labels come in up to three languages;
/// either timestamp may be missing or a sentinel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Stage {
    #[serde(default, alias = "LabelPt")]
    pub label_pt: Option<String>,
    #[serde(default, alias = "LabelEn")]
    pub label_en: Option<String>,
    #[serde(default, alias = "LabelEs")]
    pub label_es: Option<String>,
    #[serde(default, alias = "DataEntrada")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "DataSaida")]
    pub end_date: Option<DateTime<Utc>>,
}

impl Stage {
    pub fn label(&self) -> Option<&str> {
        self.label_pt
            .as_deref()
            .or(self.label_en.as_deref())
            .or(self.label_es.as_deref())
    }

    /// Entry timestamp when valid, exit timestamp otherwise.
    pub fn event_timestamp(&self) -> Option<DateTime<Utc>> {
        valid_timestamp(self.start_date).or_else(|| valid_timestamp(self.end_date))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Implementer {
    #[serde(default, alias = "Id")]
    pub user_id: Option<String>,
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Idea {
    #[serde(alias = "Id")]
    pub id: i64,
    #[serde(default, alias = "Titulo")]
    pub title: Option<String>,
    #[serde(default, alias = "Estado")]
    pub current_stage_name: Option<String>,
    #[serde(default, alias = "ElaboradorId")]
    pub creator_id: Option<String>,
    #[serde(default, alias = "CriadoEm")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "Etapas")]
    pub stages: Vec<Stage>,
    #[serde(default, alias = "ResponsaveisImplantacao")]
    pub implementers: Vec<Implementer>,
}

impl Idea {
    pub fn creation_timestamp(&self) -> Option<DateTime<Utc>> {
        valid_timestamp(self.created_at)
    }

    pub fn display_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| "Sem Título".to_string())
    }

    pub fn display_status(&self) -> String {
        self.current_stage_name
            .clone()
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

// Report value objects. Field names are part of the public contract.

#[derive(Debug, Clone, Serialize)]
pub struct StatusDistribution {
    pub status_title: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdeaStatusSummary {
    pub title: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRankingEntry {
    pub user_name: String,
    pub total_ideas: usize,
    pub ideas_summary: Vec<IdeaStatusSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineMetric {
    pub period: String,
    pub approval_sent_count: usize,
    pub validation_sent_count: usize,
    pub implemented_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdeaBasicInfo {
    pub id: i64,
    pub title: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserCreationStats {
    pub user_id: String,
    pub user_name: String,
    pub total_sent: usize,
    pub has_submitted_idea: bool,
    pub hit_plr_target: bool,
    pub hit_dept_individual_target: bool,
    pub ideas: Vec<IdeaBasicInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineComparison {
    pub period: String,
    pub total_sent: usize,
    pub target: usize,
    pub hit_target: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub total_ideas_analyzed: usize,
    pub user_ranking: Vec<UserRankingEntry>,
    pub status_distribution: Vec<StatusDistribution>,
    pub monthly_timeline: Vec<TimelineMetric>,
    pub weekly_timeline: Vec<TimelineMetric>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreationReport {
    pub target_year: i32,
    pub user_ranking: Vec<UserCreationStats>,
    pub monthly_timeline: Vec<TimelineComparison>,
    pub weekly_timeline: Vec<TimelineComparison>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombinedReport {
    pub execution_analytics: ExecutionReport,
    pub creation_analytics: CreationReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndividualReport {
    pub user_matricula: String,
    pub user_name: String,
    pub target_year: i32,
    pub created_count: usize,
    pub created_status_distribution: Vec<StatusDistribution>,
    pub pending_implementation_count: usize,
    pub pending_implementation_list: Vec<IdeaBasicInfo>,
    pub completed_implementation_count: usize,
}
