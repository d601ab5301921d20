//! Read-only summary of the processed articles file: headline metrics, the
//! two aggregate charts and the feed of risky articles.

use crate::adapters::csv_codec::decode_processed_articles;
use crate::core::{ScoredArticle, Storage};
use crate::utils::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

const TOP_SOURCES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 5.0 {
            RiskLevel::High
        } else if score >= 3.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub risk_articles: usize,
    pub average_risk_score: f64,
    pub average_risk_level: RiskLevel,
    pub top_source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRisk {
    pub source: String,
    pub total_risk: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCount {
    pub risk_score: u32,
    pub articles: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub title: String,
    pub url: String,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub source: String,
    pub published: Option<NaiveDate>,
    pub description: String,
    pub entities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub metrics: Metrics,
    pub top_sources: Vec<SourceRisk>,
    pub score_distribution: Vec<ScoreCount>,
    pub feed: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardState {
    /// The processed file does not exist yet.
    Unavailable { path: String },
    /// The file exists but no article carries any risk.
    Clear,
    Ready(Dashboard),
}

/// Date part of an ISO-8601 timestamp ("2024-01-05T10:00:00Z" -> 2024-01-05).
pub fn published_date(published_at: &str) -> Option<NaiveDate> {
    let date = published_at.split('T').next()?.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

impl Dashboard {
    /// Builds the dashboard from articles with a positive score. Returns
    /// `None` when none qualify.
    pub fn from_articles(articles: Vec<ScoredArticle>) -> Option<Self> {
        let risky: Vec<ScoredArticle> = articles
            .into_iter()
            .filter(|article| article.risk_score > 0)
            .collect();
        if risky.is_empty() {
            return None;
        }

        Some(Self {
            metrics: metrics(&risky),
            top_sources: top_sources(&risky),
            score_distribution: score_distribution(&risky),
            feed: feed(risky),
        })
    }
}

fn metrics(articles: &[ScoredArticle]) -> Metrics {
    let total: u64 = articles.iter().map(|a| u64::from(a.risk_score)).sum();
    let average = (total as f64 / articles.len() as f64 * 100.0).round() / 100.0;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for article in articles {
        *counts.entry(article.source.as_str()).or_default() += 1;
    }
    // BTreeMap iterates alphabetically, so the first maximum wins ties.
    let mut top_source = "";
    let mut top_count = 0;
    for (source, count) in counts {
        if count > top_count {
            top_source = source;
            top_count = count;
        }
    }

    Metrics {
        risk_articles: articles.len(),
        average_risk_score: average,
        average_risk_level: RiskLevel::from_score(average),
        top_source: top_source.to_string(),
    }
}

fn top_sources(articles: &[ScoredArticle]) -> Vec<SourceRisk> {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for article in articles {
        *totals.entry(article.source.as_str()).or_default() += u64::from(article.risk_score);
    }

    let mut ranked: Vec<SourceRisk> = totals
        .into_iter()
        .map(|(source, total_risk)| SourceRisk {
            source: source.to_string(),
            total_risk,
        })
        .collect();
    ranked.sort_by(|a, b| b.total_risk.cmp(&a.total_risk).then(a.source.cmp(&b.source)));
    ranked.truncate(TOP_SOURCES);
    ranked
}

fn score_distribution(articles: &[ScoredArticle]) -> Vec<ScoreCount> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for article in articles {
        *counts.entry(article.risk_score).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(risk_score, articles)| ScoreCount {
            risk_score,
            articles,
        })
        .collect()
}

fn feed(articles: Vec<ScoredArticle>) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = articles
        .into_iter()
        .map(|article| {
            let published = published_date(&article.published_at);
            if published.is_none() {
                tracing::warn!(
                    "Unparseable publishedAt '{}' for {}",
                    article.published_at,
                    article.url
                );
            }
            FeedItem {
                title: article.title.unwrap_or_default(),
                url: article.url,
                risk_score: article.risk_score,
                risk_level: RiskLevel::from_score(f64::from(article.risk_score)),
                source: article.source,
                published,
                description: article.description.unwrap_or_default(),
                entities: article.entities,
            }
        })
        .collect();
    // Newest first; undated items sink to the bottom.
    items.sort_by(|a, b| b.published.cmp(&a.published));
    items
}

/// Loads the processed file. A missing file is a state, not an error.
pub async fn load_dashboard<S: Storage>(storage: &S, processed_file: &str) -> Result<DashboardState> {
    if !storage.exists(processed_file).await {
        let path = storage.display_path(processed_file);
        tracing::error!("Processed file not found at: {}", path);
        return Ok(DashboardState::Unavailable { path });
    }

    let data = storage.read_file(processed_file).await?;
    let articles = decode_processed_articles(&data)?;
    tracing::debug!("Loaded {} processed articles", articles.len());

    Ok(match Dashboard::from_articles(articles) {
        Some(dashboard) => DashboardState::Ready(dashboard),
        None => DashboardState::Clear,
    })
}

impl DashboardState {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "Supply Chain Risk Forecaster")?;
        writeln!(out, "============================")?;

        let dashboard = match self {
            DashboardState::Unavailable { path } => {
                writeln!(out, "Data not available: no processed file at {}.", path)?;
                writeln!(out, "Run the pipeline first (supply-risk run).")?;
                return Ok(());
            }
            DashboardState::Clear => {
                writeln!(out, "No high-risk articles found. The supply chain looks clear.")?;
                return Ok(());
            }
            DashboardState::Ready(dashboard) => dashboard,
        };

        let metrics = &dashboard.metrics;
        writeln!(out)?;
        writeln!(out, "Top-Level Metrics")?;
        writeln!(out, "  High-risk articles:    {}", metrics.risk_articles)?;
        writeln!(
            out,
            "  Average risk score:    {:.2} ({})",
            metrics.average_risk_score,
            metrics.average_risk_level.label()
        )?;
        writeln!(out, "  Most frequent source:  {}", metrics.top_source)?;

        writeln!(out)?;
        writeln!(out, "Top {} Risky Sources", TOP_SOURCES)?;
        let widest = dashboard
            .top_sources
            .iter()
            .map(|s| s.source.chars().count())
            .max()
            .unwrap_or(0);
        for entry in &dashboard.top_sources {
            writeln!(
                out,
                "  {:<width$}  {:>4}  {}",
                entry.source,
                entry.total_risk,
                "#".repeat(entry.total_risk.min(60) as usize),
                width = widest
            )?;
        }

        writeln!(out)?;
        writeln!(out, "Distribution of Risk Scores")?;
        for bucket in &dashboard.score_distribution {
            writeln!(
                out,
                "  score {:>3}  {:>4}  {}",
                bucket.risk_score,
                bucket.articles,
                "#".repeat(bucket.articles.min(60))
            )?;
        }

        writeln!(out)?;
        writeln!(out, "High-Risk Articles Feed")?;
        for item in &dashboard.feed {
            writeln!(out)?;
            writeln!(out, "### {}", item.title)?;
            writeln!(out, "    {}", item.url)?;
            let published = item
                .published
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            writeln!(
                out,
                "    Risk: {} ({}) | Source: {} | Published: {}",
                item.risk_score,
                item.risk_level.label(),
                item.source,
                published
            )?;
            if !item.description.is_empty() {
                writeln!(out, "    {}", item.description)?;
            }
            if !item.entities.is_empty() {
                writeln!(out, "    Entities: {}", item.entities.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(title: &str, source: &str, score: u32, published_at: &str) -> ScoredArticle {
        ScoredArticle {
            title: Some(title.to_string()),
            description: Some(format!("{} description", title)),
            url: format!("http://news/{}", title),
            published_at: published_at.to_string(),
            source: source.to_string(),
            risk_score: score,
            entities: vec![],
        }
    }

    #[test]
    fn test_risk_levels() {
        assert_eq!(RiskLevel::from_score(7.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(5.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(4.99), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(3.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(2.0), RiskLevel::Low);
    }

    #[test]
    fn test_published_date_truncates_time() {
        assert_eq!(
            published_date("2024-01-05T10:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(published_date("2024-01-05"), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(published_date("yesterday"), None);
        assert_eq!(published_date(""), None);
    }

    #[test]
    fn test_zero_scores_are_excluded() {
        let articles = vec![
            scored("calm", "AP", 0, "2024-01-01T00:00:00Z"),
            scored("quiet", "AP", 0, "2024-01-02T00:00:00Z"),
        ];
        assert!(Dashboard::from_articles(articles).is_none());
    }

    #[test]
    fn test_metrics_and_charts() {
        let articles = vec![
            scored("a", "Reuters", 7, "2024-01-01T08:00:00Z"),
            scored("b", "AP", 3, "2024-01-03T08:00:00Z"),
            scored("c", "Reuters", 2, "2024-01-02T08:00:00Z"),
            scored("d", "Bloomberg", 2, "not a date"),
            scored("e", "AP", 0, "2024-01-04T08:00:00Z"),
        ];

        let dashboard = Dashboard::from_articles(articles).unwrap();

        assert_eq!(dashboard.metrics.risk_articles, 4);
        assert_eq!(dashboard.metrics.average_risk_score, 3.5);
        assert_eq!(dashboard.metrics.average_risk_level, RiskLevel::Medium);
        assert_eq!(dashboard.metrics.top_source, "Reuters");

        assert_eq!(
            dashboard.top_sources,
            vec![
                SourceRisk { source: "Reuters".to_string(), total_risk: 9 },
                SourceRisk { source: "AP".to_string(), total_risk: 3 },
                SourceRisk { source: "Bloomberg".to_string(), total_risk: 2 },
            ]
        );
        assert_eq!(
            dashboard.score_distribution,
            vec![
                ScoreCount { risk_score: 2, articles: 2 },
                ScoreCount { risk_score: 3, articles: 1 },
                ScoreCount { risk_score: 7, articles: 1 },
            ]
        );

        let order: Vec<&str> = dashboard.feed.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);
        assert_eq!(dashboard.feed[2].risk_level, RiskLevel::High);
    }

    #[test]
    fn test_top_sources_keeps_five_and_breaks_ties_alphabetically() {
        let articles: Vec<ScoredArticle> = ["F", "E", "D", "C", "B", "A"]
            .iter()
            .map(|source| scored(source, source, 2, "2024-01-01T00:00:00Z"))
            .collect();

        let dashboard = Dashboard::from_articles(articles).unwrap();
        let sources: Vec<&str> = dashboard
            .top_sources
            .iter()
            .map(|s| s.source.as_str())
            .collect();
        assert_eq!(sources, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(dashboard.metrics.top_source, "A");
    }

    #[test]
    fn test_average_is_rounded_to_two_places() {
        let articles = vec![
            scored("a", "AP", 2, "2024-01-01"),
            scored("b", "AP", 2, "2024-01-01"),
            scored("c", "AP", 3, "2024-01-01"),
        ];
        let dashboard = Dashboard::from_articles(articles).unwrap();
        assert_eq!(dashboard.metrics.average_risk_score, 2.33);
    }

    #[test]
    fn test_render_states() {
        let unavailable = DashboardState::Unavailable {
            path: "artifacts/processed_articles.csv".to_string(),
        };
        assert!(unavailable.render_text().contains("Data not available"));
        assert!(DashboardState::Clear.render_text().contains("looks clear"));

        let dashboard =
            Dashboard::from_articles(vec![scored("Port strike", "AP", 2, "2024-01-01")]).unwrap();
        let text = DashboardState::Ready(dashboard).render_text();
        assert!(text.contains("### Port strike"));
        assert!(text.contains("Risk: 2 (LOW) | Source: AP | Published: 2024-01-01"));
    }

    #[test]
    fn test_json_state_tag() {
        let json = serde_json::to_value(DashboardState::Clear).unwrap();
        assert_eq!(json, serde_json::json!({"state": "clear"}));
    }
}
