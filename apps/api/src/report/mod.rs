//! Report presenter — maps an [`AnalysisResult`] onto display calls.
//!
//! Each section reads only its own keys and never fails: missing scalars show
//! a placeholder, missing sequences show nothing.

use serde::Serialize;

use crate::analysis::AnalysisResult;

pub mod document;

pub use document::{ReportBlock, ReportDocument, ReportSink};

const NOT_DETECTED: &str = "Not detected";
const NOT_AVAILABLE: &str = "N/A";

pub const DOMAIN_COLUMNS: [&str; 3] = ["Domain", "Score", "Justification"];
pub const COMPETENCY_COLUMNS: [&str; 4] = ["Category", "Score", "Strength", "Observation"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Language,
    DomainScores,
    CompetencyScores,
    StrategicInsights,
    DevelopmentRecommendations,
    ComparativeBenchmarking,
    OverallSummary,
}

impl Section {
    /// Display order: general, then specific, then actionable, then summary.
    pub const ORDER: [Section; 7] = [
        Section::Language,
        Section::DomainScores,
        Section::CompetencyScores,
        Section::StrategicInsights,
        Section::DevelopmentRecommendations,
        Section::ComparativeBenchmarking,
        Section::OverallSummary,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Language => "Detected Language",
            Section::DomainScores => "Career Domain Fit Scores",
            Section::CompetencyScores => "Competency Evaluation",
            Section::StrategicInsights => "Strategic Insights",
            Section::DevelopmentRecommendations => "Development Recommendations",
            Section::ComparativeBenchmarking => "Comparative Benchmarking",
            Section::OverallSummary => "Overall Summary",
        }
    }

    pub fn render(&self, result: &AnalysisResult, sink: &mut dyn ReportSink) {
        match self {
            Section::Language => render_language(result, sink),
            Section::DomainScores => render_domain_scores(result, sink),
            Section::CompetencyScores => render_competency_scores(result, sink),
            Section::StrategicInsights => render_strategic_insights(result, sink),
            Section::DevelopmentRecommendations => render_development_recommendations(result, sink),
            Section::ComparativeBenchmarking => render_comparative_benchmarking(result, sink),
            Section::OverallSummary => render_overall_summary(result, sink),
        }
    }
}

/// Renders every section, once each, in [`Section::ORDER`].
pub fn render_report(result: &AnalysisResult, sink: &mut dyn ReportSink) {
    for section in Section::ORDER {
        section.render(result, sink);
    }
}

/// Convenience wrapper collecting the report into a [`ReportDocument`].
pub fn build_document(result: &AnalysisResult) -> ReportDocument {
    let mut document = ReportDocument::new();
    render_report(result, &mut document);
    document
}

pub fn render_language(result: &AnalysisResult, sink: &mut dyn ReportSink) {
    sink.subheader(Section::Language.title());
    sink.write(result.language().as_deref().unwrap_or(NOT_DETECTED));
}

pub fn render_domain_scores(result: &AnalysisResult, sink: &mut dyn ReportSink) {
    sink.subheader(Section::DomainScores.title());

    let rows: Vec<Vec<String>> = result
        .domain_scores()
        .into_iter()
        .map(|d| vec![cell(d.domain), cell(d.score), cell(d.justification)])
        .collect();

    if !rows.is_empty() {
        sink.table(&DOMAIN_COLUMNS, rows);
    }
}

pub fn render_competency_scores(result: &AnalysisResult, sink: &mut dyn ReportSink) {
    sink.subheader(Section::CompetencyScores.title());

    let rows: Vec<Vec<String>> = result
        .competency_scores()
        .into_iter()
        .map(|c| {
            vec![
                cell(c.category),
                cell(c.score),
                cell(c.strength),
                cell(c.observation),
            ]
        })
        .collect();

    if !rows.is_empty() {
        sink.table(&COMPETENCY_COLUMNS, rows);
    }
}

pub fn render_strategic_insights(result: &AnalysisResult, sink: &mut dyn ReportSink) {
    sink.subheader(Section::StrategicInsights.title());
    sink.write(result.strategic_insights().as_deref().unwrap_or(NOT_AVAILABLE));
}

pub fn render_development_recommendations(result: &AnalysisResult, sink: &mut dyn ReportSink) {
    sink.subheader(Section::DevelopmentRecommendations.title());
    for recommendation in result.development_recommendations() {
        sink.markdown(&format!("- {recommendation}"));
    }
}

pub fn render_comparative_benchmarking(result: &AnalysisResult, sink: &mut dyn ReportSink) {
    sink.subheader(Section::ComparativeBenchmarking.title());
    sink.write(result.comparative_benchmarking().as_deref().unwrap_or(NOT_AVAILABLE));
}

pub fn render_overall_summary(result: &AnalysisResult, sink: &mut dyn ReportSink) {
    sink.subheader(Section::OverallSummary.title());
    let summary = result.overall_summary();

    sink.markdown(&format!(
        "**Overall Score:** {}/100",
        summary.overall_score.as_deref().unwrap_or(NOT_AVAILABLE)
    ));

    sink.markdown("**Key Strengths:**");
    for strength in &summary.key_strengths {
        sink.markdown(&format!("- {strength}"));
    }

    sink.markdown("**Areas to Improve:**");
    for area in &summary.areas_to_improve {
        sink.markdown(&format!("- {area}"));
    }

    sink.markdown(&format!(
        "**Talent Potential:** {}",
        summary.talent_potential.as_deref().unwrap_or(NOT_AVAILABLE)
    ));
}

fn cell(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
