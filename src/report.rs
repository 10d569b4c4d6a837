use crate::aggregator::Verdict;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub verdict: Verdict,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub source_url: String,
    pub analysis_duration_ms: u128,
    pub version: String,
}

pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_report(
        &self,
        verdict: &Verdict,
        source_url: &str,
        analysis_duration_ms: u128,
    ) -> Report {
        Report {
            metadata: ReportMetadata {
                generated_at: chrono::Utc::now().to_rfc3339(),
                source_url: source_url.to_string(),
                analysis_duration_ms,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            verdict: verdict.clone(),
        }
    }

    /// Write the report as JSON and Markdown, returning the written paths.
    pub fn export_report(&self, report: &Report, output_dir: &PathBuf) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;
        let mut exported = Vec::new();

        let json_path = output_dir.join("analysis-report.json");
        fs::write(&json_path, serde_json::to_string_pretty(report)?)?;
        exported.push(json_path);

        let markdown_path = output_dir.join("analysis-report.md");
        fs::write(&markdown_path, self.render_markdown(report))?;
        exported.push(markdown_path);

        Ok(exported)
    }

    pub fn render_markdown(&self, report: &Report) -> String {
        let verdict = &report.verdict;
        let mut md = String::new();

        md.push_str("# Terms of Service Analysis\n\n");
        md.push_str(&format!("**Source:** {}\n\n", report.metadata.source_url));
        md.push_str(&format!("**Generated:** {}\n\n", report.metadata.generated_at));
        md.push_str(&format!("**Risk score:** {}/10\n\n", verdict.risk_score));

        md.push_str("## Summary\n\n");
        md.push_str(&verdict.plain_english_summary);
        md.push_str("\n\n");

        md.push_str("## Key Concerns\n\n");
        if verdict.key_concerns.is_empty() {
            md.push_str("None identified.\n");
        } else {
            for concern in &verdict.key_concerns {
                md.push_str(&format!("- {}\n", concern));
            }
        }
        md.push('\n');

        if !verdict.problematic_clauses.is_empty() {
            md.push_str("## Problematic Clauses\n\n");
            for clause in &verdict.problematic_clauses {
                md.push_str(&format!("- {}\n", clause));
            }
            md.push('\n');
        }

        md.push_str("## What the Document Says\n\n");
        push_category(&mut md, "Data collection", &verdict.data_collection_practices);
        push_category(&mut md, "Data sharing", &verdict.data_sharing);
        push_category(&mut md, "User rights", &verdict.user_rights);
        push_category(&mut md, "Change notification", &verdict.changes_notification);

        md.push_str("## Recommended Actions\n\n");
        for action in &verdict.recommended_actions {
            md.push_str(&format!("- {}\n", action));
        }

        md
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

fn push_category(md: &mut String, title: &str, statements: &[String]) {
    if statements.is_empty() {
        return;
    }

    md.push_str(&format!("### {}\n\n", title));
    for statement in statements {
        md.push_str(&format!("- {}\n", statement));
    }
    md.push('\n');
}
