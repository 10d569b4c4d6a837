use crate::llm::ChunkFinding;
use serde::{Deserialize, Serialize};

/// Document-level analysis aggregated from all per-segment findings.
/// Immutable once built; this is what gets cached and returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub risk_score: u8,
    pub key_concerns: Vec<String>,
    pub data_collection_practices: Vec<String>,
    pub data_sharing: Vec<String>,
    pub user_rights: Vec<String>,
    pub changes_notification: Vec<String>,
    pub plain_english_summary: String,
    pub problematic_clauses: Vec<String>,
    pub recommended_actions: Vec<String>,
}

impl Verdict {
    pub fn print_summary(&self) {
        println!("📊 Document Analysis Summary");
        println!("============================");
        println!("\n⚠️  Risk score: {}/10", self.risk_score);

        if self.key_concerns.is_empty() {
            println!("\n✅ No key concerns identified");
        } else {
            println!("\n🔑 Key concerns:");
            for concern in &self.key_concerns {
                println!("   - {}", concern);
            }
        }

        if !self.problematic_clauses.is_empty() {
            println!("\n📌 Problematic clauses: {}", self.problematic_clauses.len());
        }

        println!("\n📝 {}", self.plain_english_summary);

        println!("\n💡 Recommended actions:");
        for action in &self.recommended_actions {
            println!("   - {}", action);
        }
    }
}

/// Folds the ordered per-segment findings into one [`Verdict`].
///
/// Pure and deterministic: per-category collections preserve segment
/// order, and the risk score is a naive keyword-trigger heuristic (start
/// at 5, bump for concerning clauses / third-party sharing / limited
/// rights, clamp to 1..=10) — a placeholder, not a calibrated risk model.
pub fn aggregate(findings: &[ChunkFinding]) -> Verdict {
    let has_concerning_clauses = findings.iter().any(|f| !f.concerning_clauses.is_empty());
    let shares_with_third_parties = findings
        .iter()
        .any(|f| f.data_sharing.contains("third parties"));
    let rights_are_limited = findings.iter().any(|f| f.user_rights.contains("limited"));

    let mut score: i32 = 5;
    if has_concerning_clauses {
        score += 2;
    }
    if shares_with_third_parties {
        score += 1;
    }
    if rights_are_limited {
        score += 1;
    }
    let risk_score = score.clamp(1, 10) as u8;

    let mut key_concerns = Vec::new();
    if has_concerning_clauses {
        key_concerns.push("Concerning clauses present".to_string());
    }
    if shares_with_third_parties {
        key_concerns.push("Data shared with third parties".to_string());
    }
    if rights_are_limited {
        key_concerns.push("Limited user rights".to_string());
    }

    let plain_english_summary = format!(
        "This terms and conditions document has a risk score of {}/10. \
         Key concerns include {}. \
         The document outlines data collection practices, data sharing policies, and user rights. \
         Some clauses may be concerning, and you should pay attention to how changes to the terms are notified.",
        risk_score,
        key_concerns.join(", ")
    );

    let mut recommended_actions =
        vec!["Carefully review the identified concerning clauses".to_string()];
    if risk_score > 7 {
        recommended_actions.push("Consider seeking legal advice".to_string());
    }
    if shares_with_third_parties {
        recommended_actions.push("Review data sharing settings if available".to_string());
    }

    Verdict {
        risk_score,
        key_concerns,
        data_collection_practices: findings
            .iter()
            .map(|f| f.data_collection_practices.clone())
            .collect(),
        data_sharing: findings.iter().map(|f| f.data_sharing.clone()).collect(),
        user_rights: findings.iter().map(|f| f.user_rights.clone()).collect(),
        changes_notification: findings
            .iter()
            .map(|f| f.changes_notification.clone())
            .collect(),
        plain_english_summary,
        // duplicates across segments are kept; no dedup
        problematic_clauses: findings
            .iter()
            .flat_map(|f| f.concerning_clauses.iter().cloned())
            .collect(),
        recommended_actions,
    }
}
