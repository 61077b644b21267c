//! Funnel stage catalogue and the stage distribution view.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::InteractionRecord;

/// Bucket for records with no stage.
pub const UNKNOWN_STAGE: &str = "Unknown";

/// Default number of labels kept in the distribution.
pub const DEFAULT_TOP_STAGES: usize = 5;

/// Known stage keys with their display labels, in funnel order.
pub const STAGES: [(&str, &str); 5] = [
    ("rapport_inicial", "Contato Inicial"),
    ("apresentacao_produto", "Apresentação do Produto"),
    ("validacao_dores_e_culpas", "Validação de Dores e Culpas"),
    ("pitch_direto", "Pitch Direto"),
    ("quebra_de_objecao", "Quebra de Objeções"),
];

/// Display label for a known stage key.
pub fn stage_label(key: &str) -> Option<&'static str> {
    STAGES
        .iter()
        .find(|(stage_key, _)| *stage_key == key)
        .map(|(_, label)| *label)
}

/// Position of a key in the canonical funnel order.
pub fn stage_index(key: &str) -> Option<usize> {
    STAGES.iter().position(|(stage_key, _)| *stage_key == key)
}

/// Label used by the distribution view for a raw stage value.
///
/// Missing or empty stages become [`UNKNOWN_STAGE`]; unrecognized keys pass
/// through.
pub fn display_label(stage: Option<&str>) -> &str {
    match stage {
        None | Some("") => UNKNOWN_STAGE,
        Some(key) => stage_label(key).unwrap_or(key),
    }
}

/// One bar of the stage distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub label: String,
    pub count: usize,
}

/// Count records per stage label, most common first, keeping `limit` labels.
///
/// Ties keep the order in which labels were first seen.
pub fn stage_distribution(records: &[InteractionRecord], limit: usize) -> Vec<StageCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<StageCount> = Vec::new();

    for record in records {
        let label = display_label(record.stage.as_deref());
        match positions.get(label).copied() {
            Some(idx) => counts[idx].count += 1,
            None => {
                positions.insert(label, counts.len());
                counts.push(StageCount {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn with_stage(stage: Option<&str>) -> InteractionRecord {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut r = InteractionRecord::new(0, ts);
        r.stage = stage.map(str::to_string);
        r
    }

    fn records(rows: &[(Option<&str>, usize)]) -> Vec<InteractionRecord> {
        rows.iter()
            .flat_map(|(stage, n)| std::iter::repeat_with(move || with_stage(*stage)).take(*n))
            .collect()
    }

    #[test]
    fn test_labels() {
        assert_eq!(stage_label("pitch_direto"), Some("Pitch Direto"));
        assert_eq!(stage_label("nope"), None);
        assert_eq!(display_label(None), "Unknown");
        assert_eq!(display_label(Some("")), "Unknown");
        assert_eq!(display_label(Some("quebra_de_objecao")), "Quebra de Objeções");
        assert_eq!(display_label(Some("follow_up")), "follow_up");
        assert_eq!(stage_index("rapport_inicial"), Some(0));
        assert_eq!(stage_index("quebra_de_objecao"), Some(4));
    }

    #[test]
    fn test_empty_distribution() {
        assert!(stage_distribution(&[], DEFAULT_TOP_STAGES).is_empty());
    }

    #[test]
    fn test_distribution_sorted_and_labelled() {
        let records = records(&[
            (Some("rapport_inicial"), 2),
            (None, 3),
            (Some("pitch_direto"), 5),
            (Some("follow_up"), 1),
        ]);
        let dist = stage_distribution(&records, DEFAULT_TOP_STAGES);
        assert_eq!(
            dist,
            vec![
                StageCount { label: "Pitch Direto".to_string(), count: 5 },
                StageCount { label: "Unknown".to_string(), count: 3 },
                StageCount { label: "Contato Inicial".to_string(), count: 2 },
                StageCount { label: "follow_up".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_empty_stage_joins_unknown() {
        let records = records(&[(Some(""), 1), (None, 1)]);
        assert_eq!(
            stage_distribution(&records, DEFAULT_TOP_STAGES),
            vec![StageCount { label: "Unknown".to_string(), count: 2 }]
        );
    }

    #[test]
    fn test_distribution_truncates_with_stable_ties() {
        let records = records(&[
            (Some("a"), 1),
            (Some("b"), 1),
            (Some("c"), 2),
            (Some("d"), 1),
            (Some("e"), 1),
            (Some("f"), 1),
        ]);
        let dist = stage_distribution(&records, 5);
        let labels: Vec<_> = dist.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["c", "a", "b", "d", "e"]);
        assert!(dist.windows(2).all(|w| w[0].count >= w[1].count));
    }
}
