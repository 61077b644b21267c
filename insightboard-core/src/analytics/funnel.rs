//! Five-stage conversion funnel.
//!
//! Counts records per canonical stage and derives, for each stage, the share
//! of the first stage it retains and the drop-off from the stage before it.
//! Records whose stage is missing or not in the catalogue are ignored here,
//! unlike the distribution view which buckets them.

use serde::Serialize;

use super::stages::{stage_index, STAGES};
use crate::format::round1;
use crate::types::InteractionRecord;

/// One step of the funnel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStage {
    pub key: &'static str,
    pub label: &'static str,
    pub count: usize,
    /// count / first stage count * 100, rounded to one decimal
    pub percentage: f64,
    /// Drop from the previous stage in percent, `None` when undefined
    pub drop_rate: Option<f64>,
}

/// Compute the funnel in canonical stage order.
///
/// `drop_rate` is `None` for the first stage, after an empty stage, and for
/// any stage that is itself empty. The last case would otherwise read 100%;
/// it is kept as `None` to match what the dashboard has always shown.
pub fn funnel(records: &[InteractionRecord]) -> Vec<FunnelStage> {
    let mut counts = [0usize; STAGES.len()];
    for record in records {
        if let Some(idx) = record.stage.as_deref().and_then(stage_index) {
            counts[idx] += 1;
        }
    }

    let base = counts[0];

    STAGES
        .iter()
        .enumerate()
        .map(|(i, &(key, label))| {
            let count = counts[i];
            let percentage = if base > 0 {
                round1(count as f64 / base as f64 * 100.0)
            } else {
                0.0
            };
            FunnelStage {
                key,
                label,
                count,
                percentage,
                drop_rate: drop_rate(i.checked_sub(1).map(|p| counts[p]), count),
            }
        })
        .collect()
}

fn drop_rate(previous: Option<usize>, count: usize) -> Option<f64> {
    let previous = previous.filter(|&p| p > 0)?;
    if count == 0 {
        return None;
    }
    Some(round1(
        (previous as f64 - count as f64) / previous as f64 * 100.0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn records(rows: &[(Option<&str>, usize)]) -> Vec<InteractionRecord> {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        rows.iter()
            .flat_map(|(stage, n)| {
                std::iter::repeat_with(move || {
                    let mut r = InteractionRecord::new(0, ts);
                    r.stage = stage.map(str::to_string);
                    r
                })
                .take(*n)
            })
            .collect()
    }

    fn summary(stages: &[FunnelStage]) -> Vec<(usize, f64, Option<f64>)> {
        stages
            .iter()
            .map(|s| (s.count, s.percentage, s.drop_rate))
            .collect()
    }

    #[test]
    fn test_reference_scenario() {
        let records = records(&[
            (Some("rapport_inicial"), 10),
            (Some("apresentacao_produto"), 7),
            (Some("pitch_direto"), 3),
            (Some("quebra_de_objecao"), 3),
        ]);
        let stages = funnel(&records);

        assert_eq!(
            summary(&stages),
            vec![
                (10, 100.0, None),
                (7, 70.0, Some(30.0)),
                (0, 0.0, None),
                (3, 30.0, None),
                (3, 30.0, Some(0.0)),
            ]
        );
        assert_eq!(stages[2].key, "validacao_dores_e_culpas");
        assert_eq!(stages[4].label, "Quebra de Objeções");
    }

    #[test]
    fn test_empty_records() {
        let stages = funnel(&[]);
        assert_eq!(stages.len(), 5);
        assert!(stages
            .iter()
            .all(|s| s.count == 0 && s.percentage == 0.0 && s.drop_rate.is_none()));
    }

    #[test]
    fn test_ignores_unknown_and_missing_stages() {
        let records = records(&[
            (Some("rapport_inicial"), 4),
            (Some("follow_up"), 9),
            (None, 9),
        ]);
        let stages = funnel(&records);
        assert_eq!(stages.iter().map(|s| s.count).sum::<usize>(), 4);
        assert_eq!(stages[0].percentage, 100.0);
    }

    #[test]
    fn test_zero_base_zeroes_percentages() {
        let records = records(&[(Some("apresentacao_produto"), 5), (Some("pitch_direto"), 2)]);
        let stages = funnel(&records);
        assert!(stages.iter().all(|s| s.percentage == 0.0));
        assert_eq!(stages[0].drop_rate, None);
        // previous stage empty
        assert_eq!(stages[1].drop_rate, None);
        assert_eq!(stages[3].drop_rate, None);
    }

    #[test]
    fn test_empty_stage_has_no_drop_rate() {
        let records = records(&[(Some("rapport_inicial"), 6)]);
        let stages = funnel(&records);
        assert_eq!(stages[1].count, 0);
        assert_eq!(stages[1].drop_rate, None);
    }

    #[test]
    fn test_rounding() {
        let records = records(&[
            (Some("rapport_inicial"), 3),
            (Some("apresentacao_produto"), 2),
            (Some("validacao_dores_e_culpas"), 1),
        ]);
        let stages = funnel(&records);
        assert_eq!(stages[1].percentage, 66.7);
        assert_eq!(stages[1].drop_rate, Some(33.3));
        assert_eq!(stages[2].percentage, 33.3);
        assert_eq!(stages[2].drop_rate, Some(50.0));
    }

    #[test]
    fn test_serialize_stage() {
        let stages = funnel(&records(&[(Some("rapport_inicial"), 1)]));
        let json = serde_json::to_value(&stages[0]).unwrap();
        assert_eq!(json["dropRate"], serde_json::Value::Null);
        assert_eq!(json["percentage"], 100.0);
        assert_eq!(json["label"], "Contato Inicial");
    }
}
