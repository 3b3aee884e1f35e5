//! Grid assembly: cluster bubble candidates into ordered question rows.

use crate::{BubbleRegion, DetectorParams, GradeError, GradingConfig};
use log::debug;

/// One question row: exactly `options` bubbles, ordered left to right.
#[derive(Clone, Debug)]
pub struct QuestionRow {
    pub bubbles: Vec<BubbleRegion>,
}

struct RowCluster {
    /// Vertical center of the first member; later members must fall
    /// within the row tolerance of it.
    rep_y: f32,
    members: Vec<BubbleRegion>,
}

/// Cluster candidates by vertical center, order rows top-to-bottom and
/// members left-to-right, and keep only clusters whose size matches the
/// configured option count.
///
/// Fewer retained rows than `config.questions()` is an error rather than a
/// silent truncation: a partial grid would produce misleading scores.
pub fn assemble_grid(
    regions: Vec<BubbleRegion>,
    config: &GradingConfig,
    params: &DetectorParams,
) -> Result<Vec<QuestionRow>, GradeError> {
    let mut clusters: Vec<RowCluster> = Vec::new();

    for region in regions {
        let cy = region.center_y();
        match clusters
            .iter_mut()
            .find(|c| (cy - c.rep_y).abs() < params.row_tolerance)
        {
            Some(c) => c.members.push(region),
            None => clusters.push(RowCluster {
                rep_y: cy,
                members: vec![region],
            }),
        }
    }

    clusters.sort_by(|a, b| a.rep_y.total_cmp(&b.rep_y));

    let total = clusters.len();
    let mut rows: Vec<QuestionRow> = clusters
        .into_iter()
        .filter(|c| c.members.len() == config.options())
        .map(|mut c| {
            c.members
                .sort_by(|a, b| a.center_x().total_cmp(&b.center_x()));
            QuestionRow { bubbles: c.members }
        })
        .collect();
    rows.truncate(config.questions());

    debug!(
        "{} of {total} clusters retained as rows (need {})",
        rows.len(),
        config.questions()
    );

    if rows.len() < config.questions() {
        return Err(GradeError::Grid {
            expected: config.questions(),
            found: rows.len(),
        });
    }

    Ok(rows)
}
