//! XLSX export of the aggregate views, for dashboard hand-offs that want a
//! file rather than a rendered page.

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::aggregate::{self, RankMetric};
use crate::model::Snapshot;

pub struct ExportReport {
    pub scorer_rows: usize,
    pub assist_rows: usize,
    pub performance_rows: usize,
    pub position_rows: usize,
}

pub fn export_dashboard(path: &Path, snapshot: &Snapshot, limit: usize) -> Result<ExportReport> {
    let mut scorer_rows = vec![header_row()];
    for row in aggregate::rank_by_metric(snapshot, RankMetric::Goals, limit) {
        scorer_rows.push(leaderboard_row(row.player_id, &row.name, row.team.as_deref(), row.value));
    }

    let mut assist_rows = vec![header_row()];
    for row in aggregate::rank_by_metric(snapshot, RankMetric::Assists, limit) {
        assist_rows.push(leaderboard_row(row.player_id, &row.name, row.team.as_deref(), row.value));
    }

    let mut performance_rows = vec![vec![
        "Player ID".to_string(),
        "Player".to_string(),
        "Team".to_string(),
        "Goals".to_string(),
        "Assists".to_string(),
        "Total".to_string(),
    ]];
    for row in aggregate::performance_index(snapshot, limit) {
        performance_rows.push(vec![
            row.player_id.to_string(),
            row.name.clone(),
            row.team.clone().unwrap_or_default(),
            row.goals.to_string(),
            row.assists.to_string(),
            row.total.to_string(),
        ]);
    }

    let mut position_rows = vec![vec!["Position".to_string(), "Players".to_string()]];
    let distribution = aggregate::position_distribution(&snapshot.players);
    let mut buckets: Vec<_> = distribution.into_iter().collect();
    buckets.sort_by_key(|(bucket, _)| *bucket);
    for (bucket, count) in &buckets {
        position_rows.push(vec![bucket.label().to_string(), count.to_string()]);
    }

    let totals = aggregate::match_summary(&snapshot.matches);
    let totals_rows = vec![
        vec!["Total Goals".to_string(), totals.total_goals.to_string()],
        vec![
            "Average Goals / Match".to_string(),
            format!("{:.2}", totals.average_goals_per_match),
        ],
    ];

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Scorers")?;
        write_rows(sheet, &scorer_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Assists")?;
        write_rows(sheet, &assist_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Performance")?;
        write_rows(sheet, &performance_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Positions")?;
        write_rows(sheet, &position_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("MatchTotals")?;
        write_rows(sheet, &totals_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        scorer_rows: scorer_rows.len() - 1,
        assist_rows: assist_rows.len() - 1,
        performance_rows: performance_rows.len() - 1,
        position_rows: position_rows.len() - 1,
    })
}

fn header_row() -> Vec<String> {
    vec![
        "Player ID".to_string(),
        "Player".to_string(),
        "Team".to_string(),
        "Value".to_string(),
    ]
}

fn leaderboard_row(player_id: u32, name: &str, team: Option<&str>, value: u32) -> Vec<String> {
    vec![
        player_id.to_string(),
        name.to_string(),
        team.unwrap_or_default().to_string(),
        value.to_string(),
    ]
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
