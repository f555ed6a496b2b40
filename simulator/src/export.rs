//! CSV export of simulation runs.

use rosistrat_types::SimulationRun;

/// Renders one row per spin: spin, number, net result, cumulative earnings,
/// the stake on every line (in line order) and the total stake.
pub fn to_csv(run: &SimulationRun) -> String {
    let line_ids = run.line_ids();
    let mut header = vec![
        "Spin".to_string(),
        "Number".to_string(),
        "Net Result".to_string(),
        "Cumulative".to_string(),
    ];
    header.extend(line_ids.iter().map(|id| format!("Bet {id}")));
    header.push("Total Bet".to_string());

    let mut out = header.join(",");
    out.push('\n');
    for record in &run.records {
        let mut row = vec![
            record.spin.to_string(),
            record.number.to_string(),
            record.net_result.to_string(),
            record.cumulative_earnings.to_string(),
        ];
        row.extend(
            line_ids
                .iter()
                .map(|id| record.bet_for(id).unwrap_or(0.0).to_string()),
        );
        row.push(record.total_bet().to_string());
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
