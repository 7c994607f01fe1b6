use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use lequinte_db::models::{Candidate, RaceType};
use lequinte_db::store::{DEFAULT_WEIGHT, WeightStore};
use lequinte_engine::learning::LearnReport;

pub fn display_candidates(race_type: RaceType, qualifying: usize, candidates: &[Candidate]) {
    let (min, max) = race_type.sum_bounds();
    println!(
        "\n✅ Top {} : {} (somme {}-{}, {} combinaisons éligibles)\n",
        candidates.len(),
        race_type,
        min,
        max,
        qualifying
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Combinaison", "Somme", "Score"]);

    for (i, candidate) in candidates.iter().enumerate() {
        table.add_row(vec![
            &format!("{}", i + 1),
            &candidate.to_string(),
            &candidate.sum().to_string(),
            &format!("{:.2}", candidate.score),
        ]);
    }
    println!("{table}");
}

pub fn display_weights(store: &WeightStore) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Poids"]);

    for (number, weight) in store.rounded() {
        let color = if weight > DEFAULT_WEIGHT {
            Color::Green
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", number)),
            Cell::new(format!("{:.2}", weight)).fg(color),
        ]);
    }
    println!("{table}");
}

fn format_gains(bonuses: &[(u8, f64)]) -> String {
    bonuses
        .iter()
        .map(|(n, bonus)| format!("{n} (+{bonus:.2})"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn display_learn_report(report: &LearnReport, store: &WeightStore) {
    println!("Bonus appliqués : {}", format_gains(&report.bonuses));
    println!("Total ajouté    : {:.2}\n", report.total_bonus);
    display_weights(store);
}
