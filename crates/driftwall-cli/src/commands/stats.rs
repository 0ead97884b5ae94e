//! Offline sampling-frequency report: draw from a feed snapshot many times
//! and compare observed frequency against the weight contract.

use std::collections::HashMap;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use driftwall_core::{WeightTable, weight_for};

use super::{fail, load_feed};

pub fn run(feed: &str, draws: usize, seed: Option<u64>, json: bool) {
    let messages = match load_feed(Path::new(feed)) {
        Ok(messages) => messages,
        Err(e) => fail(e),
    };

    let table = WeightTable::build(&messages);
    if table.is_empty() {
        println!(
            "{} records, none eligible (all scores negative) — nothing to sample",
            messages.len()
        );
        return;
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut counts: HashMap<&str, u64> = HashMap::new();
    for _ in 0..draws {
        if let Some(message) = table.sample(&mut rng) {
            *counts.entry(message.id.as_str()).or_default() += 1;
        }
    }

    let total = table.total_weight() as f64;

    if json {
        let rows: Vec<serde_json::Value> = table
            .entries()
            .iter()
            .map(|entry| {
                let m = &entry.message;
                let weight = weight_for(m).unwrap_or(0);
                let observed = counts.get(m.id.as_str()).copied().unwrap_or(0);
                serde_json::json!({
                    "id": m.id,
                    "author": m.author,
                    "score": m.score,
                    "weight": weight,
                    "expected": weight as f64 / total,
                    "observed": observed as f64 / draws as f64,
                    "draws": observed,
                })
            })
            .collect();
        let report = serde_json::json!({
            "records": messages.len(),
            "eligible": table.len(),
            "total_weight": table.total_weight(),
            "draws": draws,
            "rows": rows,
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
        return;
    }

    println!(
        "{} records, {} eligible, total weight {}, {} draws\n",
        messages.len(),
        table.len(),
        table.total_weight(),
        draws
    );
    println!(
        "  {:<12} {:<16} {:>6} {:>7} {:>10} {:>10}",
        "id", "author", "score", "weight", "expected", "observed"
    );
    for entry in table.entries() {
        let m = &entry.message;
        let weight = weight_for(m).unwrap_or(0);
        let observed = counts.get(m.id.as_str()).copied().unwrap_or(0);
        println!(
            "  {:<12} {:<16} {:>6} {:>7} {:>9.2}% {:>9.2}%",
            m.id,
            m.author,
            m.score,
            weight,
            weight as f64 / total * 100.0,
            observed as f64 / draws as f64 * 100.0
        );
    }
}
