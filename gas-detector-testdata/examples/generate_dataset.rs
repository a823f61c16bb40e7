//! Example: Generate a dataset for every detector scenario.
//!
//! Run with: cargo run --example generate_dataset

use gas_detector_testdata::{
    create_detector_signal, DatasetBuilder, DetectorScenario, GeneratorConfig,
};
use std::fs;

fn main() {
    println!("Gas Detector Testdata Generator");
    println!("===============================\n");

    let out_dir = "datasets";
    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("Could not create {}: {}", out_dir, e);
        return;
    }

    for scenario in DetectorScenario::ALL {
        let config = GeneratorConfig::new()
            .with_tick_interval_ms(10)
            .with_duration_secs(60.0)
            .with_seed(42);

        let signal = create_detector_signal(scenario, config.num_samples);
        let dataset = DatasetBuilder::new(signal)
            .with_config(config)
            .with_name(scenario.name())
            .with_description(&format!("{} scenario, 12-bit samples", scenario))
            .build();

        let csv_path = format!("{}/{}.csv", out_dir, scenario.name());
        match dataset.to_csv(&csv_path) {
            Ok(()) => println!("  Created {}", csv_path),
            Err(e) => eprintln!("  Warning: Could not save {}: {}", csv_path, e),
        }

        let json_path = format!("{}/{}.json", out_dir, scenario.name());
        if let Err(e) = dataset.to_json(&json_path) {
            eprintln!("  Warning: Could not save {}: {}", json_path, e);
        }

        if let Some(stats) = dataset.stats() {
            println!(
                "    {} samples, {} missing, mean {:.1}, range {}..={}",
                stats.count + stats.missing,
                stats.missing,
                stats.mean,
                stats.min,
                stats.max
            );
        }
    }

    println!("\nAll datasets generated successfully!");
}
