//! Fuzz target for bayes-lab.json parsing and validation.

#![no_main]

use bl_config::{validate_config, LabConfig, ScenarioCatalog};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = LabConfig::from_json_str(text) else {
        return;
    };
    if validate_config(&config).is_ok() {
        // A validated config always yields a usable catalog.
        let catalog = ScenarioCatalog::from_config(&config);
        for scenario in catalog.list() {
            assert!(catalog.find(&scenario.name).is_some());
        }
    }
});
