//! Fuzz target for lab command lines.

#![no_main]

use bl_config::ScenarioCatalog;
use bl_core::inference::ExplainOptions;
use bl_core::lab::{parse_command, LabCommand, LabSession};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let Ok(mut lab) = LabSession::from_scenario(
        ScenarioCatalog::builtin(),
        "Fraud detection",
        1000.0,
        ExplainOptions::default(),
    ) else {
        return;
    };
    for line in text.lines() {
        match parse_command(line) {
            Ok(LabCommand::Edit(edit)) => {
                if let Ok(step) = lab.apply(edit) {
                    assert!((0.0..=1.0).contains(&step.result.posterior));
                }
            }
            Ok(LabCommand::Quit) => break,
            Ok(_) | Err(_) => {}
        }
    }
});
