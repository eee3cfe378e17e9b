//! Fuzz target for the INI inventory parser.
//!
//! Feeds arbitrary lines, host patterns and variable strings through the
//! parser, the pattern matcher and the writer.

#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use rustible_inventory::inventory::{ini::split_variables, to_ini_string, Inventory};

/// Arbitrary inventory input for fuzzing
#[derive(Debug, Clone, Arbitrary)]
struct FuzzInventory {
    lines: Vec<String>,
    pattern: String,
    host_vars: String,
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Raw text, exactly as it would come from a file
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = Inventory::from_ini(text);
    }

    let mut unstructured = Unstructured::new(data);
    let Ok(input) = FuzzInventory::arbitrary(&mut unstructured) else {
        return;
    };

    for token in split_variables(&input.host_vars) {
        assert!(!token.is_empty());
    }

    if let Ok(inventory) = Inventory::from_lines(&input.lines) {
        let _ = inventory.get_hosts(&input.pattern);

        for host in inventory.hosts() {
            let _ = inventory.host_vars(host);
        }

        let written = to_ini_string(&inventory);
        let _ = Inventory::from_ini(&written);
    }
});
