//! Pass/fail table rendering.

use std::fmt::Write as _;

use crate::registry::Registry;

const BORDER: &str = " ===================================\n";

/// Renders every registry entry as a bordered table row, in declared report
/// order. Pure read; the caller prints the result.
pub fn render(registry: &Registry) -> String {
    let mut out = String::new();
    out.push_str(BORDER);
    for component in registry.in_report_order() {
        let glyph = if component.running { "✅" } else { "❌" };
        let _ = writeln!(out, "{:<32}{glyph}  |", format!("| {}", component.label));
    }
    out.push_str(BORDER);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ComponentId, Registry};

    fn registry() -> Registry {
        Registry::new("/dev/ttyAMA0", "/dev/ttyAMA1", "RealSense(TM) Depth Module")
    }

    #[test]
    fn renders_seven_rows_between_borders() {
        let table = render(&registry());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].contains("==="));
        assert!(lines[8].contains("==="));
    }

    #[test]
    fn glyph_follows_running_flag() {
        let mut reg = registry();
        reg.set_running(ComponentId::Realsense, true);
        let table = render(&reg);
        let realsense_row = table
            .lines()
            .find(|l| l.contains("Realsense"))
            .unwrap_or_default();
        assert!(realsense_row.contains('✅'));
        let mission_row = table
            .lines()
            .find(|l| l.contains("Mission Button"))
            .unwrap_or_default();
        assert!(mission_row.contains('❌'));
    }

    #[test]
    fn rows_appear_in_declared_order() {
        let table = render(&registry());
        let positions: Vec<usize> = [
            "Microxrc (ttyAMA0)",
            "UKB (ttyAMA1)",
            "Mission Button",
            "Red Led",
            "Green Led",
            "Blue Led",
            "Realsense",
        ]
        .iter()
        .map(|label| table.find(label).unwrap_or(usize::MAX))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
