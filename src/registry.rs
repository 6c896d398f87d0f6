//! The component registry: the closed set of hardware units under test.
//!
//! A `ComponentId` enum replaces the string-keyed map of earlier revisions so
//! lookups cannot miss and the check-selection match is checked for
//! exhaustiveness at compile time. The registry itself is a fixed array
//! indexed by `ComponentId`; `REPORT_ORDER` drives both full-battery
//! execution order and report row order.

/// Broad classification of a testable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Led,
    Buzzer,
    Switch,
    Servo,
    Serial,
    Camera,
}

/// Identifier for every component the self-test knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentId {
    Serial1,
    Serial2,
    Mission,
    RedLed,
    GreenLed,
    BlueLed,
    Realsense,
}

/// Declared order for full-battery execution and for report rows.
pub const REPORT_ORDER: [ComponentId; 7] = [
    ComponentId::Serial1,
    ComponentId::Serial2,
    ComponentId::Mission,
    ComponentId::RedLed,
    ComponentId::GreenLed,
    ComponentId::BlueLed,
    ComponentId::Realsense,
];

impl ComponentId {
    fn index(self) -> usize {
        match self {
            ComponentId::Serial1 => 0,
            ComponentId::Serial2 => 1,
            ComponentId::Mission => 2,
            ComponentId::RedLed => 3,
            ComponentId::GreenLed => 4,
            ComponentId::BlueLed => 5,
            ComponentId::Realsense => 6,
        }
    }
}

/// One testable unit and its check state.
///
/// `target` is what the check needs to reach the hardware: a device path for
/// serial links, the USB match substring for the camera, and the registered
/// GPIO line name for LEDs and switches.
#[derive(Debug, Clone)]
pub struct Component {
    pub category: Category,
    pub label: &'static str,
    pub target: String,
    /// Prerequisite satisfied during the gate phase.
    pub initialized: bool,
    /// Check passed. Meaningful only after the check has executed.
    pub running: bool,
}

impl Component {
    fn new(category: Category, label: &'static str, target: impl Into<String>) -> Self {
        Self {
            category,
            label,
            target: target.into(),
            initialized: false,
            running: false,
        }
    }
}

/// Fixed table of all components, indexed by `ComponentId`.
#[derive(Debug, Clone)]
pub struct Registry {
    components: [Component; 7],
}

impl Registry {
    /// Builds the registry with every flag false. `serial1_path`,
    /// `serial2_path`, and `camera_match` come from the deployment config.
    pub fn new(serial1_path: &str, serial2_path: &str, camera_match: &str) -> Self {
        Self {
            components: [
                Component::new(Category::Serial, "Microxrc (ttyAMA0)", serial1_path),
                Component::new(Category::Serial, "UKB (ttyAMA1)", serial2_path),
                Component::new(Category::Switch, "Mission Button", "mission"),
                Component::new(Category::Led, "Red Led", "red"),
                Component::new(Category::Led, "Green Led", "green"),
                Component::new(Category::Led, "Blue Led", "blue"),
                Component::new(Category::Camera, "Realsense", camera_match),
            ],
        }
    }

    pub fn get(&self, id: ComponentId) -> &Component {
        &self.components[id.index()]
    }

    pub fn set_initialized(&mut self, id: ComponentId, value: bool) {
        self.components[id.index()].initialized = value;
    }

    pub fn set_running(&mut self, id: ComponentId, value: bool) {
        self.components[id.index()].running = value;
    }

    /// Components in declared report order.
    pub fn in_report_order(&self) -> impl Iterator<Item = &Component> {
        REPORT_ORDER.iter().map(|id| self.get(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::new("/dev/ttyAMA0", "/dev/ttyAMA1", "RealSense(TM) Depth Module")
    }

    #[test]
    fn all_components_start_unset() {
        let reg = registry();
        for component in reg.in_report_order() {
            assert!(!component.initialized);
            assert!(!component.running);
        }
    }

    #[test]
    fn report_order_is_fixed() {
        let reg = registry();
        let labels: Vec<&str> = reg.in_report_order().map(|c| c.label).collect();
        assert_eq!(
            labels,
            [
                "Microxrc (ttyAMA0)",
                "UKB (ttyAMA1)",
                "Mission Button",
                "Red Led",
                "Green Led",
                "Blue Led",
                "Realsense",
            ]
        );
    }

    #[test]
    fn flags_update_only_the_addressed_component() {
        let mut reg = registry();
        reg.set_running(ComponentId::RedLed, true);
        assert!(reg.get(ComponentId::RedLed).running);
        assert!(!reg.get(ComponentId::GreenLed).running);
        reg.set_initialized(ComponentId::Serial1, true);
        assert!(reg.get(ComponentId::Serial1).initialized);
        assert!(!reg.get(ComponentId::Serial2).initialized);
    }
}
