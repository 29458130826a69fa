use std::env;

pub const DEFAULT_TYPE_INDICATOR: &str = "type";

/// Settings handed to every [`Activator`](crate::activation::Activator).
///
/// `ACTIVATOR_TYPE_INDICATOR` overrides the attribute naming the concrete
/// type; `ACTIVATOR_CONTAINER_BINDING=0` (or `false`) stops container fields
/// from being used as argument sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatorConfig {
    pub type_indicator: String,
    pub container_binding: bool,
}

impl Default for ActivatorConfig {
    fn default() -> Self {
        Self {
            type_indicator: DEFAULT_TYPE_INDICATOR.to_string(),
            container_binding: true,
        }
    }
}

impl ActivatorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let type_indicator = env::var("ACTIVATOR_TYPE_INDICATOR")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.type_indicator);

        let container_binding = env::var("ACTIVATOR_CONTAINER_BINDING")
            .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false")))
            .unwrap_or(defaults.container_binding);

        Self {
            type_indicator,
            container_binding,
        }
    }

    pub fn with_type_indicator(mut self, name: impl Into<String>) -> Self {
        self.type_indicator = name.into();
        self
    }

    pub fn with_container_binding(mut self, enabled: bool) -> Self {
        self.container_binding = enabled;
        self
    }
}
