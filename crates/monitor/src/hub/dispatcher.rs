//! Command dispatch onto Home Assistant services.

use std::collections::HashMap;

use serde_json::json;

use crate::command::{percent_to_brightness, Action, Command};
use crate::hub::HubClient;

/// Maps parsed commands onto single Home Assistant service calls.
pub struct CommandDispatcher {
    hub: HubClient,
    lights: HashMap<String, String>,
}

impl CommandDispatcher {
    /// Create a dispatcher over a hub client and the light name mapping.
    pub fn new(hub: HubClient, lights: HashMap<String, String>) -> Self {
        Self { hub, lights }
    }

    /// Resolve the entity a command addresses.
    ///
    /// An explicit entity id wins; otherwise the light name is looked up
    /// in the configured mapping. Every action needs a target, scenes
    /// included.
    fn resolve_entity(&self, command: &Command) -> Option<String> {
        if let Some(entity_id) = &command.target.entity_id {
            return Some(entity_id.clone());
        }

        match &command.target.light_name {
            Some(name) => match self.lights.get(name) {
                Some(entity_id) => Some(entity_id.clone()),
                None => {
                    tracing::warn!(light_name = %name, "Unknown light name");
                    None
                }
            },
            None => {
                tracing::warn!("No entity_id or light_name provided");
                None
            }
        }
    }

    /// Execute one command; returns whether the hub call succeeded.
    ///
    /// Failures are logged and reported through the return value, never
    /// raised; recovery is the operator submitting a new row.
    pub async fn dispatch(&self, command: &Command) -> bool {
        let Some(entity_id) = self.resolve_entity(command) else {
            return false;
        };

        let (domain, service, data) = match &command.action {
            Action::On => ("light", "turn_on", json!({ "entity_id": entity_id })),
            Action::Off => ("light", "turn_off", json!({ "entity_id": entity_id })),
            Action::Brightness { percent } => (
                "light",
                "turn_on",
                json!({
                    "entity_id": entity_id,
                    "brightness": percent_to_brightness(*percent),
                }),
            ),
            Action::Color { rgb } => (
                "light",
                "turn_on",
                json!({
                    "entity_id": entity_id,
                    "rgb_color": [rgb.r, rgb.g, rgb.b],
                }),
            ),
            Action::Scene { name } => (
                "scene",
                "turn_on",
                json!({ "entity_id": format!("scene.{name}") }),
            ),
        };

        match self.hub.call_service(domain, service, &data).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    command_id = %command.id,
                    error = %e,
                    "Error calling Home Assistant service"
                );
                false
            }
        }
    }
}
