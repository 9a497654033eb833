use athena_core::{EventKind, SymbolEvent};
use handlebars::{Handlebars, Template};
use std::collections::HashMap;

use crate::error::RenderError;

const TRADE_TEMPLATE: &str = "{{exchange}} {{side}} trade: {{symbol}} {{quantity}} @ {{price}} (fee {{fee}} {{fee_currency}})";
const ORDER_TEMPLATE: &str = "{{exchange}} {{side}} {{order_type}} order #{{order_id}} {{status}}: {{symbol}} {{executed_quantity}}/{{quantity}} @ {{price}}";
const SUBMIT_ORDER_TEMPLATE: &str = "submitting {{side}} {{order_type}} order: {{symbol}} {{quantity}}{{#if price}} @ {{price}}{{/if}}";
const PNL_TEMPLATE: &str = "{{symbol}} PnL: realized {{realized_profit}}, unrealized {{unrealized_profit}}, average cost {{average_cost}}, position {{base_position}} ({{num_trades}} trades)";

/// Renders events to notification text with one template per event kind.
///
/// Rendering runs in strict mode: a template referencing a field the event
/// does not have is a render error, not an empty string.
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
    templates: HashMap<EventKind, String>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);

        let templates = [
            (EventKind::Trade, TRADE_TEMPLATE),
            (EventKind::Order, ORDER_TEMPLATE),
            (EventKind::SubmitOrder, SUBMIT_ORDER_TEMPLATE),
            (EventKind::ProfitAndLoss, PNL_TEMPLATE),
        ]
        .into_iter()
        .map(|(kind, template)| (kind, template.to_string()))
        .collect();

        TemplateRenderer {
            registry,
            templates,
        }
    }

    /// Replace the template of `kind` after checking that it compiles
    pub fn register(&mut self, kind: EventKind, template: &str) -> Result<(), RenderError> {
        Template::compile(template).map_err(|e| RenderError::InvalidTemplate {
            kind,
            reason: e.to_string(),
        })?;
        self.templates.insert(kind, template.to_string());
        Ok(())
    }

    pub fn render<E: SymbolEvent>(&self, event: &E) -> Result<String, RenderError> {
        let template = self
            .templates
            .get(&E::KIND)
            .ok_or(RenderError::MissingTemplate(E::KIND))?;

        self.registry
            .render_template(template, event)
            .map_err(|e| RenderError::Render {
                kind: E::KIND,
                reason: e.to_string(),
            })
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
