use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fonts offered by the editor and assumed available in exported pages.
pub const SYSTEM_FONTS: [&str; 7] = [
    "General Sans",
    "Clash Display",
    "Space Mono",
    "Inter",
    "system-ui",
    "monospace",
    "serif",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayerError {
    #[error("layer '{0}' not found")]
    UnknownLayer(String),
    #[error("cannot remove the last remaining layer")]
    LastLayer,
    #[error("a composition needs at least one layer")]
    Empty,
}

/// CSS `mix-blend-mode` keywords supported by overlay layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    /// The keyword emitted into inline styles.
    pub fn css_keyword(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
            BlendMode::Hue => "hue",
            BlendMode::Saturation => "saturation",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.css_keyword())
    }
}

/// Box decoration carried only by button layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonStyle {
    pub padding_x: f32,
    pub padding_y: f32,
    pub border_radius: f32,
    pub background_color: String,
    pub border_width: f32,
    pub border_color: String,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            padding_x: 32.0,
            padding_y: 16.0,
            border_radius: 4.0,
            background_color: "#CCFF00".to_string(),
            border_width: 0.0,
            border_color: "#CCFF00".to_string(),
        }
    }
}

/// One positioned overlay element composited above the background.
///
/// `button` distinguishes the two layer kinds: text layers leave it unset,
/// button layers carry their box decoration there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub font: String,
    pub weight: u32,
    pub opacity: f32,
    pub rotation: f32,
    pub letter_spacing: f32,
    #[serde(default)]
    pub blend_mode: BlendMode,
    pub color: String,
    #[serde(default)]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<ButtonStyle>,
}

impl Layer {
    pub fn is_button(&self) -> bool {
        self.button.is_some()
    }
}

/// Ordered overlay layers plus the current selection.
///
/// Invariant: the stack is never empty and `selected` always names a present
/// layer. Every mutating operation preserves both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    selected: String,
    items: Vec<Layer>,
}

impl LayerStack {
    /// Builds a stack from existing layers, selecting the first one.
    pub fn new(items: Vec<Layer>) -> Result<Self, LayerError> {
        let selected = items.first().ok_or(LayerError::Empty)?.id.clone();
        Ok(Self { selected, items })
    }

    /// Checks the invariants of a deserialized stack.
    pub fn validate(&self) -> Result<(), LayerError> {
        if self.items.is_empty() {
            return Err(LayerError::Empty);
        }
        if !self.items.iter().any(|layer| layer.id == self.selected) {
            return Err(LayerError::UnknownLayer(self.selected.clone()));
        }
        Ok(())
    }

    /// Adds a text layer at the given position, cloning the typography of the
    /// first layer the way the editor's "TEXT" action does, and selects it.
    pub fn add_text(&mut self, x: f32, y: f32) -> &Layer {
        let template = &self.items[0];
        let layer = Layer {
            id: generate_id(),
            text: "NEW_STRING".to_string(),
            x,
            y,
            button: None,
            ..template.clone()
        };
        self.push_selected(layer)
    }

    /// Adds a call-to-action button layer at the given position and selects it.
    pub fn add_button(&mut self, x: f32, y: f32) -> &Layer {
        let layer = Layer {
            id: generate_id(),
            text: "CLICK_HERE".to_string(),
            x,
            y,
            size: 14.0,
            font: "Space Mono".to_string(),
            weight: 700,
            opacity: 1.0,
            rotation: 0.0,
            letter_spacing: 2.0,
            blend_mode: BlendMode::Normal,
            color: "#000000".to_string(),
            italic: false,
            button: Some(ButtonStyle::default()),
        };
        self.push_selected(layer)
    }

    fn push_selected(&mut self, layer: Layer) -> &Layer {
        self.selected = layer.id.clone();
        self.items.push(layer);
        self.items.last().expect("layer pushed above")
    }

    /// Applies a field mutation to the layer with the given id.
    pub fn update(
        &mut self,
        id: &str,
        mutate: impl FnOnce(&mut Layer),
    ) -> Result<(), LayerError> {
        let layer = self
            .items
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or_else(|| LayerError::UnknownLayer(id.to_string()))?;
        mutate(layer);
        Ok(())
    }

    /// Removes a layer. Removing the last remaining layer is rejected; when
    /// the selected layer goes away the selection moves to the first survivor.
    pub fn remove(&mut self, id: &str) -> Result<Layer, LayerError> {
        let index = self
            .items
            .iter()
            .position(|layer| layer.id == id)
            .ok_or_else(|| LayerError::UnknownLayer(id.to_string()))?;
        if self.items.len() == 1 {
            return Err(LayerError::LastLayer);
        }
        let removed = self.items.remove(index);
        if self.selected == removed.id {
            self.selected = self.items[0].id.clone();
        }
        Ok(removed)
    }

    pub fn select(&mut self, id: &str) -> Result<(), LayerError> {
        if !self.items.iter().any(|layer| layer.id == id) {
            return Err(LayerError::UnknownLayer(id.to_string()));
        }
        self.selected = id.to_string();
        Ok(())
    }

    pub fn selected(&self) -> &Layer {
        self.items
            .iter()
            .find(|layer| layer.id == self.selected)
            .expect("selection invariant upheld by every mutation")
    }

    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.items.iter().find(|layer| layer.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Nine lowercase alphanumerics, matching the editor's generated ids.
fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|byte| (byte as char).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_layer(id: &str) -> Layer {
        Layer {
            id: id.to_string(),
            text: "HELLO".to_string(),
            x: 100.0,
            y: 100.0,
            size: 32.0,
            font: "Inter".to_string(),
            weight: 400,
            opacity: 1.0,
            rotation: 0.0,
            letter_spacing: 0.0,
            blend_mode: BlendMode::Normal,
            color: "#FFFFFF".to_string(),
            italic: false,
            button: None,
        }
    }

    #[test]
    fn empty_stack_is_rejected() {
        assert_eq!(LayerStack::new(Vec::new()).unwrap_err(), LayerError::Empty);
    }

    #[test]
    fn removing_the_last_layer_is_rejected() {
        let mut stack = LayerStack::new(vec![text_layer("solo")]).unwrap();
        assert_eq!(stack.remove("solo").unwrap_err(), LayerError::LastLayer);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.selected().id, "solo");
    }

    #[test]
    fn removal_moves_selection_to_first_survivor() {
        let mut stack =
            LayerStack::new(vec![text_layer("a"), text_layer("b")]).unwrap();
        stack.select("b").unwrap();
        stack.remove("b").unwrap();
        assert_eq!(stack.selected().id, "a");
    }

    #[test]
    fn added_layers_get_unique_ids_and_selection() {
        let mut stack = LayerStack::new(vec![text_layer("base")]).unwrap();
        let text_id = stack.add_text(10.0, 20.0).id.clone();
        let button_id = stack.add_button(30.0, 40.0).id.clone();
        assert_ne!(text_id, button_id);
        assert_eq!(stack.selected().id, button_id);
        assert!(stack.get(&button_id).unwrap().is_button());
        assert_eq!(stack.get(&text_id).unwrap().text, "NEW_STRING");
        assert_eq!(text_id.len(), 9);
        assert!(text_id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn new_text_layer_clones_base_typography() {
        let mut base = text_layer("base");
        base.font = "Clash Display".to_string();
        base.weight = 700;
        let mut stack = LayerStack::new(vec![base]).unwrap();
        let added = stack.add_text(0.0, 0.0);
        assert_eq!(added.font, "Clash Display");
        assert_eq!(added.weight, 700);
        assert!(!added.is_button());
    }

    #[test]
    fn update_rejects_unknown_ids() {
        let mut stack = LayerStack::new(vec![text_layer("a")]).unwrap();
        stack.update("a", |layer| layer.opacity = 0.5).unwrap();
        assert_eq!(stack.get("a").unwrap().opacity, 0.5);
        assert!(matches!(
            stack.update("ghost", |_| {}),
            Err(LayerError::UnknownLayer(_))
        ));
    }

    #[test]
    fn validate_catches_stale_selection() {
        let mut stack = LayerStack::new(vec![text_layer("a")]).unwrap();
        stack.selected = "ghost".to_string();
        assert!(matches!(
            stack.validate(),
            Err(LayerError::UnknownLayer(_))
        ));
    }

    #[test]
    fn blend_modes_emit_css_keywords() {
        assert_eq!(BlendMode::ColorDodge.to_string(), "color-dodge");
        assert_eq!(BlendMode::Normal.to_string(), "normal");
        assert_eq!(BlendMode::default(), BlendMode::Normal);
    }
}
