//! Component vocabulary
//!
//! The closed set of UI components the model may use, together with the
//! props each one requires. The same table drives plan validation and the
//! dictionary text embedded in every prompt, so the two cannot drift apart.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value shape a prop must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropShape {
    /// Non-empty string
    Text,
    /// Non-empty array of `{ "label": string }` objects
    LabelList,
}

impl PropShape {
    /// Human-readable type used in the component dictionary
    pub fn describe(self) -> &'static str {
        match self {
            PropShape::Text => "string",
            PropShape::LabelList => "array of { label: string }",
        }
    }
}

/// A required prop of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropDef {
    /// Prop name as it appears in plan JSON
    pub name: &'static str,
    /// Expected value shape
    pub shape: PropShape,
}

const fn text(name: &'static str) -> PropDef {
    PropDef {
        name,
        shape: PropShape::Text,
    }
}

const fn labels(name: &'static str) -> PropDef {
    PropDef {
        name,
        shape: PropShape::LabelList,
    }
}

const BUTTON_PROPS: &[PropDef] = &[text("label")];
const CARD_PROPS: &[PropDef] = &[text("title"), text("content"), text("description")];
const INPUT_PROPS: &[PropDef] = &[text("label"), text("placeholder")];
const SIDEBAR_PROPS: &[PropDef] = &[text("header"), labels("items")];
const NAVBAR_PROPS: &[PropDef] = &[text("title"), labels("links")];
const MODAL_PROPS: &[PropDef] = &[text("title"), text("content")];
const CHART_PROPS: &[PropDef] = &[text("title"), text("chartType")];

/// Name of a component in the closed vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentName {
    /// Clickable button
    Button,
    /// Content card
    Card,
    /// Labelled text input
    Input,
    /// Side navigation panel
    Sidebar,
    /// Top navigation bar
    Navbar,
    /// Dialog overlay
    Modal,
    /// Data chart
    Chart,
}

impl ComponentName {
    /// Every component, in dictionary order
    pub const ALL: [ComponentName; 7] = [
        ComponentName::Button,
        ComponentName::Card,
        ComponentName::Input,
        ComponentName::Sidebar,
        ComponentName::Navbar,
        ComponentName::Modal,
        ComponentName::Chart,
    ];

    /// Name as written in plans and JSX
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentName::Button => "Button",
            ComponentName::Card => "Card",
            ComponentName::Input => "Input",
            ComponentName::Sidebar => "Sidebar",
            ComponentName::Navbar => "Navbar",
            ComponentName::Modal => "Modal",
            ComponentName::Chart => "Chart",
        }
    }

    /// Required props of this component
    pub fn props(self) -> &'static [PropDef] {
        match self {
            ComponentName::Button => BUTTON_PROPS,
            ComponentName::Card => CARD_PROPS,
            ComponentName::Input => INPUT_PROPS,
            ComponentName::Sidebar => SIDEBAR_PROPS,
            ComponentName::Navbar => NAVBAR_PROPS,
            ComponentName::Modal => MODAL_PROPS,
            ComponentName::Chart => CHART_PROPS,
        }
    }

    /// Look up a prop definition by name
    pub fn prop(self, name: &str) -> Option<&'static PropDef> {
        self.props().iter().find(|p| p.name == name)
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentName::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown component: {}", s))
    }
}

static DICTIONARY: Lazy<String> = Lazy::new(|| {
    ComponentName::ALL
        .iter()
        .map(|component| {
            let props = component
                .props()
                .iter()
                .map(|p| format!("{}: {}", p.name, p.shape.describe()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("- {}: props {{ {} }}", component, props)
        })
        .collect::<Vec<_>>()
        .join("\n")
});

/// The component dictionary as embedded in prompts.
///
/// One line per component listing every required prop and its type.
pub fn component_dictionary() -> &'static str {
    DICTIONARY.as_str()
}
