//! Response validation
//!
//! The planning stage's output is parsed and checked strictly: anything that
//! is not a well-formed plan over the component vocabulary is rejected with a
//! [`PlanError`]. The generation and explanation outputs are only
//! soft-checked; findings are reported as [`OutputWarning`]s and the text is
//! forwarded unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use thiserror::Error;

use super::components::{ComponentName, PropDef, PropShape};
use super::plan::{ComponentSpec, Plan, PlanType, Stage};
use crate::text::excerpt;

/// Longest excerpt of planner output carried in a [`PlanError::Parse`]
pub const PLAN_EXCERPT_CHARS: usize = 200;

/// Why planner output could not be turned into a [`Plan`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Not JSON, or JSON that is not an object
    #[error("Planner output is not a JSON object: {reason} (length {length}, starts with {excerpt:?})")]
    Parse {
        /// Parser message
        reason: String,
        /// Length of the raw output in bytes
        length: usize,
        /// Leading characters of the raw output
        excerpt: String,
    },

    /// Valid JSON that breaks the plan schema
    #[error("Planner output violates the plan schema: {0}")]
    Schema(#[from] SchemaViolation),
}

impl PlanError {
    fn parse(raw: &str, reason: impl Into<String>) -> Self {
        PlanError::Parse {
            reason: reason.into(),
            length: raw.len(),
            excerpt: excerpt(raw.trim(), PLAN_EXCERPT_CHARS),
        }
    }
}

/// A specific plan schema violation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    /// `type` is absent
    #[error("missing \"type\" field")]
    MissingType,

    /// `type` is not `create` or `modify`
    #[error("invalid plan type {0}, expected \"create\" or \"modify\"")]
    InvalidType(String),

    /// `components` is absent or not an array
    #[error("\"components\" must be an array")]
    ComponentsNotArray,

    /// A `create` plan lists no components
    #[error("a create plan must contain at least one component")]
    NoComponents,

    /// A `components` entry is not an object
    #[error("component #{index} is not an object")]
    ComponentNotObject {
        /// Position in `components`
        index: usize,
    },

    /// A component has no string `name`
    #[error("component #{index} has no name")]
    MissingName {
        /// Position in `components`
        index: usize,
    },

    /// A component name outside the vocabulary
    #[error("component #{index} uses unknown component {name:?}")]
    UnknownComponent {
        /// Position in `components`
        index: usize,
        /// Name as written by the model
        name: String,
    },

    /// `props` is present but not an object
    #[error("component #{index} ({component}): \"props\" must be an object")]
    PropsNotObject {
        /// Position in `components`
        index: usize,
        /// Component name
        component: ComponentName,
    },

    /// A required prop is absent
    #[error("component #{index} ({component}) is missing required prop {prop:?}")]
    MissingProp {
        /// Position in `components`
        index: usize,
        /// Component name
        component: ComponentName,
        /// Prop name
        prop: &'static str,
    },

    /// A required prop has the wrong value shape
    #[error("component #{index} ({component}): prop {prop:?} must be {expected}")]
    WrongShape {
        /// Position in `components`
        index: usize,
        /// Component name
        component: ComponentName,
        /// Prop name
        prop: &'static str,
        /// Expected shape
        expected: &'static str,
    },

    /// A required prop is present but empty
    #[error("component #{index} ({component}): prop {prop:?} must not be empty")]
    EmptyProp {
        /// Position in `components`
        index: usize,
        /// Component name
        component: ComponentName,
        /// Prop name
        prop: &'static str,
    },
}

/// Remove one surrounding markdown code fence, if present.
///
/// A first line consisting only of a language tag (e.g. `json`) is dropped
/// along with the fence.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    match inner.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body.trim(),
        _ => inner.trim(),
    }
}

/// Parse and validate raw planner output.
///
/// On success every component is in the vocabulary and carries exactly its
/// required props, each non-empty and of the right shape. Label lists are
/// normalized to `[{"label": ...}]`; unknown props are dropped.
pub fn parse_plan(raw: &str) -> Result<Plan, PlanError> {
    let body = strip_code_fence(raw);
    let value: Value =
        serde_json::from_str(body).map_err(|e| PlanError::parse(raw, e.to_string()))?;

    let Value::Object(root) = value else {
        return Err(PlanError::parse(raw, "top-level value is not an object"));
    };

    let plan_type = match root.get("type") {
        None | Some(Value::Null) => return Err(SchemaViolation::MissingType.into()),
        Some(Value::String(s)) => match s.as_str() {
            "create" => PlanType::Create,
            "modify" => PlanType::Modify,
            other => return Err(SchemaViolation::InvalidType(format!("{:?}", other)).into()),
        },
        Some(other) => return Err(SchemaViolation::InvalidType(other.to_string()).into()),
    };

    let Some(Value::Array(entries)) = root.get("components") else {
        return Err(SchemaViolation::ComponentsNotArray.into());
    };

    if plan_type == PlanType::Create && entries.is_empty() {
        return Err(SchemaViolation::NoComponents.into());
    }

    let components = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| validate_component(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Plan {
        plan_type,
        components,
    })
}

fn validate_component(index: usize, entry: &Value) -> Result<ComponentSpec, SchemaViolation> {
    let object = entry
        .as_object()
        .ok_or(SchemaViolation::ComponentNotObject { index })?;

    let raw_name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or(SchemaViolation::MissingName { index })?;
    let name: ComponentName = raw_name
        .parse()
        .map_err(|_| SchemaViolation::UnknownComponent {
            index,
            name: raw_name.to_string(),
        })?;

    let empty = Map::new();
    let props = match object.get("props") {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(props)) => props,
        Some(_) => {
            return Err(SchemaViolation::PropsNotObject {
                index,
                component: name,
            })
        }
    };

    for key in props.keys().filter(|key| name.prop(key).is_none()) {
        tracing::warn!(
            component = %name,
            prop = %key,
            "Dropping prop not defined for component"
        );
    }

    let mut normalized = Map::new();
    for def in name.props() {
        let value = props
            .get(def.name)
            .filter(|v| !v.is_null())
            .ok_or(SchemaViolation::MissingProp {
                index,
                component: name,
                prop: def.name,
            })?;
        normalized.insert(
            def.name.to_string(),
            validate_prop(index, name, def, value)?,
        );
    }

    Ok(ComponentSpec {
        name,
        props: normalized,
    })
}

fn validate_prop(
    index: usize,
    component: ComponentName,
    def: &PropDef,
    value: &Value,
) -> Result<Value, SchemaViolation> {
    let wrong_shape = SchemaViolation::WrongShape {
        index,
        component,
        prop: def.name,
        expected: def.shape.describe(),
    };
    let empty = SchemaViolation::EmptyProp {
        index,
        component,
        prop: def.name,
    };

    match def.shape {
        PropShape::Text => {
            let text = value.as_str().ok_or(wrong_shape)?;
            if text.trim().is_empty() {
                return Err(empty);
            }
            Ok(Value::String(text.to_string()))
        }
        PropShape::LabelList => {
            let items = value.as_array().ok_or_else(|| wrong_shape.clone())?;
            if items.is_empty() {
                return Err(empty);
            }
            let mut labels = Vec::with_capacity(items.len());
            for item in items {
                // Bare strings are accepted as labels.
                let label = match item {
                    Value::String(s) => s.as_str(),
                    Value::Object(o) => o
                        .get("label")
                        .and_then(Value::as_str)
                        .ok_or_else(|| wrong_shape.clone())?,
                    _ => return Err(wrong_shape),
                };
                if label.trim().is_empty() {
                    return Err(empty);
                }
                let mut entry = Map::new();
                entry.insert("label".to_string(), Value::String(label.to_string()));
                labels.push(Value::Object(entry));
            }
            Ok(Value::Array(labels))
        }
    }
}

/// Category of a soft-check finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The stage returned nothing
    EmptyOutput,
    /// Output is wrapped in or contains a markdown code fence
    MarkdownFence,
    /// Text outside the fragment wrapper
    SurroundingProse,
    /// No `<>...</>` fragment wrapper
    MissingFragment,
    /// An import statement
    ImportStatement,
    /// An inline `style` attribute
    StyleAttribute,
    /// Lowercase HTML element such as `div`
    GenericWrapper,
    /// Capitalized tag outside the vocabulary
    UnknownComponent,
}

/// A soft-check finding on generated output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputWarning {
    /// Stage that produced the output
    pub stage: Stage,
    /// Finding category
    pub kind: WarningKind,
    /// Human-readable description
    pub message: String,
}

impl OutputWarning {
    fn new(stage: Stage, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
        }
    }
}

/// Soft-check a generated UI fragment.
pub fn check_fragment(code: &str) -> Vec<OutputWarning> {
    let stage = Stage::Generate;
    let mut warnings = Vec::new();

    if code.trim().is_empty() {
        warnings.push(OutputWarning::new(
            stage,
            WarningKind::EmptyOutput,
            "generation stage returned no code",
        ));
        return warnings;
    }

    if code.contains("```") {
        warnings.push(OutputWarning::new(
            stage,
            WarningKind::MarkdownFence,
            "code is wrapped in a markdown fence",
        ));
    }

    let body = strip_code_fence(code);
    if !(body.starts_with("<>") && body.ends_with("</>")) {
        if body.contains("<>") && body.contains("</>") {
            warnings.push(OutputWarning::new(
                stage,
                WarningKind::SurroundingProse,
                "code has text outside the fragment wrapper",
            ));
        } else {
            warnings.push(OutputWarning::new(
                stage,
                WarningKind::MissingFragment,
                "code is not wrapped in a <>...</> fragment",
            ));
        }
    }

    if body
        .lines()
        .any(|line| line.trim_start().starts_with("import "))
    {
        warnings.push(OutputWarning::new(
            stage,
            WarningKind::ImportStatement,
            "code contains import statements",
        ));
    }

    if body.contains("style=") {
        warnings.push(OutputWarning::new(
            stage,
            WarningKind::StyleAttribute,
            "code uses inline style attributes",
        ));
    }

    let mut generic = BTreeSet::new();
    let mut unknown = BTreeSet::new();
    for tag in opening_tags(body) {
        if tag.starts_with(|c: char| c.is_ascii_lowercase()) {
            generic.insert(tag);
        } else if tag.parse::<ComponentName>().is_err() {
            unknown.insert(tag);
        }
    }

    if !generic.is_empty() {
        warnings.push(OutputWarning::new(
            stage,
            WarningKind::GenericWrapper,
            format!("code uses generic elements: {}", join(&generic)),
        ));
    }
    if !unknown.is_empty() {
        warnings.push(OutputWarning::new(
            stage,
            WarningKind::UnknownComponent,
            format!("code uses components outside the vocabulary: {}", join(&unknown)),
        ));
    }

    warnings
}

/// Soft-check the explanation prose.
pub fn check_explanation(text: &str) -> Vec<OutputWarning> {
    let stage = Stage::Explain;
    let mut warnings = Vec::new();

    if text.trim().is_empty() {
        warnings.push(OutputWarning::new(
            stage,
            WarningKind::EmptyOutput,
            "explanation stage returned no text",
        ));
    } else if text.contains("```") {
        warnings.push(OutputWarning::new(
            stage,
            WarningKind::MarkdownFence,
            "explanation contains a markdown code block",
        ));
    }

    warnings
}

/// Names of opening tags (`<Name` or `<name`), in order of appearance.
fn opening_tags(code: &str) -> impl Iterator<Item = &str> {
    code.match_indices('<').filter_map(move |(i, _)| {
        let rest = &code[i + 1..];
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'))
            .unwrap_or(rest.len());
        let name = &rest[..len];
        name.starts_with(|c: char| c.is_ascii_alphabetic())
            .then_some(name)
    })
}

fn join(names: &BTreeSet<&str>) -> String {
    names.iter().copied().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID_PLAN: &str = r#"{
        "type": "create",
        "components": [
            {"name": "Card", "props": {"title": "Users", "content": "1,024", "description": "Active users"}},
            {"name": "Sidebar", "props": {"header": "Menu", "items": [{"label": "Home"}, "Settings"]}}
        ]
    }"#;

    fn schema_violation(raw: &str) -> SchemaViolation {
        match parse_plan(raw) {
            Err(PlanError::Schema(violation)) => violation,
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_valid_plan() {
        let plan = parse_plan(VALID_PLAN).unwrap();
        assert_eq!(plan.plan_type, PlanType::Create);
        assert_eq!(plan.components.len(), 2);
        assert_eq!(plan.components[0].name, ComponentName::Card);
        assert_eq!(
            plan.components[1].props["items"],
            json!([{"label": "Home"}, {"label": "Settings"}])
        );
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let fenced = format!("```json\n{}\n```", VALID_PLAN);
        assert_eq!(parse_plan(&fenced).unwrap(), parse_plan(VALID_PLAN).unwrap());
    }

    #[test]
    fn test_strip_code_fence_keeps_unfenced_text() {
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_not_json_is_parse_error() {
        match parse_plan("not json") {
            Err(PlanError::Parse {
                length, excerpt, ..
            }) => {
                assert_eq!(length, 8);
                assert_eq!(excerpt, "not json");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_is_parse_error() {
        assert!(matches!(
            parse_plan("[1, 2, 3]"),
            Err(PlanError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_error_excerpt_is_bounded() {
        let raw = "x".repeat(1000);
        match parse_plan(&raw) {
            Err(PlanError::Parse {
                length, excerpt, ..
            }) => {
                assert_eq!(length, 1000);
                assert!(excerpt.chars().count() <= PLAN_EXCERPT_CHARS + 1);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_type_violations() {
        assert_eq!(
            schema_violation(r#"{"components": []}"#),
            SchemaViolation::MissingType
        );
        assert_eq!(
            schema_violation(r#"{"type": "replace", "components": []}"#),
            SchemaViolation::InvalidType("\"replace\"".into())
        );
        assert_eq!(
            schema_violation(r#"{"type": 1, "components": []}"#),
            SchemaViolation::InvalidType("1".into())
        );
        assert_eq!(
            schema_violation(r#"{"type": "create"}"#),
            SchemaViolation::ComponentsNotArray
        );
        assert_eq!(
            schema_violation(r#"{"type": "create", "components": []}"#),
            SchemaViolation::NoComponents
        );
    }

    #[test]
    fn test_component_entry_violations() {
        assert_eq!(
            schema_violation(r#"{"type": "create", "components": ["Card"]}"#),
            SchemaViolation::ComponentNotObject { index: 0 }
        );
        assert_eq!(
            schema_violation(r#"{"type": "create", "components": [{"props": {}}]}"#),
            SchemaViolation::MissingName { index: 0 }
        );
        assert_eq!(
            schema_violation(r#"{"type": "create", "components": [{"name": "Button", "props": []}]}"#),
            SchemaViolation::PropsNotObject {
                index: 0,
                component: ComponentName::Button
            }
        );
    }

    #[test]
    fn test_modify_plan_may_be_empty() {
        let plan = parse_plan(r#"{"type": "modify", "components": []}"#).unwrap();
        assert!(plan.is_modify());
        assert!(plan.components.is_empty());
    }

    #[test]
    fn test_unknown_component_rejected() {
        assert_eq!(
            schema_violation(
                r#"{"type": "create", "components": [{"name": "Table", "props": {}}]}"#
            ),
            SchemaViolation::UnknownComponent {
                index: 0,
                name: "Table".into()
            }
        );
    }

    #[test]
    fn test_missing_required_prop_rejected() {
        assert_eq!(
            schema_violation(
                r#"{"type": "create", "components": [{"name": "Card", "props": {"title": "A", "content": "B"}}]}"#
            ),
            SchemaViolation::MissingProp {
                index: 0,
                component: ComponentName::Card,
                prop: "description"
            }
        );
    }

    #[test]
    fn test_empty_prop_rejected() {
        assert_eq!(
            schema_violation(
                r#"{"type": "create", "components": [{"name": "Button", "props": {"label": "  "}}]}"#
            ),
            SchemaViolation::EmptyProp {
                index: 0,
                component: ComponentName::Button,
                prop: "label"
            }
        );
        assert_eq!(
            schema_violation(
                r#"{"type": "create", "components": [{"name": "Sidebar", "props": {"header": "Menu", "items": []}}]}"#
            ),
            SchemaViolation::EmptyProp {
                index: 0,
                component: ComponentName::Sidebar,
                prop: "items"
            }
        );
    }

    #[test]
    fn test_wrong_shape_rejected() {
        assert!(matches!(
            schema_violation(
                r#"{"type": "create", "components": [{"name": "Sidebar", "props": {"header": "Menu", "items": "Home"}}]}"#
            ),
            SchemaViolation::WrongShape { prop: "items", .. }
        ));
        assert!(matches!(
            schema_violation(
                r#"{"type": "create", "components": [{"name": "Button", "props": {"label": 3}}]}"#
            ),
            SchemaViolation::WrongShape { prop: "label", .. }
        ));
        assert!(matches!(
            schema_violation(
                r#"{"type": "create", "components": [{"name": "Sidebar", "props": {"header": "Menu", "items": [{"label": 1}]}}]}"#
            ),
            SchemaViolation::WrongShape { prop: "items", .. }
        ));
    }

    #[test]
    fn test_unknown_props_are_dropped() {
        let plan = parse_plan(
            r#"{"type": "create", "components": [{"name": "Button", "props": {"label": "Go", "color": "red"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&plan.components[0].props).unwrap(),
            json!({"label": "Go"})
        );
    }

    #[test]
    fn test_clean_fragment_has_no_warnings() {
        let code = "<>\n  <Navbar title=\"App\" links={[{ label: \"Home\" }]} />\n  <Button label=\"Save\" />\n</>";
        assert!(check_fragment(code).is_empty());
    }

    #[test]
    fn test_fragment_warnings() {
        let code = "import React from 'react';\n<div style={{ padding: 4 }}><Table /><Button label=\"x\" /></div>";
        let kinds: Vec<_> = check_fragment(code).into_iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WarningKind::MissingFragment,
                WarningKind::ImportStatement,
                WarningKind::StyleAttribute,
                WarningKind::GenericWrapper,
                WarningKind::UnknownComponent,
            ]
        );
    }

    #[test]
    fn test_fragment_with_prose_and_fence() {
        let code = "Here is your UI:\n```jsx\n<><Button label=\"Go\" /></>\n```";
        let kinds: Vec<_> = check_fragment(code).into_iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::MarkdownFence, WarningKind::SurroundingProse]
        );
    }

    #[test]
    fn test_unknown_components_are_listed_once() {
        let warnings = check_fragment("<><Table /><Table /><Grid /></>");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnknownComponent);
        assert!(warnings[0].message.ends_with("Grid, Table"));
    }

    #[test]
    fn test_empty_outputs() {
        assert_eq!(check_fragment("  ")[0].kind, WarningKind::EmptyOutput);
        let explanation = check_explanation("");
        assert_eq!(explanation[0].kind, WarningKind::EmptyOutput);
        assert_eq!(explanation[0].stage, Stage::Explain);
        assert!(check_explanation("The card highlights active users.").is_empty());
    }

    #[test]
    fn test_warning_wire_form() {
        let warning = OutputWarning::new(Stage::Generate, WarningKind::StyleAttribute, "m");
        assert_eq!(
            serde_json::to_value(&warning).unwrap(),
            json!({"stage": "generate", "kind": "style_attribute", "message": "m"})
        );
    }
}
