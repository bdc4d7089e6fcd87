//! Glossary handlers.
//!
//! `inject_glossary` injects a placeholder glossary entry into a
//! topic's conbody; `extract_glossary` is a pure read-only handler that
//! collects glossary hrefs from a definition map. Extraction never
//! touches sandbox or policy.

use crate::handlers::{handler_failure, policy_failure, xml};
use crate::registry::{ActionHandler, HandlerContext};
use crate::HandlerError;
use ditaforge_core::{Action, ExecutionActionResult};
use serde_json::json;
use std::path::{Path, PathBuf};
use xmltree::{Element, XMLNode};

pub struct InjectGlossaryHandler;

impl ActionHandler for InjectGlossaryHandler {
    fn action_type(&self) -> &str {
        "inject_glossary"
    }

    fn name(&self) -> &str {
        "InjectGlossaryHandler"
    }

    fn execute(
        &self,
        ctx: &HandlerContext,
        action: &Action,
    ) -> Result<ExecutionActionResult, HandlerError> {
        let rel_target = match action.str_param("target_topic") {
            Some(t) => t,
            None => {
                return Ok(handler_failure(
                    action,
                    self.name(),
                    "missing required parameter: target_topic",
                    "missing parameter",
                ))
            }
        };

        let glossary_hrefs: Vec<String> = match action.parameters.get("glossary_hrefs") {
            None => Vec::new(),
            Some(value) => match value.as_array() {
                Some(list) => list
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::to_string)
                    .collect(),
                None => {
                    return Ok(handler_failure(
                        action,
                        self.name(),
                        "parameter 'glossary_hrefs' must be a list",
                        "invalid parameter",
                    ))
                }
            },
        };

        if glossary_hrefs.is_empty() {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                action.dry_run,
                "no glossary_hrefs provided",
            ));
        }

        let target = ctx.sandbox.resolve(rel_target)?;

        tracing::info!(
            action_id = %action.id,
            dry_run = action.dry_run,
            target = %target.display(),
            glossary_count = glossary_hrefs.len(),
            "inject_glossary"
        );

        if action.dry_run {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                true,
                "dry-run: glossary injection skipped",
            ));
        }

        if !target.is_file() {
            return Ok(handler_failure(
                action,
                self.name(),
                format!(
                    "target topic does not exist or is not a file: {}",
                    target.display()
                ),
                "invalid target",
            ));
        }

        if let Err(violation) = ctx.policy.validate_target(&target) {
            return Ok(policy_failure(action, self.name(), violation));
        }

        let mut root = match xml::load(&target) {
            Ok(root) => root,
            Err(e) => {
                return Ok(handler_failure(action, self.name(), "invalid XML in target topic", e))
            }
        };

        let conbody = match xml::find_descendant_mut(&mut root, "conbody") {
            Some(conbody) => conbody,
            None => {
                return Ok(ExecutionActionResult::skipped(
                    &action.id,
                    self.name(),
                    false,
                    "no conbody element found",
                ))
            }
        };

        if xml::descendants(conbody).iter().any(|e| e.name == "glossentry") {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                false,
                "glossary already injected",
            ));
        }

        conbody
            .children
            .push(XMLNode::Element(placeholder_glossentry()));

        if let Err(e) = xml::save(&root, &target) {
            return Ok(handler_failure(action, self.name(), "failed to write target topic", e));
        }

        tracing::info!(action_id = %action.id, target = %target.display(), "Glossary injected");
        Ok(ExecutionActionResult::success(
            &action.id,
            self.name(),
            false,
            format!("injected glossary placeholder into {}", target.display()),
        )
        .with_metadata("glossary_count", json!(glossary_hrefs.len())))
    }
}

fn placeholder_glossentry() -> Element {
    let mut glossentry = Element::new("glossentry");
    glossentry
        .children
        .push(XMLNode::Element(xml::text_element("glossterm", "Glossary")));

    let mut glossdef = Element::new("glossdef");
    glossdef
        .children
        .push(XMLNode::Element(xml::text_element("p", "Glossary entries injected.")));
    glossentry.children.push(XMLNode::Element(glossdef));
    glossentry
}

/// Read-only extraction of glossary hrefs from a definition map.
///
/// Matches topicref containers by direct `navtitle` child text, then
/// collects every nested topicref href. Missing maps are a skipped
/// no-op, never a policy concern.
pub struct ExtractGlossaryHandler;

impl ActionHandler for ExtractGlossaryHandler {
    fn action_type(&self) -> &str {
        "extract_glossary"
    }

    fn name(&self) -> &str {
        "ExtractGlossaryHandler"
    }

    fn execute(
        &self,
        ctx: &HandlerContext,
        action: &Action,
    ) -> Result<ExecutionActionResult, HandlerError> {
        let (rel_map, navtitle) = match (
            action.str_param("definition_map"),
            action.str_param("definition_navtitle"),
        ) {
            (Some(m), Some(n)) => (m, n.to_string()),
            _ => {
                return Ok(handler_failure(
                    action,
                    self.name(),
                    "missing required parameters: definition_map, definition_navtitle",
                    "missing parameter",
                ))
            }
        };

        let map_path = if Path::new(rel_map).is_absolute() {
            PathBuf::from(rel_map)
        } else {
            ctx.source_root.join(rel_map)
        };

        tracing::info!(
            action_id = %action.id,
            dry_run = action.dry_run,
            map = %map_path.display(),
            navtitle = %navtitle,
            "extract_glossary"
        );

        if action.dry_run {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                true,
                format!(
                    "dry-run: would extract glossary references from {}",
                    map_path.display()
                ),
            )
            .with_metadata("glossary_hrefs", json!([])));
        }

        if !map_path.exists() {
            tracing::warn!(
                action_id = %action.id,
                map = %map_path.display(),
                "Definition map not found"
            );
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                false,
                format!("definition map not found: {}", map_path.display()),
            )
            .with_metadata("glossary_hrefs", json!([])));
        }

        let root = match xml::load(&map_path) {
            Ok(root) => root,
            Err(e) => {
                return Ok(handler_failure(
                    action,
                    self.name(),
                    "invalid XML in definition map",
                    e,
                ))
            }
        };

        let glossary_hrefs = extract_hrefs(&root, &navtitle);

        tracing::info!(
            action_id = %action.id,
            extracted = glossary_hrefs.len(),
            "Glossary references extracted"
        );
        Ok(ExecutionActionResult::success(
            &action.id,
            self.name(),
            false,
            format!("extracted {} glossary references", glossary_hrefs.len()),
        )
        .with_metadata("glossary_hrefs", json!(glossary_hrefs)))
    }
}

fn extract_hrefs(root: &Element, navtitle: &str) -> Vec<String> {
    let mut hrefs = Vec::new();

    for container in xml::descendants(root) {
        if container.name != "topicref" {
            continue;
        }

        // Only a direct navtitle child identifies the container.
        let matches = container
            .children
            .iter()
            .filter_map(|c| c.as_element())
            .any(|e| {
                e.name == "navtitle"
                    && e.get_text().map(|t| t.trim() == navtitle).unwrap_or(false)
            });
        if !matches {
            continue;
        }

        for nested in xml::descendants(container) {
            if nested.name != "topicref" {
                continue;
            }
            if let Some(href) = nested.attributes.get("href") {
                hrefs.push(href.clone());
            }
        }
    }

    hrefs
}
