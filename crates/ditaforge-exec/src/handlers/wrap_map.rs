//! `wrap_map` handler.
//!
//! Creates a wrapper topic and nests all top-level topicrefs of a map
//! beneath a single topicref pointing at it. Wrapper creation is
//! idempotent, and a map with at most one top-level topicref is already
//! wrapped (or trivial) and reports skipped.

use crate::handlers::{handler_failure, policy_failure, xml};
use crate::registry::{ActionHandler, HandlerContext};
use crate::HandlerError;
use ditaforge_core::{Action, ExecutionActionResult};
use serde_json::json;
use std::path::Path;
use xmltree::{Element, XMLNode};

pub struct WrapMapHandler;

impl ActionHandler for WrapMapHandler {
    fn action_type(&self) -> &str {
        "wrap_map"
    }

    fn name(&self) -> &str {
        "WrapMapHandler"
    }

    fn execute(
        &self,
        ctx: &HandlerContext,
        action: &Action,
    ) -> Result<ExecutionActionResult, HandlerError> {
        if action.target.trim().is_empty() {
            return Ok(handler_failure(
                action,
                self.name(),
                "wrap_map requires action.target",
                "missing target",
            ));
        }

        let (title, rel_source) = match (
            action.str_param("title"),
            action.str_param("source_map"),
        ) {
            (Some(title), Some(source)) => (title.to_string(), source),
            _ => {
                return Ok(handler_failure(
                    action,
                    self.name(),
                    "missing required parameters: title, source_map",
                    "missing parameter",
                ))
            }
        };

        let wrapper_topic = ctx.sandbox.resolve(&action.target)?;
        let source_map = ctx.sandbox.resolve(rel_source)?;

        tracing::info!(
            action_id = %action.id,
            dry_run = action.dry_run,
            wrapper = %wrapper_topic.display(),
            source = %source_map.display(),
            "wrap_map"
        );

        if action.dry_run {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                true,
                "dry-run: wrap_map skipped",
            )
            .with_metadata("wrapper_topic", json!(wrapper_topic.display().to_string()))
            .with_metadata("title", json!(title)));
        }

        if !source_map.is_file() {
            return Ok(handler_failure(
                action,
                self.name(),
                format!(
                    "source map does not exist or is not a file: {}",
                    source_map.display()
                ),
                "invalid source",
            ));
        }

        if let Err(violation) = ctx.policy.validate_target(&wrapper_topic) {
            return Ok(policy_failure(action, self.name(), violation));
        }
        if let Err(violation) = ctx.policy.validate_target(&source_map) {
            return Ok(policy_failure(action, self.name(), violation));
        }

        let created_wrapper = match ensure_wrapper_topic(&wrapper_topic, &title) {
            Ok(created) => created,
            Err(e) => {
                return Ok(handler_failure(
                    action,
                    self.name(),
                    "failed to create wrapper topic",
                    e,
                ))
            }
        };

        let mut root = match xml::load(&source_map) {
            Ok(root) => root,
            Err(e) => return Ok(handler_failure(action, self.name(), "invalid XML in source map", e)),
        };

        // Top-level topicrefs only; nested ones are already structured.
        let top_level: Vec<Element> = root
            .children
            .iter()
            .filter_map(|c| c.as_element())
            .filter(|e| e.name == "topicref")
            .cloned()
            .collect();

        if top_level.len() <= 1 {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                false,
                "map already wrapped or trivial",
            )
            .with_metadata("wrapper_created", json!(created_wrapper))
            .with_metadata("topicref_count", json!(top_level.len())));
        }

        root.children.retain(|c| match c.as_element() {
            Some(e) => e.name != "topicref",
            None => true,
        });

        let wrapper_name = wrapper_topic
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut wrapper_ref = xml::element_with_attr("topicref", "href", &wrapper_name);
        for topicref in &top_level {
            wrapper_ref.children.push(XMLNode::Element(topicref.clone()));
        }
        root.children.push(XMLNode::Element(wrapper_ref));

        if let Err(e) = xml::save(&root, &source_map) {
            return Ok(handler_failure(action, self.name(), "failed to write source map", e));
        }

        tracing::info!(
            action_id = %action.id,
            wrapped = top_level.len(),
            wrapper = %wrapper_name,
            "Map wrapped"
        );
        Ok(ExecutionActionResult::success(
            &action.id,
            self.name(),
            false,
            "map wrapped successfully",
        )
        .with_metadata("wrapper_created", json!(created_wrapper))
        .with_metadata("wrapped_topicref_count", json!(top_level.len())))
    }
}

/// Create the wrapper concept topic if it does not exist yet.
///
/// Returns whether a file was created.
fn ensure_wrapper_topic(path: &Path, title: &str) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }

    let topic_id = title.trim().to_lowercase().replace(' ', "_");

    let mut concept = Element::new("concept");
    concept.attributes.insert("id".to_string(), topic_id);
    concept
        .children
        .push(XMLNode::Element(xml::text_element("title", title)));
    concept
        .children
        .push(XMLNode::Element(Element::new("conbody")));

    xml::save(&concept, path)?;
    Ok(true)
}
