//! Topicref injection handlers.
//!
//! `inject_topicref` appends one `<topicref href=…>` to a map;
//! `inject_topicrefs` merges every href-carrying topicref from a source
//! map into a target map. Both are idempotent: content already present
//! is never duplicated, and a run with nothing to add reports skipped.

use crate::handlers::{handler_failure, policy_failure, xml};
use crate::registry::{ActionHandler, HandlerContext};
use crate::HandlerError;
use ditaforge_core::{Action, ExecutionActionResult};
use serde_json::json;
use std::collections::BTreeSet;
use std::path::Path;
use xmltree::{Element, XMLNode};

pub struct InjectTopicrefHandler;

impl ActionHandler for InjectTopicrefHandler {
    fn action_type(&self) -> &str {
        "inject_topicref"
    }

    fn name(&self) -> &str {
        "InjectTopicrefHandler"
    }

    fn execute(
        &self,
        ctx: &HandlerContext,
        action: &Action,
    ) -> Result<ExecutionActionResult, HandlerError> {
        let (href, rel_target) = match (
            action.str_param("href"),
            action.str_param("target_path"),
        ) {
            (Some(h), Some(t)) => (h.to_string(), t),
            _ => {
                return Ok(handler_failure(
                    action,
                    self.name(),
                    "missing required parameters: href, target_path",
                    "missing parameter",
                ))
            }
        };

        let target = ctx.sandbox.resolve(rel_target)?;

        tracing::info!(
            action_id = %action.id,
            dry_run = action.dry_run,
            target = %target.display(),
            href = %href,
            "inject_topicref"
        );

        if action.dry_run {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                true,
                "dry-run: topicref injection skipped",
            )
            .with_metadata("href", json!(href)));
        }

        if !target.is_file() {
            return Ok(handler_failure(
                action,
                self.name(),
                format!("target map does not exist or is not a file: {}", target.display()),
                "invalid target",
            ));
        }

        if let Err(violation) = ctx.policy.validate_target(&target) {
            return Ok(policy_failure(action, self.name(), violation));
        }

        let mut root = match xml::load(&target) {
            Ok(root) => root,
            Err(e) => return Ok(handler_failure(action, self.name(), "invalid XML in target map", e)),
        };

        if topicref_hrefs(&root).contains(&href) {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                false,
                format!("topicref with href '{href}' already exists"),
            ));
        }

        root.children.push(XMLNode::Element(xml::element_with_attr(
            "topicref", "href", &href,
        )));

        if let Err(e) = xml::save(&root, &target) {
            return Ok(handler_failure(action, self.name(), "failed to write target map", e));
        }

        tracing::info!(action_id = %action.id, href = %href, "Topicref injected");
        Ok(ExecutionActionResult::success(
            &action.id,
            self.name(),
            false,
            format!("injected topicref href='{href}' into {}", target.display()),
        ))
    }
}

pub struct InjectTopicrefsHandler;

impl ActionHandler for InjectTopicrefsHandler {
    fn action_type(&self) -> &str {
        "inject_topicrefs"
    }

    fn name(&self) -> &str {
        "InjectTopicrefsHandler"
    }

    fn execute(
        &self,
        ctx: &HandlerContext,
        action: &Action,
    ) -> Result<ExecutionActionResult, HandlerError> {
        let (rel_source, rel_target) = match (
            action.str_param("source_map"),
            action.str_param("target_map"),
        ) {
            (Some(s), Some(t)) => (s, t),
            _ => {
                return Ok(handler_failure(
                    action,
                    self.name(),
                    "missing required parameters: source_map, target_map",
                    "missing parameter",
                ))
            }
        };

        // The source map is read-only input from the source package;
        // only the target goes through the sandbox.
        let source = ctx.source_root.join(rel_source);
        let target = ctx.sandbox.resolve(rel_target)?;

        tracing::info!(
            action_id = %action.id,
            dry_run = action.dry_run,
            source = %source.display(),
            target = %target.display(),
            "inject_topicrefs"
        );

        if action.dry_run {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                true,
                "dry-run: topicrefs injection skipped",
            ));
        }

        for (label, path) in [("source_map", source.as_path()), ("target_map", target.as_path())] {
            if !path.is_file() {
                return Ok(handler_failure(
                    action,
                    self.name(),
                    format!("{label} does not exist or is not a file: {}", path.display()),
                    "invalid path",
                ));
            }
        }

        if let Err(violation) = ctx.policy.validate_target(&target) {
            return Ok(policy_failure(action, self.name(), violation));
        }

        let source_root = match xml::load(&source) {
            Ok(root) => root,
            Err(e) => return Ok(handler_failure(action, self.name(), "invalid XML in source map", e)),
        };
        let mut target_root = match xml::load(&target) {
            Ok(root) => root,
            Err(e) => return Ok(handler_failure(action, self.name(), "invalid XML in target map", e)),
        };

        let source_refs: Vec<Element> = xml::descendants(&source_root)
            .into_iter()
            .filter(|e| e.name == "topicref" && e.attributes.contains_key("href"))
            .cloned()
            .collect();

        if source_refs.is_empty() {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                false,
                "no topicrefs found in source map",
            ));
        }

        let mut existing: BTreeSet<String> = topicref_hrefs(&target_root);
        let mut injected: Vec<String> = Vec::new();
        let mut already_present: Vec<String> = Vec::new();

        for topicref in source_refs {
            let href = match topicref.attributes.get("href") {
                Some(href) => href.clone(),
                None => continue,
            };

            if existing.contains(&href) {
                already_present.push(href);
                continue;
            }

            existing.insert(href.clone());
            injected.push(href);
            target_root.children.push(XMLNode::Element(topicref));
        }

        if injected.is_empty() {
            return Ok(ExecutionActionResult::skipped(
                &action.id,
                self.name(),
                false,
                "all topicrefs already present",
            )
            .with_metadata("skipped", json!(already_present)));
        }

        if let Err(e) = xml::save(&target_root, &target) {
            return Ok(handler_failure(action, self.name(), "failed to write target map", e));
        }

        tracing::info!(
            action_id = %action.id,
            injected = injected.len(),
            target = %target.display(),
            "Topicrefs injected"
        );
        Ok(ExecutionActionResult::success(
            &action.id,
            self.name(),
            false,
            format!("injected {} topicrefs", injected.len()),
        )
        .with_metadata("injected", json!(injected))
        .with_metadata("skipped", json!(already_present)))
    }
}

/// Every href carried by a topicref anywhere in the tree.
fn topicref_hrefs(root: &Element) -> BTreeSet<String> {
    xml::descendants(root)
        .into_iter()
        .filter(|e| e.name == "topicref")
        .filter_map(|e| e.attributes.get("href").cloned())
        .collect()
}

#[cfg(test)]
pub(crate) fn count_topicrefs_with_href(path: &Path, href: &str) -> usize {
    let root = xml::load(path).unwrap();
    xml::descendants(&root)
        .into_iter()
        .filter(|e| e.name == "topicref")
        .filter(|e| e.attributes.get("href").map(String::as_str) == Some(href))
        .count()
}
