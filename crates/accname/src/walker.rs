//! Recursive name computation
//!
//! One `NameComputer` serves one computation pass. It owns the state that
//! must survive across the nested walks of that pass:
//! - `visited`: nodes whose contribution (text and generated content) was
//!   already consumed
//! - `ctx`: the frame chain and the `aria-owns` ledger
//!
//! Each followed reference gets its own `WalkFrame` holding the `skip` flag,
//! which stops all further processing in that frame once an authoritative
//! name was found.

use crate::config::AccNameConfig;
use crate::css;
use crate::error::{AccNameError, Result};
use crate::oracle::{NodeKind, Oracles, TreeAccessor};
use crate::refs::{self, OwnershipContext};
use crate::roles::{self, Role, WidgetKind};
use crate::types::NamingResult;
use crate::utils::{add_spacing, collapse_whitespace, normalize};
use crate::visibility;
use ahash::AHashSet;
use dom::NodeId;
use tracing::{debug, trace};

/// Walk state local to one followed reference
struct WalkFrame<'f> {
    /// Node the frame names
    reference: NodeId,
    /// Node whose attribute pointed here (`None` for the root frame)
    referrer: Option<NodeId>,
    /// Do not follow `aria-labelledby` again
    stop: bool,
    skip: bool,
    /// The referenced node is itself hidden: hidden markers inside are ignored
    include_hidden: bool,
    via_owns: bool,
    /// Controls whose value must not leak into their own label
    ignore_values: &'f [NodeId],
    /// Block-level elements entered and not yet left
    open_blocks: Vec<NodeId>,
}

impl<'f> WalkFrame<'f> {
    fn new(reference: NodeId, referrer: Option<NodeId>, ignore_values: &'f [NodeId]) -> Self {
        Self {
            reference,
            referrer,
            stop: referrer.is_some(),
            skip: false,
            include_hidden: false,
            via_owns: false,
            ignore_values,
            open_blocks: Vec::new(),
        }
    }
}

/// What an element's own markup says about its name
struct OwnName {
    name: String,
    title: String,
    descend: bool,
    source: Option<&'static str>,
}

impl OwnName {
    fn set(&mut self, name: String, source: &'static str) {
        if !name.is_empty() {
            self.name = name;
            self.source = Some(source);
        }
    }
}

pub struct NameComputer<'a> {
    oracles: Oracles<'a>,
    config: &'a AccNameConfig,
    ctx: OwnershipContext,
    visited: AHashSet<NodeId>,
}

impl<'a> NameComputer<'a> {
    pub fn new(oracles: Oracles<'a>, config: &'a AccNameConfig, root: NodeId) -> Self {
        Self {
            oracles,
            config,
            ctx: OwnershipContext::new(root),
            visited: AHashSet::new(),
        }
    }

    pub fn context(&self) -> &OwnershipContext {
        &self.ctx
    }

    /// Name of the root node
    ///
    /// The returned `title` is the root's tooltip candidate; the caller
    /// decides between name and description.
    pub fn compute(&mut self) -> Result<NamingResult> {
        let root = self.ctx.root();
        if self.oracles.tree.kind(root)? != NodeKind::Element {
            return Err(AccNameError::UnexpectedNode {
                node: root,
                expected: "element",
            });
        }
        let mut frame = WalkFrame::new(root, None, &[]);
        self.walk(&mut frame, root)
    }

    /// Names of the nodes listed in `ids`, joined with single spaces
    ///
    /// Each target is named without following further `aria-labelledby`, and
    /// `referrer`'s own value is kept out of the result.
    pub fn compute_references(&mut self, referrer: NodeId, ids: &str) -> Result<String> {
        let mut parts = Vec::new();
        for target in refs::resolve_ids(self.oracles.tree, ids) {
            let result = self.walk_reference(target, referrer, &[referrer], false)?;
            push_part(&mut parts, &result.name);
        }
        Ok(parts.join(" "))
    }

    fn walk_reference(
        &mut self,
        referenced: NodeId,
        referrer: NodeId,
        ignore_values: &[NodeId],
        via_owns: bool,
    ) -> Result<NamingResult> {
        let oracles = self.oracles;
        // Explicit references override the target's own hidden markers, not
        // those of its ancestors
        if visibility::is_ancestor_hidden(oracles, Some(&self.ctx), referenced, None, false, true)? {
            trace!(node = referenced, referrer, "referenced node sits in a hidden subtree");
            return Ok(NamingResult::default());
        }
        let include_hidden = visibility::is_hidden(oracles, referenced, None)?;

        self.ctx.push_frame(referenced, Some(referrer));
        let mut frame = WalkFrame::new(referenced, Some(referrer), ignore_values);
        frame.include_hidden = include_hidden;
        frame.via_owns = via_owns;
        let walked = self.walk(&mut frame, referenced);
        self.ctx.pop_frame();

        let mut result = walked?;
        if result.name.trim().is_empty() && !result.title.is_empty() {
            result.name = add_spacing(&std::mem::take(&mut result.title));
        }
        Ok(result)
    }

    fn walk(&mut self, frame: &mut WalkFrame<'_>, node: NodeId) -> Result<NamingResult> {
        if frame.skip {
            return Ok(NamingResult::default());
        }
        let oracles = self.oracles;
        let is_reference = node == frame.reference;

        if !is_reference
            && !frame.include_hidden
            && visibility::is_hidden(oracles, node, Some(frame.reference))?
        {
            trace!(node, "skipping hidden node");
            return Ok(NamingResult::default());
        }
        if !self.visited.insert(node) && !is_reference {
            trace!(node, "already consumed");
            return Ok(NamingResult::default());
        }

        match oracles.tree.kind(node)? {
            NodeKind::Text => self.walk_text(frame, node),
            NodeKind::Element => self.walk_element(frame, node),
            NodeKind::Other => {
                let mut result = NamingResult::default();
                for child in oracles.tree.children(node)? {
                    result.name.push_str(&self.walk(frame, child)?.name);
                }
                Ok(result)
            }
        }
    }

    fn walk_text(&mut self, frame: &mut WalkFrame<'_>, node: NodeId) -> Result<NamingResult> {
        let left_block = self.close_blocks(frame, node)?;
        let text = collapse_whitespace(self.oracles.tree.text(node)?);
        Ok(NamingResult::named(if left_block {
            format!(" {}", text)
        } else {
            text
        }))
    }

    fn walk_element(&mut self, frame: &mut WalkFrame<'_>, node: NodeId) -> Result<NamingResult> {
        let oracles = self.oracles;
        let tree = oracles.tree;
        let tag = tree.tag_name(node)?;
        let role = roles::classify(tree, node)?;
        let presentational = roles::is_presentational(oracles, node, &role)?;
        let is_reference = node == frame.reference;

        let block = css::is_block_level(oracles, node)?;
        if block && !frame.open_blocks.contains(&node) {
            frame.open_blocks.push(node);
        }

        let own = self.own_name(frame, node, tag, &role, presentational)?;
        if let Some(source) = own.source {
            debug!(node, tag, source, name = own.name.trim(), "named by markup");
        }

        let excluded = roles::is_content_excluded(oracles, &self.ctx, node)?;
        let descend = own.descend && !frame.skip && own.name.is_empty() && !excluded;
        if excluded && own.name.is_empty() {
            trace!(node, tag, "content excluded from name");
        }

        let follow_owns = own.descend && !frame.skip && own.name.is_empty();
        let mut body = own.name;
        let mut content = String::new();
        if descend {
            for child in tree.children(node)? {
                content.push_str(&self.walk(frame, child)?.name);
            }
        }
        if follow_owns {
            content.push_str(&self.owned_name(frame.reference, node, tag)?);
        }
        if descend {
            let generated = css::pseudo_pair(oracles, self.config, node, frame.referrer)?;
            content = format!("{}{}{}", generated.before, content, generated.after);
        }
        body.push_str(&content);

        let mut title = own.title;
        if !is_reference {
            // Tooltips of nested nodes only stand in for missing content
            if body.trim().is_empty() && !title.is_empty() {
                body = add_spacing(&title);
            }
            title.clear();
        }

        if block {
            body = format!(" {} ", body);
        }
        Ok(NamingResult { name: body, title })
    }

    /// Labelling rules for one element, first non-empty result wins
    fn own_name(
        &mut self,
        frame: &mut WalkFrame<'_>,
        node: NodeId,
        tag: &str,
        role: &Role<'_>,
        presentational: bool,
    ) -> Result<OwnName> {
        let tree = self.oracles.tree;
        let is_reference = node == frame.reference;
        let mut own = OwnName {
            name: String::new(),
            title: String::new(),
            descend: true,
            source: None,
        };

        if !presentational {
            if let Some(title) = non_empty_attr(tree, node, "title")? {
                own.title = normalize(title);
            }
        }

        if !frame.stop && is_reference {
            if let Some(ids) = non_empty_attr(tree, node, "aria-labelledby")? {
                if !presentational {
                    let name = add_spacing(&self.compute_references(node, ids)?);
                    own.set(name, "aria-labelledby");
                }
                if !own.name.is_empty() || presentational {
                    frame.skip = true;
                    own.descend = false;
                    return Ok(own);
                }
            }
        }

        let native_field = is_native_field(tag);
        let widget = role.widget();
        let embedded_control =
            !presentational && (!is_reference || frame.via_owns) && (native_field || widget.is_some());

        if embedded_control {
            own.descend = false;
            if frame.ignore_values.contains(&node) {
                trace!(node, "value of the labelled control stays out of its label");
            } else {
                let value = add_spacing(&self.widget_value(node, tag, widget)?);
                own.set(value, "embedded control value");
            }
            return Ok(own);
        }

        if presentational {
            if tag == "optgroup" || tag == "svg" {
                own.descend = false;
            }
            return Ok(own);
        }

        if let Some(label) = non_empty_attr(tree, node, "aria-label")? {
            own.set(add_spacing(label), "aria-label");
            own.descend = false;
            if is_reference {
                frame.skip = true;
            }
        }

        if own.name.is_empty() && is_reference && native_field {
            let name = self.native_label_name(node)?;
            own.set(name, "label element");
        }

        if own.name.is_empty() {
            if let Some(alt) = image_alt(tree, node, tag)? {
                own.set(add_spacing(alt), "alt");
            }
        }

        if tag == "optgroup" {
            own.descend = false;
            if own.name.is_empty() {
                if let Some(label) = non_empty_attr(tree, node, "label")? {
                    own.set(add_spacing(label), "optgroup label");
                }
            }
        }

        if let Some(kind) = button_kind(tree, node, tag)? {
            let value = tree.attr(node, "value")?.map(normalize).unwrap_or_default();
            if own.name.is_empty() {
                let label = if value.is_empty() {
                    kind.default_label()
                } else {
                    value.as_str()
                };
                own.set(add_spacing(label), "button value");
            } else if !value.is_empty() && value != own.name.trim() && own.title.is_empty() {
                own.title = value;
            }
        }

        if matches!(tag, "fieldset" | "table" | "figure") && node == self.ctx.root() {
            own.descend = false;
            if own.name.is_empty() {
                if let Some(caption) = self.caption_child(node)? {
                    let caption = self.walk_reference(caption, node, &[], false)?;
                    own.set(add_spacing(&caption.name), "caption");
                }
            }
        }

        if tag == "svg" {
            own.descend = false;
            if own.name.is_empty() {
                if let Some(title) = self.child_with_tag(node, "title")? {
                    let title = self.walk_reference(title, node, &[], false)?;
                    own.set(add_spacing(&title.name), "svg title");
                }
            }
            if own.title.is_empty() {
                if let Some(desc) = self.child_with_tag(node, "desc")? {
                    own.title = normalize(&self.walk_reference(desc, node, &[], false)?.name);
                }
            }
        }

        Ok(own)
    }

    /// Value exposed by a control embedded in the name being computed
    fn widget_value(
        &mut self,
        node: NodeId,
        tag: &str,
        widget: Option<WidgetKind>,
    ) -> Result<String> {
        let tree = self.oracles.tree;
        let value_attr = || -> Result<String> {
            Ok(tree.attr(node, "value")?.unwrap_or("").to_string())
        };

        match widget {
            Some(WidgetKind::Range) => {
                for attr in ["aria-valuetext", "aria-valuenow"] {
                    if let Some(value) = non_empty_attr(tree, node, attr)? {
                        return Ok(value.to_string());
                    }
                }
                value_attr()
            }
            Some(WidgetKind::Edit) => {
                let text = self.rendered_text(node)?;
                if text.is_empty() {
                    value_attr()
                } else {
                    Ok(text)
                }
            }
            Some(WidgetKind::Select(item_roles)) => self.selected_items_name(node, item_roles),
            None => match tag {
                "select" => self.native_select_text(node),
                "textarea" => {
                    let value = value_attr()?;
                    if value.trim().is_empty() {
                        self.rendered_text(node)
                    } else {
                        Ok(value)
                    }
                }
                _ => {
                    let kind = tree.attr(node, "type")?.unwrap_or("text").trim();
                    if ["checkbox", "radio", "file"]
                        .iter()
                        .any(|t| kind.eq_ignore_ascii_case(t))
                    {
                        Ok(String::new())
                    } else {
                        value_attr()
                    }
                }
            },
        }
    }

    /// Names of `aria-selected="true"` descendants with a valid item role
    fn selected_items_name(
        &mut self,
        widget: NodeId,
        item_roles: &'static [&'static str],
    ) -> Result<String> {
        let tree = self.oracles.tree;
        let mut parts = Vec::new();
        let mut stack: Vec<NodeId> = tree.children(widget)?.into_iter().rev().collect();

        while let Some(current) = stack.pop() {
            if tree.kind(current)? != NodeKind::Element {
                continue;
            }
            let selected = tree
                .attr(current, "aria-selected")?
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
            let role = roles::classify(tree, current)?;
            if selected && role.effective().is_some_and(|r| item_roles.contains(&r)) {
                let item = self.walk_reference(current, widget, &[], false)?;
                push_part(&mut parts, &item.name);
            }
            stack.extend(tree.children(current)?.into_iter().rev());
        }

        Ok(parts.join(" "))
    }

    /// Text of the selected options of a native select
    fn native_select_text(&self, select: NodeId) -> Result<String> {
        let tree = self.oracles.tree;
        let multiple = tree.attr(select, "multiple")?.is_some();
        let mut options = Vec::new();
        let mut selected = Vec::new();
        let mut stack: Vec<NodeId> = tree.children(select)?.into_iter().rev().collect();

        while let Some(current) = stack.pop() {
            if tree.kind(current)? != NodeKind::Element {
                continue;
            }
            if tree.tag_name(current)? == "option" {
                options.push(current);
                if tree.attr(current, "selected")?.is_some() {
                    selected.push(current);
                }
                continue;
            }
            stack.extend(tree.children(current)?.into_iter().rev());
        }

        // A single select always shows one option
        if selected.is_empty() && !multiple {
            selected.extend(options.first().copied());
        }

        let mut parts = Vec::new();
        for option in selected {
            push_part(&mut parts, &self.rendered_text(option)?);
        }
        Ok(parts.join(" "))
    }

    /// Names of the label elements of a native form field, in document order
    fn native_label_name(&mut self, control: NodeId) -> Result<String> {
        let mut parts = Vec::new();
        for label in self.labels_for(control)? {
            let result = self.walk_reference(label, control, &[control], false)?;
            push_part(&mut parts, &result.name);
        }
        Ok(add_spacing(&parts.join(" ")))
    }

    /// `<label for=id>` elements and the wrapping label without `for`
    fn labels_for(&self, control: NodeId) -> Result<Vec<NodeId>> {
        let tree = self.oracles.tree;
        let id = tree
            .attr(control, "id")?
            .map(str::trim)
            .filter(|id| !id.is_empty());

        let mut document = control;
        while let Some(parent) = tree.parent(document)? {
            document = parent;
        }

        let mut labels = Vec::new();
        let mut stack = vec![document];
        while let Some(current) = stack.pop() {
            if tree.kind(current)? == NodeKind::Element && tree.tag_name(current)? == "label" {
                let target = tree.attr(current, "for")?.map(str::trim);
                let explicit = id.is_some() && target == id;
                let wrapping = target.is_none() && self.is_within(control, current, None)?;
                if explicit || wrapping {
                    labels.push(current);
                }
            }
            stack.extend(tree.children(current)?.into_iter().rev());
        }
        Ok(labels)
    }

    /// Text of nodes granted through `aria-owns`, appended after DOM content
    fn owned_name(&mut self, reference: NodeId, node: NodeId, tag: &str) -> Result<String> {
        if is_native_field(tag) || tag == "img" {
            return Ok(String::new());
        }
        let tree = self.oracles.tree;
        let Some(owns) = non_empty_attr(tree, node, "aria-owns")? else {
            return Ok(String::new());
        };

        let mut parts = Vec::new();
        for id in refs::split_ids(owns) {
            let Some(target) = tree.element_by_id(id) else {
                trace!(id, "unresolved aria-owns reference");
                continue;
            };
            if target == node || self.is_within(target, node, None)? {
                trace!(id, node, "owned node is already a descendant");
                continue;
            }
            if self.visited.contains(&target) {
                continue;
            }
            if !self.ctx.enter_ownership(id, reference, node, target) {
                continue;
            }
            let result = self.walk_reference(target, node, &[], true)?;
            push_part(&mut parts, &result.name);
        }
        Ok(add_spacing(&parts.join(" ")))
    }

    /// First element child that is a legend or caption
    fn caption_child(&self, node: NodeId) -> Result<Option<NodeId>> {
        let tree = self.oracles.tree;
        for child in tree.children(node)? {
            if tree.kind(child)? == NodeKind::Element && roles::classify(tree, child)?.is_caption_like()
            {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    fn child_with_tag(&self, node: NodeId, tag: &str) -> Result<Option<NodeId>> {
        let tree = self.oracles.tree;
        for child in tree.children(node)? {
            if tree.kind(child)? == NodeKind::Element && tree.tag_name(child)? == tag {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Text content of a subtree with hidden parts left out
    fn rendered_text(&self, node: NodeId) -> Result<String> {
        let mut out = String::new();
        self.collect_text(node, node, &mut out)?;
        Ok(normalize(&out))
    }

    fn collect_text(&self, node: NodeId, scope: NodeId, out: &mut String) -> Result<()> {
        let oracles = self.oracles;
        match oracles.tree.kind(node)? {
            NodeKind::Text => out.push_str(oracles.tree.text(node)?),
            NodeKind::Element => {
                if visibility::is_hidden(oracles, node, Some(scope))? {
                    return Ok(());
                }
                let block = css::is_block_level(oracles, node)?;
                if block {
                    out.push(' ');
                }
                for child in oracles.tree.children(node)? {
                    self.collect_text(child, scope, out)?;
                }
                if block {
                    out.push(' ');
                }
            }
            NodeKind::Other => {
                for child in oracles.tree.children(node)? {
                    self.collect_text(child, scope, out)?;
                }
            }
        }
        Ok(())
    }

    /// Forget block elements that no longer contain `node`; true when one
    /// was left since the previous text
    fn close_blocks(&self, frame: &mut WalkFrame<'_>, node: NodeId) -> Result<bool> {
        let open = frame.open_blocks.len();
        let mut still_open = Vec::with_capacity(open);
        for &block in &frame.open_blocks {
            if self.is_within(node, block, Some(frame.reference))? {
                still_open.push(block);
            }
        }
        frame.open_blocks = still_open;
        Ok(frame.open_blocks.len() < open)
    }

    /// True when `ancestor` is a strict DOM ancestor of `node`, looking no
    /// higher than `bound`
    fn is_within(&self, node: NodeId, ancestor: NodeId, bound: Option<NodeId>) -> Result<bool> {
        let tree = self.oracles.tree;
        let mut current = tree.parent(node)?;
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            if Some(id) == bound {
                return Ok(false);
            }
            current = tree.parent(id)?;
        }
        Ok(false)
    }
}

/// Native button-like input types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonKind {
    Submit,
    Reset,
    Image,
    Button,
}

impl ButtonKind {
    fn default_label(self) -> &'static str {
        match self {
            ButtonKind::Submit => "Submit",
            ButtonKind::Reset => "Reset",
            ButtonKind::Image | ButtonKind::Button => "",
        }
    }
}

fn button_kind(tree: &dyn TreeAccessor, node: NodeId, tag: &str) -> Result<Option<ButtonKind>> {
    if tag != "input" {
        return Ok(None);
    }
    let kind = tree.attr(node, "type")?.unwrap_or("").trim().to_ascii_lowercase();
    Ok(match kind.as_str() {
        "submit" => Some(ButtonKind::Submit),
        "reset" => Some(ButtonKind::Reset),
        "image" => Some(ButtonKind::Image),
        "button" => Some(ButtonKind::Button),
        _ => None,
    })
}

fn image_alt<'t>(tree: &'t dyn TreeAccessor, node: NodeId, tag: &str) -> Result<Option<&'t str>> {
    let image = match tag {
        "img" | "area" => true,
        "input" => tree
            .attr(node, "type")?
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("image")),
        _ => false,
    };
    if !image {
        return Ok(None);
    }
    non_empty_attr(tree, node, "alt")
}

fn is_native_field(tag: &str) -> bool {
    matches!(tag, "input" | "select" | "textarea")
}

/// Attribute value with surrounding whitespace removed, `None` when blank
fn non_empty_attr<'t>(
    tree: &'t dyn TreeAccessor,
    node: NodeId,
    name: &str,
) -> Result<Option<&'t str>> {
    Ok(tree
        .attr(node, name)?
        .map(str::trim)
        .filter(|value| !value.is_empty()))
}

fn push_part(parts: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        parts.push(text.to_string());
    }
}
