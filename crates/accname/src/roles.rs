//! Role classification
//!
//! Four fixed role/tag tables drive name-from-content:
//! - `LIST1`: content always names the node
//! - `LIST2`: content never names the node
//! - `LIST3`: content is excluded unless the node is focusable (as the
//!   top-level node) or is referenced from a `LIST1` node
//! - `LIST4`: caption-like roles used by the legend/caption lookup
//!
//! Tables are plain data. A node matches a table through its explicit role
//! when it has a recognized one, through its tag otherwise.

use crate::error::Result;
use crate::oracle::{NodeKind, Oracles, TreeAccessor};
use crate::refs::OwnershipContext;
use dom::NodeId;

/// One role/tag table
#[derive(Debug)]
pub struct RoleTable {
    pub roles: &'static [&'static str],
    pub tags: &'static [&'static str],
}

pub const LIST1: RoleTable = RoleTable {
    roles: &[
        "link",
        "button",
        "checkbox",
        "option",
        "radio",
        "switch",
        "tab",
        "treeitem",
        "menuitem",
        "menuitemcheckbox",
        "menuitemradio",
        "row",
        "cell",
        "gridcell",
        "columnheader",
        "rowheader",
        "tooltip",
        "heading",
    ],
    tags: &[
        "a", "button", "summary", "input", "h1", "h2", "h3", "h4", "h5", "h6", "menuitem",
        "option", "td", "th",
    ],
};

pub const LIST2: RoleTable = RoleTable {
    roles: &[
        "application",
        "alert",
        "log",
        "marquee",
        "timer",
        "alertdialog",
        "dialog",
        "banner",
        "complementary",
        "form",
        "main",
        "navigation",
        "region",
        "search",
        "article",
        "document",
        "feed",
        "figure",
        "img",
        "math",
        "toolbar",
        "menu",
        "menubar",
        "grid",
        "listbox",
        "radiogroup",
        "textbox",
        "searchbox",
        "spinbutton",
        "scrollbar",
        "slider",
        "tablist",
        "tabpanel",
        "tree",
        "treegrid",
        "separator",
    ],
    tags: &[
        "article", "aside", "body", "select", "datalist", "optgroup", "dialog", "figure",
        "footer", "form", "header", "hr", "img", "textarea", "input", "main", "math", "menu",
        "nav", "section",
    ],
};

pub const LIST3: RoleTable = RoleTable {
    roles: &[
        "combobox",
        "term",
        "definition",
        "directory",
        "list",
        "group",
        "note",
        "status",
        "table",
        "rowgroup",
        "row",
        "contentinfo",
    ],
    tags: &[
        "dl", "ul", "ol", "dd", "details", "output", "table", "thead", "tbody", "tfoot", "tr",
    ],
};

pub const LIST4: RoleTable = RoleTable {
    roles: &["legend", "caption"],
    tags: &["legend", "caption", "figcaption"],
};

/// Roles outside the tables that still count as recognized tokens
const OTHER_ROLES: &[&str] = &[
    "presentation",
    "none",
    "generic",
    "listitem",
    "paragraph",
    "progressbar",
    "meter",
    "blockquote",
    "code",
    "emphasis",
    "strong",
    "insertion",
    "deletion",
    "subscript",
    "superscript",
    "time",
    "mark",
];

/// Range widgets expose their current value
pub const RANGE_WIDGETS: &[&str] = &["scrollbar", "slider", "spinbutton"];

/// Edit widgets expose their text content
pub const EDIT_WIDGETS: &[&str] = &["searchbox", "textbox", "combobox"];

/// Select widgets expose the names of their selected items
pub const SELECT_WIDGETS: &[&str] = &["grid", "listbox", "tablist", "tree", "treegrid"];

/// ARIA attributes that keep a presentational role from taking effect
/// (labelling attributes excluded)
const GLOBAL_ARIA_ATTRIBUTES: &[&str] = &[
    "aria-atomic",
    "aria-busy",
    "aria-controls",
    "aria-current",
    "aria-describedby",
    "aria-details",
    "aria-disabled",
    "aria-dropeffect",
    "aria-errormessage",
    "aria-flowto",
    "aria-grabbed",
    "aria-haspopup",
    "aria-invalid",
    "aria-keyshortcuts",
    "aria-live",
    "aria-owns",
    "aria-relevant",
    "aria-roledescription",
];

/// Widget family of an embedded control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Range,
    Edit,
    /// Carries the roles its selectable items may have
    Select(&'static [&'static str]),
}

impl WidgetKind {
    pub fn of(role: &str) -> Option<Self> {
        if RANGE_WIDGETS.contains(&role) {
            Some(WidgetKind::Range)
        } else if EDIT_WIDGETS.contains(&role) {
            Some(WidgetKind::Edit)
        } else if SELECT_WIDGETS.contains(&role) {
            Some(WidgetKind::Select(match role {
                "grid" | "treegrid" => &["gridcell", "rowheader", "columnheader"],
                "listbox" => &["option"],
                "tablist" => &["tab"],
                _ => &["treeitem"],
            }))
        } else {
            None
        }
    }
}

/// Role of one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Role<'t> {
    /// First recognized token of the `role` attribute
    pub explicit: Option<&'static str>,
    /// Role implied by the tag
    pub implicit: Option<&'static str>,
    pub tag: &'t str,
}

impl<'t> Role<'t> {
    /// Explicit role, falling back to the implicit one
    pub fn effective(&self) -> Option<&'static str> {
        self.explicit.or(self.implicit)
    }

    /// `role="presentation"` or `role="none"`
    pub fn is_presentation_token(&self) -> bool {
        matches!(self.explicit, Some("presentation" | "none"))
    }

    pub fn in_table(&self, table: &RoleTable) -> bool {
        match self.explicit {
            Some(role) => table.roles.contains(&role),
            None => table.tags.contains(&self.tag),
        }
    }

    /// Caption lookup accepts either the tag or the effective role
    pub fn is_caption_like(&self) -> bool {
        LIST4.tags.contains(&self.tag)
            || self.effective().is_some_and(|r| LIST4.roles.contains(&r))
    }

    pub fn widget(&self) -> Option<WidgetKind> {
        self.explicit.and_then(WidgetKind::of)
    }
}

fn recognized(token: &str) -> Option<&'static str> {
    [LIST1.roles, LIST2.roles, LIST3.roles, LIST4.roles, OTHER_ROLES]
        .into_iter()
        .flat_map(|roles| roles.iter())
        .find(|role| role.eq_ignore_ascii_case(token))
        .copied()
}

/// Implicit role for a tag
pub fn implicit_role(tag: &str, has_href: bool) -> Option<&'static str> {
    Some(match tag {
        "a" | "area" if has_href => "link",
        "button" | "summary" => "button",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "img" => "img",
        "ul" | "ol" | "menu" => "list",
        "li" => "listitem",
        "dt" => "term",
        "dd" => "definition",
        "table" => "table",
        "thead" | "tbody" | "tfoot" => "rowgroup",
        "tr" => "row",
        "td" => "cell",
        "th" => "columnheader",
        "caption" | "figcaption" => "caption",
        "legend" => "legend",
        "fieldset" | "details" | "optgroup" => "group",
        "figure" => "figure",
        "nav" => "navigation",
        "main" => "main",
        "aside" => "complementary",
        "header" => "banner",
        "footer" => "contentinfo",
        "form" => "form",
        "section" => "region",
        "article" => "article",
        "dialog" => "dialog",
        "hr" => "separator",
        "output" => "status",
        "math" => "math",
        "option" => "option",
        "select" | "datalist" => "listbox",
        "textarea" | "input" => "textbox",
        "progress" => "progressbar",
        "meter" => "meter",
        "p" => "paragraph",
        _ => return None,
    })
}

/// Classify an element against the tables
pub fn classify<'t>(tree: &'t dyn TreeAccessor, node: NodeId) -> Result<Role<'t>> {
    let tag = tree.tag_name(node)?;
    let explicit = tree
        .attr(node, "role")?
        .and_then(|value| value.split_whitespace().find_map(recognized));
    let implicit = implicit_role(tag, tree.attr(node, "href")?.is_some());
    Ok(Role {
        explicit,
        implicit,
        tag,
    })
}

/// Presentational role that actually takes effect: not focusable and
/// without global ARIA attributes
pub fn is_presentational(oracles: Oracles<'_>, node: NodeId, role: &Role<'_>) -> Result<bool> {
    if !role.is_presentation_token() {
        return Ok(false);
    }
    if oracles.focus.is_focusable(node)? {
        return Ok(false);
    }
    for attr in GLOBAL_ARIA_ATTRIBUTES {
        if oracles.tree.attr(node, attr)?.is_some() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Decide whether traversal may descend into `node`'s children
///
/// `LIST3` is checked first: the top-level node is included only when
/// focusable, other nodes only when a node on their referencing chain is in
/// `LIST1`. Then `LIST2` excludes, and so does a top-level node outside
/// `LIST1`.
pub fn is_content_excluded(
    oracles: Oracles<'_>,
    ctx: &OwnershipContext,
    node: NodeId,
) -> Result<bool> {
    let tree = oracles.tree;
    if tree.kind(node)? != NodeKind::Element {
        return Ok(false);
    }
    let role = classify(tree, node)?;
    let is_root = node == ctx.root();

    if role.in_table(&LIST3) {
        if is_root {
            return Ok(!oracles.focus.is_focusable(node)?);
        }
        for ancestor in ctx.referencing_ancestors(tree, node)? {
            if tree.kind(ancestor)? == NodeKind::Element
                && classify(tree, ancestor)?.in_table(&LIST1)
            {
                return Ok(false);
            }
        }
        return Ok(true);
    }

    if role.in_table(&LIST2) {
        return Ok(true);
    }

    Ok(is_root && !role.in_table(&LIST1))
}
