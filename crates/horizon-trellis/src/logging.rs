//! Logging and debugging facilities for Horizon Trellis.
//!
//! Horizon Trellis uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_trellis::element=debug")
//!     .init();
//! ```
//!
//! Use [`ViewTreeDebug`] to print the composition tree under a view:
//!
//! ```ignore
//! use horizon_trellis::logging::ViewTreeDebug;
//!
//! println!("{}", ViewTreeDebug::new().format_tree(&root));
//! ```

use std::fmt::Write as FmtWrite;

use crate::view::View;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// View factory and registry.
    pub const DISPATCHER: &str = "horizon_trellis::dispatcher";
    /// View lifecycle.
    pub const VIEW: &str = "horizon_trellis::view";
    /// Element definitions, tweens and teardown.
    pub const ELEMENT: &str = "horizon_trellis::element";
    /// Model adapters and data errors.
    pub const MODEL: &str = "horizon_trellis::model";
    /// Matcher arming and predicate changes.
    pub const MATCHER: &str = "horizon_trellis::matcher";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for view tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Show the registry name each view was resolved under.
    pub show_names: bool,
    /// Show element and model ids under each view.
    pub show_children: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_names: true,
            show_children: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options that also list elements and models.
    pub fn detailed() -> Self {
        Self {
            show_children: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_names: false,
            show_children: false,
            ..Default::default()
        }
    }
}

/// Renders the child-view hierarchy under a view.
#[derive(Debug, Clone, Default)]
pub struct ViewTreeDebug {
    options: TreeFormatOptions,
}

impl ViewTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the tree rooted at `root`.
    pub fn format_tree(&self, root: &View) -> String {
        let mut output = String::new();
        self.format_into("(root)", root, 0, false, &mut output);
        output
    }

    fn format_into(&self, id: &str, view: &View, depth: usize, is_last: bool, output: &mut String) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(id);
        if self.options.show_names {
            if let Some(name) = view.name() {
                let _ = write!(output, " <{name}>");
            }
        }
        if view.is_destroyed() {
            output.push_str(" (destroyed)");
        }
        output.push('\n');

        if self.options.show_children {
            let prefix = self.build_detail_prefix(depth + 1);
            let elements = view.element_ids();
            if !elements.is_empty() {
                let _ = writeln!(output, "{prefix}elements: {}", elements.join(", "));
            }
            let models = view.model_ids();
            if !models.is_empty() {
                let _ = writeln!(output, "{prefix}models: {}", models.join(", "));
            }
        }

        let children = view.children();
        let count = children.len();
        for (i, (child_id, child)) in children.into_iter().enumerate() {
            self.format_into(&child_id, &child, depth + 1, i + 1 == count, output);
        }
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }

    fn build_detail_prefix(&self, depth: usize) -> String {
        let branch = match self.options.style {
            TreeStyle::Ascii => "|",
            TreeStyle::Unicode => "\u{2502}",
            TreeStyle::Compact => "",
        };
        let mut prefix = String::new();
        for _ in 0..depth {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix
    }
}
