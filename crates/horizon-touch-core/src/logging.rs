//! Logging and debugging facilities for Horizon Touch.
//!
//! This module provides:
//! - Target names used with the `tracing` crate for structured logging
//! - Debug visualization for node trees
//!
//! # Tracing Integration
//!
//! Horizon Touch uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_touch=debug,horizon_touch_core=info")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use horizon_touch_core::logging::SceneTreeDebug;
//! use horizon_touch_core::scene::SceneGraph;
//!
//! let mut scene = SceneGraph::new();
//! let root = scene.create_node("window");
//! scene.create_child(root, "button").unwrap();
//!
//! let output = SceneTreeDebug::new().format_subtree(&scene, root).unwrap();
//! assert!(output.contains("button"));
//! ```

use std::fmt::Write as FmtWrite;

use crate::error::SceneResult;
use crate::scene::{NodeId, SceneGraph};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_touch_core";
    /// Node hierarchy target.
    pub const SCENE: &str = "horizon_touch_core::scene";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_touch_core::signal";
    /// Pointer registry and routing target.
    pub const DISPATCH: &str = "horizon_touch::dispatch";
    /// Conflict resolution target.
    pub const ARENA: &str = "horizon_touch::arena";
    /// Gesture state machine target.
    pub const STATE: &str = "horizon_touch::state";
    /// Named message delivery target.
    pub const MESSAGE: &str = "horizon_touch::message";
    /// Batch processing target.
    pub const MANAGER: &str = "horizon_touch::manager";
}

/// Style options for node tree visualization.
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

/// Configuration for node tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing node trees.
#[derive(Debug, Clone, Default)]
pub struct SceneTreeDebug {
    options: TreeFormatOptions,
}

impl SceneTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every tree in the scene.
    pub fn format_all(&self, scene: &SceneGraph) -> SceneResult<String> {
        let mut roots: Vec<NodeId> = scene.root_nodes().collect();
        roots.sort();

        let mut output = String::new();
        let _ = writeln!(output, "Scene ({} nodes):", scene.node_count());
        if roots.is_empty() {
            output.push_str("  (empty)\n");
        }
        for root in roots {
            self.format_into(scene, root, 0, true, &|_: NodeId| Vec::new(), &mut output)?;
        }
        Ok(output)
    }

    /// Format a subtree starting from a specific node.
    pub fn format_subtree(&self, scene: &SceneGraph, root: NodeId) -> SceneResult<String> {
        self.format_subtree_with(scene, root, |_| Vec::new())
    }

    /// Format a subtree, appending the labels returned by `annotate` to each node.
    pub fn format_subtree_with<F>(
        &self,
        scene: &SceneGraph,
        root: NodeId,
        annotate: F,
    ) -> SceneResult<String>
    where
        F: Fn(NodeId) -> Vec<String>,
    {
        let mut output = String::new();
        self.format_into(scene, root, 0, true, &annotate, &mut output)?;
        Ok(output)
    }

    fn format_into(
        &self,
        scene: &SceneGraph,
        id: NodeId,
        depth: usize,
        is_last: bool,
        annotate: &dyn Fn(NodeId) -> Vec<String>,
        output: &mut String,
    ) -> SceneResult<()> {
        if let Some(max) = self.options.max_depth
            && depth > max
        {
            return Ok(());
        }

        let name = scene.name(id)?;
        output.push_str(&self.build_prefix(depth, is_last));
        output.push_str(if name.is_empty() { "(unnamed)" } else { name });
        if self.options.show_ids {
            let _ = write!(output, " [{id:?}]");
        }
        let labels = annotate(id);
        if !labels.is_empty() {
            let _ = write!(output, " {{{}}}", labels.join(", "));
        }
        output.push('\n');

        let children = scene.children(id)?;
        let child_count = children.len();
        for (i, &child) in children.iter().enumerate() {
            self.format_into(scene, child, depth + 1, i + 1 == child_count, annotate, output)?;
        }
        Ok(())
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
}
