//! The command tree
//!
//! Dash-joined command names are expanded into a tree of nodes so that
//! `target-add` is reachable both as a single flat token and as the path
//! `target add`. Intermediate nodes are created lazily and shared by every
//! command with a common prefix; topics pre-seed intermediate nodes with
//! descriptions. The tree is built once at startup and read-only during
//! dispatch.

mod synonyms;

pub use synonyms::synonyms_for;

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::{ArgPolicy, Command, CommandInfo, Group};

/// One node in the command tree. A node may group children, carry a bound
/// command of its own, or both (`target` can group `target add` while also
/// being directly invocable if a command named exactly `target` exists).
pub struct TreeNode {
    name: String,
    short: String,
    long: String,
    usage: String,
    group: Option<Group>,
    hidden: bool,
    aliases: Vec<String>,
    args: ArgPolicy,
    silence_usage: bool,
    from_topic: bool,
    handle: Option<Arc<dyn Command>>,
    children: HashMap<String, TreeNode>,
}

impl TreeNode {
    fn group_node(name: &str, short: impl Into<String>, group: Group) -> Self {
        Self {
            name: name.to_string(),
            short: short.into(),
            long: String::new(),
            usage: String::new(),
            group: Some(group),
            hidden: false,
            aliases: Vec::new(),
            args: ArgPolicy::Arbitrary,
            silence_usage: false,
            from_topic: false,
            handle: None,
            children: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short description (first line of the long one).
    pub fn short(&self) -> &str {
        &self.short
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    /// Argument template rendered after the invocation path in usage lines.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn group(&self) -> Option<Group> {
        self.group
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn arg_policy(&self) -> ArgPolicy {
        self.args
    }

    pub fn silences_usage(&self) -> bool {
        self.silence_usage
    }

    /// The bound command, present only on leaves.
    pub fn handle(&self) -> Option<&Arc<dyn Command>> {
        self.handle.as_ref()
    }

    /// Child by exact segment name.
    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children.get(name)
    }

    /// Child by segment name or registered alias.
    pub fn find_child(&self, token: &str) -> Option<&TreeNode> {
        self.children.get(token).or_else(|| {
            self.children
                .values()
                .find(|c| c.aliases.iter().any(|a| a == token))
        })
    }

    pub fn children(&self) -> impl Iterator<Item = &TreeNode> {
        self.children.values()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Fills the leaf-specific fields from a command registration. The
    /// description is only adopted when the node was newly created; a
    /// pre-seeded topic or earlier registration keeps its own.
    fn bind(&mut self, command: Arc<dyn Command>, info: &CommandInfo, newly_created: bool) {
        if newly_created {
            self.short = info.short_desc().to_string();
            self.long = info.desc.clone();
        }
        self.usage = info.usage.trim().to_string();
        self.hidden = info.hidden;
        self.args = ArgPolicy::from_info(info);
        self.silence_usage = info.silence_usage || command.flags().is_some();
        self.handle = Some(command);
    }
}

/// The whole tree, rooted at the program itself. Built by the dispatcher's
/// registration API.
pub struct CommandTree {
    root: TreeNode,
}

impl CommandTree {
    pub fn new(program: &str) -> Self {
        Self {
            root: TreeNode {
                name: program.to_string(),
                short: String::new(),
                long: String::new(),
                usage: String::new(),
                group: None,
                hidden: false,
                aliases: Vec::new(),
                args: ArgPolicy::Arbitrary,
                silence_usage: false,
                from_topic: false,
                handle: None,
                children: HashMap::new(),
            },
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Pre-seeds the path for a grouping topic. Every segment created by
    /// the walk takes the first content line as its short description; the
    /// final segment also records the full content. Descriptions already
    /// set by an earlier topic or operation are left alone.
    ///
    /// # Panics
    ///
    /// Panics when the exact full path was already registered as a topic.
    pub fn register_topic(&mut self, name: &str, content: &str) {
        let segments: Vec<&str> = name.split('-').collect();
        let short = content.lines().next().unwrap_or("").trim().to_string();
        let mut current = &mut self.root;
        for (depth, segment) in segments.iter().enumerate() {
            let last = depth == segments.len() - 1;
            if !current.children.contains_key(*segment) {
                current.children.insert(
                    segment.to_string(),
                    TreeNode::group_node(segment, short.clone(), Group::for_depth(depth + 1)),
                );
            } else if last && current.children[*segment].from_topic {
                panic!("topic already registered: {name}");
            }
            current = current
                .children
                .get_mut(*segment)
                .expect("segment inserted above");
        }
        current.from_topic = true;
        if current.long.is_empty() {
            current.long = content.trim().to_string();
        }
    }

    /// Inserts the flat root-level entry for a command: the full dash-joined
    /// name as a single child of the root, hidden unless the command only
    /// lives on the root.
    ///
    /// # Panics
    ///
    /// Panics when another command already claimed the same flat name.
    pub fn insert_root(&mut self, command: Arc<dyn Command>) {
        let info = command.info();
        if self.root.children.contains_key(&info.name) {
            panic!("command already registered: {}", info.name);
        }
        let mut node = TreeNode::group_node(&info.name, "", Group::for_depth(1));
        node.group = info.group;
        node.aliases = synonyms_for(&info.name)
            .iter()
            .map(|s| s.to_string())
            .collect();
        node.bind(command, &info, true);
        node.hidden = !info.only_append_on_root;
        self.root.children.insert(info.name.clone(), node);
    }

    /// Inserts the hierarchical entry for a command, creating missing
    /// intermediate nodes and binding the final segment as a leaf. Nodes
    /// that already exist keep their descriptions; only leaf fields are
    /// filled in. Re-inserting the command already bound at the path (the
    /// flat entry of a single-segment name) is a no-op.
    pub fn insert_path(&mut self, command: Arc<dyn Command>) {
        let info = command.info();
        let segments: Vec<String> = info.name.split('-').map(str::to_string).collect();
        let mut current = &mut self.root;
        for (depth, segment) in segments.iter().enumerate() {
            let last = depth == segments.len() - 1;
            let newly_created = !current.children.contains_key(segment);
            if newly_created {
                current.children.insert(
                    segment.clone(),
                    TreeNode::group_node(
                        segment,
                        synthesized_short(&segments[..depth + 1]),
                        Group::for_depth(depth + 1),
                    ),
                );
            }
            let node = current
                .children
                .get_mut(segment)
                .expect("segment inserted above");
            if last {
                if let Some(existing) = &node.handle {
                    if Arc::ptr_eq(existing, &command) {
                        return;
                    }
                    panic!("command already registered: {}", info.name);
                }
                node.aliases = synonyms_for(segment)
                    .iter()
                    .map(|s| s.to_string())
                    .collect();
                node.bind(command, &info, newly_created);
                return;
            }
            current = node;
        }
    }
}

/// Synthesized description for an implicitly created grouping node:
/// "Manage targets" for `target`, "Manage service instances" for
/// `service instance`.
fn synthesized_short<S: AsRef<str>>(segments: &[S]) -> String {
    let joined: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();
    format!("Manage {}s", joined.join(" "))
}
