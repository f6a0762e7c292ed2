//! Plain-text help rendering for the command tree

use crate::command::{ArgPolicy, Group};
use crate::tree::{CommandTree, TreeNode};

/// Order in which groups are listed in help output.
const GROUP_ORDER: [Group; 5] = [
    Group::Auth,
    Group::Resource,
    Group::SubResource,
    Group::Plugin,
    Group::Shorthands,
];

/// One-line usage summary for a resolved node.
pub fn usage_line(program: &str, path: &[String], node: &TreeNode) -> String {
    let mut line = format!("Usage: {program}");
    for segment in path {
        line.push(' ');
        line.push_str(segment);
    }
    if node.handle().is_none() || node.has_children() && node.usage().is_empty() {
        line.push_str(" <command>");
    } else if !node.usage().is_empty() {
        line.push(' ');
        line.push_str(node.usage());
    }
    line
}

/// Full help text for the root: usage plus the visible children grouped
/// under their headings.
pub fn render_root(program: &str, short: &str, tree: &CommandTree) -> String {
    let mut out = String::new();
    if !short.is_empty() {
        out.push_str(short);
        out.push_str("\n\n");
    }
    out.push_str(&format!("Usage: {program} <command> [args]\n"));
    out.push_str(&render_children(tree.root()));
    out.push_str(&format!(
        "\nUse \"{program} help <command>\" for more information about a command.\n"
    ));
    out
}

/// Help text for a single node: usage, description, aliases, argument
/// bounds, and visible subcommands.
pub fn render_node(program: &str, path: &[String], node: &TreeNode) -> String {
    let mut out = String::new();
    out.push_str(&usage_line(program, path, node));
    out.push('\n');
    let desc = if node.long().is_empty() {
        node.short()
    } else {
        node.long()
    };
    if !desc.is_empty() {
        out.push_str(&format!("\n{}\n", desc.trim_end()));
    }
    if !node.aliases().is_empty() {
        out.push_str(&format!("\nAliases: {}\n", node.aliases().join(", ")));
    }
    match node.arg_policy() {
        ArgPolicy::Arbitrary => {}
        ArgPolicy::AtLeast(min) => {
            out.push_str(&format!("\nMinimum # of arguments: {min}\n"));
        }
        ArgPolicy::Range(min, max) => {
            out.push_str(&format!(
                "\nMinimum # of arguments: {min}\nMaximum # of arguments: {max}\n"
            ));
        }
    }
    if node.has_children() {
        out.push_str(&render_children(node));
    }
    out
}

fn render_children(node: &TreeNode) -> String {
    let mut visible: Vec<&TreeNode> = node.children().filter(|c| !c.is_hidden()).collect();
    visible.sort_by(|a, b| a.name().cmp(b.name()));
    if visible.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    for group in GROUP_ORDER {
        let members: Vec<&&TreeNode> = visible
            .iter()
            .filter(|c| c.group() == Some(group))
            .collect();
        if members.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{}\n", group.label()));
        for child in members {
            out.push_str(&format!("  {:<18} {}\n", child.name(), child.short()));
        }
    }
    let ungrouped: Vec<&&TreeNode> = visible.iter().filter(|c| c.group().is_none()).collect();
    if !ungrouped.is_empty() {
        out.push_str("\nAdditional commands:\n");
        for child in ungrouped {
            out.push_str(&format!("  {:<18} {}\n", child.name(), child.short()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandInfo, Context};
    use anyhow::Result;
    use std::sync::Arc;

    struct Noop(CommandInfo);

    impl Command for Noop {
        fn info(&self) -> CommandInfo {
            self.0.clone()
        }

        fn run(&self, _ctx: &mut Context) -> Result<()> {
            Ok(())
        }
    }

    fn sample_tree() -> CommandTree {
        let mut tree = CommandTree::new("cirrus");
        tree.register_topic("target", "Manage named API targets.");
        let add: Arc<dyn Command> = Arc::new(Noop(
            CommandInfo::new("target-add", "Add a target.\n\nDetails.").usage("<label> <url>"),
        ));
        tree.insert_root(add.clone());
        tree.insert_path(add);
        let login: Arc<dyn Command> = Arc::new(Noop(
            CommandInfo::new("login", "Authenticate against the current target.")
                .group(Group::Auth)
                .only_append_on_root(),
        ));
        tree.insert_root(login);
        tree
    }

    #[test]
    fn root_help_groups_visible_children() {
        let tree = sample_tree();
        let text = render_root("cirrus", "A Cirrus client.", &tree);
        assert!(text.contains("Auth commands:"));
        assert!(text.contains("login"));
        assert!(text.contains("Manage resources:"));
        assert!(text.contains("target"));
        // Flat entries stay hidden.
        assert!(!text.contains("target-add"));
    }

    #[test]
    fn node_help_includes_usage_and_bounds() {
        let tree = sample_tree();
        let node = tree
            .root()
            .child("target")
            .and_then(|n| n.child("add"))
            .unwrap();
        let path = vec!["target".to_string(), "add".to_string()];
        let text = render_node("cirrus", &path, node);
        assert!(text.starts_with("Usage: cirrus target add <label> <url>"));
        assert!(text.contains("Details."));
    }

    #[test]
    fn group_node_help_lists_subcommands() {
        let tree = sample_tree();
        let node = tree.root().child("target").unwrap();
        let text = render_node("cirrus", &["target".to_string()], node);
        assert!(text.contains("Usage: cirrus target <command>"));
        assert!(text.contains("add"));
    }
}
