use std::path::PathBuf;

/// One updatable tool: how to ask for its version and how to update it.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub version_command: Vec<String>,
    pub update_command: Vec<String>,
    /// Directory the commands run in; `None` means the current directory.
    pub working_dir: Option<PathBuf>,
}

impl ToolSpec {
    pub fn new(name: &str, version_command: &[&str], update_command: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            version_command: version_command.iter().map(|s| s.to_string()).collect(),
            update_command: update_command.iter().map(|s| s.to_string()).collect(),
            working_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }
}

/// The fixed set of tools this binary knows how to update, in display order.
pub fn builtin_tools() -> Vec<ToolSpec> {
    let mut tools = vec![
        ToolSpec::new(
            "codex",
            &["codex", "--version"],
            &["npm", "update", "-g", "@openai/codex"],
        ),
        ToolSpec::new(
            "gemini",
            &["gemini", "--version"],
            &["npm", "update", "-g", "@google/gemini-cli"],
        ),
        ToolSpec::new("crush", &["crush", "--version"], &["brew", "upgrade", "crush"]),
    ];

    // The claude CLI lives in a local npm prefix rather than the global one.
    let mut claude = ToolSpec::new("claude", &["claude", "--version"], &["npm", "update"]);
    if let Some(home) = std::env::var_os("HOME") {
        claude = claude.in_dir(PathBuf::from(home).join(".claude").join("local"));
    }
    tools.push(claude);

    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_tools_are_well_formed() {
        let tools = builtin_tools();
        assert!(!tools.is_empty());

        let names: HashSet<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), tools.len(), "tool names must be unique");

        for tool in &tools {
            assert!(!tool.name.is_empty());
            assert!(!tool.version_command.is_empty());
            assert!(!tool.update_command.is_empty());
        }
    }

    #[test]
    fn builtin_order_is_stable() {
        let names: Vec<_> = builtin_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["codex", "gemini", "crush", "claude"]);
    }
}
