use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{FlowError, Result};
use crate::schema;
use crate::tools::manifest::{ToolDescriptor, ToolManifest};
use crate::tools::tool::{Tool, ToolExecution, ToolInvocation};

#[derive(Clone)]
struct ToolEntry {
    tool: Arc<dyn Tool>,
    manifest: Arc<ToolManifest>,
}

/// Tools known to the process. Built once at startup, read-only afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let manifest = tool.manifest();
        if manifest.name != tool.name() {
            return Err(FlowError::ManifestMismatch {
                kind: "tool",
                name: tool.name().to_string(),
            });
        }
        self.tools.insert(
            tool.name().to_string(),
            ToolEntry {
                tool,
                manifest: Arc::new(manifest),
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|entry| Arc::clone(&entry.tool))
    }

    pub fn manifest(&self, name: &str) -> Option<Arc<ToolManifest>> {
        self.tools.get(name).map(|entry| Arc::clone(&entry.manifest))
    }

    pub fn manifests(&self) -> Vec<Arc<ToolManifest>> {
        let mut manifests: Vec<_> = self
            .tools
            .values()
            .map(|entry| Arc::clone(&entry.manifest))
            .collect();
        manifests.sort_by(|a, b| a.name.cmp(&b.name));
        manifests
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Descriptors for the named tools, in the given order.
    pub fn descriptors(&self, names: &[&str]) -> Result<Vec<ToolDescriptor>> {
        names
            .iter()
            .map(|name| {
                self.manifest(name)
                    .map(|manifest| manifest.descriptor())
                    .ok_or_else(|| FlowError::ToolNotRegistered(name.to_string()))
            })
            .collect()
    }

    /// Validates the arguments, runs the handler and validates its output.
    pub async fn execute(&self, invocation: ToolInvocation) -> Result<ToolExecution> {
        let entry = self
            .tools
            .get(&invocation.name)
            .ok_or_else(|| FlowError::ToolNotRegistered(invocation.name.clone()))?;

        schema::validate(&entry.manifest.input, &invocation.input)?;
        debug!(tool = %invocation.name, call_id = %invocation.id, "invoking tool");

        let output = entry.tool.call(invocation.clone()).await?;
        schema::validate(&entry.manifest.output, &output)?;

        Ok(ToolExecution {
            id: invocation.id,
            name: invocation.name,
            input: invocation.input,
            output,
        })
    }
}
