use anyhow::Context as _;
use bpmn_core::ModelerConfig;
use bpmn_domain::{Diagram, Modeler};
use std::path::Path;

/// A modeler loaded from the command-line arguments.
pub struct CliContext {
    pub modeler: Modeler,
}

impl CliContext {
    /// Load `diagram` if it exists, or start a new single-process diagram.
    pub fn load(diagram: Option<&str>, config: Option<&str>) -> anyhow::Result<Self> {
        let config = match config {
            Some(path) => ModelerConfig::from_file(Path::new(path))
                .with_context(|| format!("Failed to load config {}", path))?,
            None => ModelerConfig::load(),
        };

        let diagram = match diagram {
            Some(path) if Path::new(path).exists() => load_diagram(path)?,
            Some(path) => {
                tracing::info!("Diagram {} does not exist yet, starting empty", path);
                Diagram::new()
            }
            None => Diagram::new(),
        };

        Ok(Self {
            modeler: Modeler::new(diagram, config),
        })
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = self.modeler.diagram().to_json()?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
        tracing::info!("Saved diagram to {}", path);
        Ok(())
    }
}

pub fn load_diagram(path: &str) -> anyhow::Result<Diagram> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path))?;
    Ok(Diagram::from_json(&json)?)
}
