//! Program/preview pairing derived from the flat stage list.
//!
//! The backend only reports, per stage, which other stage it previews. This
//! module rebuilds the bus layout the operator sees: program buses with
//! their linked preview bus, and standalone aux buses.

use fazantix_types::StageInfo;

/// Role of a stage after topology resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Standalone output without a preview bus
    Aux,
    /// Live output with a linked preview bus
    Program,
    /// Bus staged to become live on its program stage
    Preview,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Aux => "aux",
            Role::Program => "program",
            Role::Preview => "preview",
        }
    }
}

/// A stage that gets its own section of controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStage {
    pub info: StageInfo,
    pub role: Role,
    /// Linked preview stage, only set for [`Role::Program`]
    pub preview: Option<StageInfo>,
}

impl ResolvedStage {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn preview_name(&self) -> Option<&str> {
        self.preview.as_ref().map(|p| p.name.as_str())
    }
}

/// Resolved topology plus the stages that could not be placed.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    stages: Vec<ResolvedStage>,
    orphans: Vec<StageInfo>,
    displaced: Vec<StageInfo>,
}

impl Topology {
    /// Resolve roles in two passes.
    ///
    /// Pass one collects every unlinked stage as aux. Pass two attaches each
    /// preview stage to the collected stage it names, upgrading that stage to
    /// program. A later preview for the same program replaces the earlier one.
    pub fn build(stages: &[StageInfo]) -> Self {
        let mut topology = Topology {
            stages: stages
                .iter()
                .filter(|stage| !stage.is_preview_link())
                .map(|stage| ResolvedStage {
                    info: stage.clone(),
                    role: Role::Aux,
                    preview: None,
                })
                .collect(),
            ..Default::default()
        };

        for stage in stages.iter().filter(|stage| stage.is_preview_link()) {
            let Some(program) = topology
                .stages
                .iter_mut()
                .find(|program| program.info.name == stage.preview_for)
            else {
                tracing::warn!(
                    "Preview stage '{}' targets unknown stage '{}', no controls rendered for it",
                    stage.name,
                    stage.preview_for
                );
                topology.orphans.push(stage.clone());
                continue;
            };

            program.role = Role::Program;
            if let Some(previous) = program.preview.replace(stage.clone()) {
                tracing::warn!(
                    "Stage '{}' has several preview stages, '{}' replaces '{}'",
                    program.info.name,
                    stage.name,
                    previous.name
                );
                topology.displaced.push(previous);
            }
        }

        tracing::info!(
            "Resolved {} stage sections from {} stages ({} orphaned, {} displaced)",
            topology.stages.len(),
            stages.len(),
            topology.orphans.len(),
            topology.displaced.len()
        );
        topology
    }

    /// Stages that get a control section, in backend order.
    pub fn stages(&self) -> &[ResolvedStage] {
        &self.stages
    }

    pub fn into_stages(self) -> Vec<ResolvedStage> {
        self.stages
    }

    /// Preview stages whose target stage does not exist.
    pub fn orphans(&self) -> &[StageInfo] {
        &self.orphans
    }

    /// Preview stages replaced by a later preview for the same program stage.
    pub fn displaced(&self) -> &[StageInfo] {
        &self.displaced
    }

    /// Resolved role of any stage from the input list.
    pub fn role_of(&self, name: &str) -> Option<Role> {
        for stage in &self.stages {
            if stage.info.name == name {
                return Some(stage.role);
            }
            if stage.preview_name() == Some(name) {
                return Some(Role::Preview);
            }
        }
        self.orphans
            .iter()
            .chain(&self.displaced)
            .any(|stage| stage.name == name)
            .then_some(Role::Preview)
    }
}

/// Resolve the flat stage list into the sections to render.
pub fn build_topology(stages: &[StageInfo]) -> Vec<ResolvedStage> {
    Topology::build(stages).into_stages()
}
