use crate::config::types::{Backend, Config};
use crate::launch::errors::LaunchError;
use serde::Serialize;
use tracing::info;

/// Everything the container launcher needs for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchProfile {
    pub backend: Backend,
    pub tool: String,
    pub repo: Option<String>,
    pub mounts_ro: Vec<String>,
    pub mounts_rw: Vec<String>,
    pub env: Vec<String>,
    pub pre_run_hooks: Vec<String>,
    pub post_build_hooks: Vec<String>,
}

impl LaunchProfile {
    /// Combine the top level with the overlays for `repo` and the selected tool.
    ///
    /// Tool selection order:
    /// 1. `tool_override` (e.g. a command-line argument)
    /// 2. The repository overlay's `tool`
    /// 3. The top-level `tool`
    ///
    /// Names without an overlay entry contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::NoToolSelected`] when none of the above names a tool.
    pub fn resolve(
        config: &Config,
        repo: Option<&str>,
        tool_override: Option<&str>,
    ) -> Result<Self, LaunchError> {
        let repo_overlay = repo.and_then(|name| config.repos.get(name));

        let tool = tool_override
            .filter(|tool| !tool.is_empty())
            .or_else(|| repo_overlay.and_then(|overlay| overlay.tool()))
            .or_else(|| config.tool())
            .ok_or_else(|| LaunchError::NoToolSelected {
                repo: repo.map(str::to_string),
            })?
            .to_string();
        let tool_overlay = config.tools.get(&tool);

        let mut profile = Self {
            backend: config.backend,
            tool,
            repo: repo.map(str::to_string),
            mounts_ro: Vec::new(),
            mounts_rw: Vec::new(),
            env: Vec::new(),
            pre_run_hooks: Vec::new(),
            post_build_hooks: Vec::new(),
        };

        profile.extend(
            &config.mounts_ro,
            &config.mounts_rw,
            &config.env,
            &config.pre_run_hooks,
            &config.post_build_hooks,
        );
        if let Some(overlay) = tool_overlay {
            profile.extend(
                &overlay.mounts_ro,
                &overlay.mounts_rw,
                &overlay.env,
                &overlay.pre_run_hooks,
                &overlay.post_build_hooks,
            );
        }
        if let Some(overlay) = repo_overlay {
            profile.extend(
                &overlay.mounts_ro,
                &overlay.mounts_rw,
                &overlay.env,
                &overlay.pre_run_hooks,
                &overlay.post_build_hooks,
            );
        }

        info!(
            event = "core.launch.profile_resolved",
            tool = %profile.tool,
            repo = ?profile.repo,
            backend = %profile.backend,
            mounts = profile.mounts_ro.len() + profile.mounts_rw.len(),
            env = profile.env.len()
        );

        Ok(profile)
    }

    /// Read-only then read-write mount paths, each path once.
    ///
    /// This is the list handed to the mount-wait script generator.
    pub fn mount_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        union_into(&mut paths, &self.mounts_ro);
        union_into(&mut paths, &self.mounts_rw);
        paths
    }

    fn extend(
        &mut self,
        mounts_ro: &[String],
        mounts_rw: &[String],
        env: &[String],
        pre_run_hooks: &[String],
        post_build_hooks: &[String],
    ) {
        union_into(&mut self.mounts_ro, mounts_ro);
        union_into(&mut self.mounts_rw, mounts_rw);
        union_into(&mut self.env, env);
        self.pre_run_hooks.extend_from_slice(pre_run_hooks);
        self.post_build_hooks.extend_from_slice(post_build_hooks);
    }
}

fn union_into(target: &mut Vec<String>, values: &[String]) {
    for value in values {
        if !target.contains(value) {
            target.push(value.clone());
        }
    }
}
