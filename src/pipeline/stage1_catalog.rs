use anyhow::{Result, bail};
use tracing::info;

use crate::catalog;
use crate::config::EngineConfig;
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage1Catalog;

impl Stage1Catalog {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Catalog {
    fn name(&self) -> &'static str {
        "stage1_catalog"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let mut config = match &ctx.config_path {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default_v1(),
        };
        if let Some(weeks) = ctx.overrides.weeks {
            config.horizon_weeks = weeks;
        }
        config.validate()?;
        ctx.config = config;

        let catalog = match &ctx.catalog_path {
            Some(path) => catalog::load_user(path, ctx.topics_path.as_deref())?,
            None => {
                if ctx.topics_path.is_some() {
                    bail!("--topics requires --catalog");
                }
                catalog::load_builtin()?
            }
        };
        if catalog.is_empty() {
            bail!("catalog has no indicators");
        }
        info!(
            version = %catalog.version,
            indicators = catalog.len(),
            genres = catalog.topics.genres.len(),
            "catalog_ready"
        );
        ctx.catalog = Some(catalog);
        Ok(())
    }
}
