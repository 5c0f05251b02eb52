use std::collections::HashMap;

use plate_alias_core::{
    Alias, AliasConfig, AliasSession, HostSurface, MemorySurface, SurfaceConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::TemplateError;
use crate::preview::preview;
use crate::store::TemplateStore;

/// Everything the template editing page is configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatePage {
    /// File name inside the template store.
    pub template: String,
    /// Palette and suggestion catalog, in display order.
    pub aliases: Vec<Alias>,
    /// Real values the aliases resolve to in the preview.
    pub values: HashMap<String, String>,
    pub alias: AliasConfig,
    pub surface: SurfaceConfig,
}

impl Default for TemplatePage {
    fn default() -> Self {
        Self {
            template: "sample.html".to_string(),
            aliases: vec![
                Alias::new("part", "part", "부서명"),
                Alias::new("position", "position", "직급"),
                Alias::new("name", "name", "이름"),
            ],
            values: HashMap::from([
                ("part".to_string(), "개발팀".to_string()),
                ("position".to_string(), "팀장".to_string()),
                ("name".to_string(), "홍길동".to_string()),
            ]),
            alias: AliasConfig::default(),
            surface: SurfaceConfig::default().with_defaults(),
        }
    }
}

impl TemplatePage {
    pub fn from_json_str(s: &str) -> Result<Self, TemplateError> {
        let mut page: Self = serde_json::from_str(s)?;
        page.alias = page.alias.with_defaults();
        page.surface = page.surface.with_defaults();
        Ok(page)
    }
}

/// A template loaded into an editing surface, with its preview.
#[derive(Debug)]
pub struct TemplateEditor {
    page: TemplatePage,
    surface: MemorySurface,
    data: Option<String>,
    seen_inputs: u64,
}

impl TemplateEditor {
    pub fn open(store: &TemplateStore, page: TemplatePage) -> Result<Self, TemplateError> {
        let markup = store.load(&page.template)?;

        let mut surface = MemorySurface::default().with_config(page.surface.clone());
        surface.set_contents(&markup)?;
        info!(template = %page.template, aliases = page.aliases.len(), "template opened");

        Ok(Self {
            page,
            surface,
            data: Some(markup),
            seen_inputs: 0,
        })
    }

    pub fn page(&self) -> &TemplatePage {
        &self.page
    }

    pub fn surface(&self) -> &MemorySurface {
        &self.surface
    }

    /// Attaches alias editing to the surface for as long as the returned
    /// session lives.
    pub fn session(&mut self) -> AliasSession<'_, MemorySurface> {
        AliasSession::attach(
            &mut self.surface,
            self.page.aliases.clone(),
            self.page.alias.clone(),
        )
    }

    /// Picks up the surface contents if it reported input since the last
    /// call. Returns whether the data changed.
    pub fn sync(&mut self) -> bool {
        let inputs = self.surface.input_count();
        if inputs == self.seen_inputs {
            return false;
        }
        self.seen_inputs = inputs;

        let markup = self.surface.markup();
        let changed = self.data.as_deref() != Some(markup.as_str());
        debug!(changed, "template contents synced");
        self.data = Some(markup);
        changed
    }

    /// Latest contents reported by the surface.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn preview(&self) -> Option<String> {
        preview(self.data.as_deref()?, &self.page.values)
    }

    pub fn submit(&self) -> Option<String> {
        let html = self.preview();
        match &html {
            Some(html) => info!(html = %html, "template submitted"),
            None => info!("nothing to submit"),
        }
        html
    }
}
