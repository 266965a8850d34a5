// View Renderer - Tera template environment, loaded once at startup
use tera::{Context, Tera};

use crate::errors::ApiResult;

pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new(templates_glob: &str) -> anyhow::Result<Self> {
        Ok(Self {
            tera: Tera::new(templates_glob)?,
        })
    }

    pub fn render(&self, template: &str, context: &Context) -> ApiResult<String> {
        Ok(self.tera.render(template, context)?)
    }
}
