// fidelis-core/src/ports/template_repository.rs

use crate::domain::template::Template;
use crate::error::FidelisError;

pub trait TemplateRepository: Send + Sync {
    fn save(&self, template: &Template) -> Result<(), FidelisError>;

    fn get(&self, id: &str) -> Result<Option<Template>, FidelisError>;

    fn list(&self) -> Result<Vec<Template>, FidelisError>;
}
