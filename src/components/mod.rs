pub mod renderer;
pub mod templates;

pub use renderer::Renderer;
pub use templates::TemplateSet;
