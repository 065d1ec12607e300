pub mod history;
pub mod portfolio;
pub mod template;
