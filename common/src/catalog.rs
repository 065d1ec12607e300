//! The compiled-in template catalog.
//!
//! Every portfolio starts from one of these entries. The HTML documents live
//! under the backend's templates directory and are addressed by
//! `Template::template_path`.

use crate::model::template::{Department, Layout, Template, TemplateStyle};

/// Category filter labels, `All` first.
pub const CATEGORIES: [&str; 4] = ["All", "IT", "CSE", "MECH"];

/// Returns every catalog template, ordered by id.
pub fn templates() -> Vec<Template> {
    vec![
        Template {
            id: 1,
            name: "Hudson".to_string(),
            department: Department::It,
            category: "IT Professional".to_string(),
            rating: 4.9,
            uses: 120,
            description: "Clean and modern design for IT professionals. Features a dark mode \
                          aesthetic and clean typography."
                .to_string(),
            template_path: "/templates/Hudson/index.html".to_string(),
            preview_image: "/templates/Hudson/images/intro-bg.jpg".to_string(),
            style: style("#3B82F6", "#06B6D4", "Inter", Layout::Modern),
        },
        Template {
            id: 2,
            name: "iPortfolio".to_string(),
            department: Department::Cse,
            category: "Computer Science".to_string(),
            rating: 4.8,
            uses: 340,
            description: "Minimalist and academic design suitable for Computer Science engineers \
                          and researchers."
                .to_string(),
            template_path: "/templates/iPortfolio/index.html".to_string(),
            preview_image: "/templates/iPortfolio/assets/img/hero-bg.jpg".to_string(),
            style: style("#4F46E5", "#7C3AED", "Poppins", Layout::Minimal),
        },
        Template {
            id: 3,
            name: "Mark".to_string(),
            department: Department::Mech,
            category: "Mechanical Engineering".to_string(),
            rating: 4.7,
            uses: 210,
            description: "Robust and structured layout designed for Mechanical Engineers and \
                          industry portfolios."
                .to_string(),
            template_path: "/templates/mark/index.html".to_string(),
            preview_image: "/templates/Hudson/images/intro-bg.jpg".to_string(),
            style: style("#F59E0B", "#D97706", "Roboto", Layout::Classic),
        },
    ]
}

/// Looks up a catalog template by id.
pub fn find_template(id: u32) -> Option<Template> {
    templates().into_iter().find(|t| t.id == id)
}

/// Templates matching a category label from `CATEGORIES`.
pub fn templates_in(category: &str) -> Vec<Template> {
    templates()
        .into_iter()
        .filter(|t| category == "All" || department_label(t.department) == category)
        .collect()
}

fn department_label(department: Department) -> &'static str {
    match department {
        Department::It => "IT",
        Department::Cse => "CSE",
        Department::Mech => "MECH",
    }
}

fn style(primary: &str, secondary: &str, font: &str, layout: Layout) -> TemplateStyle {
    TemplateStyle {
        primary_color: primary.to_string(),
        secondary_color: secondary.to_string(),
        font_family: font.to_string(),
        layout,
    }
}
