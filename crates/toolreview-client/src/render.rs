//! Section renderer: maps typed sections to presentational fragments.

use url::Url;

use toolreview_core::domain::{Post, Section, SectionBody};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub label: String,
    pub checked: bool,
}

/// A presentational building block, independent of any markup language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Paragraph(String),
    Heading(String),
    BulletList(Vec<String>),
    Checklist(Vec<ChecklistItem>),
    ToolCard {
        name: String,
        best_for: String,
        pros: Vec<String>,
        cons: Vec<String>,
    },
    /// `src` is set when the section content is an image location,
    /// `caption` when it is descriptive text.
    Figure {
        src: Option<String>,
        caption: Option<String>,
    },
}

/// Render one section. Sections of an unknown type render as nothing.
pub fn render_section(section: &Section) -> Option<Fragment> {
    let fragment = match &section.body {
        SectionBody::Text { content } => Fragment::Paragraph(content.clone()),
        SectionBody::Heading { content } => Fragment::Heading(content.clone()),
        SectionBody::List { items } => Fragment::BulletList(items.clone()),
        SectionBody::Checklist { items } => Fragment::Checklist(
            items
                .iter()
                .map(|label| ChecklistItem {
                    label: label.clone(),
                    checked: false,
                })
                .collect(),
        ),
        SectionBody::Tool(tool) => Fragment::ToolCard {
            name: tool.name.clone(),
            best_for: tool.best_for.clone(),
            pros: tool.pros.clone(),
            cons: tool.cons.clone(),
        },
        SectionBody::Image { content } => image_figure(content),
        SectionBody::Unknown { .. } => return None,
    };
    Some(fragment)
}

/// Render a post body in reading order.
pub fn render_post(post: &Post) -> Vec<Fragment> {
    post.sections.iter().filter_map(render_section).collect()
}

fn image_figure(content: &str) -> Fragment {
    let content = content.trim();
    if is_image_source(content) {
        Fragment::Figure {
            src: Some(content.to_string()),
            caption: None,
        }
    } else {
        Fragment::Figure {
            src: None,
            caption: Some(content.to_string()).filter(|c| !c.is_empty()),
        }
    }
}

fn is_image_source(content: &str) -> bool {
    if content.starts_with('/') && !content.starts_with("//") {
        return true;
    }
    Url::parse(content).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
