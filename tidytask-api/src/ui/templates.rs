/// Page templates
///
/// Templates live in `tidytask-api/templates/` and are compiled into the
/// binary, so the server has no runtime file dependencies. Names end in
/// `.html`, which turns on Tera's HTML autoescaping.

use tera::{Context, Tera};

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("register.html", include_str!("../../templates/register.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
    ("edit_task.html", include_str!("../../templates/edit_task.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

/// Builds the template engine from the embedded templates
///
/// # Errors
///
/// Returns the Tera parse error of the first invalid template.
pub fn load() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES)?;
    Ok(tera)
}

/// Renders `name`, logging and flattening Tera's error chain on failure
pub fn render(tera: &Tera, name: &str, context: &Context) -> Result<String, String> {
    tera.render(name, context).map_err(|e| {
        let mut message = format!("Failed to render template {name}: {e}");
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            message.push_str(&format!(": {cause}"));
            source = cause.source();
        }
        tracing::error!(template = name, error = %message, "Template render failed");
        message
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_parse() {
        let tera = load().unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        for (name, _) in TEMPLATES {
            assert!(names.contains(&name), "missing template {name}");
        }
    }

    #[test]
    fn test_autoescape() {
        let tera = load().unwrap();
        let mut context = Context::new();
        context.insert("username", "");
        context.insert("flash", &Option::<String>::None);
        context.insert("status", &404);
        context.insert("message", "<script>alert(1)</script>");

        let html = render(&tera, "error.html", &context).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
