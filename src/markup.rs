//! Page shell rendering with Maud.
//!
//! Site tooling can render a page that satisfies the DOM contract the
//! behaviors expect: navbar with theme and menu toggles, scroll-to-top
//! control, the embedded config, and the module loader for the wasm bundle.
//!
//! The head carries a small inline script that applies the stored theme before
//! first paint. The wasm module loads asynchronously, so without it a dark-mode
//! visitor would see a light flash on every page load.

use crate::config::{self, ConfigError, InteractConfig, ThemeConfig};
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Fixed parts of the page around the caller's content.
#[derive(Debug, Clone)]
pub struct PageShell<'a> {
    pub title: &'a str,
    pub brand: &'a str,
    /// `(section id, label)` pairs for the navbar.
    pub sections: &'a [(&'a str, &'a str)],
    /// URL of the wasm-bindgen JS glue (`--target web`).
    pub module_path: &'a str,
}

/// Element id of the embedded JSON config.
pub const CONFIG_SCRIPT_ID: &str = "portfolio-config";

/// JSON safe to place inside a `<script>` element.
fn script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

/// Inline script applying the persisted theme before first paint.
pub fn theme_bootstrap(theme: &ThemeConfig) -> Result<String, ConfigError> {
    let key = script_json(&serde_json::to_string(&theme.storage_key)?);
    let attribute = script_json(&serde_json::to_string(&theme.attribute)?);
    Ok(format!(
        "(function(){{var t=\"light\";try{{if(localStorage.getItem({key})===\"dark\")t=\"dark\";}}catch(e){{}}document.documentElement.setAttribute({attribute},t);}})();"
    ))
}

/// Render a complete page around `content`.
pub fn render_page(
    config: &InteractConfig,
    shell: &PageShell<'_>,
    content: Markup,
) -> Result<Markup, ConfigError> {
    let bootstrap = theme_bootstrap(&config.theme)?;
    let css = config::generate_theme_css(&config.theme, &config.colors);
    let config_json = script_json(&config::to_json_string(config)?);
    let loader = format!(
        "import init from {};\ninit();",
        script_json(&serde_json::to_string(shell.module_path)?)
    );

    Ok(html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (shell.title) }
                script { (PreEscaped(bootstrap)) }
                style { (PreEscaped(css)) }
                script type="application/json" id=(CONFIG_SCRIPT_ID) { (PreEscaped(config_json)) }
            }
            body {
                (navbar(shell))
                main { (content) }
                button.scroll-to-top type="button" aria-label="Scroll to top" { "↑" }
                script type="module" { (PreEscaped(loader)) }
            }
        }
    })
}

fn navbar(shell: &PageShell<'_>) -> Markup {
    html! {
        nav.navbar {
            div.nav-container {
                a.nav-brand href="#home" { (shell.brand) }
                ul.nav-menu {
                    @for (id, label) in shell.sections {
                        li { a.nav-link href={ "#" (id) } { (label) } }
                    }
                }
                button.theme-toggle type="button" aria-label="Toggle theme" {
                    span.theme-icon {}
                }
                button.mobile-toggle type="button" aria-label="Toggle menu" {
                    span {}
                    span {}
                    span {}
                }
            }
        }
    }
}

/// Sample sections touching every part of the DOM contract.
pub fn demo_content() -> Markup {
    let stats = [(120, "Projects"), (45, "Clients"), (8, "Years")];
    let projects = [
        ("web", "Storefront", "storefront.avif"),
        ("design", "Type Specimen", "specimen.avif"),
        ("web", "Dashboard", "dashboard.avif"),
        ("mobile", "Field Notes", "notes.avif"),
    ];
    html! {
        section #home .hero {
            div.parallax data-speed="0.3" {}
            h1.typing-effect { "Hi, I build things for the web." }
            a.button href="#projects" { "See my work" }
        }
        section #about {
            h2.animate-on-scroll { "About" }
            p.animate-on-scroll { "Designer and developer working on small, fast sites." }
            div.stats {
                @for (target, label) in stats {
                    div.stat.animate-on-scroll {
                        span.counter data-target=(target) { "0" }
                        span.stat-label { (label) }
                    }
                }
            }
        }
        section #projects {
            h2.animate-on-scroll { "Projects" }
            div.filters {
                button.filter-btn.active type="button" data-filter="all" { "All" }
                button.filter-btn type="button" data-filter="web" { "Web" }
                button.filter-btn type="button" data-filter="design" { "Design" }
                button.filter-btn type="button" data-filter="mobile" { "Mobile" }
            }
            div.projects-grid {
                @for (category, title, image) in projects {
                    article.project-item data-category=(category) {
                        img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=" data-src={ "images/" (image) } alt=(title);
                        h3 { (title) }
                    }
                }
            }
        }
        section #contact {
            h2.animate-on-scroll { "Contact" }
            form #contact-form novalidate {
                input type="text" name="name" placeholder="Name" required;
                span.error-message {}
                input type="email" name="email" placeholder="Email" required;
                span.error-message {}
                textarea name="message" placeholder="Message" minlength="10" required {}
                span.error-message {}
                button type="submit" { "Send" }
            }
        }
    }
}
