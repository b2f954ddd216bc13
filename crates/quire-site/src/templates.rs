//! Page templates.
//!
//! Every page extends one base layout with the site header, theme toggle and
//! footer. Templates have `.html` names so minijinja escapes all values;
//! rendered article HTML is passed through `safe`.

use std::fmt::Write;

use minijinja::value::Value;
use minijinja::{context, AutoEscape, Environment, Output, State};
use serde::Serialize;

use crate::builder::SiteInfo;
use crate::content::{self, ContentItem, TagGroup};
use crate::dates;

/// A media gallery: kind, output directory and heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gallery {
    pub kind: &'static str,
    pub dir: &'static str,
    pub title: &'static str,
}

pub const GALLERIES: [Gallery; 3] = [
    Gallery {
        kind: "image",
        dir: "images",
        title: "Images",
    },
    Gallery {
        kind: "video",
        dir: "videos",
        title: "Videos",
    },
    Gallery {
        kind: "music",
        dir: "music",
        title: "Music",
    },
];

/// The gallery that items of `kind` are listed in.
pub fn gallery_for(kind: &str) -> Option<&'static Gallery> {
    GALLERIES.iter().find(|g| g.kind == kind)
}

/// Where a home page card links to: the post page for articles, the
/// gallery for media, nowhere for anything else.
pub fn item_link(base_url: &str, kind: &str, slug: &str) -> String {
    if kind == crate::content::ARTICLE {
        return format!("{base_url}posts/{slug}/");
    }

    gallery_for(kind)
        .map(|g| format!("{base_url}{}/", g.dir))
        .unwrap_or_else(|| "#".to_string())
}

/// Length of the generated meta description, in characters.
const DESCRIPTION_LEN: usize = 160;

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
    site: SiteInfo,
}

impl TemplateEngine {
    /// Create a template engine for `site`.
    pub fn new(site: SiteInfo) -> Self {
        let mut env = Environment::new();

        for (name, source) in [
            ("base.html", BASE_TEMPLATE),
            ("card.html", CARD_TEMPLATE),
            ("post_item.html", POST_ITEM_TEMPLATE),
            ("article.html", ARTICLE_TEMPLATE),
            ("home.html", HOME_TEMPLATE),
            ("posts.html", POSTS_TEMPLATE),
            ("tags.html", TAGS_TEMPLATE),
            ("gallery.html", GALLERY_TEMPLATE),
        ] {
            env.add_template(name, source)
                .expect("Failed to add built-in template");
        }

        env.set_formatter(html_formatter);

        env.add_filter("long_date", |value: String| dates::long_date(&value));
        env.add_filter("short_date", |value: String| dates::short_date(&value));
        env.add_filter("slugify", |value: String| quire_markdown::slugify(&value));
        env.add_test("image_url", |value: String| content::is_image_url(&value));

        env.add_global("galleries", Value::from_serialize(GALLERIES));

        let base_url = site.base_url.clone();
        env.add_function("item_link", move |kind: String, slug: String| {
            item_link(&base_url, &kind, &slug)
        });

        Self { env, site }
    }

    pub fn site(&self) -> &SiteInfo {
        &self.site
    }

    fn render(&self, template: &str, page: Value) -> Result<String, minijinja::Error> {
        self.env.get_template(template)?.render(context! {
            site => &self.site,
            base_url => &self.site.base_url,
            year => dates::year(),
            ..page
        })
    }

    /// `posts/<slug>/index.html`
    pub fn render_article(&self, item: &ContentItem) -> Result<String, minijinja::Error> {
        self.render(
            "article.html",
            context! {
                section => "posts",
                page_title => &item.title,
                description => meta_description(&item.content_html),
                item => item,
            },
        )
    }

    /// `index.html`: every item, newest first.
    pub fn render_home(&self, items: &[&ContentItem]) -> Result<String, minijinja::Error> {
        self.render(
            "home.html",
            context! {
                section => "home",
                page_title => &self.site.title,
                description => &self.site.description,
                items => items,
            },
        )
    }

    /// `posts/index.html`
    pub fn render_posts(&self, articles: &[&ContentItem]) -> Result<String, minijinja::Error> {
        self.render(
            "posts.html",
            context! {
                section => "posts",
                page_title => "Posts",
                description => format!("All posts on {}", self.site.title),
                items => articles,
            },
        )
    }

    /// `tags/index.html`
    pub fn render_tags(&self, groups: &[TagGroup<'_>]) -> Result<String, minijinja::Error> {
        self.render(
            "tags.html",
            context! {
                section => "tags",
                page_title => "Tags",
                description => format!("Posts on {} by tag", self.site.title),
                groups => groups,
            },
        )
    }

    /// `<gallery dir>/index.html`
    pub fn render_gallery(
        &self,
        gallery: &Gallery,
        items: &[&ContentItem],
    ) -> Result<String, minijinja::Error> {
        self.render(
            "gallery.html",
            context! {
                section => gallery.dir,
                page_title => gallery.title,
                description => format!("{} on {}", gallery.title, self.site.title),
                gallery => gallery,
                items => items,
            },
        )
    }
}

/// Escape output the same way the Markdown renderer does, leaving `/` alone.
fn html_formatter(
    out: &mut Output<'_>,
    state: &State<'_, '_>,
    value: &Value,
) -> Result<(), minijinja::Error> {
    if value.is_safe() || !matches!(state.auto_escape(), AutoEscape::Html) {
        return minijinja::escape_formatter(out, state, value);
    }

    if value.is_undefined() || value.is_none() {
        return Ok(());
    }

    out.write_str(&quire_markdown::escape_html(&value.to_string()))?;
    Ok(())
}

/// Plain-text summary of rendered HTML for `<meta name="description">`.
pub fn meta_description(html: &str) -> String {
    let text = quire_markdown::unescape_html(&quire_markdown::strip_tags(html));
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.chars().count() <= DESCRIPTION_LEN {
        return text;
    }

    let mut cut: String = text.chars().take(DESCRIPTION_LEN).collect();
    cut.push_str("...");
    cut
}

const BASE_TEMPLATE: &str = r##"<!doctype html>
<html lang="{{ site.language }}" data-theme="dark">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <meta http-equiv="X-Content-Type-Options" content="nosniff" />
  <meta name="referrer" content="strict-origin-when-cross-origin" />
  <title>{% if page_title != site.title %}{{ page_title }} - {% endif %}{{ site.title }}</title>
  <meta name="description" content="{{ description }}" />
  {% if site.author %}<meta name="author" content="{{ site.author }}" />{% endif %}
  <meta property="og:title" content="{{ page_title }}" />
  <meta property="og:description" content="{{ description }}" />
  <meta property="og:type" content="{% block og_type %}website{% endblock %}" />
  <link rel="alternate" type="application/rss+xml" title="{{ site.title }}" href="{{ base_url }}feed.xml" />
  <link rel="stylesheet" href="{{ base_url }}styles.css" />
</head>
<body>
  <header class="site-header">
    <div class="header-content">
      <a href="{{ base_url }}" class="site-logo">
        <span class="logo-icon">{{ site.title[:1] | upper }}</span>
        <span class="logo-text">{{ site.title }}</span>
      </a>
      <nav class="site-nav">
        <a href="{{ base_url }}posts/"{% if section == "posts" %} class="active"{% endif %}>Posts</a>
        <a href="{{ base_url }}tags/"{% if section == "tags" %} class="active"{% endif %}>Tags</a>
        {% for g in galleries %}
        <a href="{{ base_url }}{{ g.dir }}/"{% if section == g.dir %} class="active"{% endif %}>{{ g.title }}</a>
        {% endfor %}
        <button class="theme-toggle" aria-label="Toggle theme">
          <svg class="sun-icon" width="20" height="20" viewBox="0 0 20 20" fill="none">
            <circle cx="10" cy="10" r="4" stroke="currentColor" stroke-width="2"/>
          </svg>
          <svg class="moon-icon" width="20" height="20" viewBox="0 0 20 20" fill="none">
            <path d="M17 10.5C16 14.5 12 18 8 18C4 18 2 14.5 2 10.5C2 6.5 4 3 8 3C8.5 3 9 3.1 9.5 3.2C7.5 4.5 6.5 6.5 6.5 9C6.5 12.5 9 15 12.5 15C14.5 15 16.5 14 17.8 12C17.3 11.5 17 11 17 10.5Z" stroke="currentColor" stroke-width="2"/>
          </svg>
        </button>
      </nav>
    </div>
  </header>

  {% block main %}{% endblock %}

  <footer class="site-footer">
    <div class="footer-content">
      <p>&copy; {{ year }} {{ site.author or site.title }}</p>
      <p class="footer-links"><a href="{{ base_url }}feed.xml">RSS</a></p>
    </div>
  </footer>
  <script src="{{ base_url }}app.js"></script>
</body>
</html>"##;

const CARD_TEMPLATE: &str = r##"<article class="content-card" data-kind="{{ item.kind }}">
  <a href="{{ item_link(item.kind, item.slug) }}" class="content-card-link">
    {% if item.thumbnailUrl is image_url %}
    <div class="content-card-media{% if item.kind == "video" %} has-thumbnail{% endif %}">
      <img src="{{ item.thumbnailUrl }}" alt="{{ item.title }}" loading="lazy" />
      <span class="content-kind-badge">{{ item.kind }}</span>
    </div>
    {% elif item.kind == "video" or item.kind == "music" %}
    <div class="content-card-media {{ item.kind }}-placeholder">
      <span class="content-kind-badge">{{ item.kind }}</span>
    </div>
    {% endif %}
    <div class="content-card-body">
      {% if item.kind not in ["image", "video", "music"] %}<span class="content-kind-badge">{{ item.kind }}</span>{% endif %}
      <h3 class="content-card-title">{{ item.title }}</h3>
      {% if item.summary %}<p class="content-card-summary">{{ item.summary }}</p>{% endif %}
      {% if item.kind == "article" %}
      <div class="content-card-meta">
        <time>{{ item.updatedTime | short_date }}</time>
        <span class="meta-sep">&bull;</span>
        <span>{{ item.readingTime }} min read</span>
      </div>
      {% endif %}
    </div>
  </a>
</article>"##;

const POST_ITEM_TEMPLATE: &str = r##"<article class="post-item">
  <a href="{{ base_url }}posts/{{ item.slug }}/" class="post-link">
    <h3 class="post-item-title">{{ item.title }}</h3>
    <p class="post-item-summary">{{ item.summary }}</p>
    <div class="post-item-meta">
      <time>{{ item.date | long_date }}</time>
      <span class="meta-sep">&bull;</span>
      <span>{{ item.readingTime }} min read</span>
    </div>
  </a>
</article>"##;

const ARTICLE_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block og_type %}article{% endblock %}
{% block main %}
<div class="page-container">
  {% if item.headings %}
  <aside class="sidebar">
    <nav class="toc">
      <h4 class="toc-title">Contents</h4>
      <ul class="toc-list">
      {% for heading in item.headings %}
        <li class="toc-{{ heading.level }}"><a href="#{{ heading.id }}">{{ heading.text }}</a></li>
      {% endfor %}
      </ul>
    </nav>
  </aside>
  {% endif %}
  <main class="post-main">
    <article class="post">
      <header class="post-header">
        <h1 class="post-title">{{ item.title }}</h1>
        <div class="post-meta">
          {% if site.author %}<span class="post-author">{{ site.author }}</span>
          <span class="meta-sep">&bull;</span>{% endif %}
          <time class="post-date">{{ item.date | long_date }}</time>
          <span class="meta-sep">&bull;</span>
          <span class="reading-time">{{ item.readingTime }} min read</span>
        </div>
      </header>
      <div class="post-content">
        {{ item.contentHtml | safe }}
      </div>
      {% if item.tags %}
      <div class="post-tags">
        {% for tag in item.tags %}<a href="{{ base_url }}tags/#{{ tag | slugify }}" class="tag">{{ tag }}</a>{% endfor %}
      </div>
      {% endif %}
    </article>
  </main>
</div>
{% endblock %}"##;

const HOME_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block main %}
<main class="home-main">
  <div class="home-intro">
    <h1 class="intro-title">{{ site.title }}</h1>
    {% if site.description %}<p class="intro-text">{{ site.description }}</p>{% endif %}
  </div>
  <div class="content-filters">
    <label class="filter-label"><input type="checkbox" value="article" checked> Articles</label>
    {% for g in galleries %}
    <label class="filter-label"><input type="checkbox" value="{{ g.kind }}" checked> {{ g.title }}</label>
    {% endfor %}
  </div>
  <div class="content-grid" id="contentGrid">
    {% for item in items %}{% include "card.html" %}{% endfor %}
  </div>
</main>
{% endblock %}"##;

const POSTS_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block main %}
<main class="content-main">
  <h1 class="page-title">Posts</h1>
  <div class="posts-list">
    {% for item in items %}{% include "post_item.html" %}{% endfor %}
  </div>
  {% if not items %}<p class="empty-message">No posts yet.</p>{% endif %}
</main>
{% endblock %}"##;

const TAGS_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block main %}
<main class="content-main">
  <h1 class="page-title">Tags</h1>
  {% if not groups %}<p class="empty-message">No tags yet. Add tags to your posts!</p>{% endif %}
  {% for group in groups %}
  <section class="tag-group" id="{{ group.id }}">
    <h2 class="tag-group-title"><span class="hash">#</span>{{ group.name }} <span class="tag-group-count">({{ group.count }})</span></h2>
    <div class="posts-list">
      {% for item in group.items %}{% include "post_item.html" %}{% endfor %}
    </div>
  </section>
  {% endfor %}
</main>
{% endblock %}"##;

const GALLERY_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block main %}
<main class="content-main">
  <h1 class="page-title">{{ gallery.title }}</h1>
  <div class="gallery-grid">
    {% for item in items %}
    <article class="gallery-item" data-url="{{ item.driveUrl }}" data-preview="{{ item.thumbnailUrl or item.driveUrl }}" data-title="{{ item.title }}" data-kind="{{ gallery.kind }}">
      <div class="gallery-thumbnail{% if gallery.kind == "video" and item.thumbnailUrl is image_url %} has-thumbnail{% endif %}">
        {% if item.thumbnailUrl is image_url %}
        <img src="{{ item.thumbnailUrl }}" alt="{{ item.title }}" loading="lazy" />
        {% elif gallery.kind == "image" and item.driveUrl %}
        <img src="{{ item.driveUrl }}" alt="{{ item.title }}" loading="lazy" />
        {% else %}
        <div class="gallery-placeholder {{ gallery.kind }}-placeholder">
          <span class="gallery-icon-label">{{ gallery.kind | capitalize }}</span>
        </div>
        {% endif %}
      </div>
      <div class="gallery-info">
        <h3 class="gallery-title">{{ item.title }}</h3>
        {% if item.summary %}<p class="gallery-summary">{{ item.summary }}</p>{% endif %}
      </div>
    </article>
    {% endfor %}
  </div>
  {% if not items %}<p class="empty-message">Nothing here yet. Add some to your content folder!</p>{% endif %}
</main>
<div id="modal" class="modal" hidden>
  <button class="modal-close" aria-label="Close">&times;</button>
  <button class="modal-nav modal-nav-prev" aria-label="Previous">&lsaquo;</button>
  <button class="modal-nav modal-nav-next" aria-label="Next">&rsaquo;</button>
  <div class="modal-content">
    <img id="modal-image" class="modal-media" alt="" />
    <video id="modal-video" class="modal-media" controls hidden></video>
    <div id="modal-audio-container" class="modal-audio-container" hidden>
      <h3 id="modal-audio-title" class="audio-title"></h3>
      <audio id="modal-audio" controls></audio>
    </div>
  </div>
</div>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use quire_markdown::{Document, Renderer};

    use super::*;
    use crate::content::Source;

    fn engine() -> TemplateEngine {
        TemplateEngine::new(SiteInfo {
            title: "My Blog".to_string(),
            author: "Ada".to_string(),
            base_url: "/blog/".to_string(),
            ..SiteInfo::default()
        })
    }

    fn item(text: &str) -> ContentItem {
        let source = Source {
            path: "post.md".into(),
            document: Document::parse(text),
        };
        ContentItem::from_source(&source, &Renderer::new().with_wikilink_base("/blog/posts/"))
    }

    #[test]
    fn renders_article_page() {
        let post = item(
            "---\ntitle: Fish & Chips\ndate: 2026-01-01\ntags: [Food Notes]\n---\n## Getting Started\n\nText here.",
        );

        let html = engine().render_article(&post).unwrap();

        assert!(html.contains("<title>Fish &amp; Chips - My Blog</title>"));
        assert!(html.contains(r#"<h1 class="post-title">Fish &amp; Chips</h1>"#));
        assert!(html.contains("1 January 2026"));
        assert!(html.contains("1 min read"));
        assert!(html.contains(r##"<li class="toc-3"><a href="#getting-started">Getting Started</a></li>"##));
        assert!(html.contains(r##"href="/blog/tags/#food-notes""##));
        assert!(html.contains(r#"<span class="hash">##</span> Getting Started</h3>"#));
        assert!(html.contains(r###"<meta name="description" content="## Getting Started Text here." />"###));
        assert!(html.contains(r#"<link rel="stylesheet" href="/blog/styles.css" />"#));
    }

    #[test]
    fn home_cards_link_by_kind() {
        let post = item("---\ntitle: A Post\n---\nbody");
        let pic = item("---\ntitle: A Pic\nkind: image\n---\n");
        let odd = item("---\ntitle: Odd\nkind: podcast\n---\n");

        let html = engine().render_home(&[&post, &pic, &odd]).unwrap();

        assert!(html.contains(r#"href="/blog/posts/a-post/""#));
        assert!(html.contains(r#"href="/blog/images/""#));
        assert!(html.contains(r##"href="#" class="content-card-link""##));
        assert!(html.contains(r#"data-kind="podcast""#));
        assert!(html.contains(r#"<input type="checkbox" value="music" checked>"#));
    }

    #[test]
    fn renders_tag_groups() {
        let items = vec![item("---\ntitle: Tagged\ntags: [Rust Lang]\n---\n")];
        let groups = content::tag_groups(&items);

        let html = engine().render_tags(&groups).unwrap();

        assert!(html.contains(r#"<section class="tag-group" id="rust-lang">"#));
        assert!(html.contains("(1)"));
        assert!(html.contains(r#"href="/blog/posts/tagged/""#));
    }

    #[test]
    fn empty_tags_page_says_so() {
        let html = engine().render_tags(&[]).unwrap();

        assert!(html.contains("No tags yet."));
    }

    #[test]
    fn gallery_uses_thumbnails() {
        let mut clip = item("---\ntitle: Clip\nkind: video\n---\n");
        clip.thumbnail_url = "/blog/media/clip-thumb.jpg".to_string();
        clip.drive_url = "/blog/media/clip.mp4".to_string();

        let html = engine().render_gallery(&GALLERIES[1], &[&clip]).unwrap();

        assert!(html.contains("<title>Videos - My Blog</title>"));
        assert!(html.contains(r#"<img src="/blog/media/clip-thumb.jpg" alt="Clip" loading="lazy" />"#));
        assert!(html.contains(r#"data-url="/blog/media/clip.mp4""#));
        assert!(html.contains(r#"<a href="/blog/videos/" class="active">Videos</a>"#));
    }

    #[test]
    fn links_items_by_kind() {
        assert_eq!(item_link("/", "article", "hi"), "/posts/hi/");
        assert_eq!(item_link("/blog/", "music", "song"), "/blog/music/");
        assert_eq!(item_link("/", "podcast", "ep"), "#");
    }

    #[test]
    fn escapes_values_but_not_slashes() {
        let html = engine()
            .render_home(&[&item("---\ntitle: <Tom's> \"Post\"\n---\n")])
            .unwrap();

        assert!(html.contains("&lt;Tom&#039;s&gt; &quot;Post&quot;"));
        assert!(!html.contains("&#x2f;"));
    }

    #[test]
    fn meta_description_is_truncated_plain_text() {
        assert_eq!(meta_description("<p>Fish &amp; <em>chips</em></p>"), "Fish & chips");

        let long = format!("<p>{}</p>", "word ".repeat(100));
        let description = meta_description(&long);
        assert_eq!(description.chars().count(), 163);
        assert!(description.ends_with("..."));
    }
}
