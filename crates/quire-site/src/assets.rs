//! Built-in stylesheet and script.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// The site stylesheet.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// The site script: theme toggle, home filters, contents highlight and
    /// the gallery viewer.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* quire default theme */

:root,
[data-theme="dark"] {
  --background: #0f1115;
  --surface: #171a21;
  --foreground: #e6e8ee;
  --muted: #9aa1b2;
  --border: #2a2f3a;
  --accent: #818cf8;
  --accent-strong: #4f46e5;
  --code-bg: #11141a;
  --radius: 0.5rem;
  --content-width: 720px;
  --sidebar-width: 220px;
}

[data-theme="light"] {
  --background: #fbfbfc;
  --surface: #ffffff;
  --foreground: #1c1f26;
  --muted: #5c6373;
  --border: #e2e4ea;
  --accent: #4f46e5;
  --accent-strong: #3730a3;
  --code-bg: #f3f4f7;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
  background: var(--background);
  color: var(--foreground);
  line-height: 1.7;
}

a {
  color: var(--accent);
  text-decoration: none;
}

a:hover {
  text-decoration: underline;
}

/* Header */
.site-header {
  border-bottom: 1px solid var(--border);
  position: sticky;
  top: 0;
  background: var(--background);
  z-index: 10;
}

.header-content {
  max-width: 1100px;
  margin: 0 auto;
  padding: 1rem 1.5rem;
  display: flex;
  align-items: center;
  justify-content: space-between;
  gap: 1rem;
}

.site-logo {
  display: flex;
  align-items: center;
  gap: 0.5rem;
  color: var(--foreground);
  font-weight: 700;
}

.logo-icon {
  display: inline-grid;
  place-items: center;
  width: 2rem;
  height: 2rem;
  border-radius: var(--radius);
  background: var(--accent-strong);
  color: #fff;
}

.site-nav {
  display: flex;
  align-items: center;
  gap: 1rem;
  flex-wrap: wrap;
}

.site-nav a {
  color: var(--muted);
}

.site-nav a.active,
.site-nav a:hover {
  color: var(--foreground);
  text-decoration: none;
}

.theme-toggle {
  background: none;
  border: 0;
  color: var(--muted);
  cursor: pointer;
}

[data-theme="dark"] .sun-icon,
[data-theme="light"] .moon-icon {
  display: none;
}

/* Layout */
.home-main,
.content-main {
  max-width: 1100px;
  margin: 0 auto;
  padding: 2rem 1.5rem;
}

.page-container {
  max-width: 1100px;
  margin: 0 auto;
  padding: 2rem 1.5rem;
  display: grid;
  grid-template-columns: var(--sidebar-width) minmax(0, 1fr);
  gap: 3rem;
}

.page-title,
.intro-title {
  font-size: 2rem;
  margin-bottom: 1.5rem;
}

.intro-text,
.empty-message {
  color: var(--muted);
}

/* Contents sidebar */
.sidebar {
  position: sticky;
  top: 5rem;
  align-self: start;
}

.toc-title {
  font-size: 0.8rem;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--muted);
  margin-bottom: 0.5rem;
}

.toc-list {
  list-style: none;
  font-size: 0.9rem;
}

.toc-list a {
  color: var(--muted);
}

.toc-list a.active {
  color: var(--accent);
}

.toc-3 {
  padding-left: 0.75rem;
}

.toc-4 {
  padding-left: 1.5rem;
}

/* Article */
.post-main {
  max-width: var(--content-width);
}

.post-title {
  font-size: 2.25rem;
  line-height: 1.2;
}

.post-meta,
.post-item-meta,
.content-card-meta {
  color: var(--muted);
  font-size: 0.9rem;
}

.meta-sep {
  margin: 0 0.4rem;
}

.post-content {
  margin-top: 2rem;
}

.post-content > * + * {
  margin-top: 1rem;
}

.post-content h2,
.post-content h3,
.post-content h4 {
  margin-top: 2rem;
  line-height: 1.3;
}

.post-content .hash {
  color: var(--accent);
  opacity: 0.6;
}

.post-content ul,
.post-content ol {
  padding-left: 1.5rem;
}

.post-content blockquote {
  border-left: 3px solid var(--border);
  padding-left: 1rem;
  color: var(--muted);
}

.post-content code {
  font-family: ui-monospace, "SF Mono", Menlo, monospace;
  font-size: 0.9em;
  background: var(--code-bg);
  padding: 0.1rem 0.3rem;
  border-radius: 0.25rem;
}

.post-content pre {
  background: var(--code-bg);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 1rem;
  overflow-x: auto;
}

.post-content pre code {
  background: none;
  padding: 0;
}

.post-content table {
  border-collapse: collapse;
  width: 100%;
}

.post-content th,
.post-content td {
  border: 1px solid var(--border);
  padding: 0.5rem 0.75rem;
  text-align: left;
}

.post-content figure img {
  max-width: 100%;
  border-radius: var(--radius);
}

.post-content hr {
  border: 0;
  border-top: 1px solid var(--border);
  margin: 2rem 0;
}

.post-content mark {
  background: var(--accent);
  color: var(--background);
  padding: 0 0.2rem;
}

/* Callouts */
.callout {
  border: 1px solid var(--border);
  border-left: 4px solid var(--accent);
  border-radius: var(--radius);
  padding: 0.75rem 1rem;
  background: var(--surface);
}

.callout-title {
  font-weight: 600;
}

.callout-tip {
  border-left-color: #22c55e;
}

.callout-warning {
  border-left-color: #f59e0b;
}

.callout-important {
  border-left-color: #ef4444;
}

/* Tags */
.post-tags {
  margin-top: 2rem;
  display: flex;
  gap: 0.5rem;
  flex-wrap: wrap;
}

.tag {
  border: 1px solid var(--border);
  border-radius: 999px;
  padding: 0.1rem 0.75rem;
  font-size: 0.85rem;
}

.tag-group {
  margin-bottom: 2.5rem;
}

.tag-group-count {
  color: var(--muted);
  font-weight: 400;
}

/* Lists and cards */
.posts-list {
  display: grid;
  gap: 1rem;
}

.post-item,
.content-card,
.gallery-item {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  overflow: hidden;
}

.post-link,
.content-card-link {
  display: block;
  padding: 1rem 1.25rem;
  color: inherit;
}

.post-link:hover,
.content-card-link:hover {
  text-decoration: none;
}

.post-item-summary,
.content-card-summary,
.gallery-summary {
  color: var(--muted);
}

.content-filters {
  display: flex;
  gap: 1rem;
  margin-bottom: 1.5rem;
}

.content-grid,
.gallery-grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(260px, 1fr));
  gap: 1.25rem;
}

.content-card-media,
.gallery-thumbnail {
  position: relative;
  aspect-ratio: 16 / 10;
  background: var(--code-bg);
  margin: -1rem -1.25rem 1rem;
  display: grid;
  place-items: center;
  overflow: hidden;
}

.gallery-thumbnail {
  margin: 0;
  cursor: pointer;
}

.content-card-media img,
.gallery-thumbnail img {
  width: 100%;
  height: 100%;
  object-fit: cover;
}

.content-kind-badge {
  font-size: 0.75rem;
  text-transform: uppercase;
  letter-spacing: 0.05em;
  color: var(--accent);
}

.content-card-media .content-kind-badge {
  position: absolute;
  top: 0.5rem;
  left: 0.5rem;
  background: var(--background);
  padding: 0.1rem 0.5rem;
  border-radius: 999px;
}

.gallery-info {
  padding: 0.75rem 1rem;
}

/* Gallery viewer */
.modal {
  position: fixed;
  inset: 0;
  background: rgb(0 0 0 / 0.85);
  display: flex;
  align-items: center;
  justify-content: center;
  z-index: 50;
}

.modal[hidden] {
  display: none;
}

.modal-media {
  max-width: 90vw;
  max-height: 85vh;
}

.modal-close,
.modal-nav {
  position: absolute;
  background: none;
  border: 0;
  color: #fff;
  font-size: 2.5rem;
  cursor: pointer;
}

.modal-close {
  top: 1rem;
  right: 1.5rem;
}

.modal-nav-prev {
  left: 1.5rem;
}

.modal-nav-next {
  right: 1.5rem;
}

.modal-audio-container {
  text-align: center;
  color: #fff;
}

/* Footer */
.site-footer {
  border-top: 1px solid var(--border);
  margin-top: 4rem;
}

.footer-content {
  max-width: 1100px;
  margin: 0 auto;
  padding: 2rem 1.5rem;
  color: var(--muted);
  display: flex;
  justify-content: space-between;
}

@media (max-width: 800px) {
  .page-container {
    grid-template-columns: 1fr;
  }

  .sidebar {
    position: static;
  }
}
"#;

const DEFAULT_JS: &str = r#"// quire site runtime
(function () {
  'use strict';

  const root = document.documentElement;

  // Theme
  root.setAttribute('data-theme', localStorage.getItem('theme') || 'dark');

  const toggle = document.querySelector('.theme-toggle');
  if (toggle) {
    toggle.addEventListener('click', () => {
      const next = root.getAttribute('data-theme') === 'dark' ? 'light' : 'dark';
      root.setAttribute('data-theme', next);
      localStorage.setItem('theme', next);
    });
  }

  // Home page kind filters
  const filters = document.querySelectorAll('.content-filters input[type="checkbox"]');
  const cards = document.querySelectorAll('.content-card');

  function applyFilters() {
    const active = Array.from(filters).filter(f => f.checked).map(f => f.value);
    cards.forEach(card => {
      const kind = card.getAttribute('data-kind');
      const known = Array.from(filters).some(f => f.value === kind);
      const show = active.length === 0 || active.includes(kind) || !known;
      card.style.display = show ? '' : 'none';
    });
  }

  filters.forEach(f => f.addEventListener('change', applyFilters));

  // Contents highlight
  const tocLinks = document.querySelectorAll('.toc a');
  if (tocLinks.length && 'IntersectionObserver' in window) {
    const observer = new IntersectionObserver(entries => {
      entries.forEach(entry => {
        if (!entry.isIntersecting) return;
        const id = entry.target.getAttribute('id');
        tocLinks.forEach(l => l.classList.toggle('active', l.getAttribute('href') === '#' + id));
      });
    }, { rootMargin: '-20% 0px -35% 0px' });

    document.querySelectorAll('.post-content h2[id], .post-content h3[id], .post-content h4[id]')
      .forEach(h => observer.observe(h));
  }

  // Gallery viewer
  const modal = document.getElementById('modal');
  const items = Array.from(document.querySelectorAll('.gallery-item'));
  if (!modal || !items.length) return;

  const image = document.getElementById('modal-image');
  const video = document.getElementById('modal-video');
  const audioBox = document.getElementById('modal-audio-container');
  const audio = document.getElementById('modal-audio');
  const audioTitle = document.getElementById('modal-audio-title');
  let current = 0;

  function show(index) {
    current = (index + items.length) % items.length;
    const item = items[current];
    const kind = item.dataset.kind;
    const url = item.dataset.url || item.dataset.preview;

    image.hidden = kind !== 'image';
    video.hidden = kind !== 'video';
    audioBox.hidden = kind !== 'music';
    video.pause();
    audio.pause();

    if (kind === 'image') image.src = url;
    if (kind === 'video') video.src = url;
    if (kind === 'music') {
      audio.src = url;
      audioTitle.textContent = item.dataset.title;
    }
  }

  function close() {
    modal.hidden = true;
    video.pause();
    audio.pause();
    document.body.style.overflow = '';
  }

  items.forEach((item, index) => {
    item.querySelector('.gallery-thumbnail').addEventListener('click', () => {
      if (!item.dataset.url && !item.dataset.preview) return;
      show(index);
      modal.hidden = false;
      document.body.style.overflow = 'hidden';
    });
  });

  modal.querySelector('.modal-close').addEventListener('click', close);
  modal.querySelector('.modal-nav-prev').addEventListener('click', e => { e.stopPropagation(); show(current - 1); });
  modal.querySelector('.modal-nav-next').addEventListener('click', e => { e.stopPropagation(); show(current + 1); });
  modal.addEventListener('click', e => { if (e.target === modal) close(); });

  document.addEventListener('keydown', e => {
    if (modal.hidden) return;
    if (e.key === 'Escape') close();
    if (e.key === 'ArrowLeft') show(current - 1);
    if (e.key === 'ArrowRight') show(current + 1);
  });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains("[data-theme=\"light\"]"));
        assert!(css.contains(".callout-title"));
        assert!(css.contains(".toc-3"));
    }

    #[test]
    fn generates_js() {
        let js = AssetPipeline::generate_js();
        assert!(js.contains("localStorage"));
        assert!(js.contains("content-filters"));
    }

    #[test]
    fn minifies_default_theme() {
        let css = AssetPipeline::generate_css();

        let minified = AssetPipeline::minify_css(&css).unwrap();

        assert!(minified.len() < css.len());
        assert!(!minified.contains('\n'));
        assert!(minified.contains(".callout"));
    }
}
