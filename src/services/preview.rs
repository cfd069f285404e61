//! 预览渲染服务
//!
//! 将生成的 HTML 中的相对资源引用重写为后端预览路由，
//! 并为沙箱化展示准备文档。生成内容不可信：宿主必须把
//! 文档放入仅开放 [`SANDBOX_TOKENS`] 所列能力的沙箱帧中。

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::models::{FileKind, FileNode};

/// 沙箱能力白名单：仅允许脚本、同源资源、表单与模态框
pub const SANDBOX_TOKENS: &str = "allow-scripts allow-same-origin allow-forms allow-modals";

/// 深色主题覆盖样式（注入到 </head> 之前）
const DARK_STYLE: &str =
    "<style>html, body { background-color: #0f1115 !important; color: #e6e6e6 !important; }</style>";

/// href / src 属性匹配
static ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\b(href|src)(\s*=\s*)(["'])([^"']*)(["'])"#).unwrap());

/// URI scheme 前缀（如 http:, mailto:, data:）
static SCHEME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*:").unwrap());

static HEAD_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</head>").unwrap());

/// 预览主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewTheme {
    Light,
    Dark,
}

/// 已就绪的预览文档
#[derive(Debug, Clone)]
pub struct PreviewDocument {
    /// 被选中的 HTML 文件路径
    pub path: String,
    /// 重写后的 HTML
    pub html: String,
    /// 沙箱能力令牌（宿主原样填入 sandbox 属性）
    pub sandbox: &'static str,
}

/// 预览渲染器
pub struct PreviewRenderer {
    preview_base: String,
}

impl PreviewRenderer {
    /// `preview_base` 必须是绝对地址（如 http://127.0.0.1:8000/api/preview）。
    /// 绝对前缀带 scheme，使重复重写天然幂等。
    pub fn new(preview_base: impl Into<String>) -> Self {
        let preview_base = preview_base.into().trim_end_matches('/').to_string();
        Self { preview_base }
    }

    /// 属性值是否无需重写（scheme 开头、协议相对或锚点）
    fn is_absolute(value: &str) -> bool {
        value.is_empty()
            || value.starts_with("//")
            || value.starts_with('#')
            || SCHEME_RE.is_match(value)
    }

    /// 重写资源引用并按主题注入覆盖样式
    pub fn rewrite(&self, html: &str, theme: PreviewTheme) -> String {
        let rewritten = ATTR_RE.replace_all(html, |caps: &Captures| {
            let value = &caps[4];
            if Self::is_absolute(value) {
                return caps[0].to_string();
            }
            let trimmed = value.strip_prefix("./").unwrap_or(value);
            let trimmed = trimmed.trim_start_matches('/');
            format!(
                "{}{}{}{}/{}{}",
                &caps[1], &caps[2], &caps[3], self.preview_base, trimmed, &caps[5]
            )
        });
        match theme {
            PreviewTheme::Light => rewritten.into_owned(),
            PreviewTheme::Dark => inject_dark_style(&rewritten),
        }
    }

    /// 文档选择策略：优先名为 index.html 的文件，
    /// 否则按路径顺序（深度优先）取第一个 HTML 文件
    pub fn select_document(&self, nodes: &[FileNode]) -> Option<String> {
        let mut paths = Vec::new();
        collect_html_paths(nodes, &mut paths);
        paths
            .iter()
            .find(|p| file_name(p) == "index.html")
            .or_else(|| paths.first())
            .cloned()
    }
}

/// 在 </head> 前插入深色样式；无 head 时置于文档最前
fn inject_dark_style(html: &str) -> String {
    match HEAD_CLOSE_RE.find(html) {
        Some(m) => {
            let mut out = String::with_capacity(html.len() + DARK_STYLE.len());
            out.push_str(&html[..m.start()]);
            out.push_str(DARK_STYLE);
            out.push_str(&html[m.start()..]);
            out
        }
        None => format!("{}{}", DARK_STYLE, html),
    }
}

fn collect_html_paths(nodes: &[FileNode], out: &mut Vec<String>) {
    for node in nodes {
        match node.kind {
            FileKind::File => {
                if node.path.to_ascii_lowercase().ends_with(".html") {
                    out.push(node.path.clone());
                }
            }
            FileKind::Directory => collect_html_paths(&node.children, out),
        }
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BASE: &str = "http://127.0.0.1:8000/api/preview";

    fn renderer() -> PreviewRenderer {
        PreviewRenderer::new(BASE)
    }

    #[test]
    fn test_rewrite_relative_src_dark() {
        let out = renderer().rewrite(r#"<img src="./img/a.png">"#, PreviewTheme::Dark);
        assert!(out.contains(&format!(r#"src="{}/img/a.png""#, BASE)));
        assert!(out.starts_with("<style>"));
    }

    #[test]
    fn test_rewrite_light_has_no_style_block() {
        let out = renderer().rewrite(r#"<img src="./img/a.png">"#, PreviewTheme::Light);
        assert_eq!(out, format!(r#"<img src="{}/img/a.png">"#, BASE));
        assert!(!out.contains("<style>"));
    }

    #[test]
    fn test_dark_style_injected_before_head_close() {
        let out = renderer().rewrite(
            "<html><head><title>t</title></head><body></body></html>",
            PreviewTheme::Dark,
        );
        let style_pos = out.find("<style>").unwrap();
        let head_pos = out.find("</head>").unwrap();
        assert!(style_pos < head_pos);
    }

    #[test]
    fn test_absolute_urls_untouched() {
        let html = concat!(
            r#"<a href="https://example.com/a">x</a>"#,
            r#"<img src="//cdn.example.com/b.png">"#,
            r##"<a href="#section">y</a>"##,
            r#"<a href="mailto:a@b.c">z</a>"#,
            r#"<img src="data:image/png;base64,AAAA">"#,
        );
        assert_eq!(renderer().rewrite(html, PreviewTheme::Light), html);
    }

    #[test]
    fn test_root_relative_path_rewritten() {
        let out = renderer().rewrite(r#"<link href="/css/style.css">"#, PreviewTheme::Light);
        assert_eq!(out, format!(r#"<link href="{}/css/style.css">"#, BASE));
    }

    #[test]
    fn test_rewrite_idempotent() {
        let html = r#"<img src="./img/a.png"><a href="https://example.com">x</a>"#;
        let once = renderer().rewrite(html, PreviewTheme::Light);
        let twice = renderer().rewrite(&once, PreviewTheme::Light);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_select_prefers_index_html() {
        let nodes = vec![
            crate::models::FileNode::file("about.html"),
            crate::models::FileNode::directory(
                "pages",
                vec![crate::models::FileNode::file("pages/index.html")],
            ),
        ];
        assert_eq!(
            renderer().select_document(&nodes).as_deref(),
            Some("pages/index.html")
        );
    }

    #[test]
    fn test_select_falls_back_to_first_html() {
        let nodes = vec![
            crate::models::FileNode::file("style.css"),
            crate::models::FileNode::file("a.html"),
            crate::models::FileNode::file("b.html"),
        ];
        assert_eq!(renderer().select_document(&nodes).as_deref(), Some("a.html"));
        assert!(renderer().select_document(&[]).is_none());
    }

    #[test]
    fn test_sandbox_tokens_fixed() {
        assert_eq!(
            SANDBOX_TOKENS,
            "allow-scripts allow-same-origin allow-forms allow-modals"
        );
    }

    proptest! {
        /// 任意相对路径重写一次后必须达到不动点
        #[test]
        fn prop_rewrite_idempotent(path in "[a-z0-9_./-]{0,24}") {
            let html = format!(r#"<img src="{}">"#, path);
            let r = renderer();
            let once = r.rewrite(&html, PreviewTheme::Light);
            let twice = r.rewrite(&once, PreviewTheme::Light);
            prop_assert_eq!(once, twice);
        }
    }
}
