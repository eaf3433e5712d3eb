//! Syntax highlighting helpers (syntect-backed)

use ratatui::style::{Color as TuiColor, Modifier, Style};
use std::str::FromStr;
use syntect::{
    easy::HighlightLines,
    highlighting::{
        Color, FontStyle, ScopeSelectors, Style as SynStyle, StyleModifier, Theme, ThemeItem,
        ThemeSettings,
    },
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

/// One styled run of text; the token type the renderer windows over
#[derive(Clone, Debug, PartialEq)]
pub struct StyledSpan {
    pub text: String,
    pub style: Style,
}

impl StyledSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::default().fg(to_tui(PLAIN)),
        }
    }
}

const PLAIN: Color = rgb(0xD8, 0xDE, 0xE9);
const COMMENT: Color = rgb(0x61, 0x6E, 0x88);
const STRING: Color = rgb(0xA3, 0xBE, 0x8C);
const KEYWORD: Color = rgb(0x81, 0xA1, 0xC1);
const NUMBER: Color = rgb(0xB4, 0x8E, 0xAD);
const TYPE: Color = rgb(0x8F, 0xBC, 0xBB);
const FUNCTION: Color = rgb(0x88, 0xC0, 0xD0);
const MACRO: Color = rgb(0x5E, 0x81, 0xAC);
const OPERATOR: Color = rgb(0x81, 0xA1, 0xC1);
const PUNCTUATION: Color = rgb(0xEC, 0xEF, 0xF4);

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color { r, g, b, a: 0xFF }
}

pub struct SyntaxEngine {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl SyntaxEngine {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme: build_theme(),
        }
    }

    /// Highlight `content` line by line. `language` (an extension or syntax
    /// name) overrides detection from `file_name`.
    pub fn highlight(
        &self,
        content: &str,
        file_name: &str,
        language: Option<&str>,
    ) -> Vec<Vec<StyledSpan>> {
        let syntax = self.syntax_for(file_name, language);
        tracing::debug!(syntax = %syntax.name, file_name, "highlighting");
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut out = Vec::new();

        for line in LinesWithEndings::from(content) {
            let mut spans = Vec::new();
            let ranges = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            for (style, text) in ranges {
                let text = text.strip_suffix('\n').unwrap_or(text);
                let text = text.strip_suffix('\r').unwrap_or(text);
                if text.is_empty() {
                    continue;
                }
                spans.push(StyledSpan {
                    text: expand_tabs(text),
                    style: syntect_style_to_tui(style),
                });
            }
            out.push(spans);
        }

        out
    }

    fn syntax_for(&self, file_name: &str, language: Option<&str>) -> &SyntaxReference {
        language
            .and_then(|lang| {
                self.syntax_set
                    .find_syntax_by_extension(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_token(lang))
            })
            .or_else(|| self.syntax_set.find_syntax_for_file(file_name).ok().flatten())
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }
}

impl Default for SyntaxEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `content` into unstyled lines (syntax highlighting off).
pub fn plain_lines(content: &str) -> Vec<Vec<StyledSpan>> {
    content
        .lines()
        .map(|line| {
            if line.is_empty() {
                Vec::new()
            } else {
                vec![StyledSpan::plain(expand_tabs(line))]
            }
        })
        .collect()
}

fn expand_tabs(text: &str) -> String {
    text.replace('\t', "    ")
}

fn build_theme() -> Theme {
    let mut t = Theme {
        settings: ThemeSettings {
            foreground: Some(PLAIN),
            ..ThemeSettings::default()
        },
        ..Theme::default()
    };

    t.scopes = vec![
        theme_item("comment, punctuation.definition.comment", COMMENT),
        theme_item("string", STRING),
        theme_item(
            "keyword, keyword.declaration, keyword.control, keyword.other, storage.modifier",
            KEYWORD,
        ),
        theme_item("constant.numeric, constant.language", NUMBER),
        theme_item(
            "storage.type, entity.name.type, entity.name.namespace, support.type",
            TYPE,
        ),
        theme_item(
            "entity.name.function, entity.name.function.method, support.function",
            FUNCTION,
        ),
        theme_item("entity.name.function.macro, support.function.macro", MACRO),
        theme_item("keyword.operator", OPERATOR),
        theme_item("punctuation", PUNCTUATION),
    ];
    t
}

fn theme_item(selector: &str, color: Color) -> ThemeItem {
    ThemeItem {
        scope: ScopeSelectors::from_str(selector).unwrap_or_default(),
        style: StyleModifier {
            foreground: Some(color),
            background: None,
            font_style: None,
        },
    }
}

fn syntect_style_to_tui(style: SynStyle) -> Style {
    let mut out = Style::default().fg(to_tui(style.foreground));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

fn to_tui(color: Color) -> TuiColor {
    TuiColor::Rgb(color.r, color.g, color.b)
}
