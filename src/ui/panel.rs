use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, Widget};

use crate::types::PanelCategory;
use crate::ui::common::*;

/// Width of the key column in key/value panels
const KEY_WIDTH: usize = 16;

/// A renderable block built from one snapshot
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: String,
    pub category: PanelCategory,
    pub body: PanelBody,
}

#[derive(Debug, Clone)]
pub enum PanelBody {
    /// Label on the left, styled value on the right
    KeyValue(Vec<KeyValue>),
    /// Headed table with fixed column widths
    Table {
        header: Vec<&'static str>,
        widths: Vec<Constraint>,
        rows: Vec<Vec<Span<'static>>>,
    },
}

#[derive(Debug, Clone)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<Span<'static>>,
}

impl Panel {
    pub fn key_value(title: impl Into<String>, category: PanelCategory) -> Self {
        Self {
            title: title.into(),
            category,
            body: PanelBody::KeyValue(Vec::new()),
        }
    }

    pub fn table(
        title: impl Into<String>,
        category: PanelCategory,
        header: Vec<&'static str>,
        widths: Vec<Constraint>,
    ) -> Self {
        Self {
            title: title.into(),
            category,
            body: PanelBody::Table {
                header,
                widths,
                rows: Vec::new(),
            },
        }
    }

    /// Append a key/value row. No-op on table panels.
    pub fn push_kv(&mut self, key: impl Into<String>, value: Vec<Span<'static>>) {
        if let PanelBody::KeyValue(ref mut rows) = self.body {
            rows.push(KeyValue {
                key: key.into(),
                value,
            });
        }
    }

    /// Append a table row. No-op on key/value panels.
    pub fn push_row(&mut self, cells: Vec<Span<'static>>) {
        if let PanelBody::Table { ref mut rows, .. } = self.body {
            rows.push(cells);
        }
    }

    /// Rows needed to show the whole body plus borders
    pub fn height(&self) -> u16 {
        let body = match &self.body {
            PanelBody::KeyValue(rows) => rows.len(),
            PanelBody::Table { rows, .. } => rows.len() + 1,
        };
        body as u16 + 2
    }

    /// Text of a key/value row's value
    #[cfg(test)]
    pub fn value_text(&self, key: &str) -> Option<String> {
        match &self.body {
            PanelBody::KeyValue(rows) => rows
                .iter()
                .find(|kv| kv.key == key)
                .map(|kv| kv.value.iter().map(|s| s.content.as_ref()).collect()),
            PanelBody::Table { .. } => None,
        }
    }

    /// Text of every table cell, row by row
    #[cfg(test)]
    pub fn table_text(&self) -> Vec<Vec<String>> {
        match &self.body {
            PanelBody::Table { rows, .. } => rows
                .iter()
                .map(|r| r.iter().map(|s| s.content.to_string()).collect())
                .collect(),
            PanelBody::KeyValue(_) => Vec::new(),
        }
    }
}

impl Widget for &Panel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = panel_block(&self.title, self.category);
        match &self.body {
            PanelBody::KeyValue(rows) => {
                let lines: Vec<Line> = rows
                    .iter()
                    .map(|kv| {
                        let mut spans = vec![dim(format!(" {:<width$}", kv.key, width = KEY_WIDTH))];
                        spans.extend(kv.value.iter().cloned());
                        Line::from(spans)
                    })
                    .collect();
                Paragraph::new(lines).block(block).render(area, buf);
            }
            PanelBody::Table {
                header,
                widths,
                rows,
            } => {
                let header_row = Row::new(header.iter().map(|h| Cell::from(*h))).style(
                    Style::default()
                        .fg(COLOR_DIM)
                        .add_modifier(Modifier::BOLD),
                );
                let body_rows = rows
                    .iter()
                    .map(|cells| Row::new(cells.iter().cloned().map(Cell::from)));
                Table::new(body_rows, widths.clone())
                    .header(header_row)
                    .column_spacing(1)
                    .block(block)
                    .render(area, buf);
            }
        }
    }
}
