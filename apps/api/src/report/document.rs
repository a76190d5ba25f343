use serde::Serialize;

/// Display target for report sections.
pub trait ReportSink {
    fn subheader(&mut self, text: &str);
    fn write(&mut self, text: &str);
    fn markdown(&mut self, text: &str);
    fn table(&mut self, columns: &[&str], rows: Vec<Vec<String>>);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportBlock {
    Subheader {
        text: String,
    },
    Text {
        text: String,
    },
    Markdown {
        text: String,
    },
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// Ordered record of every display call made while rendering one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportDocument {
    pub blocks: Vec<ReportBlock>,
}

impl ReportDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headings of every section, in display order.
    pub fn subheaders(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                ReportBlock::Subheader { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        for block in &self.blocks {
            match block {
                ReportBlock::Subheader { text } => {
                    if !out.is_empty() && !out.ends_with("\n\n") {
                        out.push('\n');
                    }
                    out.push_str("### ");
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                ReportBlock::Text { text } => {
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                ReportBlock::Markdown { text } => {
                    out.push_str(text);
                    out.push('\n');
                }
                ReportBlock::Table { columns, rows } => {
                    push_table_row(&mut out, columns);
                    out.push('|');
                    out.push_str(&" --- |".repeat(columns.len()));
                    out.push('\n');
                    for row in rows {
                        push_table_row(&mut out, row);
                    }
                    out.push('\n');
                }
            }
        }

        out
    }
}

impl ReportSink for ReportDocument {
    fn subheader(&mut self, text: &str) {
        self.blocks.push(ReportBlock::Subheader {
            text: text.to_string(),
        });
    }

    fn write(&mut self, text: &str) {
        self.blocks.push(ReportBlock::Text {
            text: text.to_string(),
        });
    }

    fn markdown(&mut self, text: &str) {
        self.blocks.push(ReportBlock::Markdown {
            text: text.to_string(),
        });
    }

    fn table(&mut self, columns: &[&str], rows: Vec<Vec<String>>) {
        self.blocks.push(ReportBlock::Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        });
    }
}

fn push_table_row(out: &mut String, cells: &[String]) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(&escape_cell(cell));
        out.push_str(" |");
    }
    out.push('\n');
}

/// Cells must stay on one line and must not open a new column.
fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}
