//! Terminal rendering of a grid frame.

use comfy_table::Cell;
use comfy_table::ContentArrangement;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use lumina::query::Direction;
use lumina::render::GridFrame;
use lumina::render::HeaderCell;
use lumina::render::RenderedCell;
use lumina::view::PageLink;

/// Renders a full frame as text: title, table, summary and page strip.
pub fn render_frame(frame: &GridFrame) -> String {
    let mut out = String::new();
    if let Some(title) = &frame.chrome.title {
        out.push_str(&format!("{}\n", title));
    }
    if let Some(search) = frame.chrome.search.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("search: {}\n", search));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![Cell::new("")];
    header.extend(frame.header.columns.iter().map(|c| Cell::new(header_label(c))));
    table.set_header(header);

    match frame.body.placeholder {
        Some(placeholder) => {
            table.add_row(vec![Cell::new(""), Cell::new(placeholder.message())]);
        }
        None => {
            for row in &frame.body.rows {
                let mut cells = vec![Cell::new(if row.selected { "*" } else { "" })];
                cells.extend(row.cells.iter().map(|c| Cell::new(cell_text(c))));
                table.add_row(cells);
            }
        }
    }
    out.push_str(&format!("{}\n", table));

    if let Some(summary) = &frame.footer.summary {
        out.push_str(&format!("{}\n", summary));
    }
    if let Some(pager) = &frame.footer.pager {
        let links: Vec<String> = pager
            .links
            .iter()
            .map(|link| match link {
                PageLink::Page {
                    number,
                    current: true,
                } => format!("[{}]", number),
                PageLink::Page { number, .. } => number.to_string(),
                PageLink::Gap => "…".to_string(),
            })
            .collect();
        out.push_str(&format!("pages: {}\n", links.join(" ")));
    }
    out
}

fn header_label(cell: &HeaderCell) -> String {
    let mut label = cell.name.clone();
    if let Some(badge) = cell.sort {
        let arrow = match badge.direction {
            Direction::Asc => '▲',
            Direction::Desc => '▼',
        };
        label.push_str(&format!(" {}{}", arrow, badge.priority));
    }
    if let Some(filter) = cell.filter.as_deref().filter(|f| !f.is_empty()) {
        label.push_str(&format!(" ~{}", filter));
    }
    label
}

/// Cell markup as plain text; highlight marks become brackets.
pub fn cell_text(cell: &RenderedCell) -> String {
    let marked = cell
        .html
        .replace("<mark class=\"lumina-highlight\">", "[")
        .replace("</mark>", "]");
    unescape(&strip_tags(&marked))
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}
